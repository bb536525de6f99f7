use std::path::Path;
use std::sync::Arc;

use tokio::net::TcpStream;
use tokio_rustls::client::TlsStream;
use tokio_rustls::rustls::pki_types::{CertificateDer, PrivateKeyDer, ServerName};
use tokio_rustls::rustls::{ClientConfig, RootCertStore};
use tokio_rustls::TlsConnector;

use crate::common::{debug, warn};
use crate::config::{ClientIdentity, Endpoint, TrustMaterial};
use crate::{RespError, Result};

/// Build the tls configuration for the endpoint.
///
/// With trust material, only the supplied certificates are trusted and tls is
/// used regardless of the uri scheme. Without it, `rediss` endpoints are
/// verified against the bundled web pki roots and `redis` endpoints are dialed in plaintext.
pub async fn client_config(
    endpoint: &Endpoint,
    trust: Option<&TrustMaterial>,
    identity: Option<&ClientIdentity>,
) -> Result<Option<Arc<ClientConfig>>> {
    let roots = match trust {
        Some(material) => {
            if !endpoint.scheme.is_tls() {
                debug!("Certificate given, using tls for {}", endpoint);
            }
            custom_roots(material)?
        }
        None if endpoint.scheme.is_tls() => RootCertStore {
            roots: webpki_roots::TLS_SERVER_ROOTS.to_vec(),
        },
        None => {
            if identity.is_some() {
                warn!("Client certificate ignored for plaintext connection");
            }
            return Ok(None);
        }
    };

    let builder = ClientConfig::builder().with_root_certificates(roots);

    let config = match identity {
        Some(identity) => {
            let certs = load_certs(&identity.cert).await?;
            let key = load_key(&identity.key).await?;
            builder
                .with_client_auth_cert(certs, key)
                .map_err(|err| RespError::Config(format!("client certificate: {}", err)))?
        }
        None => builder.with_no_client_auth(),
    };

    Ok(Some(Arc::new(config)))
}

pub(crate) async fn handshake(
    config: Arc<ClientConfig>,
    host: &str,
    stream: TcpStream,
) -> Result<TlsStream<TcpStream>> {
    let server_name = ServerName::try_from(host)
        .map_err(|err| RespError::Config(format!("tls server name {}: {}", host, err)))?
        .to_owned();

    TlsConnector::from(config)
        .connect(server_name, stream)
        .await
        .map_err(|err| RespError::Connection(format!("tls handshake with {}: {}", host, err)))
}

fn custom_roots(material: &TrustMaterial) -> Result<RootCertStore> {
    let certs = rustls_pemfile::certs(&mut material.as_bytes())
        .collect::<std::result::Result<Vec<_>, _>>()
        .map_err(|err| RespError::Config(format!("certificate: {}", err)))?;

    let mut roots = RootCertStore::empty();
    let (added, ignored) = roots.add_parsable_certificates(certs);
    debug!(added, ignored, "Trust roots loaded");

    if added == 0 {
        return Err(RespError::Config("couldn't load cert data".into()));
    }

    Ok(roots)
}

async fn load_certs(path: &Path) -> Result<Vec<CertificateDer<'static>>> {
    let pem = read(path).await?;
    let certs = rustls_pemfile::certs(&mut pem.as_slice())
        .collect::<std::result::Result<Vec<_>, _>>()
        .map_err(|err| RespError::Config(format!("{}: {}", path.display(), err)))?;

    if certs.is_empty() {
        return Err(RespError::Config(format!(
            "{}: no certificate found",
            path.display()
        )));
    }
    Ok(certs)
}

async fn load_key(path: &Path) -> Result<PrivateKeyDer<'static>> {
    let pem = read(path).await?;
    rustls_pemfile::private_key(&mut pem.as_slice())
        .map_err(|err| RespError::Config(format!("{}: {}", path.display(), err)))?
        .ok_or_else(|| RespError::Config(format!("{}: no private key found", path.display())))
}

async fn read(path: &Path) -> Result<Vec<u8>> {
    tokio::fs::read(path)
        .await
        .map_err(|err| RespError::Config(format!("{}: {}", path.display(), err)))
}

#[cfg(test)]
mod tests {
    use super::*;

    const CA: &str = include_str!("../../files/ca.pem");

    fn fixture(name: &str) -> std::path::PathBuf {
        Path::new(env!("CARGO_MANIFEST_DIR")).join("files").join(name)
    }

    #[test]
    fn plaintext_without_trust() {
        tokio_test::block_on(async move {
            let endpoint = Endpoint::parse("redis://localhost").unwrap();

            assert!(client_config(&endpoint, None, None).await.unwrap().is_none());
        })
    }

    #[test]
    fn default_roots_for_rediss() {
        tokio_test::block_on(async move {
            let endpoint = Endpoint::parse("rediss://localhost").unwrap();

            assert!(client_config(&endpoint, None, None).await.unwrap().is_some());
        })
    }

    #[test]
    fn trust_material_forces_tls() {
        tokio_test::block_on(async move {
            let endpoint = Endpoint::parse("redis://localhost").unwrap();
            let trust = TrustMaterial::new(CA);

            assert!(client_config(&endpoint, Some(&trust), None)
                .await
                .unwrap()
                .is_some());
        })
    }

    #[test]
    fn no_certificate_in_material() {
        tokio_test::block_on(async move {
            let endpoint = Endpoint::parse("rediss://localhost").unwrap();
            let trust = TrustMaterial::new("this is not a pem");

            let err = client_config(&endpoint, Some(&trust), None)
                .await
                .unwrap_err();
            assert!(matches!(err, RespError::Config(_)));
        })
    }

    #[test]
    fn client_identity() {
        tokio_test::block_on(async move {
            let endpoint = Endpoint::parse("rediss://localhost").unwrap();
            let trust = TrustMaterial::new(CA);
            let identity = ClientIdentity {
                cert: fixture("client.pem"),
                key: fixture("client.key"),
            };

            assert!(client_config(&endpoint, Some(&trust), Some(&identity))
                .await
                .unwrap()
                .is_some());
        })
    }

    #[test]
    fn missing_client_key() {
        tokio_test::block_on(async move {
            let endpoint = Endpoint::parse("rediss://localhost").unwrap();
            let identity = ClientIdentity {
                cert: fixture("client.pem"),
                key: fixture("missing.key"),
            };

            let err = client_config(&endpoint, None, Some(&identity))
                .await
                .unwrap_err();
            assert!(matches!(err, RespError::Config(_)));
        })
    }

    #[test]
    fn certificate_given_as_key() {
        tokio_test::block_on(async move {
            let endpoint = Endpoint::parse("rediss://localhost").unwrap();
            let identity = ClientIdentity {
                cert: fixture("client.pem"),
                key: fixture("client.pem"),
            };

            let err = client_config(&endpoint, None, Some(&identity))
                .await
                .unwrap_err();
            assert!(err.to_string().contains("no private key found"));
        })
    }
}
