use std::path::{Path, PathBuf};

use base64::Engine;

use crate::common::debug;
use crate::{RespError, Result};

/// Raw certificate bytes(PEM) trusted as the only roots of the tls connection.
#[derive(Clone, PartialEq, Eq)]
pub struct TrustMaterial(Vec<u8>);

impl TrustMaterial {
    pub fn new(pem: impl Into<Vec<u8>>) -> Self {
        Self(pem.into())
    }

    /// Resolve trust material from a certificate file or a base64 encoded string.
    /// The file takes precedence. Empty material is treated as absent.
    pub async fn resolve(certfile: Option<&Path>, certb64: Option<&str>) -> Result<Option<Self>> {
        let pem = match (certfile, certb64) {
            (Some(path), _) => {
                debug!(path = %path.display(), "Read certificate file");
                tokio::fs::read(path).await.map_err(|err| {
                    RespError::Config(format!("certfile {}: {}", path.display(), err))
                })?
            }
            (None, Some(encoded)) => base64::engine::general_purpose::STANDARD
                .decode(encoded.trim())
                .map_err(|err| RespError::Config(format!("certb64: {}", err)))?,
            (None, None) => return Ok(None),
        };

        if pem.is_empty() {
            Ok(None)
        } else {
            Ok(Some(TrustMaterial(pem)))
        }
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl std::fmt::Debug for TrustMaterial {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "TrustMaterial({} bytes)", self.0.len())
    }
}

/// Client certificate chain and private key presented for mutual tls.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientIdentity {
    pub cert: PathBuf,
    pub key: PathBuf,
}
