use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::net::TcpListener;
use tokio_rustls::rustls::pki_types::{CertificateDer, PrivateKeyDer};
use tokio_rustls::rustls::server::WebPkiClientVerifier;
use tokio_rustls::rustls::{RootCertStore, ServerConfig};
use tokio_rustls::TlsAcceptor;

pub const REDIS_VERSION: &str = "7.2.4";

pub fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("files")
        .join(name)
}

/// Commands received by the fake server, one entry per request.
pub type Received = Arc<Mutex<Vec<Vec<String>>>>;

/// Minimal RESP server answering PING, INFO, AUTH, SELECT, GET and SET.
#[derive(Clone, Default)]
pub struct FakeServer {
    pub password: Option<String>,
    pub received: Received,
}

pub enum Transport {
    Plain,
    Tls,
    MutualTls,
}

impl FakeServer {
    pub fn with_password(password: &str) -> Self {
        Self {
            password: Some(password.to_owned()),
            ..Default::default()
        }
    }

    /// Accept a single connection in the background and return the listening address.
    pub async fn spawn(self, transport: Transport) -> SocketAddr {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let acceptor = match transport {
            Transport::Plain => None,
            Transport::Tls => Some(acceptor(false)),
            Transport::MutualTls => Some(acceptor(true)),
        };

        tokio::spawn(async move {
            let (stream, _) = listener.accept().await.unwrap();
            match acceptor {
                Some(acceptor) => {
                    // A failed handshake just drops the connection.
                    if let Ok(stream) = acceptor.accept(stream).await {
                        self.serve(stream).await;
                    }
                }
                None => self.serve(stream).await,
            }
        });

        addr
    }

    async fn serve<S>(self, stream: S)
    where
        S: AsyncRead + AsyncWrite + Unpin,
    {
        let mut stream = BufReader::new(stream);
        let mut authenticated = self.password.is_none();

        while let Some(request) = read_request(&mut stream).await {
            self.received.lock().unwrap().push(request.clone());

            let reply = self.reply(&request, &mut authenticated);
            stream.get_mut().write_all(reply.as_bytes()).await.unwrap();
            stream.get_mut().flush().await.unwrap();
        }
    }

    fn reply(&self, request: &[String], authenticated: &mut bool) -> String {
        let command = request[0].to_uppercase();
        match (command.as_str(), &request[1..]) {
            ("AUTH", [.., password]) if Some(password) == self.password.as_ref() => {
                *authenticated = true;
                "+OK\r\n".into()
            }
            ("AUTH", _) => "-WRONGPASS invalid username-password pair or user is disabled.\r\n".into(),
            _ if !*authenticated => "-NOAUTH Authentication required.\r\n".into(),
            ("PING", []) => "+PONG\r\n".into(),
            ("PING", [message]) => bulk(message),
            ("SELECT", [_]) => "+OK\r\n".into(),
            ("INFO", _) => bulk(&format!(
                "# Server\r\nredis_version:{}\r\nredis_mode:standalone\r\n",
                REDIS_VERSION
            )),
            ("SET", [_, _]) => "+OK\r\n".into(),
            ("GET", [_]) => "$-1\r\n".into(),
            ("KEYS", [_]) => "*2\r\n$4\r\nkey1\r\n$4\r\nkey2\r\n".into(),
            _ => format!("-ERR unknown command '{}'\r\n", request[0]),
        }
    }
}

fn bulk(s: &str) -> String {
    format!("${}\r\n{}\r\n", s.len(), s)
}

async fn read_request<S>(stream: &mut BufReader<S>) -> Option<Vec<String>>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let mut line = String::new();
    if stream.read_line(&mut line).await.ok()? == 0 {
        return None;
    }
    let count = line.trim_end().strip_prefix('*')?.parse::<usize>().ok()?;

    let mut request = Vec::with_capacity(count);
    for _ in 0..count {
        line.clear();
        stream.read_line(&mut line).await.ok()?;
        let len = line.trim_end().strip_prefix('$')?.parse::<usize>().ok()?;

        let mut buf = vec![0; len + 2];
        stream.read_exact(&mut buf).await.ok()?;
        buf.truncate(len);
        request.push(String::from_utf8(buf).ok()?);
    }

    Some(request)
}

fn load_certs(name: &str) -> Vec<CertificateDer<'static>> {
    let pem = std::fs::read(fixture(name)).unwrap();
    rustls_pemfile::certs(&mut pem.as_slice())
        .collect::<Result<Vec<_>, _>>()
        .unwrap()
}

fn load_key(name: &str) -> PrivateKeyDer<'static> {
    let pem = std::fs::read(fixture(name)).unwrap();
    rustls_pemfile::private_key(&mut pem.as_slice())
        .unwrap()
        .unwrap()
}

fn acceptor(client_auth: bool) -> TlsAcceptor {
    let builder = ServerConfig::builder();

    let builder = if client_auth {
        let mut roots = RootCertStore::empty();
        for cert in load_certs("ca.pem") {
            roots.add(cert).unwrap();
        }
        builder.with_client_cert_verifier(
            WebPkiClientVerifier::builder(Arc::new(roots))
                .build()
                .unwrap(),
        )
    } else {
        builder.with_no_client_auth()
    };

    let config = builder
        .with_single_cert(load_certs("localhost.pem"), load_key("localhost.key"))
        .unwrap();

    TlsAcceptor::from(Arc::new(config))
}
