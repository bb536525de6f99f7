use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::net::TcpStream;
use tokio_rustls::rustls::ClientConfig;

use crate::common::{debug, info};
use crate::config::Endpoint;
use crate::protocol::parse_info;
use crate::{Reply, RespError, Result};

pub mod tcp;
pub mod tls;

#[async_trait]
pub trait Api {
    /// Send a command and wait for its reply.
    /// Error replies are returned as `Ok(Reply::Error)`.
    async fn call(&mut self, command: &str, args: &[String]) -> Result<Reply>;
}

/// Dial the endpoint, then authenticate and select the database.
pub async fn connect(endpoint: &Endpoint, tls: Option<Arc<ClientConfig>>) -> Result<Box<dyn Api>> {
    info!(tls = tls.is_some(), "Connecting to {}", endpoint);

    let stream = TcpStream::connect(endpoint.addr())
        .await
        .map_err(|err| RespError::Connection(format!("dial {}: {}", endpoint, err)))?;

    let mut client: Box<dyn Api> = match tls {
        Some(config) => Box::new(tcp::Client::new(
            tls::handshake(config, &endpoint.host, stream).await?,
        )),
        None => Box::new(tcp::Client::new(stream)),
    };

    handshake(client.as_mut(), endpoint).await?;

    Ok(client)
}

/// Send AUTH and SELECT as required by the endpoint.
pub async fn handshake(client: &mut dyn Api, endpoint: &Endpoint) -> Result<()> {
    if let Some(password) = endpoint.password.as_ref() {
        let args = match endpoint.username.as_ref() {
            Some(username) => vec![username.clone(), password.clone()],
            None => vec![password.clone()],
        };
        match client.call("AUTH", &args).await? {
            Reply::Error(message) => return Err(RespError::Unauthenticated(message)),
            _ => debug!("Authenticated"),
        }
    }

    if endpoint.db != 0 {
        match client.call("SELECT", &[endpoint.db.to_string()]).await? {
            Reply::Error(message) => {
                return Err(RespError::Connection(format!(
                    "select db {}: {}",
                    endpoint.db, message
                )))
            }
            _ => debug!(db = endpoint.db, "Database selected"),
        }
    }

    Ok(())
}

/// Fetch and parse the `INFO` reply.
/// An error reply, such as `NOAUTH` from a server requiring a password, fails the connection.
pub async fn server_info(client: &mut dyn Api) -> Result<HashMap<String, String>> {
    let reply = client.call("INFO", &[]).await?;

    match reply {
        Reply::Error(message) => Err(RespError::Connection(format!("INFO: {}", message))),
        reply => match reply.as_text() {
            Some(text) => Ok(parse_info(&text)),
            None => Err(RespError::UnexpectedReply {
                command: "INFO".into(),
                reply: reply.to_string(),
            }),
        },
    }
}
