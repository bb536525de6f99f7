use async_trait::async_trait;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::net::TcpStream;

use crate::client::Api;
use crate::common::{trace, ErrorKind};
use crate::protocol::connection::Connection;
use crate::{Reply, Result};

const CONNECTION_BUFFER_BYTES: usize = 1024 * 4;

/// Client issues commands over a single connection.
pub struct Client<T = TcpStream> {
    connection: Connection<T>,
}

impl<T> Client<T>
where
    T: AsyncWrite + AsyncRead + Unpin,
{
    pub fn new(stream: T) -> Self {
        Self {
            connection: Connection::new(stream, Some(CONNECTION_BUFFER_BYTES)),
        }
    }
}

#[async_trait]
impl<T> Api for Client<T>
where
    T: AsyncWrite + AsyncRead + Unpin + Send,
{
    async fn call(&mut self, command: &str, args: &[String]) -> Result<Reply> {
        let mut request = Vec::with_capacity(args.len() + 1);
        request.push(command);
        request.extend(args.iter().map(String::as_str));

        trace!(command, args = args.len(), "Send command");

        self.connection.write_command(&request[..]).await?;

        match self.connection.read_reply().await? {
            Some(reply) => Ok(reply),
            None => Err(ErrorKind::ConnectionResetByPeer.into()),
        }
    }
}
