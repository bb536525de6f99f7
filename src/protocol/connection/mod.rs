use std::io::{self, Cursor};

use bytes::{Buf, BytesMut};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt, BufWriter};
use tokio::net::TcpStream;

use crate::common::{trace, ErrorKind, Result};
use crate::protocol::frame::{frameprefix, Error as FrameError};
use crate::protocol::{Reply, DELIMITER};

pub(crate) struct Connection<T = TcpStream> {
    stream: BufWriter<T>,
    // The buffer for reading replies.
    buffer: BytesMut,
}

impl<T> Connection<T>
where
    T: AsyncWrite + AsyncRead + Unpin,
{
    pub(crate) fn new(stream: T, buffer_size: Option<usize>) -> Self {
        Self {
            stream: BufWriter::new(stream),
            buffer: BytesMut::with_capacity(buffer_size.unwrap_or(4 * 1024)),
        }
    }

    // Write a command as an array of bulk strings.
    pub(crate) async fn write_command<S>(&mut self, args: &[S]) -> Result<()>
    where
        S: AsRef<[u8]>,
    {
        self.stream.write_u8(frameprefix::ARRAY).await?;
        self.write_decimal(args.len() as u64).await?;

        for arg in args {
            let arg = arg.as_ref();
            self.stream.write_u8(frameprefix::BULK).await?;
            self.write_decimal(arg.len() as u64).await?;
            self.stream.write_all(arg).await?;
            self.stream.write_all(DELIMITER).await?;
        }

        self.stream.flush().await?;
        Ok(())
    }

    // Return None when the peer closed the connection on a reply boundary.
    pub(crate) async fn read_reply(&mut self) -> Result<Option<Reply>> {
        loop {
            if let Some(reply) = self.parse_reply()? {
                return Ok(Some(reply));
            }

            if 0 == self.stream.read_buf(&mut self.buffer).await? {
                return if self.buffer.is_empty() {
                    Ok(None)
                } else {
                    Err(ErrorKind::ConnectionResetByPeer.into())
                };
            }
        }
    }

    fn parse_reply(&mut self) -> Result<Option<Reply>> {
        use FrameError::Incomplete;

        let mut buf = Cursor::new(&self.buffer[..]);

        match Reply::check(&mut buf) {
            Ok(_) => {
                let len = buf.position() as usize;
                buf.set_position(0);
                let reply = Reply::parse(&mut buf)?;
                self.buffer.advance(len);

                trace!(bytes = len, kind = reply.kind(), "Reply decoded");

                Ok(Some(reply))
            }
            Err(Incomplete) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn write_decimal(&mut self, val: u64) -> io::Result<()> {
        use std::io::Write;

        let mut buf = [0u8; 20];
        let mut buf = Cursor::new(&mut buf[..]);
        write!(&mut buf, "{}", val)?;

        let pos = buf.position() as usize;
        self.stream.write_all(&buf.get_ref()[..pos]).await?;
        self.stream.write_all(DELIMITER).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn write_command() {
        tokio_test::block_on(async move {
            let (client, mut server) = tokio::io::duplex(1024);
            let mut client_conn = Connection::new(client, None);

            client_conn
                .write_command(&["SET", "key1", "hello world"])
                .await
                .unwrap();
            drop(client_conn);

            let mut got = Vec::new();
            server.read_to_end(&mut got).await.unwrap();

            assert_eq!(
                got,
                b"*3\r\n$3\r\nSET\r\n$4\r\nkey1\r\n$11\r\nhello world\r\n".to_vec()
            );
        })
    }

    #[test]
    fn read_replies() {
        tokio_test::block_on(async move {
            let (client, mut server) = tokio::io::duplex(1024);
            let mut client_conn = Connection::new(client, Some(16));

            let write_handle = tokio::spawn(async move {
                // Split a reply across writes to exercise the incomplete path.
                server.write_all(b"+PONG\r\n*2\r\n$3\r\nfoo").await.unwrap();
                server.write_all(b"\r\n:7\r\n$-1\r\n").await.unwrap();
            });

            let want = vec![
                Reply::Status("PONG".into()),
                Reply::Array(vec![Reply::Bulk(b"foo".to_vec()), Reply::Integer(7)]),
                Reply::Nil,
            ];
            for want in want {
                let got = client_conn.read_reply().await.unwrap().unwrap();
                assert_eq!(want, got);
            }

            write_handle.await.unwrap();

            // Peer closed on a reply boundary.
            assert!(client_conn.read_reply().await.unwrap().is_none());
        })
    }

    #[test]
    fn reset_in_the_middle_of_reply() {
        tokio_test::block_on(async move {
            let (client, mut server) = tokio::io::duplex(1024);
            let mut client_conn = Connection::new(client, None);

            server.write_all(b"$10\r\nabc").await.unwrap();
            drop(server);

            let err = client_conn.read_reply().await.unwrap_err();
            assert!(err.is_disconnected());
        })
    }

    #[test]
    fn unknown_prefix() {
        tokio_test::block_on(async move {
            let (client, mut server) = tokio::io::duplex(1024);
            let mut client_conn = Connection::new(client, None);

            server.write_all(b"%1\r\n+a\r\n+b\r\n").await.unwrap();

            let err = client_conn.read_reply().await.unwrap_err();
            assert!(matches!(err.kind(), ErrorKind::NetworkFraming(_)));
        })
    }
}
