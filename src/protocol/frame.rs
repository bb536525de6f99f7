use bytes::Buf;

use crate::common::{self, ErrorKind};
use crate::protocol::{Reply, DELIMITER};

pub(crate) mod frameprefix {
    pub(crate) const STATUS: u8 = b'+';
    pub(crate) const ERROR: u8 = b'-';
    pub(crate) const INTEGER: u8 = b':';
    pub(crate) const BULK: u8 = b'$';
    pub(crate) const ARRAY: u8 = b'*';
}

#[derive(Debug, PartialEq)]
pub(crate) enum Error {
    /// Not enough data is available to decode a reply from buffer.
    Incomplete,
    Invalid(String),
}

impl From<Error> for common::Error {
    fn from(err: Error) -> Self {
        match err {
            Error::Incomplete => ErrorKind::NetworkFraming("incomplete frame".into()).into(),
            Error::Invalid(description) => ErrorKind::NetworkFraming(description).into(),
        }
    }
}

type ByteCursor<'a> = std::io::Cursor<&'a [u8]>;

impl Reply {
    // Check whether an entire reply can be decoded from src without allocating.
    pub(crate) fn check(src: &mut ByteCursor) -> Result<(), Error> {
        match cursor::get_u8(src)? {
            frameprefix::STATUS | frameprefix::ERROR | frameprefix::INTEGER => {
                cursor::get_line(src)?;
                Ok(())
            }
            frameprefix::BULK => match cursor::get_length(src)? {
                // skip bytes length + delimiter
                Some(len) => cursor::skip(src, len + 2),
                None => Ok(()),
            },
            frameprefix::ARRAY => {
                if let Some(len) = cursor::get_length(src)? {
                    for _ in 0..len {
                        Reply::check(src)?;
                    }
                }
                Ok(())
            }
            prefix => Err(Error::Invalid(format!(
                "unknown reply prefix {:?}",
                prefix as char
            ))),
        }
    }

    // Decode a reply. src must have passed check().
    pub(crate) fn parse(src: &mut ByteCursor) -> Result<Reply, Error> {
        match cursor::get_u8(src)? {
            frameprefix::STATUS => Ok(Reply::Status(cursor::get_string(src)?)),
            frameprefix::ERROR => Ok(Reply::Error(cursor::get_string(src)?)),
            frameprefix::INTEGER => Ok(Reply::Integer(cursor::get_decimal(src)?)),
            frameprefix::BULK => {
                let len = match cursor::get_length(src)? {
                    Some(len) => len,
                    None => return Ok(Reply::Nil),
                };
                let n = len + 2;
                if src.remaining() < n {
                    return Err(Error::Incomplete);
                }
                if &src.chunk()[len..n] != DELIMITER {
                    return Err(Error::Invalid("bulk string not terminated by CRLF".into()));
                }
                let value = Vec::from(&src.chunk()[..len]);

                cursor::skip(src, n)?;

                Ok(Reply::Bulk(value))
            }
            frameprefix::ARRAY => {
                let len = match cursor::get_length(src)? {
                    Some(len) => len,
                    None => return Ok(Reply::Nil),
                };
                let mut items = Vec::with_capacity(len);
                for _ in 0..len {
                    items.push(Reply::parse(src)?);
                }
                Ok(Reply::Array(items))
            }
            prefix => Err(Error::Invalid(format!(
                "unknown reply prefix {:?}",
                prefix as char
            ))),
        }
    }
}

// cursor utilities.
mod cursor {
    use super::*;

    pub(super) fn get_u8(src: &mut ByteCursor) -> Result<u8, Error> {
        if !src.has_remaining() {
            return Err(Error::Incomplete);
        }
        Ok(src.get_u8())
    }

    pub(super) fn skip(src: &mut ByteCursor, n: usize) -> Result<(), Error> {
        if src.remaining() < n {
            return Err(Error::Incomplete);
        }
        src.advance(n);
        Ok(())
    }

    pub(super) fn get_decimal(src: &mut ByteCursor) -> Result<i64, Error> {
        let line = get_line(src)?;

        atoi::atoi::<i64>(line)
            .ok_or_else(|| Error::Invalid("invalid protocol decimal format".into()))
    }

    // Length header of bulk strings and arrays. -1 means null.
    pub(super) fn get_length(src: &mut ByteCursor) -> Result<Option<usize>, Error> {
        match get_decimal(src)? {
            -1 => Ok(None),
            n if n < 0 => Err(Error::Invalid(format!("invalid length {}", n))),
            n => Ok(Some(n as usize)),
        }
    }

    pub(super) fn get_string(src: &mut ByteCursor) -> Result<String, Error> {
        let line = get_line(src)?.to_vec();
        String::from_utf8(line).map_err(|e| Error::Invalid(e.to_string()))
    }

    pub(super) fn get_line<'a>(src: &'a mut ByteCursor) -> Result<&'a [u8], Error> {
        let start = src.position() as usize;
        let end = src.get_ref().len().saturating_sub(1);

        for i in start..end {
            if src.get_ref()[i] == DELIMITER[0] && src.get_ref()[i + 1] == DELIMITER[1] {
                src.set_position((i + 2) as u64);

                return Ok(&src.get_ref()[start..i]);
            }
        }

        Err(Error::Incomplete)
    }
}
