use std::borrow::Cow;
use std::fmt;
use std::str::FromStr;

use percent_encoding::{percent_decode_str, utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use url::{Host, Url};

use crate::{RespError, Result};

pub const DEFAULT_HOST: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 6379;
pub const DEFAULT_DB: u32 = 0;

// Username placeholder used when only a password is known.
const PLACEHOLDER_USERNAME: &str = "x";

// Characters left as is in the userinfo part of a synthesized uri.
const USERINFO: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scheme {
    Redis,
    Rediss,
}

impl Scheme {
    pub fn from_tls(tls: bool) -> Self {
        if tls {
            Scheme::Rediss
        } else {
            Scheme::Redis
        }
    }

    pub fn is_tls(&self) -> bool {
        matches!(self, Scheme::Rediss)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Scheme::Redis => "redis",
            Scheme::Rediss => "rediss",
        }
    }
}

impl FromStr for Scheme {
    type Err = RespError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "redis" => Ok(Scheme::Redis),
            "rediss" => Ok(Scheme::Rediss),
            _ => Err(RespError::Config(format!(
                "unsupported uri scheme {:?}, expected redis or rediss",
                s
            ))),
        }
    }
}

/// Endpoint is the resolved connection target.
#[derive(Clone, PartialEq, Eq)]
pub struct Endpoint {
    pub scheme: Scheme,
    pub username: Option<String>,
    pub password: Option<String>,
    pub host: String,
    pub port: u16,
    pub db: u32,
}

impl Endpoint {
    /// Build the uri `<scheme>://[x:<password>@]<host>:<port>/<db>` from discrete fields.
    pub fn synthesize_uri(tls: bool, password: Option<&str>, host: &str, port: u16, db: u32) -> String {
        let mut uri = format!("{}://", Scheme::from_tls(tls).as_str());

        if let Some(password) = password {
            uri.push_str(PLACEHOLDER_USERNAME);
            uri.push(':');
            uri.extend(utf8_percent_encode(password, USERINFO));
            uri.push('@');
        }

        uri.push_str(&format!("{}:{}/{}", uri_host(host), port, db));
        uri
    }

    /// Parse `redis://` or `rediss://` uri.
    pub fn parse(uri: &str) -> Result<Self> {
        let url = Url::parse(uri).map_err(|err| RespError::Config(format!("uri {}: {}", uri, err)))?;

        let scheme = url.scheme().parse::<Scheme>()?;

        let host = match url.host() {
            Some(Host::Domain(domain)) if !domain.is_empty() => domain.to_owned(),
            Some(Host::Ipv4(addr)) => addr.to_string(),
            Some(Host::Ipv6(addr)) => addr.to_string(),
            _ => "localhost".to_owned(),
        };
        let port = url.port().unwrap_or(DEFAULT_PORT);

        let username = Some(decode(url.username())?)
            .filter(|username| !username.is_empty() && username != PLACEHOLDER_USERNAME);
        let password = url.password().map(decode).transpose()?;

        let db = match url.path().trim_start_matches('/') {
            "" => DEFAULT_DB,
            db => db
                .parse::<u32>()
                .map_err(|_| RespError::Config(format!("invalid database {:?} in uri", db)))?,
        };

        Ok(Endpoint {
            scheme,
            username,
            password,
            host,
            port,
            db,
        })
    }

    pub fn addr(&self) -> (&str, u16) {
        (self.host.as_str(), self.port)
    }
}

// IPv6 literals are bracketed in uris.
fn uri_host(host: &str) -> Cow<'_, str> {
    if host.contains(':') && !host.starts_with('[') {
        Cow::Owned(format!("[{}]", host))
    } else {
        Cow::Borrowed(host)
    }
}

fn decode(s: &str) -> Result<String> {
    percent_decode_str(s)
        .decode_utf8()
        .map(|s| s.into_owned())
        .map_err(|err| RespError::Config(format!("uri userinfo: {}", err)))
}

// Never print the password.
impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}://", self.scheme.as_str())?;
        match (&self.username, &self.password) {
            (Some(username), Some(_)) => write!(f, "{}:***@", username)?,
            (None, Some(_)) => write!(f, "{}:***@", PLACEHOLDER_USERNAME)?,
            (Some(username), None) => write!(f, "{}@", username)?,
            (None, None) => (),
        }
        write!(f, "{}:{}/{}", uri_host(&self.host), self.port, self.db)
    }
}

impl fmt::Debug for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Endpoint({})", self)
    }
}
