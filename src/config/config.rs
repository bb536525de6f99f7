use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::common::debug;
use crate::config::endpoint::{DEFAULT_DB, DEFAULT_HOST, DEFAULT_PORT};
use crate::config::{ClientIdentity, Endpoint, TrustMaterial};
use crate::{RespError, Result};

// Connection configuration.
// Values come from the config file and are overridden by command line flags and environment.
#[derive(Debug, Deserialize, Default, Clone, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct Config {
    // Explicit endpoint uri. takes precedence over host, port, auth, ndb and tls.
    uri: Option<String>,
    host: Option<String>,
    port: Option<u16>,
    // Password sent with AUTH.
    auth: Option<String>,
    // Database index selected after connecting.
    ndb: Option<u32>,
    tls: Option<bool>,
    // Certificate file trusted as tls root.
    certfile: Option<PathBuf>,
    // Base64 encoded certificate trusted as tls root.
    certb64: Option<String>,
    client_cert: Option<PathBuf>,
    client_key: Option<PathBuf>,
    long_prompt: Option<bool>,
}

impl Config {
    pub async fn load_config_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = tokio::fs::read_to_string(path)
            .await
            .map_err(|err| RespError::Config(format!("config file {}: {}", path.display(), err)))?;
        let config = serde_yaml::from_str::<Config>(&content)?;

        debug!(path = %path.display(), "Config file loaded");

        Ok(config)
    }

    pub fn set_uri(&mut self, val: &mut Option<String>) {
        if let Some(val) = val.take() {
            self.uri = Some(val)
        }
    }
    pub fn set_host(&mut self, val: &mut Option<String>) {
        if let Some(val) = val.take() {
            self.host = Some(val)
        }
    }
    pub fn set_port(&mut self, val: Option<u16>) {
        if let Some(val) = val {
            self.port = Some(val)
        }
    }
    pub fn set_auth(&mut self, val: &mut Option<String>) {
        if let Some(val) = val.take() {
            self.auth = Some(val)
        }
    }
    pub fn set_ndb(&mut self, val: Option<u32>) {
        if let Some(val) = val {
            self.ndb = Some(val)
        }
    }
    pub fn set_tls(&mut self, val: Option<bool>) {
        if let Some(val) = val {
            self.tls = Some(val)
        }
    }
    pub fn set_certfile(&mut self, val: &mut Option<PathBuf>) {
        if let Some(val) = val.take() {
            self.certfile = Some(val)
        }
    }
    pub fn set_certb64(&mut self, val: &mut Option<String>) {
        if let Some(val) = val.take() {
            self.certb64 = Some(val)
        }
    }
    pub fn set_client_cert(&mut self, val: &mut Option<PathBuf>) {
        if let Some(val) = val.take() {
            self.client_cert = Some(val)
        }
    }
    pub fn set_client_key(&mut self, val: &mut Option<PathBuf>) {
        if let Some(val) = val.take() {
            self.client_key = Some(val)
        }
    }
    pub fn set_long_prompt(&mut self, val: Option<bool>) {
        if let Some(val) = val {
            self.long_prompt = Some(val)
        }
    }

    // Values set in other win.
    pub fn override_merge(&mut self, other: &mut Config) {
        self.set_uri(&mut other.uri);
        self.set_host(&mut other.host);
        self.set_port(other.port);
        self.set_auth(&mut other.auth);
        self.set_ndb(other.ndb);
        self.set_tls(other.tls);
        self.set_certfile(&mut other.certfile);
        self.set_certb64(&mut other.certb64);
        self.set_client_cert(&mut other.client_cert);
        self.set_client_key(&mut other.client_key);
        self.set_long_prompt(other.long_prompt);
    }

    /// Connection target. An explicit uri is returned unmodified, otherwise
    /// one is synthesized from the discrete fields.
    pub fn target(&self) -> String {
        match self.uri.as_deref() {
            Some(uri) => uri.to_owned(),
            None => Endpoint::synthesize_uri(
                self.tls.unwrap_or(false),
                self.auth.as_deref(),
                self.host.as_deref().unwrap_or(DEFAULT_HOST),
                self.port.unwrap_or(DEFAULT_PORT),
                self.ndb.unwrap_or(DEFAULT_DB),
            ),
        }
    }

    pub fn endpoint(&self) -> Result<Endpoint> {
        Endpoint::parse(&self.target())
    }

    pub async fn trust_material(&self) -> Result<Option<TrustMaterial>> {
        TrustMaterial::resolve(self.certfile.as_deref(), self.certb64.as_deref()).await
    }

    pub fn client_identity(&self) -> Result<Option<ClientIdentity>> {
        match (&self.client_cert, &self.client_key) {
            (Some(cert), Some(key)) => Ok(Some(ClientIdentity {
                cert: cert.clone(),
                key: key.clone(),
            })),
            (None, None) => Ok(None),
            _ => Err(RespError::Config(
                "client_cert and client_key must be given together".into(),
            )),
        }
    }

    pub fn prompt(&self, endpoint: &Endpoint) -> String {
        if self.long_prompt.unwrap_or(false) && self.uri.is_some() {
            format!("{}:{}> ", endpoint.host, endpoint.port)
        } else {
            "> ".to_owned()
        }
    }
}
