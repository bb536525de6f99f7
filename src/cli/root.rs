use std::path::PathBuf;

use clap::{ArgAction, Args, Parser};

use crate::config::Config;
use crate::Result;

/// Interactive client for RESP key value servers
#[derive(Parser, Debug)]
#[command(version, about, disable_help_flag = true)]
pub struct ResplCommand {
    /// Print help
    #[arg(long, action = ArgAction::Help)]
    pub help: Option<bool>,
    /// Enable debug mode
    #[arg(long, env = "RESPL_DEBUG", action = ArgAction::SetTrue)]
    pub debug: bool,
    /// Connection options
    #[command(flatten)]
    pub connection: ConnectionOptions,
    /// Command and arguments to run once instead of starting the prompt
    #[arg(
        value_name = "COMMANDS",
        trailing_var_arg = true,
        allow_hyphen_values = true
    )]
    pub commands: Vec<String>,
}

/// Connection options
#[derive(Args, Debug, Default)]
pub struct ConnectionOptions {
    /// URI to connect to, takes precedence over host/port/auth/ndb/tls
    #[arg(short = 'u', long, env = "REDIS_URI")]
    pub uri: Option<String>,
    /// Host to connect to [default: 127.0.0.1]
    #[arg(short = 'h', long, env = "REDIS_HOST")]
    pub host: Option<String>,
    /// Port to connect to [default: 6379]
    #[arg(short = 'p', long, env = "REDIS_PORT")]
    pub port: Option<u16>,
    /// Password to use when connecting
    #[arg(short = 'a', long, env = "REDIS_AUTH", hide_env_values = true)]
    pub auth: Option<String>,
    /// Database to access [default: 0]
    #[arg(short = 'n', long)]
    pub ndb: Option<u32>,
    /// Enable TLS
    #[arg(long, action = ArgAction::SetTrue)]
    pub tls: bool,
    /// Self-signed certificate file for validation
    #[arg(long, env = "REDIS_CERTFILE")]
    pub certfile: Option<PathBuf>,
    /// Self-signed certificate as base64 for validation
    #[arg(long, env = "REDIS_CERTB64", hide_env_values = true)]
    pub certb64: Option<String>,
    /// Client certificate file for mutual TLS
    #[arg(long, requires = "client_key")]
    pub client_cert: Option<PathBuf>,
    /// Client private key file for mutual TLS
    #[arg(long, requires = "client_cert")]
    pub client_key: Option<PathBuf>,
    /// Enable long prompt with host/port
    #[arg(long, action = ArgAction::SetTrue)]
    pub long: bool,
    /// Configuration file path
    #[arg(short = 'C', long, env = "RESPL_CONFIG")]
    pub config: Option<PathBuf>,
}

impl ConnectionOptions {
    /// Merge the options over the config file if any.
    pub async fn into_config(self) -> Result<Config> {
        let ConnectionOptions {
            mut uri,
            mut host,
            port,
            mut auth,
            ndb,
            tls,
            mut certfile,
            mut certb64,
            mut client_cert,
            mut client_key,
            long,
            config,
        } = self;

        let mut base = match config {
            Some(path) => Config::load_config_file(path).await?,
            None => Config::default(),
        };

        let mut flags = {
            let mut config = Config::default();

            config.set_uri(&mut uri);
            config.set_host(&mut host);
            config.set_port(port);
            config.set_auth(&mut auth);
            config.set_ndb(ndb);
            // A flag left off must not override the config file.
            config.set_tls(tls.then_some(true));
            config.set_certfile(&mut certfile);
            config.set_certb64(&mut certb64);
            config.set_client_cert(&mut client_cert);
            config.set_client_key(&mut client_key);
            config.set_long_prompt(long.then_some(true));
            config
        };

        base.override_merge(&mut flags);

        Ok(base)
    }
}

/// Parse command line args
pub fn parse() -> ResplCommand {
    ResplCommand::parse()
}
