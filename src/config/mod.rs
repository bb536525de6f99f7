mod config;
pub use config::Config;

mod endpoint;
pub use endpoint::{Endpoint, Scheme, DEFAULT_DB, DEFAULT_HOST, DEFAULT_PORT};

mod trust;
pub use trust::{ClientIdentity, TrustMaterial};

pub mod env {
    pub const LOG_DIRECTIVE: &str = "RESPL_LOG";
}
