#![allow(clippy::module_inception)]

pub mod cli;
pub mod client;
pub mod config;
pub mod error;
pub mod help;
pub mod protocol;
pub mod render;

pub use crate::error::RespError;
pub type Result<T, E = crate::error::RespError> = std::result::Result<T, E>;

pub use protocol::Reply;

pub(crate) mod common {
    pub(crate) type Result<T, E = crate::error::internal::Error> = std::result::Result<T, E>;

    pub(crate) type Error = crate::error::internal::Error;
    pub(crate) type ErrorKind = crate::error::internal::ErrorKind;

    pub use tracing::{debug, info, trace, warn};
}
