//! # credhub-core
//!
//! Shared foundation for the Credhub credential manager: the unified
//! error taxonomy, the `AppResult` alias, and configuration schemas.

pub mod config;
pub mod error;
pub mod logging;
pub mod result;

pub use error::{AppError, ErrorKind};
pub use result::AppResult;
