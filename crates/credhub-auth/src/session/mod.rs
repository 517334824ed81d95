//! Session lifecycle: register, login, refresh, logout.

pub mod manager;

pub use manager::{LoginResult, SessionManager, TokenPair};
