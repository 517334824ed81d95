//! Refresh session entity.

pub mod model;

pub use model::{CreateRefreshSession, RefreshSession};
