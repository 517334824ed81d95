//! # credhub-entity
//!
//! Domain entity models shared across the Credhub crates.
//!
//! ## Modules
//!
//! - `user` — user accounts and the role enumeration
//! - `session` — refresh sessions (server-tracked refresh credentials)
//! - `audit` — append-only audit events, their action vocabulary, and
//!   the closed metadata set

pub mod audit;
pub mod session;
pub mod user;

pub use audit::{AuditAction, AuditEvent, AuditMetadata, CreateAuditEvent};
pub use session::{CreateRefreshSession, RefreshSession};
pub use user::{CreateUser, User, UserRole};
