//! # credhub-auth
//!
//! Credential and session lifecycle management for the Credhub platform.
//!
//! ## Modules
//!
//! - `token` — access-token codec (HS256) and refresh-secret generation
//! - `password` — Argon2id password hashing and policy enforcement
//! - `store` — persistence seams (Postgres and in-memory implementations)
//! - `audit` — synchronous, mandatory audit recording with sanitization
//! - `session` — session lifecycle (register, login, refresh, logout)
//! - `admin` — administrator role changes
//! - `gate` — role-based and ownership-based authorization decisions

pub mod admin;
pub mod audit;
pub mod context;
pub mod gate;
pub mod password;
pub mod session;
pub mod store;
pub mod token;

pub use admin::AdminActions;
pub use audit::AuditRecorder;
pub use context::RequestContext;
pub use gate::AuthorizationGate;
pub use password::{PasswordHasher, PasswordPolicy};
pub use session::{LoginResult, SessionManager, TokenPair};
pub use store::{AuditStore, SessionStore, UserStore};
pub use token::{AccessClaims, RefreshTokenGenerator, TokenCodec};
