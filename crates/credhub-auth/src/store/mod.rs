//! Persistence seams for the session lifecycle.
//!
//! The lifecycle, admin, and gate components talk to storage exclusively
//! through these traits. The Postgres implementations delegate to the
//! `credhub-database` repositories; the in-memory implementations back
//! integration tests and local experimentation without a database.

pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use uuid::Uuid;

use credhub_core::AppResult;
use credhub_entity::audit::AuditAction;
use credhub_entity::session::{CreateRefreshSession, RefreshSession};
use credhub_entity::user::{CreateUser, User, UserRole};

pub use memory::{MemoryAuditStore, MemorySessionStore, MemoryUserStore};
pub use postgres::{PostgresAuditStore, PostgresSessionStore, PostgresUserStore};

/// Storage for user accounts.
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Insert a new user. Duplicate emails fail with `Conflict`.
    async fn create(&self, data: &CreateUser) -> AppResult<User>;

    /// Find a user by primary key.
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<User>>;

    /// Find a user by exact email.
    async fn find_by_email(&self, email: &str) -> AppResult<Option<User>>;

    /// Set a user's role, returning the updated user or `None` when the
    /// user does not exist.
    async fn set_role(&self, id: Uuid, role: UserRole) -> AppResult<Option<User>>;
}

/// Storage for refresh sessions.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Insert a new refresh session.
    async fn create(&self, data: &CreateRefreshSession) -> AppResult<RefreshSession>;

    /// Find a session by secret digest, revoked rows included.
    async fn find_by_digest(&self, digest: &str) -> AppResult<Option<RefreshSession>>;

    /// Atomically revoke a session if it is not revoked yet.
    ///
    /// Returns `true` iff this call performed the transition. Concurrent
    /// callers racing on the same session see exactly one `true`.
    async fn revoke(&self, session_id: Uuid) -> AppResult<bool>;
}

/// A fully sanitized audit entry, ready for persistence.
///
/// Produced by [`crate::audit::AuditRecorder`]; the metadata value has
/// already had secret-bearing keys stripped.
#[derive(Debug, Clone)]
pub struct AuditRecord {
    /// The action that occurred.
    pub action: AuditAction,
    /// The acting user, if identified.
    pub actor_id: Option<Uuid>,
    /// Caller network address.
    pub ip_address: Option<String>,
    /// Caller agent string.
    pub user_agent: Option<String>,
    /// Sanitized structured payload.
    pub metadata: Option<serde_json::Value>,
}

/// Append-only storage for audit events.
#[async_trait]
pub trait AuditStore: Send + Sync {
    /// Append one audit record. Failure here is an operation failure:
    /// callers must not swallow the error.
    async fn append(&self, record: AuditRecord) -> AppResult<()>;
}
