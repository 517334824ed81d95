//! Postgres-backed store implementations.
//!
//! Thin adapters over the `credhub-database` repositories; all SQL lives
//! there.

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use credhub_core::AppResult;
use credhub_database::repositories::{
    AuditEventRepository, RefreshSessionRepository, UserRepository,
};
use credhub_entity::session::{CreateRefreshSession, RefreshSession};
use credhub_entity::user::{CreateUser, User, UserRole};

use super::{AuditRecord, AuditStore, SessionStore, UserStore};

/// [`UserStore`] backed by the `users` table.
#[derive(Debug, Clone)]
pub struct PostgresUserStore {
    repository: UserRepository,
}

impl PostgresUserStore {
    pub fn new(pool: PgPool) -> Self {
        Self {
            repository: UserRepository::new(pool),
        }
    }
}

#[async_trait]
impl UserStore for PostgresUserStore {
    async fn create(&self, data: &CreateUser) -> AppResult<User> {
        self.repository.create(data).await
    }

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<User>> {
        self.repository.find_by_id(id).await
    }

    async fn find_by_email(&self, email: &str) -> AppResult<Option<User>> {
        self.repository.find_by_email(email).await
    }

    async fn set_role(&self, id: Uuid, role: UserRole) -> AppResult<Option<User>> {
        self.repository.set_role(id, role).await
    }
}

/// [`SessionStore`] backed by the `refresh_sessions` table.
#[derive(Debug, Clone)]
pub struct PostgresSessionStore {
    repository: RefreshSessionRepository,
}

impl PostgresSessionStore {
    pub fn new(pool: PgPool) -> Self {
        Self {
            repository: RefreshSessionRepository::new(pool),
        }
    }
}

#[async_trait]
impl SessionStore for PostgresSessionStore {
    async fn create(&self, data: &CreateRefreshSession) -> AppResult<RefreshSession> {
        self.repository.create(data).await
    }

    async fn find_by_digest(&self, digest: &str) -> AppResult<Option<RefreshSession>> {
        self.repository.find_by_digest(digest).await
    }

    async fn revoke(&self, session_id: Uuid) -> AppResult<bool> {
        self.repository.revoke(session_id).await
    }
}

/// [`AuditStore`] backed by the `audit_events` table.
#[derive(Debug, Clone)]
pub struct PostgresAuditStore {
    repository: AuditEventRepository,
}

impl PostgresAuditStore {
    pub fn new(pool: PgPool) -> Self {
        Self {
            repository: AuditEventRepository::new(pool),
        }
    }
}

#[async_trait]
impl AuditStore for PostgresAuditStore {
    async fn append(&self, record: AuditRecord) -> AppResult<()> {
        self.repository
            .create(
                record.action,
                record.actor_id,
                record.ip_address.as_deref(),
                record.user_agent.as_deref(),
                record.metadata.as_ref(),
            )
            .await?;
        Ok(())
    }
}
