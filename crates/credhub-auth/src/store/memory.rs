//! In-memory store implementations.
//!
//! Process-local stores guarded by async mutexes. They honor the same
//! semantics as the Postgres adapters (email uniqueness, revoked rows
//! retained, atomic revocation) and back the integration tests.

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::Mutex;
use uuid::Uuid;

use credhub_core::{AppError, AppResult};
use credhub_entity::audit::AuditAction;
use credhub_entity::session::{CreateRefreshSession, RefreshSession};
use credhub_entity::user::{CreateUser, User, UserRole};

use super::{AuditRecord, AuditStore, SessionStore, UserStore};

/// [`UserStore`] holding users in a process-local list.
#[derive(Debug, Default)]
pub struct MemoryUserStore {
    users: Mutex<Vec<User>>,
}

impl MemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn create(&self, data: &CreateUser) -> AppResult<User> {
        let mut users = self.users.lock().await;
        if users.iter().any(|u| u.email == data.email) {
            return Err(AppError::conflict("Email already registered"));
        }
        let user = User {
            id: Uuid::new_v4(),
            email: data.email.clone(),
            password_hash: data.password_hash.clone(),
            role: data.role,
            created_at: Utc::now(),
        };
        users.push(user.clone());
        Ok(user)
    }

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<User>> {
        let users = self.users.lock().await;
        Ok(users.iter().find(|u| u.id == id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> AppResult<Option<User>> {
        let users = self.users.lock().await;
        Ok(users.iter().find(|u| u.email == email).cloned())
    }

    async fn set_role(&self, id: Uuid, role: UserRole) -> AppResult<Option<User>> {
        let mut users = self.users.lock().await;
        match users.iter_mut().find(|u| u.id == id) {
            Some(user) => {
                user.role = role;
                Ok(Some(user.clone()))
            }
            None => Ok(None),
        }
    }
}

/// [`SessionStore`] holding refresh sessions in a process-local list.
///
/// Revoked rows are kept, matching the persistence contract.
#[derive(Debug, Default)]
pub struct MemorySessionStore {
    sessions: Mutex<Vec<RefreshSession>>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    async fn create(&self, data: &CreateRefreshSession) -> AppResult<RefreshSession> {
        let mut sessions = self.sessions.lock().await;
        let session = RefreshSession {
            id: Uuid::new_v4(),
            user_id: data.user_id,
            token_digest: data.token_digest.clone(),
            expires_at: data.expires_at,
            revoked_at: None,
            created_at: Utc::now(),
        };
        sessions.push(session.clone());
        Ok(session)
    }

    async fn find_by_digest(&self, digest: &str) -> AppResult<Option<RefreshSession>> {
        let sessions = self.sessions.lock().await;
        Ok(sessions.iter().find(|s| s.token_digest == digest).cloned())
    }

    async fn revoke(&self, session_id: Uuid) -> AppResult<bool> {
        // The mutex serializes the check-and-set, mirroring the conditional
        // UPDATE in the Postgres adapter.
        let mut sessions = self.sessions.lock().await;
        match sessions
            .iter_mut()
            .find(|s| s.id == session_id && s.revoked_at.is_none())
        {
            Some(session) => {
                session.revoked_at = Some(Utc::now());
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

/// [`AuditStore`] holding appended records in a process-local list.
#[derive(Debug, Default)]
pub struct MemoryAuditStore {
    records: Mutex<Vec<AuditRecord>>,
}

impl MemoryAuditStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of every record appended so far, in append order.
    pub async fn records(&self) -> Vec<AuditRecord> {
        self.records.lock().await.clone()
    }

    /// Count of records for one action.
    pub async fn count_action(&self, action: AuditAction) -> usize {
        self.records
            .lock()
            .await
            .iter()
            .filter(|r| r.action == action)
            .count()
    }
}

#[async_trait]
impl AuditStore for MemoryAuditStore {
    async fn append(&self, record: AuditRecord) -> AppResult<()> {
        self.records.lock().await.push(record);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[tokio::test]
    async fn user_store_rejects_duplicate_email() {
        let store = MemoryUserStore::new();
        let data = CreateUser {
            email: "a@example.com".to_string(),
            password_hash: "hash".to_string(),
            role: UserRole::User,
        };
        store.create(&data).await.unwrap();
        let err = store.create(&data).await.unwrap_err();
        assert_eq!(err.kind, credhub_core::ErrorKind::Conflict);
    }

    #[tokio::test]
    async fn session_revoke_is_single_shot() {
        let store = MemorySessionStore::new();
        let session = store
            .create(&CreateRefreshSession {
                user_id: Uuid::new_v4(),
                token_digest: "digest".to_string(),
                expires_at: Utc::now() + Duration::days(30),
            })
            .await
            .unwrap();

        assert!(store.revoke(session.id).await.unwrap());
        assert!(!store.revoke(session.id).await.unwrap());

        let found = store.find_by_digest("digest").await.unwrap().unwrap();
        assert!(found.is_revoked());
    }
}
