//! Audit event repository implementation.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use credhub_core::error::{AppError, ErrorKind};
use credhub_core::result::AppResult;
use credhub_entity::audit::{AuditAction, AuditEvent};

/// Repository for the append-only audit log.
#[derive(Debug, Clone)]
pub struct AuditEventRepository {
    pool: PgPool,
}

impl AuditEventRepository {
    /// Create a new audit event repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Append an audit event. The metadata value is expected to be
    /// sanitized by the caller before it reaches persistence.
    pub async fn create(
        &self,
        action: AuditAction,
        actor_id: Option<Uuid>,
        ip_address: Option<&str>,
        user_agent: Option<&str>,
        metadata: Option<&serde_json::Value>,
    ) -> AppResult<AuditEvent> {
        sqlx::query_as::<_, AuditEvent>(
            "INSERT INTO audit_events (action, actor_id, ip_address, user_agent, metadata) \
             VALUES ($1, $2, $3, $4, $5) RETURNING *",
        )
        .bind(action)
        .bind(actor_id)
        .bind(ip_address)
        .bind(user_agent)
        .bind(metadata)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to create audit event", e))
    }

    /// List events for an actor, most recent first.
    pub async fn find_by_actor(&self, actor_id: Uuid, limit: i64) -> AppResult<Vec<AuditEvent>> {
        sqlx::query_as::<_, AuditEvent>(
            "SELECT * FROM audit_events WHERE actor_id = $1 \
             ORDER BY created_at DESC LIMIT $2",
        )
        .bind(actor_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to list audit events", e)
        })
    }

    /// Count occurrences of an action since a specific time.
    pub async fn count_actions_since(
        &self,
        action: AuditAction,
        since: DateTime<Utc>,
    ) -> AppResult<i64> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM audit_events WHERE action = $1 AND created_at >= $2",
        )
        .bind(action)
        .bind(since)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to count audit events", e)
        })?;
        Ok(count)
    }
}
