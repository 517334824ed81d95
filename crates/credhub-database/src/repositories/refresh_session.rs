//! Refresh session repository implementation.

use sqlx::PgPool;
use uuid::Uuid;

use credhub_core::error::{AppError, ErrorKind};
use credhub_core::result::AppResult;
use credhub_entity::session::{CreateRefreshSession, RefreshSession};

/// Repository for refresh session rows.
///
/// Rows are inserted and conditionally revoked, never deleted: revoked
/// sessions are retained as evidence for reuse detection.
#[derive(Debug, Clone)]
pub struct RefreshSessionRepository {
    pool: PgPool,
}

impl RefreshSessionRepository {
    /// Create a new refresh session repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Insert a new refresh session.
    pub async fn create(&self, data: &CreateRefreshSession) -> AppResult<RefreshSession> {
        sqlx::query_as::<_, RefreshSession>(
            "INSERT INTO refresh_sessions (user_id, token_digest, expires_at) \
             VALUES ($1, $2, $3) RETURNING *",
        )
        .bind(data.user_id)
        .bind(&data.token_digest)
        .bind(data.expires_at)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to create refresh session", e)
        })
    }

    /// Find a session by secret digest, in any revocation state.
    ///
    /// Revoked rows must be returned too: finding one is the reuse signal.
    pub async fn find_by_digest(&self, digest: &str) -> AppResult<Option<RefreshSession>> {
        sqlx::query_as::<_, RefreshSession>(
            "SELECT * FROM refresh_sessions WHERE token_digest = $1",
        )
        .bind(digest)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to find session by digest", e)
        })
    }

    /// Conditionally revoke a session.
    ///
    /// Single atomic update: the row transitions only if it is currently
    /// un-revoked, so two concurrent presentations of the same secret can
    /// never both observe "still valid". Returns `true` iff this call
    /// performed the transition; revoking an already-revoked session is a
    /// no-op, not an error.
    pub async fn revoke(&self, session_id: Uuid) -> AppResult<bool> {
        let result = sqlx::query(
            "UPDATE refresh_sessions SET revoked_at = NOW() \
             WHERE id = $1 AND revoked_at IS NULL",
        )
        .bind(session_id)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to revoke session", e))?;

        Ok(result.rows_affected() > 0)
    }
}
