//! Audit event entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use super::action::AuditAction;
use super::metadata::AuditMetadata;

/// An immutable, append-only audit record.
///
/// Written synchronously by every security-relevant outcome, success or
/// failure; never mutated or deleted by this subsystem.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct AuditEvent {
    /// Unique audit entry identifier.
    pub id: Uuid,
    /// The action that occurred.
    pub action: AuditAction,
    /// The acting user, when one could be identified.
    pub actor_id: Option<Uuid>,
    /// Caller network address, as reported by the transport collaborator.
    pub ip_address: Option<String>,
    /// Caller agent string.
    pub user_agent: Option<String>,
    /// Sanitized structured payload (JSON form of [`AuditMetadata`]).
    pub metadata: Option<serde_json::Value>,
    /// When the event was recorded.
    pub created_at: DateTime<Utc>,
}

/// Data required to append a new audit event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateAuditEvent {
    /// The action that occurred.
    pub action: AuditAction,
    /// The acting user, if identified.
    pub actor_id: Option<Uuid>,
    /// Caller network address.
    pub ip_address: Option<String>,
    /// Caller agent string.
    pub user_agent: Option<String>,
    /// Structured payload; sanitized by the recorder before persistence.
    pub metadata: Option<AuditMetadata>,
}
