//! Audit recorder: serialization, sanitization, and mandatory persistence.

use std::sync::Arc;

use tracing::warn;

use credhub_core::{AppError, AppResult};
use credhub_entity::audit::CreateAuditEvent;

use crate::store::{AuditRecord, AuditStore};

/// Keys whose values must never reach the audit log, compared
/// case-insensitively against each object key.
const SECRET_KEYS: &[&str] = &[
    "password",
    "password_hash",
    "token",
    "access_token",
    "refresh_token",
    "secret",
];

/// Records audit events synchronously, in the same logical operation as
/// the action they describe.
///
/// Recording is mandatory: an append failure propagates to the caller and
/// fails the surrounding operation, so the audit trail can never silently
/// fall behind the state it describes.
#[derive(Clone)]
pub struct AuditRecorder {
    store: Arc<dyn AuditStore>,
}

impl AuditRecorder {
    pub fn new(store: Arc<dyn AuditStore>) -> Self {
        Self { store }
    }

    /// Serialize, sanitize, and persist one audit event.
    pub async fn record(&self, event: CreateAuditEvent) -> AppResult<()> {
        let metadata = match &event.metadata {
            Some(meta) => {
                let value = serde_json::to_value(meta).map_err(AppError::from)?;
                Some(sanitize(value))
            }
            None => None,
        };

        let record = AuditRecord {
            action: event.action,
            actor_id: event.actor_id,
            ip_address: event.ip_address,
            user_agent: event.user_agent,
            metadata,
        };

        if let Err(e) = self.store.append(record).await {
            warn!(action = %event.action, error = %e, "audit append failed");
            return Err(e);
        }
        Ok(())
    }
}

/// Strip secret-bearing keys from a metadata value, recursively.
///
/// The metadata payloads are a closed set that never carries secrets, but
/// the stored value is scrubbed anyway so a future payload variant cannot
/// leak one by accident.
fn sanitize(value: serde_json::Value) -> serde_json::Value {
    match value {
        serde_json::Value::Object(map) => serde_json::Value::Object(
            map.into_iter()
                .filter(|(key, _)| {
                    let lowered = key.to_lowercase();
                    !SECRET_KEYS.iter().any(|s| lowered == *s)
                })
                .map(|(key, inner)| (key, sanitize(inner)))
                .collect(),
        ),
        serde_json::Value::Array(items) => {
            serde_json::Value::Array(items.into_iter().map(sanitize).collect())
        }
        other => other,
    }
}
