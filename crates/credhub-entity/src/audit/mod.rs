//! Audit event entity, action vocabulary, and metadata variants.

pub mod action;
pub mod metadata;
pub mod model;

pub use action::AuditAction;
pub use metadata::{AuditMetadata, RefreshFailureReason};
pub use model::{AuditEvent, CreateAuditEvent};
