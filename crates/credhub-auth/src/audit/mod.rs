//! Synchronous audit recording.

pub mod recorder;

pub use recorder::AuditRecorder;
