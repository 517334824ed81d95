//! Concrete PostgreSQL repositories.

pub mod audit;
pub mod refresh_session;
pub mod user;

pub use audit::AuditEventRepository;
pub use refresh_session::RefreshSessionRepository;
pub use user::UserRepository;
