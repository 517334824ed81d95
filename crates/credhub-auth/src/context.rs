//! Per-request caller context.

use std::net::IpAddr;

/// Caller context attached to lifecycle operations for audit purposes.
///
/// Both fields come from the transport collaborator and may be absent;
/// the lifecycle logic itself never depends on them.
#[derive(Debug, Clone, Default)]
pub struct RequestContext {
    /// Caller network address.
    pub ip: Option<IpAddr>,
    /// Caller agent string.
    pub user_agent: Option<String>,
}

impl RequestContext {
    /// Build a context from already-stringified transport values.
    pub fn new(ip: Option<IpAddr>, user_agent: Option<String>) -> Self {
        Self { ip, user_agent }
    }

    /// The IP address rendered for storage.
    pub fn ip_string(&self) -> Option<String> {
        self.ip.map(|ip| ip.to_string())
    }
}
