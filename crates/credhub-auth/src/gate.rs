//! Authorization decisions: authentication, role checks, ownership.

use uuid::Uuid;

use credhub_core::{AppError, AppResult};
use credhub_entity::audit::{AuditAction, AuditMetadata, CreateAuditEvent};
use credhub_entity::user::UserRole;

use crate::audit::AuditRecorder;
use crate::context::RequestContext;
use crate::token::{AccessClaims, TokenCodec};

/// Makes authorization decisions for authenticated requests.
///
/// Pure role checks carry no audit weight; denials that reveal a caller
/// probing someone else's resources do, and those are masked as absence
/// rather than refusal.
#[derive(Clone)]
pub struct AuthorizationGate {
    codec: TokenCodec,
    audit: AuditRecorder,
}

impl AuthorizationGate {
    pub fn new(codec: TokenCodec, audit: AuditRecorder) -> Self {
        Self { codec, audit }
    }

    /// Extract and verify the caller's identity from an `Authorization`
    /// header value.
    pub fn authenticate(&self, authorization: Option<&str>) -> AppResult<AccessClaims> {
        let header =
            authorization.ok_or_else(|| AppError::unauthorized("Missing authorization header"))?;
        let token = header
            .strip_prefix("Bearer ")
            .ok_or_else(|| AppError::unauthorized("Missing authorization header"))?;
        self.codec.verify_access_token(token)
    }

    /// Check that a role satisfies a requirement. Admin satisfies every
    /// requirement; pure check, no audit.
    pub fn require_role(&self, actual: UserRole, required: UserRole) -> AppResult<()> {
        if actual.satisfies(&required) {
            Ok(())
        } else {
            Err(AppError::forbidden("Insufficient role"))
        }
    }

    /// Authorize access to a specific owned resource.
    ///
    /// Owners and admins pass. Everyone else gets `NotFound`, not
    /// `Forbidden`: a denial that confirmed the resource exists would let
    /// callers enumerate other users' resource ids. The real reason lands
    /// in the audit trail.
    pub async fn authorize_owned_resource(
        &self,
        claims: &AccessClaims,
        resource_id: Uuid,
        owner_id: Uuid,
        ctx: &RequestContext,
    ) -> AppResult<()> {
        if claims.sub == owner_id || claims.is_admin() {
            return Ok(());
        }

        self.audit
            .record(CreateAuditEvent {
                action: AuditAction::AccessDenied,
                actor_id: Some(claims.sub),
                ip_address: ctx.ip_string(),
                user_agent: ctx.user_agent.clone(),
                metadata: Some(AuditMetadata::AccessDenied {
                    resource_id: Some(resource_id),
                    reason: "not_owner".to_string(),
                }),
            })
            .await?;
        Err(AppError::not_found("Resource not found"))
    }

    /// Authorize a non-resource-specific capability, such as listing
    /// across all users. Requires admin; denial is a plain `Forbidden`
    /// since no individual resource's existence is at stake.
    pub async fn authorize_capability(
        &self,
        claims: &AccessClaims,
        capability: &str,
        ctx: &RequestContext,
    ) -> AppResult<()> {
        if claims.is_admin() {
            return Ok(());
        }

        self.audit
            .record(CreateAuditEvent {
                action: AuditAction::AccessDenied,
                actor_id: Some(claims.sub),
                ip_address: ctx.ip_string(),
                user_agent: ctx.user_agent.clone(),
                metadata: Some(AuditMetadata::AccessDenied {
                    resource_id: None,
                    reason: capability.to_string(),
                }),
            })
            .await?;
        Err(AppError::forbidden("Admin role required"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use credhub_core::config::auth::AuthConfig;
    use credhub_core::ErrorKind;

    fn codec() -> TokenCodec {
        TokenCodec::new(&AuthConfig::default())
    }

    fn gate() -> AuthorizationGate {
        let store = std::sync::Arc::new(crate::store::MemoryAuditStore::new());
        AuthorizationGate::new(codec(), AuditRecorder::new(store))
    }

    #[test]
    fn authenticate_requires_bearer_scheme() {
        let gate = gate();
        let issued = codec()
            .issue_access_token(Uuid::new_v4(), UserRole::User)
            .unwrap();

        assert_eq!(
            gate.authenticate(None).unwrap_err().kind,
            ErrorKind::Unauthorized
        );
        assert_eq!(
            gate.authenticate(Some(&issued.token)).unwrap_err().kind,
            ErrorKind::Unauthorized
        );
        let header = format!("Bearer {}", issued.token);
        assert!(gate.authenticate(Some(&header)).is_ok());
    }

    #[test]
    fn admin_satisfies_every_role() {
        let gate = gate();
        assert!(gate.require_role(UserRole::Admin, UserRole::User).is_ok());
        assert!(gate.require_role(UserRole::Admin, UserRole::Admin).is_ok());
        assert!(gate.require_role(UserRole::User, UserRole::User).is_ok());
        assert_eq!(
            gate.require_role(UserRole::User, UserRole::Admin)
                .unwrap_err()
                .kind,
            ErrorKind::Forbidden
        );
    }
}
