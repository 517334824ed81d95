//! Administrator actions on user accounts.

use std::sync::Arc;

use tracing::info;
use uuid::Uuid;

use credhub_core::{AppError, AppResult};
use credhub_entity::audit::{AuditAction, AuditMetadata, CreateAuditEvent};
use credhub_entity::user::{User, UserRole};

use crate::audit::AuditRecorder;
use crate::context::RequestContext;
use crate::store::UserStore;

/// Administrative operations. Every call re-checks the actor's role;
/// callers cannot opt out of the check by reaching the store directly.
#[derive(Clone)]
pub struct AdminActions {
    users: Arc<dyn UserStore>,
    audit: AuditRecorder,
}

impl AdminActions {
    pub fn new(users: Arc<dyn UserStore>, audit: AuditRecorder) -> Self {
        Self { users, audit }
    }

    /// Change a user's role.
    ///
    /// Non-admin actors are denied before any row is touched; a missing
    /// target is a distinct auditable failure.
    pub async fn change_role(
        &self,
        actor_id: Uuid,
        actor_role: UserRole,
        target_id: Uuid,
        new_role: UserRole,
        ctx: &RequestContext,
    ) -> AppResult<User> {
        if !actor_role.is_admin() {
            self.audit
                .record(CreateAuditEvent {
                    action: AuditAction::AccessDenied,
                    actor_id: Some(actor_id),
                    ip_address: ctx.ip_string(),
                    user_agent: ctx.user_agent.clone(),
                    metadata: Some(AuditMetadata::AccessDenied {
                        resource_id: Some(target_id),
                        reason: "admin_required".to_string(),
                    }),
                })
                .await?;
            return Err(AppError::forbidden("Admin role required"));
        }

        let updated = match self.users.set_role(target_id, new_role).await? {
            Some(user) => user,
            None => {
                self.audit
                    .record(CreateAuditEvent {
                        action: AuditAction::RoleChangeFailure,
                        actor_id: Some(actor_id),
                        ip_address: ctx.ip_string(),
                        user_agent: ctx.user_agent.clone(),
                        metadata: Some(AuditMetadata::RoleChangeFailure {
                            target_user_id: target_id,
                            reason: "user_not_found".to_string(),
                        }),
                    })
                    .await?;
                return Err(AppError::not_found("User not found"));
            }
        };

        self.audit
            .record(CreateAuditEvent {
                action: AuditAction::RoleChange,
                actor_id: Some(actor_id),
                ip_address: ctx.ip_string(),
                user_agent: ctx.user_agent.clone(),
                metadata: Some(AuditMetadata::RoleChange {
                    target_user_id: target_id,
                    new_role,
                }),
            })
            .await?;
        info!(actor_id = %actor_id, target_id = %target_id, new_role = %new_role, "role changed");

        Ok(updated)
    }
}
