//! Session lifecycle manager.
//!
//! Owns the register/login/refresh/logout state machine: each refresh
//! session moves `ACTIVE -> REVOKED` exactly once, expiry is derived from
//! the clock, and every security-relevant outcome lands in the audit log
//! before the operation returns.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{info, warn};
use validator::ValidateEmail;

use credhub_core::config::auth::AuthConfig;
use credhub_core::{AppError, AppResult};
use credhub_entity::audit::{AuditAction, AuditMetadata, CreateAuditEvent, RefreshFailureReason};
use credhub_entity::session::CreateRefreshSession;
use credhub_entity::user::{CreateUser, User, UserRole};

use crate::audit::AuditRecorder;
use crate::context::RequestContext;
use crate::password::{PasswordHasher, PasswordPolicy};
use crate::store::{SessionStore, UserStore};
use crate::token::{RefreshTokenGenerator, TokenCodec};

/// One freshly minted access/refresh pair.
#[derive(Debug, Clone, Serialize)]
pub struct TokenPair {
    /// Signed access token.
    pub access_token: String,
    /// Access token expiry.
    pub access_expires_at: DateTime<Utc>,
    /// Opaque refresh secret. Shown to the caller exactly once.
    pub refresh_token: String,
    /// Refresh session expiry.
    pub refresh_expires_at: DateTime<Utc>,
}

/// Result of a successful registration or login.
#[derive(Debug, Clone)]
pub struct LoginResult {
    /// The authenticated user.
    pub user: User,
    /// The minted token pair.
    pub tokens: TokenPair,
}

/// Orchestrates the credential and session lifecycle.
///
/// Talks to storage only through the store traits, so the same logic runs
/// against Postgres in production and the in-memory stores in tests.
#[derive(Clone)]
pub struct SessionManager {
    users: Arc<dyn UserStore>,
    sessions: Arc<dyn SessionStore>,
    audit: AuditRecorder,
    hasher: PasswordHasher,
    policy: PasswordPolicy,
    codec: TokenCodec,
    refresh: RefreshTokenGenerator,
}

impl SessionManager {
    pub fn new(
        config: &AuthConfig,
        users: Arc<dyn UserStore>,
        sessions: Arc<dyn SessionStore>,
        audit: AuditRecorder,
    ) -> Self {
        Self {
            users,
            sessions,
            audit,
            hasher: PasswordHasher::new(),
            policy: PasswordPolicy::new(config),
            codec: TokenCodec::new(config),
            refresh: RefreshTokenGenerator::new(config),
        }
    }

    /// Register a new account and start its first session.
    ///
    /// Validation failures and duplicate emails reject the registration;
    /// success returns the user together with a fresh token pair.
    pub async fn register(&self, email: &str, password: &str) -> AppResult<LoginResult> {
        if !email.validate_email() {
            return Err(AppError::validation("Invalid email address"));
        }
        self.policy.validate(password)?;

        let password_hash = self.hasher.hash(password)?;
        let user = self
            .users
            .create(&CreateUser {
                email: email.to_string(),
                password_hash,
                role: UserRole::User,
            })
            .await?;

        let tokens = self.issue_tokens(&user).await?;
        info!(user_id = %user.id, "user registered");

        Ok(LoginResult { user, tokens })
    }

    /// Authenticate with email and password.
    ///
    /// Unknown user and wrong password return the same error; the audit
    /// trail keeps the distinction (actor absent vs. actor identified).
    pub async fn login(
        &self,
        email: &str,
        password: &str,
        ctx: &RequestContext,
    ) -> AppResult<LoginResult> {
        let user = match self.users.find_by_email(email).await? {
            Some(user) => user,
            None => {
                self.audit
                    .record(CreateAuditEvent {
                        action: AuditAction::LoginFailure,
                        actor_id: None,
                        ip_address: ctx.ip_string(),
                        user_agent: ctx.user_agent.clone(),
                        metadata: Some(AuditMetadata::LoginFailure {
                            email: email.to_string(),
                        }),
                    })
                    .await?;
                return Err(AppError::invalid_credentials("Invalid email or password"));
            }
        };

        if !self.hasher.verify(&user.password_hash, password)? {
            self.audit
                .record(CreateAuditEvent {
                    action: AuditAction::LoginFailure,
                    actor_id: Some(user.id),
                    ip_address: ctx.ip_string(),
                    user_agent: ctx.user_agent.clone(),
                    metadata: Some(AuditMetadata::LoginFailure {
                        email: email.to_string(),
                    }),
                })
                .await?;
            return Err(AppError::invalid_credentials("Invalid email or password"));
        }

        let tokens = self.issue_tokens(&user).await?;
        self.audit
            .record(CreateAuditEvent {
                action: AuditAction::LoginSuccess,
                actor_id: Some(user.id),
                ip_address: ctx.ip_string(),
                user_agent: ctx.user_agent.clone(),
                metadata: None,
            })
            .await?;
        info!(user_id = %user.id, "login succeeded");

        Ok(LoginResult { user, tokens })
    }

    /// Exchange a refresh secret for a new token pair, rotating the
    /// session.
    ///
    /// Each secret is exchangeable exactly once. Presenting a revoked
    /// secret is treated as evidence of theft and audited as reuse; the
    /// caller only ever learns that the refresh failed.
    pub async fn refresh(&self, secret: &str, ctx: &RequestContext) -> AppResult<TokenPair> {
        let digest = self.refresh.digest_of(secret);
        let session = self.sessions.find_by_digest(&digest).await?;

        let session = match session {
            None => {
                self.audit
                    .record(CreateAuditEvent {
                        action: AuditAction::TokenRefreshFailure,
                        actor_id: None,
                        ip_address: ctx.ip_string(),
                        user_agent: ctx.user_agent.clone(),
                        metadata: Some(AuditMetadata::RefreshFailure {
                            reason: RefreshFailureReason::NotFound,
                        }),
                    })
                    .await?;
                return Err(AppError::invalid_refresh("Invalid refresh token"));
            }
            Some(session) => session,
        };

        if let Some(revoked_at) = session.revoked_at {
            warn!(
                session_id = %session.id,
                user_id = %session.user_id,
                "revoked refresh secret replayed"
            );
            self.audit
                .record(CreateAuditEvent {
                    action: AuditAction::TokenReuseAttempt,
                    actor_id: Some(session.user_id),
                    ip_address: ctx.ip_string(),
                    user_agent: ctx.user_agent.clone(),
                    metadata: Some(AuditMetadata::TokenReuse {
                        session_id: session.id,
                        revoked_at,
                    }),
                })
                .await?;
            return Err(AppError::invalid_refresh("Invalid refresh token"));
        }

        if session.is_expired_at(Utc::now()) {
            self.audit
                .record(CreateAuditEvent {
                    action: AuditAction::TokenRefreshFailure,
                    actor_id: Some(session.user_id),
                    ip_address: ctx.ip_string(),
                    user_agent: ctx.user_agent.clone(),
                    metadata: Some(AuditMetadata::RefreshFailure {
                        reason: RefreshFailureReason::Expired,
                    }),
                })
                .await?;
            return Err(AppError::invalid_refresh("Invalid refresh token"));
        }

        // Losing the conditional revoke means another presentation of the
        // same secret won the exchange; for this caller that is
        // indistinguishable from replaying a revoked secret.
        if !self.sessions.revoke(session.id).await? {
            self.audit
                .record(CreateAuditEvent {
                    action: AuditAction::TokenReuseAttempt,
                    actor_id: Some(session.user_id),
                    ip_address: ctx.ip_string(),
                    user_agent: ctx.user_agent.clone(),
                    metadata: Some(AuditMetadata::TokenReuse {
                        session_id: session.id,
                        revoked_at: Utc::now(),
                    }),
                })
                .await?;
            return Err(AppError::invalid_refresh("Invalid refresh token"));
        }

        let user = self
            .users
            .find_by_id(session.user_id)
            .await?
            .ok_or_else(|| AppError::invalid_refresh("Invalid refresh token"))?;

        let tokens = self.issue_tokens(&user).await?;
        self.audit
            .record(CreateAuditEvent {
                action: AuditAction::TokenRefresh,
                actor_id: Some(user.id),
                ip_address: ctx.ip_string(),
                user_agent: ctx.user_agent.clone(),
                metadata: None,
            })
            .await?;
        info!(user_id = %user.id, old_session_id = %session.id, "refresh token rotated");

        Ok(tokens)
    }

    /// Revoke the session behind a refresh secret.
    ///
    /// Idempotent to the caller: repeating a logout, or presenting an
    /// unknown secret, still returns `Ok(())`. The audit trail records
    /// which case it was.
    pub async fn logout(&self, secret: &str, ctx: &RequestContext) -> AppResult<()> {
        let digest = self.refresh.digest_of(secret);
        let session = self.sessions.find_by_digest(&digest).await?;

        let active = match &session {
            Some(s) => s.is_active_at(Utc::now()) && self.sessions.revoke(s.id).await?,
            None => false,
        };

        if active {
            let session = session.as_ref().ok_or_else(|| {
                AppError::internal("Session vanished between lookup and revocation")
            })?;
            self.audit
                .record(CreateAuditEvent {
                    action: AuditAction::Logout,
                    actor_id: Some(session.user_id),
                    ip_address: ctx.ip_string(),
                    user_agent: ctx.user_agent.clone(),
                    metadata: Some(AuditMetadata::Logout {
                        session_id: session.id,
                    }),
                })
                .await?;
            info!(session_id = %session.id, "session revoked by logout");
        } else {
            self.audit
                .record(CreateAuditEvent {
                    action: AuditAction::LogoutFailure,
                    actor_id: session.as_ref().map(|s| s.user_id),
                    ip_address: ctx.ip_string(),
                    user_agent: ctx.user_agent.clone(),
                    metadata: Some(AuditMetadata::LogoutFailure {
                        reason: "not_found".to_string(),
                    }),
                })
                .await?;
        }

        Ok(())
    }

    /// Mint an access token and open a fresh refresh session.
    async fn issue_tokens(&self, user: &User) -> AppResult<TokenPair> {
        let access = self.codec.issue_access_token(user.id, user.role)?;
        let issued = self.refresh.generate();

        self.sessions
            .create(&CreateRefreshSession {
                user_id: user.id,
                token_digest: issued.digest,
                expires_at: issued.expires_at,
            })
            .await?;

        Ok(TokenPair {
            access_token: access.token,
            access_expires_at: access.expires_at,
            refresh_token: issued.secret,
            refresh_expires_at: issued.expires_at,
        })
    }
}
