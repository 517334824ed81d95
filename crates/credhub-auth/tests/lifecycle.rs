//! End-to-end lifecycle tests against the in-memory stores.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{Duration, Utc};

use credhub_auth::store::{
    AuditRecord, AuditStore, MemoryAuditStore, MemorySessionStore, MemoryUserStore, SessionStore,
    UserStore,
};
use credhub_auth::{AuditRecorder, AuthorizationGate, RequestContext, SessionManager, TokenCodec};
use credhub_core::config::auth::AuthConfig;
use credhub_core::{AppError, AppResult, ErrorKind};
use credhub_entity::audit::AuditAction;
use credhub_entity::session::CreateRefreshSession;
use credhub_entity::user::UserRole;

struct Harness {
    manager: SessionManager,
    users: Arc<MemoryUserStore>,
    sessions: Arc<MemorySessionStore>,
    audit: Arc<MemoryAuditStore>,
    config: AuthConfig,
}

fn harness() -> Harness {
    let config = AuthConfig::default();
    let users = Arc::new(MemoryUserStore::new());
    let sessions = Arc::new(MemorySessionStore::new());
    let audit = Arc::new(MemoryAuditStore::new());
    let manager = SessionManager::new(
        &config,
        users.clone(),
        sessions.clone(),
        AuditRecorder::new(audit.clone()),
    );
    Harness {
        manager,
        users,
        sessions,
        audit,
        config,
    }
}

fn ctx() -> RequestContext {
    RequestContext::new(Some("203.0.113.9".parse().unwrap()), Some("test".into()))
}

const EMAIL: &str = "alice@example.com";
const PASSWORD: &str = "Correct-Horse-Battery-9!";

#[tokio::test]
async fn register_returns_decodable_tokens_and_hashes_the_password() {
    let h = harness();
    let result = h.manager.register(EMAIL, PASSWORD).await.unwrap();

    let claims = TokenCodec::new(&h.config)
        .verify_access_token(&result.tokens.access_token)
        .unwrap();
    assert_eq!(claims.sub, result.user.id);
    assert_eq!(claims.role, UserRole::User);

    let stored = h.users.find_by_email(EMAIL).await.unwrap().unwrap();
    assert_ne!(stored.password_hash, PASSWORD);
    assert!(!stored.password_hash.contains(PASSWORD));

    // The refresh secret itself is never stored, only its digest.
    assert!(h
        .sessions
        .find_by_digest(&result.tokens.refresh_token)
        .await
        .unwrap()
        .is_none());
}

#[tokio::test]
async fn register_rejects_duplicates_and_weak_input() {
    let h = harness();
    h.manager.register(EMAIL, PASSWORD).await.unwrap();

    let dup = h.manager.register(EMAIL, PASSWORD).await.unwrap_err();
    assert_eq!(dup.kind, ErrorKind::Conflict);

    let weak = h
        .manager
        .register("bob@example.com", "short")
        .await
        .unwrap_err();
    assert_eq!(weak.kind, ErrorKind::Validation);

    let bad_email = h.manager.register("not-an-email", PASSWORD).await.unwrap_err();
    assert_eq!(bad_email.kind, ErrorKind::Validation);
}

#[tokio::test]
async fn login_failures_are_indistinguishable_externally() {
    let h = harness();
    let user = h.manager.register(EMAIL, PASSWORD).await.unwrap().user;

    let unknown = h
        .manager
        .login("nobody@example.com", PASSWORD, &ctx())
        .await
        .unwrap_err();
    let wrong = h.manager.login(EMAIL, "Wrong-Password-9!", &ctx()).await.unwrap_err();

    assert_eq!(unknown.kind, wrong.kind);
    assert_eq!(unknown.message, wrong.message);

    // The audit trail keeps the distinction the caller never sees.
    let records = h.audit.records().await;
    assert_eq!(records.len(), 2);
    assert_eq!(records[0].action, AuditAction::LoginFailure);
    assert_eq!(records[0].actor_id, None);
    let meta = records[0].metadata.as_ref().unwrap();
    assert_eq!(meta["email"], "nobody@example.com");
    assert_eq!(records[1].actor_id, Some(user.id));
}

#[tokio::test]
async fn login_success_mints_a_pair_and_audits() {
    let h = harness();
    h.manager.register(EMAIL, PASSWORD).await.unwrap();

    let result = h.manager.login(EMAIL, PASSWORD, &ctx()).await.unwrap();
    assert!(!result.tokens.refresh_token.is_empty());

    assert_eq!(h.audit.count_action(AuditAction::LoginSuccess).await, 1);
    let records = h.audit.records().await;
    assert_eq!(records[0].ip_address.as_deref(), Some("203.0.113.9"));
}

#[tokio::test]
async fn refresh_rotates_and_replay_is_flagged_as_reuse() {
    let h = harness();
    let first = h.manager.register(EMAIL, PASSWORD).await.unwrap().tokens;

    let second = h.manager.refresh(&first.refresh_token, &ctx()).await.unwrap();
    assert_ne!(second.refresh_token, first.refresh_token);
    assert_eq!(h.audit.count_action(AuditAction::TokenRefresh).await, 1);

    // Replaying the consumed secret fails and is audited as reuse.
    let replay = h
        .manager
        .refresh(&first.refresh_token, &ctx())
        .await
        .unwrap_err();
    assert_eq!(replay.kind, ErrorKind::InvalidRefresh);
    assert_eq!(h.audit.count_action(AuditAction::TokenReuseAttempt).await, 1);

    // The new secret still works.
    h.manager.refresh(&second.refresh_token, &ctx()).await.unwrap();
}

#[tokio::test]
async fn refresh_distinguishes_not_found_from_expired_in_audit_only() {
    let h = harness();
    let user = h.manager.register(EMAIL, PASSWORD).await.unwrap().user;

    let missing = h.manager.refresh("no-such-secret", &ctx()).await.unwrap_err();
    assert_eq!(missing.kind, ErrorKind::InvalidRefresh);

    // Plant an already-expired session for a known secret.
    let generator = credhub_auth::RefreshTokenGenerator::new(&h.config);
    let secret = "planted-expired-secret";
    h.sessions
        .create(&CreateRefreshSession {
            user_id: user.id,
            token_digest: generator.digest_of(secret),
            expires_at: Utc::now() - Duration::days(1),
        })
        .await
        .unwrap();

    let expired = h.manager.refresh(secret, &ctx()).await.unwrap_err();
    assert_eq!(expired.kind, ErrorKind::InvalidRefresh);
    assert_eq!(expired.message, missing.message);

    let failures: Vec<_> = h
        .audit
        .records()
        .await
        .into_iter()
        .filter(|r| r.action == AuditAction::TokenRefreshFailure)
        .collect();
    assert_eq!(failures.len(), 2);
    assert_eq!(failures[0].metadata.as_ref().unwrap()["reason"], "not_found");
    assert_eq!(failures[1].metadata.as_ref().unwrap()["reason"], "expired");
}

#[tokio::test]
async fn concurrent_refresh_has_exactly_one_winner() {
    let h = harness();
    let tokens = h.manager.register(EMAIL, PASSWORD).await.unwrap().tokens;

    let m1 = h.manager.clone();
    let m2 = h.manager.clone();
    let s1 = tokens.refresh_token.clone();
    let s2 = tokens.refresh_token.clone();
    let (a, b) = tokio::join!(
        tokio::spawn(async move { m1.refresh(&s1, &ctx()).await }),
        tokio::spawn(async move { m2.refresh(&s2, &ctx()).await }),
    );

    let outcomes = [a.unwrap(), b.unwrap()];
    let wins = outcomes.iter().filter(|r| r.is_ok()).count();
    assert_eq!(wins, 1);
    assert_eq!(h.audit.count_action(AuditAction::TokenRefresh).await, 1);
}

#[tokio::test]
async fn logout_is_idempotent_to_the_caller() {
    let h = harness();
    let tokens = h.manager.register(EMAIL, PASSWORD).await.unwrap().tokens;

    h.manager.logout(&tokens.refresh_token, &ctx()).await.unwrap();
    h.manager.logout(&tokens.refresh_token, &ctx()).await.unwrap();
    h.manager.logout("never-issued", &ctx()).await.unwrap();

    assert_eq!(h.audit.count_action(AuditAction::Logout).await, 1);
    assert_eq!(h.audit.count_action(AuditAction::LogoutFailure).await, 2);

    // The revoked session refuses refresh afterwards.
    let err = h
        .manager
        .refresh(&tokens.refresh_token, &ctx())
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::InvalidRefresh);
}

#[tokio::test]
async fn role_change_flows_into_subsequent_tokens() {
    let h = harness();
    let alice = h.manager.register(EMAIL, PASSWORD).await.unwrap().user;
    let admin = h
        .manager
        .register("root@example.com", PASSWORD)
        .await
        .unwrap()
        .user;
    h.users.set_role(admin.id, UserRole::Admin).await.unwrap();

    let actions = credhub_auth::AdminActions::new(
        h.users.clone(),
        AuditRecorder::new(h.audit.clone()),
    );

    // Non-admin actors are denied and nothing changes.
    let denied = actions
        .change_role(alice.id, UserRole::User, admin.id, UserRole::User, &ctx())
        .await
        .unwrap_err();
    assert_eq!(denied.kind, ErrorKind::Forbidden);
    assert!(h.users.find_by_id(admin.id).await.unwrap().unwrap().is_admin());

    let updated = actions
        .change_role(admin.id, UserRole::Admin, alice.id, UserRole::Admin, &ctx())
        .await
        .unwrap();
    assert_eq!(updated.role, UserRole::Admin);
    assert_eq!(h.audit.count_action(AuditAction::RoleChange).await, 1);

    // A fresh login now carries the new role in the token.
    let login = h.manager.login(EMAIL, PASSWORD, &ctx()).await.unwrap();
    let claims = TokenCodec::new(&h.config)
        .verify_access_token(&login.tokens.access_token)
        .unwrap();
    assert_eq!(claims.role, UserRole::Admin);
}

#[tokio::test]
async fn role_change_to_missing_target_is_audited() {
    let h = harness();
    let admin = h.manager.register(EMAIL, PASSWORD).await.unwrap().user;
    h.users.set_role(admin.id, UserRole::Admin).await.unwrap();

    let actions = credhub_auth::AdminActions::new(
        h.users.clone(),
        AuditRecorder::new(h.audit.clone()),
    );
    let err = actions
        .change_role(
            admin.id,
            UserRole::Admin,
            uuid::Uuid::new_v4(),
            UserRole::Admin,
            &ctx(),
        )
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::NotFound);
    assert_eq!(h.audit.count_action(AuditAction::RoleChangeFailure).await, 1);
    let records = h.audit.records().await;
    let meta = records.last().unwrap().metadata.as_ref().unwrap();
    assert_eq!(meta["reason"], "user_not_found");
}

#[tokio::test]
async fn ownership_denial_masks_existence() {
    let h = harness();
    let codec = TokenCodec::new(&h.config);
    let gate = AuthorizationGate::new(codec.clone(), AuditRecorder::new(h.audit.clone()));

    let owner = uuid::Uuid::new_v4();
    let intruder = uuid::Uuid::new_v4();
    let resource = uuid::Uuid::new_v4();

    let issued = codec.issue_access_token(intruder, UserRole::User).unwrap();
    let claims = codec.verify_access_token(&issued.token).unwrap();

    let err = gate
        .authorize_owned_resource(&claims, resource, owner, &ctx())
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::NotFound);
    assert_eq!(err.message, "Resource not found");

    assert_eq!(h.audit.count_action(AuditAction::AccessDenied).await, 1);
    let records = h.audit.records().await;
    let meta = records[0].metadata.as_ref().unwrap();
    assert_eq!(meta["resource_id"], resource.to_string());
    assert_eq!(meta["reason"], "not_owner");

    // Admins and owners pass without audit noise.
    let admin_token = codec.issue_access_token(owner, UserRole::Admin).unwrap();
    let admin_claims = codec.verify_access_token(&admin_token.token).unwrap();
    gate.authorize_owned_resource(&admin_claims, resource, uuid::Uuid::new_v4(), &ctx())
        .await
        .unwrap();
    assert_eq!(h.audit.count_action(AuditAction::AccessDenied).await, 1);
}

#[tokio::test]
async fn capability_denial_is_forbidden_not_masked() {
    let h = harness();
    let codec = TokenCodec::new(&h.config);
    let gate = AuthorizationGate::new(codec.clone(), AuditRecorder::new(h.audit.clone()));

    let issued = codec
        .issue_access_token(uuid::Uuid::new_v4(), UserRole::User)
        .unwrap();
    let claims = codec.verify_access_token(&issued.token).unwrap();

    let err = gate
        .authorize_capability(&claims, "list_all_users", &ctx())
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::Forbidden);

    let records = h.audit.records().await;
    let meta = records[0].metadata.as_ref().unwrap();
    assert_eq!(meta["reason"], "list_all_users");
    assert!(meta["resource_id"].is_null());
}

struct FailingAuditStore;

#[async_trait]
impl AuditStore for FailingAuditStore {
    async fn append(&self, _record: AuditRecord) -> AppResult<()> {
        Err(AppError::database("audit storage unavailable"))
    }
}

#[tokio::test]
async fn audit_failure_fails_the_operation() {
    let config = AuthConfig::default();
    let users = Arc::new(MemoryUserStore::new());
    let sessions = Arc::new(MemorySessionStore::new());
    let manager = SessionManager::new(
        &config,
        users.clone(),
        sessions,
        AuditRecorder::new(Arc::new(FailingAuditStore)),
    );

    // Registration writes no audit row, so it still succeeds.
    manager.register(EMAIL, PASSWORD).await.unwrap();

    // A failed login must be audited; when it cannot be, the operation
    // surfaces the storage error instead of the credential error.
    let err = manager
        .login(EMAIL, "Wrong-Password-9!", &ctx())
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::Database);

    // Same for a successful login: no audit row, no session handed out.
    let err = manager.login(EMAIL, PASSWORD, &ctx()).await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::Database);
}
