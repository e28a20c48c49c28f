//! End-to-end scenario tests for the auth module
//!
//! The register/login/logout flow runs through the real router and
//! authenticator middleware; the administrative safety rules are exercised
//! at the use-case level against the in-memory stores.

use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use serde_json::{Value, json};
use tower::ServiceExt;

use platform::password::RawPassword;
use platform::token::TokenCodec;

use crate::application::{
    ChangeUserRoleUseCase, DeleteUserUseCase, LoginUserUseCase, RegisterInput,
    RegisterUserUseCase, UnlockUserUseCase,
};
use crate::application::config::AuthConfig;
use crate::domain::entity::account::Account;
use crate::domain::repository::UserStore;
use crate::domain::value_object::{email::Email, role::Role, username::Username};
use crate::error::AuthError;
use crate::infra::memory::{InMemoryTokenDenylist, InMemoryUserStore};
use crate::presentation::router::api_router;

// ============================================================================
// Fixtures
// ============================================================================

fn test_config() -> Arc<AuthConfig> {
    Arc::new(AuthConfig::with_random_secret())
}

fn test_codec(config: &AuthConfig) -> Arc<TokenCodec> {
    Arc::new(TokenCodec::new(&config.jwt_secret, config.token_validity).unwrap())
}

struct TestEnv {
    store: Arc<InMemoryUserStore>,
    denylist: Arc<InMemoryTokenDenylist>,
    codec: Arc<TokenCodec>,
    config: Arc<AuthConfig>,
}

impl TestEnv {
    fn new() -> Self {
        let config = test_config();
        Self {
            store: Arc::new(InMemoryUserStore::new()),
            denylist: Arc::new(InMemoryTokenDenylist::new()),
            codec: test_codec(&config),
            config,
        }
    }

    fn router(&self) -> Router {
        api_router(
            self.store.clone(),
            self.denylist.clone(),
            self.codec.clone(),
            self.config.clone(),
        )
    }

    /// Insert an account directly, hashing the given password.
    async fn seed(&self, username: &str, email: &str, password: &str, role: Role) -> Account {
        let hash = RawPassword::new(password.to_string())
            .unwrap()
            .hash()
            .unwrap();
        let account = Account::create(
            Username::new(username).unwrap(),
            Email::new(email).unwrap(),
            hash,
            role,
        );
        self.store.save(&account).await.unwrap();
        account
    }
}

async fn send(router: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), 1024 * 1024)
        .await
        .unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, body)
}

fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::post(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn get_with_token(uri: &str, token: &str) -> Request<Body> {
    Request::get(uri)
        .header(header::AUTHORIZATION, format!("Bearer {token}"))
        .body(Body::empty())
        .unwrap()
}

// ============================================================================
// Scenario 1: register → login → protected fetch → logout → replay rejected
// ============================================================================

#[tokio::test]
async fn test_register_login_fetch_logout_replay() {
    let env = TestEnv::new();
    let router = env.router();

    // Register
    let (status, body) = send(
        &router,
        post_json(
            "/api/auth/register",
            json!({"username": "alice", "email": "a@x.io", "password": "P@ssw0rd-long"}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["user"]["username"], "alice");
    let token = body["token"].as_str().unwrap().to_string();

    // Protected fetch with the fresh token
    let (status, body) = send(&router, get_with_token("/api/users/me", &token)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["username"], "alice");
    assert_eq!(body["role"], "USER");

    // Logout revokes the token
    let (status, _) = send(
        &router,
        Request::post("/api/auth/logout")
            .header(header::AUTHORIZATION, format!("Bearer {token}"))
            .body(Body::empty())
            .unwrap(),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    // Replay is rejected
    let (status, _) = send(&router, get_with_token("/api/users/me", &token)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_me_without_token_is_unauthorized() {
    let env = TestEnv::new();
    let router = env.router();

    let (status, _) = send(
        &router,
        Request::get("/api/users/me").body(Body::empty()).unwrap(),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_login_endpoint_issues_usable_token() {
    let env = TestEnv::new();
    env.seed("alice", "a@x.io", "P@ssw0rd-long", Role::User).await;
    let router = env.router();

    let (status, body) = send(
        &router,
        post_json(
            "/api/auth/login",
            json!({"username": "alice", "password": "P@ssw0rd-long"}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let token = body["token"].as_str().unwrap();
    let (status, _) = send(&router, get_with_token("/api/users/me", token)).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_logout_without_header_is_bad_request() {
    let env = TestEnv::new();
    let router = env.router();

    let (status, _) = send(
        &router,
        Request::post("/api/auth/logout")
            .body(Body::empty())
            .unwrap(),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_duplicate_registration_conflicts() {
    let env = TestEnv::new();
    let router = env.router();

    let request = || {
        post_json(
            "/api/auth/register",
            json!({"username": "alice", "email": "a@x.io", "password": "P@ssw0rd-long"}),
        )
    };
    let (status, _) = send(&router, request()).await;
    assert_eq!(status, StatusCode::CREATED);
    let (status, _) = send(&router, request()).await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_registration_validation_is_bad_request() {
    let env = TestEnv::new();
    let router = env.router();

    // Username too short
    let (status, _) = send(
        &router,
        post_json(
            "/api/auth/register",
            json!({"username": "ab", "email": "a@x.io", "password": "P@ssw0rd-long"}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    // Email without '@'
    let (status, _) = send(
        &router,
        post_json(
            "/api/auth/register",
            json!({"username": "alice", "email": "not-an-email", "password": "P@ssw0rd-long"}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

// ============================================================================
// Scenario 2: credential failure count and lockout
// ============================================================================

#[tokio::test]
async fn test_failed_logins_accumulate_and_lock() {
    let env = TestEnv::new();
    let bob = env.seed("bob", "bob@x.io", "Correct-h0rse!", Role::User).await;

    let login = LoginUserUseCase::new(env.store.clone(), env.codec.clone(), env.config.clone());

    for expected in 1..=4u32 {
        let err = login
            .execute("bob", "Wrong-passw0rd!".to_string())
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::InvalidCredentials));

        let persisted = env.store.find_by_id(bob.id()).await.unwrap().unwrap();
        assert_eq!(persisted.failed_login_attempts(), expected);
        assert!(!persisted.is_locked());
    }

    // Fifth failure locks
    let err = login
        .execute("bob", "Wrong-passw0rd!".to_string())
        .await
        .unwrap_err();
    assert!(matches!(err, AuthError::InvalidCredentials));

    let persisted = env.store.find_by_id(bob.id()).await.unwrap().unwrap();
    assert_eq!(persisted.failed_login_attempts(), 5);
    assert!(persisted.is_locked());

    // Correct password no longer helps
    let err = login
        .execute("bob", "Correct-h0rse!".to_string())
        .await
        .unwrap_err();
    assert!(matches!(err, AuthError::Locked));
}

#[tokio::test]
async fn test_successful_login_resets_counter() {
    let env = TestEnv::new();
    let bob = env.seed("bob", "bob@x.io", "Correct-h0rse!", Role::User).await;

    let login = LoginUserUseCase::new(env.store.clone(), env.codec.clone(), env.config.clone());

    for _ in 0..3 {
        let _ = login.execute("bob", "Wrong-passw0rd!".to_string()).await;
    }
    assert_eq!(
        env.store
            .find_by_id(bob.id())
            .await
            .unwrap()
            .unwrap()
            .failed_login_attempts(),
        3
    );

    login
        .execute("bob", "Correct-h0rse!".to_string())
        .await
        .unwrap();

    assert_eq!(
        env.store
            .find_by_id(bob.id())
            .await
            .unwrap()
            .unwrap()
            .failed_login_attempts(),
        0
    );
}

#[tokio::test]
async fn test_unknown_user_and_wrong_password_are_indistinguishable() {
    let env = TestEnv::new();
    env.seed("bob", "bob@x.io", "Correct-h0rse!", Role::User).await;

    let login = LoginUserUseCase::new(env.store.clone(), env.codec.clone(), env.config.clone());

    let unknown = login
        .execute("nobody", "Whatever-pass1!".to_string())
        .await
        .unwrap_err();
    let wrong = login
        .execute("bob", "Wrong-passw0rd!".to_string())
        .await
        .unwrap_err();

    assert_eq!(unknown.to_string(), wrong.to_string());
}

#[tokio::test]
async fn test_unlock_after_lockout_allows_login() {
    let env = TestEnv::new();
    let bob = env.seed("bob", "bob@x.io", "Correct-h0rse!", Role::User).await;

    let login = LoginUserUseCase::new(env.store.clone(), env.codec.clone(), env.config.clone());
    for _ in 0..5 {
        let _ = login.execute("bob", "Wrong-passw0rd!".to_string()).await;
    }
    assert!(matches!(
        login
            .execute("bob", "Correct-h0rse!".to_string())
            .await
            .unwrap_err(),
        AuthError::Locked
    ));

    UnlockUserUseCase::new(env.store.clone())
        .execute(bob.id())
        .await
        .unwrap();

    login
        .execute("bob", "Correct-h0rse!".to_string())
        .await
        .unwrap();
}

// ============================================================================
// Scenario 3: super-admin indelible
// ============================================================================

#[tokio::test]
async fn test_super_admin_cannot_be_deleted() {
    let env = TestEnv::new();
    let root = env.seed("root-user", "root@x.io", "Sup3r-secret!", Role::SuperAdmin).await;
    let admin = env.seed("carol", "carol@x.io", "Adm1n-secret!", Role::Admin).await;

    let delete = DeleteUserUseCase::new(env.store.clone());
    let err = delete.execute(root.id(), &admin).await.unwrap_err();

    match err {
        AuthError::Forbidden(msg) => {
            assert_eq!(msg, "SUPER_ADMIN accounts cannot be deleted")
        }
        other => panic!("expected Forbidden, got {other:?}"),
    }

    // Store unchanged
    assert!(env.store.find_by_id(root.id()).await.unwrap().is_some());
}

#[tokio::test]
async fn test_user_may_only_delete_own_account() {
    let env = TestEnv::new();
    let alice = env.seed("alice", "a@x.io", "P@ssw0rd-long", Role::User).await;
    let bob = env.seed("bob", "bob@x.io", "P@ssw0rd-long2", Role::User).await;

    let delete = DeleteUserUseCase::new(env.store.clone());

    let err = delete.execute(bob.id(), &alice).await.unwrap_err();
    match err {
        AuthError::Forbidden(msg) => assert_eq!(msg, "Users may only delete their own account"),
        other => panic!("expected Forbidden, got {other:?}"),
    }

    // Self-delete is allowed
    delete.execute(alice.id(), &alice).await.unwrap();
    assert!(env.store.find_by_id(alice.id()).await.unwrap().is_none());
}

#[tokio::test]
async fn test_delete_missing_user_is_not_found() {
    let env = TestEnv::new();
    let admin = env.seed("carol", "carol@x.io", "Adm1n-secret!", Role::Admin).await;

    let phantom = Account::create(
        Username::new("ghost").unwrap(),
        Email::new("ghost@x.io").unwrap(),
        RawPassword::new("Gh0st-secret!".to_string())
            .unwrap()
            .hash()
            .unwrap(),
        Role::User,
    );

    let delete = DeleteUserUseCase::new(env.store.clone());
    let err = delete.execute(phantom.id(), &admin).await.unwrap_err();
    assert!(matches!(err, AuthError::NotFound(_)));
}

// ============================================================================
// Scenario 4: last-admin protection
// ============================================================================

#[tokio::test]
async fn test_last_admin_protection() {
    let env = TestEnv::new();
    let admin = env.seed("carol", "carol@x.io", "Adm1n-secret!", Role::Admin).await;
    let user = env.seed("dave", "dave@x.io", "P@ssw0rd-long", Role::User).await;

    let delete = DeleteUserUseCase::new(env.store.clone());

    // The only ADMIN, no SUPER_ADMIN: even self-delete is blocked
    let err = delete.execute(admin.id(), &admin).await.unwrap_err();
    match err {
        AuthError::Forbidden(msg) => assert_eq!(msg, "Cannot delete the last ADMIN"),
        other => panic!("expected Forbidden, got {other:?}"),
    }

    // Promote a second user to ADMIN, then the deletion goes through
    let change_role = ChangeUserRoleUseCase::new(env.store.clone());
    change_role
        .execute(user.id(), Role::Admin, &admin, Role::Admin)
        .await
        .unwrap();

    delete.execute(admin.id(), &admin).await.unwrap();
    assert!(env.store.find_by_id(admin.id()).await.unwrap().is_none());
}

#[tokio::test]
async fn test_admin_deletable_when_super_admin_exists() {
    let env = TestEnv::new();
    env.seed("root-user", "root@x.io", "Sup3r-secret!", Role::SuperAdmin).await;
    let admin = env.seed("carol", "carol@x.io", "Adm1n-secret!", Role::Admin).await;

    let delete = DeleteUserUseCase::new(env.store.clone());
    delete.execute(admin.id(), &admin).await.unwrap();
}

// ============================================================================
// Scenario 5: role-matrix denial
// ============================================================================

#[tokio::test]
async fn test_admin_cannot_mint_super_admin() {
    let env = TestEnv::new();
    let admin = env.seed("carol", "carol@x.io", "Adm1n-secret!", Role::Admin).await;
    let user = env.seed("dave", "dave@x.io", "P@ssw0rd-long", Role::User).await;

    let change_role = ChangeUserRoleUseCase::new(env.store.clone());

    let err = change_role
        .execute(user.id(), Role::SuperAdmin, &admin, Role::Admin)
        .await
        .unwrap_err();
    assert!(matches!(err, AuthError::Forbidden(_)));

    // The same change from a SUPER_ADMIN succeeds
    let root = env.seed("root-user", "root@x.io", "Sup3r-secret!", Role::SuperAdmin).await;
    let updated = change_role
        .execute(user.id(), Role::SuperAdmin, &root, Role::SuperAdmin)
        .await
        .unwrap();
    assert_eq!(updated.role(), Role::SuperAdmin);
}

#[tokio::test]
async fn test_user_cannot_change_roles_at_all() {
    let env = TestEnv::new();
    let alice = env.seed("alice", "a@x.io", "P@ssw0rd-long", Role::User).await;
    let bob = env.seed("bob", "bob@x.io", "P@ssw0rd-long2", Role::User).await;

    let change_role = ChangeUserRoleUseCase::new(env.store.clone());
    let err = change_role
        .execute(bob.id(), Role::User, &alice, Role::User)
        .await
        .unwrap_err();
    assert!(matches!(err, AuthError::Forbidden(_)));
}

#[tokio::test]
async fn test_target_super_admin_role_is_untouchable() {
    let env = TestEnv::new();
    let root = env.seed("root-user", "root@x.io", "Sup3r-secret!", Role::SuperAdmin).await;
    let other = env.seed("root-two", "root2@x.io", "Sup3r-secret2!", Role::SuperAdmin).await;

    let change_role = ChangeUserRoleUseCase::new(env.store.clone());
    let err = change_role
        .execute(other.id(), Role::User, &root, Role::SuperAdmin)
        .await
        .unwrap_err();
    assert!(matches!(err, AuthError::Forbidden(_)));
}

// ============================================================================
// Scenario 6: stale-session rejection
// ============================================================================

#[tokio::test]
async fn test_stale_session_rejected_on_role_change() {
    let env = TestEnv::new();
    // Alice was ADMIN when her token was issued, then got demoted
    let alice = env.seed("alice", "a@x.io", "P@ssw0rd-long", Role::Admin).await;
    let demoted = alice.promote(Role::User).unwrap();
    env.store.save(&demoted).await.unwrap();

    let target = env.seed("dave", "dave@x.io", "P@ssw0rd-long2", Role::User).await;

    let change_role = ChangeUserRoleUseCase::new(env.store.clone());
    let err = change_role
        .execute(target.id(), Role::Admin, &demoted, Role::Admin)
        .await
        .unwrap_err();

    assert!(matches!(err, AuthError::StaleSession));
}

// ============================================================================
// Token lifetime through the authenticator
// ============================================================================

#[tokio::test]
async fn test_expired_token_is_rejected_by_authenticator() {
    let mut env = TestEnv::new();
    // Codec whose tokens are born expired
    let config = test_config();
    env.codec = Arc::new(TokenCodec::new(&config.jwt_secret, Duration::ZERO).unwrap());
    env.config = config;
    env.seed("alice", "a@x.io", "P@ssw0rd-long", Role::User).await;

    let login = LoginUserUseCase::new(env.store.clone(), env.codec.clone(), env.config.clone());
    let output = login
        .execute("alice", "P@ssw0rd-long".to_string())
        .await
        .unwrap();

    let router = env.router();
    let (status, _) = send(&router, get_with_token("/api/users/me", &output.token)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

// ============================================================================
// Registration issues a token bound to the USER role
// ============================================================================

#[tokio::test]
async fn test_registration_defaults_to_user_role() {
    let env = TestEnv::new();
    let register = RegisterUserUseCase::new(env.store.clone());

    let account = register
        .execute(RegisterInput {
            username: "alice".to_string(),
            email: "a@x.io".to_string(),
            password: "P@ssw0rd-long".to_string(),
        })
        .await
        .unwrap();

    assert_eq!(account.role(), Role::User);
    assert!(!account.is_locked());
    assert!(!account.is_email_verified());
}
