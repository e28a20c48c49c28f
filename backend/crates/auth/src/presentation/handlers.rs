//! HTTP Handlers

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::IntoResponse;
use std::sync::Arc;

use platform::token::TokenCodec;

use crate::application::config::AuthConfig;
use crate::application::{
    ChangeUserRoleUseCase, DeleteUserUseCase, GetUserByUsernameUseCase, ListUsersUseCase,
    LockUserUseCase, LoginUserUseCase, LogoutUseCase, RegisterInput, RegisterUserUseCase,
    ResetFailedLoginUseCase, UnlockUserUseCase, UpdateUserUseCase,
};
use crate::domain::entity::account::Account;
use crate::domain::page::UserFilter;
use crate::domain::repository::{TokenDenylist, UserStore};
use crate::domain::value_object::{account_id::AccountId, role::Role};
use crate::error::{AuthError, AuthResult};
use crate::presentation::dto::{
    AdminUserResponse, AuthResponse, ChangeRoleRequest, ListUsersQuery, LoginRequest,
    MessageResponse, PageResponse, RegisterRequest, UpdateUserRequest, UserResponse,
};
use crate::presentation::middleware::AuthPrincipal;

/// Shared state for auth handlers
#[derive(Clone)]
pub struct AuthAppState<S, D>
where
    S: UserStore + Clone + Send + Sync + 'static,
    D: TokenDenylist + Clone + Send + Sync + 'static,
{
    pub store: Arc<S>,
    pub denylist: Arc<D>,
    pub codec: Arc<TokenCodec>,
    pub config: Arc<AuthConfig>,
}

// ============================================================================
// Auth endpoints
// ============================================================================

/// POST /api/auth/register
pub async fn register<S, D>(
    State(state): State<AuthAppState<S, D>>,
    Json(req): Json<RegisterRequest>,
) -> AuthResult<impl IntoResponse>
where
    S: UserStore + Clone + Send + Sync + 'static,
    D: TokenDenylist + Clone + Send + Sync + 'static,
{
    let use_case = RegisterUserUseCase::new(state.store.clone());

    let account = use_case
        .execute(RegisterInput {
            username: req.username,
            email: req.email,
            password: req.password,
        })
        .await?;

    // A fresh registration is also a login
    let token = state
        .codec
        .sign(account.username().as_str(), account.role().code())
        .map_err(|e| AuthError::Internal(e.to_string()))?;

    Ok((
        StatusCode::CREATED,
        Json(AuthResponse {
            token,
            user: UserResponse::from(&account),
        }),
    ))
}

/// POST /api/auth/login
pub async fn login<S, D>(
    State(state): State<AuthAppState<S, D>>,
    Json(req): Json<LoginRequest>,
) -> AuthResult<Json<AuthResponse>>
where
    S: UserStore + Clone + Send + Sync + 'static,
    D: TokenDenylist + Clone + Send + Sync + 'static,
{
    let use_case =
        LoginUserUseCase::new(state.store.clone(), state.codec.clone(), state.config.clone());

    let output = use_case.execute(&req.username, req.password).await?;

    Ok(Json(AuthResponse {
        token: output.token,
        user: UserResponse::from(&output.account),
    }))
}

/// POST /api/auth/logout
pub async fn logout<S, D>(
    State(state): State<AuthAppState<S, D>>,
    headers: HeaderMap,
) -> AuthResult<Json<MessageResponse>>
where
    S: UserStore + Clone + Send + Sync + 'static,
    D: TokenDenylist + Clone + Send + Sync + 'static,
{
    let token = bearer_token(&headers).ok_or_else(|| {
        AuthError::InvalidInput("Missing or invalid Authorization header".to_string())
    })?;

    let use_case = LogoutUseCase::new(state.codec.clone(), state.denylist.clone());
    use_case.execute(token).await?;

    Ok(Json(MessageResponse::new("Logged out successfully")))
}

// ============================================================================
// Current principal
// ============================================================================

/// GET /api/users/me
pub async fn me<S, D>(
    principal: AuthPrincipal,
    State(state): State<AuthAppState<S, D>>,
) -> AuthResult<Json<UserResponse>>
where
    S: UserStore + Clone + Send + Sync + 'static,
    D: TokenDenylist + Clone + Send + Sync + 'static,
{
    let account = load_requestor(&state, &principal).await?;
    Ok(Json(UserResponse::from(&account)))
}

// ============================================================================
// Admin endpoints
// ============================================================================

/// GET /api/admin/users
pub async fn list_users<S, D>(
    principal: AuthPrincipal,
    State(state): State<AuthAppState<S, D>>,
    Query(query): Query<ListUsersQuery>,
) -> AuthResult<Json<PageResponse<AdminUserResponse>>>
where
    S: UserStore + Clone + Send + Sync + 'static,
    D: TokenDenylist + Clone + Send + Sync + 'static,
{
    principal.require_admin()?;

    let role = query
        .role
        .as_deref()
        .map(|code| {
            Role::from_code(code)
                .ok_or_else(|| AuthError::InvalidInput(format!("Unknown role: {code}")))
        })
        .transpose()?;

    let filter = UserFilter {
        search: query.search,
        role,
        locked: query.locked,
    };

    let use_case = ListUsersUseCase::new(state.store.clone());
    let page = use_case
        .execute(
            filter,
            query.page.unwrap_or(0),
            query.size.unwrap_or(20),
            query.sort_by.as_deref(),
            query.sort_direction.as_deref(),
        )
        .await?;

    Ok(Json(PageResponse::from(
        page.map(|account| AdminUserResponse::from(&account)),
    )))
}

/// PUT /api/admin/users/{id}
pub async fn update_user<S, D>(
    principal: AuthPrincipal,
    State(state): State<AuthAppState<S, D>>,
    Path(id): Path<String>,
    Json(req): Json<UpdateUserRequest>,
) -> AuthResult<Json<AdminUserResponse>>
where
    S: UserStore + Clone + Send + Sync + 'static,
    D: TokenDenylist + Clone + Send + Sync + 'static,
{
    principal.require_admin()?;

    let target_id = parse_account_id(&id)?;
    let role = req
        .role
        .as_deref()
        .map(|code| {
            Role::from_code(code)
                .ok_or_else(|| AuthError::InvalidInput(format!("Unknown role: {code}")))
        })
        .transpose()?;

    let requestor = load_requestor(&state, &principal).await?;

    let use_case = UpdateUserUseCase::new(state.store.clone());
    let updated = use_case
        .execute(&target_id, req.email, role, &requestor)
        .await?;

    Ok(Json(AdminUserResponse::from(&updated)))
}

/// DELETE /api/admin/users/{id}
///
/// No admin gate here: a regular user deleting their own account is
/// legitimate, and the use case enforces the full rule set.
pub async fn delete_user<S, D>(
    principal: AuthPrincipal,
    State(state): State<AuthAppState<S, D>>,
    Path(id): Path<String>,
) -> AuthResult<StatusCode>
where
    S: UserStore + Clone + Send + Sync + 'static,
    D: TokenDenylist + Clone + Send + Sync + 'static,
{
    let target_id = parse_account_id(&id)?;
    let requestor = load_requestor(&state, &principal).await?;

    let use_case = DeleteUserUseCase::new(state.store.clone());
    use_case.execute(&target_id, &requestor).await?;

    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/admin/users/{id}/lock
pub async fn lock_user<S, D>(
    principal: AuthPrincipal,
    State(state): State<AuthAppState<S, D>>,
    Path(id): Path<String>,
) -> AuthResult<Json<AdminUserResponse>>
where
    S: UserStore + Clone + Send + Sync + 'static,
    D: TokenDenylist + Clone + Send + Sync + 'static,
{
    principal.require_admin()?;

    let target_id = parse_account_id(&id)?;
    let use_case = LockUserUseCase::new(state.store.clone());
    let account = use_case.execute(&target_id).await?;

    Ok(Json(AdminUserResponse::from(&account)))
}

/// POST /api/admin/users/{id}/unlock
pub async fn unlock_user<S, D>(
    principal: AuthPrincipal,
    State(state): State<AuthAppState<S, D>>,
    Path(id): Path<String>,
) -> AuthResult<Json<AdminUserResponse>>
where
    S: UserStore + Clone + Send + Sync + 'static,
    D: TokenDenylist + Clone + Send + Sync + 'static,
{
    principal.require_admin()?;

    let target_id = parse_account_id(&id)?;
    let use_case = UnlockUserUseCase::new(state.store.clone());
    let account = use_case.execute(&target_id).await?;

    Ok(Json(AdminUserResponse::from(&account)))
}

/// POST /api/admin/users/{id}/reset-failed-login
pub async fn reset_failed_login<S, D>(
    principal: AuthPrincipal,
    State(state): State<AuthAppState<S, D>>,
    Path(id): Path<String>,
) -> AuthResult<Json<AdminUserResponse>>
where
    S: UserStore + Clone + Send + Sync + 'static,
    D: TokenDenylist + Clone + Send + Sync + 'static,
{
    principal.require_admin()?;

    let target_id = parse_account_id(&id)?;
    let use_case = ResetFailedLoginUseCase::new(state.store.clone());
    let account = use_case.execute(&target_id).await?;

    Ok(Json(AdminUserResponse::from(&account)))
}

/// PUT /api/admin/users/{id}/role
pub async fn change_role<S, D>(
    principal: AuthPrincipal,
    State(state): State<AuthAppState<S, D>>,
    Path(id): Path<String>,
    Json(req): Json<ChangeRoleRequest>,
) -> AuthResult<Json<AdminUserResponse>>
where
    S: UserStore + Clone + Send + Sync + 'static,
    D: TokenDenylist + Clone + Send + Sync + 'static,
{
    principal.require_admin()?;

    let target_id = parse_account_id(&id)?;
    let new_role = Role::from_code(&req.role)
        .ok_or_else(|| AuthError::InvalidInput(format!("Unknown role: {}", req.role)))?;

    let requestor = load_requestor(&state, &principal).await?;

    let use_case = ChangeUserRoleUseCase::new(state.store.clone());
    let updated = use_case
        .execute(&target_id, new_role, &requestor, principal.role)
        .await?;

    Ok(Json(AdminUserResponse::from(&updated)))
}

// ============================================================================
// Helper Functions
// ============================================================================

fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
}

fn parse_account_id(id: &str) -> AuthResult<AccountId> {
    id.parse::<AccountId>()
        .map_err(|_| AuthError::NotFound(format!("User not found: {id}")))
}

/// The requestor's persisted account, looked up by the token subject.
async fn load_requestor<S, D>(
    state: &AuthAppState<S, D>,
    principal: &AuthPrincipal,
) -> AuthResult<Account>
where
    S: UserStore + Clone + Send + Sync + 'static,
    D: TokenDenylist + Clone + Send + Sync + 'static,
{
    GetUserByUsernameUseCase::new(state.store.clone())
        .execute(&principal.username)
        .await
}
