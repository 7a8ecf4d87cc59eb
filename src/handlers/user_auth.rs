//! User registration, login, and profile endpoints.
//!
//! Login failures are deliberately uniform: unknown email, wrong password,
//! and deactivated account all produce the same 401 body, so the endpoint
//! cannot be used to enumerate accounts.

use axum::{Extension, Json, extract::State};

use crate::{
    auth::{self, user as user_tokens},
    error::AppError,
    middleware::user::UserContext,
    models::user::{AuthResponse, LoginRequest, RegisterRequest, UpdateUserRequest, User, UserResponse},
    security::password,
    state::AppState,
};

const MIN_PASSWORD_LEN: usize = 8;

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// `POST /api/v1/auth/register`
///
/// Creates a user with a freshly salted Argon2id hash and returns the user
/// view plus a signed token. Duplicate emails are a 409.
pub async fn register(
    State(state): State<AppState>,
    Json(request): Json<RegisterRequest>,
) -> Result<Json<AuthResponse>, AppError> {
    let email = normalize_email(&request.email);
    if email.is_empty() || !email.contains('@') {
        return Err(AppError::Validation("a valid email is required".to_string()));
    }
    if request.password.len() < MIN_PASSWORD_LEN {
        return Err(AppError::Validation(format!(
            "password must be at least {} characters",
            MIN_PASSWORD_LEN
        )));
    }
    if request.first_name.trim().is_empty() || request.last_name.trim().is_empty() {
        return Err(AppError::Validation("first and last name are required".to_string()));
    }

    let existing: Option<User> = sqlx::query_as("SELECT * FROM users WHERE email = $1")
        .bind(&email)
        .fetch_optional(&state.pool)
        .await?;
    if existing.is_some() {
        return Err(AppError::Conflict("email already registered".to_string()));
    }

    let password_hash = password::hash_password(&request.password).map_err(|err| {
        tracing::error!(error = %err, "password hashing failed");
        AppError::Internal
    })?;

    let user = sqlx::query_as::<_, User>(
        r#"
        INSERT INTO users (email, password_hash, first_name, last_name)
        VALUES ($1, $2, $3, $4)
        RETURNING *
        "#,
    )
    .bind(&email)
    .bind(&password_hash)
    .bind(request.first_name.trim())
    .bind(request.last_name.trim())
    .fetch_one(&state.pool)
    .await
    .map_err(|err| AppError::conflict_on_unique(err, "email already registered"))?;

    let token = user_tokens::issue_user_token(
        user.id,
        &user.email,
        None,
        state.signing_key(),
        auth::session_ttl(),
    )?;

    Ok(Json(AuthResponse {
        user: user.into(),
        token,
    }))
}

/// `POST /api/v1/auth/login`
pub async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<AuthResponse>, AppError> {
    let email = normalize_email(&request.email);

    let user: Option<User> = sqlx::query_as("SELECT * FROM users WHERE email = $1")
        .bind(&email)
        .fetch_optional(&state.pool)
        .await?;

    // Same rejection for unknown email, inactive account, and wrong
    // password.
    let user = user.ok_or(AppError::Unauthenticated)?;
    if !user.is_active {
        tracing::debug!(user_id = %user.id, "login attempt on inactive account");
        return Err(AppError::Unauthenticated);
    }
    if !password::verify_password(&request.password, &user.password_hash) {
        return Err(AppError::Unauthenticated);
    }

    let token = user_tokens::issue_user_token(
        user.id,
        &user.email,
        None,
        state.signing_key(),
        auth::session_ttl(),
    )?;

    Ok(Json(AuthResponse {
        user: user.into(),
        token,
    }))
}

/// `GET /api/v1/auth/me`
pub async fn current_user(
    State(state): State<AppState>,
    Extension(ctx): Extension<UserContext>,
) -> Result<Json<UserResponse>, AppError> {
    let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
        .bind(ctx.user_id)
        .fetch_optional(&state.pool)
        .await?
        .ok_or(AppError::NotFound)?;

    Ok(Json(user.into()))
}

/// `PUT /api/v1/auth/user`
///
/// Updates name fields; only provided fields change.
pub async fn update_user(
    State(state): State<AppState>,
    Extension(ctx): Extension<UserContext>,
    Json(request): Json<UpdateUserRequest>,
) -> Result<Json<UserResponse>, AppError> {
    let user = sqlx::query_as::<_, User>(
        r#"
        UPDATE users
        SET first_name = COALESCE($2, first_name),
            last_name = COALESCE($3, last_name),
            updated_at = NOW()
        WHERE id = $1
        RETURNING *
        "#,
    )
    .bind(ctx.user_id)
    .bind(request.first_name.as_deref().map(str::trim))
    .bind(request.last_name.as_deref().map(str::trim))
    .fetch_optional(&state.pool)
    .await?
    .ok_or(AppError::NotFound)?;

    Ok(Json(user.into()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn email_normalization() {
        assert_eq!(normalize_email("  User@Example.COM "), "user@example.com");
    }
}
