//! Authentication endpoints

use axum::{extract::State, http::StatusCode, Json};
use serde::Serialize;
use utoipa::ToSchema;
use validator::Validate;

use crate::{
    error::{AppError, AppResult},
    models::{user::Credentials, PublicUser},
};

use super::AuthenticatedUser;

/// Minimal user identity echoed back on login
#[derive(Serialize, ToSchema)]
pub struct UserInfo {
    pub id: String,
    pub email: String,
}

#[derive(Serialize, ToSchema)]
pub struct RegisterResponse {
    pub message: String,
    pub user: PublicUser,
}

#[derive(Serialize, ToSchema)]
pub struct LoginResponse {
    pub message: String,
    pub token: String,
    pub user: UserInfo,
}

/// Register a new user account
#[utoipa::path(
    post,
    path = "/auth/register",
    tag = "auth",
    request_body = Credentials,
    responses(
        (status = 201, description = "User registered", body = RegisterResponse),
        (status = 400, description = "Missing email or password"),
        (status = 409, description = "Email already registered")
    )
)]
pub async fn register(
    State(state): State<crate::AppState>,
    Json(body): Json<Credentials>,
) -> AppResult<(StatusCode, Json<RegisterResponse>)> {
    body.validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let user = state.services.auth.register(&body.email, &body.password).await?;

    Ok((
        StatusCode::CREATED,
        Json(RegisterResponse {
            message: "User registered".to_string(),
            user,
        }),
    ))
}

/// Log in with email and password, receiving a bearer token
#[utoipa::path(
    post,
    path = "/auth/login",
    tag = "auth",
    request_body = Credentials,
    responses(
        (status = 200, description = "Login successful", body = LoginResponse),
        (status = 400, description = "Missing email or password"),
        (status = 401, description = "Invalid credentials")
    )
)]
pub async fn login(
    State(state): State<crate::AppState>,
    Json(body): Json<Credentials>,
) -> AppResult<Json<LoginResponse>> {
    body.validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let (token, user) = state.services.auth.login(&body.email, &body.password).await?;

    Ok(Json(LoginResponse {
        message: "Login successful".to_string(),
        token,
        user: UserInfo {
            id: user.id,
            email: user.email,
        },
    }))
}

/// Get the authenticated user's own identity
#[utoipa::path(
    get,
    path = "/auth/me",
    tag = "auth",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Current user", body = PublicUser),
        (status = 401, description = "Not authenticated")
    )
)]
pub async fn me(AuthenticatedUser(user): AuthenticatedUser) -> Json<PublicUser> {
    Json(user.to_public())
}
