//! Authentication handlers: registration and login.

use actix_web::{HttpResponse, web};
use std::sync::Arc;

use gazette_core::domain::{MAX_USERNAME_LEN, User};
use gazette_core::ports::{PasswordService, TokenService};
use gazette_shared::ApiResponse;
use gazette_shared::dto::{AuthResponse, LoginRequest, RegisterRequest};

use crate::middleware::error::{AppError, AppResult};
use crate::state::AppState;

/// POST /auth/registration/
pub async fn register(
    state: web::Data<AppState>,
    token_service: web::Data<Arc<dyn TokenService>>,
    password_service: web::Data<Arc<dyn PasswordService>>,
    body: web::Json<RegisterRequest>,
) -> AppResult<HttpResponse> {
    let req = body.into_inner();

    let mut errors = Vec::new();
    if req.username.trim().is_empty() {
        errors.push("username must not be empty".to_string());
    }
    if req.username.chars().count() > MAX_USERNAME_LEN {
        errors.push(format!(
            "username must be at most {MAX_USERNAME_LEN} characters"
        ));
    }
    if !req.email.contains('@') {
        errors.push("invalid email address".to_string());
    }
    if req.password.chars().count() < 8 {
        errors.push("password must be at least 8 characters".to_string());
    }
    if !errors.is_empty() {
        return Err(AppError::Validation(errors));
    }

    if state.users.find_by_username(&req.username).await?.is_some() {
        return Err(AppError::Conflict("Username already taken".to_string()));
    }
    if state.users.find_by_email(&req.email).await?.is_some() {
        return Err(AppError::Conflict("Email already registered".to_string()));
    }

    let password_hash = password_service.hash(&req.password)?;

    let mut user = User::new(req.username, req.email, password_hash);
    if let Some(first_name) = req.first_name {
        user.first_name = first_name;
    }
    if let Some(last_name) = req.last_name {
        user.last_name = last_name;
    }

    let saved = state.users.insert(user).await?;
    tracing::info!(username = %saved.username, "Account registered");

    let token = token_service.generate_token(saved.id, &saved.username, saved.roles())?;

    Ok(HttpResponse::Created().json(ApiResponse::ok(AuthResponse {
        access_token: token,
        token_type: "Bearer".to_string(),
        expires_in: token_service.expiration_seconds() as u64,
    })))
}

/// POST /auth/login/
pub async fn login(
    state: web::Data<AppState>,
    token_service: web::Data<Arc<dyn TokenService>>,
    password_service: web::Data<Arc<dyn PasswordService>>,
    body: web::Json<LoginRequest>,
) -> AppResult<HttpResponse> {
    let req = body.into_inner();

    let user = state
        .users
        .find_by_username(&req.username)
        .await?
        .ok_or(AppError::Unauthorized)?;

    let valid = password_service.verify(&req.password, &user.password_hash)?;
    if !valid {
        return Err(AppError::Unauthorized);
    }

    let token = token_service.generate_token(user.id, &user.username, user.roles())?;

    Ok(HttpResponse::Ok().json(ApiResponse::ok(AuthResponse {
        access_token: token,
        token_type: "Bearer".to_string(),
        expires_in: token_service.expiration_seconds() as u64,
    })))
}
