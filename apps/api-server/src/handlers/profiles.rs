//! Profile handlers: public profile pages and own-profile editing.

use actix_web::{HttpResponse, web};
use chrono::Utc;

use gazette_core::domain::MAX_USERNAME_LEN;
use gazette_core::ports::PostFilter;
use gazette_shared::ApiResponse;
use gazette_shared::dto::{ProfileResponse, ProfileUpdateRequest};

use crate::middleware::auth::{Identity, OptionalIdentity};
use crate::middleware::error::{AppError, AppResult};
use crate::state::AppState;

use super::{PageParams, feed_page, user_response};

/// GET /profile/{username}/ - any viewer may look at any profile. The
/// visibility filter applies unless the viewer is the profile owner,
/// who sees everything they wrote.
pub async fn profile(
    state: web::Data<AppState>,
    viewer: OptionalIdentity,
    path: web::Path<String>,
    query: web::Query<PageParams>,
) -> AppResult<HttpResponse> {
    let username = path.into_inner();

    let user = state
        .users
        .find_by_username(&username)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Profile '{username}' not found")))?;

    let is_owner = viewer.user_id() == Some(user.id);
    let mut filter = PostFilter::public_feed(Utc::now()).by_author(user.id);
    if is_owner {
        filter = filter.unfiltered();
    }

    let posts = feed_page(&state, &filter, query.page()).await?;

    Ok(HttpResponse::Ok().json(ApiResponse::ok(ProfileResponse {
        profile: user_response(user),
        posts,
    })))
}

/// GET /profile/edit/ - the current account's editable fields.
pub async fn edit_form(state: web::Data<AppState>, identity: Identity) -> AppResult<HttpResponse> {
    let user = state
        .users
        .find_by_id(identity.user_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Account not found".to_string()))?;

    Ok(HttpResponse::Ok().json(ApiResponse::ok(user_response(user))))
}

fn validate_profile(req: &ProfileUpdateRequest) -> AppResult<()> {
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

    if errors.is_empty() {
        Ok(())
    } else {
        Err(AppError::Validation(errors))
    }
}

/// POST /profile/edit/ - update username, names and email.
pub async fn update(
    state: web::Data<AppState>,
    identity: Identity,
    body: web::Json<ProfileUpdateRequest>,
) -> AppResult<HttpResponse> {
    let req = body.into_inner();
    validate_profile(&req)?;

    let mut user = state
        .users
        .find_by_id(identity.user_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Account not found".to_string()))?;

    if req.username != user.username
        && state.users.find_by_username(&req.username).await?.is_some()
    {
        return Err(AppError::Conflict("Username already taken".to_string()));
    }
    if req.email != user.email && state.users.find_by_email(&req.email).await?.is_some() {
        return Err(AppError::Conflict("Email already registered".to_string()));
    }

    user.username = req.username;
    user.email = req.email;
    if let Some(first_name) = req.first_name {
        user.first_name = first_name;
    }
    if let Some(last_name) = req.last_name {
        user.last_name = last_name;
    }

    let saved = state.users.update(user).await?;

    Ok(HttpResponse::Ok().json(ApiResponse::ok(user_response(saved))))
}
