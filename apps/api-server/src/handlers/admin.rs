//! Back-office handlers for categories and locations.
//!
//! All routes require the `admin` role (the is_staff flag on the
//! account). Ordinary authenticated users get a 403.

use actix_web::{HttpResponse, web};
use uuid::Uuid;

use gazette_core::domain::{Category, Location, MAX_TITLE_LEN, slug_is_valid};
use gazette_shared::ApiResponse;
use gazette_shared::dto::{CategoryRequest, LocationRequest};

use crate::middleware::auth::Identity;
use crate::middleware::error::{AppError, AppResult};
use crate::state::AppState;

use super::{category_response, location_response};

fn require_admin(identity: &Identity) -> AppResult<()> {
    if identity.has_role("admin") {
        Ok(())
    } else {
        Err(AppError::Forbidden)
    }
}

fn validate_category(req: &CategoryRequest) -> AppResult<()> {
    let mut errors = Vec::new();

    if req.title.trim().is_empty() {
        errors.push("title must not be empty".to_string());
    }
    if req.title.chars().count() > MAX_TITLE_LEN {
        errors.push(format!("title must be at most {MAX_TITLE_LEN} characters"));
    }
    if !slug_is_valid(&req.slug) {
        errors.push(
            "slug may only contain lowercase letters, digits, hyphen and underscore".to_string(),
        );
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(AppError::Validation(errors))
    }
}

/// GET /admin/categories/ - every category, published or not.
pub async fn list_categories(
    state: web::Data<AppState>,
    identity: Identity,
) -> AppResult<HttpResponse> {
    require_admin(&identity)?;

    let categories = state.categories.list().await?;
    let items: Vec<_> = categories.into_iter().map(category_response).collect();

    Ok(HttpResponse::Ok().json(ApiResponse::ok(items)))
}

/// POST /admin/categories/
pub async fn create_category(
    state: web::Data<AppState>,
    identity: Identity,
    body: web::Json<CategoryRequest>,
) -> AppResult<HttpResponse> {
    require_admin(&identity)?;

    let req = body.into_inner();
    validate_category(&req)?;

    if state.categories.find_by_slug(&req.slug).await?.is_some() {
        return Err(AppError::Conflict(format!(
            "Category slug '{}' already exists",
            req.slug
        )));
    }

    let mut category = Category::new(req.title, req.description, req.slug);
    if let Some(is_published) = req.is_published {
        category.is_published = is_published;
    }

    let saved = state.categories.insert(category).await?;
    tracing::info!(slug = %saved.slug, by = %identity.username, "Category created");

    Ok(HttpResponse::Created().json(ApiResponse::ok(category_response(saved))))
}

/// POST /admin/categories/{id}/edit/ - including the is_published
/// toggle that hides a category and all of its posts.
pub async fn edit_category(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<Uuid>,
    body: web::Json<CategoryRequest>,
) -> AppResult<HttpResponse> {
    require_admin(&identity)?;

    let category_id = path.into_inner();
    let req = body.into_inner();
    validate_category(&req)?;

    let mut category = state
        .categories
        .find_by_id(category_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Category {category_id} not found")))?;

    if req.slug != category.slug && state.categories.find_by_slug(&req.slug).await?.is_some() {
        return Err(AppError::Conflict(format!(
            "Category slug '{}' already exists",
            req.slug
        )));
    }

    category.title = req.title;
    category.description = req.description;
    category.slug = req.slug;
    if let Some(is_published) = req.is_published {
        category.is_published = is_published;
    }

    let saved = state.categories.update(category).await?;

    Ok(HttpResponse::Ok().json(ApiResponse::ok(category_response(saved))))
}

fn validate_location(req: &LocationRequest) -> AppResult<()> {
    let mut errors = Vec::new();

    if req.name.trim().is_empty() {
        errors.push("name must not be empty".to_string());
    }
    if req.name.chars().count() > MAX_TITLE_LEN {
        errors.push(format!("name must be at most {MAX_TITLE_LEN} characters"));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(AppError::Validation(errors))
    }
}

/// GET /admin/locations/
pub async fn list_locations(
    state: web::Data<AppState>,
    identity: Identity,
) -> AppResult<HttpResponse> {
    require_admin(&identity)?;

    let locations = state.locations.list().await?;
    let items: Vec<_> = locations.into_iter().map(location_response).collect();

    Ok(HttpResponse::Ok().json(ApiResponse::ok(items)))
}

/// POST /admin/locations/
pub async fn create_location(
    state: web::Data<AppState>,
    identity: Identity,
    body: web::Json<LocationRequest>,
) -> AppResult<HttpResponse> {
    require_admin(&identity)?;

    let req = body.into_inner();
    validate_location(&req)?;

    let mut location = Location::new(req.name);
    if let Some(is_published) = req.is_published {
        location.is_published = is_published;
    }

    let saved = state.locations.insert(location).await?;

    Ok(HttpResponse::Created().json(ApiResponse::ok(location_response(saved))))
}

/// POST /admin/locations/{id}/edit/
pub async fn edit_location(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<Uuid>,
    body: web::Json<LocationRequest>,
) -> AppResult<HttpResponse> {
    require_admin(&identity)?;

    let location_id = path.into_inner();
    let req = body.into_inner();
    validate_location(&req)?;

    let mut location = state
        .locations
        .find_by_id(location_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Location {location_id} not found")))?;

    location.name = req.name;
    if let Some(is_published) = req.is_published {
        location.is_published = is_published;
    }

    let saved = state.locations.update(location).await?;

    Ok(HttpResponse::Ok().json(ApiResponse::ok(location_response(saved))))
}
