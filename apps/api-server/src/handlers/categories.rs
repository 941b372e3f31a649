//! Category listing handler.

use actix_web::{HttpResponse, web};
use chrono::Utc;

use gazette_core::ports::PostFilter;
use gazette_shared::ApiResponse;
use gazette_shared::dto::CategoryPageResponse;

use crate::middleware::error::{AppError, AppResult};
use crate::state::AppState;

use super::{PageParams, category_response, feed_page};

/// GET /category/{slug}/ - the visible-post feed restricted to one
/// category. An unknown slug and an unpublished category are both 404.
pub async fn category_posts(
    state: web::Data<AppState>,
    path: web::Path<String>,
    query: web::Query<PageParams>,
) -> AppResult<HttpResponse> {
    let slug = path.into_inner();

    let category = state
        .categories
        .find_by_slug(&slug)
        .await?
        .filter(|c| c.is_published)
        .ok_or_else(|| AppError::NotFound(format!("Category '{slug}' not found")))?;

    let filter = PostFilter::public_feed(Utc::now()).in_category(category.id);
    let posts = feed_page(&state, &filter, query.page()).await?;

    Ok(HttpResponse::Ok().json(ApiResponse::ok(CategoryPageResponse {
        category: category_response(category),
        posts,
    })))
}
