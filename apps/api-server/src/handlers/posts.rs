//! Post listing, detail and mutation handlers.

use actix_web::{HttpResponse, web};
use chrono::Utc;
use uuid::Uuid;

use gazette_core::domain::{MAX_TITLE_LEN, Post};
use gazette_core::ports::PostFilter;
use gazette_core::visibility;
use gazette_shared::ApiResponse;
use gazette_shared::dto::{PostDetailResponse, PostRequest};

use crate::middleware::auth::{Identity, OptionalIdentity};
use crate::middleware::error::{AppError, AppResult};
use crate::state::AppState;

use super::{PageParams, comment_response, feed_page, post_response, redirect_to_post};

fn validate_post(req: &PostRequest) -> AppResult<()> {
    let mut errors = Vec::new();

    if req.title.trim().is_empty() {
        errors.push("title must not be empty".to_string());
    }
    if req.title.chars().count() > MAX_TITLE_LEN {
        errors.push(format!("title must be at most {MAX_TITLE_LEN} characters"));
    }
    if req.text.trim().is_empty() {
        errors.push("text must not be empty".to_string());
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(AppError::Validation(errors))
    }
}

/// Resolve the optional category/location references, failing
/// validation when an id points nowhere.
async fn check_references(state: &AppState, req: &PostRequest) -> AppResult<()> {
    if let Some(category_id) = req.category_id {
        if state.categories.find_by_id(category_id).await?.is_none() {
            return Err(AppError::Validation(vec!["unknown category".to_string()]));
        }
    }
    if let Some(location_id) = req.location_id {
        if state.locations.find_by_id(location_id).await?.is_none() {
            return Err(AppError::Validation(vec!["unknown location".to_string()]));
        }
    }
    Ok(())
}

/// GET / - the public feed: visible posts, newest first, paginated.
pub async fn index(
    state: web::Data<AppState>,
    query: web::Query<PageParams>,
) -> AppResult<HttpResponse> {
    let filter = PostFilter::public_feed(Utc::now());
    let page = feed_page(&state, &filter, query.page()).await?;

    Ok(HttpResponse::Ok().json(ApiResponse::ok(page)))
}

/// GET /posts/{post_id}/ - detail with the comment thread.
///
/// The author sees their post regardless of state; everyone else goes
/// through the visibility predicate and gets a 404 when it fails.
pub async fn detail(
    state: web::Data<AppState>,
    viewer: OptionalIdentity,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    let post_id = path.into_inner();

    let entry = state
        .posts
        .find_detail(post_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Post {post_id} not found")))?;

    let visible = visibility::viewer_can_see(
        &entry.post,
        viewer.user_id(),
        entry.category_is_published(),
        Utc::now(),
    );
    if !visible {
        return Err(AppError::NotFound(format!("Post {post_id} not found")));
    }

    let comments = state.comments.list_for_post(post_id).await?;
    let response = PostDetailResponse {
        post: post_response(entry),
        comments: comments.into_iter().map(comment_response).collect(),
    };

    Ok(HttpResponse::Ok().json(ApiResponse::ok(response)))
}

/// POST /posts/create/ - author is forced to the current user; a
/// missing pub_date defaults to now.
pub async fn create(
    state: web::Data<AppState>,
    identity: Identity,
    body: web::Json<PostRequest>,
) -> AppResult<HttpResponse> {
    let req = body.into_inner();
    validate_post(&req)?;
    check_references(&state, &req).await?;

    let mut post = Post::new(identity.user_id, req.title, req.text, req.pub_date);
    post.category_id = req.category_id;
    post.location_id = req.location_id;
    post.image_url = req.image_url;
    if let Some(is_published) = req.is_published {
        post.is_published = is_published;
    }

    let saved = state.posts.insert(post).await?;
    tracing::info!(post_id = %saved.id, author = %identity.username, "Post created");

    let entry = state
        .posts
        .find_detail(saved.id)
        .await?
        .ok_or_else(|| AppError::Internal("created post vanished".to_string()))?;

    Ok(HttpResponse::Created().json(ApiResponse::ok(post_response(entry))))
}

/// POST /posts/{post_id}/edit/ - non-authors are bounced to the detail
/// view without mutation.
pub async fn edit(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<Uuid>,
    body: web::Json<PostRequest>,
) -> AppResult<HttpResponse> {
    let post_id = path.into_inner();

    let mut post = state
        .posts
        .find_by_id(post_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Post {post_id} not found")))?;

    if post.author_id != identity.user_id {
        return Ok(redirect_to_post(post_id));
    }

    let req = body.into_inner();
    validate_post(&req)?;
    check_references(&state, &req).await?;

    post.title = req.title;
    post.text = req.text;
    post.category_id = req.category_id;
    post.location_id = req.location_id;
    post.image_url = req.image_url;
    if let Some(pub_date) = req.pub_date {
        post.pub_date = pub_date;
    }
    if let Some(is_published) = req.is_published {
        post.is_published = is_published;
    }

    state.posts.update(post).await?;

    let entry = state
        .posts
        .find_detail(post_id)
        .await?
        .ok_or_else(|| AppError::Internal("edited post vanished".to_string()))?;

    Ok(HttpResponse::Ok().json(ApiResponse::ok(post_response(entry))))
}

/// POST /posts/{post_id}/delete/
pub async fn delete(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    let post_id = path.into_inner();

    let post = state
        .posts
        .find_by_id(post_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Post {post_id} not found")))?;

    if post.author_id != identity.user_id {
        return Ok(redirect_to_post(post_id));
    }

    state.posts.delete(post_id).await?;
    tracing::info!(%post_id, author = %identity.username, "Post deleted");

    Ok(HttpResponse::Ok().json(ApiResponse::ok_with_message((), "Post deleted")))
}
