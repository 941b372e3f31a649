//! Comment handlers. Comments always live under a post; lookups are
//! scoped to the post id in the path.

use actix_web::{HttpResponse, web};
use uuid::Uuid;

use gazette_core::domain::Comment;
use gazette_shared::ApiResponse;
use gazette_shared::dto::{CommentRequest, CommentResponse};

use crate::middleware::auth::Identity;
use crate::middleware::error::{AppError, AppResult};
use crate::state::AppState;

use super::redirect_to_post;

fn validate_comment(req: &CommentRequest) -> AppResult<()> {
    if req.text.trim().is_empty() {
        return Err(AppError::Validation(vec![
            "text must not be empty".to_string(),
        ]));
    }
    Ok(())
}

/// POST /posts/{post_id}/comment/ - author and post are forced from
/// the token and the path.
pub async fn add(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<Uuid>,
    body: web::Json<CommentRequest>,
) -> AppResult<HttpResponse> {
    let post_id = path.into_inner();
    let req = body.into_inner();
    validate_comment(&req)?;

    let post = state
        .posts
        .find_by_id(post_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Post {post_id} not found")))?;

    let comment = Comment::new(post.id, identity.user_id, req.text);
    let saved = state.comments.insert(comment).await?;

    Ok(HttpResponse::Created().json(ApiResponse::ok(CommentResponse {
        id: saved.id,
        author: identity.username,
        text: saved.text,
        created_at: saved.created_at,
    })))
}

/// POST /posts/{post_id}/edit_comment/{comment_id}/
pub async fn edit(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<(Uuid, Uuid)>,
    body: web::Json<CommentRequest>,
) -> AppResult<HttpResponse> {
    let (post_id, comment_id) = path.into_inner();

    let mut comment = state
        .comments
        .find_in_post(post_id, comment_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Comment {comment_id} not found")))?;

    if comment.author_id != identity.user_id {
        return Ok(redirect_to_post(post_id));
    }

    let req = body.into_inner();
    validate_comment(&req)?;

    comment.text = req.text;
    let saved = state.comments.update(comment).await?;

    Ok(HttpResponse::Ok().json(ApiResponse::ok(CommentResponse {
        id: saved.id,
        author: identity.username,
        text: saved.text,
        created_at: saved.created_at,
    })))
}

/// POST /posts/{post_id}/delete_comment/{comment_id}/
pub async fn delete(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<(Uuid, Uuid)>,
) -> AppResult<HttpResponse> {
    let (post_id, comment_id) = path.into_inner();

    let comment = state
        .comments
        .find_in_post(post_id, comment_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Comment {comment_id} not found")))?;

    if comment.author_id != identity.user_id {
        return Ok(redirect_to_post(post_id));
    }

    state.comments.delete(comment_id).await?;

    Ok(HttpResponse::Ok().json(ApiResponse::ok_with_message((), "Comment deleted")))
}
