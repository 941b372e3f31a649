//! HTTP handlers and route configuration.

mod admin;
mod auth;
mod categories;
mod comments;
mod health;
mod pages;
mod posts;
mod profiles;

#[cfg(test)]
mod tests;

use actix_web::{HttpResponse, http::header, web};
use serde::Deserialize;
use uuid::Uuid;

use gazette_core::domain::{Category, CommentEntry, FeedEntry, Location, User};
use gazette_core::pagination::{PageWindow, parse_page_param};
use gazette_core::ports::PostFilter;
use gazette_shared::dto::{
    CategoryResponse, CategoryTagResponse, CommentResponse, LocationResponse, PageResponse,
    PostResponse, UserResponse,
};

use crate::middleware::error::AppResult;
use crate::state::AppState;

pub use pages::{not_found, render_403, render_500};

/// Configure all application routes.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/", web::get().to(posts::index))
        .route("/health/", web::get().to(health::health_check))
        .route(
            "/category/{slug}/",
            web::get().to(categories::category_posts),
        )
        .service(
            web::scope("/auth")
                .route("/registration/", web::post().to(auth::register))
                .route("/login/", web::post().to(auth::login)),
        )
        .service(
            web::scope("/posts")
                .route("/create/", web::post().to(posts::create))
                .route("/{post_id}/", web::get().to(posts::detail))
                .route("/{post_id}/edit/", web::post().to(posts::edit))
                .route("/{post_id}/delete/", web::post().to(posts::delete))
                .route("/{post_id}/comment/", web::post().to(comments::add))
                .route(
                    "/{post_id}/edit_comment/{comment_id}/",
                    web::post().to(comments::edit),
                )
                .route(
                    "/{post_id}/delete_comment/{comment_id}/",
                    web::post().to(comments::delete),
                ),
        )
        .service(
            web::scope("/profile")
                .route("/edit/", web::get().to(profiles::edit_form))
                .route("/edit/", web::post().to(profiles::update))
                .route("/{username}/", web::get().to(profiles::profile)),
        )
        .service(
            web::scope("/pages")
                .route("/about/", web::get().to(pages::about))
                .route("/rules/", web::get().to(pages::rules)),
        )
        .service(
            web::scope("/admin")
                .route("/categories/", web::get().to(admin::list_categories))
                .route("/categories/", web::post().to(admin::create_category))
                .route(
                    "/categories/{id}/edit/",
                    web::post().to(admin::edit_category),
                )
                .route("/locations/", web::get().to(admin::list_locations))
                .route("/locations/", web::post().to(admin::create_location))
                .route("/locations/{id}/edit/", web::post().to(admin::edit_location)),
        );
}

/// Pagination query parameters. The raw string is parsed leniently:
/// junk values mean page 1.
#[derive(Debug, Deserialize)]
pub(crate) struct PageParams {
    pub page: Option<String>,
}

impl PageParams {
    pub fn page(&self) -> u64 {
        parse_page_param(self.page.as_deref())
    }
}

/// 302 to the post detail view, answered when a non-author tries to
/// mutate a post or one of its comments.
pub(crate) fn redirect_to_post(post_id: Uuid) -> HttpResponse {
    HttpResponse::Found()
        .insert_header((header::LOCATION, format!("/posts/{post_id}/")))
        .finish()
}

pub(crate) fn post_response(entry: FeedEntry) -> PostResponse {
    PostResponse {
        id: entry.post.id,
        title: entry.post.title,
        text: entry.post.text,
        author: entry.author_username,
        category: entry.category.map(|c| CategoryTagResponse {
            title: c.title,
            slug: c.slug,
        }),
        location: entry.location_name,
        image_url: entry.post.image_url,
        pub_date: entry.post.pub_date,
        is_published: entry.post.is_published,
        created_at: entry.post.created_at,
        comment_count: entry.comment_count,
    }
}

pub(crate) fn comment_response(entry: CommentEntry) -> CommentResponse {
    CommentResponse {
        id: entry.comment.id,
        author: entry.author_username,
        text: entry.comment.text,
        created_at: entry.comment.created_at,
    }
}

pub(crate) fn user_response(user: User) -> UserResponse {
    UserResponse {
        id: user.id,
        username: user.username,
        first_name: user.first_name,
        last_name: user.last_name,
        email: user.email,
        created_at: user.created_at,
    }
}

pub(crate) fn category_response(category: Category) -> CategoryResponse {
    CategoryResponse {
        id: category.id,
        title: category.title,
        description: category.description,
        slug: category.slug,
        is_published: category.is_published,
        created_at: category.created_at,
    }
}

pub(crate) fn location_response(location: Location) -> LocationResponse {
    LocationResponse {
        id: location.id,
        name: location.name,
        is_published: location.is_published,
        created_at: location.created_at,
    }
}

/// Count, clamp and fetch one page of a post listing.
pub(crate) async fn feed_page(
    state: &AppState,
    filter: &PostFilter,
    requested_page: u64,
) -> AppResult<PageResponse<PostResponse>> {
    let total = state.posts.count(filter).await?;
    let window = PageWindow::compute(total, state.page_size, requested_page);
    let entries = state.posts.list(filter, window.offset, window.limit).await?;

    Ok(PageResponse {
        items: entries.into_iter().map(post_response).collect(),
        page: window.page,
        per_page: window.per_page,
        total_items: window.total_items,
        total_pages: window.total_pages,
        has_next: window.has_next,
        has_previous: window.has_previous,
    })
}
