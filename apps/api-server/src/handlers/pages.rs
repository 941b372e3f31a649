//! Static info pages and the custom error pages.

use actix_web::body::EitherBody;
use actix_web::dev::ServiceResponse;
use actix_web::middleware::ErrorHandlerResponse;
use actix_web::{HttpResponse, Result};
use serde::Serialize;

use gazette_shared::{ApiResponse, ErrorResponse};

#[derive(Serialize)]
struct PageBody {
    title: &'static str,
    text: &'static str,
}

/// GET /pages/about/
pub async fn about() -> HttpResponse {
    HttpResponse::Ok().json(ApiResponse::ok(PageBody {
        title: "About",
        text: "Gazette is a small publishing platform: dated posts, categories, \
               locations and comment threads.",
    }))
}

/// GET /pages/rules/
pub async fn rules() -> HttpResponse {
    HttpResponse::Ok().json(ApiResponse::ok(PageBody {
        title: "Rules",
        text: "Be kind. Publish your own work. Scheduled posts stay hidden until \
               their publication time.",
    }))
}

/// Default service: any route that matched nothing gets the custom
/// 404 body.
pub async fn not_found() -> HttpResponse {
    HttpResponse::NotFound().json(ErrorResponse::not_found("No such page"))
}

/// Custom 403 page, registered through `ErrorHandlers`.
pub fn render_403<B>(res: ServiceResponse<B>) -> Result<ErrorHandlerResponse<B>> {
    Ok(replace_body(
        res,
        HttpResponse::Forbidden().json(ErrorResponse::forbidden()),
    ))
}

/// Custom 500 page, registered through `ErrorHandlers`. Catches
/// panics and errors that did not go through `AppError`.
pub fn render_500<B>(res: ServiceResponse<B>) -> Result<ErrorHandlerResponse<B>> {
    Ok(replace_body(
        res,
        HttpResponse::InternalServerError().json(ErrorResponse::internal_error()),
    ))
}

fn replace_body<B>(res: ServiceResponse<B>, new_response: HttpResponse) -> ErrorHandlerResponse<B> {
    let (req, _) = res.into_parts();
    let res: ServiceResponse<EitherBody<B>> =
        ServiceResponse::new(req, new_response).map_into_right_body();
    ErrorHandlerResponse::Response(res)
}
