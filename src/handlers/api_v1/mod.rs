pub mod aggregate;
pub mod dashboard;
pub mod participants;
pub mod profiles;
pub mod reports;

use std::collections::HashMap;

use actix_web::{
    web, Error, HttpResponse,
    body::MessageBody,
    dev::{ServiceRequest, ServiceResponse},
    middleware::Next,
};
use chrono::NaiveDate;

use crate::errors::{AppError, ApiErrorResponse};
use crate::models::period::{DateRange, Period, parse_date};
use crate::models::role::Role;

/// Rejects POST/PUT requests that don't carry `Content-Type: application/json`.
/// GET and DELETE carry no body and are exempt.
async fn require_json_content_type(
    req: ServiceRequest,
    next: Next<impl MessageBody + 'static>,
) -> Result<ServiceResponse<impl MessageBody>, Error> {
    let method = req.method().clone();

    if method == actix_web::http::Method::POST || method == actix_web::http::Method::PUT {
        let content_type = req
            .headers()
            .get("content-type")
            .and_then(|v| v.to_str().ok())
            .unwrap_or("");

        if !content_type.starts_with("application/json") {
            let body = ApiErrorResponse {
                error: "Content-Type must be application/json for mutation requests".to_string(),
                details: None,
            };
            let response = HttpResponse::BadRequest().json(body);
            return Ok(req.into_response(response).map_into_right_body());
        }
    }

    next.call(req).await.map(|res| res.map_into_left_body())
}

pub type Query = web::Query<HashMap<String, String>>;

/// Parse an optional query value, naming the key in the validation error.
pub(crate) fn query_param<T: std::str::FromStr>(
    query: &HashMap<String, String>,
    key: &str,
) -> Result<Option<T>, AppError> {
    match query.get(key).map(|v| v.trim()).filter(|v| !v.is_empty()) {
        None => Ok(None),
        Some(raw) => raw
            .parse::<T>()
            .map(Some)
            .map_err(|_| AppError::validation(format!("{key} has an invalid value {raw:?}"))),
    }
}

pub(crate) fn required_param<T: std::str::FromStr>(
    query: &HashMap<String, String>,
    key: &str,
) -> Result<T, AppError> {
    query_param(query, key)?.ok_or_else(|| AppError::validation(format!("{key} is required")))
}

/// `month` + `year` query pair.
pub(crate) fn period_param(query: &HashMap<String, String>) -> Result<Option<Period>, AppError> {
    Period::from_parts(query_param(query, "month")?, query_param(query, "year")?)
}

/// Raw role label from the query, normalized at the edge.
pub(crate) fn role_param(query: &HashMap<String, String>) -> Option<Role> {
    Role::normalize(query.get("role").map(String::as_str))
}

fn date_bound(
    query: &HashMap<String, String>,
    key: &str,
    default: NaiveDate,
    errors: &mut Vec<String>,
) -> NaiveDate {
    match query.get(key).map(|v| v.trim()) {
        None | Some("") => default,
        Some(raw) => parse_date(raw, key).unwrap_or_else(|e| {
            errors.push(e);
            default
        }),
    }
}

/// Optional `from`/`to` dates; missing bounds are open.
pub(crate) fn range_param(query: &HashMap<String, String>) -> Result<DateRange, AppError> {
    let open = DateRange::unbounded();
    let mut errors = Vec::new();
    let start = date_bound(query, "from", open.start, &mut errors);
    let end = date_bound(query, "to", open.end, &mut errors);
    if !errors.is_empty() {
        return Err(AppError::Validation(errors));
    }
    DateRange::new(start, end)
}

/// Malformed JSON bodies answer with the same error shape as everything else.
fn json_config() -> web::JsonConfig {
    web::JsonConfig::default().error_handler(|err, _req| {
        let response = HttpResponse::BadRequest().json(ApiErrorResponse {
            error: "Invalid JSON body".to_string(),
            details: Some(err.to_string()),
        });
        actix_web::error::InternalError::from_response(err, response).into()
    })
}

/// Configure API v1 routes.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(json_config());
    cfg.service(
        web::scope("/profiles")
            .wrap(actix_web::middleware::from_fn(require_json_content_type))
            .route("", web::get().to(profiles::list_by_role_and_supervisor))
            .route("", web::post().to(profiles::create))
            .route("/{id}", web::get().to(profiles::read))
            .route("/{id}/supervisors", web::put().to(profiles::update_supervisors))
            .route("/{id}/scope", web::get().to(profiles::scope)),
    );
    cfg.service(
        web::scope("/leaders")
            .wrap(actix_web::middleware::from_fn(require_json_content_type))
            .route("/{id}/participants", web::get().to(participants::list))
            .route("/{id}/participants", web::post().to(participants::create)),
    );
    cfg.service(
        web::scope("/reports")
            .wrap(actix_web::middleware::from_fn(require_json_content_type))
            .route("", web::get().to(reports::list))
            .route("", web::post().to(reports::create))
            .route("/{id}", web::get().to(reports::read))
            .route("/{id}", web::put().to(reports::update))
            .route("/{id}", web::delete().to(reports::delete)),
    );
    cfg.service(
        web::scope("/aggregate")
            .route("", web::get().to(aggregate::aggregate))
            .route("/history", web::get().to(aggregate::history)),
    );
    cfg.service(
        web::scope("/dashboard")
            .route("/{profile_id}", web::get().to(dashboard::load))
            .route("/{profile_id}/refresh", web::post().to(dashboard::refresh)),
    );
}
