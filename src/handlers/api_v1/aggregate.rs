use actix_web::{web, HttpResponse};

use super::{Query, period_param, required_param, role_param};
use crate::errors::AppError;
use crate::state::AppState;

/// GET /api/v1/aggregate?role=&requester_id=&month=&year=
///
/// Always answers with statistics; store failures show up as zeros.
pub async fn aggregate(
    state: web::Data<AppState>,
    query: Query,
) -> Result<HttpResponse, AppError> {
    let requester_id: i64 = required_param(&query, "requester_id")?;
    let period = period_param(&query)?;
    let role = role_param(&query);

    let stats = state.engine.aggregate(role, requester_id, period).await?;
    Ok(HttpResponse::Ok().json(stats))
}

/// GET /api/v1/aggregate/history?role=&requester_id=&year=
pub async fn history(
    state: web::Data<AppState>,
    query: Query,
) -> Result<HttpResponse, AppError> {
    let requester_id: i64 = required_param(&query, "requester_id")?;
    let year: i32 = required_param(&query, "year")?;
    let role = role_param(&query);

    let months = state.engine.history(role, requester_id, year).await?;
    Ok(HttpResponse::Ok().json(months))
}
