use actix_web::{web, HttpResponse};

use super::{Query, range_param, required_param};
use crate::errors::AppError;
use crate::hierarchy;
use crate::models::report::ReportRequest;
use crate::state::AppState;

/// GET /api/v1/reports?leader_id=&from=&to=
/// Newest `weekStart` first.
pub async fn list(
    state: web::Data<AppState>,
    query: Query,
) -> Result<HttpResponse, AppError> {
    let leader_id: i64 = required_param(&query, "leader_id")?;
    let range = range_param(&query)?;
    let reports = state
        .reports
        .list_by_leader_and_period(leader_id, &range)
        .await?;
    Ok(HttpResponse::Ok().json(reports))
}

/// GET /api/v1/reports/{id}
pub async fn read(
    state: web::Data<AppState>,
    path: web::Path<i64>,
) -> Result<HttpResponse, AppError> {
    let id = path.into_inner();
    let report = state
        .reports
        .find_report(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("report {id}")))?;
    Ok(HttpResponse::Ok().json(report))
}

/// POST /api/v1/reports
pub async fn create(
    state: web::Data<AppState>,
    body: web::Json<ReportRequest>,
) -> Result<HttpResponse, AppError> {
    let request = body.into_inner();
    let submitted_by = request.submitted_by;
    let input = request.into_input()?;

    hierarchy::authorize_submission(&*state.directory, input.leader_id, submitted_by).await?;
    let report = state.reports.create_report(&input).await?;

    log::info!(
        "Report {} created for leader {} week {}",
        report.id,
        report.leader_id,
        report.week_start
    );
    Ok(HttpResponse::Created().json(report))
}

/// PUT /api/v1/reports/{id}
/// Full replacement of every field.
pub async fn update(
    state: web::Data<AppState>,
    path: web::Path<i64>,
    body: web::Json<ReportRequest>,
) -> Result<HttpResponse, AppError> {
    let id = path.into_inner();
    let request = body.into_inner();
    let submitted_by = request.submitted_by;
    let input = request.into_input()?;

    hierarchy::authorize_submission(&*state.directory, input.leader_id, submitted_by).await?;
    let report = state.reports.update_report(id, &input).await?;

    log::info!("Report {id} replaced");
    Ok(HttpResponse::Ok().json(report))
}

/// DELETE /api/v1/reports/{id}
pub async fn delete(
    state: web::Data<AppState>,
    path: web::Path<i64>,
) -> Result<HttpResponse, AppError> {
    let id = path.into_inner();
    state.reports.delete_report(id).await?;
    log::info!("Report {id} deleted");
    Ok(HttpResponse::NoContent().finish())
}
