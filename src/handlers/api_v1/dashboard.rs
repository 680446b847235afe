use actix_web::{web, HttpResponse};
use serde::Serialize;

use super::{Query, period_param};
use crate::dashboard::{DashboardView, LoadOutcome};
use crate::errors::AppError;
use crate::state::AppState;

#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct ApiDashboardResponse {
    #[serde(flatten)]
    pub view: DashboardView,
    /// A newer request for the same profile started before this one finished.
    pub superseded: bool,
}

impl From<LoadOutcome> for ApiDashboardResponse {
    fn from(outcome: LoadOutcome) -> Self {
        let superseded = outcome.is_superseded();
        let view = match outcome {
            LoadOutcome::Accepted(v) | LoadOutcome::Superseded(v) => v,
        };
        ApiDashboardResponse { view, superseded }
    }
}

/// GET /api/v1/dashboard/{profile_id}?month=&year=
pub async fn load(
    state: web::Data<AppState>,
    path: web::Path<i64>,
    query: Query,
) -> Result<HttpResponse, AppError> {
    let period = period_param(&query)?;
    let context = state.dashboards.context_for(path.into_inner()).await?;
    let outcome = context.load(period).await?;
    Ok(HttpResponse::Ok().json(ApiDashboardResponse::from(outcome)))
}

/// POST /api/v1/dashboard/{profile_id}/refresh
/// Re-runs the profile's last dashboard request.
pub async fn refresh(
    state: web::Data<AppState>,
    path: web::Path<i64>,
) -> Result<HttpResponse, AppError> {
    let context = state.dashboards.context_for(path.into_inner()).await?;
    let outcome = context.refresh().await?;
    Ok(HttpResponse::Ok().json(ApiDashboardResponse::from(outcome)))
}
