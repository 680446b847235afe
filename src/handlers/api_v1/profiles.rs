use actix_web::{web, HttpResponse};
use serde::Serialize;

use super::{Query, required_param};
use crate::errors::AppError;
use crate::hierarchy;
use crate::models::profile::{NewProfile, Profile, SupervisorRefs};
use crate::models::role::Role;
use crate::state::AppState;

/// Profile plus its canonical role, resolved at read time.
#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct ApiProfileResponse {
    #[serde(flatten)]
    pub profile: Profile,
    pub role: Option<Role>,
    pub role_display: &'static str,
}

impl From<Profile> for ApiProfileResponse {
    fn from(profile: Profile) -> Self {
        let role = profile.role();
        let role_display = profile.effective_role().display();
        ApiProfileResponse {
            profile,
            role,
            role_display,
        }
    }
}

#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct ApiScopeResponse {
    pub profile_id: i64,
    pub role: Option<Role>,
    pub leader_ids: Vec<i64>,
}

/// GET /api/v1/profiles/{id}
pub async fn read(
    state: web::Data<AppState>,
    path: web::Path<i64>,
) -> Result<HttpResponse, AppError> {
    let id = path.into_inner();
    let profile = state
        .directory
        .find_profile(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("profile {id}")))?;
    Ok(HttpResponse::Ok().json(ApiProfileResponse::from(profile)))
}

/// GET /api/v1/profiles?role=lider&supervisor_id=5
pub async fn list_by_role_and_supervisor(
    state: web::Data<AppState>,
    query: Query,
) -> Result<HttpResponse, AppError> {
    let role = super::role_param(&query)
        .ok_or_else(|| AppError::validation("role must name a known role"))?;
    let supervisor_id: i64 = required_param(&query, "supervisor_id")?;

    let profiles =
        hierarchy::profiles_by_role_and_supervisor(&*state.directory, role, supervisor_id).await?;
    let items: Vec<ApiProfileResponse> = profiles.into_iter().map(Into::into).collect();
    Ok(HttpResponse::Ok().json(items))
}

/// POST /api/v1/profiles
pub async fn create(
    state: web::Data<AppState>,
    body: web::Json<NewProfile>,
) -> Result<HttpResponse, AppError> {
    let profile = hierarchy::register_profile(&*state.directory, &body).await?;
    Ok(HttpResponse::Created().json(ApiProfileResponse::from(profile)))
}

/// PUT /api/v1/profiles/{id}/supervisors
pub async fn update_supervisors(
    state: web::Data<AppState>,
    path: web::Path<i64>,
    body: web::Json<SupervisorRefs>,
) -> Result<HttpResponse, AppError> {
    let profile =
        hierarchy::reassign_supervisors(&*state.directory, path.into_inner(), &body).await?;
    Ok(HttpResponse::Ok().json(ApiProfileResponse::from(profile)))
}

/// GET /api/v1/profiles/{id}/scope
pub async fn scope(
    state: web::Data<AppState>,
    path: web::Path<i64>,
) -> Result<HttpResponse, AppError> {
    let id = path.into_inner();
    let profile = state
        .directory
        .find_profile(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("profile {id}")))?;
    let role = profile.role();
    let leader_ids = hierarchy::visibility_scope(&*state.directory, &profile, role).await?;
    Ok(HttpResponse::Ok().json(ApiScopeResponse {
        profile_id: id,
        role,
        leader_ids: leader_ids.into_iter().collect(),
    }))
}
