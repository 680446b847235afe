use actix_web::{web, HttpResponse};

use crate::errors::AppError;
use crate::models::participant::NewParticipant;
use crate::models::role::Role;
use crate::state::AppState;

/// GET /api/v1/leaders/{id}/participants
pub async fn list(
    state: web::Data<AppState>,
    path: web::Path<i64>,
) -> Result<HttpResponse, AppError> {
    let roster = state.roster.roster(path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(roster))
}

/// POST /api/v1/leaders/{id}/participants
pub async fn create(
    state: web::Data<AppState>,
    path: web::Path<i64>,
    body: web::Json<NewParticipant>,
) -> Result<HttpResponse, AppError> {
    let leader_id = path.into_inner();

    if body.name.trim().is_empty() {
        return Err(AppError::validation("Name is required"));
    }
    let leader = state
        .directory
        .find_profile(leader_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("leader {leader_id}")))?;
    if leader.role() != Some(Role::Lider) {
        return Err(AppError::validation(format!(
            "Profile {leader_id} is not a leader (role {})",
            leader.effective_role()
        )));
    }

    let participant = state.roster.add_participant(leader_id, &body).await?;
    log::info!(
        "Added {} {} to leader {leader_id}'s roster",
        participant.kind.as_str(),
        participant.id
    );
    Ok(HttpResponse::Created().json(participant))
}
