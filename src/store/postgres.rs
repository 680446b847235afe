use async_trait::async_trait;
use sqlx::PgPool;

use super::{ParticipantRoster, ProfileDirectory, ReportStore};
use crate::errors::AppError;
use crate::models::participant::{self, NewParticipant, Participant};
use crate::models::period::DateRange;
use crate::models::profile::{self, NewProfile, Profile, SupervisorLink, SupervisorRefs};
use crate::models::report::{self, CellReport, ReportInput};

/// Postgres-backed store; a thin adapter over the `models::*::queries` functions.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        PgStore { pool }
    }
}

#[async_trait]
impl ProfileDirectory for PgStore {
    async fn find_profile(&self, id: i64) -> Result<Option<Profile>, AppError> {
        profile::queries::find_by_id(&self.pool, id).await
    }

    async fn profiles_by_supervisor(
        &self,
        link: SupervisorLink,
        supervisor_id: i64,
    ) -> Result<Vec<Profile>, AppError> {
        profile::queries::find_by_supervisor(&self.pool, link, supervisor_id).await
    }

    async fn all_profiles(&self) -> Result<Vec<Profile>, AppError> {
        profile::queries::find_all(&self.pool).await
    }

    async fn insert_profile(&self, new: &NewProfile) -> Result<Profile, AppError> {
        profile::queries::create(&self.pool, new).await
    }

    async fn set_supervisors(&self, id: i64, refs: &SupervisorRefs) -> Result<Profile, AppError> {
        profile::queries::update_supervisors(&self.pool, id, refs).await
    }
}

#[async_trait]
impl ParticipantRoster for PgStore {
    async fn add_participant(
        &self,
        leader_id: i64,
        new: &NewParticipant,
    ) -> Result<Participant, AppError> {
        participant::queries::create(&self.pool, leader_id, new).await
    }

    async fn roster(&self, leader_id: i64) -> Result<Vec<Participant>, AppError> {
        participant::queries::find_by_leader(&self.pool, leader_id).await
    }
}

#[async_trait]
impl ReportStore for PgStore {
    async fn create_report(&self, input: &ReportInput) -> Result<CellReport, AppError> {
        report::queries::create(&self.pool, input).await
    }

    async fn find_report(&self, id: i64) -> Result<Option<CellReport>, AppError> {
        report::queries::find_by_id(&self.pool, id).await
    }

    async fn update_report(&self, id: i64, input: &ReportInput) -> Result<CellReport, AppError> {
        report::queries::update(&self.pool, id, input).await
    }

    async fn delete_report(&self, id: i64) -> Result<(), AppError> {
        report::queries::delete(&self.pool, id).await
    }

    async fn reports_for_leaders(
        &self,
        leader_ids: &[i64],
        range: &DateRange,
    ) -> Result<Vec<CellReport>, AppError> {
        report::queries::find_by_leaders(&self.pool, leader_ids, range).await
    }

    async fn reports_in_range(&self, range: &DateRange) -> Result<Vec<CellReport>, AppError> {
        report::queries::find_in_range(&self.pool, range).await
    }

    async fn latest_report(&self, leader_id: i64) -> Result<Option<CellReport>, AppError> {
        report::queries::find_latest_for_leader(&self.pool, leader_id).await
    }
}
