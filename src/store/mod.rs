//! Repository seams. The aggregation engine, hierarchy resolution, and HTTP
//! handlers only see these traits; `PgStore` backs them in production and
//! `MemoryStore` in tests.

pub mod memory;
pub mod postgres;

use async_trait::async_trait;

use crate::errors::AppError;
use crate::models::participant::{NewParticipant, Participant};
use crate::models::period::DateRange;
use crate::models::profile::{NewProfile, Profile, SupervisorLink, SupervisorRefs};
use crate::models::report::{CellReport, ReportInput};

pub use memory::MemoryStore;
pub use postgres::PgStore;

#[async_trait]
pub trait ProfileDirectory: Send + Sync {
    async fn find_profile(&self, id: i64) -> Result<Option<Profile>, AppError>;

    /// Profiles whose `link` reference equals `supervisor_id`, any role.
    async fn profiles_by_supervisor(
        &self,
        link: SupervisorLink,
        supervisor_id: i64,
    ) -> Result<Vec<Profile>, AppError>;

    async fn all_profiles(&self) -> Result<Vec<Profile>, AppError>;

    async fn insert_profile(&self, new: &NewProfile) -> Result<Profile, AppError>;

    async fn set_supervisors(&self, id: i64, refs: &SupervisorRefs) -> Result<Profile, AppError>;
}

#[async_trait]
pub trait ParticipantRoster: Send + Sync {
    async fn add_participant(
        &self,
        leader_id: i64,
        new: &NewParticipant,
    ) -> Result<Participant, AppError>;

    async fn roster(&self, leader_id: i64) -> Result<Vec<Participant>, AppError>;
}

/// Report persistence. Implementations must reject writes that reference
/// participants outside the owning leader's roster (`ReportInput::check_roster`).
#[async_trait]
pub trait ReportStore: Send + Sync {
    async fn create_report(&self, input: &ReportInput) -> Result<CellReport, AppError>;

    async fn find_report(&self, id: i64) -> Result<Option<CellReport>, AppError>;

    async fn update_report(&self, id: i64, input: &ReportInput) -> Result<CellReport, AppError>;

    async fn delete_report(&self, id: i64) -> Result<(), AppError>;

    /// Reports of any of `leader_ids` with `week_start` in range, newest first.
    async fn reports_for_leaders(
        &self,
        leader_ids: &[i64],
        range: &DateRange,
    ) -> Result<Vec<CellReport>, AppError>;

    /// Every report with `week_start` in range, newest first.
    async fn reports_in_range(&self, range: &DateRange) -> Result<Vec<CellReport>, AppError>;

    async fn latest_report(&self, leader_id: i64) -> Result<Option<CellReport>, AppError>;

    async fn list_by_leader_and_period(
        &self,
        leader_id: i64,
        range: &DateRange,
    ) -> Result<Vec<CellReport>, AppError> {
        self.reports_for_leaders(&[leader_id], range).await
    }
}
