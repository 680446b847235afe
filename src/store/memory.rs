use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::{ParticipantRoster, ProfileDirectory, ReportStore};
use crate::errors::AppError;
use crate::models::participant::{NewParticipant, Participant};
use crate::models::period::DateRange;
use crate::models::profile::{NewProfile, Profile, SupervisorLink, SupervisorRefs};
use crate::models::report::{CellReport, ReportInput};

#[derive(Default)]
struct Inner {
    next_id: i64,
    profiles: BTreeMap<i64, Profile>,
    participants: BTreeMap<i64, Participant>,
    reports: BTreeMap<i64, CellReport>,
}

impl Inner {
    fn next_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }
}

/// In-process store with the same contract as `PgStore`. Can be switched
/// offline to exercise the degrade paths.
#[derive(Default)]
pub struct MemoryStore {
    inner: RwLock<Inner>,
    unavailable: AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// While set, every operation fails with `AppError::Unavailable`.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    fn check_available(&self) -> Result<(), AppError> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(AppError::Unavailable("memory store is offline".to_string()));
        }
        Ok(())
    }
}

fn newest_first(mut reports: Vec<CellReport>) -> Vec<CellReport> {
    reports.sort_by(|a, b| (b.week_start, b.id).cmp(&(a.week_start, a.id)));
    reports
}

#[async_trait]
impl ProfileDirectory for MemoryStore {
    async fn find_profile(&self, id: i64) -> Result<Option<Profile>, AppError> {
        self.check_available()?;
        Ok(self.inner.read().await.profiles.get(&id).cloned())
    }

    async fn profiles_by_supervisor(
        &self,
        link: SupervisorLink,
        supervisor_id: i64,
    ) -> Result<Vec<Profile>, AppError> {
        self.check_available()?;
        let inner = self.inner.read().await;
        Ok(inner
            .profiles
            .values()
            .filter(|p| p.supervisor(link) == Some(supervisor_id))
            .cloned()
            .collect())
    }

    async fn all_profiles(&self) -> Result<Vec<Profile>, AppError> {
        self.check_available()?;
        Ok(self.inner.read().await.profiles.values().cloned().collect())
    }

    async fn insert_profile(&self, new: &NewProfile) -> Result<Profile, AppError> {
        self.check_available()?;
        let mut inner = self.inner.write().await;
        let id = inner.next_id();
        let profile = Profile {
            id,
            name: new.name.trim().to_string(),
            role_label: new.role_label.clone(),
            discipler_id: new.supervisors.discipler_id,
            obreiro_id: new.supervisors.obreiro_id,
            pastor_id: new.supervisors.pastor_id,
        };
        inner.profiles.insert(id, profile.clone());
        Ok(profile)
    }

    async fn set_supervisors(&self, id: i64, refs: &SupervisorRefs) -> Result<Profile, AppError> {
        self.check_available()?;
        let mut inner = self.inner.write().await;
        let profile = inner
            .profiles
            .get_mut(&id)
            .ok_or_else(|| AppError::NotFound(format!("profile {id}")))?;
        profile.discipler_id = refs.discipler_id;
        profile.obreiro_id = refs.obreiro_id;
        profile.pastor_id = refs.pastor_id;
        Ok(profile.clone())
    }
}

#[async_trait]
impl ParticipantRoster for MemoryStore {
    async fn add_participant(
        &self,
        leader_id: i64,
        new: &NewParticipant,
    ) -> Result<Participant, AppError> {
        self.check_available()?;
        let mut inner = self.inner.write().await;
        let id = inner.next_id();
        let participant = Participant {
            id,
            leader_id,
            name: new.name.trim().to_string(),
            kind: new.kind,
        };
        inner.participants.insert(id, participant.clone());
        Ok(participant)
    }

    async fn roster(&self, leader_id: i64) -> Result<Vec<Participant>, AppError> {
        self.check_available()?;
        let inner = self.inner.read().await;
        Ok(inner
            .participants
            .values()
            .filter(|p| p.leader_id == leader_id)
            .cloned()
            .collect())
    }
}

#[async_trait]
impl ReportStore for MemoryStore {
    async fn create_report(&self, input: &ReportInput) -> Result<CellReport, AppError> {
        self.check_available()?;
        let mut inner = self.inner.write().await;
        let roster: Vec<Participant> = inner.participants.values().cloned().collect();
        input.check_roster(&roster)?;

        let id = inner.next_id();
        let report = CellReport::from_input(id, input);
        inner.reports.insert(id, report.clone());
        Ok(report)
    }

    async fn find_report(&self, id: i64) -> Result<Option<CellReport>, AppError> {
        self.check_available()?;
        Ok(self.inner.read().await.reports.get(&id).cloned())
    }

    async fn update_report(&self, id: i64, input: &ReportInput) -> Result<CellReport, AppError> {
        self.check_available()?;
        let mut inner = self.inner.write().await;
        if !inner.reports.contains_key(&id) {
            return Err(AppError::NotFound(format!("report {id}")));
        }
        let roster: Vec<Participant> = inner.participants.values().cloned().collect();
        input.check_roster(&roster)?;

        let report = CellReport::from_input(id, input);
        inner.reports.insert(id, report.clone());
        Ok(report)
    }

    async fn delete_report(&self, id: i64) -> Result<(), AppError> {
        self.check_available()?;
        match self.inner.write().await.reports.remove(&id) {
            Some(_) => Ok(()),
            None => Err(AppError::NotFound(format!("report {id}"))),
        }
    }

    async fn reports_for_leaders(
        &self,
        leader_ids: &[i64],
        range: &DateRange,
    ) -> Result<Vec<CellReport>, AppError> {
        self.check_available()?;
        let inner = self.inner.read().await;
        let reports = inner
            .reports
            .values()
            .filter(|r| leader_ids.contains(&r.leader_id) && range.contains(r.week_start))
            .cloned()
            .collect();
        Ok(newest_first(reports))
    }

    async fn reports_in_range(&self, range: &DateRange) -> Result<Vec<CellReport>, AppError> {
        self.check_available()?;
        let inner = self.inner.read().await;
        let reports = inner
            .reports
            .values()
            .filter(|r| range.contains(r.week_start))
            .cloned()
            .collect();
        Ok(newest_first(reports))
    }

    async fn latest_report(&self, leader_id: i64) -> Result<Option<CellReport>, AppError> {
        self.check_available()?;
        let inner = self.inner.read().await;
        Ok(inner
            .reports
            .values()
            .filter(|r| r.leader_id == leader_id)
            .max_by_key(|r| (r.week_start, r.id))
            .cloned())
    }
}
