//! Shared fixtures for integration tests.
//!
//! Everything runs against `MemoryStore`, so no database is required.
//!
//! # Organization
//! `organization()` builds:
//! - pastor P
//! - obreiro O (pastorRef P)
//! - discipuladores D1, D2 (obreiroRef O)
//! - lider L1 (disciplerRef D1 and obreiroRef O: reachable by two paths)
//! - lider L2 (disciplerRef D1), L3 (disciplerRef D2)
//! - lider L4 (obreiroRef O only)
//! - lider OUT with no supervisors (only the pastor sees it)
//! - membro M (disciplerRef D1)
#![allow(dead_code)]

use std::sync::Arc;

use chrono::NaiveDate;

use celulas::hierarchy;
use celulas::models::participant::{NewParticipant, ParticipantKind};
use celulas::models::profile::{NewProfile, Profile, SupervisorRefs};
use celulas::models::report::{CellReport, Phase, ReportInput};
use celulas::store::{MemoryStore, ParticipantRoster, ReportStore};

pub struct Org {
    pub store: Arc<MemoryStore>,
    pub pastor: Profile,
    pub obreiro: Profile,
    pub d1: Profile,
    pub d2: Profile,
    pub l1: Profile,
    pub l2: Profile,
    pub l3: Profile,
    pub l4: Profile,
    pub outsider: Profile,
    pub member: Profile,
}

pub fn refs(discipler: Option<&Profile>, obreiro: Option<&Profile>, pastor: Option<&Profile>) -> SupervisorRefs {
    SupervisorRefs {
        discipler_id: discipler.map(|p| p.id),
        obreiro_id: obreiro.map(|p| p.id),
        pastor_id: pastor.map(|p| p.id),
    }
}

pub async fn add_profile(
    store: &MemoryStore,
    name: &str,
    role_label: &str,
    supervisors: SupervisorRefs,
) -> Profile {
    let new = NewProfile {
        name: name.to_string(),
        role_label: Some(role_label.to_string()),
        supervisors,
    };
    hierarchy::register_profile(store, &new)
        .await
        .expect("register profile")
}

pub async fn organization() -> Org {
    let store = Arc::new(MemoryStore::new());
    let s = &*store;

    let pastor = add_profile(s, "Paulo", "Pastor", SupervisorRefs::default()).await;
    let obreiro = add_profile(s, "Olga", "Obreiro", refs(None, None, Some(&pastor))).await;
    let d1 = add_profile(s, "Davi", "Discipulador", refs(None, Some(&obreiro), None)).await;
    let d2 = add_profile(s, "Débora", "discipuladora", refs(None, Some(&obreiro), None)).await;
    let l1 = add_profile(s, "Lucas", "Líder", refs(Some(&d1), Some(&obreiro), None)).await;
    let l2 = add_profile(s, "Lia", "LIDER", refs(Some(&d1), None, None)).await;
    let l3 = add_profile(s, "Levi", "lider de celula", refs(Some(&d2), None, None)).await;
    let l4 = add_profile(s, "Laura", "Líder", refs(None, Some(&obreiro), None)).await;
    let outsider = add_profile(s, "Otto", "lider", SupervisorRefs::default()).await;
    let member = add_profile(s, "Marta", "Membro", refs(Some(&d1), None, None)).await;

    Org {
        store,
        pastor,
        obreiro,
        d1,
        d2,
        l1,
        l2,
        l3,
        l4,
        outsider,
        member,
    }
}

/// Adds `count` participants of `kind` to the leader's roster and returns their ids.
pub async fn add_roster(
    store: &MemoryStore,
    leader_id: i64,
    kind: ParticipantKind,
    count: usize,
) -> Vec<i64> {
    let mut ids = Vec::with_capacity(count);
    for i in 0..count {
        let new = NewParticipant {
            name: format!("{} {i} of {leader_id}", kind.as_str()),
            kind,
        };
        let participant = store
            .add_participant(leader_id, &new)
            .await
            .expect("add participant");
        ids.push(participant.id);
    }
    ids
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
}

pub fn input(
    leader_id: i64,
    week_start: NaiveDate,
    members: &[i64],
    attendees: &[i64],
) -> ReportInput {
    ReportInput {
        leader_id,
        week_start,
        members_present: members.to_vec(),
        attendees_present: attendees.to_vec(),
        phase: Phase::Comunhao,
        multiplication_date: None,
        observations: String::new(),
        visitor_count: None,
        lost_participants: Vec::new(),
    }
}

/// Creates a roster sized for the report and submits it.
pub async fn submit(
    store: &MemoryStore,
    leader_id: i64,
    week_start: NaiveDate,
    members: usize,
    attendees: usize,
) -> CellReport {
    let m = add_roster(store, leader_id, ParticipantKind::Membro, members).await;
    let a = add_roster(store, leader_id, ParticipantKind::Frequentador, attendees).await;
    store
        .create_report(&input(leader_id, week_start, &m, &a))
        .await
        .expect("create report")
}
