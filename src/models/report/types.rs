use std::collections::HashSet;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::errors::AppError;
use crate::models::participant::Participant;
use crate::models::period::parse_date;
use crate::text::fold;

/// Developmental stage of a cell group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Phase {
    #[serde(rename = "Comunhão")]
    Comunhao,
    #[serde(rename = "Edificação")]
    Edificacao,
    #[serde(rename = "Evangelismo")]
    Evangelismo,
    #[serde(rename = "Multiplicação")]
    Multiplicacao,
}

impl Phase {
    pub fn label(self) -> &'static str {
        match self {
            Phase::Comunhao => "Comunhão",
            Phase::Edificacao => "Edificação",
            Phase::Evangelismo => "Evangelismo",
            Phase::Multiplicacao => "Multiplicação",
        }
    }

    /// Accepts accent and case variants ("comunhao", "EDIFICAÇÃO").
    pub fn parse(raw: &str) -> Option<Self> {
        match fold(raw).as_str() {
            "comunhao" => Some(Phase::Comunhao),
            "edificacao" => Some(Phase::Edificacao),
            "evangelismo" => Some(Phase::Evangelismo),
            "multiplicacao" => Some(Phase::Multiplicacao),
            _ => None,
        }
    }
}

/// Severity of a lost participant, least recoverable first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LostReason {
    Critico,
    Regular,
    Amarelo,
}

impl LostReason {
    pub fn parse(raw: &str) -> Option<Self> {
        match fold(raw).as_str() {
            "critico" => Some(LostReason::Critico),
            "regular" => Some(LostReason::Regular),
            "amarelo" => Some(LostReason::Amarelo),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LostParticipant {
    pub participant_id: i64,
    pub reason: LostReason,
}

/// One group meeting occurrence as stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CellReport {
    pub id: i64,
    pub leader_id: i64,
    pub week_start: NaiveDate,
    pub members_present: Vec<i64>,
    pub attendees_present: Vec<i64>,
    pub phase: Phase,
    pub multiplication_date: Option<NaiveDate>,
    pub observations: String,
    pub visitor_count: Option<u32>,
    pub lost_participants: Vec<LostParticipant>,
}

/// Validated write payload; a create or a full replacement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportInput {
    pub leader_id: i64,
    pub week_start: NaiveDate,
    pub members_present: Vec<i64>,
    pub attendees_present: Vec<i64>,
    pub phase: Phase,
    pub multiplication_date: Option<NaiveDate>,
    pub observations: String,
    pub visitor_count: Option<u32>,
    pub lost_participants: Vec<LostParticipant>,
}

impl CellReport {
    pub fn from_input(id: i64, input: &ReportInput) -> Self {
        CellReport {
            id,
            leader_id: input.leader_id,
            week_start: input.week_start,
            members_present: input.members_present.clone(),
            attendees_present: input.attendees_present.clone(),
            phase: input.phase,
            multiplication_date: input.multiplication_date,
            observations: input.observations.clone(),
            visitor_count: input.visitor_count,
            lost_participants: input.lost_participants.clone(),
        }
    }
}

impl ReportInput {
    /// Every referenced participant must belong to the owning leader's roster.
    pub fn check_roster(&self, roster: &[Participant]) -> Result<(), AppError> {
        let own: HashSet<i64> = roster
            .iter()
            .filter(|p| p.leader_id == self.leader_id)
            .map(|p| p.id)
            .collect();

        let referenced = self
            .members_present
            .iter()
            .chain(&self.attendees_present)
            .chain(self.lost_participants.iter().map(|l| &l.participant_id));

        let mut foreign: Vec<i64> = referenced.filter(|id| !own.contains(id)).copied().collect();
        if foreign.is_empty() {
            return Ok(());
        }
        foreign.sort_unstable();
        foreign.dedup();
        Err(AppError::Validation(
            foreign
                .into_iter()
                .map(|id| format!("Participant {id} is not on leader {}'s roster", self.leader_id))
                .collect(),
        ))
    }
}

/// Lost-participant entry as submitted.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LostEntryRequest {
    pub participant_id: i64,
    pub reason: String,
}

/// Create/update report request body.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportRequest {
    pub leader_id: i64,
    /// Profile acting on the leader's behalf, when not the leader.
    #[serde(default)]
    pub submitted_by: Option<i64>,
    pub week_start: String,
    #[serde(default)]
    pub members_present: Vec<i64>,
    #[serde(default)]
    pub attendees_present: Vec<i64>,
    pub phase: String,
    #[serde(default)]
    pub multiplication_date: Option<String>,
    #[serde(default)]
    pub observations: String,
    #[serde(default)]
    pub visitor_count: Option<i64>,
    #[serde(default)]
    pub lost_participants: Vec<LostEntryRequest>,
}

fn push_duplicates(ids: &[i64], field: &str, errors: &mut Vec<String>) {
    let mut seen = HashSet::new();
    for id in ids {
        if !seen.insert(*id) {
            errors.push(format!("{field} lists participant {id} more than once"));
        }
    }
}

impl ReportRequest {
    /// Validate shape and convert. Roster membership is checked by the store.
    pub fn into_input(self) -> Result<ReportInput, AppError> {
        let mut errors = Vec::new();

        if self.leader_id <= 0 {
            errors.push("leaderId is required".to_string());
        }

        let week_start = parse_date(&self.week_start, "weekStart")
            .map_err(|e| errors.push(e))
            .ok();

        let phase = Phase::parse(&self.phase);
        if phase.is_none() {
            errors.push(format!(
                "phase must be one of Comunhão, Edificação, Evangelismo, Multiplicação (got {:?})",
                self.phase
            ));
        }

        let multiplication_date = match self.multiplication_date.as_deref().map(str::trim) {
            None | Some("") => None,
            Some(raw) => parse_date(raw, "multiplicationDate")
                .map_err(|e| errors.push(e))
                .ok(),
        };

        let visitor_count = match self.visitor_count {
            None => None,
            // Stored in an INTEGER column.
            Some(n) => match u32::try_from(n) {
                Ok(n) if i32::try_from(n).is_ok() => Some(n),
                _ => {
                    errors.push(format!("visitorCount must be a non-negative number (got {n})"));
                    None
                }
            },
        };

        push_duplicates(&self.members_present, "membersPresent", &mut errors);
        push_duplicates(&self.attendees_present, "attendeesPresent", &mut errors);

        let mut lost_participants = Vec::with_capacity(self.lost_participants.len());
        let mut lost_seen = HashSet::new();
        for entry in &self.lost_participants {
            match LostReason::parse(&entry.reason) {
                Some(reason) => lost_participants.push(LostParticipant {
                    participant_id: entry.participant_id,
                    reason,
                }),
                None => errors.push(format!(
                    "Lost participant {} has unknown reason {:?} (expected critico, regular or amarelo)",
                    entry.participant_id, entry.reason
                )),
            }
            if !lost_seen.insert(entry.participant_id) {
                errors.push(format!(
                    "lostParticipants lists participant {} more than once",
                    entry.participant_id
                ));
            }
        }

        match (week_start, phase) {
            (Some(week_start), Some(phase)) if errors.is_empty() => Ok(ReportInput {
                leader_id: self.leader_id,
                week_start,
                members_present: self.members_present,
                attendees_present: self.attendees_present,
                phase,
                multiplication_date,
                observations: self.observations,
                visitor_count,
                lost_participants,
            }),
            _ => Err(AppError::Validation(errors)),
        }
    }
}
