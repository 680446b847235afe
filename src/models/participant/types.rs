use serde::{Deserialize, Serialize};

use crate::text::fold;

/// Formal member or "frequentador" (regular non-member attendee).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParticipantKind {
    Membro,
    Frequentador,
}

impl ParticipantKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ParticipantKind::Membro => "membro",
            ParticipantKind::Frequentador => "frequentador",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match fold(raw).as_str() {
            "membro" | "member" => Some(ParticipantKind::Membro),
            "frequentador" | "attendee" => Some(ParticipantKind::Frequentador),
            _ => None,
        }
    }
}

/// One entry of a leader's roster.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Participant {
    pub id: i64,
    pub leader_id: i64,
    pub name: String,
    pub kind: ParticipantKind,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewParticipant {
    pub name: String,
    pub kind: ParticipantKind,
}
