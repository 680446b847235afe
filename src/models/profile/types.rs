use serde::{Deserialize, Serialize};

use crate::models::role::{self, Role};

/// One person in the leadership hierarchy. The role label is kept exactly as
/// entered; the canonical role is recomputed from it on every read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    pub id: i64,
    pub name: String,
    pub role_label: Option<String>,
    #[serde(rename = "disciplerRef")]
    pub discipler_id: Option<i64>,
    #[serde(rename = "obreiroRef")]
    pub obreiro_id: Option<i64>,
    #[serde(rename = "pastorRef")]
    pub pastor_id: Option<i64>,
}

impl Profile {
    pub fn role(&self) -> Option<Role> {
        Role::normalize(self.role_label.as_deref())
    }

    /// Canonical role with unresolved labels ranked as `Membro`.
    pub fn effective_role(&self) -> Role {
        role::effective_role(self.role_label.as_deref())
    }

    pub fn supervisors(&self) -> SupervisorRefs {
        SupervisorRefs {
            discipler_id: self.discipler_id,
            obreiro_id: self.obreiro_id,
            pastor_id: self.pastor_id,
        }
    }

    pub fn supervisor(&self, link: SupervisorLink) -> Option<i64> {
        match link {
            SupervisorLink::Discipler => self.discipler_id,
            SupervisorLink::Obreiro => self.obreiro_id,
            SupervisorLink::Pastor => self.pastor_id,
        }
    }
}

/// Which upward reference a query follows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SupervisorLink {
    Discipler,
    Obreiro,
    Pastor,
}

impl SupervisorLink {
    /// The reference a subordinate uses to point at a supervisor of `role`.
    pub fn for_role(role: Role) -> Option<Self> {
        match role {
            Role::Discipulador => Some(SupervisorLink::Discipler),
            Role::Obreiro => Some(SupervisorLink::Obreiro),
            Role::Pastor => Some(SupervisorLink::Pastor),
            Role::Lider | Role::Membro => None,
        }
    }

    /// The role a profile must hold to be referenced through this link.
    pub fn role(self) -> Role {
        match self {
            SupervisorLink::Discipler => Role::Discipulador,
            SupervisorLink::Obreiro => Role::Obreiro,
            SupervisorLink::Pastor => Role::Pastor,
        }
    }

    pub fn column(self) -> &'static str {
        match self {
            SupervisorLink::Discipler => "discipler_id",
            SupervisorLink::Obreiro => "obreiro_id",
            SupervisorLink::Pastor => "pastor_id",
        }
    }

    pub fn field(self) -> &'static str {
        match self {
            SupervisorLink::Discipler => "disciplerRef",
            SupervisorLink::Obreiro => "obreiroRef",
            SupervisorLink::Pastor => "pastorRef",
        }
    }
}

/// Upward references of a profile, assigned at creation or by an administrative update.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SupervisorRefs {
    #[serde(default, rename = "disciplerRef")]
    pub discipler_id: Option<i64>,
    #[serde(default, rename = "obreiroRef")]
    pub obreiro_id: Option<i64>,
    #[serde(default, rename = "pastorRef")]
    pub pastor_id: Option<i64>,
}

impl SupervisorRefs {
    /// Present references paired with the link they occupy.
    pub fn present(&self) -> Vec<(SupervisorLink, i64)> {
        [
            (SupervisorLink::Discipler, self.discipler_id),
            (SupervisorLink::Obreiro, self.obreiro_id),
            (SupervisorLink::Pastor, self.pastor_id),
        ]
        .into_iter()
        .filter_map(|(link, id)| id.map(|id| (link, id)))
        .collect()
    }
}

/// Registration payload.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewProfile {
    pub name: String,
    #[serde(default)]
    pub role_label: Option<String>,
    #[serde(flatten)]
    pub supervisors: SupervisorRefs,
}
