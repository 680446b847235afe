use serde::{Deserialize, Serialize};

use crate::text::fold;

/// Canonical leadership roles, declared lowest rank first so the derived
/// `Ord` matches the hierarchy (pastor > obreiro > discipulador > lider > membro).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Membro,
    Lider,
    Discipulador,
    Obreiro,
    Pastor,
}

/// Key terms tested against the folded label, highest rank first.
/// A compound label ("pastor e lider") resolves to the first hit.
const KEY_TERMS: &[(Role, &[&str])] = &[
    (Role::Pastor, &["pastor"]),
    (Role::Obreiro, &["obreiro"]),
    (Role::Discipulador, &["discipulador"]),
    (Role::Lider, &["lider", "leader"]),
    (Role::Membro, &["membro"]),
];

impl Role {
    pub const ALL: [Role; 5] = [
        Role::Pastor,
        Role::Obreiro,
        Role::Discipulador,
        Role::Lider,
        Role::Membro,
    ];

    /// Resolve a raw, free-text role label. `None` means "unknown", which is
    /// distinct from an explicit `Membro`.
    pub fn normalize(raw: Option<&str>) -> Option<Role> {
        let folded = fold(raw?);
        if folded.is_empty() {
            return None;
        }
        KEY_TERMS
            .iter()
            .find(|(_, terms)| terms.iter().any(|t| folded.contains(t)))
            .map(|(role, _)| *role)
    }

    pub fn display(self) -> &'static str {
        match self {
            Role::Pastor => "Pastor",
            Role::Obreiro => "Obreiro",
            Role::Discipulador => "Discipulador",
            Role::Lider => "Líder",
            Role::Membro => "Membro",
        }
    }

    /// Lowercase key used in query strings and the stored label of new profiles.
    pub fn key(self) -> &'static str {
        match self {
            Role::Pastor => "pastor",
            Role::Obreiro => "obreiro",
            Role::Discipulador => "discipulador",
            Role::Lider => "lider",
            Role::Membro => "membro",
        }
    }

    /// Whether this role sees a roll-up across supervised leaders rather than
    /// a single leader's own report.
    pub fn is_supervisory(self) -> bool {
        matches!(self, Role::Discipulador | Role::Obreiro | Role::Pastor)
    }
}

/// Rank used for access decisions: unresolved labels are least-privileged.
pub fn effective_role(raw: Option<&str>) -> Role {
    Role::normalize(raw).unwrap_or(Role::Membro)
}

/// Display string for a raw label, defaulting to "Membro" when unresolved.
pub fn display_label(raw: Option<&str>) -> &'static str {
    effective_role(raw).display()
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.display())
    }
}
