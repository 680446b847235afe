//! Lost-participant bookkeeping on a single report.
//!
//! Presence sets keep everyone who was physically there; only the
//! aggregate-facing counts drop participants marked lost in the same report.
//! Nothing carries over between weeks.

use std::collections::HashSet;

use super::types::CellReport;

impl CellReport {
    pub fn lost_ids(&self) -> HashSet<i64> {
        self.lost_participants.iter().map(|l| l.participant_id).collect()
    }

    /// Members present, minus anyone marked lost in this report.
    pub fn effective_member_count(&self) -> usize {
        count_excluding(&self.members_present, &self.lost_ids())
    }

    /// Frequentadores present, minus anyone marked lost in this report.
    pub fn effective_attendee_count(&self) -> usize {
        count_excluding(&self.attendees_present, &self.lost_ids())
    }

    pub fn visitors(&self) -> u32 {
        self.visitor_count.unwrap_or(0)
    }
}

fn count_excluding(present: &[i64], lost: &HashSet<i64>) -> usize {
    present.iter().filter(|id| !lost.contains(id)).count()
}
