use serde::{Deserialize, Serialize};

use crate::models::period::current_month_key;

/// The one shape handed to the presentation layer, whatever role produced it.
/// Also the record persisted by the offline statistics cache.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AggregateStatistics {
    #[serde(default)]
    pub average_members: u32,
    #[serde(default)]
    pub average_attendees: u32,
    #[serde(default)]
    pub average_visitors: u32,
    #[serde(default = "current_month_key")]
    pub month: String,
}

impl AggregateStatistics {
    pub fn zeroed(month: impl Into<String>) -> Self {
        AggregateStatistics {
            average_members: 0,
            average_attendees: 0,
            average_visitors: 0,
            month: month.into(),
        }
    }
}

impl Default for AggregateStatistics {
    fn default() -> Self {
        Self::zeroed(current_month_key())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_with_flat_camel_case_fields() {
        let stats = AggregateStatistics {
            average_members: 8,
            average_attendees: 3,
            average_visitors: 0,
            month: "2024-03".into(),
        };
        let json = serde_json::to_value(&stats).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "averageMembers": 8,
                "averageAttendees": 3,
                "averageVisitors": 0,
                "month": "2024-03"
            })
        );
    }

    #[test]
    fn missing_fields_take_defaults() {
        let stats: AggregateStatistics =
            serde_json::from_str(r#"{"averageMembers": 5}"#).unwrap();
        assert_eq!(stats.average_members, 5);
        assert_eq!(stats.average_attendees, 0);
        assert_eq!(stats.average_visitors, 0);
        assert_eq!(stats.month, current_month_key());
    }
}
