//! Role-scoped, month-bucketed report statistics.
//!
//! A leader sees their latest report as-is. Disciplers, obreiros and pastors
//! see the mean over every report in scope for a month: one report is one
//! meeting occurrence, so a leader who reports more often weighs more.
//! Means are rounded once, at the final division.

use std::collections::BTreeMap;
use std::sync::Arc;

use crate::errors::AppError;
use crate::hierarchy;
use crate::models::period::{DateRange, Period, current_month_key};
use crate::models::profile::Profile;
use crate::models::report::CellReport;
use crate::models::role::Role;
use crate::models::stats::AggregateStatistics;
use crate::store::{ProfileDirectory, ReportStore};

/// Running sums for one month bucket.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct MonthTotals {
    pub reports: u64,
    pub members: u64,
    pub attendees: u64,
    pub visitors: u64,
}

impl MonthTotals {
    fn add(&mut self, report: &CellReport) {
        self.reports += 1;
        self.members += report.effective_member_count() as u64;
        self.attendees += report.effective_attendee_count() as u64;
        self.visitors += u64::from(report.visitors());
    }

    pub fn averages(&self, month: impl Into<String>) -> AggregateStatistics {
        AggregateStatistics {
            average_members: rounded_mean(self.members, self.reports),
            average_attendees: rounded_mean(self.attendees, self.reports),
            average_visitors: rounded_mean(self.visitors, self.reports),
            month: month.into(),
        }
    }
}

fn rounded_mean(sum: u64, count: u64) -> u32 {
    if count == 0 {
        return 0;
    }
    (sum as f64 / count as f64).round() as u32
}

/// Group reports by the `YYYY-MM` of their `week_start`.
pub fn bucket_by_month(reports: &[CellReport]) -> BTreeMap<String, MonthTotals> {
    let mut buckets: BTreeMap<String, MonthTotals> = BTreeMap::new();
    for report in reports {
        buckets
            .entry(Period::of(report.week_start).key())
            .or_default()
            .add(report);
    }
    buckets
}

/// Averages for `period`, zeroed (with the month key set) when nothing was reported.
pub fn summarize_month(reports: &[CellReport], period: Period) -> AggregateStatistics {
    let key = period.key();
    match bucket_by_month(reports).get(&key) {
        Some(totals) => totals.averages(key),
        None => AggregateStatistics::zeroed(key),
    }
}

/// A leader's view of a single report; zeroed for the current month if none.
pub fn leader_snapshot(report: Option<&CellReport>) -> AggregateStatistics {
    match report {
        None => AggregateStatistics::zeroed(current_month_key()),
        Some(r) => AggregateStatistics {
            average_members: r.effective_member_count() as u32,
            average_attendees: r.effective_attendee_count() as u32,
            average_visitors: r.visitors(),
            month: Period::of(r.week_start).key(),
        },
    }
}

pub struct AggregationEngine {
    directory: Arc<dyn ProfileDirectory>,
    reports: Arc<dyn ReportStore>,
}

impl AggregationEngine {
    pub fn new(directory: Arc<dyn ProfileDirectory>, reports: Arc<dyn ReportStore>) -> Self {
        AggregationEngine { directory, reports }
    }

    /// Pastors aggregate the whole organization and must always name the month.
    pub fn resolve_period(role: Option<Role>, period: Option<Period>) -> Result<Option<Period>, AppError> {
        if role == Some(Role::Pastor) && period.is_none() {
            return Err(AppError::validation(
                "Pastor aggregation requires explicit month and year",
            ));
        }
        Ok(period)
    }

    fn fallback_month(role: Option<Role>, period: Option<Period>) -> String {
        match (role, period) {
            (Some(Role::Lider), _) | (_, None) => current_month_key(),
            (_, Some(p)) => p.key(),
        }
    }

    /// Public read path: I/O failures are logged and degrade to zeroed
    /// statistics. Only request-shape errors are returned.
    pub async fn aggregate(
        &self,
        role: Option<Role>,
        requester_id: i64,
        period: Option<Period>,
    ) -> Result<AggregateStatistics, AppError> {
        match self.try_aggregate(role, requester_id, period).await {
            Err(e) if e.is_io() => {
                log::error!(
                    "Aggregation for requester {requester_id} ({role:?}) failed, serving zeros: {e}"
                );
                Ok(AggregateStatistics::zeroed(Self::fallback_month(role, period)))
            }
            other => other,
        }
    }

    /// Same as `aggregate` but surfaces I/O failures, for callers with their
    /// own fallback (the dashboard's offline cache).
    pub async fn try_aggregate(
        &self,
        role: Option<Role>,
        requester_id: i64,
        period: Option<Period>,
    ) -> Result<AggregateStatistics, AppError> {
        let period = Self::resolve_period(role, period)?;
        let zeros = || AggregateStatistics::zeroed(Self::fallback_month(role, period));

        let Some(claimed) = role.filter(|r| *r == Role::Lider || r.is_supervisory()) else {
            return Ok(zeros());
        };
        let Some(requester) = self.requester(claimed, requester_id).await? else {
            return Ok(zeros());
        };

        if claimed == Role::Lider {
            let latest = self.reports.latest_report(requester.id).await?;
            return Ok(leader_snapshot(latest.as_ref()));
        }
        self.rollup(claimed, &requester, period.unwrap_or_else(Period::current))
            .await
    }

    /// Look up the requester and check that their profile carries at least
    /// the claimed role. An unknown requester has nothing in scope, which is
    /// not an error ("no supervised leaders yet" is valid).
    async fn requester(&self, claimed: Role, requester_id: i64) -> Result<Option<Profile>, AppError> {
        let Some(profile) = self.directory.find_profile(requester_id).await? else {
            log::warn!("Aggregation as {claimed} for unknown profile {requester_id}; using an empty scope");
            return Ok(None);
        };
        let actual = profile.effective_role();
        if claimed > actual {
            log::warn!("Profile {requester_id} ({actual}) tried to aggregate as {claimed}");
            return Err(AppError::PermissionDenied(format!(
                "profile {requester_id} is a {actual} and may not aggregate as {claimed}"
            )));
        }
        Ok(Some(profile))
    }

    async fn rollup(
        &self,
        role: Role,
        requester: &Profile,
        period: Period,
    ) -> Result<AggregateStatistics, AppError> {
        let range = period.range();
        let (scope, reports) = if role == Role::Pastor {
            // Organization-wide: the roster and the month's reports are independent reads.
            tokio::try_join!(
                hierarchy::visibility_scope(&*self.directory, requester, Some(role)),
                self.reports.reports_in_range(&range),
            )?
        } else {
            let scope = hierarchy::visibility_scope(&*self.directory, requester, Some(role)).await?;
            let ids: Vec<i64> = scope.iter().copied().collect();
            let reports = self.reports.reports_for_leaders(&ids, &range).await?;
            (scope, reports)
        };

        let in_scope: Vec<CellReport> = reports
            .into_iter()
            .filter(|r| scope.contains(&r.leader_id))
            .collect();
        log::debug!(
            "Rollup for {role} {} in {}: {} leaders, {} reports",
            requester.id,
            period.key(),
            scope.len(),
            in_scope.len()
        );
        Ok(summarize_month(&in_scope, period))
    }

    /// Month-by-month statistics for `year`, ascending, one entry per month
    /// that has reports in scope. I/O failures degrade to an empty history.
    pub async fn history(
        &self,
        role: Option<Role>,
        requester_id: i64,
        year: i32,
    ) -> Result<Vec<AggregateStatistics>, AppError> {
        let range = DateRange::year(year)?;
        match self.try_history(role, requester_id, &range).await {
            Err(e) if e.is_io() => {
                log::error!("History for requester {requester_id} ({role:?}) failed: {e}");
                Ok(Vec::new())
            }
            other => other,
        }
    }

    async fn try_history(
        &self,
        role: Option<Role>,
        requester_id: i64,
        range: &DateRange,
    ) -> Result<Vec<AggregateStatistics>, AppError> {
        let Some(claimed) = role.filter(|r| *r == Role::Lider || r.is_supervisory()) else {
            return Ok(Vec::new());
        };
        let Some(requester) = self.requester(claimed, requester_id).await? else {
            return Ok(Vec::new());
        };
        let scope = hierarchy::visibility_scope(&*self.directory, &requester, Some(claimed)).await?;
        let ids: Vec<i64> = scope.into_iter().collect();
        let reports = self.reports.reports_for_leaders(&ids, range).await?;
        Ok(bucket_by_month(&reports)
            .into_iter()
            .map(|(month, totals)| totals.averages(month))
            .collect())
    }
}
