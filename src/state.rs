use std::sync::Arc;

use crate::aggregation::AggregationEngine;
use crate::dashboard::{DashboardRegistry, StatsCache};
use crate::store::{ParticipantRoster, ProfileDirectory, ReportStore};

/// Services shared by every request, constructed once at startup.
pub struct AppState {
    pub directory: Arc<dyn ProfileDirectory>,
    pub roster: Arc<dyn ParticipantRoster>,
    pub reports: Arc<dyn ReportStore>,
    pub engine: Arc<AggregationEngine>,
    pub dashboards: DashboardRegistry,
}

impl AppState {
    pub fn new<S>(store: Arc<S>, cache: StatsCache) -> Self
    where
        S: ProfileDirectory + ParticipantRoster + ReportStore + 'static,
    {
        let directory: Arc<dyn ProfileDirectory> = store.clone();
        let roster: Arc<dyn ParticipantRoster> = store.clone();
        let reports: Arc<dyn ReportStore> = store;
        let engine = Arc::new(AggregationEngine::new(directory.clone(), reports.clone()));
        let dashboards = DashboardRegistry::new(engine.clone(), directory.clone(), Arc::new(cache));
        AppState {
            directory,
            roster,
            reports,
            engine,
            dashboards,
        }
    }
}
