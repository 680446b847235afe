//! Dashboard orchestration for one requester profile.
//!
//! Each `load` takes a fresh request token. Only the result of the latest
//! token is accepted into the context's current view and the offline cache;
//! a request overtaken by a newer one still returns its result, flagged as
//! superseded, and leaves the shared state alone.

pub mod cache;

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;
use tokio::sync::{Mutex, RwLock};

use crate::aggregation::AggregationEngine;
use crate::errors::AppError;
use crate::models::period::{Period, current_month_key};
use crate::models::role::Role;
use crate::models::stats::AggregateStatistics;
use crate::store::ProfileDirectory;

pub use cache::StatsCache;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StatsSource {
    Live,
    Cache,
    Default,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardView {
    pub profile_id: i64,
    pub role: Role,
    pub role_label: &'static str,
    pub stats: AggregateStatistics,
    pub source: StatsSource,
    pub token: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadOutcome {
    Accepted(DashboardView),
    Superseded(DashboardView),
}

impl LoadOutcome {
    pub fn view(&self) -> &DashboardView {
        match self {
            LoadOutcome::Accepted(v) | LoadOutcome::Superseded(v) => v,
        }
    }

    pub fn is_superseded(&self) -> bool {
        matches!(self, LoadOutcome::Superseded(_))
    }
}

pub struct DashboardContext {
    profile_id: i64,
    engine: Arc<AggregationEngine>,
    directory: Arc<dyn ProfileDirectory>,
    cache: Arc<StatsCache>,
    latest: AtomicU64,
    last_period: Mutex<Option<Period>>,
    current: RwLock<Option<DashboardView>>,
}

impl DashboardContext {
    pub fn new(
        profile_id: i64,
        engine: Arc<AggregationEngine>,
        directory: Arc<dyn ProfileDirectory>,
        cache: Arc<StatsCache>,
    ) -> Self {
        DashboardContext {
            profile_id,
            engine,
            directory,
            cache,
            latest: AtomicU64::new(0),
            last_period: Mutex::new(None),
            current: RwLock::new(None),
        }
    }

    pub fn profile_id(&self) -> i64 {
        self.profile_id
    }

    /// Last accepted view, if any request has completed.
    pub async fn current(&self) -> Option<DashboardView> {
        self.current.read().await.clone()
    }

    /// Run the aggregation matching the profile's canonical role.
    pub async fn load(&self, period: Option<Period>) -> Result<LoadOutcome, AppError> {
        let token = self.latest.fetch_add(1, Ordering::SeqCst) + 1;
        *self.last_period.lock().await = period;

        let profile = match self.directory.find_profile(self.profile_id).await {
            Ok(Some(profile)) => Some(profile),
            Ok(None) => return Err(AppError::NotFound(format!("profile {}", self.profile_id))),
            Err(e) if e.is_io() => {
                log::error!("Dashboard {}: profile lookup failed: {e}", self.profile_id);
                None
            }
            Err(e) => return Err(e),
        };

        let (role, stats, source) = match &profile {
            Some(profile) => {
                let role = profile.effective_role();
                let (stats, source) = self.stats_for(profile.role(), period).await?;
                (role, stats, source)
            }
            None => {
                let (stats, source) = self.fallback(None, period).await;
                (Role::Membro, stats, source)
            }
        };

        let view = DashboardView {
            profile_id: self.profile_id,
            role,
            role_label: role.display(),
            stats,
            source,
            token,
        };

        // Held across the token check and both writes, so a newer request
        // cannot be overwritten by this one once it has been accepted.
        let mut current = self.current.write().await;
        if self.latest.load(Ordering::SeqCst) != token {
            log::debug!("Dashboard {}: discarding superseded request {token}", self.profile_id);
            return Ok(LoadOutcome::Superseded(view));
        }

        if source == StatsSource::Live {
            if let Err(e) = self.cache.put(self.profile_id, &view.stats).await {
                log::warn!("Dashboard {}: cache write failed: {e}", self.profile_id);
            }
        }
        *current = Some(view.clone());
        Ok(LoadOutcome::Accepted(view))
    }

    /// Manual refresh: re-issue the last request.
    pub async fn refresh(&self) -> Result<LoadOutcome, AppError> {
        let period = *self.last_period.lock().await;
        self.load(period).await
    }

    async fn stats_for(
        &self,
        role: Option<Role>,
        period: Option<Period>,
    ) -> Result<(AggregateStatistics, StatsSource), AppError> {
        match self.engine.try_aggregate(role, self.profile_id, period).await {
            Ok(stats) => Ok((stats, StatsSource::Live)),
            Err(e) if e.is_io() => {
                log::error!("Dashboard {}: aggregation failed: {e}", self.profile_id);
                Ok(self.fallback(role, period).await)
            }
            Err(e) => Err(e),
        }
    }

    /// Cached record when it matches the requested month, otherwise zeros.
    /// Without a requested month (and always for a leader, whose view has no
    /// period) the last cached record is served whatever its month.
    async fn fallback(
        &self,
        role: Option<Role>,
        period: Option<Period>,
    ) -> (AggregateStatistics, StatsSource) {
        let wanted = match (role, period) {
            (Some(Role::Lider), _) | (_, None) => None,
            (_, Some(p)) => Some(p.key()),
        };
        match self.cache.get(self.profile_id).await {
            Some(cached) if wanted.as_deref().is_none_or(|m| m == cached.month) => {
                (cached, StatsSource::Cache)
            }
            _ => (
                AggregateStatistics::zeroed(wanted.unwrap_or_else(current_month_key)),
                StatsSource::Default,
            ),
        }
    }
}

/// Contexts kept before idle ones are evicted.
pub const DEFAULT_MAX_CONTEXTS: usize = 1024;

/// One `DashboardContext` per known requester profile, created on first use.
pub struct DashboardRegistry {
    engine: Arc<AggregationEngine>,
    directory: Arc<dyn ProfileDirectory>,
    cache: Arc<StatsCache>,
    max_contexts: usize,
    contexts: Mutex<HashMap<i64, Arc<DashboardContext>>>,
}

impl DashboardRegistry {
    pub fn new(
        engine: Arc<AggregationEngine>,
        directory: Arc<dyn ProfileDirectory>,
        cache: Arc<StatsCache>,
    ) -> Self {
        Self::with_capacity(engine, directory, cache, DEFAULT_MAX_CONTEXTS)
    }

    pub fn with_capacity(
        engine: Arc<AggregationEngine>,
        directory: Arc<dyn ProfileDirectory>,
        cache: Arc<StatsCache>,
        max_contexts: usize,
    ) -> Self {
        DashboardRegistry {
            engine,
            directory,
            cache,
            max_contexts: max_contexts.max(1),
            contexts: Mutex::new(HashMap::new()),
        }
    }

    /// The shared context for `profile_id`. Unknown profiles are `NotFound`
    /// and never get an entry. When the directory cannot be reached the
    /// context is still handed out so the offline cache can answer.
    pub async fn context_for(&self, profile_id: i64) -> Result<Arc<DashboardContext>, AppError> {
        if let Some(ctx) = self.contexts.lock().await.get(&profile_id) {
            return Ok(ctx.clone());
        }

        match self.directory.find_profile(profile_id).await {
            Ok(Some(_)) => {}
            Ok(None) => return Err(AppError::NotFound(format!("profile {profile_id}"))),
            Err(e) if e.is_io() => {
                log::warn!("Dashboard {profile_id}: cannot confirm profile, opening offline: {e}");
            }
            Err(e) => return Err(e),
        }

        let mut contexts = self.contexts.lock().await;
        if let Some(ctx) = contexts.get(&profile_id) {
            return Ok(ctx.clone());
        }
        if contexts.len() >= self.max_contexts {
            // Only the registry holds an idle context.
            contexts.retain(|_, ctx| Arc::strong_count(ctx) > 1);
            log::debug!("Dashboard registry evicted idle contexts, {} remain", contexts.len());
        }
        let ctx = Arc::new(DashboardContext::new(
            profile_id,
            self.engine.clone(),
            self.directory.clone(),
            self.cache.clone(),
        ));
        if contexts.len() < self.max_contexts {
            contexts.insert(profile_id, ctx.clone());
        } else {
            log::warn!("Dashboard registry full; context for {profile_id} is not retained");
        }
        Ok(ctx)
    }

    pub async fn len(&self) -> usize {
        self.contexts.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.contexts.lock().await.is_empty()
    }
}
