// src/ingest/query.rs
//! Query expansion: one job title becomes a fixed set of search variants.

use crate::config::QueryPlanConfig;
use crate::ingest::types::QueryParams;

/// Expands job titles into the three location/work-mode variants:
/// primary city, secondary city (same state), then remote with no location.
#[derive(Debug, Clone, Default)]
pub struct QueryPlan {
    cfg: QueryPlanConfig,
}

impl QueryPlan {
    pub fn new(cfg: QueryPlanConfig) -> Self {
        Self { cfg }
    }

    pub fn expand(&self, job_title: &str, today_only: bool) -> Vec<QueryParams> {
        let c = &self.cfg;
        vec![
            QueryParams::new(job_title)
                .located(&c.primary_city, &c.state)
                .today_only(today_only),
            QueryParams::new(job_title)
                .located(&c.secondary_city, &c.state)
                .today_only(today_only),
            QueryParams::new(job_title)
                .workplace(&c.remote_mode)
                .today_only(today_only),
        ]
    }
}
