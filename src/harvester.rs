// src/harvester.rs
//! Wires configuration into providers, the dated store and the aggregator.

use anyhow::{Context, Result};
use std::sync::Arc;

use crate::config::HarvesterConfig;
use crate::ingest::aggregate::{Aggregator, RunOptions};
use crate::ingest::daily::{run_daily, DailySummary};
use crate::ingest::fanout::run_all;
use crate::ingest::providers::{build_client, gupy::GupyProvider, solides::SolidesProvider};
use crate::ingest::query::QueryPlan;
use crate::ingest::types::{Clock, JobProvider, JobRecord, SystemClock};
use crate::store::{DatedStore, RecordSink};

pub struct Harvester {
    config: HarvesterConfig,
    gupy: Arc<dyn JobProvider>,
    solides: Arc<dyn JobProvider>,
    store: Arc<DatedStore>,
    clock: Arc<dyn Clock>,
}

impl Harvester {
    pub fn from_config(config: HarvesterConfig) -> Result<Self> {
        config.validate()?;
        let client = build_client(&config)?;
        let store = DatedStore::from_config(&config).context("building dated store")?;
        Ok(Self {
            gupy: Arc::new(GupyProvider::from_config(client.clone(), &config)),
            solides: Arc::new(SolidesProvider::from_config(client, &config)),
            store: Arc::new(store),
            clock: Arc::new(SystemClock),
            config,
        })
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn store(&self) -> &DatedStore {
        &self.store
    }

    /// Aggregator over Gupy then Solides, archiving into the dated store.
    pub fn aggregator(&self, options: RunOptions) -> Arc<Aggregator> {
        let sink: Arc<dyn RecordSink> = self.store.clone();
        Arc::new(
            Aggregator::new(
                vec![self.gupy.clone(), self.solides.clone()],
                QueryPlan::new(self.config.query.clone()),
            )
            .with_clock(self.clock.clone())
            .with_sink(sink)
            .with_options(options),
        )
    }

    pub async fn run_all(&self, job_titles: &[String], options: RunOptions) -> Vec<JobRecord> {
        run_all(self.aggregator(options), job_titles).await
    }

    /// Configured daily query list; Solides is asked before Gupy.
    pub async fn run_daily(&self) -> DailySummary {
        let providers = [self.solides.clone(), self.gupy.clone()];
        run_daily(&providers, &self.config.daily, &self.store, self.clock.as_ref()).await
    }
}
