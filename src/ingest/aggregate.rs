// src/ingest/aggregate.rs
use metrics::counter;
use std::sync::Arc;

use crate::error::StoreError;
use crate::ingest::query::QueryPlan;
use crate::ingest::types::{Clock, JobProvider, JobRecord, Source, SystemClock};
use crate::store::RecordSink;

/// Per-run switches supplied by the trigger.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunOptions {
    /// Keep only postings published today.
    pub today_only: bool,
    /// Route every merged record to the sink as it arrives.
    pub archive: bool,
}

impl RunOptions {
    /// Full sweep, every record archived by publish date.
    pub fn archival() -> Self {
        Self {
            today_only: false,
            archive: true,
        }
    }

    /// "What's new today", returned to the caller only.
    pub fn today() -> Self {
        Self {
            today_only: true,
            archive: false,
        }
    }
}

impl Default for RunOptions {
    fn default() -> Self {
        Self::archival()
    }
}

/// Runs every provider for every expanded query of one job title.
pub struct Aggregator {
    providers: Vec<Arc<dyn JobProvider>>,
    plan: QueryPlan,
    clock: Arc<dyn Clock>,
    sink: Option<Arc<dyn RecordSink>>,
    options: RunOptions,
}

impl Aggregator {
    pub fn new(providers: Vec<Arc<dyn JobProvider>>, plan: QueryPlan) -> Self {
        Self {
            providers,
            plan,
            clock: Arc::new(SystemClock),
            sink: None,
            options: RunOptions::default(),
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_sink(mut self, sink: Arc<dyn RecordSink>) -> Self {
        self.sink = Some(sink);
        self
    }

    pub fn with_options(mut self, options: RunOptions) -> Self {
        self.options = options;
        self
    }

    /// Merged records for `job_title`, in query-expansion order then provider
    /// order. Sentinel outcomes contribute nothing; archiving problems are
    /// logged per record and never shrink the returned list.
    pub async fn run(&self, job_title: &str) -> Vec<JobRecord> {
        crate::ingest::ensure_metrics_described();
        let today = self.clock.today();
        let mut merged = Vec::new();

        for params in self.plan.expand(job_title, self.options.today_only) {
            for provider in &self.providers {
                let source = provider.source();
                let outcome = provider.search(&params, today).await;
                tracing::debug!(
                    source = %source,
                    job = %params.job_name,
                    city = params.city.as_deref().unwrap_or("-"),
                    mode = params.workplace_type.as_deref().unwrap_or("-"),
                    outcome = outcome.label(),
                    "provider search finished"
                );
                let records = outcome.into_records();
                counter!("harvest_records_total", "source" => source.slug())
                    .increment(records.len() as u64);

                if self.options.archive {
                    if let Some(sink) = &self.sink {
                        for record in &records {
                            self.archive_one(sink.as_ref(), source, &params.job_name, record)
                                .await;
                        }
                    }
                }
                merged.extend(records);
            }
        }

        tracing::info!(job = job_title, merged = merged.len(), "job title aggregated");
        merged
    }

    async fn archive_one(
        &self,
        sink: &dyn RecordSink,
        source: Source,
        job_name: &str,
        record: &JobRecord,
    ) {
        match sink.archive(source, job_name, record).await {
            Ok(added) => {
                counter!("harvest_records_archived_total", "source" => source.slug())
                    .increment(added as u64);
            }
            Err(StoreError::UnparsableDate(raw)) => {
                tracing::debug!(source = %source, date = ?raw, "skipping archive, unparsable publish date");
                counter!("harvest_archive_skipped_total", "source" => source.slug()).increment(1);
            }
            Err(e) => {
                tracing::warn!(error = %e, source = %source, job = job_name, "archive write failed");
                counter!("harvest_archive_skipped_total", "source" => source.slug()).increment(1);
            }
        }
    }
}
