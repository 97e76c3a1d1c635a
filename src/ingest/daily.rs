// src/ingest/daily.rs
//! "What's new today" sweep over an explicit query list. Each provider's
//! result lands in `<daily dir>/<source>_<today>.csv`.

use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::Arc;

use crate::ingest::types::{Clock, JobProvider, QueryParams, SearchOutcome, Source};
use crate::store::DatedStore;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DailySummary {
    pub queries: usize,
    /// Rows newly appended per source.
    pub saved: BTreeMap<Source, usize>,
    pub fetch_failed: usize,
    pub no_results: usize,
    pub write_errors: usize,
}

/// Runs each query against every provider, in the given order, and appends
/// the non-sentinel results to today's per-source file.
pub async fn run_daily(
    providers: &[Arc<dyn JobProvider>],
    queries: &[QueryParams],
    store: &DatedStore,
    clock: &dyn Clock,
) -> DailySummary {
    crate::ingest::ensure_metrics_described();
    let today = clock.today();
    let mut summary = DailySummary {
        queries: queries.len(),
        ..Default::default()
    };

    for params in queries {
        for provider in providers {
            let source = provider.source();
            let outcome = provider.search(params, today).await;
            match &outcome {
                SearchOutcome::FetchFailed => summary.fetch_failed += 1,
                SearchOutcome::NoResultsMatchedCriteria => summary.no_results += 1,
                SearchOutcome::Found(v) => {
                    tracing::info!(source = %source, job = %params.job_name, found = v.len(), "daily query")
                }
            }
            match store.save_outcome(source, &outcome, today) {
                Ok(added) => *summary.saved.entry(source).or_default() += added,
                Err(e) => {
                    summary.write_errors += 1;
                    tracing::warn!(error = %e, source = %source, "daily save failed");
                }
            }
        }
    }

    tracing::info!(?summary, "daily sweep finished");
    summary
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ingest::types::{FixedClock, JobRecord};
    use crate::store::charset::CharsetChain;
    use async_trait::async_trait;
    use chrono::NaiveDate;

    struct Fixed(Source, SearchOutcome);

    #[async_trait]
    impl JobProvider for Fixed {
        fn source(&self) -> Source {
            self.0
        }
        async fn search(&self, _params: &QueryParams, _today: NaiveDate) -> SearchOutcome {
            self.1.clone()
        }
    }

    #[tokio::test]
    async fn saves_found_and_counts_sentinels() {
        let tmp = tempfile::tempdir().unwrap();
        let store = DatedStore::new(
            tmp.path().join("archive"),
            tmp.path(),
            CharsetChain::from_labels(&["utf-8"]).unwrap(),
        );
        let rec = JobRecord {
            name: Some("Dev".into()),
            published_date: Some("2024-05-02".into()),
            ..Default::default()
        };
        let providers: Vec<Arc<dyn JobProvider>> = vec![
            Arc::new(Fixed(Source::Solides, SearchOutcome::FetchFailed)),
            Arc::new(Fixed(Source::Gupy, SearchOutcome::Found(vec![rec]))),
        ];
        let queries = vec![
            QueryParams::new("qa").workplace("remote").today_only(true),
            QueryParams::new("python").workplace("remote").today_only(true),
        ];
        let day = NaiveDate::from_ymd_opt(2024, 5, 2).unwrap();

        let s = run_daily(&providers, &queries, &store, &FixedClock(day)).await;
        assert_eq!(s.queries, 2);
        assert_eq!(s.fetch_failed, 2);
        // Same record twice: second append is a duplicate.
        assert_eq!(s.saved.get(&Source::Gupy), Some(&1));
        assert_eq!(s.saved.get(&Source::Solides), Some(&0));
        assert!(store.daily_path(Source::Gupy, day).exists());
        assert!(!store.daily_path(Source::Solides, day).exists());
    }
}
