// src/ingest/fanout.rs
//! One task per job title; start all, join all, then drain the results.

use metrics::gauge;
use std::sync::Arc;
use tokio::sync::mpsc;

use crate::ingest::aggregate::Aggregator;
use crate::ingest::types::JobRecord;

/// Runs `Aggregator::run` for every title concurrently and concatenates the
/// per-title slices. No ordering across titles. A unit that panics loses its
/// own contribution only; siblings still finish and are collected.
pub async fn run_all(aggregator: Arc<Aggregator>, job_titles: &[String]) -> Vec<JobRecord> {
    let (tx, mut rx) = mpsc::unbounded_channel::<Vec<JobRecord>>();

    let mut units = Vec::with_capacity(job_titles.len());
    for title in job_titles {
        let agg = Arc::clone(&aggregator);
        let tx = tx.clone();
        let job = title.clone();
        let handle = tokio::spawn(async move {
            let records = agg.run(&job).await;
            // Receiver outlives every unit; a send error cannot happen here.
            let _ = tx.send(records);
        });
        units.push((title.clone(), handle));
    }
    drop(tx);

    let mut lost = 0usize;
    for (title, handle) in units {
        if let Err(e) = handle.await {
            lost += 1;
            tracing::error!(job = %title, error = %e, "fan-out unit crashed; its results are lost");
        }
    }

    let mut merged = Vec::new();
    while let Some(batch) = rx.recv().await {
        merged.extend(batch);
    }

    let now = chrono::Utc::now().timestamp().max(0) as f64;
    gauge!("harvest_last_run_ts").set(now);
    tracing::info!(
        titles = job_titles.len(),
        lost,
        records = merged.len(),
        "fan-out finished"
    );
    merged
}
