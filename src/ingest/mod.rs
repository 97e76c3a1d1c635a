// src/ingest/mod.rs
pub mod aggregate;
pub mod daily;
pub mod fanout;
pub mod providers;
pub mod query;
pub mod types;

use chrono::NaiveDate;
use metrics::{describe_counter, describe_gauge, describe_histogram};
use once_cell::sync::OnceCell;

/// One-time metrics registration (so series show up on /metrics).
pub(crate) fn ensure_metrics_described() {
    static ONCE: OnceCell<()> = OnceCell::new();
    ONCE.get_or_init(|| {
        describe_counter!("harvest_fetch_total", "Provider search calls issued.");
        describe_counter!(
            "harvest_provider_errors_total",
            "Provider calls that ended in FetchFailed."
        );
        describe_counter!(
            "harvest_no_results_total",
            "Provider calls that matched nothing after filtering."
        );
        describe_counter!(
            "harvest_records_total",
            "Normalized records merged by the aggregator."
        );
        describe_counter!(
            "harvest_records_archived_total",
            "Records newly written to the dated store."
        );
        describe_counter!(
            "harvest_archive_skipped_total",
            "Records the dated store refused (bad date, charset, io)."
        );
        describe_histogram!("harvest_fetch_ms", "Provider round-trip in milliseconds.");
        describe_gauge!(
            "harvest_last_run_ts",
            "Unix ts when a fan-out run last finished."
        );
    });
}

/// Date portion of a provider timestamp: everything before the first `T`.
/// Absent or empty input gives `None`.
pub fn date_part(raw: Option<&str>) -> Option<String> {
    let raw = raw?;
    if raw.is_empty() {
        return None;
    }
    let day = raw.split('T').next().unwrap_or(raw);
    Some(day.to_string())
}

/// `YYYY-MM-DD` form used for todayOnly comparisons and file names.
pub fn day_string(day: NaiveDate) -> String {
    day.format("%Y-%m-%d").to_string()
}

/// todayOnly check against the provider's own publish-time field.
pub fn published_on(raw: Option<&str>, today: NaiveDate) -> bool {
    date_part(raw).is_some_and(|d| d == day_string(today))
}
