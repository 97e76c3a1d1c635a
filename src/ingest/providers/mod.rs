// src/ingest/providers/mod.rs
//! Shared plumbing for the job board adapters: HTTP client, the single-attempt
//! fetch, lenient field extraction and the outcome tagging.

pub mod gupy;
pub mod solides;

use chrono::NaiveDate;
use metrics::{counter, histogram};
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use std::time::{Duration, Instant};

use crate::config::HarvesterConfig;
use crate::ingest::types::{JobRecord, SearchOutcome, Source};

const USER_AGENT: &str = concat!("job-harvester/", env!("CARGO_PKG_VERSION"));

/// Build the HTTP client shared by both adapters.
pub fn build_client(cfg: &HarvesterConfig) -> anyhow::Result<Client> {
    Client::builder()
        .timeout(Duration::from_secs(cfg.http_timeout_secs))
        .user_agent(USER_AGENT)
        .build()
        .map_err(|e| anyhow::anyhow!("failed to build HTTP client: {e}"))
}

/// Single GET. `Some(items)` on HTTP 200 (items found at `pointer`, empty when
/// missing); `None` on transport error, non-200, or an undecodable body.
pub(crate) async fn fetch_items(
    client: &Client,
    url: &str,
    query: &[(&str, String)],
    source: Source,
    pointer: &str,
) -> Option<Vec<Value>> {
    let t0 = Instant::now();
    counter!("harvest_fetch_total", "source" => source.slug()).increment(1);

    let resp = match client.get(url).query(query).send().await {
        Ok(r) => r,
        Err(e) => {
            tracing::warn!(error = ?e, source = %source, "provider http error");
            counter!("harvest_provider_errors_total", "source" => source.slug()).increment(1);
            return None;
        }
    };

    let status = resp.status();
    if status != StatusCode::OK {
        tracing::warn!(
            status = status.as_u16(),
            source = %source,
            "failed to fetch job listings"
        );
        counter!("harvest_provider_errors_total", "source" => source.slug()).increment(1);
        return None;
    }

    let mut body: Value = match resp.json().await {
        Ok(v) => v,
        Err(e) => {
            tracing::warn!(error = ?e, source = %source, "provider body is not json");
            counter!("harvest_provider_errors_total", "source" => source.slug()).increment(1);
            return None;
        }
    };

    let ms = t0.elapsed().as_secs_f64() * 1_000.0;
    histogram!("harvest_fetch_ms", "source" => source.slug()).record(ms);

    match body.pointer_mut(pointer).map(Value::take) {
        Some(Value::Array(items)) => Some(items),
        _ => Some(Vec::new()),
    }
}

/// Normalize raw items and apply the todayOnly filter.
/// `published` picks the provider's raw publish-time field; items that are not
/// objects, or do not deserialize as `T`, are skipped.
pub(crate) fn normalize_items<T, P, E>(
    source: Source,
    items: Vec<Value>,
    today_only: bool,
    today: NaiveDate,
    published: P,
    extract: E,
) -> Vec<JobRecord>
where
    T: DeserializeOwned,
    P: Fn(&T) -> Option<&str>,
    E: Fn(T) -> JobRecord,
{
    let mut out = Vec::with_capacity(items.len());
    for item in items {
        if !item.is_object() {
            tracing::debug!(source = %source, "skipping job item that is not an object");
            continue;
        }
        let job: T = match serde_json::from_value(item) {
            Ok(j) => j,
            Err(e) => {
                tracing::debug!(error = %e, source = %source, "skipping malformed job item");
                continue;
            }
        };
        if today_only && !crate::ingest::published_on(published(&job), today) {
            continue;
        }
        out.push(extract(job));
    }
    out
}

/// Tag the result of one search.
pub(crate) fn conclude(source: Source, records: Option<Vec<JobRecord>>) -> SearchOutcome {
    match records {
        None => SearchOutcome::FetchFailed,
        Some(v) if v.is_empty() => {
            tracing::info!(source = %source, "no jobs matched the selected criteria");
            counter!("harvest_no_results_total", "source" => source.slug()).increment(1);
            SearchOutcome::NoResultsMatchedCriteria
        }
        Some(v) => SearchOutcome::Found(v),
    }
}

/// String field that tolerates wrong JSON types by treating them as absent.
pub(crate) fn lenient_string<'de, D>(d: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let v = Option::<Value>::deserialize(d)?;
    Ok(match v {
        Some(Value::String(s)) => Some(s),
        _ => None,
    })
}

/// `{ "name": "..." }` reference, flattened to its name.
pub(crate) fn lenient_name<'de, D>(d: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let v = Option::<Value>::deserialize(d)?;
    Ok(v.as_ref()
        .and_then(|o| o.get("name"))
        .and_then(Value::as_str)
        .map(str::to_string))
}
