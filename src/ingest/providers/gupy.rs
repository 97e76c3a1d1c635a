// src/ingest/providers/gupy.rs
use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;

use super::{conclude, fetch_items, lenient_string, normalize_items};
use crate::config::HarvesterConfig;
use crate::ingest::date_part;
use crate::ingest::types::{JobProvider, JobRecord, QueryParams, SearchOutcome, Source};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GupyJob {
    #[serde(default, deserialize_with = "lenient_string")]
    name: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    career_page_name: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    published_date: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    workplace_type: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    city: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    state: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    job_url: Option<String>,
}

impl From<GupyJob> for JobRecord {
    fn from(j: GupyJob) -> Self {
        JobRecord {
            name: j.name,
            organization_name: j.career_page_name,
            published_date: date_part(j.published_date.as_deref()),
            workplace_type: j.workplace_type,
            city: j.city,
            state: j.state,
            job_url: j.job_url,
        }
    }
}

/// Gupy portal search. Results live at `data`.
pub struct GupyProvider {
    client: Client,
    url: String,
}

impl GupyProvider {
    pub fn new(client: Client, url: impl Into<String>) -> Self {
        Self {
            client,
            url: url.into(),
        }
    }

    pub fn from_config(client: Client, cfg: &HarvesterConfig) -> Self {
        Self::new(client, cfg.gupy_url.clone())
    }

    /// Query string for one search; workplace mode is sent as-is.
    pub fn request_params(params: &QueryParams) -> Vec<(&'static str, String)> {
        let mut q = vec![("jobName", params.job_name.clone())];
        if let Some(city) = &params.city {
            q.push(("city", city.clone()));
        }
        if let Some(state) = &params.state {
            q.push(("state", state.clone()));
        }
        if let Some(mode) = &params.workplace_type {
            q.push(("workplaceType", mode.clone()));
        }
        q
    }

    /// Map raw items; todayOnly checks the raw `publishedDate`.
    pub fn normalize(items: Vec<Value>, today_only: bool, today: NaiveDate) -> Vec<JobRecord> {
        normalize_items(
            Source::Gupy,
            items,
            today_only,
            today,
            |j: &GupyJob| j.published_date.as_deref(),
            JobRecord::from,
        )
    }
}

#[async_trait]
impl JobProvider for GupyProvider {
    fn source(&self) -> Source {
        Source::Gupy
    }

    async fn search(&self, params: &QueryParams, today: NaiveDate) -> SearchOutcome {
        let query = Self::request_params(params);
        let fetched = fetch_items(&self.client, &self.url, &query, Source::Gupy, "/data").await;
        let records = fetched.map(|items| Self::normalize(items, params.today_only, today));
        conclude(Source::Gupy, records)
    }
}
