// src/ingest/types.rs
use async_trait::async_trait;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// The job boards this crate knows how to query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Source {
    Gupy,
    Solides,
}

impl Source {
    /// Directory name used by the dated store ("Gupy", "Solides").
    pub fn display_name(self) -> &'static str {
        match self {
            Source::Gupy => "Gupy",
            Source::Solides => "Solides",
        }
    }

    /// Lowercase file prefix ("gupy", "solides").
    pub fn slug(self) -> &'static str {
        match self {
            Source::Gupy => "gupy",
            Source::Solides => "solides",
        }
    }
}

impl std::fmt::Display for Source {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.display_name())
    }
}

/// Common job posting shape produced by every provider.
///
/// Every field is independently optional. `published_date` holds the date part
/// of the provider timestamp (`YYYY-MM-DD` when the provider is well behaved).
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobRecord {
    pub name: Option<String>,
    pub organization_name: Option<String>,
    pub published_date: Option<String>,
    pub workplace_type: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub job_url: Option<String>,
}

impl JobRecord {
    /// Same record with empty strings folded into `None`.
    /// Rows read back from disk lose the difference, so dedup compares this form.
    pub fn canonical(&self) -> JobRecord {
        fn fold(v: &Option<String>) -> Option<String> {
            v.as_ref().filter(|s| !s.is_empty()).cloned()
        }
        JobRecord {
            name: fold(&self.name),
            organization_name: fold(&self.organization_name),
            published_date: fold(&self.published_date),
            workplace_type: fold(&self.workplace_type),
            city: fold(&self.city),
            state: fold(&self.state),
            job_url: fold(&self.job_url),
        }
    }
}

/// One search request sent to every provider.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryParams {
    pub job_name: String,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub workplace_type: Option<String>,
    #[serde(default)]
    pub today_only: bool,
}

impl QueryParams {
    pub fn new(job_name: impl Into<String>) -> Self {
        Self {
            job_name: job_name.into(),
            ..Default::default()
        }
    }

    pub fn located(mut self, city: impl Into<String>, state: impl Into<String>) -> Self {
        self.city = Some(city.into());
        self.state = Some(state.into());
        self
    }

    pub fn workplace(mut self, mode: impl Into<String>) -> Self {
        self.workplace_type = Some(mode.into());
        self
    }

    pub fn today_only(mut self, on: bool) -> Self {
        self.today_only = on;
        self
    }
}

/// Result of one provider call for one `QueryParams`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchOutcome {
    /// Non-empty list of normalized records.
    Found(Vec<JobRecord>),
    /// The call succeeded but nothing survived normalization + filtering.
    NoResultsMatchedCriteria,
    /// Transport error or non-success status.
    FetchFailed,
}

impl SearchOutcome {
    pub fn records(&self) -> &[JobRecord] {
        match self {
            SearchOutcome::Found(v) => v,
            _ => &[],
        }
    }

    /// Records for merging; both sentinels contribute nothing.
    pub fn into_records(self) -> Vec<JobRecord> {
        match self {
            SearchOutcome::Found(v) => v,
            _ => Vec::new(),
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            SearchOutcome::Found(_) => "found",
            SearchOutcome::NoResultsMatchedCriteria => "no_results",
            SearchOutcome::FetchFailed => "fetch_failed",
        }
    }
}

/// Source of "today" for the todayOnly filter.
pub trait Clock: Send + Sync {
    fn today(&self) -> NaiveDate;
}

/// Local wall-clock date.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn today(&self) -> NaiveDate {
        chrono::Local::now().date_naive()
    }
}

/// Pinned date, for tests and replays.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub NaiveDate);

impl Clock for FixedClock {
    fn today(&self) -> NaiveDate {
        self.0
    }
}

/// A job board adapter: one fetch + normalize pipeline per provider.
#[async_trait]
pub trait JobProvider: Send + Sync {
    fn source(&self) -> Source;

    /// Search once. Never errors: every failure path resolves to a sentinel.
    async fn search(&self, params: &QueryParams, today: NaiveDate) -> SearchOutcome;
}
