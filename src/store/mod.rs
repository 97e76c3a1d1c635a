// src/store/mod.rs
//! Dated, source-scoped CSV store with append-and-deduplicate semantics.

pub mod charset;

use async_trait::async_trait;
use chrono::NaiveDate;
use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

use crate::config::HarvesterConfig;
use crate::error::{Result, StoreError};
use crate::ingest::day_string;
use crate::ingest::types::{JobRecord, SearchOutcome, Source};
use charset::CharsetChain;

/// Where archival sweeps send each record.
#[async_trait]
pub trait RecordSink: Send + Sync {
    /// Persist one record under `(source, publish date, job name)`.
    /// Returns the number of rows actually added (0 for a duplicate).
    async fn archive(&self, source: Source, job_name: &str, record: &JobRecord) -> Result<usize>;
}

/// Publish date of a record as a calendar day.
pub fn archive_day(record: &JobRecord) -> Result<NaiveDate> {
    record
        .published_date
        .as_deref()
        .and_then(|d| NaiveDate::parse_from_str(d, "%Y-%m-%d").ok())
        .ok_or_else(|| StoreError::UnparsableDate(record.published_date.clone()))
}

fn file_safe(name: &str) -> String {
    name.chars()
        .map(|c| if matches!(c, '/' | '\\' | ':') { '-' } else { c })
        .collect()
}

pub struct DatedStore {
    archive_root: PathBuf,
    daily_root: PathBuf,
    charsets: CharsetChain,
    // One lock per file being written; entries go away when the last writer leaves.
    locks: Mutex<HashMap<PathBuf, Arc<Mutex<()>>>>,
}

impl DatedStore {
    pub fn new(
        archive_root: impl Into<PathBuf>,
        daily_root: impl Into<PathBuf>,
        charsets: CharsetChain,
    ) -> Self {
        Self {
            archive_root: archive_root.into(),
            daily_root: daily_root.into(),
            charsets,
            locks: Mutex::new(HashMap::new()),
        }
    }

    pub fn from_config(cfg: &HarvesterConfig) -> Result<Self> {
        let charsets = CharsetChain::from_labels(&cfg.charsets)?;
        Ok(Self::new(
            cfg.output_dir.clone(),
            cfg.daily_dir.clone(),
            charsets,
        ))
    }

    /// `<root>/<Source>/<day>/<source>_<job>_<day>.csv`
    pub fn archive_path(&self, source: Source, job_name: &str, day: NaiveDate) -> PathBuf {
        let d = day_string(day);
        self.archive_root
            .join(source.display_name())
            .join(&d)
            .join(format!("{}_{}_{}.csv", source.slug(), file_safe(job_name), d))
    }

    /// `<daily root>/<source>_<day>.csv`
    pub fn daily_path(&self, source: Source, day: NaiveDate) -> PathBuf {
        self.daily_root
            .join(format!("{}_{}.csv", source.slug(), day_string(day)))
    }

    /// Append `records` to the CSV at `path`, skipping rows already present
    /// (full-row equality, first occurrence kept). Returns rows added.
    pub fn append_dedup(&self, path: &Path, records: &[JobRecord]) -> Result<usize> {
        let lock = self.lock_for(path);
        let res = {
            let _guard = lock.lock().unwrap_or_else(PoisonError::into_inner);
            self.merge_into(path, records)
        };
        self.release(path, lock);
        res
    }

    fn merge_into(&self, path: &Path, records: &[JobRecord]) -> Result<usize> {
        let (mut rows, charset) = if path.exists() {
            let bytes = fs::read(path)?;
            let (text, enc) = self.charsets.decode(&bytes, path)?;
            (parse_rows(&text)?, Some(enc))
        } else {
            (Vec::new(), None)
        };

        let mut seen: HashSet<JobRecord> = rows.iter().map(JobRecord::canonical).collect();
        let before = rows.len();
        for rec in records {
            let canon = rec.canonical();
            if seen.insert(canon.clone()) {
                rows.push(canon);
            }
        }
        let added = rows.len() - before;
        if added == 0 {
            return Ok(0);
        }

        let text = render_rows(&rows, path)?;
        let (bytes, used) = self.charsets.encode(&text, charset, path)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, bytes)?;
        tracing::debug!(path = %path.display(), added, charset = used.name(), "dated file updated");
        Ok(added)
    }

    /// Rows currently stored at `path` (empty when the file does not exist).
    pub fn read_rows(&self, path: &Path) -> Result<Vec<JobRecord>> {
        if !path.exists() {
            return Ok(Vec::new());
        }
        let bytes = fs::read(path)?;
        let (text, _) = self.charsets.decode(&bytes, path)?;
        parse_rows(&text)
    }

    /// Daily-sweep save: one provider's outcome into today's file.
    /// Both sentinels mean "nothing to save".
    pub fn save_outcome(&self, source: Source, outcome: &SearchOutcome, day: NaiveDate) -> Result<usize> {
        match outcome {
            SearchOutcome::Found(records) if !records.is_empty() => {
                self.append_dedup(&self.daily_path(source, day), records)
            }
            _ => {
                tracing::debug!(source = %source, outcome = outcome.label(), "no valid data to save");
                Ok(0)
            }
        }
    }

    fn lock_for(&self, path: &Path) -> Arc<Mutex<()>> {
        let mut locks = self.locks.lock().unwrap_or_else(PoisonError::into_inner);
        locks.entry(path.to_path_buf()).or_default().clone()
    }

    /// Drop the per-path lock once no other writer holds or awaits it.
    fn release(&self, path: &Path, lock: Arc<Mutex<()>>) {
        let mut locks = self.locks.lock().unwrap_or_else(PoisonError::into_inner);
        drop(lock);
        if locks.get(path).is_some_and(|l| Arc::strong_count(l) == 1) {
            locks.remove(path);
        }
    }
}

#[async_trait]
impl RecordSink for DatedStore {
    async fn archive(&self, source: Source, job_name: &str, record: &JobRecord) -> Result<usize> {
        let day = archive_day(record)?;
        let path = self.archive_path(source, job_name, day);
        self.append_dedup(&path, std::slice::from_ref(record))
    }
}

fn parse_rows(text: &str) -> Result<Vec<JobRecord>> {
    let mut rdr = csv::Reader::from_reader(text.as_bytes());
    let mut out = Vec::new();
    for row in rdr.deserialize::<JobRecord>() {
        out.push(row?);
    }
    Ok(out)
}

fn render_rows(rows: &[JobRecord], path: &Path) -> Result<String> {
    let mut w = csv::Writer::from_writer(Vec::new());
    for r in rows {
        w.serialize(r)?;
    }
    let buf = w.into_inner().map_err(|e| StoreError::Io(e.into_error()))?;
    String::from_utf8(buf).map_err(|_| StoreError::EncodingFailure {
        path: path.to_path_buf(),
        tried: "utf-8".into(),
    })
}

/// In-memory sink for tests and dry runs. Applies the same date rule as the
/// dated store and deduplicates per `(source, job, day)`.
#[derive(Default)]
pub struct MemorySink {
    pub rows: Mutex<Vec<(Source, String, JobRecord)>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.rows.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl RecordSink for MemorySink {
    async fn archive(&self, source: Source, job_name: &str, record: &JobRecord) -> Result<usize> {
        archive_day(record)?;
        let canon = record.canonical();
        let mut rows = self.rows.lock().unwrap_or_else(PoisonError::into_inner);
        let dup = rows
            .iter()
            .any(|(s, j, r)| *s == source && j == job_name && *r == canon);
        if dup {
            return Ok(0);
        }
        rows.push((source, job_name.to_string(), canon));
        Ok(1)
    }
}
