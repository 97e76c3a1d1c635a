// src/config/harvester.rs
use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use crate::ingest::types::QueryParams;

pub const ENV_CONFIG_PATH: &str = "HARVESTER_CONFIG_PATH";
pub const DEFAULT_TOML_PATH: &str = "config/harvester.toml";
pub const DEFAULT_JSON_PATH: &str = "config/harvester.json";

pub const DEFAULT_GUPY_URL: &str = "https://portal.api.gupy.io/api/v1/jobs";
pub const DEFAULT_SOLIDES_URL: &str = "https://apigw.solides.com.br/jobs/v3/portal-vacancies-new";

fn default_gupy_url() -> String {
    DEFAULT_GUPY_URL.to_string()
}
fn default_solides_url() -> String {
    DEFAULT_SOLIDES_URL.to_string()
}
fn default_timeout() -> u64 {
    20
}
fn default_page() -> u32 {
    1
}
fn default_take() -> u32 {
    20
}
fn default_output_dir() -> PathBuf {
    PathBuf::from("Found jobs")
}
fn default_daily_dir() -> PathBuf {
    PathBuf::from(".")
}
fn default_charsets() -> Vec<String> {
    vec!["utf-8".into(), "windows-1252".into(), "utf-16le".into()]
}

/// Location/work-mode variants every job title is expanded into.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct QueryPlanConfig {
    pub primary_city: String,
    pub secondary_city: String,
    pub state: String,
    pub remote_mode: String,
}

impl Default for QueryPlanConfig {
    fn default() -> Self {
        Self {
            primary_city: "Curitiba".into(),
            secondary_city: "São José dos Pinhais".into(),
            state: "Paraná".into(),
            remote_mode: "remote".into(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HarvesterConfig {
    #[serde(default = "default_gupy_url")]
    pub gupy_url: String,
    #[serde(default = "default_solides_url")]
    pub solides_url: String,
    /// Per-request timeout; expiry counts as a fetch failure.
    #[serde(default = "default_timeout")]
    pub http_timeout_secs: u64,
    #[serde(default = "default_page")]
    pub solides_page: u32,
    #[serde(default = "default_take")]
    pub solides_take: u32,
    #[serde(default)]
    pub query: QueryPlanConfig,
    /// Full state name -> two-letter code (Solides location strings).
    #[serde(default = "default_state_abbreviations")]
    pub state_abbreviations: BTreeMap<String, String>,
    /// Archival root: `<output_dir>/<Source>/<date>/...`.
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
    /// Daily sweep root: `<daily_dir>/<source>_<today>.csv`.
    #[serde(default = "default_daily_dir")]
    pub daily_dir: PathBuf,
    /// Ordered charset fallback chain for the dated store.
    #[serde(default = "default_charsets")]
    pub charsets: Vec<String>,
    #[serde(default = "default_daily_queries")]
    pub daily: Vec<QueryParams>,
}

impl Default for HarvesterConfig {
    fn default() -> Self {
        Self {
            gupy_url: default_gupy_url(),
            solides_url: default_solides_url(),
            http_timeout_secs: default_timeout(),
            solides_page: default_page(),
            solides_take: default_take(),
            query: QueryPlanConfig::default(),
            state_abbreviations: default_state_abbreviations(),
            output_dir: default_output_dir(),
            daily_dir: default_daily_dir(),
            charsets: default_charsets(),
            daily: default_daily_queries(),
        }
    }
}

impl HarvesterConfig {
    /// Load from an explicit path. Supports TOML or JSON formats.
    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("reading harvester config from {}", path.display()))?;
        let ext = path
            .extension()
            .and_then(|s| s.to_str())
            .unwrap_or_default()
            .to_ascii_lowercase();
        let cfg = parse_config(&content, ext.as_str())
            .with_context(|| format!("parsing harvester config {}", path.display()))?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Load using env var + fallbacks:
    /// 1) $HARVESTER_CONFIG_PATH
    /// 2) config/harvester.toml
    /// 3) config/harvester.json
    /// 4) built-in defaults
    pub fn load_default() -> Result<Self> {
        if let Ok(p) = std::env::var(ENV_CONFIG_PATH) {
            let pb = PathBuf::from(p);
            if pb.exists() {
                return Self::load_from(&pb);
            }
            return Err(anyhow!("{ENV_CONFIG_PATH} points to non-existent path"));
        }
        let toml_p = PathBuf::from(DEFAULT_TOML_PATH);
        if toml_p.exists() {
            return Self::load_from(&toml_p);
        }
        let json_p = PathBuf::from(DEFAULT_JSON_PATH);
        if json_p.exists() {
            return Self::load_from(&json_p);
        }
        Ok(Self::default())
    }

    pub fn validate(&self) -> Result<()> {
        if self.charsets.is_empty() {
            anyhow::bail!("charsets must name at least one encoding");
        }
        if self.solides_take == 0 {
            anyhow::bail!("solides_take must be > 0");
        }
        if self.http_timeout_secs == 0 {
            anyhow::bail!("http_timeout_secs must be > 0");
        }
        Ok(())
    }
}

fn parse_config(s: &str, hint_ext: &str) -> Result<HarvesterConfig> {
    match hint_ext {
        "toml" => return Ok(toml::from_str(s)?),
        "json" => return Ok(serde_json::from_str(s)?),
        _ => {}
    }
    if let Ok(v) = serde_json::from_str(s) {
        return Ok(v);
    }
    toml::from_str(s).map_err(|e| anyhow!("unsupported harvester config format: {e}"))
}

fn default_state_abbreviations() -> BTreeMap<String, String> {
    [
        ("Acre", "AC"),
        ("Alagoas", "AL"),
        ("Amapá", "AP"),
        ("Amazonas", "AM"),
        ("Bahia", "BA"),
        ("Ceará", "CE"),
        ("Distrito Federal", "DF"),
        ("Espírito Santo", "ES"),
        ("Goiás", "GO"),
        ("Maranhão", "MA"),
        ("Mato Grosso", "MT"),
        ("Mato Grosso do Sul", "MS"),
        ("Minas Gerais", "MG"),
        ("Pará", "PA"),
        ("Paraíba", "PB"),
        ("Paraná", "PR"),
        ("Pernambuco", "PE"),
        ("Piauí", "PI"),
        ("Rio de Janeiro", "RJ"),
        ("Rio Grande do Norte", "RN"),
        ("Rio Grande do Sul", "RS"),
        ("Rondônia", "RO"),
        ("Roraima", "RR"),
        ("Santa Catarina", "SC"),
        ("São Paulo", "SP"),
        ("Sergipe", "SE"),
        ("Tocantins", "TO"),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_string(), v.to_string()))
    .collect()
}

fn default_daily_queries() -> Vec<QueryParams> {
    let local = |job: &str, city: &str| {
        QueryParams::new(job)
            .located(city, "Paraná")
            .today_only(true)
    };
    let remote = |job: &str| QueryParams::new(job).workplace("remote").today_only(true);
    vec![
        local("desenvolvedor", "Curitiba"),
        local("desenvolvedor", "São José dos Pinhais"),
        local("estagiario", "Curitiba"),
        local("estagiario", "São José dos Pinhais"),
        remote("estagiario"),
        remote("estagio"),
        local("junior", "Curitiba"),
        local("junior", "São José dos Pinhais"),
        remote("qa"),
        remote("python"),
        remote("full stack"),
        remote("back end"),
    ]
}
