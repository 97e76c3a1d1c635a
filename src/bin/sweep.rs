//! One-shot trigger: run a fan-out sweep (or the daily sweep) and print JSON.
//!
//! ```text
//! harvest-sweep [--today] [--no-archive] <title>...
//! harvest-sweep --daily
//! ```

use anyhow::{bail, Context, Result};
use job_harvester::{Harvester, HarvesterConfig, RunOptions};

#[tokio::main]
async fn main() -> Result<()> {
    let _ = dotenvy::dotenv();
    job_harvester::init_tracing();

    let mut options = RunOptions::archival();
    let mut daily = false;
    let mut titles = Vec::new();
    for arg in std::env::args().skip(1) {
        match arg.as_str() {
            "--today" => options.today_only = true,
            "--no-archive" => options.archive = false,
            "--daily" => daily = true,
            flag if flag.starts_with("--") => bail!("unknown flag {flag}"),
            title => titles.push(title.to_string()),
        }
    }

    let cfg = HarvesterConfig::load_default().context("loading harvester config")?;
    let harvester = Harvester::from_config(cfg)?;

    let out = if daily {
        serde_json::to_string_pretty(&harvester.run_daily().await)?
    } else {
        if titles.is_empty() {
            bail!("usage: harvest-sweep [--today] [--no-archive] <title>... | --daily");
        }
        serde_json::to_string_pretty(&harvester.run_all(&titles, options).await)?
    };
    println!("{out}");
    Ok(())
}
