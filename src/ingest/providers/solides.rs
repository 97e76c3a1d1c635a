// src/ingest/providers/solides.rs
use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;
use std::collections::BTreeMap;

use super::{conclude, fetch_items, lenient_name, lenient_string, normalize_items};
use crate::config::HarvesterConfig;
use crate::ingest::date_part;
use crate::ingest::types::{JobProvider, JobRecord, QueryParams, SearchOutcome, Source};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SolidesJob {
    #[serde(default, deserialize_with = "lenient_string")]
    title: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    company_name: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    created_at: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    job_type: Option<String>,
    // Solides may send no city or state object at all.
    #[serde(default, deserialize_with = "lenient_name")]
    city: Option<String>,
    #[serde(default, deserialize_with = "lenient_name")]
    state: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    redirect_link: Option<String>,
}

impl From<SolidesJob> for JobRecord {
    fn from(j: SolidesJob) -> Self {
        JobRecord {
            name: j.title,
            organization_name: j.company_name,
            published_date: date_part(j.created_at.as_deref()),
            workplace_type: j.job_type,
            city: j.city,
            state: j.state,
            job_url: j.redirect_link,
        }
    }
}

/// English work mode -> Solides vocabulary. Unknown values pass through.
pub fn map_workplace_type(mode: &str) -> &str {
    match mode {
        "on-site" => "presencial",
        "hybrid" => "hibrido",
        "remote" => "remoto",
        other => other,
    }
}

/// `"A, B"` + `"Paraná"` -> `"A - PR B - PR"`. States missing from the table
/// keep their full name.
pub fn compose_locations(cities: &str, state: &str, table: &BTreeMap<String, String>) -> String {
    let abbr = table.get(state).map(String::as_str).unwrap_or(state);
    cities
        .split(',')
        .map(|city| format!("{} - {}", city.trim(), abbr))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Solides vacancy portal search. Results live at `data.data`.
pub struct SolidesProvider {
    client: Client,
    url: String,
    page: u32,
    take: u32,
    state_abbreviations: BTreeMap<String, String>,
}

impl SolidesProvider {
    pub fn new(client: Client, url: impl Into<String>) -> Self {
        let defaults = HarvesterConfig::default();
        Self {
            client,
            url: url.into(),
            page: defaults.solides_page,
            take: defaults.solides_take,
            state_abbreviations: defaults.state_abbreviations,
        }
    }

    pub fn from_config(client: Client, cfg: &HarvesterConfig) -> Self {
        Self {
            client,
            url: cfg.solides_url.clone(),
            page: cfg.solides_page,
            take: cfg.solides_take,
            state_abbreviations: cfg.state_abbreviations.clone(),
        }
    }

    pub fn with_state_abbreviations(mut self, table: BTreeMap<String, String>) -> Self {
        self.state_abbreviations = table;
        self
    }

    pub fn request_params(&self, params: &QueryParams) -> Vec<(&'static str, String)> {
        let mut q = vec![
            ("page", self.page.to_string()),
            ("title", params.job_name.clone()),
            ("take", self.take.to_string()),
        ];
        if let (Some(cities), Some(state)) = (&params.city, &params.state) {
            if !cities.is_empty() && !state.is_empty() {
                let locations = compose_locations(cities, state, &self.state_abbreviations);
                q.push(("locations", locations));
            }
        }
        if let Some(mode) = &params.workplace_type {
            q.push(("jobsType", map_workplace_type(mode).to_string()));
        }
        q
    }

    /// Map raw items; todayOnly checks the raw `createdAt`.
    pub fn normalize(items: Vec<Value>, today_only: bool, today: NaiveDate) -> Vec<JobRecord> {
        normalize_items(
            Source::Solides,
            items,
            today_only,
            today,
            |j: &SolidesJob| j.created_at.as_deref(),
            JobRecord::from,
        )
    }
}

#[async_trait]
impl JobProvider for SolidesProvider {
    fn source(&self) -> Source {
        Source::Solides
    }

    async fn search(&self, params: &QueryParams, today: NaiveDate) -> SearchOutcome {
        let query = self.request_params(params);
        let fetched =
            fetch_items(&self.client, &self.url, &query, Source::Solides, "/data/data").await;
        let records = fetched.map(|items| Self::normalize(items, params.today_only, today));
        conclude(Source::Solides, records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn provider() -> SolidesProvider {
        SolidesProvider::new(Client::new(), "http://localhost/unused")
    }

    #[test]
    fn workplace_mapping_known_and_unknown() {
        assert_eq!(map_workplace_type("on-site"), "presencial");
        assert_eq!(map_workplace_type("hybrid"), "hibrido");
        assert_eq!(map_workplace_type("remote"), "remoto");
        assert_eq!(map_workplace_type("freelance"), "freelance");
        // Already-native values stay put.
        assert_eq!(map_workplace_type(map_workplace_type("remote")), "remoto");
    }

    #[test]
    fn locations_abbreviate_known_states_only() {
        let table = HarvesterConfig::default().state_abbreviations;
        assert_eq!(
            compose_locations("Curitiba, São José dos Pinhais", "Paraná", &table),
            "Curitiba - PR São José dos Pinhais - PR"
        );
        assert_eq!(
            compose_locations("Springfield", "Nowhere State", &table),
            "Springfield - Nowhere State"
        );
    }

    #[test]
    fn params_need_both_city_and_state_for_locations() {
        let p = provider();
        let q = p.request_params(&QueryParams::new("dev").located("Curitiba", "Paraná"));
        assert_eq!(
            q,
            vec![
                ("page", "1".to_string()),
                ("title", "dev".to_string()),
                ("take", "20".to_string()),
                ("locations", "Curitiba - PR".to_string()),
            ]
        );

        let mut only_city = QueryParams::new("dev");
        only_city.city = Some("Curitiba".into());
        let q = p.request_params(&only_city);
        assert!(q.iter().all(|(k, _)| *k != "locations"));

        let q = p.request_params(&QueryParams::new("dev").workplace("remote"));
        assert!(q.contains(&("jobsType", "remoto".to_string())));
    }

    #[test]
    fn custom_state_table_drives_locations() {
        let table = BTreeMap::from([("Paraná".to_string(), "PR-X".to_string())]);
        let p = provider().with_state_abbreviations(table);
        let q = p.request_params(&QueryParams::new("dev").located("Curitiba", "Paraná"));
        assert!(q.contains(&("locations", "Curitiba - PR-X".to_string())));

        let q = p.request_params(&QueryParams::new("dev").located("Recife", "Pernambuco"));
        assert!(q.contains(&("locations", "Recife - Pernambuco".to_string())));
    }

    #[test]
    fn non_object_items_are_skipped() {
        let items = vec![json!(["Dev", "ACME"]), json!(null), json!({"title": "QA"})];
        let today = NaiveDate::from_ymd_opt(2024, 5, 2).unwrap();
        let out = SolidesProvider::normalize(items, false, today);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].name.as_deref(), Some("QA"));
    }

    #[test]
    fn nested_city_and_state_are_flattened() {
        let items = vec![
            json!({
                "title": "Dev Rust",
                "companyName": "Tabajara",
                "createdAt": "2024-05-02T12:00:00.000Z",
                "jobType": "remoto",
                "city": {"name": "Curitiba", "id": 1},
                "state": {"name": "Paraná", "code": "PR"},
                "redirectLink": "https://vagas.solides.com.br/1"
            }),
            json!({
                "title": "QA",
                "createdAt": "2024-05-01T12:00:00.000Z",
                "city": null,
                "state": {"name": "Paraná"}
            }),
        ];
        let today = NaiveDate::from_ymd_opt(2024, 5, 2).unwrap();
        let out = SolidesProvider::normalize(items.clone(), false, today);
        assert_eq!(out.len(), 2);
        assert_eq!(out[0].organization_name.as_deref(), Some("Tabajara"));
        assert_eq!(out[0].city.as_deref(), Some("Curitiba"));
        assert_eq!(out[0].published_date.as_deref(), Some("2024-05-02"));
        assert_eq!(out[1].city, None);
        assert_eq!(out[1].state.as_deref(), Some("Paraná"));

        let fresh = SolidesProvider::normalize(items, true, today);
        assert_eq!(fresh.len(), 1);
        assert_eq!(fresh[0].name.as_deref(), Some("Dev Rust"));
    }
}
