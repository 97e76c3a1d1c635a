pub mod harvester;

pub use harvester::{HarvesterConfig, QueryPlanConfig};
