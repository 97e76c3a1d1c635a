//! Job harvester HTTP entrypoint.
//! Boots the Axum server that triggers fan-out searches over the job boards.

use shuttle_axum::ShuttleAxum;

#[shuttle_runtime::main]
async fn axum() -> ShuttleAxum {
    // Load .env in local/dev; no-op in prod environments.
    let _ = dotenvy::dotenv();

    job_harvester::init_tracing();

    let router = job_harvester::app().await?;
    tracing::info!("job harvester router ready");

    Ok(router.into())
}
