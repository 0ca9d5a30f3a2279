use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use api_rest::AppState;
use hrs_core::{open_store, CoreConfig, PatientRecordStore};

/// Main entry point for the Health Record System server
///
/// Serves the REST API (with Swagger UI at `/swagger-ui`) on `HRS_REST_ADDR`.
///
/// # Environment Variables
/// - `HRS_REST_ADDR`: REST server address (default: "0.0.0.0:3000")
/// - `HRS_STORE`: `file` or `memory` (default: `file`)
/// - `HRS_DATA_DIR`: root directory of the file store (default: "patient_data")
/// - `HRS_COLLECTION`: collection holding patient records (default: "patients")
/// - `HRS_CONFLICT_POLICY`: `reject` or `overwrite` for creates on an existing ID
/// - `HRS_API_KEY`: if set, required in the `x-api-key` header on patient routes
///
/// # Errors
/// Returns an error if:
/// - the configuration is invalid,
/// - the file store's data directory does not exist,
/// - the server address cannot be bound, or
/// - the HTTP server fails while running.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("hrs_run=info".parse()?)
                .add_directive("hrs_core=info".parse()?)
                .add_directive("api_rest=info".parse()?),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cfg = CoreConfig::from_env_values(
        std::env::var("HRS_STORE").ok(),
        std::env::var("HRS_DATA_DIR").ok(),
        std::env::var("HRS_COLLECTION").ok(),
        std::env::var("HRS_CONFLICT_POLICY").ok(),
    )?;

    // The file store is never created here; a missing data directory fails startup.
    let store = open_store(&cfg, false)?;
    let api_key = std::env::var("HRS_API_KEY")
        .ok()
        .filter(|key| !key.trim().is_empty());
    if api_key.is_none() {
        tracing::warn!("HRS_API_KEY is not set; patient routes are unauthenticated");
    }

    let app = api_rest::router(AppState::new(
        PatientRecordStore::with_config(store, &cfg),
        api_key,
    ));

    let rest_addr = std::env::var("HRS_REST_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".into());
    tracing::info!("++ Starting Health Record System REST on {}", rest_addr);

    let listener = tokio::net::TcpListener::bind(&rest_addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
