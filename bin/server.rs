// Student Records Service - API server entrypoint
// Reads configuration from the environment, opens the store, and serves
// the REST API. A store that cannot be opened at startup is fatal.

use anyhow::{Context, Result};
use student_records::{api, StudentStore, VERSION};

const DEFAULT_DB_PATH: &str = "students.db";
const DEFAULT_PORT: u16 = 5000;

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let db_path =
        std::env::var("DATABASE_URL").unwrap_or_else(|_| DEFAULT_DB_PATH.to_string());
    let port: u16 = std::env::var("PORT")
        .ok()
        .and_then(|raw| raw.parse().ok())
        .unwrap_or(DEFAULT_PORT);

    let store = StudentStore::open(&db_path)
        .with_context(|| format!("Failed to open student store at {db_path}"))?;
    tracing::info!("student-records v{VERSION}, store opened at {db_path}");

    let app = api::router(store);

    let addr = format!("0.0.0.0:{port}");
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    tracing::info!("server running on http://localhost:{port}");

    axum::serve(listener, app).await.context("Server error")?;

    Ok(())
}
