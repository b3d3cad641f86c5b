use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

mod auth;
mod error;
mod handlers;
mod models;
mod state;
mod template;
mod upload;

use caseline_core::llm::OpenAiBackend;
use caseline_pdf::LopdfBackend;
use caseline_storage::Store;
use state::AppState;

/// Maximum total upload size (outline plus supporting PDFs).
const MAX_UPLOAD_BYTES: usize = 16 * 1024 * 1024;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let config = caseline_core::load_config();
    let server = config.server.clone().unwrap_or_default();

    let db_path = server
        .database_path
        .clone()
        .unwrap_or_else(|| "caseline.db".to_string());
    let store = Store::open(&PathBuf::from(&db_path))?;
    tracing::info!(path = %db_path, "database opened");

    let mut llm = OpenAiBackend::new(config.api_key());
    if let Some(base_url) = config.llm.as_ref().and_then(|l| l.base_url.clone()) {
        llm = llm.with_base_url(base_url);
    }

    let state = Arc::new(AppState {
        store: Mutex::new(store),
        sessions: dashmap::DashMap::new(),
        processing_locks: dashmap::DashMap::new(),
        llm: Arc::new(llm),
        pdf: Arc::new(LopdfBackend::new()),
        llm_cfg: config.llm_config(),
    });

    let body_limit = axum::extract::DefaultBodyLimit::max(MAX_UPLOAD_BYTES);

    let app = axum::Router::new()
        .route("/", axum::routing::get(handlers::index::index))
        .route("/api/register", axum::routing::post(handlers::auth::register))
        .route("/api/login", axum::routing::post(handlers::auth::login))
        .route("/api/logout", axum::routing::post(handlers::auth::logout))
        .route(
            "/api/projects",
            axum::routing::get(handlers::projects::list).post(handlers::projects::create),
        )
        .route(
            "/api/projects/{id}",
            axum::routing::get(handlers::projects::detail).delete(handlers::projects::delete),
        )
        .route(
            "/api/projects/{id}/archive",
            axum::routing::post(handlers::projects::archive),
        )
        .route(
            "/api/projects/{id}/upload",
            axum::routing::post(handlers::process::upload),
        )
        .route(
            "/api/projects/{id}/process",
            axum::routing::post(handlers::process::process),
        )
        .route(
            "/api/projects/{id}/timeline",
            axum::routing::get(handlers::outputs::timeline),
        )
        .route(
            "/api/projects/{id}/narrative",
            axum::routing::get(handlers::outputs::narrative),
        )
        .layer(body_limit)
        .layer(tower_http::cors::CorsLayer::permissive())
        .with_state(state);

    let port = server.listen_port.unwrap_or(5000);
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    tracing::info!("listening on http://{addr}");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
