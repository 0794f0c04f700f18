pub mod api;
pub mod app_state;
pub mod config;
pub mod error;
pub mod extract;

use axum::Router;
use axum::extract::Extension;
use axum::routing::{get, post};
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

//
// Re-export
//
pub use api::{extract_video_links, health, log_request_errors, relay_xhs};
pub use app_state::AppState;
pub use config::Config;
pub use error::ExtractError;
pub use extract::{ExtractRequest, ExtractResponse, extract_mp4_links, fetch_page};

pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64)";

/// Build the service router. Without a configured relay, `/api/xhs` answers 404.
pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(health))
        .route("/get", post(extract_video_links))
        .route("/api/xhs", get(relay_xhs))
        .layer(axum::middleware::from_fn(log_request_errors))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .layer(Extension(state))
}

pub async fn run(config: Config) -> anyhow::Result<()> {
    let state = AppState::new(&config)?;
    if let Some(relay_url) = &state.relay_url {
        info!(%relay_url, "Relay route enabled");
    }

    let app = router(state);

    let addr = format!("{}:{}", config.listen_addr, config.listen_on_port);
    info!("Listening on http://{addr}");
    let listener = TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
