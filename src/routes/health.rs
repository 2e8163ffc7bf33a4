use axum::routing::get;
use axum::Router;
use tracing::info;

use crate::state::AppState;

const ENDPOINTS: [&str; 2] = ["/", "/titulo_tesouro"];

pub fn router() -> Router<AppState> {
    Router::new().route("/", get(help))
}

/// Health check doubling as a minimal usage hint.
async fn help() -> String {
    info!("GET / - Health check");
    format!("System healthy.\n\nEndpoints: {ENDPOINTS:?}")
}
