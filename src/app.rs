use axum::Router;

use crate::routes;
use crate::state::AppState;

pub fn create_app(state: AppState) -> Router {
    Router::new()
        .merge(routes::health::router())
        .merge(routes::titulos::router())
        .with_state(state)
}
