use std::sync::Arc;
use std::time::Instant;

use axum::extract::Request;
use axum::middleware::{self, Next};
use axum::response::Response;
use axum::{
    Router,
    routing::{delete, get, post, put},
};

use super::{changes, crewmates};
use crate::changes::ChangeBus;
use crate::client::LocalRecordStore;
use crate::store::Store;

pub struct AppState {
    pub records: LocalRecordStore,
}

impl AppState {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self {
            records: LocalRecordStore::new(store, Arc::new(ChangeBus::default())),
        }
    }
}

async fn health() -> &'static str {
    "OK"
}

async fn log_request(request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let uri = request.uri().clone();
    let start = Instant::now();

    let response = next.run(request).await;

    tracing::info!(
        "{} {} {} {}ms",
        method,
        uri.path(),
        response.status().as_u16(),
        start.elapsed().as_millis()
    );

    response
}

fn api_router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/crewmates", get(crewmates::list_crewmates))
        .route("/crewmates", post(crewmates::create_crewmate))
        .route("/crewmates/{id}", get(crewmates::get_crewmate))
        .route("/crewmates/{id}", put(crewmates::update_crewmate))
        .route("/crewmates/{id}", delete(crewmates::delete_crewmate))
        // Realtime change channel (WebSocket)
        .route("/changes", get(changes::changes_ws))
}

pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health))
        .nest("/api/v1", api_router())
        .layer(middleware::from_fn(log_request))
        .with_state(state)
}
