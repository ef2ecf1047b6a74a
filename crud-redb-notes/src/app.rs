use std::sync::Arc;

use axum::{
    extract::{DefaultBodyLimit, State},
    middleware::{self},
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use serde_json::json;
use tower::ServiceBuilder;

use crate::{
    config::Config,
    errors::{self, on_error},
    notes,
    state::AppState,
    store::Store,
};

pub struct AppParams<Router>
where
    Router: FnOnce(AppState) -> axum::Router,
{
    pub store: Store,
    pub config: Arc<Config>,
    pub router: Router,
}

pub fn create<R>(AppParams { store, config, router }: AppParams<R>) -> Router
where
    R: FnOnce(AppState) -> Router,
{
    let state = AppState { store, config };

    let service_routes = Router::new()
        .route("/__version__", get(version))
        .route("/__heartbeat__", get(heartbeat))
        .route("/__lbheartbeat__", get(lbheartbeat))
        .with_state(state.clone());

    Router::new()
        .merge(service_routes)
        .merge(router(state))
        .layer(
            ServiceBuilder::new()
                .layer(DefaultBodyLimit::disable())
                .layer(middleware::from_fn(on_error)),
        )
}

async fn version(State(config): State<Arc<Config>>) -> impl IntoResponse {
    Json(json!({
        "source" : config.source,
        "version": config.version,
        "commit" : config.git_commit,
        "build"  : config.pipeline_id
    }))
}

async fn heartbeat(State(store): State<Store>) -> errors::Result<impl IntoResponse> {
    let notes = notes::count_notes(store).await?;

    Ok(Json(json!({
        "status" : "ok",
        "notes": notes,
    })))
}

async fn lbheartbeat() -> impl IntoResponse {
    ""
}
