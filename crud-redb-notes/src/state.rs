use std::sync::Arc;

use axum::extract::FromRef;

use crate::{config::Config, store::Store};

#[derive(FromRef, Clone)]
pub struct AppState {
    pub store: Store,
    pub config: Arc<Config>,
}
