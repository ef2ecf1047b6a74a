mod config;

mod app;
mod errors;
mod extract;
mod notes;
mod shared;
mod state;
mod store;

use std::sync::Arc;

use app::AppParams;
pub use config::Config;
pub use errors::{Error, Result};
use shared::tracing::{add_tracing_layer, setup_tracing};
pub use store::{init_store, Store};
use tokio::net::TcpListener;

#[tokio::main]
async fn main() -> errors::Result<()> {
    let config = Config::from_env()?;

    setup_tracing(config.log_json);

    let store = init_store(&config.database_path).inspect_err(|e| tracing::error!("{e}"))?;

    let addr = config.addr();
    let app = app::create(AppParams {
        store,
        config: Arc::new(config),
        router: notes::router,
    });
    let app = add_tracing_layer(app);

    let listener = TcpListener::bind(&addr).await?;

    tracing::info!("listening on http://{}", listener.local_addr()?);

    axum::serve(listener, app).await?;

    Ok(())
}
