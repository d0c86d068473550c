//! Server mode
//!
//! Builds the app (resolver wrapped around the fallback mux) and runs it
//! until the server exits or a shutdown signal arrives.

use actix_web::{App, HttpServer};
use anyhow::Result;
use std::sync::Arc;
use tracing::warn;

use crate::api::configure_mux;
use crate::api::middleware::{RedirectResolver, RequestIdMiddleware};
use crate::config::get_config;
use crate::runtime::lifetime::{self, startup::StartupContext};
use crate::storage::MappingStore;

/// Run the HTTP server
///
/// **Note**: Logging system must be initialized and the store prepared
/// before calling this function
pub async fn run_server(startup: StartupContext) -> Result<()> {
    let config = get_config();
    let bind_address = format!("{}:{}", config.server.host, config.server.port);
    let cpu_count = config.server.cpu_count.clamp(1, 32);

    let store = startup.store.clone();
    let routes = startup.routes.clone();

    let server = HttpServer::new(move || {
        let mapping_store: Arc<dyn MappingStore> = store.clone();
        App::new()
            .configure(configure_mux(mapping_store.clone(), routes.clone()))
            .wrap(RedirectResolver::new(mapping_store))
            .wrap(RequestIdMiddleware)
    })
    .workers(cpu_count)
    .disable_signals()
    .bind(&bind_address)?
    .run();

    warn!("Starting server at http://{}", bind_address);
    let handle = server.handle();

    tokio::select! {
        res = server => {
            res?;
        }
        _ = lifetime::shutdown::listen_for_shutdown() => {
            handle.stop(true).await;
            warn!("Graceful shutdown: server stopped");
        }
    }

    lifetime::shutdown::release_store(startup.store);
    Ok(())
}
