use anyhow::{Context, Result};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

use crate::config::{RoutesConfig, get_config};
use crate::services::BulkLoader;
use crate::storage::UrlStore;

pub struct StartupContext {
    pub store: Arc<UrlStore>,
    pub routes: RoutesConfig,
}

/// 准备服务器启动的上下文
///
/// Opens the database and loads the seed file. Any failure here is fatal:
/// the server never starts with a half-initialized store.
pub fn prepare_server_startup(seed_file: &Path) -> Result<StartupContext> {
    let start_time = std::time::Instant::now();
    let config = get_config();

    let store = UrlStore::open(
        &config.database.path,
        Duration::from_millis(config.database.open_timeout_ms),
    )
    .with_context(|| format!("Failed to open database {}", config.database.path))?;

    BulkLoader::load_file(&store, seed_file)
        .with_context(|| format!("Failed to seed from {}", seed_file.display()))?;

    info!(
        "Store ready with {} mappings",
        store.len().context("Failed to count mappings")?
    );
    debug!("Startup finished in {:?}", start_time.elapsed());

    Ok(StartupContext {
        store: Arc::new(store),
        routes: config.routes.clone(),
    })
}
