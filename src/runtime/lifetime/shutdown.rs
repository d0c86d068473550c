use std::sync::Arc;
use tokio::signal;
use tracing::{debug, info, warn};

use crate::storage::UrlStore;

pub async fn listen_for_shutdown() {
    match signal::ctrl_c().await {
        Ok(()) => {
            info!("Shutdown signal received, stopping server...");
        }
        Err(e) => {
            warn!(
                "Failed to listen for Ctrl+C: {}. Proceeding with shutdown anyway.",
                e
            );
        }
    }
}

/// Drop the process-wide handle. The file lock goes away with the last
/// reference, so a straggling clone only delays the close.
pub fn release_store(store: Arc<UrlStore>) {
    let path = store.path().display().to_string();
    match Arc::try_unwrap(store) {
        Ok(store) => {
            drop(store);
            info!("Database {} closed", path);
        }
        Err(shared) => {
            debug!(
                "Database {} still referenced by {} handles, closing on last drop",
                path,
                Arc::strong_count(&shared)
            );
        }
    }
}
