use std::sync::Arc;

use reunion_core::geo::TargetLocation;

use crate::config::ServerConfig;
use crate::store::Store;

pub type SharedStore = Arc<dyn Store>;

#[derive(Clone)]
pub struct AppState {
    pub store: SharedStore,
    /// Resolved once at startup; never mutated.
    pub target: Arc<TargetLocation>,
    pub config: Arc<ServerConfig>,
}

impl AppState {
    /// Build state from an already-validated config. An out-of-range target
    /// falls back to the default location with an error log.
    pub fn new(config: ServerConfig, store: SharedStore) -> Self {
        let target = config.game.target.to_target().unwrap_or_else(|e| {
            tracing::error!(error = %e, "Invalid game target, using default");
            TargetLocation::default()
        });
        Self {
            store,
            target: Arc::new(target),
            config: Arc::new(config),
        }
    }
}
