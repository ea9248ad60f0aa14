use std::sync::Arc;

use crate::core::config::{AppPaths, ConfigService};

pub mod connector;
pub mod error;

pub use connector::{Connector, HostedConnector};
use error::InitializationError;

/// State shared by every route.
///
/// Holds no service clients: handlers read the configuration and open
/// fresh clients through `connector` on each request.
#[derive(Clone)]
pub struct AppState {
    pub paths: Arc<AppPaths>,
    pub config: ConfigService,
    pub connector: Arc<dyn Connector>,
}

impl AppState {
    /// Discovers paths and checks that the configuration loads.
    pub fn initialize() -> Result<Arc<Self>, InitializationError> {
        let paths = Arc::new(AppPaths::new());
        let config = ConfigService::new(paths.clone());
        config.load().map_err(InitializationError::Config)?;

        Ok(Self::with_parts(paths, config, Arc::new(HostedConnector)))
    }

    pub fn with_parts(
        paths: Arc<AppPaths>,
        config: ConfigService,
        connector: Arc<dyn Connector>,
    ) -> Arc<Self> {
        Arc::new(AppState {
            paths,
            config,
            connector,
        })
    }
}
