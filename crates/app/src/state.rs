//! Application state management

use std::sync::Arc;

use cinema_core::{CinemaBackend, Database, Result, SessionProvider};
use cinema_net::ApiClient;
use tracing::info;

use crate::config::AppConfig;
use crate::session::SessionManager;

const DATABASE_FILE: &str = "cinema.db";

/// Main application state
pub struct AppState {
    pub config: AppConfig,
    pub backend: Arc<dyn CinemaBackend>,
    pub session: Arc<SessionManager>,
}

impl AppState {
    /// Open the session cache, connect the backend, and restore any cached login
    pub fn new(config: AppConfig) -> Result<Self> {
        let data_dir = config.data_dir()?;
        std::fs::create_dir_all(&data_dir)?;
        let db = Database::open(data_dir.join(DATABASE_FILE))?;

        let api = ApiClient::new(&config.api_base_url, config.request_timeout())?;
        let backend: Arc<dyn CinemaBackend> = Arc::new(api);

        let session = Arc::new(SessionManager::new(db, backend.clone()));
        session.restore()?;

        info!(
            api_base_url = %config.api_base_url,
            data_dir = %data_dir.display(),
            signed_in = session.is_authenticated(),
            "Application state ready"
        );

        Ok(Self {
            config,
            backend,
            session,
        })
    }

    pub fn session_provider(&self) -> Arc<dyn SessionProvider> {
        self.session.clone()
    }
}
