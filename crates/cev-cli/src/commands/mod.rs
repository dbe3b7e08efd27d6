//! CLI command implementations
//!
//! Each subcommand has its own module with a `run` function. Commands that
//! show a view go through [`AppContext::enter`], which runs the identity check
//! and resolves the requested route before anything else is fetched.

pub mod auth;
pub mod config;
pub mod datasets;
pub mod report;
pub mod upload;

use crate::api::{ApiClient, DatasetApi, SessionStore};
use crate::config::Config;
use crate::error::{CliError, Result};
use crate::routes::Route;
use crate::session::SessionGate;
use cev_common::types::User;
use std::sync::Arc;
use tracing::debug;

/// `--format` values accepted by commands that print data.
pub const OUTPUT_FORMATS: [&str; 2] = ["table", "json"];

/// Everything a command needs: resolved config, the HTTP client with the
/// stored session loaded, and the session file.
pub struct AppContext {
    pub config: Config,
    client: Arc<ApiClient>,
    store: SessionStore,
}

impl AppContext {
    pub fn new(server_url: Option<&str>) -> Result<Self> {
        let mut config = Config::load()?;
        if let Some(url) = server_url {
            config.set("server_url", url)?;
        }
        Self::with_config(config)
    }

    pub fn with_config(config: Config) -> Result<Self> {
        let client = Arc::new(ApiClient::from_config(&config)?);
        let store = SessionStore::new(&config.session_file);

        if let Some(stored) = store.load(client.base_url()) {
            debug!(path = %store.path().display(), "Restoring stored session");
            client.restore_session(&stored);
        }

        Ok(Self {
            config,
            client,
            store,
        })
    }

    pub fn api(&self) -> Arc<dyn DatasetApi> {
        self.client.clone()
    }

    /// Run the identity check and resolve `route` against its outcome.
    pub async fn enter(&self, route: Route) -> Result<(SessionGate, Route)> {
        let mut gate = SessionGate::new(self.api());
        let resolved = gate
            .check()
            .await
            .map(|state| route.resolve(state))?
            .ok_or(CliError::InvalidTransition("Identity check has not finished"))?;

        debug!(requested = %route, resolved = %resolved, "Route resolved");
        Ok((gate, resolved))
    }

    /// Enter a view that needs a session; fails when there is none.
    pub async fn require_user(&self, route: Route) -> Result<User> {
        let (gate, resolved) = self.enter(route).await?;
        match (resolved, gate.user()) {
            (Route::Login, _) | (_, None) => Err(CliError::NotAuthenticated),
            (_, Some(user)) => Ok(user.clone()),
        }
    }

    /// Write the current cookies back to the session file.
    pub fn persist_session(&self) -> Result<()> {
        match self.client.export_session() {
            Some(session) => self.store.save(&session),
            None => self.store.clear(),
        }
    }

    pub fn clear_session(&self) -> Result<()> {
        self.store.clear()
    }
}
