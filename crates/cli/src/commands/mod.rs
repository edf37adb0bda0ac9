//! CLI command implementations.

pub mod admin;
pub mod cart;
pub mod checkout;
pub mod menu;
pub mod watch;

use std::sync::Arc;

use tamarind_client::api::ApiClient;
use tamarind_client::config::{ClientConfig, ConfigError};
use tamarind_client::storage::{FileStorage, Storage};
use tamarind_client::sync::PromoSync;

/// Shared wiring for every command: configuration, the durable storage
/// scope, the API client, and the promotion sync channel.
pub struct CliContext {
    pub config: ClientConfig,
    pub storage: Arc<dyn Storage>,
    pub api: ApiClient,
    pub sync: PromoSync,
}

impl CliContext {
    /// Build the context from environment configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration fails to parse.
    pub fn init() -> Result<Self, ConfigError> {
        let config = ClientConfig::from_env()?;
        let storage: Arc<dyn Storage> = Arc::new(FileStorage::new(&config.data_dir));
        let api = ApiClient::new(&config);
        let sync = PromoSync::new(Arc::clone(&storage));
        Ok(Self {
            config,
            storage,
            api,
            sync,
        })
    }
}
