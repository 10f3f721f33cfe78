//! Host integration
//!
//! A small adapter for applications that want one shared client under a
//! well-known name, plus a helper to drop the default config file into the
//! application's config directory. Nothing in [`crate::service`] depends on
//! this module.

use crate::service::QdrantClient;
use once_cell::sync::OnceCell;
use qdrest_core::{ClientConfig, ConfigError, Result};
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Name the shared client is registered under
pub const SERVICE_KEY: &str = "qdrant";

static SHARED: OnceCell<Arc<QdrantClient>> = OnceCell::new();

/// Named, shared client instances
#[derive(Debug, Default)]
pub struct ClientRegistry {
    clients: RwLock<HashMap<String, Arc<QdrantClient>>>,
}

impl ClientRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a client, replacing any previous one under the same name
    pub async fn register(&self, name: impl Into<String>, client: QdrantClient) -> Arc<QdrantClient> {
        let client = Arc::new(client);
        self.clients
            .write()
            .await
            .insert(name.into(), client.clone());
        client
    }

    pub async fn get(&self, name: &str) -> Option<Arc<QdrantClient>> {
        self.clients.read().await.get(name).cloned()
    }

    /// Return the client under `name`, building it with `init` on first use
    pub async fn get_or_try_init<F>(&self, name: &str, init: F) -> Result<Arc<QdrantClient>>
    where
        F: FnOnce() -> Result<QdrantClient>,
    {
        if let Some(client) = self.get(name).await {
            return Ok(client);
        }

        let mut clients = self.clients.write().await;
        // another task may have won the race while we waited for the lock
        if let Some(client) = clients.get(name) {
            return Ok(client.clone());
        }

        let client = Arc::new(init()?);
        clients.insert(name.to_string(), client.clone());
        tracing::debug!("Registered Qdrant client '{}' for {}", name, client.config().host);
        Ok(client)
    }

    pub async fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.clients.read().await.keys().cloned().collect();
        names.sort();
        names
    }
}

/// Initialise the process-wide client from `config`
///
/// The first call wins; later calls return the existing instance and ignore
/// their `config`.
pub fn init_shared(config: ClientConfig) -> Result<Arc<QdrantClient>> {
    SHARED
        .get_or_try_init(|| QdrantClient::new(config).map(Arc::new))
        .cloned()
}

/// The process-wide client, built from the environment on first use
pub fn shared() -> Result<Arc<QdrantClient>> {
    SHARED
        .get_or_try_init(|| QdrantClient::from_env().map(Arc::new))
        .cloned()
}

/// Write the default configuration file to `path`
///
/// Refuses to overwrite an existing file unless `force` is set.
pub fn publish_config(path: impl AsRef<Path>, force: bool) -> std::result::Result<(), ConfigError> {
    let path = path.as_ref();
    if path.exists() && !force {
        return Err(ConfigError::AlreadyExists(path.to_path_buf()));
    }

    let write_error = |source: std::io::Error| ConfigError::FileWriteError {
        path: path.to_path_buf(),
        source,
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(write_error)?;
    }
    std::fs::write(path, ClientConfig::default_toml()).map_err(write_error)?;

    tracing::info!("Published Qdrant config to {}", path.display());
    Ok(())
}
