//! Application state module
//!
//! Defines shared state accessible across all request handlers.

use std::path::PathBuf;
use std::sync::Arc;

use crate::auth::JwtKeys;
use crate::config::Config;
use crate::db::{RecipeStore, StoreError};

/// Application state containing shared resources.
#[derive(Clone)]
pub struct AppState {
    /// Recipe, tag and ingredient storage
    pub store: Arc<RecipeStore>,
    /// Keys for bearer token validation
    pub jwt_keys: Arc<JwtKeys>,
    /// Directory uploaded images are written to
    pub media_root: PathBuf,
    /// Maximum accepted image size in bytes
    pub max_file_size: usize,
}

impl AppState {
    /// Build state around an existing store
    pub fn new(config: &Config, store: RecipeStore) -> Self {
        Self {
            store: Arc::new(store),
            jwt_keys: Arc::new(JwtKeys::from_secret(config.jwt_secret.as_bytes())),
            media_root: config.media_root.clone(),
            max_file_size: config.max_file_size(),
        }
    }

    /// State backed by the in-memory store
    pub fn in_memory(config: &Config) -> Self {
        Self::new(config, RecipeStore::in_memory())
    }

    /// State backed by the store the configuration selects
    pub async fn from_config(config: &Config) -> Result<Self, StoreError> {
        let store = RecipeStore::from_config(config).await?;
        Ok(Self::new(config, store))
    }
}
