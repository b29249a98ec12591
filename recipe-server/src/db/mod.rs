//! Recipe storage module
//!
//! Provides persistence for recipes, tags and ingredients:
//! - **PostgreSQL** (production): selected when `DATABASE_URL` is set
//! - **In-memory** (development fallback and tests): data is lost on restart
//!
//! The store hands out owner-filtered snapshots; callers still run them
//! through the resolver, which applies the owner scope, ordering and
//! de-duplication rules itself.

mod memory;
mod postgres;

pub use memory::MemoryStore;
pub use postgres::PostgresStore;

use recipe_core::{
    Attribute, AttributeKind, AttributeUpdate, EntityId, NewRecipe, OwnerId, Recipe, RecipeUpdate,
};

use crate::config::Config;

/// Storage errors
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Database connection error: {0}")]
    Connection(String),

    #[error("Database migration error: {0}")]
    Migration(String),

    #[error("Query error: {0}")]
    Query(String),

    #[error("{kind} {id} does not exist")]
    NotFound { kind: &'static str, id: EntityId },
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed | sqlx::Error::Io(_) => {
                StoreError::Connection(err.to_string())
            }
            other => StoreError::Query(other.to_string()),
        }
    }
}

/// Storage backend
enum StoreBackend {
    /// PostgreSQL storage (production)
    Postgres(PostgresStore),
    /// In-memory storage (development fallback)
    Memory(MemoryStore),
}

/// Persistence for recipes and their attributes
pub struct RecipeStore {
    backend: StoreBackend,
}

impl RecipeStore {
    /// Create storage with PostgreSQL backend and run migrations
    pub async fn with_postgres(
        database_url: &str,
        max_connections: u32,
    ) -> Result<Self, StoreError> {
        let pg_store = PostgresStore::new(database_url, max_connections).await?;
        pg_store.migrate().await?;

        Ok(Self {
            backend: StoreBackend::Postgres(pg_store),
        })
    }

    /// Create storage with in-memory backend
    pub fn in_memory() -> Self {
        Self {
            backend: StoreBackend::Memory(MemoryStore::new()),
        }
    }

    /// Create storage from configuration
    ///
    /// Uses PostgreSQL if a database URL is configured, otherwise falls back to in-memory.
    pub async fn from_config(config: &Config) -> Result<Self, StoreError> {
        match &config.database_url {
            Some(url) => {
                tracing::info!("Using PostgreSQL recipe storage");
                Self::with_postgres(url, config.database_max_connections).await
            }
            None => {
                tracing::warn!(
                    "DATABASE_URL not set, using in-memory storage - data will be lost on restart!"
                );
                Ok(Self::in_memory())
            }
        }
    }

    /// Check if using persistent storage
    pub fn is_persistent(&self) -> bool {
        matches!(self.backend, StoreBackend::Postgres(_))
    }

    /// Check database health (always Ok for memory backend)
    pub async fn check_health(&self) -> Result<(), StoreError> {
        match &self.backend {
            StoreBackend::Postgres(pg) => pg.check_health().await,
            StoreBackend::Memory(_) => Ok(()),
        }
    }

    // ==================== Recipe Methods ====================

    /// All recipes owned by `owner`
    pub async fn fetch_recipes(&self, owner: OwnerId) -> Result<Vec<Recipe>, StoreError> {
        match &self.backend {
            StoreBackend::Postgres(pg) => pg.fetch_recipes(owner).await,
            StoreBackend::Memory(mem) => Ok(mem.fetch_recipes(owner).await),
        }
    }

    /// Find a recipe by ID regardless of owner
    pub async fn find_recipe(&self, id: EntityId) -> Result<Option<Recipe>, StoreError> {
        match &self.backend {
            StoreBackend::Postgres(pg) => pg.find_recipe(id).await,
            StoreBackend::Memory(mem) => Ok(mem.find_recipe(id).await),
        }
    }

    /// Insert a recipe, creating missing tags and ingredients for its owner
    pub async fn create_recipe(&self, new: &NewRecipe) -> Result<Recipe, StoreError> {
        let recipe = match &self.backend {
            StoreBackend::Postgres(pg) => pg.create_recipe(new).await?,
            StoreBackend::Memory(mem) => mem.create_recipe(new).await,
        };
        tracing::info!(recipe_id = recipe.id, owner = %recipe.owner, "Recipe created");
        Ok(recipe)
    }

    /// Apply `update` to an existing recipe
    pub async fn update_recipe(
        &self,
        id: EntityId,
        update: &RecipeUpdate,
    ) -> Result<Recipe, StoreError> {
        match &self.backend {
            StoreBackend::Postgres(pg) => pg.update_recipe(id, update).await,
            StoreBackend::Memory(mem) => mem.update_recipe(id, update).await,
        }
    }

    /// Delete a recipe, returning whether it existed
    pub async fn delete_recipe(&self, id: EntityId) -> Result<bool, StoreError> {
        match &self.backend {
            StoreBackend::Postgres(pg) => pg.delete_recipe(id).await,
            StoreBackend::Memory(mem) => Ok(mem.delete_recipe(id).await),
        }
    }

    /// Record the media-relative path of a recipe's uploaded image
    pub async fn set_recipe_image(&self, id: EntityId, path: &str) -> Result<Recipe, StoreError> {
        match &self.backend {
            StoreBackend::Postgres(pg) => pg.set_recipe_image(id, path).await,
            StoreBackend::Memory(mem) => mem.set_recipe_image(id, path).await,
        }
    }

    // ==================== Attribute Methods ====================

    /// All tags or ingredients owned by `owner`, with recipe counts
    pub async fn fetch_attributes(
        &self,
        kind: AttributeKind,
        owner: OwnerId,
    ) -> Result<Vec<Attribute>, StoreError> {
        match &self.backend {
            StoreBackend::Postgres(pg) => pg.fetch_attributes(kind, owner).await,
            StoreBackend::Memory(mem) => Ok(mem.fetch_attributes(kind, owner).await),
        }
    }

    /// Find a tag or ingredient by ID regardless of owner
    pub async fn find_attribute(
        &self,
        kind: AttributeKind,
        id: EntityId,
    ) -> Result<Option<Attribute>, StoreError> {
        match &self.backend {
            StoreBackend::Postgres(pg) => pg.find_attribute(kind, id).await,
            StoreBackend::Memory(mem) => Ok(mem.find_attribute(kind, id).await),
        }
    }

    /// Apply a rename to an existing tag or ingredient
    pub async fn update_attribute(
        &self,
        kind: AttributeKind,
        id: EntityId,
        update: &AttributeUpdate,
    ) -> Result<Attribute, StoreError> {
        match &self.backend {
            StoreBackend::Postgres(pg) => pg.update_attribute(kind, id, update).await,
            StoreBackend::Memory(mem) => mem.update_attribute(kind, id, update).await,
        }
    }

    /// Delete a tag or ingredient and detach it from every recipe
    pub async fn delete_attribute(
        &self,
        kind: AttributeKind,
        id: EntityId,
    ) -> Result<bool, StoreError> {
        match &self.backend {
            StoreBackend::Postgres(pg) => pg.delete_attribute(kind, id).await,
            StoreBackend::Memory(mem) => Ok(mem.delete_attribute(kind, id).await),
        }
    }
}

impl std::fmt::Debug for RecipeStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RecipeStore")
            .field("persistent", &self.is_persistent())
            .finish()
    }
}
