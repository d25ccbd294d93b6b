//! Entity query configuration loading and management
//!
//! Each exposed entity declares which fields clients may select or sort on,
//! which fields a request gets by default and its default page size:
//!
//! ```yaml
//! entities:
//!   - entity: order
//!     allowed: [id, status, email, total, created_at, items, customer]
//!     defaults: [id, status, email, items.title]
//!     default_limit: 20
//! ```

use serde::{Deserialize, Serialize};

use crate::core::error::{ConfigError, QueryError, Result};
use crate::core::query::{DEFAULT_LIMIT, QueryConfig};

fn default_limit() -> usize {
    DEFAULT_LIMIT
}

/// Query configuration of one entity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityQueryConfig {
    /// Entity name (e.g., "order", "product")
    pub entity: String,

    /// Selectable and sortable paths, empty for no restriction
    #[serde(default)]
    pub allowed: Vec<String>,

    /// Default selection
    #[serde(default)]
    pub defaults: Vec<String>,

    /// Default page size of list routes
    #[serde(default = "default_limit")]
    pub default_limit: usize,
}

impl EntityQueryConfig {
    fn to_query_config(&self, is_list: bool) -> QueryConfig {
        QueryConfig {
            allowed: self.allowed.clone(),
            defaults: self.defaults.clone(),
            default_limit: self.default_limit,
            is_list,
        }
    }
}

/// Query configurations of every exposed entity
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryConfigRegistry {
    #[serde(default)]
    pub entities: Vec<EntityQueryConfig>,
}

impl QueryConfigRegistry {
    /// Load configuration from a YAML file
    pub fn from_yaml_file(path: &str) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => QueryError::from(ConfigError::FileNotFound {
                path: path.to_string(),
            }),
            _ => QueryError::from(e),
        })?;

        serde_yaml::from_str(&content).map_err(|e| {
            ConfigError::ParseError {
                file: Some(path.to_string()),
                message: e.to_string(),
            }
            .into()
        })
    }

    /// Load configuration from a YAML string
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let registry: Self = serde_yaml::from_str(yaml)?;
        Ok(registry)
    }

    /// Merge several registries, e.g. one per module
    ///
    /// A later declaration of the same entity replaces the earlier one.
    pub fn merge(configs: Vec<QueryConfigRegistry>) -> Self {
        let mut merged = QueryConfigRegistry::default();
        for entity in configs.into_iter().flat_map(|c| c.entities) {
            match merged.entities.iter_mut().find(|e| e.entity == entity.entity) {
                Some(existing) => {
                    tracing::debug!(entity = %entity.entity, "Overriding entity query config");
                    *existing = entity;
                }
                None => merged.entities.push(entity),
            }
        }
        merged
    }

    /// Register or replace an entity's configuration
    pub fn insert(&mut self, config: EntityQueryConfig) {
        self.entities.retain(|e| e.entity != config.entity);
        self.entities.push(config);
    }

    pub fn get(&self, entity: &str) -> Option<&EntityQueryConfig> {
        self.entities.iter().find(|e| e.entity == entity)
    }

    fn require(&self, entity: &str) -> Result<&EntityQueryConfig> {
        self.get(entity).ok_or_else(|| {
            ConfigError::UnknownEntity {
                entity: entity.to_string(),
            }
            .into()
        })
    }

    /// Configuration for the entity's list route
    pub fn list_config(&self, entity: &str) -> Result<QueryConfig> {
        Ok(self.require(entity)?.to_query_config(true))
    }

    /// Configuration for the entity's retrieve route
    pub fn retrieve_config(&self, entity: &str) -> Result<QueryConfig> {
        Ok(self.require(entity)?.to_query_config(false))
    }
}
