//! # Query Config
//!
//! Compiles the query parameters of list and retrieve REST requests into
//! repository and remote (graph) query configurations.
//!
//! ## Features
//!
//! - **Field Directives**: `fields=+total,-email,*items` modifies the default
//!   selection, `fields=id,status` replaces it
//! - **Allowlists**: every selected field, star relation and order field is
//!   checked against the entity's allowlist; all offenders are reported
//! - **Relation Expansion**: dotted paths become select columns plus the
//!   relations to join
//! - **Two Outputs**: a repository config (`select`, `relations`, `skip`,
//!   `take`, `order`) and a remote query config (`fields`, `pagination`)
//! - **Configuration-Based**: per-entity allowlists and defaults from YAML
//! - **Axum Integration**: extractors that reject invalid queries with `400`
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use query_config::prelude::*;
//!
//! let config = QueryConfig::new(
//!     ["id", "status", "email", "items", "created_at"],
//!     ["id", "status", "items.title"],
//! )
//! .list();
//!
//! let params = RequestQueryFields::default()
//!     .with_fields("+email,*items")
//!     .with_order("-created_at");
//!
//! let prepared = prepare_list_query(&params, &config)?;
//! assert_eq!(prepared.list_config.relations, vec!["items"]);
//! assert_eq!(
//!     prepared.remote_query_config.fields,
//!     vec!["id", "status", "items.title", "email", "items.*"]
//! );
//! ```

pub mod config;
pub mod core;
pub mod server;

/// Re-exports of commonly used types and functions
pub mod prelude {
    // === Compiler ===
    pub use crate::core::{
        directive::{FieldDirective, FieldSelection, SelectionMode, resolve_fields},
        order::{OrderClause, SortDirection},
        projection::pick_by_config,
        query::{
            ListQueryConfig, ListResponse, Pagination, PreparedListQuery, PreparedRetrieveQuery,
            QueryConfig, RemoteQueryConfig, RequestQueryFields, RetrieveConfig,
            prepare_list_query, prepare_retrieve_query,
        },
        remote::{RemoteQueryNode, RemoteQueryObject},
        select::{SelectRelation, split_select_relations},
    };

    // === Errors ===
    pub use crate::core::error::{ConfigError, ErrorResponse, InvalidDataError, QueryError};

    // === Config ===
    pub use crate::config::{EntityQueryConfig, QueryConfigRegistry};

    // === Server ===
    pub use crate::server::{ValidatedListQuery, ValidatedRetrieveQuery};
}
