//! Core module containing the query compiler and its building blocks

pub mod allowlist;
pub mod directive;
pub mod error;
pub mod order;
pub mod projection;
pub mod query;
pub mod remote;
pub mod select;

pub use directive::{FieldDirective, FieldSelection};
pub use error::{ConfigError, InvalidDataError, QueryError};
pub use order::{OrderClause, SortDirection};
pub use query::{
    ListQueryConfig, PreparedListQuery, PreparedRetrieveQuery, QueryConfig, RemoteQueryConfig,
    RequestQueryFields, RetrieveConfig, prepare_list_query, prepare_retrieve_query,
};
pub use remote::RemoteQueryObject;
