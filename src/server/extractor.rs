//! Axum extractors for compiled list/retrieve queries
//!
//! The query configuration of a route is installed as an [`Extension`](axum::Extension); the
//! extractors read the query string, compile it against that configuration
//! and reject invalid requests with a `400` JSON error before the handler
//! runs.
//!
//! # Usage
//!
//! ```rust,ignore
//! async fn list_orders(ValidatedListQuery(query): ValidatedListQuery) -> Json<Value> {
//!     let orders = repository.list(query.list_config).await;
//!     Json(orders)
//! }
//!
//! let app = Router::new().route(
//!     "/orders",
//!     get(list_orders).layer(Extension(registry.list_config("order")?)),
//! );
//! ```

use axum::extract::{FromRequestParts, Query};
use axum::http::request::Parts;
use std::ops::Deref;

use crate::core::error::{ConfigError, InvalidDataError, QueryError};
use crate::core::query::{
    PreparedListQuery, PreparedRetrieveQuery, QueryConfig, RequestQueryFields,
    prepare_list_query, prepare_retrieve_query,
};

/// A list query compiled against the route's [`QueryConfig`]
#[derive(Debug, Clone)]
pub struct ValidatedListQuery(pub PreparedListQuery);

/// A retrieve query compiled against the route's [`QueryConfig`]
#[derive(Debug, Clone)]
pub struct ValidatedRetrieveQuery(pub PreparedRetrieveQuery);

impl Deref for ValidatedListQuery {
    type Target = PreparedListQuery;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl Deref for ValidatedRetrieveQuery {
    type Target = PreparedRetrieveQuery;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

/// Read the route configuration and the raw query parameters
async fn route_query<S>(
    parts: &mut Parts,
    state: &S,
) -> Result<(QueryConfig, RequestQueryFields), QueryError>
where
    S: Send + Sync,
{
    let config = parts
        .extensions
        .get::<QueryConfig>()
        .cloned()
        .ok_or(ConfigError::MissingRouteConfig)?;

    let Query(params) = Query::<RequestQueryFields>::from_request_parts(parts, state)
        .await
        .map_err(|e| InvalidDataError::MalformedQuery {
            message: e.body_text(),
        })?;

    Ok((config, params))
}

impl<S> FromRequestParts<S> for ValidatedListQuery
where
    S: Send + Sync,
{
    type Rejection = QueryError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let (config, params) = route_query(parts, state).await?;
        prepare_list_query(&params, &config).map(ValidatedListQuery)
    }
}

impl<S> FromRequestParts<S> for ValidatedRetrieveQuery
where
    S: Send + Sync,
{
    type Rejection = QueryError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let (config, params) = route_query(parts, state).await?;
        prepare_retrieve_query(&params, &config).map(ValidatedRetrieveQuery)
    }
}
