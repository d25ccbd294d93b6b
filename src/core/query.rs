//! Query parameters and the list/retrieve query compiler
//!
//! [`prepare_list_query`] and [`prepare_retrieve_query`] take the untrusted
//! query parameters of a request plus the static [`QueryConfig`] of the
//! entity and produce two descriptions of the same read:
//!
//! - a [`ListQueryConfig`] (or [`RetrieveConfig`]) for a repository
//!   (`select`, `relations`, `skip`, `take`, `order`)
//! - a [`RemoteQueryConfig`] for a graph fetcher (`fields`, `pagination`)
//!
//! # Example
//! ```rust,ignore
//! // GET /orders?fields=+summary,*items&order=-created_at&limit=10
//! let prepared = prepare_list_query(&params, &config)?;
//! let orders = repository.list(prepared.list_config).await?;
//! ```

use serde::{Deserialize, Serialize, Serializer};

use super::allowlist::validate_selection;
use super::directive::{FieldSelection, resolve_fields};
use super::error::Result;
use super::order::OrderClause;
use super::select::split_select_relations;

/// Page size used when neither the request nor the entity sets one
pub const DEFAULT_LIMIT: usize = 50;

fn default_limit() -> usize {
    DEFAULT_LIMIT
}

/// Query parameters of a list or retrieve request
///
/// All parameters are optional and deserialize straight from a URL query
/// string.
///
/// # Example
/// ```text
/// GET /orders?fields=+summary,-email&order=-created_at&limit=10&offset=20
/// GET /orders/123?fields=id,status,*items
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RequestQueryFields {
    /// Field directives (see [`crate::core::directive`])
    pub fields: Option<String>,

    /// Sort field, prefixed with `-` for descending order
    pub order: Option<String>,

    /// Number of items per page
    pub limit: Option<usize>,

    /// Number of items to skip
    pub offset: Option<usize>,
}

impl RequestQueryFields {
    pub fn with_fields(mut self, fields: impl Into<String>) -> Self {
        self.fields = Some(fields.into());
        self
    }

    pub fn with_order(mut self, order: impl Into<String>) -> Self {
        self.order = Some(order.into());
        self
    }

    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn with_offset(mut self, offset: usize) -> Self {
        self.offset = Some(offset);
        self
    }
}

/// Static query configuration of an entity route
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryConfig {
    /// Field and relation paths clients may select or sort on.
    /// Empty means no restriction.
    #[serde(default)]
    pub allowed: Vec<String>,

    /// Selection used when the request has no `fields` parameter
    #[serde(default)]
    pub defaults: Vec<String>,

    /// Page size when the request has no `limit`
    #[serde(default = "default_limit")]
    pub default_limit: usize,

    /// List routes paginate the remote query, retrieve routes never do
    #[serde(default)]
    pub is_list: bool,
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self {
            allowed: Vec::new(),
            defaults: Vec::new(),
            default_limit: DEFAULT_LIMIT,
            is_list: false,
        }
    }
}

impl QueryConfig {
    pub fn new<A, D, S, T>(allowed: A, defaults: D) -> Self
    where
        A: IntoIterator<Item = S>,
        D: IntoIterator<Item = T>,
        S: Into<String>,
        T: Into<String>,
    {
        Self {
            allowed: allowed.into_iter().map(Into::into).collect(),
            defaults: defaults.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    pub fn with_default_limit(mut self, default_limit: usize) -> Self {
        self.default_limit = default_limit;
        self
    }

    pub fn list(mut self) -> Self {
        self.is_list = true;
        self
    }

    pub fn retrieve(mut self) -> Self {
        self.is_list = false;
        self
    }
}

/// Repository configuration of a list query
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ListQueryConfig {
    /// `None` selects every column
    #[serde(skip_serializing_if = "Option::is_none")]
    pub select: Option<Vec<String>>,
    pub relations: Vec<String>,
    pub skip: usize,
    pub take: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order: Option<OrderClause>,
}

/// Repository configuration of a single-entity read
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RetrieveConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub select: Option<Vec<String>>,
    pub relations: Vec<String>,
}

/// Pagination of a remote query
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Pagination {
    pub skip: usize,
    pub take: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order: Option<OrderClause>,
}

/// Graph fetcher configuration
///
/// A missing pagination serializes as `{}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RemoteQueryConfig {
    /// Field paths, star relations expanded to `<relation>.*`
    pub fields: Vec<String>,
    #[serde(serialize_with = "serialize_pagination")]
    pub pagination: Option<Pagination>,
}

fn serialize_pagination<S: Serializer>(
    pagination: &Option<Pagination>,
    serializer: S,
) -> std::result::Result<S::Ok, S::Error> {
    match pagination {
        Some(pagination) => pagination.serialize(serializer),
        None => serde_json::Map::new().serialize(serializer),
    }
}

/// Output of [`prepare_list_query`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PreparedListQuery {
    pub list_config: ListQueryConfig,
    pub remote_query_config: RemoteQueryConfig,
}

/// Output of [`prepare_retrieve_query`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PreparedRetrieveQuery {
    pub retrieve_config: RetrieveConfig,
    pub remote_query_config: RemoteQueryConfig,
}

/// Compile the query parameters of a list request
///
/// Fails with an invalid data error, before producing anything, when a
/// selected field, star relation or the order field is not allowed.
pub fn prepare_list_query(
    params: &RequestQueryFields,
    config: &QueryConfig,
) -> Result<PreparedListQuery> {
    let selection = resolve_fields(params.fields.as_deref(), &config.defaults);
    validate_selection(&selection, config.allowed.as_slice())?;

    let order = OrderClause::parse(params.order.as_deref(), config.allowed.as_slice())?;
    let skip = params.offset.unwrap_or(0);
    let take = params.limit.unwrap_or(config.default_limit);

    let split = split_select_relations(&selection.fields);
    let mut relations = split.relations;
    for relation in &selection.star_relations {
        if !relations.contains(relation) {
            relations.push(relation.clone());
        }
    }

    let remote_fields = remote_fields(&selection);

    tracing::debug!(
        fields = ?selection.fields,
        star_relations = ?selection.star_relations,
        relations = ?relations,
        skip,
        take,
        is_list = config.is_list,
        "Prepared query config"
    );

    let pagination = config.is_list.then(|| Pagination {
        skip,
        take,
        order: order.clone(),
    });

    Ok(PreparedListQuery {
        list_config: ListQueryConfig {
            select: (!split.select.is_empty()).then_some(split.select),
            relations,
            skip,
            take,
            order,
        },
        remote_query_config: RemoteQueryConfig {
            fields: remote_fields,
            pagination,
        },
    })
}

/// Compile the query parameters of a single-entity request
///
/// Same validation as [`prepare_list_query`]; the result never paginates.
pub fn prepare_retrieve_query(
    params: &RequestQueryFields,
    config: &QueryConfig,
) -> Result<PreparedRetrieveQuery> {
    let PreparedListQuery {
        list_config,
        remote_query_config,
    } = prepare_list_query(params, config)?;

    Ok(PreparedRetrieveQuery {
        retrieve_config: RetrieveConfig {
            select: list_config.select,
            relations: list_config.relations,
        },
        remote_query_config: RemoteQueryConfig {
            fields: remote_query_config.fields,
            pagination: None,
        },
    })
}

fn remote_fields(selection: &FieldSelection) -> Vec<String> {
    selection
        .fields
        .iter()
        .cloned()
        .chain(
            selection
                .star_relations
                .iter()
                .map(|relation| format!("{}.*", relation)),
        )
        .collect()
}

/// List response envelope
#[derive(Debug, Serialize)]
pub struct ListResponse<T> {
    /// The page of items
    pub data: Vec<T>,

    /// Total number of items matching the query
    pub count: usize,

    /// Number of items skipped
    pub offset: usize,

    /// Page size
    pub limit: usize,
}

impl<T> ListResponse<T> {
    /// Build the envelope for a page fetched with `config`
    pub fn new(data: Vec<T>, count: usize, config: &ListQueryConfig) -> Self {
        Self {
            data,
            count,
            offset: config.skip,
            limit: config.take,
        }
    }

    pub fn has_next(&self) -> bool {
        self.offset + self.data.len() < self.count
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::error::{InvalidDataError, QueryError};
    use serde_json::json;

    fn order_config() -> QueryConfig {
        QueryConfig::new(
            [
                "id",
                "status",
                "email",
                "total",
                "created_at",
                "items",
                "customer",
            ],
            ["id", "status", "email", "items.title"],
        )
        .list()
    }

    #[test]
    fn test_request_defaults() {
        let params = RequestQueryFields::default();
        assert_eq!(params.fields, None);
        assert_eq!(params.limit, None);
        assert_eq!(QueryConfig::default().default_limit, 50);
    }

    #[test]
    fn test_no_fields_no_order() {
        let prepared =
            prepare_list_query(&RequestQueryFields::default(), &order_config()).unwrap();
        let list = prepared.list_config;

        assert_eq!(
            list.select,
            Some(vec![
                "id".to_string(),
                "status".to_string(),
                "email".to_string(),
                "items.title".to_string()
            ])
        );
        assert_eq!(list.relations, vec!["items"]);
        assert_eq!(list.skip, 0);
        assert_eq!(list.take, 50);
        assert_eq!(list.order, None);
    }

    #[test]
    fn test_empty_config_yields_no_select() {
        let prepared =
            prepare_list_query(&RequestQueryFields::default(), &QueryConfig::default()).unwrap();
        assert_eq!(prepared.list_config.select, None);
        assert!(prepared.list_config.relations.is_empty());
        assert!(prepared.remote_query_config.fields.is_empty());
        assert_eq!(prepared.remote_query_config.pagination, None);
    }

    #[test]
    fn test_incremental_fields_with_star_relation() {
        let params = RequestQueryFields::default()
            .with_fields("+total,-email,*customer")
            .with_order("-created_at")
            .with_limit(10)
            .with_offset(20);
        let prepared = prepare_list_query(&params, &order_config()).unwrap();

        assert_eq!(
            prepared.list_config.select,
            Some(vec![
                "id".to_string(),
                "status".to_string(),
                "items.title".to_string(),
                "total".to_string()
            ])
        );
        assert_eq!(prepared.list_config.relations, vec!["items", "customer"]);
        assert_eq!(prepared.list_config.skip, 20);
        assert_eq!(prepared.list_config.take, 10);
        assert_eq!(
            prepared.list_config.order,
            Some(OrderClause::desc("created_at"))
        );

        assert_eq!(
            prepared.remote_query_config.fields,
            vec!["id", "status", "items.title", "total", "customer.*"]
        );
        assert_eq!(
            prepared.remote_query_config.pagination,
            Some(Pagination {
                skip: 20,
                take: 10,
                order: Some(OrderClause::desc("created_at")),
            })
        );
    }

    #[test]
    fn test_retrieve_flag_disables_remote_pagination() {
        let config = order_config().retrieve();
        let prepared = prepare_list_query(&RequestQueryFields::default(), &config).unwrap();
        assert_eq!(prepared.remote_query_config.pagination, None);
        assert_eq!(prepared.list_config.take, 50);
    }

    #[test]
    fn test_rejects_fields_and_order() {
        let params = RequestQueryFields::default().with_fields("id,password,secret");
        let err = prepare_list_query(&params, &order_config()).unwrap_err();
        assert!(matches!(
            err,
            QueryError::InvalidData(InvalidDataError::FieldsNotAllowed { ref fields })
                if fields == &vec!["password".to_string(), "secret".to_string()]
        ));

        let params = RequestQueryFields::default().with_order("-age");
        let err = prepare_list_query(&params, &order_config()).unwrap_err();
        assert_eq!(err.to_string(), "Order field age is not valid");
    }

    #[test]
    fn test_retrieve_never_paginates() {
        let params = RequestQueryFields::default()
            .with_fields("id,*items")
            .with_limit(5);
        let prepared = prepare_retrieve_query(&params, &order_config()).unwrap();

        assert_eq!(
            prepared.retrieve_config.select,
            Some(vec!["id".to_string()])
        );
        assert_eq!(prepared.retrieve_config.relations, vec!["items"]);
        assert_eq!(prepared.remote_query_config.fields, vec!["id", "items.*"]);
        assert_eq!(prepared.remote_query_config.pagination, None);
    }

    #[test]
    fn test_serialized_shape() {
        let params = RequestQueryFields::default()
            .with_fields("id,status")
            .with_order("status");
        let prepared = prepare_retrieve_query(&params, &order_config()).unwrap();
        assert_eq!(
            serde_json::to_value(&prepared).unwrap(),
            json!({
                "retrieveConfig": { "select": ["id", "status"], "relations": [] },
                "remoteQueryConfig": { "fields": ["id", "status"], "pagination": {} }
            })
        );

        let prepared = prepare_list_query(&params, &order_config()).unwrap();
        assert_eq!(
            serde_json::to_value(&prepared.list_config).unwrap(),
            json!({
                "select": ["id", "status"],
                "relations": [],
                "skip": 0,
                "take": 50,
                "order": { "status": "ASC" }
            })
        );
    }

    #[test]
    fn test_list_response_envelope() {
        let config = ListQueryConfig {
            skip: 10,
            take: 5,
            ..ListQueryConfig::default()
        };
        let response = ListResponse::new(vec![1, 2, 3, 4, 5], 17, &config);
        assert_eq!(response.offset, 10);
        assert_eq!(response.limit, 5);
        assert!(response.has_next());

        let config = ListQueryConfig {
            skip: 15,
            ..config
        };
        let last = ListResponse::new(vec![1, 2], 17, &config);
        assert!(!last.has_next());
    }
}
