//! Remote query objects
//!
//! A graph fetcher takes a tree rooted at the entry point entity:
//!
//! ```text
//! {
//!   "order": {
//!     "__args": { "id": "order_1" },
//!     "fields": ["id", "status"],
//!     "items": {
//!       "fields": ["title", "quantity"],
//!       "variant": { "fields": ["*"] }
//!     }
//!   }
//! }
//! ```
//!
//! [`RemoteQueryObject::from_fields`] builds that tree from the flat field
//! paths of a [`RemoteQueryConfig`].

use indexmap::IndexMap;
use serde::{Serialize, Serializer};
use serde_json::{Map, Value};

use super::query::RemoteQueryConfig;

const ARGS_KEY: &str = "__args";
const FIELDS_KEY: &str = "fields";

/// One entity or relation of a remote query
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RemoteQueryNode {
    /// Arguments (filters, pagination) of this node
    pub args: Option<Value>,
    /// Scalar fields to fetch, `*` for all of them
    pub fields: Vec<String>,
    /// Nested relations by name
    pub relations: IndexMap<String, RemoteQueryNode>,
}

impl RemoteQueryNode {
    fn to_value(&self, is_root: bool) -> Value {
        let mut map = Map::new();
        if let Some(args) = &self.args {
            map.insert(ARGS_KEY.to_string(), args.clone());
        }
        if is_root || !self.fields.is_empty() {
            map.insert(FIELDS_KEY.to_string(), Value::from(self.fields.clone()));
        }
        for (name, relation) in &self.relations {
            map.insert(name.clone(), relation.to_value(false));
        }
        Value::Object(map)
    }
}

/// A remote query rooted at an entry point entity
#[derive(Debug, Clone, PartialEq)]
pub struct RemoteQueryObject {
    pub entry_point: String,
    pub root: RemoteQueryNode,
}

impl RemoteQueryObject {
    /// Build the query tree for `fields`
    ///
    /// `variables` become the entry point's `__args`. A variable whose key is
    /// a relation path (`"items"`, `"items.variant"`) is also attached to
    /// that relation.
    pub fn from_fields<I, S>(
        entry_point: impl Into<String>,
        fields: I,
        variables: Option<Value>,
    ) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut root = RemoteQueryNode::default();
        let relation_args = variables.as_ref().and_then(Value::as_object);

        for field in fields {
            let field = field.as_ref();
            let Some((parent, leaf)) = field.rsplit_once('.') else {
                root.fields.push(field.to_string());
                continue;
            };

            let mut node = &mut root;
            let mut path = String::new();
            for segment in parent.split('.') {
                if !path.is_empty() {
                    path.push('.');
                }
                path.push_str(segment);

                node = node.relations.entry(segment.to_string()).or_default();
                if let Some(args) = relation_args.and_then(|vars| vars.get(&path)) {
                    node.args = Some(args.clone());
                }
            }
            node.fields.push(leaf.to_string());
        }

        root.args = variables;

        Self {
            entry_point: entry_point.into(),
            root,
        }
    }

    pub fn to_value(&self) -> Value {
        let mut map = Map::new();
        map.insert(self.entry_point.clone(), self.root.to_value(true));
        Value::Object(map)
    }
}

impl Serialize for RemoteQueryObject {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_value().serialize(serializer)
    }
}

impl RemoteQueryConfig {
    /// Build the remote query for `entry_point`
    ///
    /// For list queries the pagination (`skip`, `take`, `order`) is merged
    /// into the entry point arguments next to `variables`. Merging needs an
    /// object: non-object `variables` are dropped (with a warning) and the
    /// arguments hold the pagination alone.
    pub fn to_remote_query(
        &self,
        entry_point: impl Into<String>,
        variables: Option<Value>,
    ) -> RemoteQueryObject {
        let variables = match (&self.pagination, variables) {
            (None, variables) => variables,
            (Some(pagination), variables) => {
                let mut merged = match variables {
                    Some(Value::Object(map)) => map,
                    None => Map::new(),
                    Some(other) => {
                        tracing::warn!(
                            variables = %other,
                            "Dropping non-object remote query variables of a paginated query"
                        );
                        Map::new()
                    }
                };
                if let Ok(Value::Object(pagination)) = serde_json::to_value(pagination) {
                    merged.extend(pagination);
                }
                Some(Value::Object(merged))
            }
        };

        RemoteQueryObject::from_fields(entry_point, &self.fields, variables)
    }
}
