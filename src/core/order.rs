//! Order clause parsing
//!
//! A single sort key is supported: `order=created_at` sorts ascending,
//! `order=-created_at` sorts descending.

use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};

use super::error::{InvalidDataError, Result};

/// Sort direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SortDirection {
    Asc,
    Desc,
}

/// A validated single-key sort
///
/// Serializes as `{ "<field>": "ASC" | "DESC" }`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderClause {
    pub field: String,
    pub direction: SortDirection,
}

impl OrderClause {
    pub fn asc(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            direction: SortDirection::Asc,
        }
    }

    pub fn desc(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            direction: SortDirection::Desc,
        }
    }

    /// Parse the raw `order` parameter without any allowlist check
    ///
    /// Returns `None` when the parameter is absent or empty.
    pub fn from_param(order: Option<&str>) -> Option<Self> {
        let order = order.filter(|o| !o.is_empty())?;
        match order.strip_prefix('-') {
            Some(field) => Some(Self::desc(field)),
            None => Some(Self::asc(order)),
        }
    }

    /// Parse the `order` parameter and check the field against the allowlist
    ///
    /// The order field must be an exact allowlist entry; nested matching does
    /// not apply to sorting.
    pub fn parse<S: AsRef<str>>(order: Option<&str>, allowed: &[S]) -> Result<Option<Self>> {
        let Some(clause) = Self::from_param(order) else {
            return Ok(None);
        };

        if !allowed.is_empty() && !allowed.iter().any(|a| a.as_ref() == clause.field) {
            tracing::warn!(field = %clause.field, "Rejected order field outside the allowlist");
            return Err(InvalidDataError::OrderNotAllowed {
                field: clause.field,
            }
            .into());
        }

        Ok(Some(clause))
    }
}

impl Serialize for OrderClause {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(1))?;
        map.serialize_entry(&self.field, &self.direction)?;
        map.end()
    }
}
