//! Allowlist checks for client-selected fields
//!
//! An empty allowlist accepts everything. Otherwise plain fields must equal
//! an allowed entry, or be a dotted path starting with one (`product` admits
//! `product.title`, `items.variant` admits `items.variant_id`), while star
//! relations must be allowed verbatim.

use super::directive::FieldSelection;
use super::error::{InvalidDataError, Result};

/// Check a plain (possibly dotted) field path
///
/// Dotted paths pass on a plain string prefix of an allowed entry; fields
/// without a dot need an exact entry.
pub fn is_field_allowed<S: AsRef<str>>(field: &str, allowed: &[S]) -> bool {
    if allowed.is_empty() {
        return true;
    }

    allowed.iter().any(|entry| {
        let entry = entry.as_ref();
        field == entry || (field.contains('.') && field.starts_with(entry))
    })
}

/// Check a star relation, which needs an exact allowlist entry
pub fn is_relation_allowed<S: AsRef<str>>(relation: &str, allowed: &[S]) -> bool {
    allowed.is_empty() || allowed.iter().any(|entry| entry.as_ref() == relation)
}

/// Every entry of the selection that the allowlist rejects, plain fields
/// first, then star relations
pub fn disallowed_fields<S: AsRef<str>>(
    selection: &FieldSelection,
    allowed: &[S],
) -> Vec<String> {
    if allowed.is_empty() {
        return Vec::new();
    }

    let fields = selection
        .fields
        .iter()
        .filter(|field| !is_field_allowed(field.as_str(), allowed));
    let relations = selection
        .star_relations
        .iter()
        .filter(|relation| !is_relation_allowed(relation.as_str(), allowed));

    fields.chain(relations).cloned().collect()
}

/// Reject the selection if any entry is outside the allowlist
pub fn validate_selection<S: AsRef<str>>(
    selection: &FieldSelection,
    allowed: &[S],
) -> Result<()> {
    let rejected = disallowed_fields(selection, allowed);
    if selection.is_empty() || rejected.is_empty() {
        return Ok(());
    }

    tracing::warn!(fields = ?rejected, "Rejected query fields outside the allowlist");
    Err(InvalidDataError::FieldsNotAllowed { fields: rejected }.into())
}
