//! Field directive parsing
//!
//! The `fields` query parameter is a comma separated list of directives:
//!
//! - `name` replaces the default selection
//! - `+name` (or ` name`, since a `+` often arrives URL-decoded as a space)
//!   adds a field to the defaults
//! - `-name` removes a field from the defaults
//! - `*relation` requests every field of a relation
//!
//! ```text
//! GET /orders?fields=+summary,-email,*items
//! GET /orders?fields=id,display_id,total
//! ```

use indexmap::IndexSet;

/// Field that is always part of an explicit selection
pub const ID_FIELD: &str = "id";

/// A single parsed entry of the `fields` parameter
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldDirective {
    /// `+name` or ` name`
    Add(String),
    /// `-name`
    Remove(String),
    /// `*relation`
    StarRelation(String),
    /// `name`
    Bare(String),
}

impl FieldDirective {
    /// Parse one token, returning `None` for empty tokens
    pub fn parse(token: &str) -> Option<Self> {
        if token.is_empty() {
            return None;
        }

        let directive = if let Some(name) = token.strip_prefix('+') {
            FieldDirective::Add(name.trim().to_string())
        } else if token.starts_with(' ') {
            let name = token.trim();
            FieldDirective::Add(name.strip_prefix('+').unwrap_or(name).to_string())
        } else if let Some(name) = token.strip_prefix('-') {
            FieldDirective::Remove(name.to_string())
        } else if let Some(name) = token.strip_prefix('*') {
            FieldDirective::StarRelation(name.to_string())
        } else {
            FieldDirective::Bare(token.to_string())
        };

        Some(directive)
    }

    /// Field or relation name without its marker
    pub fn name(&self) -> &str {
        match self {
            FieldDirective::Add(name)
            | FieldDirective::Remove(name)
            | FieldDirective::StarRelation(name)
            | FieldDirective::Bare(name) => name,
        }
    }

    pub fn is_bare(&self) -> bool {
        matches!(self, FieldDirective::Bare(_))
    }

    /// The selection entry this directive stands for when it replaces the
    /// defaults: markers are dropped, except `*` which still denotes a relation
    fn replacement_entry(&self) -> String {
        match self {
            FieldDirective::StarRelation(name) => format!("*{}", name),
            other => other.name().to_string(),
        }
    }
}

/// Split a raw `fields` parameter into directives, dropping empty tokens
pub fn parse_directives(raw: &str) -> Vec<FieldDirective> {
    raw.split(',').filter_map(FieldDirective::parse).collect()
}

/// How a list of directives relates to the entity defaults
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionMode {
    /// Start from scratch with the listed names
    Replace,
    /// Apply the directives on top of the defaults
    Modify,
}

impl SelectionMode {
    /// An empty list, or any bare name, replaces the defaults.
    /// `*relation` counts as a marked directive.
    pub fn for_directives(directives: &[FieldDirective]) -> Self {
        if directives.is_empty() || directives.iter().any(FieldDirective::is_bare) {
            SelectionMode::Replace
        } else {
            SelectionMode::Modify
        }
    }
}

/// Fields and star relations resolved from a request
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldSelection {
    /// Plain (possibly dotted) field paths, in selection order
    pub fields: IndexSet<String>,
    /// Relations whose every field is requested, without the `*` marker
    pub star_relations: IndexSet<String>,
}

impl FieldSelection {
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty() && self.star_relations.is_empty()
    }

    /// Build a selection from raw entries, moving `*relation` entries into
    /// `star_relations`
    pub fn from_entries<I, S>(entries: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut selection = FieldSelection::default();
        for entry in entries {
            let entry = entry.into();
            match entry.strip_prefix('*') {
                Some(relation) => {
                    selection.star_relations.insert(relation.to_string());
                }
                None => {
                    selection.fields.insert(entry);
                }
            }
        }
        selection
    }
}

/// Resolve the `fields` parameter against the entity defaults
///
/// Without a `fields` parameter the defaults are used as they are. Otherwise
/// the directives either replace or modify the defaults (see
/// [`SelectionMode`]) and `id` is added to the result.
pub fn resolve_fields(fields: Option<&str>, defaults: &[String]) -> FieldSelection {
    let Some(raw) = fields else {
        return FieldSelection::from_entries(defaults.iter().cloned());
    };

    let directives = parse_directives(raw);
    let mut entries: IndexSet<String> = match SelectionMode::for_directives(&directives) {
        SelectionMode::Replace => directives
            .iter()
            .map(FieldDirective::replacement_entry)
            .collect(),
        SelectionMode::Modify => {
            let mut entries: IndexSet<String> = defaults.iter().cloned().collect();
            for directive in &directives {
                match directive {
                    FieldDirective::Add(name) => {
                        entries.insert(name.clone());
                    }
                    FieldDirective::StarRelation(name) => {
                        entries.insert(format!("*{}", name));
                    }
                    FieldDirective::Remove(name) => {
                        entries.shift_remove(name);
                    }
                    // unreachable in this mode
                    FieldDirective::Bare(name) => {
                        entries.insert(name.clone());
                    }
                }
            }
            entries
        }
    };

    entries.insert(ID_FIELD.to_string());

    FieldSelection::from_entries(entries)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    fn fields_of(selection: &FieldSelection) -> Vec<&str> {
        selection.fields.iter().map(String::as_str).collect()
    }

    #[test]
    fn test_parse_markers() {
        assert_eq!(
            FieldDirective::parse("+name"),
            Some(FieldDirective::Add("name".to_string()))
        );
        assert_eq!(
            FieldDirective::parse(" name"),
            Some(FieldDirective::Add("name".to_string()))
        );
        assert_eq!(
            FieldDirective::parse("-email"),
            Some(FieldDirective::Remove("email".to_string()))
        );
        assert_eq!(
            FieldDirective::parse("*variants"),
            Some(FieldDirective::StarRelation("variants".to_string()))
        );
        assert_eq!(
            FieldDirective::parse("title"),
            Some(FieldDirective::Bare("title".to_string()))
        );
        assert_eq!(FieldDirective::parse(""), None);
    }

    #[test]
    fn test_parse_directives_drops_empty_tokens() {
        let directives = parse_directives("a,,+b,");
        assert_eq!(directives.len(), 2);
        assert_eq!(directives[0].name(), "a");
        assert_eq!(directives[1].name(), "b");
    }

    #[test]
    fn test_mode_selection() {
        assert_eq!(SelectionMode::for_directives(&[]), SelectionMode::Replace);
        assert_eq!(
            SelectionMode::for_directives(&parse_directives("+a,-b,*c")),
            SelectionMode::Modify
        );
        assert_eq!(
            SelectionMode::for_directives(&parse_directives("+a,b")),
            SelectionMode::Replace
        );
    }

    #[test]
    fn test_no_fields_uses_defaults_verbatim() {
        let selection = resolve_fields(None, &strings(&["title", "*variants"]));
        assert_eq!(fields_of(&selection), vec!["title"]);
        assert!(selection.star_relations.contains("variants"));
        assert!(!selection.fields.contains("id"));
    }

    #[test]
    fn test_incremental_add_remove() {
        let selection = resolve_fields(Some("+a,-id"), &strings(&["id", "b"]));
        assert_eq!(fields_of(&selection), vec!["b", "a", "id"]);
    }

    #[test]
    fn test_later_directive_wins() {
        let selection = resolve_fields(Some("+a,-a"), &strings(&["b"]));
        assert_eq!(fields_of(&selection), vec!["b", "id"]);

        let selection = resolve_fields(Some("-b,+b"), &strings(&["b"]));
        assert_eq!(fields_of(&selection), vec!["b", "id"]);
    }

    #[test]
    fn test_bare_tokens_replace_defaults() {
        let selection = resolve_fields(Some("a,b"), &strings(&["x", "y"]));
        assert_eq!(fields_of(&selection), vec!["a", "b", "id"]);
    }

    #[test]
    fn test_replacement_strips_markers() {
        let selection = resolve_fields(Some("a,+b,-c,*d"), &strings(&["x"]));
        assert_eq!(fields_of(&selection), vec!["a", "b", "c", "id"]);
        assert_eq!(
            selection.star_relations.iter().collect::<Vec<_>>(),
            vec!["d"]
        );
    }

    #[test]
    fn test_empty_fields_selects_only_id() {
        let selection = resolve_fields(Some(""), &strings(&["x", "y"]));
        assert_eq!(fields_of(&selection), vec!["id"]);
        assert!(selection.star_relations.is_empty());
    }

    #[test]
    fn test_star_relation_keeps_incremental_mode() {
        let selection = resolve_fields(Some("*items,+total"), &strings(&["id", "status"]));
        assert_eq!(fields_of(&selection), vec!["id", "status", "total"]);
        assert_eq!(
            selection.star_relations.iter().collect::<Vec<_>>(),
            vec!["items"]
        );
    }
}
