//! Splitting of field paths into a select list and the relations to load

use indexmap::IndexSet;
use serde::{Deserialize, Serialize};

/// Columns to select and relations to join for a repository query
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectRelation {
    pub select: Vec<String>,
    pub relations: Vec<String>,
}

/// Split field paths the way repository queries expect them
///
/// A plain field is selected. A dotted field such as `items.variant.sku` is
/// selected as is and makes every ancestor (`items`, `items.variant`) a
/// relation. A path ending in `*` only contributes relations.
pub fn split_select_relations<I, S>(fields: I) -> SelectRelation
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut select: IndexSet<String> = IndexSet::new();
    let mut relations: IndexSet<String> = IndexSet::new();

    for field in fields {
        let field = field.as_ref();
        let Some((parent, leaf)) = field.rsplit_once('.') else {
            select.insert(field.to_string());
            continue;
        };

        let mut path = String::with_capacity(parent.len());
        for segment in parent.split('.') {
            if !path.is_empty() {
                path.push('.');
            }
            path.push_str(segment);
            relations.insert(path.clone());
        }

        if leaf != "*" {
            select.insert(field.to_string());
        }
    }

    SelectRelation {
        select: select.into_iter().collect(),
        relations: relations.into_iter().collect(),
    }
}
