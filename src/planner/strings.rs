use std::collections::HashSet;

use serde::Serialize;

/// Canonical key for ingredient/diet/allergy names: trimmed and lowercased.
pub fn normalize_name(s: &str) -> String {
    s.trim().to_lowercase()
}

/// Concatenates `lists` in order, keeping the first occurrence of every value.
///
/// Strings compare through [`normalize_name`]; any other value compares by its
/// JSON serialization. Values that fail to serialize are always kept.
pub fn merge_arrays_unique<T, L, I>(lists: I) -> Vec<T>
where
    T: Serialize,
    L: IntoIterator<Item = T>,
    I: IntoIterator<Item = L>,
{
    let mut seen = HashSet::new();
    let mut out = Vec::new();
    for list in lists {
        for item in list {
            match dedup_key(&item) {
                Some(key) => {
                    if seen.insert(key) {
                        out.push(item);
                    }
                }
                None => out.push(item),
            }
        }
    }
    out
}

/// Like [`merge_arrays_unique`] but returns normalized names, dropping blanks.
pub fn merge_names<'a, L, I>(lists: I) -> Vec<String>
where
    L: IntoIterator<Item = &'a String>,
    I: IntoIterator<Item = L>,
{
    let normalized = lists.into_iter().map(|list| {
        list.into_iter()
            .map(|s| normalize_name(s))
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
    });
    merge_arrays_unique(normalized)
}

fn dedup_key<T: Serialize>(item: &T) -> Option<String> {
    match serde_json::to_value(item).ok()? {
        serde_json::Value::String(s) => Some(normalize_name(&s)),
        other => Some(other.to_string()),
    }
}
