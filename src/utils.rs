//! Utility functions for string processing and document field access.

use serde_json::Value;

#[cfg(feature = "unicode-normalization")]
use unicode_normalization::UnicodeNormalization;

use crate::types::SearchDocument;

/// Fold a string for matching: optionally lowercase and strip diacritics.
///
/// With `strip_diacritics` this makes "café" and "cafe" compare equal:
/// - "café" → "cafe"
/// - "naïve" → "naive"
///
/// # Algorithm (with unicode-normalization feature)
///
/// 1. NFD normalize (decompose characters into base + combining marks)
/// 2. Filter out combining marks
/// 3. Lowercase unless `case_sensitive`
///
/// Without the feature, diacritics are left alone.
pub fn fold(value: &str, case_sensitive: bool, strip_diacritics: bool) -> String {
    let stripped = if strip_diacritics {
        strip_marks(value)
    } else {
        value.to_string()
    };
    if case_sensitive {
        stripped
    } else {
        stripped.to_lowercase()
    }
}

#[cfg(feature = "unicode-normalization")]
fn strip_marks(value: &str) -> String {
    value.nfd().filter(|c| !is_combining_mark(*c)).collect()
}

#[cfg(not(feature = "unicode-normalization"))]
fn strip_marks(value: &str) -> String {
    value.to_string()
}

/// Check if a character is a combining mark (diacritic).
#[cfg(feature = "unicode-normalization")]
fn is_combining_mark(c: char) -> bool {
    matches!(c,
        '\u{0300}'..='\u{036F}' |  // Combining Diacritical Marks
        '\u{1AB0}'..='\u{1AFF}' |  // Combining Diacritical Marks Extended
        '\u{1DC0}'..='\u{1DFF}' |  // Combining Diacritical Marks Supplement
        '\u{20D0}'..='\u{20FF}' |  // Combining Diacritical Marks for Symbols
        '\u{FE20}'..='\u{FE2F}'    // Combining Half Marks
    )
}

/// Collect the searchable strings a key points at.
///
/// Keys may be dotted paths (`variant.title`). Arrays are walked
/// element-wise at every level, so `tags` on `{"tags": ["a", "b"]}` yields
/// both tags. Numbers and booleans are stringified; nulls and objects at the
/// leaf are skipped.
pub fn field_values(doc: &SearchDocument, key: &str) -> Vec<String> {
    let mut segments = key.split('.');
    let Some(first) = segments.next() else {
        return Vec::new();
    };
    let Some(root) = doc.get(first) else {
        return Vec::new();
    };

    let mut current = vec![root];
    for segment in segments {
        current = current
            .into_iter()
            .flat_map(expand_arrays)
            .filter_map(|value| value.get(segment))
            .collect();
    }

    let mut out = Vec::new();
    for value in current {
        collect_leaves(value, &mut out);
    }
    out
}

fn expand_arrays(value: &Value) -> Vec<&Value> {
    match value {
        Value::Array(items) => items.iter().flat_map(expand_arrays).collect(),
        other => vec![other],
    }
}

fn collect_leaves(value: &Value, out: &mut Vec<String>) {
    match value {
        Value::String(s) => out.push(s.clone()),
        Value::Number(n) => out.push(n.to_string()),
        Value::Bool(b) => out.push(b.to_string()),
        Value::Array(items) => items.iter().for_each(|item| collect_leaves(item, out)),
        Value::Null | Value::Object(_) => {}
    }
}
