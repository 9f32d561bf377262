//! Shared utilities for the tier implementations.

use std::time::Instant;

/// Build the storage key for an entry in a namespaced flat keyspace.
///
/// Format: `{store}:{table}:{key}`, with `:` and `\` escaped in the store
/// and table names. The first two unescaped colons always end the
/// namespace, so no table's namespace is a prefix of another's.
pub fn build_record_key(store: &str, table: &str, key: &str) -> String {
    format!(
        "{}:{}:{}",
        escape_component(store),
        escape_component(table),
        key
    )
}

/// Escape `\` and `:` in one namespace component.
fn escape_component(component: &str) -> String {
    let mut escaped = String::with_capacity(component.len());
    for c in component.chars() {
        if matches!(c, ':' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

/// Escape glob metacharacters so a literal string can prefix a `KEYS` pattern.
pub fn escape_glob(literal: &str) -> String {
    let mut escaped = String::with_capacity(literal.len());
    for c in literal.chars() {
        if matches!(c, '*' | '?' | '[' | ']' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

/// Milliseconds elapsed since `start`.
pub fn elapsed_ms(start: Instant) -> f64 {
    start.elapsed().as_secs_f64() * 1000.0
}
