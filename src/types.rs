//! Core types used throughout the project.

/// A language/region code such as `"en"` or `"cs"`.
pub type Locale = String;

/// A named group of translation keys, loaded and cached independently.
pub type Namespace = String;

/// Builds the memory-cache key for a (locale, namespace) pair.
///
/// # Examples
/// ```
/// use edge_i18n::types::cache_key;
///
/// assert_eq!(cache_key("en", "common"), "en:common");
/// ```
#[must_use]
pub fn cache_key(locale: &str, namespace: &str) -> String {
    format!("{locale}:{namespace}")
}

/// Splits a cache key back into `(locale, namespace)`.
///
/// Returns `None` when the key has no separator or either side is empty.
#[must_use]
pub fn split_cache_key(key: &str) -> Option<(&str, &str)> {
    let (locale, namespace) = key.split_once(':')?;
    if locale.is_empty() || namespace.is_empty() {
        return None;
    }
    Some((locale, namespace))
}

/// Checks that a namespace only contains word characters and hyphens.
///
/// Namespaces end up in URLs and file paths, so separators, dots and
/// control characters are rejected.
#[must_use]
pub fn is_valid_namespace(namespace: &str) -> bool {
    !namespace.is_empty()
        && namespace.chars().all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
}
