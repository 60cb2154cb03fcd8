//! Translation bundle model

use std::collections::HashMap;

use serde::{
    Deserialize,
    Serialize,
};
use serde_json::Value;

/// A value stored under a key of a [`Bundle`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Entry {
    /// A translated string.
    Text(String),
    /// A nested group of keys.
    Nested(Bundle),
    /// Any other JSON value (numbers, arrays, booleans, null).
    ///
    /// Kept so that a document with stray non-string leaves still loads.
    /// Lookups that resolve to it fall back to the raw key.
    Other(Value),
}

/// Translations for one (locale, namespace) pair.
///
/// Serialized as a plain JSON object:
/// ```json
/// { "title": "Profile", "settings": { "theme": "Light" } }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Bundle(HashMap<String, Entry>);

impl Bundle {
    /// Creates an empty bundle.
    #[must_use]
    pub fn new() -> Self {
        Self(HashMap::new())
    }

    /// Gets the entry stored directly under `key` (no dot traversal).
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Entry> {
        self.0.get(key)
    }

    /// Inserts an entry, replacing any previous value.
    pub fn insert(&mut self, key: impl Into<String>, entry: Entry) -> Option<Entry> {
        self.0.insert(key.into(), entry)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Resolves a dot-separated key to its string value.
    ///
    /// Returns `None` as soon as a segment is missing, a non-final segment is
    /// not a nested bundle, or the final value is not a string.
    ///
    /// # Examples
    /// ```
    /// use edge_i18n::translation::Bundle;
    ///
    /// let bundle: Bundle =
    ///     serde_json::from_str(r#"{"settings": {"theme": "Light"}}"#).unwrap();
    ///
    /// assert_eq!(bundle.resolve("settings.theme"), Some("Light"));
    /// assert_eq!(bundle.resolve("settings.missing"), None);
    /// assert_eq!(bundle.resolve("settings"), None);
    /// ```
    #[must_use]
    pub fn resolve(&self, key: &str) -> Option<&str> {
        let mut segments = key.split('.');
        let mut entry = self.get(segments.next()?)?;

        for segment in segments {
            let Entry::Nested(bundle) = entry else {
                return None;
            };
            entry = bundle.get(segment)?;
        }

        match entry {
            Entry::Text(text) => Some(text),
            Entry::Nested(_) | Entry::Other(_) => None,
        }
    }
}

impl<K: Into<String>> FromIterator<(K, Entry)> for Bundle {
    fn from_iter<I: IntoIterator<Item = (K, Entry)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }
}

impl From<&str> for Entry {
    fn from(text: &str) -> Self {
        Self::Text(text.to_string())
    }
}

impl From<String> for Entry {
    fn from(text: String) -> Self {
        Self::Text(text)
    }
}

impl From<Bundle> for Entry {
    fn from(bundle: Bundle) -> Self {
        Self::Nested(bundle)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use googletest::prelude::*;
    use rstest::*;
    use serde_json::json;

    use super::*;

    #[fixture]
    fn profile() -> Bundle {
        serde_json::from_value(json!({
            "title": "Profile",
            "settings": {
                "theme": "Light",
                "advanced": {
                    "beta": "Beta features"
                }
            },
            "count": 3,
            "tags": ["a", "b"]
        }))
        .unwrap()
    }

    #[rstest]
    #[case("title", Some("Profile"))]
    #[case("settings.theme", Some("Light"))]
    #[case("settings.advanced.beta", Some("Beta features"))]
    #[case("settings.missing", None)]
    #[case("settings", None)]
    #[case("title.deeper", None)]
    #[case("count", None)]
    #[case("tags", None)]
    #[case("tags.0", None)]
    #[case("", None)]
    #[case("missing", None)]
    fn resolve_follows_dotted_path(
        profile: Bundle,
        #[case] key: &str,
        #[case] expected: Option<&str>,
    ) {
        assert_that!(profile.resolve(key), eq(expected));
    }

    #[rstest]
    fn non_string_leaves_deserialize_as_other(profile: Bundle) {
        assert_that!(profile.get("count"), some(eq(&Entry::Other(json!(3)))));
        assert_that!(matches!(profile.get("tags"), Some(Entry::Other(_))), eq(true));
    }

    #[rstest]
    fn serializes_back_to_plain_object(profile: Bundle) {
        let value = serde_json::to_value(&profile).unwrap();

        assert_that!(value["settings"]["theme"], eq(&json!("Light")));
        assert_that!(value["count"], eq(&json!(3)));
    }

    #[rstest]
    fn top_level_array_is_rejected() {
        let result = serde_json::from_str::<Bundle>(r#"["a", "b"]"#);

        assert_that!(result, err(anything()));
    }

    #[rstest]
    fn from_iter_builds_bundle() {
        let bundle: Bundle = [("hello", Entry::from("Hello")), ("bye", Entry::from("Bye"))]
            .into_iter()
            .collect();

        assert_that!(bundle.len(), eq(2));
        assert_that!(bundle.resolve("hello"), some(eq("Hello")));
    }
}
