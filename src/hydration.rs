//! Server-rendered hand-off payload

use std::collections::HashMap;

use serde::{
    Deserialize,
    Serialize,
};

use crate::translation::Bundle;
use crate::types::{
    Locale,
    split_cache_key,
};

/// Translations injected by a server render, consumed once at construction.
///
/// ```json
/// { "locale": "cs", "namespaces": { "cs:common": { "hello": "Ahoj" } } }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HydrationPayload {
    pub locale: Locale,
    /// Keyed by `"<locale>:<namespace>"`.
    #[serde(default)]
    pub namespaces: HashMap<String, Bundle>,
}

impl HydrationPayload {
    /// Parses a payload from JSON text.
    ///
    /// # Errors
    /// Returns an error when the text is not a valid payload.
    pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }

    /// Iterates `(cache key, namespace, bundle)` for well-formed keys.
    pub fn entries(&self) -> impl Iterator<Item = (&str, &str, &Bundle)> {
        self.namespaces.iter().filter_map(|(key, bundle)| match split_cache_key(key) {
            Some((_, namespace)) => Some((key.as_str(), namespace, bundle)),
            None => {
                tracing::warn!(%key, "Ignoring hydrated namespace with malformed key");
                None
            }
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use googletest::prelude::*;
    use rstest::*;

    use super::*;

    #[rstest]
    fn parses_payload_and_skips_malformed_keys() {
        let payload = HydrationPayload::from_json(
            r#"{"locale": "cs", "namespaces": {"cs:common": {"hello": "Ahoj"}, "broken": {}}}"#,
        )
        .unwrap();

        let entries: Vec<_> = payload.entries().collect();

        assert_that!(payload.locale, eq("cs"));
        assert_that!(entries, len(eq(1)));
        let (key, namespace, bundle) = entries[0];
        assert_that!(key, eq("cs:common"));
        assert_that!(namespace, eq("common"));
        assert_that!(bundle.resolve("hello"), some(eq("Ahoj")));
    }

    #[rstest]
    fn namespaces_default_to_empty() {
        let payload = HydrationPayload::from_json(r#"{"locale": "en"}"#).unwrap();

        assert_that!(payload.entries().count(), eq(0));
    }
}
