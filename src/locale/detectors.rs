//! Built-in locale detectors.

use super::LocaleDetector;
use crate::storage::LocalePreference;
use crate::types::Locale;

/// Environment variables consulted by [`SystemLocaleDetector`], in order.
const LOCALE_ENV_VARS: [&str; 3] = ["LC_ALL", "LC_MESSAGES", "LANG"];

/// Detector backed by a closure.
///
/// ```
/// use edge_i18n::locale::{FnDetector, LocaleDetector};
///
/// let detector = FnDetector::new("query-param", || Some("cs".to_string()));
/// assert_eq!(detector.detect().as_deref(), Some("cs"));
/// ```
pub struct FnDetector<F> {
    name: String,
    detect: F,
}

impl<F> FnDetector<F>
where
    F: Fn() -> Option<Locale> + Send + Sync,
{
    pub fn new(name: impl Into<String>, detect: F) -> Self {
        Self { name: name.into(), detect }
    }
}

impl<F> std::fmt::Debug for FnDetector<F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FnDetector").field("name", &self.name).finish_non_exhaustive()
    }
}

impl<F> LocaleDetector for FnDetector<F>
where
    F: Fn() -> Option<Locale> + Send + Sync,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn detect(&self) -> Option<Locale> {
        (self.detect)()
    }
}

/// Uses the locale of the server-injected hydration payload.
#[derive(Debug, Clone)]
pub struct HydrationDetector {
    locale: Option<Locale>,
}

impl HydrationDetector {
    #[must_use]
    pub const fn new(locale: Option<Locale>) -> Self {
        Self { locale }
    }
}

impl LocaleDetector for HydrationDetector {
    fn name(&self) -> &str {
        "server-injected"
    }

    fn detect(&self) -> Option<Locale> {
        self.locale.clone().filter(|l| !l.is_empty())
    }
}

/// Uses the locale previously chosen through `set_locale`.
#[derive(Debug, Clone)]
pub struct PreferenceDetector {
    preference: LocalePreference,
}

impl PreferenceDetector {
    #[must_use]
    pub const fn new(preference: LocalePreference) -> Self {
        Self { preference }
    }
}

impl LocaleDetector for PreferenceDetector {
    fn name(&self) -> &str {
        "preference"
    }

    fn detect(&self) -> Option<Locale> {
        self.preference.load()
    }
}

/// Uses the POSIX locale environment (`LC_ALL`, `LC_MESSAGES`, `LANG`).
///
/// Only the language part is kept: `cs_CZ.UTF-8` yields `cs`.
pub struct SystemLocaleDetector {
    lookup: Box<dyn Fn(&str) -> Option<String> + Send + Sync>,
}

impl std::fmt::Debug for SystemLocaleDetector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SystemLocaleDetector").finish_non_exhaustive()
    }
}

impl Default for SystemLocaleDetector {
    fn default() -> Self {
        Self::from_env()
    }
}

impl SystemLocaleDetector {
    #[must_use]
    pub fn from_env() -> Self {
        Self::with_lookup(|name| std::env::var(name).ok())
    }

    /// Reads variables through `lookup` instead of the process environment.
    pub fn with_lookup(lookup: impl Fn(&str) -> Option<String> + Send + Sync + 'static) -> Self {
        Self { lookup: Box::new(lookup) }
    }
}

impl LocaleDetector for SystemLocaleDetector {
    fn name(&self) -> &str {
        "system"
    }

    fn detect(&self) -> Option<Locale> {
        LOCALE_ENV_VARS
            .iter()
            .filter_map(|name| (self.lookup)(name))
            .find(|value| !value.is_empty())
            .and_then(|value| language_part(&value))
    }
}

/// Extracts the language subtag from a POSIX or BCP 47 locale string.
fn language_part(value: &str) -> Option<Locale> {
    let language = value.split(['_', '-', '.', '@']).next()?.to_lowercase();
    if language.is_empty() || language == "c" || language == "posix" {
        return None;
    }
    Some(language)
}

/// The default detector chain: hydration payload, stored preference, system.
#[must_use]
pub fn built_in_detectors(
    hydrated_locale: Option<Locale>,
    preference: LocalePreference,
) -> Vec<Box<dyn LocaleDetector>> {
    vec![
        Box::new(HydrationDetector::new(hydrated_locale)),
        Box::new(PreferenceDetector::new(preference)),
        Box::new(SystemLocaleDetector::from_env()),
    ]
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::Arc;
    use std::time::Duration;

    use googletest::prelude::*;
    use rstest::*;

    use super::*;
    use crate::storage::MemoryStore;

    #[rstest]
    #[case("cs_CZ.UTF-8", Some("cs"))]
    #[case("en-US", Some("en"))]
    #[case("de", Some("de"))]
    #[case("sr_RS@latin", Some("sr"))]
    #[case("C", None)]
    #[case("POSIX", None)]
    #[case("C.UTF-8", None)]
    fn language_part_cases(#[case] value: &str, #[case] expected: Option<&str>) {
        assert_that!(language_part(value).as_deref(), eq(expected));
    }

    #[rstest]
    fn system_detector_respects_variable_order() {
        let env: HashMap<&str, &str> = HashMap::from([("LANG", "en_US.UTF-8"), ("LC_ALL", "cs_CZ")]);
        let detector =
            SystemLocaleDetector::with_lookup(move |name| env.get(name).map(ToString::to_string));

        assert_that!(detector.detect(), some(eq("cs")));
    }

    #[rstest]
    fn system_detector_skips_empty_values() {
        let env: HashMap<&str, &str> = HashMap::from([("LC_ALL", ""), ("LANG", "de_DE")]);
        let detector =
            SystemLocaleDetector::with_lookup(move |name| env.get(name).map(ToString::to_string));

        assert_that!(detector.detect(), some(eq("de")));
    }

    #[rstest]
    fn hydration_detector_uses_payload_locale() {
        assert_that!(HydrationDetector::new(Some("cs".to_string())).detect(), some(eq("cs")));
        assert_that!(HydrationDetector::new(Some(String::new())).detect(), none());
        assert_that!(HydrationDetector::new(None).detect(), none());
    }

    #[rstest]
    fn preference_detector_reads_saved_locale() {
        let preference =
            LocalePreference::new(Arc::new(MemoryStore::new()), "locale", Duration::from_secs(60));
        let detector = PreferenceDetector::new(preference.clone());

        assert_that!(detector.detect(), none());

        preference.save("cs");

        assert_that!(detector.detect(), some(eq("cs")));
    }

    #[rstest]
    fn built_in_order() {
        let preference =
            LocalePreference::new(Arc::new(MemoryStore::new()), "locale", Duration::from_secs(60));

        let names: Vec<String> = built_in_detectors(None, preference)
            .iter()
            .map(|d| d.name().to_string())
            .collect();

        assert_that!(names, elements_are![eq("server-injected"), eq("preference"), eq("system")]);
    }
}
