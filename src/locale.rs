//! Locale resolution
//!
//! Detectors are queried in order; the first one yielding a supported locale
//! wins, otherwise the configured default is used.

mod detectors;

pub use detectors::{
    FnDetector,
    HydrationDetector,
    PreferenceDetector,
    SystemLocaleDetector,
    built_in_detectors,
};

use crate::types::Locale;

/// A single strategy for guessing the user's locale.
pub trait LocaleDetector: Send + Sync {
    /// Short identifier used in logs.
    fn name(&self) -> &str;

    fn detect(&self) -> Option<Locale>;
}

/// Returns the first detected locale that is supported, else `default_locale`.
#[must_use]
pub fn resolve_locale(
    detectors: &[Box<dyn LocaleDetector>],
    supported: &[String],
    default_locale: &str,
) -> Locale {
    for detector in detectors {
        let Some(locale) = detector.detect() else {
            continue;
        };
        if supported.iter().any(|s| *s == locale) {
            tracing::debug!(detector = detector.name(), %locale, "Locale detected");
            return locale;
        }
        tracing::debug!(detector = detector.name(), %locale, "Ignoring unsupported locale");
    }

    default_locale.to_string()
}
