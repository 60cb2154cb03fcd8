//! Placeholder substitution for resolved translations

use std::collections::HashMap;
use std::sync::LazyLock;

use regex::{
    Captures,
    Regex,
};

/// Values substituted into `{{name}}` placeholders.
pub type Params = HashMap<String, String>;

/// `{{name}}` where name is made of word characters.
#[allow(clippy::expect_used)]
static PLACEHOLDER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{\{(\w+)\}\}").expect("placeholder pattern is valid"));

/// Renders a resolved translation with caller-supplied values.
pub trait Interpolator: Send + Sync {
    fn interpolate(&self, template: &str, params: Option<&Params>) -> String;
}

/// Replaces `{{name}}` placeholders with matching params.
///
/// Placeholders without a matching param are left as they are.
#[derive(Debug, Default, Clone, Copy)]
pub struct DoubleBraceInterpolator;

impl Interpolator for DoubleBraceInterpolator {
    fn interpolate(&self, template: &str, params: Option<&Params>) -> String {
        interpolate(template, params)
    }
}

/// Substitutes `{{name}}` placeholders in `template`.
///
/// # Examples
/// ```
/// use edge_i18n::interpolation::{Params, interpolate};
///
/// let params = Params::from([("name".to_string(), "Ada".to_string())]);
///
/// assert_eq!(interpolate("Hello, {{name}}!", Some(&params)), "Hello, Ada!");
/// assert_eq!(interpolate("Hello, {{who}}!", Some(&params)), "Hello, {{who}}!");
/// ```
#[must_use]
pub fn interpolate(template: &str, params: Option<&Params>) -> String {
    let Some(params) = params else {
        return template.to_string();
    };

    PLACEHOLDER
        .replace_all(template, |caps: &Captures<'_>| {
            caps.get(1)
                .and_then(|name| params.get(name.as_str()))
                .map_or_else(|| caps.get(0).map_or("", |m| m.as_str()).to_string(), Clone::clone)
        })
        .into_owned()
}
