//! Namespace cache/coordinator
//!
//! [`I18n`] owns the in-memory tier and coordinates loads through the
//! persistent cache, the bundle fetcher and the fallback locale.

/// Coordinator construction
mod builder;
mod coordinator;
/// Shared load handles
mod handle;
mod state;

pub use builder::I18nBuilder;
pub use coordinator::{
    CONTENT_VERSION,
    I18n,
    Subscription,
};
pub use handle::{
    LoadHandle,
    LoadOutcome,
    LoadResult,
    Tier,
};
pub use state::Listener;
