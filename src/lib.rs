//! edge-i18n
//!
//! 名前空間単位で翻訳を遅延読み込みする i18n ライブラリ。
//! メモリ → 永続キャッシュ → リモート → フォールバックロケールの順に解決し、
//! バックグラウンドで CDN のバージョンと照合する。

pub mod config;
pub mod core;
pub mod error;
pub mod fetch;
pub mod hydration;
pub mod interpolation;
pub mod locale;
pub mod revalidate;
pub mod storage;
pub mod sync;
pub mod translation;
pub mod types;

#[cfg(test)]
mod test_utils;

// コーディネーターを再エクスポート
pub use crate::core::{
    I18n,
    I18nBuilder,
    LoadHandle,
    LoadOutcome,
    Subscription,
    Tier,
};
pub use error::{
    I18nError,
    LoadError,
};
