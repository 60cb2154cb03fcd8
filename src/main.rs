//! Fetches the latest translations from the CDN during a build.
//!
//! If no endpoint is configured or the CDN is unreachable, bundled
//! translations are kept as they are and the process still exits with 0.

use std::path::PathBuf;

use clap::Parser;
use edge_i18n::config::load_from_dir;
use edge_i18n::fetch::fetcher_for;
use edge_i18n::sync::mirror;
use tracing_subscriber::EnvFilter;

/// Command-line arguments for `edge-i18n-sync`.
#[derive(Debug, Parser)]
#[command(name = "edge-i18n-sync")]
#[command(about = "Mirror translations from a CDN into the bundled locale directory")]
#[command(version)]
struct Args {
    /// Base URL (or directory) serving `version.json` and `<locale>/<ns>.json`.
    /// Falls back to `cdnEndpoint` in `.edge-i18n.json`.
    #[arg(long, env = "EDGE_I18N_CDN_ENDPOINT")]
    cdn_endpoint: Option<String>,

    /// Where to write the files.
    #[arg(long, env = "EDGE_I18N_OUTPUT_DIR", default_value = "public/locales")]
    output_dir: PathBuf,

    /// Locales to fetch. Defaults to the manifest's list.
    #[arg(long, env = "EDGE_I18N_LOCALES", value_delimiter = ',')]
    locales: Option<Vec<String>>,

    /// Namespaces to fetch. Defaults to the manifest's list.
    #[arg(long, env = "EDGE_I18N_NAMESPACES", value_delimiter = ',')]
    namespaces: Option<Vec<String>>,

    /// Directory holding `.edge-i18n.json`.
    #[arg(long, default_value = ".")]
    config_dir: PathBuf,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .init();

    let args = Args::parse();

    let Some(endpoint) = resolve_endpoint(&args) else {
        tracing::info!("No CDN endpoint configured, skipping translation fetch. Using bundled translations.");
        return;
    };

    let fetcher = match fetcher_for(&endpoint) {
        Ok(fetcher) => fetcher,
        Err(error) => {
            tracing::warn!(%error, "Translation fetch failed");
            return;
        }
    };

    tracing::info!(%endpoint, output_dir = %args.output_dir.display(), "Fetching translations");
    let report = mirror(fetcher.as_ref(), &args.output_dir, args.locales, args.namespaces).await;
    if let Some(reason) = report.skipped {
        tracing::info!(?reason, "Nothing fetched. Using bundled translations.");
    }
}

/// CLI / 環境変数を優先し、なければ設定ファイルの値を使う
fn resolve_endpoint(args: &Args) -> Option<String> {
    if let Some(endpoint) = args.cdn_endpoint.as_ref().filter(|e| !e.is_empty()) {
        return Some(endpoint.trim_end_matches('/').to_string());
    }

    match load_from_dir(&args.config_dir) {
        Ok(config) => config.and_then(|c| c.cdn_endpoint),
        Err(error) => {
            tracing::warn!(%error, "Ignoring invalid configuration file");
            None
        }
    }
}
