//! 設定ファイルの読み込み関数

use std::path::Path;

use jsonc_parser::ParseOptions;

use super::{
    ConfigError,
    I18nConfig,
};

/// Name of the configuration file looked up in a project directory.
pub const CONFIG_FILE_NAME: &str = ".edge-i18n.json";

/// ディレクトリから設定を読み込む
///
/// `.edge-i18n.json` ファイルを探して読み込む（コメント・末尾カンマ可）
///
/// # Arguments
/// * `dir` - 設定ファイルを探すディレクトリ
///
/// # Returns
/// - `Ok(Some(config))`: 設定ファイルが見つかり、読み込みとバリデーションに成功
/// - `Ok(None)`: 設定ファイルが見つからない
/// - `Err(ConfigError)`: ファイル読み込み、パース、またはバリデーションエラー
pub fn load_from_dir(dir: &Path) -> Result<Option<I18nConfig>, ConfigError> {
    let config_path = dir.join(CONFIG_FILE_NAME);

    if !config_path.exists() {
        tracing::debug!("Configuration file not found: {:?}", config_path);
        return Ok(None);
    }

    tracing::debug!("Loading configuration from: {:?}", config_path);

    let content = std::fs::read_to_string(&config_path)?;
    let config = parse_config(&content)?;
    config.validate().map_err(ConfigError::ValidationErrors)?;

    Ok(Some(config))
}

/// JSONC テキストから設定をパースする
///
/// 空のドキュメントはデフォルト設定として扱う
pub fn parse_config(content: &str) -> Result<I18nConfig, ConfigError> {
    let value = jsonc_parser::parse_to_serde_value(content, &ParseOptions::default())
        .map_err(|e| ConfigError::SyntaxError(e.to_string()))?;

    match value {
        Some(value) => Ok(serde_json::from_value(value)?),
        None => Ok(I18nConfig::default()),
    }
}
