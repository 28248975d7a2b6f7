//! 設定
//!
//! JSON 形式の設定ファイルを読み込む。指定がなければ
//! `<config_dir>/tsuzuri/config.json` を探し、存在しなければ既定値を使う。

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::buffer::DEFAULT_CAPACITY;
use crate::error::{ConfigError, FileError, Result};

const CONFIG_DIR_NAME: &str = "tsuzuri";
const CONFIG_FILE_NAME: &str = "config.json";

/// エディタ設定
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    /// 連続入力を1つの取り消し単位にまとめる時間幅（ミリ秒、0で無効）
    pub merge_window_ms: u64,
    /// ギャップバッファの初期容量（文字数）
    pub initial_capacity: usize,
    /// ログレベル（error / warn / info / debug / trace）
    pub log_level: String,
    /// ログファイル（未指定時は stderr のみ）
    pub log_file: Option<PathBuf>,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            merge_window_ms: 800,
            initial_capacity: DEFAULT_CAPACITY,
            log_level: "warn".to_string(),
            log_file: None,
        }
    }
}

impl EditorConfig {
    /// 既定の設定ファイルパス
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(CONFIG_DIR_NAME).join(CONFIG_FILE_NAME))
    }

    /// 設定を読み込む
    ///
    /// `path` が指定された場合はそのファイルが必須。未指定なら既定パスを探し、
    /// 見つからなければ既定値を返す。
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::from_file(path),
            None => match Self::default_path() {
                Some(default) if default.is_file() => Self::from_file(&default),
                _ => Ok(Self::default()),
            },
        }
    }

    /// 指定ファイルから読み込む
    pub fn from_file(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(FileError::NotFound {
                path: path.display().to_string(),
            }
            .into());
        }

        let content = std::fs::read_to_string(path)?;
        let config = Self::from_json(&content).map_err(|err| match err {
            ConfigError::Parse { message, .. } => ConfigError::Parse {
                path: path.display().to_string(),
                message,
            },
            other => other,
        })?;

        log::debug!("loaded configuration from {}", path.display());
        Ok(config)
    }

    /// JSON 文字列から読み込む
    pub fn from_json(json: &str) -> std::result::Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json).map_err(|err| ConfigError::Parse {
            path: "<inline>".to_string(),
            message: err.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// 値の妥当性を検証
    pub fn validate(&self) -> std::result::Result<(), ConfigError> {
        if self.initial_capacity == 0 {
            return Err(ConfigError::InvalidValue {
                key: "initial_capacity".to_string(),
                value: "0".to_string(),
            });
        }

        if self.log_level.parse::<log::LevelFilter>().is_err() {
            return Err(ConfigError::InvalidValue {
                key: "log_level".to_string(),
                value: self.log_level.clone(),
            });
        }

        Ok(())
    }

    /// ログレベルフィルタ
    pub fn level_filter(&self) -> log::LevelFilter {
        self.log_level
            .parse()
            .unwrap_or(log::LevelFilter::Warn)
    }
}
