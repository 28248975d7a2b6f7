//! ファイルI/O操作
//!
//! UTF-8テキストファイルの読み込みと保存。エディタコアは生のテキストのみを扱い、
//! 永続化はこのモジュールが担う。

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{file::Result, FileError};

const UTF8_BOM: char = '\u{feff}';

/// ファイル操作のトレイト
pub trait FileOperations {
    /// ファイルからテキストを読み込み
    fn read_file(&self, path: &Path) -> Result<String>;

    /// テキストをファイルに書き込み
    fn write_file(&self, path: &Path, content: &str) -> Result<()>;
}

/// ファイル操作の実装
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultFileOperations;

impl FileOperations for DefaultFileOperations {
    fn read_file(&self, path: &Path) -> Result<String> {
        // ファイル存在チェック
        if !path.exists() {
            return Err(FileError::NotFound {
                path: path.display().to_string(),
            });
        }

        // ディレクトリではないことを確認
        if path.is_dir() {
            return Err(FileError::InvalidPath {
                path: path.display().to_string(),
            });
        }

        let bytes = fs::read(path)?;
        let content = String::from_utf8(bytes)?;

        if content.chars().any(|ch| ch.is_control() && !matches!(ch, '\t' | '\n' | '\r')) {
            log::warn!("control characters found in {}", path.display());
        }

        let without_bom = content.strip_prefix(UTF8_BOM).unwrap_or(&content);
        Ok(normalize_to_lf(without_bom))
    }

    fn write_file(&self, path: &Path, content: &str) -> Result<()> {
        // 親ディレクトリが存在しない場合は作成
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent)?;
            }
        }

        // 一時ファイルに書き込んでからアトミックに移動
        let temp_path = temp_path_for(path);
        fs::write(&temp_path, content)?;
        fs::rename(&temp_path, path)?;

        log::debug!("wrote {} bytes to {}", content.len(), path.display());
        Ok(())
    }
}

/// `~` や環境変数を展開したパス
pub fn expand_path(path: &str) -> Result<PathBuf> {
    shellexpand::full(path)
        .map(|expanded| PathBuf::from(expanded.as_ref()))
        .map_err(|err| FileError::InvalidPath {
            path: format!("{path}: {err}"),
        })
}

/// ファイル読み込みの便利関数
pub fn read_file<P: AsRef<Path>>(path: P) -> Result<String> {
    DefaultFileOperations.read_file(path.as_ref())
}

/// ファイル書き込みの便利関数
pub fn write_file<P: AsRef<Path>>(path: P, content: &str) -> Result<()> {
    DefaultFileOperations.write_file(path.as_ref(), content)
}

/// 改行コードをLFに統一
fn normalize_to_lf(content: &str) -> String {
    content.replace("\r\n", "\n").replace('\r', "\n")
}

fn temp_path_for(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|name| name.to_os_string())
        .unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}
