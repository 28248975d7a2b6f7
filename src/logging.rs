//! ロギングシステム
//!
//! `log` ファサードのバックエンド。stderr への出力と、任意でファイルへの追記を行う。

use std::fs::OpenOptions;
use std::io::Write;
use std::path::PathBuf;

use log::{LevelFilter, Log, Metadata, Record, SetLoggerError};

/// ロガー
#[derive(Debug, Clone)]
pub struct Logger {
    level: LevelFilter,
    output_stderr: bool,
    output_file: Option<PathBuf>,
}

impl Logger {
    /// デフォルト構築
    pub fn new(level: LevelFilter) -> Self {
        Self {
            level,
            output_stderr: true,
            output_file: None,
        }
    }

    /// 開発者向けロガー
    pub fn for_development() -> Self {
        Self::new(LevelFilter::Debug)
    }

    /// ログレベルを取得
    pub fn level(&self) -> LevelFilter {
        self.level
    }

    /// ログレベルを変更
    pub fn with_level(mut self, level: LevelFilter) -> Self {
        self.level = level;
        self
    }

    /// ファイル出力を設定
    pub fn with_file_output<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.output_file = Some(path.into());
        self
    }

    /// 標準エラー出力を無効化
    pub fn without_stderr(mut self) -> Self {
        self.output_stderr = false;
        self
    }

    /// グローバルロガーとして登録
    pub fn install(self) -> Result<(), SetLoggerError> {
        let level = self.level;
        log::set_boxed_logger(Box::new(self))?;
        log::set_max_level(level);
        Ok(())
    }

    fn format_record(record: &Record) -> String {
        format!("{}: {} in {}", record.level(), record.args(), record.target())
    }

    fn write_line(&self, message: &str) {
        if self.output_stderr {
            eprintln!("{}", message);
        }

        if let Some(path) = &self.output_file {
            if let Ok(mut file) = OpenOptions::new().create(true).append(true).open(path) {
                let _ = writeln!(file, "{}", message);
            }
        }
    }
}

impl Log for Logger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            self.write_line(&Self::format_record(record));
        }
    }

    fn flush(&self) {}
}

/// 設定に従ってロガーを初期化する
///
/// 既にロガーが登録済みの場合は何もしない。
pub fn init(level: LevelFilter, file: Option<PathBuf>) {
    let mut logger = Logger::new(level);
    if let Some(path) = file {
        logger = logger.with_file_output(path);
    }
    if logger.install().is_err() {
        log::debug!("logger already installed");
    }
}
