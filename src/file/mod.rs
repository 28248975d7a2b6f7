//! ファイル操作モジュール

pub mod io;

pub use io::{expand_path, read_file, write_file, DefaultFileOperations, FileOperations};
