//! エラー型

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    /// パレット構築時の `max_key` を超えるキーが要求された
    #[error("キー {key} はパレット範囲外です (max_key = {max_key})")]
    OutOfRange { key: u64, max_key: u64 },

    #[error("run_length は 1 以上である必要があります")]
    InvalidRunLength,

    #[error("パレットが大きすぎます (max_key = {0})")]
    PaletteTooLarge(u64),

    #[error("ファイルが見つかりません: {}", .0.display())]
    FileNotFound(PathBuf),

    #[error("必須カラムがありません: {0}")]
    MissingColumn(String),

    #[error("データセットがありません: {0}")]
    MissingDataset(String),

    #[error("スナップショットの形式が不正です: {0}")]
    Malformed(String),

    #[error("未対応のファイル形式です: {0}")]
    UnsupportedFormat(String),

    #[error("I/O エラー: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV エラー: {0}")]
    Csv(#[from] csv::Error),

    #[error("画像エラー: {0}")]
    Image(#[from] image::ImageError),

    #[cfg(feature = "hdf5")]
    #[error("HDF5 エラー: {0}")]
    Hdf5(#[from] hdf5::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
