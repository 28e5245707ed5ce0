use thiserror::Error;

#[derive(Error, Debug)]
pub enum ShopFixError {
    #[error("設定エラー: {0}")]
    Config(String),

    #[error("ファイルが見つかりません: {0}")]
    FileNotFound(String),

    #[error("フォルダが見つかりません: {0}")]
    FolderNotFound(String),

    #[error("JSONファイルが見つかりません: {0}")]
    NoInputFiles(String),

    #[error("出力ファイル名が {first} と重複するためスキップ: {file}")]
    DuplicateOutput { file: String, first: String },

    #[error("JSON解析エラー: {0}")]
    JsonParse(#[from] serde_json::Error),

    #[error("IOエラー: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Common(#[from] shop_fix_common::Error),
}

pub type Result<T> = std::result::Result<T, ShopFixError>;
