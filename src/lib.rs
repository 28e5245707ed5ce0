//! shop-fix
//!
//! 文書解析パイプラインが抽出した店舗名を標準店舗名に置換するCLIの本体。
//! 照合の中核は `shop-fix-common` にある。

pub mod batch;
pub mod cli;
pub mod config;
pub mod error;
pub mod fixer;
pub mod logging;
pub mod scanner;

use config::RunSettings;
use error::Result;
use shop_fix_common::{ShopNameMatcher, StandardNameSet};

/// 辞書を読み込んで照合器を作る（1回の実行で1度だけ）
pub fn build_matcher(settings: &RunSettings) -> Result<ShopNameMatcher> {
    if !settings.dictionary.is_file() {
        return Err(error::ShopFixError::FileNotFound(
            settings.dictionary.display().to_string(),
        ));
    }

    let dictionary = StandardNameSet::from_csv_path(&settings.dictionary)?;
    tracing::info!(
        count = dictionary.len(),
        lev_threshold = settings.thresholds.lev(),
        jw_threshold = settings.thresholds.jw(),
        "標準店舗名を読み込みました"
    );

    Ok(ShopNameMatcher::new(dictionary, settings.thresholds))
}
