//! ログ初期化モジュール
//!
//! `tracing` のログを標準エラーに出力する。
//! 進捗表示（標準出力）とは分け、置換の詳細はログ側に流す。
//!
//! - 0 (`-v`なし): info（置換内容）
//! - 1 (`-v`): debug（一致しなかった店舗名も表示）
//! - 2+ (`-vv`): trace
//!
//! `RUST_LOG` が設定されていればそちらを優先する。

use tracing::Level;
use tracing_subscriber::EnvFilter;

/// 詳細度からログレベルを決める
pub fn level_from_verbosity(verbosity: u8) -> Level {
    match verbosity {
        0 => Level::INFO,
        1 => Level::DEBUG,
        _ => Level::TRACE,
    }
}

fn build_env_filter(level: Level) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "warn,shop_fix={level},shop_fix_common={level}",
            level = level.as_str().to_lowercase()
        ))
    })
}

/// グローバルなsubscriberを登録（2回目以降は無視）
pub fn init_logging(verbosity: u8) {
    let filter = build_env_filter(level_from_verbosity(verbosity));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .try_init();
}
