use crate::config::Overrides;
use clap::{Parser, Subcommand};
use shop_fix_common::FieldPattern;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "shop-fix")]
#[command(about = "OCR店舗名を標準店舗名に照合・置換するツール", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// 詳細ログを出力（-vv でさらに詳細）
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// 標準店舗名CSVファイル
    #[arg(short = 'c', long = "csv", global = true)]
    pub dictionary: Option<PathBuf>,

    /// Levenshtein類似度の閾値（0.0-1.0、デフォルト0.85）
    #[arg(long, global = true)]
    pub lev_threshold: Option<f64>,

    /// Jaro-Winkler類似度の閾値（0.0-1.0、デフォルト0.90）
    #[arg(long, global = true)]
    pub jw_threshold: Option<f64>,

    /// 店舗名フィールドのパスパターン（例: **.ShopName.valueString）
    #[arg(short = 'p', long, global = true)]
    pub field_pattern: Option<FieldPattern>,
}

impl Cli {
    pub fn overrides(&self) -> Overrides {
        Overrides {
            dictionary: self.dictionary.clone(),
            lev_threshold: self.lev_threshold,
            jw_threshold: self.jw_threshold,
            field_pattern: self.field_pattern.clone(),
        }
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// JSONファイル1件の店舗名を置換
    Fix {
        /// 入力JSONファイル
        #[arg(required = true)]
        input: PathBuf,

        /// 出力JSONファイル
        #[arg(short, long)]
        output: PathBuf,

        /// 置換レポートファイル
        #[arg(short, long)]
        report: Option<PathBuf>,

        /// レポート形式 (json/csv)
        #[arg(long, default_value = "json")]
        report_format: ReportFormat,
    },

    /// フォルダ内のJSONファイルを一括処理
    Batch {
        /// 入力フォルダ
        #[arg(required = true)]
        input_dir: PathBuf,

        /// 出力フォルダ
        #[arg(short, long)]
        output_dir: PathBuf,
    },

    /// 店舗名1件の類似度を表示（閾値調整用）
    Score {
        /// 照合する店舗名
        #[arg(required = true)]
        name: String,

        /// 表示する候補数
        #[arg(short = 'n', long, default_value = "5")]
        top: usize,
    },

    /// 設定を表示/編集
    Config {
        /// 設定を表示
        #[arg(long)]
        show: bool,

        /// Levenshtein閾値を保存
        #[arg(long)]
        set_lev_threshold: Option<f64>,

        /// Jaro-Winkler閾値を保存
        #[arg(long)]
        set_jw_threshold: Option<f64>,

        /// フィールドパターンを保存
        #[arg(long)]
        set_field_pattern: Option<FieldPattern>,

        /// 標準店舗名CSVのパスを保存
        #[arg(long)]
        set_dictionary: Option<PathBuf>,
    },
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ReportFormat {
    #[default]
    Json,
    Csv,
}

impl std::str::FromStr for ReportFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "json" => Ok(ReportFormat::Json),
            "csv" => Ok(ReportFormat::Csv),
            _ => Err(format!("Unknown report format: {}. Use json or csv", s)),
        }
    }
}

impl std::fmt::Display for ReportFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ReportFormat::Json => write!(f, "json"),
            ReportFormat::Csv => write!(f, "csv"),
        }
    }
}
