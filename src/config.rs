use crate::error::{Result, ShopFixError};
use serde::{Deserialize, Serialize};
use shop_fix_common::selector::{DEFAULT_JW_THRESHOLD, DEFAULT_LEV_THRESHOLD};
use shop_fix_common::{FieldPattern, Thresholds, DEFAULT_FIELD_PATTERN};
use std::path::{Path, PathBuf};

/// 辞書CSVの既定ファイル名
pub const DEFAULT_DICTIONARY: &str = "standard_shop_name.csv";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub dictionary: Option<PathBuf>,
    pub lev_threshold: f64,
    pub jw_threshold: f64,
    pub field_pattern: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            dictionary: None,
            lev_threshold: DEFAULT_LEV_THRESHOLD,
            jw_threshold: DEFAULT_JW_THRESHOLD,
            field_pattern: DEFAULT_FIELD_PATTERN.into(),
        }
    }
}

/// CLIで上書きされる値
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub dictionary: Option<PathBuf>,
    pub lev_threshold: Option<f64>,
    pub jw_threshold: Option<f64>,
    pub field_pattern: Option<FieldPattern>,
}

/// 検証済みの実行設定
#[derive(Debug, Clone)]
pub struct RunSettings {
    pub dictionary: PathBuf,
    pub thresholds: Thresholds,
    pub pattern: FieldPattern,
}

impl Config {
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    pub fn load_from(config_path: &Path) -> Result<Self> {
        if config_path.exists() {
            let content = std::fs::read_to_string(config_path)?;
            let config: Config = serde_json::from_str(&content)?;
            Ok(config)
        } else {
            Ok(Self::default())
        }
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path()?)
    }

    pub fn save_to(&self, config_path: &Path) -> Result<()> {
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(config_path, content)?;
        Ok(())
    }

    pub fn config_path() -> Result<PathBuf> {
        let home = dirs::home_dir()
            .ok_or_else(|| ShopFixError::Config("ホームディレクトリが見つかりません".into()))?;
        Ok(home.join(".config").join("shop-fix").join("config.json"))
    }

    /// CLI指定を優先して検証する（ファイル処理前に失敗させる）
    pub fn resolve(&self, overrides: &Overrides) -> Result<RunSettings> {
        let dictionary = overrides
            .dictionary
            .clone()
            .or_else(|| self.dictionary.clone())
            .unwrap_or_else(|| PathBuf::from(DEFAULT_DICTIONARY));

        let thresholds = Thresholds::new(
            overrides.lev_threshold.unwrap_or(self.lev_threshold),
            overrides.jw_threshold.unwrap_or(self.jw_threshold),
        )?;

        let pattern = match &overrides.field_pattern {
            Some(pattern) => pattern.clone(),
            None => self.field_pattern.parse()?,
        };

        Ok(RunSettings {
            dictionary,
            thresholds,
            pattern,
        })
    }
}
