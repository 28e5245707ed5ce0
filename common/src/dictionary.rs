//! 標準店舗名辞書モジュール
//!
//! 標準店舗名の一覧を読み込み、照合用の不変セットを構築する。
//! 読み込み順は同点時の優先順位として使われるため保持する。

use crate::error::{Error, Result};
use std::collections::HashSet;
use std::io::Read;
use std::path::Path;

/// 標準店舗名セット（重複なし・読み込み順を保持）
#[derive(Debug, Clone)]
pub struct StandardNameSet {
    names: Vec<String>,
    index: HashSet<String>,
}

impl StandardNameSet {
    /// 行の並びから構築する
    ///
    /// 前後の空白を除去し、空行を捨て、最初の出現を残して重複を除く。
    /// 結果が空なら `Error::Config`。
    pub fn from_lines<I, S>(lines: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut names = Vec::new();
        let mut index = HashSet::new();

        for line in lines {
            let name = line.as_ref().trim_start_matches('\u{feff}').trim();
            if name.is_empty() {
                continue;
            }
            if index.insert(name.to_string()) {
                names.push(name.to_string());
            }
        }

        if names.is_empty() {
            return Err(Error::Config("標準店舗名が1件もありません".into()));
        }

        Ok(Self { names, index })
    }

    /// CSVから読み込み（各行の1列目のみ使用、ヘッダーなし）
    pub fn from_csv_reader<R: Read>(reader: R) -> Result<Self> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_reader(reader);

        let mut lines = Vec::new();
        for record in reader.records() {
            let record = record?;
            if let Some(first) = record.get(0) {
                lines.push(first.to_string());
            }
        }

        Self::from_lines(lines)
    }

    /// CSVファイルから読み込み
    pub fn from_csv_path(path: &Path) -> Result<Self> {
        let file = std::fs::File::open(path)?;
        Self::from_csv_reader(std::io::BufReader::new(file))
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// 構築に成功したセットは常に1件以上
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(|s| s.as_str())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains(name)
    }

}
