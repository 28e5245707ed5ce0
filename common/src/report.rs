//! 置換レポートモジュール
//!
//! 照合を試みたフィールドごとに1件の記録を走査順に積み上げ、
//! 最後に集計値と合わせてレポートにまとめる。閾値の見直しに使えるよう、
//! 不一致の記録にも最良スコアを残す。

use crate::error::Result;
use crate::selector::{MatchDecision, Thresholds};
use serde::{Deserialize, Serialize};
use std::io::Write;

/// 記録の状態
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryStatus {
    Matched,
    Unmatched,
    Skipped,
}

impl std::fmt::Display for EntryStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EntryStatus::Matched => write!(f, "matched"),
            EntryStatus::Unmatched => write!(f, "unmatched"),
            EntryStatus::Skipped => write!(f, "skipped"),
        }
    }
}

/// フィールド1件分の記録
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportEntry {
    pub field_path: String,
    pub original_value: String,
    pub matched_value: Option<String>,
    pub edit_score: f64,
    pub phonetic_score: f64,
    pub status: EntryStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl ReportEntry {
    /// 照合結果から記録を作る
    pub fn from_decision(field_path: String, original_value: String, decision: &MatchDecision) -> Self {
        let scores = decision.scores();
        let status = if decision.is_matched() {
            EntryStatus::Matched
        } else {
            EntryStatus::Unmatched
        };

        Self {
            field_path,
            original_value,
            matched_value: decision.matched_value().map(str::to_string),
            edit_score: scores.edit_score,
            phonetic_score: scores.phonetic_score,
            status,
            reason: None,
        }
    }

    /// 照合できなかったフィールドの記録
    pub fn skipped(field_path: String, original_value: String, reason: String) -> Self {
        Self {
            field_path,
            original_value,
            matched_value: None,
            edit_score: 0.0,
            phonetic_score: 0.0,
            status: EntryStatus::Skipped,
            reason: Some(reason),
        }
    }

    /// 値が実際に書き換わったか
    pub fn is_replacement(&self) -> bool {
        self.matched_value
            .as_deref()
            .is_some_and(|v| v != self.original_value)
    }
}

/// 集計値
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportSummary {
    pub total_fields: usize,
    pub matched_count: usize,
    pub unmatched_count: usize,
    pub skipped_count: usize,
    /// 一致のうち値が変わった件数
    pub replaced_count: usize,
    pub lev_threshold: f64,
    pub jw_threshold: f64,
    pub field_pattern: String,
}

/// 1ファイル分のレポート
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Report {
    pub summary: ReportSummary,
    pub entries: Vec<ReportEntry>,
}

impl Report {
    /// 整形済みJSONで書き出す（非ASCIIはそのまま）
    pub fn write_json<W: Write>(&self, writer: W) -> Result<()> {
        serde_json::to_writer_pretty(writer, self)?;
        Ok(())
    }

    /// CSVで書き出す（1行1記録、ヘッダー付き）
    pub fn write_csv<W: Write>(&self, writer: W) -> Result<()> {
        let mut writer = csv::Writer::from_writer(writer);
        writer.write_record([
            "fieldPath",
            "originalValue",
            "matchedValue",
            "editScore",
            "phoneticScore",
            "status",
            "reason",
        ])?;

        for entry in &self.entries {
            let edit_score = format!("{:.4}", entry.edit_score);
            let phonetic_score = format!("{:.4}", entry.phonetic_score);
            let status = entry.status.to_string();
            writer.write_record([
                entry.field_path.as_str(),
                entry.original_value.as_str(),
                entry.matched_value.as_deref().unwrap_or(""),
                edit_score.as_str(),
                phonetic_score.as_str(),
                status.as_str(),
                entry.reason.as_deref().unwrap_or(""),
            ])?;
        }

        writer.flush()?;
        Ok(())
    }
}

/// 走査順に記録を積み上げる
#[derive(Debug, Clone)]
pub struct ReportBuilder {
    thresholds: Thresholds,
    field_pattern: String,
    entries: Vec<ReportEntry>,
}

impl ReportBuilder {
    pub fn new(thresholds: Thresholds, field_pattern: impl Into<String>) -> Self {
        Self {
            thresholds,
            field_pattern: field_pattern.into(),
            entries: Vec::new(),
        }
    }

    pub fn push(&mut self, entry: ReportEntry) {
        self.entries.push(entry);
    }

    pub fn finish(self) -> Report {
        let count = |status: EntryStatus| self.entries.iter().filter(|e| e.status == status).count();

        let summary = ReportSummary {
            total_fields: self.entries.len(),
            matched_count: count(EntryStatus::Matched),
            unmatched_count: count(EntryStatus::Unmatched),
            skipped_count: count(EntryStatus::Skipped),
            replaced_count: self.entries.iter().filter(|e| e.is_replacement()).count(),
            lev_threshold: self.thresholds.lev(),
            jw_threshold: self.thresholds.jw(),
            field_pattern: self.field_pattern,
        };

        Report {
            summary,
            entries: self.entries,
        }
    }
}
