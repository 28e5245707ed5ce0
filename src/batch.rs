//! 一括処理モジュール
//!
//! フォルダ直下のJSONファイルをファイル単位で並列処理する。
//! 照合器は読み取り専用で全ワーカーが共有し、文書とレポートはワーカーごとに持つ。
//! 1ファイルの失敗は集計レポートに記録し、他のファイルの処理は続ける。

use crate::cli::ReportFormat;
use crate::error::{Result, ShopFixError};
use crate::fixer;
use crate::scanner::{self, InputFile};
use indicatif::{ProgressBar, ProgressStyle};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use shop_fix_common::{FieldPattern, ReportSummary, ShopNameMatcher};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// 集計レポートのファイル名
pub const SUMMARY_FILE_NAME: &str = "batch_summary_report.json";

/// 一括処理全体の集計
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchSummary {
    pub total_files_processed: usize,
    pub succeeded_files: usize,
    pub failed_files: usize,
    pub total_replacements_across_all_files: usize,
    pub levenshtein_threshold: f64,
    pub jaro_winkler_threshold: f64,
    pub field_pattern: String,
    pub generated_at: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileInfo {
    pub input_file: String,
    pub output_file: String,
    pub report_file: String,
}

/// 成功したファイルの集計
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileReport {
    pub file_info: FileInfo,
    pub summary: ReportSummary,
}

/// 失敗したファイル
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileFailure {
    pub input_file: String,
    pub error: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchReport {
    pub batch_summary: BatchSummary,
    pub individual_reports: Vec<FileReport>,
    pub failures: Vec<FileFailure>,
}

/// 一括処理の出力先
pub struct BatchPaths {
    pub output_dir: PathBuf,
}

impl BatchPaths {
    pub fn output_file(&self, file: &InputFile) -> PathBuf {
        self.output_dir.join(format!("{}_matched.json", file.stem))
    }

    pub fn report_file(&self, file: &InputFile) -> PathBuf {
        self.output_dir.join(format!("{}_report.json", file.stem))
    }

    pub fn summary_file(&self) -> PathBuf {
        self.output_dir.join(SUMMARY_FILE_NAME)
    }
}

/// フォルダ内のJSONを一括処理し、集計レポートを保存する
pub fn process_folder(
    input_dir: &Path,
    output_dir: &Path,
    pattern: &FieldPattern,
    matcher: &ShopNameMatcher,
    show_progress: bool,
) -> Result<BatchReport> {
    let mut files = scanner::scan_folder(input_dir)?;
    if is_same_dir(input_dir, output_dir) {
        // 前回の出力を入力として拾わない
        files.retain(|file| {
            let generated = is_generated_output(file);
            if generated {
                tracing::debug!(file = %file.file_name, "出力ファイルのためスキップ");
            }
            !generated
        });
    }
    if files.is_empty() {
        return Err(ShopFixError::NoInputFiles(input_dir.display().to_string()));
    }
    tracing::info!(count = files.len(), "JSONファイルを検出");

    std::fs::create_dir_all(output_dir)?;
    let paths = BatchPaths {
        output_dir: output_dir.to_path_buf(),
    };

    let progress = if show_progress {
        let pb = ProgressBar::new(files.len() as u64);
        if let Ok(style) = ProgressStyle::with_template("{bar:40} {pos}/{len} {msg}") {
            pb.set_style(style);
        }
        pb
    } else {
        ProgressBar::hidden()
    };

    let conflicts = output_conflicts(&files);

    // collectは入力順を保つので結果はファイル名順
    let results: Vec<(&InputFile, Result<ReportSummary>)> = files
        .par_iter()
        .zip(conflicts.par_iter())
        .map(|(file, conflict)| {
            let result = match conflict {
                Some(first) => Err(ShopFixError::DuplicateOutput {
                    file: file.file_name.clone(),
                    first: first.clone(),
                }),
                None => fixer::process_file(
                    &file.path,
                    &paths.output_file(file),
                    Some((&paths.report_file(file), ReportFormat::Json)),
                    pattern,
                    matcher,
                )
                .map(|report| report.summary),
            };
            progress.inc(1);
            (file, result)
        })
        .collect();
    progress.finish_and_clear();

    let mut individual_reports = Vec::new();
    let mut failures = Vec::new();

    for (file, result) in results {
        match result {
            Ok(summary) => {
                tracing::info!(
                    file = %file.file_name,
                    replaced = summary.replaced_count,
                    unmatched = summary.unmatched_count,
                    "処理完了"
                );
                individual_reports.push(FileReport {
                    file_info: FileInfo {
                        input_file: file.file_name.clone(),
                        output_file: file_name_of(&paths.output_file(file)),
                        report_file: file_name_of(&paths.report_file(file)),
                    },
                    summary,
                });
            }
            Err(e) => {
                tracing::error!(file = %file.file_name, "処理失敗: {}", e);
                failures.push(FileFailure {
                    input_file: file.file_name.clone(),
                    error: e.to_string(),
                });
            }
        }
    }

    let thresholds = matcher.thresholds();
    let report = BatchReport {
        batch_summary: BatchSummary {
            total_files_processed: files.len(),
            succeeded_files: individual_reports.len(),
            failed_files: failures.len(),
            total_replacements_across_all_files: individual_reports
                .iter()
                .map(|r| r.summary.replaced_count)
                .sum(),
            levenshtein_threshold: thresholds.lev(),
            jaro_winkler_threshold: thresholds.jw(),
            field_pattern: pattern.to_string(),
            generated_at: chrono::Local::now().format("%Y-%m-%d %H:%M:%S").to_string(),
        },
        individual_reports,
        failures,
    };

    let json = serde_json::to_string_pretty(&report)?;
    std::fs::write(paths.summary_file(), json)?;

    Ok(report)
}

/// 出力名が先行ファイルと重なるファイルに、その先行ファイル名を返す
///
/// `a.json` と `a.JSON` は同じ `a_matched.json` に書き出すことになる。
/// 大文字小文字を区別しないファイルシステムもあるので小文字で比較する。
fn output_conflicts(files: &[InputFile]) -> Vec<Option<String>> {
    let mut claimed: HashMap<String, &str> = HashMap::new();
    files
        .iter()
        .map(|file| {
            let stem = file.stem.to_lowercase();
            match claimed.get(&stem) {
                Some(first) => Some(first.to_string()),
                None => {
                    claimed.insert(stem, &file.file_name);
                    None
                }
            }
        })
        .collect()
}

fn is_same_dir(a: &Path, b: &Path) -> bool {
    match (std::fs::canonicalize(a), std::fs::canonicalize(b)) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}

/// このモジュールが書き出したファイルか
fn is_generated_output(file: &InputFile) -> bool {
    file.file_name == SUMMARY_FILE_NAME
        || file.stem.ends_with("_matched")
        || file.stem.ends_with("_report")
}

fn file_name_of(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default()
}
