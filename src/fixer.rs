//! 単一ファイル処理モジュール
//!
//! JSONを読み込み、店舗名を置換して書き出し、必要ならレポートを保存する。
//! 読み書きの失敗はこのファイルだけのエラーとして呼び出し元に返す。

use crate::cli::ReportFormat;
use crate::error::{Result, ShopFixError};
use shop_fix_common::{rewrite, DocumentNode, FieldPattern, Report, ShopNameMatcher};
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

/// JSONファイルを読み込む
pub fn load_document(path: &Path) -> Result<DocumentNode> {
    if !path.is_file() {
        return Err(ShopFixError::FileNotFound(path.display().to_string()));
    }

    let file = File::open(path)?;
    let document = serde_json::from_reader(BufReader::new(file))?;
    Ok(document)
}

/// JSONを整形して書き出す
pub fn save_document(path: &Path, document: &DocumentNode) -> Result<()> {
    create_parent_dir(path)?;
    let mut writer = BufWriter::new(File::create(path)?);
    serde_json::to_writer_pretty(&mut writer, document)?;
    writer.write_all(b"\n")?;
    writer.flush()?;
    Ok(())
}

/// レポートを書き出す
pub fn save_report(path: &Path, report: &Report, format: ReportFormat) -> Result<()> {
    create_parent_dir(path)?;
    let mut writer = BufWriter::new(File::create(path)?);
    match format {
        ReportFormat::Json => report.write_json(&mut writer)?,
        ReportFormat::Csv => report.write_csv(&mut writer)?,
    }
    writer.flush()?;
    Ok(())
}

fn create_parent_dir(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    Ok(())
}

/// 1ファイルを処理してレポートを返す
pub fn process_file(
    input: &Path,
    output: &Path,
    report_path: Option<(&Path, ReportFormat)>,
    pattern: &FieldPattern,
    matcher: &ShopNameMatcher,
) -> Result<Report> {
    let document = load_document(input)?;
    tracing::debug!(file = %input.display(), "JSONを読み込みました");

    let (fixed, report) = rewrite(document, pattern, matcher);

    save_document(output, &fixed)?;
    tracing::debug!(file = %output.display(), "置換後のJSONを保存しました");

    if let Some((path, format)) = report_path {
        save_report(path, &report, format)?;
        tracing::debug!(file = %path.display(), "レポートを保存しました");
    }

    Ok(report)
}
