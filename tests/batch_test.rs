//! 一括処理テスト
//!
//! フォルダ単位の処理と、1ファイルの失敗が他に影響しないことを検証

use shop_fix::batch::{self, BatchReport};
use shop_fix::config::{Config, Overrides};
use shop_fix::error::ShopFixError;
use shop_fix::{build_matcher, fixer};
use shop_fix_common::{FieldPattern, ShopNameMatcher};
use std::path::Path;
use tempfile::tempdir;

fn write_dictionary(dir: &Path) -> std::path::PathBuf {
    let path = dir.join("standard_shop_name.csv");
    std::fs::write(&path, "星巴克咖啡\n星巴克咖啡臻选店\n麦当劳\n").unwrap();
    path
}

fn matcher(dir: &Path) -> (ShopNameMatcher, FieldPattern) {
    let overrides = Overrides {
        dictionary: Some(write_dictionary(dir)),
        ..Default::default()
    };
    let settings = Config::default().resolve(&overrides).unwrap();
    (build_matcher(&settings).unwrap(), settings.pattern)
}

fn receipt(shop_name: &str) -> String {
    serde_json::json!({
        "result": {
            "contents": [
                { "fields": { "ShopName": { "type": "string", "valueString": shop_name } } }
            ]
        }
    })
    .to_string()
}

/// 3ファイル中1ファイルが壊れていても残り2ファイルは処理される
#[test]
fn test_batch_malformed_file_does_not_stop_siblings() {
    let work = tempdir().unwrap();
    let input = work.path().join("input");
    let output = work.path().join("output");
    std::fs::create_dir_all(&input).unwrap();

    std::fs::write(input.join("a.json"), receipt("星巴克珈啡臻选店")).unwrap();
    std::fs::write(input.join("b.json"), "{ \"result\": [").unwrap();
    std::fs::write(input.join("c.json"), receipt("麦当劳")).unwrap();

    let (matcher, pattern) = matcher(work.path());
    let report = batch::process_folder(&input, &output, &pattern, &matcher, false).unwrap();

    let summary = &report.batch_summary;
    assert_eq!(summary.total_files_processed, 3);
    assert_eq!(summary.succeeded_files, 2);
    assert_eq!(summary.failed_files, 1);
    assert_eq!(summary.total_replacements_across_all_files, 1);
    assert_eq!(report.failures[0].input_file, "b.json");

    let inputs: Vec<&str> = report
        .individual_reports
        .iter()
        .map(|r| r.file_info.input_file.as_str())
        .collect();
    assert_eq!(inputs, vec!["a.json", "c.json"]);

    assert!(output.join("a_matched.json").exists());
    assert!(output.join("a_report.json").exists());
    assert!(output.join("c_matched.json").exists());
    assert!(!output.join("b_matched.json").exists());

    let fixed = fixer::load_document(&output.join("a_matched.json")).unwrap();
    assert_eq!(
        fixed["result"]["contents"][0]["fields"]["ShopName"]["valueString"],
        "星巴克咖啡臻选店"
    );

    // 集計レポートが保存されている
    let saved: BatchReport = serde_json::from_str(
        &std::fs::read_to_string(output.join(batch::SUMMARY_FILE_NAME)).unwrap(),
    )
    .unwrap();
    assert_eq!(saved.batch_summary.failed_files, 1);
    assert_eq!(saved.individual_reports.len(), 2);
}

/// 各ファイルのレポートにスコアが残る
#[test]
fn test_batch_per_file_report_contents() {
    let work = tempdir().unwrap();
    let input = work.path().join("input");
    let output = work.path().join("output");
    std::fs::create_dir_all(&input).unwrap();
    std::fs::write(input.join("receipt.json"), receipt("星巴克咖啡(分店)")).unwrap();

    let (matcher, pattern) = matcher(work.path());
    batch::process_folder(&input, &output, &pattern, &matcher, false).unwrap();

    let report: serde_json::Value = serde_json::from_str(
        &std::fs::read_to_string(output.join("receipt_report.json")).unwrap(),
    )
    .unwrap();
    assert_eq!(report["summary"]["totalFields"], 1);
    assert_eq!(report["summary"]["unmatchedCount"], 1);
    let entry = &report["entries"][0];
    assert_eq!(entry["originalValue"], "星巴克咖啡(分店)");
    assert!(entry["matchedValue"].is_null());
    assert!(entry["editScore"].as_f64().unwrap() < 0.85);
    assert_eq!(
        entry["fieldPath"],
        "result.contents[0].fields.ShopName.valueString"
    );
}

/// JSONがないフォルダはエラー
#[test]
fn test_batch_no_input_files() {
    let work = tempdir().unwrap();
    let input = work.path().join("empty");
    std::fs::create_dir_all(&input).unwrap();

    let (matcher, pattern) = matcher(work.path());
    let result = batch::process_folder(&input, &work.path().join("out"), &pattern, &matcher, false);
    assert!(matches!(result, Err(ShopFixError::NoInputFiles(_))));
}

/// 書き換え済みの出力を再処理しても置換は発生しない
#[test]
fn test_batch_rerun_is_idempotent() {
    let work = tempdir().unwrap();
    let input = work.path().join("input");
    let first = work.path().join("first");
    let second = work.path().join("second");
    std::fs::create_dir_all(&input).unwrap();
    std::fs::write(input.join("a.json"), receipt("星巴克珈啡臻选店")).unwrap();

    let (matcher, pattern) = matcher(work.path());
    batch::process_folder(&input, &first, &pattern, &matcher, false).unwrap();

    // 1回目の出力だけを入力にする
    let rerun_input = work.path().join("rerun");
    std::fs::create_dir_all(&rerun_input).unwrap();
    std::fs::copy(first.join("a_matched.json"), rerun_input.join("a.json")).unwrap();

    let report = batch::process_folder(&rerun_input, &second, &pattern, &matcher, false).unwrap();
    assert_eq!(report.batch_summary.total_replacements_across_all_files, 0);
    let summary = &report.individual_reports[0].summary;
    assert_eq!(summary.matched_count, summary.total_fields);
}

/// 出力名が重なるファイルは上書きせず失敗として記録する
#[test]
fn test_batch_same_stem_does_not_overwrite() {
    let work = tempdir().unwrap();
    let input = work.path().join("input");
    let output = work.path().join("output");
    std::fs::create_dir_all(&input).unwrap();

    std::fs::write(input.join("a.JSON"), receipt("麦当劳")).unwrap();
    std::fs::write(input.join("a.json"), receipt("星巴克珈啡臻选店")).unwrap();

    let (matcher, pattern) = matcher(work.path());
    let report = batch::process_folder(&input, &output, &pattern, &matcher, false).unwrap();

    let summary = &report.batch_summary;
    assert_eq!(summary.total_files_processed, 2);
    assert_eq!(summary.succeeded_files, 1);
    assert_eq!(summary.failed_files, 1);

    // ファイル名順で先の a.JSON が出力名を使う
    assert_eq!(report.individual_reports[0].file_info.input_file, "a.JSON");
    assert_eq!(report.individual_reports[0].file_info.output_file, "a_matched.json");
    assert_eq!(report.failures[0].input_file, "a.json");
    assert!(report.failures[0].error.contains("a.JSON"));

    let fixed = fixer::load_document(&output.join("a_matched.json")).unwrap();
    assert_eq!(
        fixed["result"]["contents"][0]["fields"]["ShopName"]["valueString"],
        "麦当劳"
    );
}

/// 入力と出力が同じフォルダでも前回の出力は再処理しない
#[test]
fn test_batch_in_place_rerun_skips_outputs() {
    let work = tempdir().unwrap();
    let folder = work.path().join("receipts");
    std::fs::create_dir_all(&folder).unwrap();
    std::fs::write(folder.join("a.json"), receipt("星巴克珈啡臻选店")).unwrap();

    let (matcher, pattern) = matcher(work.path());
    batch::process_folder(&folder, &folder, &pattern, &matcher, false).unwrap();
    let report = batch::process_folder(&folder, &folder, &pattern, &matcher, false).unwrap();

    assert_eq!(report.batch_summary.total_files_processed, 1);
    assert_eq!(report.batch_summary.failed_files, 0);
    assert!(!folder.join("a_matched_matched.json").exists());
    assert!(!folder.join("a_report_matched.json").exists());
}
