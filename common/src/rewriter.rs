//! 文書書き換えモジュール
//!
//! 解析結果のJSONを深さ優先で走査し、パターンに一致するフィールドの店舗名を
//! 標準店舗名に置き換える。一致しない部分（兄弟要素・数値・他の文字列）には触れない。
//!
//! ## 対象フィールドの扱い
//! - 空でない文字列: 照合し、一致すれば置換
//! - 空文字列: スキップとして記録
//! - 文字列以外: `MalformedDocument` をスキップとして記録し、走査は継続

use crate::error::Error;
use crate::path::{FieldPath, FieldPattern, PathSegment};
use crate::report::{Report, ReportBuilder, ReportEntry};
use crate::selector::{MatchDecision, ShopNameMatcher};
use serde_json::Value;

/// 解析結果の文書ツリー
pub type DocumentNode = Value;

/// 文書を書き換え、書き換え後の文書とレポートを返す
pub fn rewrite(
    mut document: DocumentNode,
    pattern: &FieldPattern,
    matcher: &ShopNameMatcher,
) -> (DocumentNode, Report) {
    let report = rewrite_in_place(&mut document, pattern, matcher);
    (document, report)
}

/// 文書をその場で書き換える
pub fn rewrite_in_place(
    document: &mut DocumentNode,
    pattern: &FieldPattern,
    matcher: &ShopNameMatcher,
) -> Report {
    let mut walker = Walker {
        pattern,
        matcher,
        report: ReportBuilder::new(*matcher.thresholds(), pattern.as_str()),
    };
    let mut path = FieldPath::root();
    walker.visit(document, &mut path);
    walker.report.finish()
}

struct Walker<'a> {
    pattern: &'a FieldPattern,
    matcher: &'a ShopNameMatcher,
    report: ReportBuilder,
}

impl Walker<'_> {
    fn visit(&mut self, node: &mut Value, path: &mut FieldPath) {
        if self.pattern.matches(path) {
            match node {
                Value::String(value) => {
                    self.fix_string(value, path);
                    return;
                }
                Value::Object(_) | Value::Array(_) if self.pattern.targets_leaves_only() => {}
                _ if self.pattern.targets_leaves_only() => return,
                other => {
                    self.skip_malformed(other, path);
                    return;
                }
            }
        }

        match node {
            Value::Object(map) => {
                for (key, child) in map.iter_mut() {
                    path.push(PathSegment::Key(key.clone()));
                    self.visit(child, path);
                    path.pop();
                }
            }
            Value::Array(items) => {
                for (index, child) in items.iter_mut().enumerate() {
                    path.push(PathSegment::Index(index));
                    self.visit(child, path);
                    path.pop();
                }
            }
            Value::Null | Value::Bool(_) | Value::Number(_) | Value::String(_) => {}
        }
    }

    fn fix_string(&mut self, value: &mut String, path: &FieldPath) {
        let field_path = path.to_string();

        if value.trim().is_empty() {
            tracing::warn!(path = %field_path, "店舗名が空のためスキップ");
            self.report.push(ReportEntry::skipped(
                field_path,
                value.clone(),
                "空文字列".to_string(),
            ));
            return;
        }

        let decision = self.matcher.find_best_match(value);
        match &decision {
            MatchDecision::Matched { candidate, score } => {
                if candidate.as_str() != value.as_str() {
                    tracing::info!(
                        path = %field_path,
                        edit_score = score.edit_score,
                        phonetic_score = score.phonetic_score,
                        "置換: '{}' -> '{}'",
                        value,
                        candidate
                    );
                }
            }
            MatchDecision::Unmatched {
                best_edit_score,
                best_phonetic_score,
                closest,
            } => {
                tracing::debug!(
                    path = %field_path,
                    best_edit_score,
                    best_phonetic_score,
                    closest = closest.as_deref().unwrap_or(""),
                    "一致なし: '{}'",
                    value
                );
            }
        }

        let entry = ReportEntry::from_decision(field_path, value.clone(), &decision);
        if let Some(candidate) = decision.matched_value() {
            *value = candidate.to_string();
        }
        self.report.push(entry);
    }

    fn skip_malformed(&mut self, node: &Value, path: &FieldPath) {
        let error = Error::MalformedDocument {
            path: path.to_string(),
            found: value_kind(node).to_string(),
        };
        tracing::warn!("{}", error);
        self.report
            .push(ReportEntry::skipped(path.to_string(), node.to_string(), error.to_string()));
    }
}

fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
