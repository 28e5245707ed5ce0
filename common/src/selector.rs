//! 照合判定モジュール
//!
//! 入力1件に対して辞書全体を1回走査し、採用する標準店舗名を最大1件選ぶ。
//!
//! ## 採用条件
//! 同じ候補について編集距離スコアと音韻スコアの両方が閾値以上であること。
//! 条件を満たす候補のうち編集距離スコアが最大のものを採用し、
//! 同点は辞書の読み込み順で先のものを優先する。

use crate::dictionary::StandardNameSet;
use crate::error::{Error, Result};
use crate::similarity::{score, SimilarityScore};

/// 編集距離スコアの既定閾値
pub const DEFAULT_LEV_THRESHOLD: f64 = 0.85;
/// 音韻スコアの既定閾値
pub const DEFAULT_JW_THRESHOLD: f64 = 0.90;

/// 照合閾値（0.0〜1.0で検証済み）
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Thresholds {
    lev: f64,
    jw: f64,
}

impl Thresholds {
    pub fn new(lev: f64, jw: f64) -> Result<Self> {
        validate_unit("Levenshtein閾値", lev)?;
        validate_unit("Jaro-Winkler閾値", jw)?;
        Ok(Self { lev, jw })
    }

    pub fn lev(&self) -> f64 {
        self.lev
    }

    pub fn jw(&self) -> f64 {
        self.jw
    }
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            lev: DEFAULT_LEV_THRESHOLD,
            jw: DEFAULT_JW_THRESHOLD,
        }
    }
}

fn validate_unit(name: &str, value: f64) -> Result<()> {
    // NaNもここで弾かれる
    if !(0.0..=1.0).contains(&value) {
        return Err(Error::Config(format!(
            "{}は0.0〜1.0で指定してください: {}",
            name, value
        )));
    }
    Ok(())
}

/// 照合結果
#[derive(Debug, Clone, PartialEq)]
pub enum MatchDecision {
    Matched {
        candidate: String,
        score: SimilarityScore,
    },
    Unmatched {
        best_edit_score: f64,
        best_phonetic_score: f64,
        /// 編集距離スコアが最大だった候補（診断用）
        closest: Option<String>,
    },
}

impl MatchDecision {
    pub fn is_matched(&self) -> bool {
        matches!(self, MatchDecision::Matched { .. })
    }

    pub fn matched_value(&self) -> Option<&str> {
        match self {
            MatchDecision::Matched { candidate, .. } => Some(candidate),
            MatchDecision::Unmatched { .. } => None,
        }
    }

    /// レポート用のスコア（一致時は採用候補、不一致時は各指標の最大値）
    pub fn scores(&self) -> SimilarityScore {
        match self {
            MatchDecision::Matched { score, .. } => *score,
            MatchDecision::Unmatched {
                best_edit_score,
                best_phonetic_score,
                ..
            } => SimilarityScore {
                edit_score: *best_edit_score,
                phonetic_score: *best_phonetic_score,
            },
        }
    }
}

/// 辞書から最良の候補を選ぶ
pub fn select(input: &str, dictionary: &StandardNameSet, thresholds: &Thresholds) -> MatchDecision {
    // 完全一致は両スコア1.0で、重複除去済みなので他に同点はない
    if dictionary.contains(input) {
        return MatchDecision::Matched {
            candidate: input.to_string(),
            score: SimilarityScore {
                edit_score: 1.0,
                phonetic_score: 1.0,
            },
        };
    }

    let mut best_edit = 0.0_f64;
    let mut best_phonetic = 0.0_f64;
    let mut closest: Option<&str> = None;
    let mut accepted: Option<(&str, SimilarityScore)> = None;

    for candidate in dictionary.iter() {
        let s = score(input, candidate);

        if closest.is_none() || s.edit_score > best_edit {
            best_edit = s.edit_score;
            closest = Some(candidate);
        }
        best_phonetic = best_phonetic.max(s.phonetic_score);

        if !s.passes(thresholds.lev(), thresholds.jw()) {
            continue;
        }

        // 厳密に大きい場合のみ更新するので同点は先着が残る
        let better = match &accepted {
            Some((_, current)) => s.edit_score > current.edit_score,
            None => true,
        };
        if better {
            accepted = Some((candidate, s));
        }
    }

    match accepted {
        Some((candidate, score)) => MatchDecision::Matched {
            candidate: candidate.to_string(),
            score,
        },
        None => MatchDecision::Unmatched {
            best_edit_score: best_edit,
            best_phonetic_score: best_phonetic,
            closest: closest.map(str::to_string),
        },
    }
}

/// ランキングの1件
#[derive(Debug, Clone, PartialEq)]
pub struct RankedCandidate {
    pub candidate: String,
    pub position: usize,
    pub score: SimilarityScore,
}

/// 辞書と閾値をまとめた照合器
///
/// 不変なのでバッチ処理ではスレッド間で参照共有する。
#[derive(Debug, Clone)]
pub struct ShopNameMatcher {
    dictionary: StandardNameSet,
    thresholds: Thresholds,
}

impl ShopNameMatcher {
    pub fn new(dictionary: StandardNameSet, thresholds: Thresholds) -> Self {
        Self {
            dictionary,
            thresholds,
        }
    }

    pub fn dictionary(&self) -> &StandardNameSet {
        &self.dictionary
    }

    pub fn thresholds(&self) -> &Thresholds {
        &self.thresholds
    }

    /// 前後の空白を除いた入力で照合する
    pub fn find_best_match(&self, input: &str) -> MatchDecision {
        select(input.trim(), &self.dictionary, &self.thresholds)
    }

    /// 編集距離スコア順に上位候補を返す（閾値調整用）
    pub fn rank(&self, input: &str, limit: usize) -> Vec<RankedCandidate> {
        let input = input.trim();
        let mut ranked: Vec<RankedCandidate> = self
            .dictionary
            .iter()
            .enumerate()
            .map(|(position, candidate)| RankedCandidate {
                candidate: candidate.to_string(),
                position,
                score: score(input, candidate),
            })
            .collect();

        ranked.sort_by(|a, b| {
            b.score
                .edit_score
                .total_cmp(&a.score.edit_score)
                .then(b.score.phonetic_score.total_cmp(&a.score.phonetic_score))
                .then(a.position.cmp(&b.position))
        });
        ranked.truncate(limit);
        ranked
    }
}
