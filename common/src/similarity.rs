//! 類似度計算モジュール
//!
//! OCRで読み取った店舗名と標準店舗名の類似度を2種類の指標で計算する。
//!
//! - 編集距離スコア: レーベンシュタイン距離を最大長で正規化
//! - 音韻スコア: Jaro-Winkler（先頭一致を重視）
//!
//! どちらも文字（Unicodeスカラー値）単位で比較し、状態もキャッシュも持たない。

use serde::{Deserialize, Serialize};

/// Winklerの先頭一致重み
const PREFIX_SCALE: f64 = 0.1;
/// 先頭一致として数える最大文字数
const MAX_PREFIX_LEN: usize = 4;
/// これ以下のJaro値には先頭一致ボーナスを付けない
const BOOST_THRESHOLD: f64 = 0.7;

/// 1組の文字列に対する類似度
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SimilarityScore {
    pub edit_score: f64,
    pub phonetic_score: f64,
}

impl SimilarityScore {
    /// 両方の指標が閾値以上か
    pub fn passes(&self, lev_threshold: f64, jw_threshold: f64) -> bool {
        self.edit_score >= lev_threshold && self.phonetic_score >= jw_threshold
    }
}

/// 入力と候補の類似度を計算する
pub fn score(input: &str, candidate: &str) -> SimilarityScore {
    let a: Vec<char> = input.chars().collect();
    let b: Vec<char> = candidate.chars().collect();

    SimilarityScore {
        edit_score: edit_similarity_chars(&a, &b),
        phonetic_score: jaro_winkler_chars(&a, &b),
    }
}

/// 類似度を計算（編集距離ベース）
pub fn edit_similarity(a: &str, b: &str) -> f64 {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    edit_similarity_chars(&a, &b)
}

fn edit_similarity_chars(a: &[char], b: &[char]) -> f64 {
    let max_len = a.len().max(b.len()).max(1);
    1.0 - (levenshtein_chars(a, b) as f64 / max_len as f64)
}

/// レーベンシュタイン距離を計算
pub fn levenshtein_distance(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    levenshtein_chars(&a, &b)
}

fn levenshtein_chars(a: &[char], b: &[char]) -> usize {
    // 短い方を内側のループにする
    let (a, b) = if a.len() > b.len() { (b, a) } else { (a, b) };

    if a.is_empty() {
        return b.len();
    }

    let mut prev: Vec<usize> = (0..=a.len()).collect();
    let mut curr = vec![0; a.len() + 1];

    for (j, cb) in b.iter().enumerate() {
        curr[0] = j + 1;
        for (i, ca) in a.iter().enumerate() {
            let cost = if ca == cb { 0 } else { 1 };
            curr[i + 1] = (prev[i + 1] + 1)
                .min(curr[i] + 1)
                .min(prev[i] + cost);
        }
        std::mem::swap(&mut prev, &mut curr);
    }

    prev[a.len()]
}

/// Jaro類似度を計算
pub fn jaro_similarity(a: &str, b: &str) -> f64 {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    jaro_chars(&a, &b)
}

fn jaro_chars(a: &[char], b: &[char]) -> f64 {
    if a.is_empty() && b.is_empty() {
        return 1.0;
    }
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }
    if a == b {
        return 1.0;
    }

    let window = (a.len().max(b.len()) / 2).saturating_sub(1);

    let mut a_matched = vec![false; a.len()];
    let mut b_matched = vec![false; b.len()];
    let mut matches = 0usize;

    for (i, ca) in a.iter().enumerate() {
        let start = i.saturating_sub(window);
        let end = (i + window + 1).min(b.len());
        for j in start..end {
            if b_matched[j] || *ca != b[j] {
                continue;
            }
            a_matched[i] = true;
            b_matched[j] = true;
            matches += 1;
            break;
        }
    }

    if matches == 0 {
        return 0.0;
    }

    // 一致文字の順序違い
    let mut transpositions = 0usize;
    let mut k = 0;
    for (i, ca) in a.iter().enumerate() {
        if !a_matched[i] {
            continue;
        }
        while !b_matched[k] {
            k += 1;
        }
        if *ca != b[k] {
            transpositions += 1;
        }
        k += 1;
    }

    let m = matches as f64;
    let t = (transpositions / 2) as f64;

    (m / a.len() as f64 + m / b.len() as f64 + (m - t) / m) / 3.0
}

/// Jaro-Winkler類似度を計算
///
/// Jaro値が0.7を超える場合のみ、先頭4文字までの一致に応じて加点する。
pub fn jaro_winkler_similarity(a: &str, b: &str) -> f64 {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    jaro_winkler_chars(&a, &b)
}

fn jaro_winkler_chars(a: &[char], b: &[char]) -> f64 {
    let jaro = jaro_chars(a, b);
    if jaro <= BOOST_THRESHOLD {
        return jaro;
    }

    let prefix_len = a
        .iter()
        .zip(b.iter())
        .take(MAX_PREFIX_LEN)
        .take_while(|(x, y)| x == y)
        .count();

    (jaro + prefix_len as f64 * PREFIX_SCALE * (1.0 - jaro)).min(1.0)
}
