//! フィールドパスとパスパターン
//!
//! 文書内の位置を `fields.ShopName.valueString` や `items[0].name` の形で表し、
//! 店舗名を含むフィールドを指定するパターンと照合する。
//!
//! ## パターン構文
//! - `name` : オブジェクトのキー
//! - `["Shop.Name"]` : `.` や `[` を含むキー（`\"` と `\\` でエスケープ）
//! - `*` : 任意のキーまたは配列要素1つ
//! - `[*]` / `[]` : 任意の配列要素1つ（`items[*]` のようにキーに続けて書ける）
//! - `[N]` : N番目の配列要素
//! - `**` : 0個以上の任意の階層
//!
//! 末尾が `**` のパターンは文字列の葉だけを対象にする（`**` 単独で全文字列）。
//! レポートのパス表記も同じ規則で引用するので、表記をそのままパターンに使える。

use crate::error::{Error, Result};
use std::fmt;
use std::iter::Peekable;
use std::str::Chars;

/// 店舗名フィールドの既定パターン
pub const DEFAULT_FIELD_PATTERN: &str = "**.ShopName.valueString";

/// パスの1要素
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathSegment {
    Key(String),
    Index(usize),
}

/// 文書内の位置
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldPath {
    segments: Vec<PathSegment>,
}

impl FieldPath {
    pub fn root() -> Self {
        Self::default()
    }

    pub fn push(&mut self, segment: PathSegment) {
        self.segments.push(segment);
    }

    pub fn pop(&mut self) -> Option<PathSegment> {
        self.segments.pop()
    }

    pub fn segments(&self) -> &[PathSegment] {
        &self.segments
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, segment) in self.segments.iter().enumerate() {
            match segment {
                PathSegment::Key(key) if needs_quoting(key) => {
                    write!(f, "[\"{}\"]", key.replace('\\', "\\\\").replace('"', "\\\""))?
                }
                PathSegment::Key(key) if i == 0 => write!(f, "{}", key)?,
                PathSegment::Key(key) => write!(f, ".{}", key)?,
                PathSegment::Index(index) => write!(f, "[{}]", index)?,
            }
        }
        Ok(())
    }
}

/// そのまま書くとパターンとして読めないキー
fn needs_quoting(key: &str) -> bool {
    key.is_empty()
        || key == "*"
        || key == "**"
        || key.trim() != key
        || key.chars().any(|c| matches!(c, '.' | '[' | ']' | '"'))
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum PatternToken {
    Key(String),
    Index(usize),
    AnyIndex,
    AnyOne,
    AnyDepth,
}

impl PatternToken {
    fn matches(&self, segment: &PathSegment) -> bool {
        match (self, segment) {
            (PatternToken::Key(k), PathSegment::Key(s)) => k == s,
            (PatternToken::Index(n), PathSegment::Index(i)) => n == i,
            (PatternToken::AnyIndex, PathSegment::Index(_)) => true,
            (PatternToken::AnyOne, _) => true,
            _ => false,
        }
    }
}

/// 店舗名フィールドを指定するパターン
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldPattern {
    source: String,
    tokens: Vec<PatternToken>,
}

impl FieldPattern {
    pub fn parse(pattern: &str) -> Result<Self> {
        let pattern = pattern.trim();
        if pattern.is_empty() {
            return Err(Error::Config("フィールドパターンが空です".into()));
        }

        let mut tokens = Vec::new();
        let mut chars = pattern.chars().peekable();
        loop {
            parse_part(pattern, &mut chars, &mut tokens)?;
            // parse_part は '.' か末尾でのみ止まる
            if chars.next().is_none() {
                break;
            }
        }

        Ok(Self {
            source: pattern.to_string(),
            tokens,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// 末尾が `**` なら文字列の葉だけが対象
    pub fn targets_leaves_only(&self) -> bool {
        self.tokens.last() == Some(&PatternToken::AnyDepth)
    }

    /// パスがパターンに一致するか
    pub fn matches(&self, path: &FieldPath) -> bool {
        match_tokens(&self.tokens, path.segments())
    }
}

impl Default for FieldPattern {
    fn default() -> Self {
        Self {
            source: DEFAULT_FIELD_PATTERN.to_string(),
            tokens: vec![
                PatternToken::AnyDepth,
                PatternToken::Key("ShopName".to_string()),
                PatternToken::Key("valueString".to_string()),
            ],
        }
    }
}

impl fmt::Display for FieldPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

impl std::str::FromStr for FieldPattern {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

/// `.` で区切られた1要素（キーと後続の `[...]`）を読む
fn parse_part(
    pattern: &str,
    chars: &mut Peekable<Chars<'_>>,
    tokens: &mut Vec<PatternToken>,
) -> Result<()> {
    let mut head = String::new();
    while let Some(&c) = chars.peek() {
        match c {
            '.' | '[' => break,
            ']' => return Err(invalid(pattern, "対応しない ] があります")),
            '"' => return Err(invalid(pattern, "引用符は [\"...\"] の中で使ってください")),
            _ => {
                head.push(c);
                chars.next();
            }
        }
    }

    let mut brackets = Vec::new();
    while chars.peek() == Some(&'[') {
        chars.next();
        brackets.push(parse_bracket(pattern, chars)?);
    }
    if matches!(chars.peek(), Some(&c) if c != '.') {
        return Err(invalid(pattern, "] の後に不正な文字があります"));
    }

    match head.as_str() {
        "" if brackets.is_empty() => return Err(invalid(pattern, "空の要素があります")),
        "" => {}
        "**" => {
            if !brackets.is_empty() {
                return Err(invalid(pattern, "** の後に [...] は書けません"));
            }
            // 連続した ** は1つにまとめる
            if tokens.last() != Some(&PatternToken::AnyDepth) {
                tokens.push(PatternToken::AnyDepth);
            }
        }
        "*" => tokens.push(PatternToken::AnyOne),
        _ => tokens.push(PatternToken::Key(head)),
    }
    tokens.extend(brackets);
    Ok(())
}

/// `[` の直後から対応する `]` までを読む
fn parse_bracket(pattern: &str, chars: &mut Peekable<Chars<'_>>) -> Result<PatternToken> {
    if chars.peek() == Some(&'"') {
        chars.next();
        let mut key = String::new();
        loop {
            match chars.next() {
                Some('"') => break,
                Some('\\') => match chars.next() {
                    Some(c) => key.push(c),
                    None => return Err(invalid(pattern, "引用符が閉じられていません")),
                },
                Some(c) => key.push(c),
                None => return Err(invalid(pattern, "引用符が閉じられていません")),
            }
        }
        if chars.next() != Some(']') {
            return Err(invalid(pattern, "] が閉じられていません"));
        }
        return Ok(PatternToken::Key(key));
    }

    let mut inner = String::new();
    loop {
        match chars.next() {
            Some(']') => break,
            Some(c) => inner.push(c),
            None => return Err(invalid(pattern, "] が閉じられていません")),
        }
    }
    match inner.as_str() {
        "" | "*" => Ok(PatternToken::AnyIndex),
        n => n
            .parse()
            .map(PatternToken::Index)
            .map_err(|_| invalid(pattern, "配列番号が不正です")),
    }
}

fn invalid(pattern: &str, reason: &str) -> Error {
    Error::Config(format!("フィールドパターン '{}' が不正: {}", pattern, reason))
}

/// トークン列とパスの照合
///
/// `reachable[j]` は読み終えたトークンがパスの先頭j要素に一致するかを表す。
/// `**` が複数あってもトークン数×パス長で済む。
fn match_tokens(tokens: &[PatternToken], segments: &[PathSegment]) -> bool {
    let mut reachable = vec![false; segments.len() + 1];
    reachable[0] = true;

    for token in tokens {
        let mut next = vec![false; segments.len() + 1];
        match token {
            PatternToken::AnyDepth => {
                let mut seen = false;
                for (j, slot) in next.iter_mut().enumerate() {
                    seen |= reachable[j];
                    *slot = seen;
                }
            }
            _ => {
                for (j, segment) in segments.iter().enumerate() {
                    next[j + 1] = reachable[j] && token.matches(segment);
                }
            }
        }
        reachable = next;
    }

    reachable[segments.len()]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn path(segments: &[PathSegment]) -> FieldPath {
        let mut p = FieldPath::root();
        for s in segments {
            p.push(s.clone());
        }
        p
    }

    fn key(k: &str) -> PathSegment {
        PathSegment::Key(k.to_string())
    }

    #[test]
    fn test_field_path_display() {
        let p = path(&[key("result"), key("contents"), PathSegment::Index(0), key("fields")]);
        assert_eq!(p.to_string(), "result.contents[0].fields");
        assert_eq!(path(&[PathSegment::Index(2), key("name")]).to_string(), "[2].name");
        assert_eq!(FieldPath::root().to_string(), "");
    }

    #[test]
    fn test_default_pattern_matches_parsed() {
        assert_eq!(FieldPattern::default(), FieldPattern::parse(DEFAULT_FIELD_PATTERN).unwrap());
    }

    #[test]
    fn test_pattern_literal() {
        let pattern = FieldPattern::parse("shop.name").unwrap();
        assert!(pattern.matches(&path(&[key("shop"), key("name")])));
        assert!(!pattern.matches(&path(&[key("shop")])));
        assert!(!pattern.matches(&path(&[key("x"), key("shop"), key("name")])));
    }

    #[test]
    fn test_pattern_any_index() {
        let pattern = FieldPattern::parse("records[*].shop").unwrap();
        assert!(pattern.matches(&path(&[key("records"), PathSegment::Index(3), key("shop")])));
        assert!(!pattern.matches(&path(&[key("records"), key("x"), key("shop")])));

        let pattern = FieldPattern::parse("records[].shop").unwrap();
        assert!(pattern.matches(&path(&[key("records"), PathSegment::Index(0), key("shop")])));
    }

    #[test]
    fn test_pattern_fixed_index() {
        let pattern = FieldPattern::parse("records[1][0]").unwrap();
        assert!(pattern.matches(&path(&[key("records"), PathSegment::Index(1), PathSegment::Index(0)])));
        assert!(!pattern.matches(&path(&[key("records"), PathSegment::Index(0), PathSegment::Index(0)])));
    }

    #[test]
    fn test_pattern_wildcards() {
        let pattern = FieldPattern::parse("*.name").unwrap();
        assert!(pattern.matches(&path(&[key("a"), key("name")])));
        assert!(pattern.matches(&path(&[PathSegment::Index(0), key("name")])));
        assert!(!pattern.matches(&path(&[key("name")])));

        let pattern = FieldPattern::parse("**.ShopName.valueString").unwrap();
        assert!(pattern.matches(&path(&[key("ShopName"), key("valueString")])));
        assert!(pattern.matches(&path(&[
            key("result"),
            key("contents"),
            PathSegment::Index(0),
            key("fields"),
            key("ShopName"),
            key("valueString"),
        ])));
        assert!(!pattern.matches(&path(&[key("ShopName"), key("valueNumber")])));
    }

    #[test]
    fn test_pattern_any_depth_everything() {
        let pattern = FieldPattern::parse("**").unwrap();
        assert!(pattern.matches(&FieldPath::root()));
        assert!(pattern.matches(&path(&[key("a"), PathSegment::Index(1)])));

        assert!(pattern.targets_leaves_only());
        assert!(!FieldPattern::default().targets_leaves_only());

        let pattern = FieldPattern::parse("**.**.name").unwrap();
        assert!(pattern.matches(&path(&[key("name")])));
        assert!(pattern.matches(&path(&[key("a"), PathSegment::Index(0), key("name")])));
    }

    #[test]
    fn test_pattern_invalid() {
        for bad in [
            "", "a..b", "a[", "a[x]", "a]b", "a[0]b", ".", "a.", "**[0]", "a\"b",
            "[\"open", "[\"key\"x]",
        ] {
            assert!(
                matches!(FieldPattern::parse(bad), Err(Error::Config(_))),
                "パターンがエラーにならない: {:?}",
                bad
            );
        }
    }

    #[test]
    fn test_field_path_quotes_special_keys() {
        let p = path(&[key("fields"), key("Shop.Name"), key("a[0]"), PathSegment::Index(1)]);
        assert_eq!(p.to_string(), r#"fields["Shop.Name"]["a[0]"][1]"#);
        assert_eq!(path(&[key("say \"hi\"")]).to_string(), r#"["say \"hi\""]"#);
        assert_eq!(path(&[key("*"), key("")]).to_string(), r#"["*"][""]"#);
    }

    #[test]
    fn test_pattern_quoted_key() {
        let pattern = FieldPattern::parse(r#"**["Shop.Name"].valueString"#);
        assert!(pattern.is_err());

        let pattern = FieldPattern::parse(r#"**.["Shop.Name"].valueString"#).unwrap();
        assert!(pattern.matches(&path(&[key("x"), key("Shop.Name"), key("valueString")])));
        assert!(!pattern.matches(&path(&[key("Shop"), key("Name"), key("valueString")])));

        let pattern = FieldPattern::parse(r#"fields["a\"b"][0]"#).unwrap();
        assert!(pattern.matches(&path(&[key("fields"), key("a\"b"), PathSegment::Index(0)])));
    }

    #[test]
    fn test_rendered_path_parses_back() {
        let p = path(&[
            key("result"),
            key("Shop.Name"),
            PathSegment::Index(2),
            key(" padded "),
            key("*"),
            key("back\\slash\""),
        ]);
        let pattern = FieldPattern::parse(&p.to_string()).unwrap();
        assert!(pattern.matches(&p));
        assert!(!pattern.matches(&path(&[key("result"), key("Shop.Name")])));
    }

    #[test]
    fn test_many_any_depth_on_deep_path() {
        let mut deep = FieldPath::root();
        for i in 0..300 {
            deep.push(key(&format!("k{}", i % 7)));
        }
        deep.push(key("ShopName"));

        let pattern = FieldPattern::parse("**.k1.**.k3.**.k5.**.k0.**.ShopName").unwrap();
        assert!(pattern.matches(&deep));

        let pattern = FieldPattern::parse("**.k1.**.k3.**.k5.**.k0.**.Missing").unwrap();
        assert!(!pattern.matches(&deep));
    }

    #[test]
    fn test_pattern_from_str() {
        let pattern: FieldPattern = "records[*].shop".parse().unwrap();
        assert_eq!(pattern.to_string(), "records[*].shop");
        assert!("a..b".parse::<FieldPattern>().is_err());
    }
}
