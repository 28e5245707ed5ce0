//! Shop Fix Common Library
//!
//! OCR店舗名の照合・置換の中核部分（CLIから利用）

pub mod error;
pub mod dictionary;
pub mod similarity;
pub mod selector;
pub mod path;
pub mod rewriter;
pub mod report;

pub use error::{Error, Result};
pub use dictionary::StandardNameSet;
pub use similarity::{score, SimilarityScore};
pub use selector::{select, MatchDecision, RankedCandidate, ShopNameMatcher, Thresholds};
pub use path::{FieldPath, FieldPattern, PathSegment, DEFAULT_FIELD_PATTERN};
pub use rewriter::{rewrite, rewrite_in_place, DocumentNode};
pub use report::{EntryStatus, Report, ReportBuilder, ReportEntry, ReportSummary};
