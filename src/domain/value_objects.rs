use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// 書籍ID - booksテーブルの主キー
///
/// 採番は永続化層が行い、作成後は変更されない。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BookId(i64);

impl BookId {
    pub fn from_i64(value: i64) -> Self {
        Self(value)
    }

    pub fn value(&self) -> i64 {
        self.0
    }
}

impl fmt::Display for BookId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for BookId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().parse::<i64>().map(Self)
    }
}

/// 文字列フィールドの最大長（VARCHAR(255)）
pub const MAX_STRING_LENGTH: usize = 255;

/// 発行日のフォーマット（YYYY-MM-DD）
pub const DATE_OF_ISSUE_FORMAT: &str = "%Y-%m-%d";
