use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::value_objects::BookId;

/// 書籍エンティティ
///
/// booksテーブルの1行に対応する。titleは全書籍で一意。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Book {
    pub id: BookId,
    pub title: String,
    pub description: String,
    pub author: String,
    pub publisher: String,
    pub date_of_issue: NaiveDate,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// 新規書籍（バリデーション済みの作成入力）
///
/// IDとタイムスタンプは永続化層が付与する。
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct NewBook {
    pub title: String,
    pub description: String,
    pub author: String,
    pub publisher: String,
    pub date_of_issue: NaiveDate,
}

/// 書籍の部分更新（バリデーション済みの更新入力）
///
/// `None`のフィールドは現在の値を維持する。
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct BookChanges {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub author: Option<String>,
    #[serde(default)]
    pub publisher: Option<String>,
    #[serde(default)]
    pub date_of_issue: Option<NaiveDate>,
}

impl BookChanges {
    /// 変更が1つもないか
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.author.is_none()
            && self.publisher.is_none()
            && self.date_of_issue.is_none()
    }

    /// 変更を書籍に適用する
    ///
    /// updated_atは呼び出し側が指定する。
    pub fn apply_to(self, book: &mut Book, updated_at: DateTime<Utc>) {
        if let Some(title) = self.title {
            book.title = title;
        }
        if let Some(description) = self.description {
            book.description = description;
        }
        if let Some(author) = self.author {
            book.author = author;
        }
        if let Some(publisher) = self.publisher {
            book.publisher = publisher;
        }
        if let Some(date_of_issue) = self.date_of_issue {
            book.date_of_issue = date_of_issue;
        }
        book.updated_at = updated_at;
    }
}
