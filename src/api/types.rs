use axum::http::StatusCode;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::Book;

pub const MESSAGE_ACCEPTED: &str = "data successfully accepted";
pub const MESSAGE_CREATED: &str = "data successfully created";
pub const MESSAGE_UPDATED: &str = "data successfully updated";
pub const MESSAGE_REMOVED: &str = "data successfully removed";
pub const MESSAGE_INVALID: &str = "data not match with our validation";
pub const MESSAGE_NOT_FOUND: &str = "book not found in our database";
pub const MESSAGE_INTERNAL: &str = "internal server error";

/// 書籍が1冊もない場合に一覧の代わりに返す値
pub const NO_DATA_AVAILABLE: &str = "no data available";

/// レスポンスのステータス
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResponseStatus {
    Success,
    Error,
}

/// 全レスポンス共通のエンベロープ
///
/// `code`はHTTPステータスとは独立にボディへ書き込まれる。
/// `data`がない場合はキー自体を出力しない。
#[derive(Debug, Serialize, Deserialize)]
pub struct Envelope<T> {
    pub code: u16,
    pub status: ResponseStatus,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T> Envelope<T> {
    pub fn success(code: StatusCode, message: impl Into<String>, data: T) -> Self {
        Self {
            code: code.as_u16(),
            status: ResponseStatus::Success,
            message: message.into(),
            data: Some(data),
        }
    }

    pub fn error(code: StatusCode, message: impl Into<String>, data: Option<T>) -> Self {
        Self {
            code: code.as_u16(),
            status: ResponseStatus::Error,
            message: message.into(),
            data,
        }
    }
}

/// 書籍レスポンス
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookResponse {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub author: String,
    pub publisher: String,
    pub date_of_issue: NaiveDate,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Book> for BookResponse {
    fn from(book: Book) -> Self {
        Self {
            id: book.id.value(),
            title: book.title,
            description: book.description,
            author: book.author,
            publisher: book.publisher,
            date_of_issue: book.date_of_issue,
            created_at: book.created_at,
            updated_at: book.updated_at,
        }
    }
}

/// 書籍一覧（GET /books と DELETE /books/:id）
///
/// 空の場合は空配列ではなく文字列 "no data available" を返す。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum BookListing {
    Books(Vec<BookResponse>),
    NoData(String),
}

impl From<Vec<Book>> for BookListing {
    fn from(books: Vec<Book>) -> Self {
        if books.is_empty() {
            BookListing::NoData(NO_DATA_AVAILABLE.to_string())
        } else {
            BookListing::Books(books.into_iter().map(BookResponse::from).collect())
        }
    }
}
