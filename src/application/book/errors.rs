use crate::domain::ValidationErrors;
use crate::ports::BookRepositoryError;
use thiserror::Error;

/// 書籍管理アプリケーション層のエラー
#[derive(Debug, Error)]
pub enum BookApplicationError {
    /// 入力がバリデーションに違反している
    #[error("Validation failed: {0}")]
    Validation(ValidationErrors),

    /// 書籍が見つからない
    #[error("Book not found")]
    BookNotFound,

    /// 検証済みの値を書籍の型に変換できなかった
    #[error("Malformed payload")]
    MalformedPayload(#[source] serde_json::Error),

    /// BookRepositoryのエラー
    #[error("Book repository error")]
    RepositoryError(#[source] BookRepositoryError),
}

impl From<ValidationErrors> for BookApplicationError {
    fn from(errors: ValidationErrors) -> Self {
        BookApplicationError::Validation(errors)
    }
}

/// アプリケーション層の Result型
pub type Result<T> = std::result::Result<T, BookApplicationError>;
