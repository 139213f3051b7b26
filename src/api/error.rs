use crate::application::book::BookApplicationError;
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::Value;

use super::types::{Envelope, MESSAGE_INTERNAL, MESSAGE_INVALID, MESSAGE_NOT_FOUND};

/// API層のエラー型
///
/// アプリケーション層のエラーをラップし、エンベロープ形式のHTTPレスポンスへのマッピングを提供する。
#[derive(Debug)]
pub struct ApiError(BookApplicationError);

impl From<BookApplicationError> for ApiError {
    fn from(err: BookApplicationError) -> Self {
        ApiError(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, envelope) = match self.0 {
            // 422 Unprocessable Entity - フィールドごとの違反をまとめて返す
            BookApplicationError::Validation(errors) => {
                let data = serde_json::to_value(&errors).unwrap_or(Value::Null);
                (
                    StatusCode::UNPROCESSABLE_ENTITY,
                    Envelope::error(StatusCode::UNPROCESSABLE_ENTITY, MESSAGE_INVALID, Some(data)),
                )
            }

            // 404 Not Found - dataキーは含めない
            BookApplicationError::BookNotFound => (
                StatusCode::NOT_FOUND,
                Envelope::error(StatusCode::NOT_FOUND, MESSAGE_NOT_FOUND, None),
            ),

            // 500 Internal Server Error - システム障害
            // 内部エラーの詳細はログに記録し、クライアントには一般的なメッセージのみを返す
            BookApplicationError::MalformedPayload(ref e) => {
                tracing::error!("Malformed payload after validation: {}", e);
                internal_error()
            }
            BookApplicationError::RepositoryError(ref e) => {
                tracing::error!("Book repository error: {}", e);
                internal_error()
            }
        };

        (status, Json(envelope)).into_response()
    }
}

fn internal_error() -> (StatusCode, Envelope<Value>) {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Envelope::error(StatusCode::INTERNAL_SERVER_ERROR, MESSAGE_INTERNAL, None),
    )
}
