use crate::application::book::{
    BookApplicationError, ServiceDependencies, create_book as execute_create_book,
    get_book as execute_get_book, list_books as execute_list_books,
    remove_book as execute_remove_book, update_book as execute_update_book,
};
use crate::domain::{
    BookId,
    commands::{CreateBook, UpdateBook},
};
use axum::{
    Json,
    extract::{Path, State, rejection::JsonRejection},
    http::StatusCode,
};
use serde_json::{Map, Value};
use std::sync::Arc;

use super::{
    error::ApiError,
    types::{
        BookListing, BookResponse, Envelope, MESSAGE_ACCEPTED, MESSAGE_CREATED, MESSAGE_REMOVED,
        MESSAGE_UPDATED,
    },
};

// ============================================================================
// State
// ============================================================================

/// ハンドラー間で共有されるアプリケーション状態
#[derive(Clone)]
pub struct AppState {
    pub service_deps: ServiceDependencies,
}

type ApiResult<T> = Result<(StatusCode, Json<Envelope<T>>), ApiError>;

// ============================================================================
// Request helpers
// ============================================================================

/// リクエストボディをJSONオブジェクトとして取り出す
///
/// ボディがない、JSONとして不正、またはオブジェクトでない場合は空の入力として扱い、
/// 判定はバリデーションに任せる。
fn payload_object(payload: Result<Json<Value>, JsonRejection>) -> Map<String, Value> {
    match payload {
        Ok(Json(Value::Object(map))) => map,
        Ok(_) => Map::new(),
        Err(rejection) => {
            tracing::debug!("Treating unreadable body as empty: {}", rejection);
            Map::new()
        }
    }
}

/// パスの書籍IDを解釈する
///
/// 整数として解釈できないIDは存在しない書籍と同じく404とする。
fn parse_book_id(raw: &str) -> Result<BookId, ApiError> {
    raw.parse::<BookId>()
        .map_err(|_| ApiError::from(BookApplicationError::BookNotFound))
}

// ============================================================================
// Query handlers (GET)
// ============================================================================

/// GET /books - 書籍一覧を取得
///
/// 書籍がない場合、dataは文字列 "no data available" になる。
pub async fn list_books(State(state): State<Arc<AppState>>) -> ApiResult<BookListing> {
    let books = execute_list_books(&state.service_deps).await?;

    Ok((
        StatusCode::ACCEPTED,
        Json(Envelope::success(
            StatusCode::ACCEPTED,
            MESSAGE_ACCEPTED,
            BookListing::from(books),
        )),
    ))
}

/// GET /books/:id - 書籍をIDで取得
///
/// 見つかった場合は206、見つからない場合は404を返す。
pub async fn get_book(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> ApiResult<BookResponse> {
    let book_id = parse_book_id(&id)?;
    let book = execute_get_book(&state.service_deps, book_id).await?;

    Ok((
        StatusCode::PARTIAL_CONTENT,
        Json(Envelope::success(
            StatusCode::PARTIAL_CONTENT,
            MESSAGE_ACCEPTED,
            BookResponse::from(book),
        )),
    ))
}

// ============================================================================
// Command handlers (POST / PUT / PATCH / DELETE)
// ============================================================================

/// POST /books - 書籍を登録
///
/// ボディのcodeは202だが、HTTPステータスは200を返す。
pub async fn create_book(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<Value>, JsonRejection>,
) -> ApiResult<BookResponse> {
    let cmd = CreateBook {
        payload: payload_object(payload),
    };
    let book = execute_create_book(&state.service_deps, cmd).await?;

    Ok((
        StatusCode::OK,
        Json(Envelope::success(
            StatusCode::ACCEPTED,
            MESSAGE_CREATED,
            BookResponse::from(book),
        )),
    ))
}

/// PUT|PATCH /books/:id - 書籍を部分更新
///
/// 指定されたフィールドのみ更新する。
pub async fn update_book(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    payload: Result<Json<Value>, JsonRejection>,
) -> ApiResult<BookResponse> {
    let book_id = parse_book_id(&id)?;
    let cmd = UpdateBook {
        book_id,
        payload: payload_object(payload),
    };
    let book = execute_update_book(&state.service_deps, cmd).await?;

    Ok((
        StatusCode::ACCEPTED,
        Json(Envelope::success(
            StatusCode::ACCEPTED,
            MESSAGE_UPDATED,
            BookResponse::from(book),
        )),
    ))
}

/// DELETE /books/:id - 書籍を削除
///
/// 削除後の残りの書籍一覧を返す。
pub async fn remove_book(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> ApiResult<BookListing> {
    let book_id = parse_book_id(&id)?;
    let remaining = execute_remove_book(&state.service_deps, book_id).await?;

    Ok((
        StatusCode::ACCEPTED,
        Json(Envelope::success(
            StatusCode::ACCEPTED,
            MESSAGE_REMOVED,
            BookListing::from(remaining),
        )),
    ))
}
