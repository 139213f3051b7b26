use crate::domain::{
    Book, BookChanges, BookId, NewBook, ValidationErrors,
    commands::{CreateBook, UpdateBook},
    validation::{Schema, UniqueIndex, already_taken_message},
};
use crate::ports::{BookRepository, BookRepositoryError};
use serde_json::{Map, Value};
use std::sync::Arc;

use super::errors::{BookApplicationError, Result};

/// サービスの依存関係
///
/// 永続化層はグローバルなハンドルではなく、この構造体経由で明示的に渡す。
#[derive(Clone)]
pub struct ServiceDependencies {
    pub book_repository: Arc<dyn BookRepository>,
}

/// 入力をスキーマで検証するヘルパー関数
///
/// スキーマの制約をすべて評価したうえで、一意性の判定をリポジトリに問い合わせる。
/// 違反はフィールドごとにまとめて1つのエラーとして返す。
///
/// # 引数
/// * `repository` - 書籍リポジトリ
/// * `schema` - 作成用または更新用のスキーマ
/// * `payload` - リクエストボディ
/// * `except` - 一意性判定から除外する書籍（更新対象自身）
async fn validate(
    repository: &Arc<dyn BookRepository>,
    schema: &Schema,
    payload: &Map<String, Value>,
    except: Option<BookId>,
) -> Result<Value> {
    let mut check = schema.check(payload);

    for (field, index, value) in check.unique_candidates() {
        let taken = match index {
            UniqueIndex::BookTitle => repository
                .is_title_taken(&value, except)
                .await
                .map_err(BookApplicationError::RepositoryError)?,
        };

        if taken {
            check.reject_unique(field);
        }
    }

    let validated = check.finish()?;
    Ok(Value::Object(validated))
}

/// リポジトリの書き込みエラーを変換する
///
/// 検証後に別のリクエストが同じタイトルを登録した場合も、
/// 通常のバリデーションエラーと同じ形で返す。
fn map_write_error(err: BookRepositoryError) -> BookApplicationError {
    match err {
        BookRepositoryError::DuplicateTitle => {
            let mut errors = ValidationErrors::new();
            errors.add("title", already_taken_message("title"));
            BookApplicationError::Validation(errors)
        }
        other => BookApplicationError::RepositoryError(other),
    }
}

/// 全書籍を取得する
pub async fn list_books(deps: &ServiceDependencies) -> Result<Vec<Book>> {
    deps.book_repository
        .list()
        .await
        .map_err(BookApplicationError::RepositoryError)
}

/// 書籍を登録する
///
/// ルール：
/// - 全フィールド必須
/// - title, author, publisherは255文字以内
/// - date_of_issueはYYYY-MM-DD形式の実在する日付
/// - titleは既存の書籍と重複しないこと
pub async fn create_book(deps: &ServiceDependencies, cmd: CreateBook) -> Result<Book> {
    let validated = validate(
        &deps.book_repository,
        &Schema::book_create(),
        &cmd.payload,
        None,
    )
    .await?;

    let new_book: NewBook =
        serde_json::from_value(validated).map_err(BookApplicationError::MalformedPayload)?;

    let book = deps
        .book_repository
        .create(new_book)
        .await
        .map_err(map_write_error)?;

    tracing::info!(book_id = %book.id, title = %book.title, "Book created");
    Ok(book)
}

/// IDで書籍を取得する
pub async fn get_book(deps: &ServiceDependencies, book_id: BookId) -> Result<Book> {
    deps.book_repository
        .find_by_id(book_id)
        .await
        .map_err(BookApplicationError::RepositoryError)?
        .ok_or(BookApplicationError::BookNotFound)
}

/// 書籍を部分更新する
///
/// ルール：
/// - 各フィールドは省略可能。指定されたフィールドのみ検証・更新する
/// - titleの一意性判定では更新対象の書籍自身を除外する
///
/// 検証は存在確認より先に行う。存在しない書籍への不正な入力は422になる。
pub async fn update_book(deps: &ServiceDependencies, cmd: UpdateBook) -> Result<Book> {
    let validated = validate(
        &deps.book_repository,
        &Schema::book_update(),
        &cmd.payload,
        Some(cmd.book_id),
    )
    .await?;

    let changes: BookChanges =
        serde_json::from_value(validated).map_err(BookApplicationError::MalformedPayload)?;

    // 変更がなければ書き込まない（updated_atも維持する）
    if changes.is_empty() {
        return get_book(deps, cmd.book_id).await;
    }

    let book = deps
        .book_repository
        .update(cmd.book_id, changes)
        .await
        .map_err(map_write_error)?
        .ok_or(BookApplicationError::BookNotFound)?;

    tracing::info!(book_id = %book.id, "Book updated");
    Ok(book)
}

/// 書籍を削除し、残りの全書籍を返す
pub async fn remove_book(deps: &ServiceDependencies, book_id: BookId) -> Result<Vec<Book>> {
    let book = get_book(deps, book_id).await?;

    let deleted = deps
        .book_repository
        .delete(book.id)
        .await
        .map_err(BookApplicationError::RepositoryError)?;

    // 確認と削除の間に別リクエストが削除した場合
    if !deleted {
        return Err(BookApplicationError::BookNotFound);
    }

    tracing::info!(book_id = %book.id, "Book removed");
    list_books(deps).await
}
