use crate::domain::{Book, BookChanges, BookId, NewBook};
use async_trait::async_trait;
use thiserror::Error;

/// 書籍リポジトリのエラー
#[derive(Debug, Error)]
pub enum BookRepositoryError {
    /// タイトルの一意制約違反
    ///
    /// 事前の一意性チェックと書き込みの間に同じタイトルが登録された場合に発生する。
    #[error("Book title already exists")]
    DuplicateTitle,

    /// データベースのエラー
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

pub type Result<T> = std::result::Result<T, BookRepositoryError>;

/// 書籍リポジトリポート
///
/// booksテーブルに対する単一行の読み書きを抽象化する。
/// 実装はタイトルの一意性を保存時にも保証しなければならない。
#[async_trait]
pub trait BookRepository: Send + Sync {
    /// 全書籍をID昇順で取得する
    async fn list(&self) -> Result<Vec<Book>>;

    /// IDで書籍を取得する
    async fn find_by_id(&self, book_id: BookId) -> Result<Option<Book>>;

    /// タイトルが既に使われているか確認する
    ///
    /// `except`を指定した場合、その書籍自身は判定から除外する（更新時）。
    /// 比較は大文字小文字を区別する完全一致。
    async fn is_title_taken(&self, title: &str, except: Option<BookId>) -> Result<bool>;

    /// 書籍を登録し、採番された書籍を返す
    async fn create(&self, new_book: NewBook) -> Result<Book>;

    /// 指定されたフィールドのみ更新する
    ///
    /// 書籍が存在しない場合は`None`を返す。
    async fn update(&self, book_id: BookId, changes: BookChanges) -> Result<Option<Book>>;

    /// 書籍を削除する
    ///
    /// 削除した場合は`true`、存在しなかった場合は`false`を返す。
    async fn delete(&self, book_id: BookId) -> Result<bool>;
}
