use crate::domain::{Book, BookChanges, BookId, NewBook};
use crate::ports::book_repository::{
    BookRepository as BookRepositoryTrait, BookRepositoryError, Result,
};
use async_trait::async_trait;
use sqlx::{PgPool, Row, postgres::PgRow};

const BOOK_COLUMNS: &str =
    "id, title, description, author, publisher, date_of_issue, created_at, updated_at";

/// PostgreSQLの行データをBookに変換する
fn map_row_to_book(row: &PgRow) -> Book {
    Book {
        id: BookId::from_i64(row.get("id")),
        title: row.get("title"),
        description: row.get("description"),
        author: row.get("author"),
        publisher: row.get("publisher"),
        date_of_issue: row.get("date_of_issue"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    }
}

/// 書き込み時のエラーを変換する
///
/// titleの一意インデックス違反は`DuplicateTitle`として報告する。
fn map_write_error(err: sqlx::Error) -> BookRepositoryError {
    if let sqlx::Error::Database(db_err) = &err {
        if db_err.is_unique_violation() {
            tracing::warn!("Unique violation on books: {}", db_err);
            return BookRepositoryError::DuplicateTitle;
        }
    }
    BookRepositoryError::Database(err)
}

/// BookRepositoryのPostgreSQL実装
pub struct BookRepository {
    pool: PgPool,
}

impl BookRepository {
    /// PostgreSQLコネクションプールから新しいBookRepositoryを作成
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl BookRepositoryTrait for BookRepository {
    async fn list(&self) -> Result<Vec<Book>> {
        let rows = sqlx::query(&format!("SELECT {BOOK_COLUMNS} FROM books ORDER BY id ASC"))
            .fetch_all(&self.pool)
            .await?;

        Ok(rows.iter().map(map_row_to_book).collect())
    }

    async fn find_by_id(&self, book_id: BookId) -> Result<Option<Book>> {
        let row = sqlx::query(&format!("SELECT {BOOK_COLUMNS} FROM books WHERE id = $1"))
            .bind(book_id.value())
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.as_ref().map(map_row_to_book))
    }

    /// titleの一意性確認
    ///
    /// `IS DISTINCT FROM`により、exceptがNULLの場合は全行が対象になる。
    async fn is_title_taken(&self, title: &str, except: Option<BookId>) -> Result<bool> {
        let taken: bool = sqlx::query_scalar(
            r#"
            SELECT EXISTS (
                SELECT 1 FROM books
                WHERE title = $1 AND id IS DISTINCT FROM $2
            )
            "#,
        )
        .bind(title)
        .bind(except.map(|id| id.value()))
        .fetch_one(&self.pool)
        .await?;

        Ok(taken)
    }

    async fn create(&self, new_book: NewBook) -> Result<Book> {
        let row = sqlx::query(&format!(
            r#"
            INSERT INTO books (title, description, author, publisher, date_of_issue)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {BOOK_COLUMNS}
            "#
        ))
        .bind(&new_book.title)
        .bind(&new_book.description)
        .bind(&new_book.author)
        .bind(&new_book.publisher)
        .bind(new_book.date_of_issue)
        .fetch_one(&self.pool)
        .await
        .map_err(map_write_error)?;

        Ok(map_row_to_book(&row))
    }

    /// 部分更新
    ///
    /// NULLのパラメータはCOALESCEにより現在の値を維持する。
    async fn update(&self, book_id: BookId, changes: BookChanges) -> Result<Option<Book>> {
        let row = sqlx::query(&format!(
            r#"
            UPDATE books SET
                title = COALESCE($2, title),
                description = COALESCE($3, description),
                author = COALESCE($4, author),
                publisher = COALESCE($5, publisher),
                date_of_issue = COALESCE($6, date_of_issue),
                updated_at = NOW()
            WHERE id = $1
            RETURNING {BOOK_COLUMNS}
            "#
        ))
        .bind(book_id.value())
        .bind(changes.title)
        .bind(changes.description)
        .bind(changes.author)
        .bind(changes.publisher)
        .bind(changes.date_of_issue)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_write_error)?;

        Ok(row.as_ref().map(map_row_to_book))
    }

    async fn delete(&self, book_id: BookId) -> Result<bool> {
        let result = sqlx::query("DELETE FROM books WHERE id = $1")
            .bind(book_id.value())
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
