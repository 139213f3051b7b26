use crate::domain::{Book, BookChanges, BookId, NewBook};
use crate::ports::book_repository::{
    BookRepository as BookRepositoryTrait, BookRepositoryError, Result,
};
use async_trait::async_trait;
use chrono::Utc;
use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard};

#[derive(Default)]
struct Table {
    rows: BTreeMap<BookId, Book>,
    last_id: i64,
}

impl Table {
    fn title_taken(&self, title: &str, except: Option<BookId>) -> bool {
        self.rows
            .values()
            .any(|book| book.title == title && Some(book.id) != except)
    }
}

/// BookRepositoryのインメモリ実装
///
/// booksテーブルと同じ振る舞いをする。IDは連番で採番され再利用されない。
/// 一覧はID順で、titleの一意制約は登録時・更新時に適用される。
#[derive(Default)]
pub struct BookRepository {
    table: Mutex<Table>,
}

impl BookRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// テスト用にバリデーションを通さず書籍を登録
    pub fn insert(&self, new_book: NewBook) -> Book {
        let mut table = self.lock();
        Self::insert_row(&mut table, new_book)
    }

    /// 保存されている書籍の件数
    pub fn len(&self) -> usize {
        self.lock().rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> MutexGuard<'_, Table> {
        self.table.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn insert_row(table: &mut Table, new_book: NewBook) -> Book {
        table.last_id += 1;
        let now = Utc::now();
        let book = Book {
            id: BookId::from_i64(table.last_id),
            title: new_book.title,
            description: new_book.description,
            author: new_book.author,
            publisher: new_book.publisher,
            date_of_issue: new_book.date_of_issue,
            created_at: now,
            updated_at: now,
        };
        table.rows.insert(book.id, book.clone());
        book
    }
}

#[async_trait]
impl BookRepositoryTrait for BookRepository {
    async fn list(&self) -> Result<Vec<Book>> {
        Ok(self.lock().rows.values().cloned().collect())
    }

    async fn find_by_id(&self, book_id: BookId) -> Result<Option<Book>> {
        Ok(self.lock().rows.get(&book_id).cloned())
    }

    async fn is_title_taken(&self, title: &str, except: Option<BookId>) -> Result<bool> {
        Ok(self.lock().title_taken(title, except))
    }

    async fn create(&self, new_book: NewBook) -> Result<Book> {
        let mut table = self.lock();
        if table.title_taken(&new_book.title, None) {
            return Err(BookRepositoryError::DuplicateTitle);
        }
        Ok(Self::insert_row(&mut table, new_book))
    }

    async fn update(&self, book_id: BookId, changes: BookChanges) -> Result<Option<Book>> {
        let mut table = self.lock();
        if let Some(title) = &changes.title {
            if table.title_taken(title, Some(book_id)) {
                return Err(BookRepositoryError::DuplicateTitle);
            }
        }

        let Some(book) = table.rows.get_mut(&book_id) else {
            return Ok(None);
        };
        changes.apply_to(book, Utc::now());
        Ok(Some(book.clone()))
    }

    async fn delete(&self, book_id: BookId) -> Result<bool> {
        Ok(self.lock().rows.remove(&book_id).is_some())
    }
}
