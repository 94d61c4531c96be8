use crate::domain::{
    book::Book,
    value_objects::{BookId, Isbn},
};
use crate::ports::catalog_store::CatalogStore as CatalogStoreTrait;
use crate::ports::store_error::{Result, StoreError};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

/// CatalogStoreのインメモリ実装
///
/// DATABASE_URL未設定時の運用とテストで使用する。
/// 版の確認とISBNの一意性をPostgreSQL実装と同じ規則で強制する。
#[derive(Default)]
pub struct CatalogStore {
    books: Mutex<HashMap<BookId, Book>>,
}

impl CatalogStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn books(&self) -> MutexGuard<'_, HashMap<BookId, Book>> {
        self.books.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

fn isbn_taken(books: &HashMap<BookId, Book>, isbn: &Isbn, except: BookId) -> bool {
    books
        .values()
        .any(|b| b.book_id != except && &b.isbn == isbn)
}

#[async_trait]
impl CatalogStoreTrait for CatalogStore {
    async fn get(&self, book_id: BookId) -> Result<Option<Book>> {
        Ok(self.books().get(&book_id).cloned())
    }

    async fn find_by_isbn(&self, isbn: &Isbn) -> Result<Option<Book>> {
        Ok(self.books().values().find(|b| &b.isbn == isbn).cloned())
    }

    async fn list_all(&self) -> Result<Vec<Book>> {
        let mut books: Vec<Book> = self.books().values().cloned().collect();
        books.sort_by(|a, b| a.title.cmp(&b.title));
        Ok(books)
    }

    async fn insert(&self, book: Book) -> Result<()> {
        let mut books = self.books();
        if books.contains_key(&book.book_id) || isbn_taken(&books, &book.isbn, book.book_id) {
            return Err(StoreError::Conflict);
        }
        books.insert(book.book_id, book);
        Ok(())
    }

    async fn update(&self, book: Book) -> Result<()> {
        let mut books = self.books();
        if isbn_taken(&books, &book.isbn, book.book_id) {
            return Err(StoreError::Conflict);
        }

        let Some(stored) = books.get_mut(&book.book_id) else {
            return Err(StoreError::Conflict);
        };
        if stored.version != book.version {
            return Err(StoreError::Conflict);
        }

        *stored = Book {
            version: book.version + 1,
            ..book
        };
        Ok(())
    }

    async fn delete(&self, book_id: BookId) -> Result<()> {
        self.books().remove(&book_id);
        Ok(())
    }
}
