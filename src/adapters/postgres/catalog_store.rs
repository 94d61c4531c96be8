use crate::domain::{
    book::Book,
    value_objects::{BookId, Isbn, TotalCopies},
};
use crate::ports::catalog_store::CatalogStore as CatalogStoreTrait;
use crate::ports::store_error::{Result, StoreError};
use async_trait::async_trait;
use sqlx::{PgPool, Row, postgres::PgRow};

use super::invalid_data;

/// PostgreSQLの行データをBookに変換する
///
/// 冊数はINTEGERで保存しているため、u32と値オブジェクトへの変換で
/// 範囲外の値をエラーとして扱う。
fn map_row_to_book(row: &PgRow) -> Result<Book> {
    let isbn_str: String = row.try_get("isbn")?;
    let isbn = Isbn::parse(&isbn_str)
        .map_err(|_| invalid_data(format!("Invalid isbn in books: {}", isbn_str)))?;

    let total_i32: i32 = row.try_get("total_copies")?;
    let total_copies = u32::try_from(total_i32)
        .ok()
        .and_then(|v| TotalCopies::try_from(v).ok())
        .ok_or_else(|| invalid_data(format!("total_copies out of range: {}", total_i32)))?;

    let available_i32: i32 = row.try_get("available_copies")?;
    let available_copies = u32::try_from(available_i32)
        .map_err(|_| invalid_data(format!("available_copies out of range: {}", available_i32)))?;

    Ok(Book {
        book_id: BookId::from_uuid(row.try_get("id")?),
        title: row.try_get("title")?,
        author: row.try_get("author")?,
        isbn,
        total_copies,
        available_copies,
        version: row.try_get("version")?,
    })
}

/// CatalogStoreのPostgreSQL実装
///
/// 冊数の範囲はCHECK制約、ISBNの一意性はUNIQUE制約でも保証する。
pub struct CatalogStore {
    pool: PgPool,
}

impl CatalogStore {
    /// PostgreSQLコネクションプールから新しいCatalogStoreを作成
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CatalogStoreTrait for CatalogStore {
    async fn get(&self, book_id: BookId) -> Result<Option<Book>> {
        let row = sqlx::query(
            r#"
            SELECT id, title, author, isbn, total_copies, available_copies, version
            FROM books
            WHERE id = $1
            "#,
        )
        .bind(book_id.value())
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(map_row_to_book).transpose()
    }

    async fn find_by_isbn(&self, isbn: &Isbn) -> Result<Option<Book>> {
        let row = sqlx::query(
            r#"
            SELECT id, title, author, isbn, total_copies, available_copies, version
            FROM books
            WHERE isbn = $1
            "#,
        )
        .bind(isbn.as_str())
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(map_row_to_book).transpose()
    }

    async fn list_all(&self) -> Result<Vec<Book>> {
        let rows = sqlx::query(
            r#"
            SELECT id, title, author, isbn, total_copies, available_copies, version
            FROM books
            ORDER BY title ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(map_row_to_book).collect()
    }

    async fn insert(&self, book: Book) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO books (id, title, author, isbn, total_copies, available_copies, version)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(book.book_id.value())
        .bind(&book.title)
        .bind(&book.author)
        .bind(book.isbn.as_str())
        .bind(book.total_copies.value() as i32)
        .bind(book.available_copies as i32)
        .bind(book.version)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// 版が一致する場合のみ置き換える（楽観的排他制御）
    ///
    /// 貸出可能冊数は所蔵冊数と同じ文で書き換えるため、
    /// 不変条件が一時的にも破られることはない。
    async fn update(&self, book: Book) -> Result<()> {
        let result = sqlx::query(
            r#"
            UPDATE books
            SET title = $2,
                author = $3,
                isbn = $4,
                total_copies = $5,
                available_copies = $6,
                version = version + 1
            WHERE id = $1 AND version = $7
            "#,
        )
        .bind(book.book_id.value())
        .bind(&book.title)
        .bind(&book.author)
        .bind(book.isbn.as_str())
        .bind(book.total_copies.value() as i32)
        .bind(book.available_copies as i32)
        .bind(book.version)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::Conflict);
        }

        Ok(())
    }

    async fn delete(&self, book_id: BookId) -> Result<()> {
        sqlx::query("DELETE FROM books WHERE id = $1")
            .bind(book_id.value())
            .execute(&self.pool)
            .await?;

        Ok(())
    }
}
