use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::application::loan::LoanView;
use crate::domain::book::Book;

/// 貸出リクエスト（POST /loans/borrow）
#[derive(Debug, Deserialize)]
pub struct BorrowRequest {
    pub book_id: Uuid,
}

/// 貸出レスポンス
#[derive(Debug, Serialize, Deserialize)]
pub struct LoanResponse {
    pub loan_id: Uuid,
    pub book_id: Uuid,
    pub book_title: Option<String>,
    pub user_id: String,
    pub borrowed_at: DateTime<Utc>,
    pub due_at: DateTime<Utc>,
    pub returned_at: Option<DateTime<Utc>>,
    pub is_returned: bool,
    pub is_overdue: bool,
}

impl From<LoanView> for LoanResponse {
    fn from(view: LoanView) -> Self {
        Self {
            loan_id: view.loan_id.value(),
            book_id: view.book_id.value(),
            book_title: view.book_title,
            user_id: view.user_id.as_str().to_string(),
            borrowed_at: view.borrowed_at,
            due_at: view.due_at,
            returned_at: view.returned_at,
            is_returned: view.is_returned,
            is_overdue: view.is_overdue,
        }
    }
}

/// 書籍の登録・更新リクエスト（POST /books, PUT /books/:id）
#[derive(Debug, Deserialize)]
pub struct BookRequest {
    pub title: String,
    pub author: String,
    pub isbn: String,
    pub total_copies: u32,
}

/// 書籍レスポンス
#[derive(Debug, Serialize, Deserialize)]
pub struct BookResponse {
    pub id: Uuid,
    pub title: String,
    pub author: String,
    pub isbn: String,
    pub total_copies: u32,
    pub available_copies: u32,
}

impl From<Book> for BookResponse {
    fn from(book: Book) -> Self {
        Self {
            id: book.book_id.value(),
            title: book.title,
            author: book.author,
            isbn: book.isbn.to_string(),
            total_copies: book.total_copies.value(),
            available_copies: book.available_copies,
        }
    }
}

/// エラーレスポンス
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            message: message.into(),
        }
    }
}
