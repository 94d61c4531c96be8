use axum::{
    Router,
    routing::{get, post},
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use super::handlers::{
    AppState, add_book, all_loans, borrow_book, delete_book, get_book, list_books, my_loans,
    overdue_loans, return_book, update_book,
};

/// Creates the API router with all lending and catalog endpoints
///
/// Loan endpoints (require the `x-user-id` header where a borrower is involved):
/// - POST /loans/borrow - Borrow a book
/// - POST /loans/return/:loan_id - Return a borrowed book
/// - GET /loans/my-loans - Loans of the requesting user
/// - GET /loans/all - Every loan
/// - GET /loans/overdue - Loans past their due date
///
/// Catalog endpoints:
/// - GET /books, POST /books
/// - GET /books/:id, PUT /books/:id, DELETE /books/:id
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/loans/borrow", post(borrow_book))
        .route("/loans/return/:loan_id", post(return_book))
        .route("/loans/my-loans", get(my_loans))
        .route("/loans/all", get(all_loans))
        .route("/loans/overdue", get(overdue_loans))
        .route("/books", get(list_books).post(add_book))
        .route(
            "/books/:id",
            get(get_book).put(update_book).delete(delete_book),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Health check endpoint
async fn health_check() -> &'static str {
    "OK"
}
