use crate::application::{
    ServiceDependencies, catalog,
    loan::{self, LoanView},
};
use crate::domain::{
    commands::{AddBook, BorrowBook, ReturnBook, UpdateBook},
    value_objects::{BookId, LoanId, UserId},
};
use axum::{
    Json, async_trait,
    extract::{FromRequestParts, Path, State},
    http::{StatusCode, request::Parts},
};
use std::sync::Arc;
use uuid::Uuid;

use super::{
    error::ApiError,
    types::{BookRequest, BookResponse, BorrowRequest, LoanResponse},
};

// ============================================================================
// State
// ============================================================================

/// ハンドラー間で共有されるアプリケーション状態
#[derive(Clone)]
pub struct AppState {
    pub service_deps: ServiceDependencies,
}

/// 利用者IDを運ぶヘッダー
///
/// 認証は上流のゲートウェイが行い、確認済みの利用者IDをこのヘッダーで渡す。
pub const USER_ID_HEADER: &str = "x-user-id";

/// リクエストを行った利用者
#[derive(Debug, Clone)]
pub struct CurrentUser(pub UserId);

#[async_trait]
impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let user_id = parts
            .headers
            .get(USER_ID_HEADER)
            .and_then(|value| value.to_str().ok())
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .ok_or(ApiError::MissingUserId)?;

        Ok(CurrentUser(UserId::new(user_id)))
    }
}

fn to_responses(views: Vec<LoanView>) -> Json<Vec<LoanResponse>> {
    Json(views.into_iter().map(LoanResponse::from).collect())
}

// ============================================================================
// Loan handlers
// ============================================================================

/// POST /loans/borrow - 書籍を借りる
///
/// 強制されるビジネスルール:
/// - 利用者に未返却の貸出がないこと（同時に1冊まで）
/// - 書籍が存在し、貸出可能な冊数が残っていること
pub async fn borrow_book(
    State(state): State<Arc<AppState>>,
    CurrentUser(user_id): CurrentUser,
    Json(req): Json<BorrowRequest>,
) -> Result<(StatusCode, Json<LoanResponse>), ApiError> {
    let cmd = BorrowBook {
        book_id: BookId::from_uuid(req.book_id),
        user_id,
    };

    let view = loan::borrow_book(&state.service_deps, cmd).await?;

    Ok((StatusCode::CREATED, Json(LoanResponse::from(view))))
}

/// POST /loans/return/:loan_id - 書籍を返却する
///
/// 他の利用者の貸出は存在しないものとして404を返す。
pub async fn return_book(
    State(state): State<Arc<AppState>>,
    CurrentUser(user_id): CurrentUser,
    Path(loan_id): Path<Uuid>,
) -> Result<Json<LoanResponse>, ApiError> {
    let cmd = ReturnBook {
        loan_id: LoanId::from_uuid(loan_id),
        user_id,
    };

    let view = loan::return_book(&state.service_deps, cmd).await?;

    Ok(Json(LoanResponse::from(view)))
}

/// GET /loans/my-loans - 自分の貸出一覧（返却済みを含む）
pub async fn my_loans(
    State(state): State<Arc<AppState>>,
    CurrentUser(user_id): CurrentUser,
) -> Result<Json<Vec<LoanResponse>>, ApiError> {
    let views = loan::list_user_loans(&state.service_deps, &user_id).await?;
    Ok(to_responses(views))
}

/// GET /loans/all - 全貸出の一覧
pub async fn all_loans(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<LoanResponse>>, ApiError> {
    let views = loan::list_all_loans(&state.service_deps).await?;
    Ok(to_responses(views))
}

/// GET /loans/overdue - 延滞中の貸出の一覧
pub async fn overdue_loans(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<LoanResponse>>, ApiError> {
    let views = loan::list_overdue_loans(&state.service_deps).await?;
    Ok(to_responses(views))
}

// ============================================================================
// Book handlers
// ============================================================================

/// GET /books - 書籍一覧
pub async fn list_books(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<BookResponse>>, ApiError> {
    let books = catalog::list_books(&state.service_deps).await?;
    Ok(Json(books.into_iter().map(BookResponse::from).collect()))
}

/// GET /books/:id - 書籍詳細
pub async fn get_book(
    State(state): State<Arc<AppState>>,
    Path(book_id): Path<Uuid>,
) -> Result<Json<BookResponse>, ApiError> {
    let book = catalog::get_book(&state.service_deps, BookId::from_uuid(book_id)).await?;
    Ok(Json(BookResponse::from(book)))
}

/// POST /books - 書籍を登録
pub async fn add_book(
    State(state): State<Arc<AppState>>,
    Json(req): Json<BookRequest>,
) -> Result<(StatusCode, Json<BookResponse>), ApiError> {
    let cmd = AddBook {
        title: req.title,
        author: req.author,
        isbn: req.isbn,
        total_copies: req.total_copies,
    };

    let book = catalog::add_book(&state.service_deps, cmd).await?;

    Ok((StatusCode::CREATED, Json(BookResponse::from(book))))
}

/// PUT /books/:id - 書籍を更新
pub async fn update_book(
    State(state): State<Arc<AppState>>,
    Path(book_id): Path<Uuid>,
    Json(req): Json<BookRequest>,
) -> Result<Json<BookResponse>, ApiError> {
    let cmd = UpdateBook {
        book_id: BookId::from_uuid(book_id),
        title: req.title,
        author: req.author,
        isbn: req.isbn,
        total_copies: req.total_copies,
    };

    let book = catalog::update_book(&state.service_deps, cmd).await?;

    Ok(Json(BookResponse::from(book)))
}

/// DELETE /books/:id - 書籍を削除
pub async fn delete_book(
    State(state): State<Arc<AppState>>,
    Path(book_id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    catalog::delete_book(&state.service_deps, BookId::from_uuid(book_id)).await?;
    Ok(StatusCode::NO_CONTENT)
}
