use crate::application::{ErrorKind, LendingError};
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};

use super::types::ErrorResponse;

/// API層のエラー型
///
/// アプリケーション層のエラーをラップし、HTTPレスポンスへのマッピングを提供する。
/// ステータスコードはエラーの種別（`ErrorKind`）だけで決まる。
#[derive(Debug)]
pub enum ApiError {
    Lending(LendingError),
    /// `x-user-id` ヘッダーがない、または空
    MissingUserId,
}

impl From<LendingError> for ApiError {
    fn from(err: LendingError) -> Self {
        ApiError::Lending(err)
    }
}

fn status_for(kind: ErrorKind) -> StatusCode {
    match kind {
        ErrorKind::NotFound => StatusCode::NOT_FOUND,
        ErrorKind::Conflict | ErrorKind::ConstraintViolation => StatusCode::CONFLICT,
        ErrorKind::IllegalState => StatusCode::UNPROCESSABLE_ENTITY,
        ErrorKind::Validation => StatusCode::BAD_REQUEST,
        ErrorKind::Infrastructure => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn error_code(err: &LendingError) -> &'static str {
    match err {
        LendingError::BookNotFound => "BOOK_NOT_FOUND",
        LendingError::LoanNotFound => "LOAN_NOT_FOUND",
        LendingError::BookUnavailable => "BOOK_NOT_AVAILABLE",
        LendingError::ActiveLoanExists => "ACTIVE_LOAN_EXISTS",
        LendingError::AlreadyReturned => "ALREADY_RETURNED",
        LendingError::InventoryMismatch => "INVENTORY_MISMATCH",
        LendingError::DuplicateIsbn(_) => "DUPLICATE_ISBN",
        LendingError::Validation(_) => "VALIDATION_ERROR",
        LendingError::CopiesOnLoan { .. } => "COPIES_ON_LOAN",
        LendingError::ConcurrentUpdate => "CONCURRENT_UPDATE",
        LendingError::Store(_) => "INTERNAL_ERROR",
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            ApiError::MissingUserId => (
                StatusCode::BAD_REQUEST,
                ErrorResponse::new("MISSING_USER_ID", "x-user-id header is required"),
            ),
            ApiError::Lending(err) => {
                let status = status_for(err.kind());
                let message = if status == StatusCode::INTERNAL_SERVER_ERROR {
                    // 内部エラーの詳細はログに記録し、クライアントには一般的なメッセージのみを返す
                    tracing::error!(error = ?err, "Internal error");
                    "An unexpected error occurred".to_string()
                } else {
                    err.to_string()
                };
                (status, ErrorResponse::new(error_code(&err), message))
            }
        };

        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::StoreError;

    #[test]
    fn test_status_follows_error_kind() {
        let cases = [
            (LendingError::LoanNotFound, StatusCode::NOT_FOUND),
            (LendingError::BookUnavailable, StatusCode::CONFLICT),
            (LendingError::ActiveLoanExists, StatusCode::CONFLICT),
            (
                LendingError::AlreadyReturned,
                StatusCode::UNPROCESSABLE_ENTITY,
            ),
            (
                LendingError::DuplicateIsbn("0441013597".into()),
                StatusCode::CONFLICT,
            ),
            (
                LendingError::Validation("bad".into()),
                StatusCode::BAD_REQUEST,
            ),
            (
                LendingError::Store(StoreError::Conflict),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];

        for (err, expected) in cases {
            let response = ApiError::from(err).into_response();
            assert_eq!(response.status(), expected);
        }
    }

    #[test]
    fn test_missing_user_id_is_bad_request() {
        let response = ApiError::MissingUserId.into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
