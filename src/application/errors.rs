use crate::ports::store_error::StoreError;
use std::future::Future;
use thiserror::Error;

/// 貸出・カタログ管理アプリケーション層のエラー
#[derive(Debug, Error)]
pub enum LendingError {
    /// 書籍が存在しない
    #[error("Book not found")]
    BookNotFound,

    /// 貸出が存在しない、または要求した利用者の貸出ではない
    #[error("Loan not found")]
    LoanNotFound,

    /// 貸出可能な冊数が0
    #[error("Book is not available for borrowing")]
    BookUnavailable,

    /// 利用者が既に未返却の貸出を持っている（同時に1冊まで）
    #[error("User already has a book on loan")]
    ActiveLoanExists,

    /// 既に返却済み
    #[error("Book has already been returned")]
    AlreadyReturned,

    /// 返却先の書籍の貸出可能冊数が既に所蔵冊数に達している
    #[error("Inventory mismatch: every copy of the book is already on the shelf")]
    InventoryMismatch,

    /// ISBNが他の書籍と重複している
    #[error("A book with ISBN '{0}' already exists")]
    DuplicateIsbn(String),

    /// 入力値が不正
    #[error("Invalid book data: {0}")]
    Validation(String),

    /// 貸出中の冊数が操作を妨げている
    #[error("{on_loan} copies of the book are on loan")]
    CopiesOnLoan { on_loan: u32 },

    /// 再試行しても並行更新に負けた
    #[error("Book was modified concurrently")]
    ConcurrentUpdate,

    /// ストアのエラー
    #[error("Store error")]
    Store(#[source] StoreError),
}

/// 外部に公開するエラーの種別
///
/// API層はメッセージではなくこの種別でレスポンスを選ぶ。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    NotFound,
    Conflict,
    IllegalState,
    ConstraintViolation,
    Validation,
    Infrastructure,
}

impl LendingError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            LendingError::BookNotFound | LendingError::LoanNotFound => ErrorKind::NotFound,
            LendingError::BookUnavailable
            | LendingError::ActiveLoanExists
            | LendingError::CopiesOnLoan { .. }
            | LendingError::ConcurrentUpdate => ErrorKind::Conflict,
            LendingError::AlreadyReturned | LendingError::InventoryMismatch => {
                ErrorKind::IllegalState
            }
            LendingError::DuplicateIsbn(_) => ErrorKind::ConstraintViolation,
            LendingError::Validation(_) => ErrorKind::Validation,
            LendingError::Store(_) => ErrorKind::Infrastructure,
        }
    }
}

/// アプリケーション層の Result型
pub type Result<T> = std::result::Result<T, LendingError>;

/// 1回の試行の失敗
pub(crate) enum AttemptError {
    /// 並行する書き込みに負けた。再試行で解消しうる
    LostRace(LendingError),
    /// 再試行しても結果は変わらない
    Failed(LendingError),
}

impl From<LendingError> for AttemptError {
    fn from(err: LendingError) -> Self {
        AttemptError::Failed(err)
    }
}

/// 書き込み時のストアエラーを分類する
///
/// `StoreError::Conflict` は前提条件の失敗と同じドメインエラー
/// `on_conflict` として扱い、再試行の対象にする。
pub(crate) fn lost_race(err: StoreError, on_conflict: LendingError) -> AttemptError {
    match err {
        StoreError::Conflict => AttemptError::LostRace(on_conflict),
        other => AttemptError::Failed(LendingError::Store(other)),
    }
}

/// 競合に負けた場合に限り、操作全体を1回だけやり直す
///
/// 2回目も負けた場合はそのドメインエラーを返す。
pub(crate) async fn retry_once_on_conflict<T, F, Fut>(mut attempt: F) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = std::result::Result<T, AttemptError>>,
{
    match attempt().await {
        Ok(value) => Ok(value),
        Err(AttemptError::Failed(err)) => Err(err),
        Err(AttemptError::LostRace(err)) => {
            tracing::warn!(error = %err, "Lost a concurrent write, retrying once");
            match attempt().await {
                Ok(value) => Ok(value),
                Err(AttemptError::Failed(err) | AttemptError::LostRace(err)) => Err(err),
            }
        }
    }
}
