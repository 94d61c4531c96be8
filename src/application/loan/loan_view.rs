use crate::domain::{
    loan::Loan,
    value_objects::{BookId, LoanId, UserId},
};
use chrono::{DateTime, Utc};

/// 貸出ビュー
///
/// 外部に返す表示用の貸出。書籍タイトルはエンジンが書籍IDから解決し、
/// 書籍が削除済みの場合は`None`になる。
/// 延滞フラグは組み立て時点の時計で計算する。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoanView {
    pub loan_id: LoanId,
    pub book_id: BookId,
    pub book_title: Option<String>,
    pub user_id: UserId,
    pub borrowed_at: DateTime<Utc>,
    pub due_at: DateTime<Utc>,
    pub returned_at: Option<DateTime<Utc>>,
    pub is_returned: bool,
    pub is_overdue: bool,
}

/// 貸出とその書籍タイトルから貸出ビューを構築する
pub(crate) fn build_loan_view(loan: &Loan, book_title: Option<&str>, now: DateTime<Utc>) -> LoanView {
    LoanView {
        loan_id: loan.loan_id,
        book_id: loan.book_id,
        book_title: book_title.map(str::to_string),
        user_id: loan.user_id.clone(),
        borrowed_at: loan.borrowed_at,
        due_at: loan.due_at,
        returned_at: loan.returned_at,
        is_returned: loan.is_returned(),
        is_overdue: loan.is_overdue(now),
    }
}
