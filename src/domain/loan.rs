use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use super::{BookBorrowed, BookId, BookReturned, LoanBecameOverdue, LoanId, ReturnError, UserId};

/// 貸出期間（日数）
pub const LOAN_PERIOD_DAYS: i64 = 7;

/// 貸出の状態
///
/// Active → Returned の一方向のみ。Returnedが終端。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoanState {
    Active,
    Returned,
}

/// Loan集約 - 1冊の書籍の1回の貸出
///
/// 書籍・利用者への参照はIDのみ。書籍タイトルなどの表示用情報は
/// 読み出し時にエンジンが解決する。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Loan {
    pub loan_id: LoanId,
    pub book_id: BookId,
    pub user_id: UserId,
    pub borrowed_at: DateTime<Utc>,
    pub due_at: DateTime<Utc>,
    pub returned_at: Option<DateTime<Utc>>,
}

impl Loan {
    pub fn state(&self) -> LoanState {
        match self.returned_at {
            Some(_) => LoanState::Returned,
            None => LoanState::Active,
        }
    }

    pub fn is_returned(&self) -> bool {
        self.returned_at.is_some()
    }

    pub fn is_active(&self) -> bool {
        self.returned_at.is_none()
    }

    pub fn is_overdue(&self, now: DateTime<Utc>) -> bool {
        is_overdue(self, now)
    }
}

/// 純粋関数：書籍を貸し出す
///
/// ビジネスルール：
/// - 貸出期間は7日間
/// - 返却日時は未設定
///
/// 在庫や利用者の貸出状況の確認は呼び出し側の責務。
/// 副作用なし。新しいLoanとイベントを返す。
pub fn borrow_book(
    book_id: BookId,
    user_id: UserId,
    borrowed_at: DateTime<Utc>,
) -> (Loan, BookBorrowed) {
    let loan_id = LoanId::new();
    let due_at = borrowed_at + Duration::days(LOAN_PERIOD_DAYS);

    let loan = Loan {
        loan_id,
        book_id,
        user_id: user_id.clone(),
        borrowed_at,
        due_at,
        returned_at: None,
    };

    let event = BookBorrowed {
        loan_id,
        book_id,
        user_id,
        borrowed_at,
        due_at,
    };

    (loan, event)
}

/// 純粋関数：書籍を返却する
///
/// ビジネスルール：
/// - 返却済みの貸出は再返却できない
/// - 延滞していても返却は受け付ける
pub fn return_book(
    loan: &Loan,
    returned_at: DateTime<Utc>,
) -> Result<(Loan, BookReturned), ReturnError> {
    if loan.is_returned() {
        return Err(ReturnError::AlreadyReturned);
    }

    let was_overdue = returned_at > loan.due_at;

    let new_loan = Loan {
        returned_at: Some(returned_at),
        ..loan.clone()
    };

    let event = BookReturned {
        loan_id: loan.loan_id,
        book_id: loan.book_id,
        user_id: loan.user_id.clone(),
        returned_at,
        was_overdue,
    };

    Ok((new_loan, event))
}

/// 純粋関数：延滞判定
///
/// 未返却かつ返却期限を過ぎている場合のみ延滞。
pub fn is_overdue(loan: &Loan, now: DateTime<Utc>) -> bool {
    loan.is_active() && loan.due_at < now
}

/// 純粋関数：延滞の事実を記録する
///
/// 延滞していない貸出には`None`を返す。
pub fn detect_overdue(loan: &Loan, now: DateTime<Utc>) -> Option<LoanBecameOverdue> {
    if !is_overdue(loan, now) {
        return None;
    }

    Some(LoanBecameOverdue {
        loan_id: loan.loan_id,
        book_id: loan.book_id,
        user_id: loan.user_id.clone(),
        due_at: loan.due_at,
        detected_at: now,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 1, 1, 10, 0, 0).unwrap()
    }

    #[test]
    fn test_borrow_book_sets_seven_day_due_date() {
        let book_id = BookId::new();
        let user_id = UserId::new("member-1");

        let (loan, event) = borrow_book(book_id, user_id.clone(), t0());

        assert_eq!(loan.borrowed_at, t0());
        assert_eq!(loan.due_at, t0() + Duration::days(7));
        assert_eq!(loan.returned_at, None);
        assert_eq!(loan.state(), LoanState::Active);
        assert_eq!(loan.book_id, book_id);
        assert_eq!(loan.user_id, user_id);

        assert_eq!(event.loan_id, loan.loan_id);
        assert_eq!(event.due_at, loan.due_at);
    }

    #[test]
    fn test_return_book_success() {
        let (loan, _) = borrow_book(BookId::new(), UserId::new("u"), t0());
        let returned_at = t0() + Duration::days(3);

        let (returned, event) = return_book(&loan, returned_at).unwrap();

        assert_eq!(returned.returned_at, Some(returned_at));
        assert_eq!(returned.state(), LoanState::Returned);
        assert_eq!(returned.loan_id, loan.loan_id);
        assert!(!event.was_overdue);
    }

    #[test]
    fn test_return_book_detects_late_return() {
        let (loan, _) = borrow_book(BookId::new(), UserId::new("u"), t0());

        let (_, event) = return_book(&loan, t0() + Duration::days(10)).unwrap();
        assert!(event.was_overdue);
    }

    #[test]
    fn test_return_book_fails_when_already_returned() {
        let (loan, _) = borrow_book(BookId::new(), UserId::new("u"), t0());
        let (loan, _) = return_book(&loan, t0() + Duration::days(1)).unwrap();

        let result = return_book(&loan, t0() + Duration::days(2));
        assert_eq!(result.unwrap_err(), ReturnError::AlreadyReturned);
    }

    #[test]
    fn test_is_overdue_boundaries() {
        let (loan, _) = borrow_book(BookId::new(), UserId::new("u"), t0());

        assert!(!is_overdue(&loan, t0() + Duration::days(6)));
        // 期限ちょうどは延滞ではない
        assert!(!is_overdue(&loan, loan.due_at));
        assert!(is_overdue(&loan, t0() + Duration::days(8)));
    }

    #[test]
    fn test_is_overdue_false_when_returned() {
        let (loan, _) = borrow_book(BookId::new(), UserId::new("u"), t0());
        let (loan, _) = return_book(&loan, t0() + Duration::days(9)).unwrap();

        assert!(!loan.is_overdue(t0() + Duration::days(30)));
    }

    #[test]
    fn test_detect_overdue_builds_event() {
        let (loan, _) = borrow_book(BookId::new(), UserId::new("u"), t0());
        let now = t0() + Duration::days(8);

        let event = detect_overdue(&loan, now).unwrap();
        assert_eq!(event.loan_id, loan.loan_id);
        assert_eq!(event.due_at, loan.due_at);
        assert_eq!(event.detected_at, now);

        assert!(detect_overdue(&loan, t0() + Duration::days(1)).is_none());
    }
}
