use crate::domain::{
    loan::Loan,
    value_objects::{BookId, LoanId, UserId},
};
use crate::ports::loan_store::LoanStore as LoanStoreTrait;
use crate::ports::store_error::{Result, StoreError};
use async_trait::async_trait;
use futures::stream::{self, BoxStream, StreamExt};
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

/// LoanStoreのインメモリ実装
///
/// 「利用者ごとに未返却は1件まで」と「返却済みは不変」を
/// PostgreSQL実装の制約と同じ規則で強制する。
#[derive(Default)]
pub struct LoanStore {
    loans: Mutex<HashMap<LoanId, Loan>>,
}

impl LoanStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn loans(&self) -> MutexGuard<'_, HashMap<LoanId, Loan>> {
        self.loans.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

fn sorted_by_borrowed_at(mut loans: Vec<Loan>) -> Vec<Loan> {
    loans.sort_by(|a, b| a.borrowed_at.cmp(&b.borrowed_at));
    loans
}

#[async_trait]
impl LoanStoreTrait for LoanStore {
    async fn get(&self, loan_id: LoanId) -> Result<Option<Loan>> {
        Ok(self.loans().get(&loan_id).cloned())
    }

    async fn find_active_by_user(&self, user_id: &UserId) -> Result<Option<Loan>> {
        Ok(self
            .loans()
            .values()
            .find(|l| &l.user_id == user_id && l.is_active())
            .cloned())
    }

    async fn find_by_user(&self, user_id: &UserId) -> Result<Vec<Loan>> {
        let loans = self
            .loans()
            .values()
            .filter(|l| &l.user_id == user_id)
            .cloned()
            .collect();
        Ok(sorted_by_borrowed_at(loans))
    }

    async fn has_active_for_book(&self, book_id: BookId) -> Result<bool> {
        Ok(self
            .loans()
            .values()
            .any(|l| l.book_id == book_id && l.is_active()))
    }

    async fn insert(&self, loan: Loan) -> Result<()> {
        let mut loans = self.loans();
        let duplicate_active = loan.is_active()
            && loans
                .values()
                .any(|l| l.user_id == loan.user_id && l.is_active());
        if loans.contains_key(&loan.loan_id) || duplicate_active {
            return Err(StoreError::Conflict);
        }
        loans.insert(loan.loan_id, loan);
        Ok(())
    }

    async fn update(&self, loan: Loan) -> Result<()> {
        let mut loans = self.loans();
        match loans.get_mut(&loan.loan_id) {
            Some(stored) if stored.is_active() => {
                *stored = loan;
                Ok(())
            }
            _ => Err(StoreError::Conflict),
        }
    }

    fn stream_all(&self) -> BoxStream<'_, Result<Loan>> {
        // ロックを保持したままストリームを返さないよう、呼び出し時点のスナップショットを配信する
        let snapshot = sorted_by_borrowed_at(self.loans().values().cloned().collect());
        stream::iter(snapshot.into_iter().map(Ok)).boxed()
    }
}
