use crate::domain::{
    loan::Loan,
    value_objects::{BookId, LoanId, UserId},
};
use crate::ports::loan_store::LoanStore as LoanStoreTrait;
use crate::ports::store_error::{Result, StoreError};
use async_trait::async_trait;
use futures::stream::BoxStream;
use std::sync::{Arc, Mutex};

/// 注入する障害の種類
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fault {
    /// 並行書き込みに負けたことにする
    Conflict,
    /// バックエンド障害
    Backend,
}

impl Fault {
    pub(super) fn into_error(self) -> StoreError {
        match self {
            Fault::Conflict => StoreError::Conflict,
            Fault::Backend => StoreError::Backend("injected backend failure".into()),
        }
    }
}

/// 書き込みに障害を注入できるLoanStoreのモック実装
///
/// 読み取りはすべて内側のストアに委譲する。
/// 予約した障害は次の書き込みから順に1回ずつ消費される。
pub struct FailingLoanStore {
    inner: Arc<dyn LoanStoreTrait>,
    insert_faults: Mutex<Vec<Fault>>,
    update_faults: Mutex<Vec<Fault>>,
}

impl FailingLoanStore {
    pub fn new(inner: Arc<dyn LoanStoreTrait>) -> Self {
        Self {
            inner,
            insert_faults: Mutex::new(Vec::new()),
            update_faults: Mutex::new(Vec::new()),
        }
    }

    /// 次のinsertで障害を起こす
    pub fn fail_next_insert(&self, fault: Fault) {
        self.insert_faults.lock().unwrap().insert(0, fault);
    }

    /// 次のupdateで障害を起こす
    pub fn fail_next_update(&self, fault: Fault) {
        self.update_faults.lock().unwrap().insert(0, fault);
    }
}

#[async_trait]
impl LoanStoreTrait for FailingLoanStore {
    async fn get(&self, loan_id: LoanId) -> Result<Option<Loan>> {
        self.inner.get(loan_id).await
    }

    async fn find_active_by_user(&self, user_id: &UserId) -> Result<Option<Loan>> {
        self.inner.find_active_by_user(user_id).await
    }

    async fn find_by_user(&self, user_id: &UserId) -> Result<Vec<Loan>> {
        self.inner.find_by_user(user_id).await
    }

    async fn has_active_for_book(&self, book_id: BookId) -> Result<bool> {
        self.inner.has_active_for_book(book_id).await
    }

    async fn insert(&self, loan: Loan) -> Result<()> {
        let fault = self.insert_faults.lock().unwrap().pop();
        match fault {
            Some(fault) => Err(fault.into_error()),
            None => self.inner.insert(loan).await,
        }
    }

    async fn update(&self, loan: Loan) -> Result<()> {
        let fault = self.update_faults.lock().unwrap().pop();
        match fault {
            Some(fault) => Err(fault.into_error()),
            None => self.inner.update(loan).await,
        }
    }

    fn stream_all(&self) -> BoxStream<'_, Result<Loan>> {
        self.inner.stream_all()
    }
}
