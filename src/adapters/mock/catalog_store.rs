use crate::domain::{
    book::Book,
    value_objects::{BookId, Isbn},
};
use crate::ports::catalog_store::CatalogStore as CatalogStoreTrait;
use crate::ports::store_error::Result;
use async_trait::async_trait;
use std::sync::{Arc, Mutex};

use super::loan_store::Fault;

/// 書き込みに障害を注入できるCatalogStoreのモック実装
///
/// 読み取りはすべて内側のストアに委譲する。
pub struct FailingCatalogStore {
    inner: Arc<dyn CatalogStoreTrait>,
    update_faults: Mutex<Vec<Fault>>,
}

impl FailingCatalogStore {
    pub fn new(inner: Arc<dyn CatalogStoreTrait>) -> Self {
        Self {
            inner,
            update_faults: Mutex::new(Vec::new()),
        }
    }

    /// 次のupdateで障害を起こす
    pub fn fail_next_update(&self, fault: Fault) {
        self.update_faults.lock().unwrap().insert(0, fault);
    }
}

#[async_trait]
impl CatalogStoreTrait for FailingCatalogStore {
    async fn get(&self, book_id: BookId) -> Result<Option<Book>> {
        self.inner.get(book_id).await
    }

    async fn find_by_isbn(&self, isbn: &Isbn) -> Result<Option<Book>> {
        self.inner.find_by_isbn(isbn).await
    }

    async fn list_all(&self) -> Result<Vec<Book>> {
        self.inner.list_all().await
    }

    async fn insert(&self, book: Book) -> Result<()> {
        self.inner.insert(book).await
    }

    async fn update(&self, book: Book) -> Result<()> {
        let fault = self.update_faults.lock().unwrap().pop();
        match fault {
            Some(fault) => Err(fault.into_error()),
            None => self.inner.update(book).await,
        }
    }

    async fn delete(&self, book_id: BookId) -> Result<()> {
        self.inner.delete(book_id).await
    }
}
