use crate::ports::{CatalogStore, Clock, LoanStore};
use std::sync::Arc;

use super::loan::LendingLocks;

/// サービスの依存関係
///
/// 振る舞いは持たず、純粋な関数に依存関係を渡すためのデータ構造。
/// `locks` はこの依存関係を共有するすべての呼び出しで直列化スコープを共有する。
#[derive(Clone)]
pub struct ServiceDependencies {
    pub catalog_store: Arc<dyn CatalogStore>,
    pub loan_store: Arc<dyn LoanStore>,
    pub clock: Arc<dyn Clock>,
    pub locks: Arc<LendingLocks>,
}

impl ServiceDependencies {
    pub fn new(
        catalog_store: Arc<dyn CatalogStore>,
        loan_store: Arc<dyn LoanStore>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            catalog_store,
            loan_store,
            clock,
            locks: Arc::new(LendingLocks::new()),
        }
    }
}
