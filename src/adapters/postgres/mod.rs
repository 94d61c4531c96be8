pub mod catalog_store;
pub mod loan_store;

use crate::ports::store_error::StoreError;

// パブリックに型を再エクスポート
pub use catalog_store::CatalogStore as PostgresCatalogStore;
pub use loan_store::LoanStore as PostgresLoanStore;

/// sqlxのエラーをストア層のエラーに変換する
///
/// 一意制約・CHECK制約の違反は並行書き込みに負けた結果として扱う。
impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db_err) = &err {
            if db_err.is_unique_violation() || db_err.is_check_violation() {
                return StoreError::Conflict;
            }
        }
        StoreError::Backend(Box::new(err))
    }
}

/// 保存済みデータの不正を表すエラーを作る
pub(super) fn invalid_data(message: String) -> StoreError {
    StoreError::Backend(Box::new(std::io::Error::new(
        std::io::ErrorKind::InvalidData,
        message,
    )))
}
