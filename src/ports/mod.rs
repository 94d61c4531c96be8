pub mod catalog_store;
pub mod clock;
pub mod loan_store;
pub mod store_error;

pub use catalog_store::CatalogStore;
pub use clock::Clock;
pub use loan_store::LoanStore;
pub use store_error::StoreError;
