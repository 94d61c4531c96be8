pub mod catalog_store;
pub mod loan_store;

pub use catalog_store::CatalogStore as InMemoryCatalogStore;
pub use loan_store::LoanStore as InMemoryLoanStore;
