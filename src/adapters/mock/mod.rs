pub mod catalog_store;
pub mod clock;
pub mod loan_store;

pub use catalog_store::FailingCatalogStore;
pub use clock::ManualClock;
pub use loan_store::{FailingLoanStore, Fault};
