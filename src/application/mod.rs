pub mod catalog;
pub mod dependencies;
pub mod errors;
pub mod loan;

pub use dependencies::ServiceDependencies;
pub use errors::{ErrorKind, LendingError, Result};
