mod keyed_locks;
mod loan_service;
mod loan_view;
mod overdue_detection;

pub use keyed_locks::{KeyedLocks, LendingLocks};
pub use loan_service::{
    borrow_book, list_all_loans, list_overdue_loans, list_user_loans, return_book, scan_overdue,
};
pub use loan_view::LoanView;
pub use overdue_detection::{OverdueReport, detect_overdue_loans, run_overdue_sweeper};
