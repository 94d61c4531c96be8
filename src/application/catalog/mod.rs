mod catalog_service;

pub use catalog_service::{add_book, delete_book, get_book, list_books, update_book};
