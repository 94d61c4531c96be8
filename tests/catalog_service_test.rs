use book_lending::application::catalog::{
    add_book, delete_book, get_book, list_books, update_book,
};
use book_lending::application::loan::{borrow_book, list_all_loans, return_book};
use book_lending::application::{ErrorKind, LendingError};
use book_lending::domain::book::Book;
use book_lending::domain::commands::{AddBook, BorrowBook, ReturnBook, UpdateBook};
use book_lending::domain::value_objects::{BookId, UserId};

mod common;

use common::{seed_book, setup};

fn add_cmd(title: &str, isbn: &str, total_copies: u32) -> AddBook {
    AddBook {
        title: title.to_string(),
        author: "Frank Herbert".to_string(),
        isbn: isbn.to_string(),
        total_copies,
    }
}

fn update_cmd(book: &Book, total_copies: u32) -> UpdateBook {
    UpdateBook {
        book_id: book.book_id,
        title: book.title.clone(),
        author: book.author.clone(),
        isbn: book.isbn.to_string(),
        total_copies,
    }
}

async fn lend(deps: &book_lending::application::ServiceDependencies, book_id: BookId, user: &str) {
    borrow_book(
        deps,
        BorrowBook {
            book_id,
            user_id: UserId::new(user),
        },
    )
    .await
    .unwrap();
}

#[tokio::test]
async fn test_add_book_normalizes_and_is_fully_available() {
    let env = setup();

    let book = add_book(&env.deps, add_cmd("  Dune  ", "ISBN 978-0-441-01359-3", 4))
        .await
        .unwrap();

    assert_eq!(book.title, "Dune");
    assert_eq!(book.isbn.to_string(), "9780441013593");
    assert_eq!(book.total_copies.value(), 4);
    assert_eq!(book.available_copies, 4);

    let stored = get_book(&env.deps, book.book_id).await.unwrap();
    assert_eq!(stored, book);
    assert_eq!(list_books(&env.deps).await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_add_book_rejects_duplicate_isbn() {
    let env = setup();
    add_book(&env.deps, add_cmd("Dune", "9780441013593", 1))
        .await
        .unwrap();

    // 表記揺れも同じISBNとして扱う
    let err = add_book(&env.deps, add_cmd("Dune (2nd)", "978-0441013593", 1))
        .await
        .unwrap_err();

    assert!(matches!(err, LendingError::DuplicateIsbn(_)));
    assert_eq!(err.kind(), ErrorKind::ConstraintViolation);
    assert_eq!(list_books(&env.deps).await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_add_book_validates_input() {
    let env = setup();

    let cases = [
        add_cmd("", "9780441013593", 1),
        add_cmd(&"x".repeat(51), "9780441013593", 1),
        add_cmd("Dune", "12345", 1),
        add_cmd("Dune", "9780441013593", 0),
        add_cmd("Dune", "9780441013593", 101),
    ];

    for cmd in cases {
        let err = add_book(&env.deps, cmd).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation, "{err}");
    }
    assert!(list_books(&env.deps).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_update_book_adjusts_available_by_delta() {
    let env = setup();
    let book = seed_book(&env.deps, "Dune", 5).await;
    lend(&env.deps, book.book_id, "alice").await;
    lend(&env.deps, book.book_id, "bob").await;

    let current = get_book(&env.deps, book.book_id).await.unwrap();
    let grown = update_book(&env.deps, update_cmd(&current, 8))
        .await
        .unwrap();
    assert_eq!(grown.total_copies.value(), 8);
    assert_eq!(grown.available_copies, 6);

    let shrunk = update_book(&env.deps, update_cmd(&grown, 2))
        .await
        .unwrap();
    assert_eq!(shrunk.available_copies, 0);

    let stored = get_book(&env.deps, book.book_id).await.unwrap();
    assert_eq!(stored, shrunk);
}

#[tokio::test]
async fn test_update_book_rejects_total_below_copies_on_loan() {
    let env = setup();
    let book = seed_book(&env.deps, "Dune", 3).await;
    lend(&env.deps, book.book_id, "alice").await;
    lend(&env.deps, book.book_id, "bob").await;

    let err = update_book(&env.deps, update_cmd(&book, 1))
        .await
        .unwrap_err();

    assert!(matches!(err, LendingError::CopiesOnLoan { on_loan: 2 }));
    assert_eq!(err.kind(), ErrorKind::Conflict);
    assert_eq!(get_book(&env.deps, book.book_id).await.unwrap().total_copies.value(), 3);
}

#[tokio::test]
async fn test_update_book_isbn_uniqueness_excludes_itself() {
    let env = setup();
    let dune = add_book(&env.deps, add_cmd("Dune", "9780441013593", 1))
        .await
        .unwrap();
    let emma = add_book(&env.deps, add_cmd("Emma", "0141439580", 1))
        .await
        .unwrap();

    // 自分のISBNのままなら更新できる
    let mut cmd = update_cmd(&dune, 2);
    cmd.title = "Dune Messiah".to_string();
    let updated = update_book(&env.deps, cmd).await.unwrap();
    assert_eq!(updated.title, "Dune Messiah");

    let mut cmd = update_cmd(&emma, 1);
    cmd.isbn = "978-0441013593".to_string();
    let err = update_book(&env.deps, cmd).await.unwrap_err();
    assert!(matches!(err, LendingError::DuplicateIsbn(_)));
}

#[tokio::test]
async fn test_update_unknown_book_is_not_found() {
    let env = setup();
    let book = seed_book(&env.deps, "Dune", 1).await;

    let mut cmd = update_cmd(&book, 1);
    cmd.book_id = BookId::new();

    let err = update_book(&env.deps, cmd).await.unwrap_err();
    assert!(matches!(err, LendingError::BookNotFound));
}

#[tokio::test]
async fn test_delete_book_blocked_while_on_loan() {
    let env = setup();
    let book = seed_book(&env.deps, "Dune", 2).await;
    lend(&env.deps, book.book_id, "alice").await;

    let err = delete_book(&env.deps, book.book_id).await.unwrap_err();
    assert!(matches!(err, LendingError::CopiesOnLoan { on_loan: 1 }));

    let loan = list_all_loans(&env.deps).await.unwrap().remove(0);
    return_book(
        &env.deps,
        ReturnBook {
            loan_id: loan.loan_id,
            user_id: UserId::new("alice"),
        },
    )
    .await
    .unwrap();

    delete_book(&env.deps, book.book_id).await.unwrap();

    let err = get_book(&env.deps, book.book_id).await.unwrap_err();
    assert!(matches!(err, LendingError::BookNotFound));

    // 返却済みの貸出は残り、タイトルは解決できない
    let loans = list_all_loans(&env.deps).await.unwrap();
    assert_eq!(loans.len(), 1);
    assert_eq!(loans[0].book_title, None);

    let err = delete_book(&env.deps, book.book_id).await.unwrap_err();
    assert!(matches!(err, LendingError::BookNotFound));
}
