use crate::application::dependencies::ServiceDependencies;
use crate::application::errors::{
    AttemptError, LendingError, Result, lost_race, retry_once_on_conflict,
};
use crate::domain::{
    CatalogError,
    book::{self, Book},
    commands::{AddBook, UpdateBook},
    value_objects::BookId,
};

/// 書籍をカタログに登録する
///
/// ビジネスルール：
/// - 入力値が妥当であること（タイトル・著者・ISBN・所蔵冊数）
/// - ISBNが他の書籍と重複しないこと
///
/// 登録直後は全冊が貸出可能。
pub async fn add_book(deps: &ServiceDependencies, cmd: AddBook) -> Result<Book> {
    let cmd = &cmd;
    retry_once_on_conflict(move || try_add_book(deps, cmd)).await
}

async fn try_add_book(
    deps: &ServiceDependencies,
    cmd: &AddBook,
) -> std::result::Result<Book, AttemptError> {
    let book = book::register_book(&cmd.title, &cmd.author, &cmd.isbn, cmd.total_copies)
        .map_err(from_catalog_error)?;

    let existing = deps
        .catalog_store
        .find_by_isbn(&book.isbn)
        .await
        .map_err(LendingError::Store)?;

    if existing.is_some() {
        return Err(LendingError::DuplicateIsbn(book.isbn.to_string()).into());
    }

    deps.catalog_store
        .insert(book.clone())
        .await
        .map_err(|e| lost_race(e, LendingError::DuplicateIsbn(book.isbn.to_string())))?;

    tracing::info!(book_id = %book.book_id, isbn = %book.isbn, "Book added");

    Ok(book)
}

/// 書籍の書誌情報と所蔵冊数を更新する
///
/// 貸出可能冊数は所蔵冊数の差分だけ増減する。
/// 貸出中の冊数を下回る所蔵冊数には変更できない。
pub async fn update_book(deps: &ServiceDependencies, cmd: UpdateBook) -> Result<Book> {
    let cmd = &cmd;
    retry_once_on_conflict(move || try_update_book(deps, cmd)).await
}

async fn try_update_book(
    deps: &ServiceDependencies,
    cmd: &UpdateBook,
) -> std::result::Result<Book, AttemptError> {
    let _book_guard = deps.locks.books.lock(cmd.book_id).await;

    let book = deps
        .catalog_store
        .get(cmd.book_id)
        .await
        .map_err(LendingError::Store)?
        .ok_or(LendingError::BookNotFound)?;

    let revised = book::revise_book(
        &book,
        &cmd.title,
        &cmd.author,
        &cmd.isbn,
        cmd.total_copies,
    )
    .map_err(from_catalog_error)?;

    // ISBNの一意性（自分自身は除く）
    let same_isbn = deps
        .catalog_store
        .find_by_isbn(&revised.isbn)
        .await
        .map_err(LendingError::Store)?;

    if same_isbn.is_some_and(|other| other.book_id != revised.book_id) {
        return Err(LendingError::DuplicateIsbn(revised.isbn.to_string()).into());
    }

    deps.catalog_store
        .update(revised.clone())
        .await
        .map_err(|e| lost_race(e, LendingError::ConcurrentUpdate))?;

    tracing::info!(
        book_id = %revised.book_id,
        total_copies = revised.total_copies.value(),
        available_copies = revised.available_copies,
        "Book updated"
    );

    Ok(Book {
        version: revised.version + 1,
        ..revised
    })
}

/// 書籍をカタログから削除する
///
/// 未返却の貸出が残っている書籍は削除できない。
/// 返却済みの貸出は書籍IDを参照したまま残る。
pub async fn delete_book(deps: &ServiceDependencies, book_id: BookId) -> Result<()> {
    let _book_guard = deps.locks.books.lock(book_id).await;

    let book = deps
        .catalog_store
        .get(book_id)
        .await
        .map_err(LendingError::Store)?
        .ok_or(LendingError::BookNotFound)?;

    let on_loan = deps
        .loan_store
        .has_active_for_book(book_id)
        .await
        .map_err(LendingError::Store)?;

    if on_loan {
        return Err(LendingError::CopiesOnLoan {
            on_loan: book.copies_on_loan(),
        });
    }

    deps.catalog_store
        .delete(book_id)
        .await
        .map_err(LendingError::Store)?;

    tracing::info!(book_id = %book_id, isbn = %book.isbn, "Book deleted");

    Ok(())
}

/// IDで書籍を取得する
pub async fn get_book(deps: &ServiceDependencies, book_id: BookId) -> Result<Book> {
    deps.catalog_store
        .get(book_id)
        .await
        .map_err(LendingError::Store)?
        .ok_or(LendingError::BookNotFound)
}

/// 全書籍を取得する
pub async fn list_books(deps: &ServiceDependencies) -> Result<Vec<Book>> {
    deps.catalog_store
        .list_all()
        .await
        .map_err(LendingError::Store)
}

fn from_catalog_error(err: CatalogError) -> LendingError {
    match err {
        CatalogError::CopiesOnLoan { on_loan } => LendingError::CopiesOnLoan { on_loan },
        CatalogError::InvalidTitle => {
            LendingError::Validation("Title must be between 1 and 50 characters".to_string())
        }
        CatalogError::InvalidAuthor => {
            LendingError::Validation("Author must be between 1 and 50 characters".to_string())
        }
        CatalogError::InvalidIsbn => LendingError::Validation("Invalid ISBN format".to_string()),
        CatalogError::InvalidTotalCopies => {
            LendingError::Validation("Total copies must be between 1 and 100".to_string())
        }
    }
}
