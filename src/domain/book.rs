use serde::{Deserialize, Serialize};

use super::{BookId, BorrowError, CatalogError, Isbn, ReturnError, TotalCopies};

/// タイトル・著者の最大文字数
pub const MAX_TEXT_LENGTH: usize = 50;

/// Book集約 - カタログ上の1タイトルとその所蔵冊数
///
/// 不変条件：`0 <= available_copies <= total_copies`
///
/// `version` は楽観的排他制御のトークン。ストアは保存済みの版と一致する
/// 場合のみ更新を受け付け、更新のたびに1つ進める。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Book {
    pub book_id: BookId,
    pub title: String,
    pub author: String,
    pub isbn: Isbn,
    pub total_copies: TotalCopies,
    pub available_copies: u32,
    pub version: i64,
}

impl Book {
    pub fn is_available(&self) -> bool {
        self.available_copies > 0
    }

    /// 貸出中の冊数
    pub fn copies_on_loan(&self) -> u32 {
        self.total_copies.value().saturating_sub(self.available_copies)
    }
}

fn validate_text(value: &str) -> Option<String> {
    let trimmed = value.trim();
    let length = trimmed.chars().count();
    if length == 0 || length > MAX_TEXT_LENGTH {
        return None;
    }
    Some(trimmed.to_string())
}

/// 純粋関数：書籍を登録する
///
/// ビジネスルール：
/// - タイトル・著者は1〜50文字
/// - ISBNはISBN-10またはISBN-13
/// - 所蔵冊数は1〜100
/// - 登録直後は全冊が貸出可能
pub fn register_book(
    title: &str,
    author: &str,
    isbn: &str,
    total_copies: u32,
) -> Result<Book, CatalogError> {
    let title = validate_text(title).ok_or(CatalogError::InvalidTitle)?;
    let author = validate_text(author).ok_or(CatalogError::InvalidAuthor)?;
    let isbn = Isbn::parse(isbn)?;
    let total_copies = TotalCopies::try_from(total_copies)?;

    Ok(Book {
        book_id: BookId::new(),
        title,
        author,
        isbn,
        total_copies,
        available_copies: total_copies.value(),
        version: 0,
    })
}

/// 純粋関数：書誌情報と所蔵冊数を改訂する
///
/// 貸出可能冊数は所蔵冊数の差分だけ増減する
/// （`available += new_total - old_total`）。
/// 貸出中の冊数を下回る所蔵冊数は受け付けない。
pub fn revise_book(
    book: &Book,
    title: &str,
    author: &str,
    isbn: &str,
    total_copies: u32,
) -> Result<Book, CatalogError> {
    let title = validate_text(title).ok_or(CatalogError::InvalidTitle)?;
    let author = validate_text(author).ok_or(CatalogError::InvalidAuthor)?;
    let isbn = Isbn::parse(isbn)?;
    let total_copies = TotalCopies::try_from(total_copies)?;

    let on_loan = book.copies_on_loan();
    if total_copies.value() < on_loan {
        return Err(CatalogError::CopiesOnLoan { on_loan });
    }

    Ok(Book {
        title,
        author,
        isbn,
        total_copies,
        available_copies: total_copies.value() - on_loan,
        ..book.clone()
    })
}

/// 純粋関数：1冊を貸出に回す
pub fn check_out_copy(book: &Book) -> Result<Book, BorrowError> {
    if !book.is_available() {
        return Err(BorrowError::NoCopiesAvailable);
    }

    Ok(Book {
        available_copies: book.available_copies - 1,
        ..book.clone()
    })
}

/// 純粋関数：返却された1冊を書架に戻す
pub fn restock_copy(book: &Book) -> Result<Book, ReturnError> {
    if book.available_copies >= book.total_copies.value() {
        return Err(ReturnError::AllCopiesOnShelf);
    }

    Ok(Book {
        available_copies: book.available_copies + 1,
        ..book.clone()
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_book(total: u32) -> Book {
        register_book("The Rust Programming Language", "Klabnik", "9781718503106", total).unwrap()
    }

    #[test]
    fn test_register_book_starts_fully_available() {
        let book = sample_book(5);
        assert_eq!(book.total_copies.value(), 5);
        assert_eq!(book.available_copies, 5);
        assert_eq!(book.version, 0);
        assert!(book.is_available());
    }

    #[test]
    fn test_register_book_trims_text() {
        let book = register_book("  Dune ", " Herbert", "0441013597", 1).unwrap();
        assert_eq!(book.title, "Dune");
        assert_eq!(book.author, "Herbert");
    }

    #[test]
    fn test_register_book_rejects_invalid_fields() {
        assert_eq!(
            register_book("", "a", "0441013597", 1),
            Err(CatalogError::InvalidTitle)
        );
        assert_eq!(
            register_book("t", &"a".repeat(51), "0441013597", 1),
            Err(CatalogError::InvalidAuthor)
        );
        assert_eq!(
            register_book("t", "a", "not-an-isbn", 1),
            Err(CatalogError::InvalidIsbn)
        );
        assert_eq!(
            register_book("t", "a", "0441013597", 0),
            Err(CatalogError::InvalidTotalCopies)
        );
    }

    #[test]
    fn test_check_out_copy_decrements_available() {
        let book = sample_book(2);
        let book = check_out_copy(&book).unwrap();
        assert_eq!(book.available_copies, 1);
        assert_eq!(book.copies_on_loan(), 1);
    }

    #[test]
    fn test_check_out_copy_fails_when_none_left() {
        let book = sample_book(1);
        let book = check_out_copy(&book).unwrap();
        assert!(!book.is_available());
        assert_eq!(check_out_copy(&book), Err(BorrowError::NoCopiesAvailable));
    }

    #[test]
    fn test_restock_copy_increments_available() {
        let book = check_out_copy(&sample_book(3)).unwrap();
        let book = restock_copy(&book).unwrap();
        assert_eq!(book.available_copies, 3);
    }

    #[test]
    fn test_restock_copy_never_exceeds_total() {
        let book = sample_book(3);
        assert_eq!(restock_copy(&book), Err(ReturnError::AllCopiesOnShelf));
    }

    #[test]
    fn test_revise_book_adjusts_available_by_delta() {
        // 5冊中2冊貸出中
        let book = sample_book(5);
        let book = check_out_copy(&check_out_copy(&book).unwrap()).unwrap();
        assert_eq!(book.available_copies, 3);

        let grown = revise_book(&book, "New title", "Klabnik", "9781718503106", 8).unwrap();
        assert_eq!(grown.total_copies.value(), 8);
        assert_eq!(grown.available_copies, 6);
        assert_eq!(grown.title, "New title");
        assert_eq!(grown.book_id, book.book_id);

        let shrunk = revise_book(&book, "t", "a", "9781718503106", 2).unwrap();
        assert_eq!(shrunk.available_copies, 0);
    }

    #[test]
    fn test_revise_book_rejects_total_below_copies_on_loan() {
        let book = sample_book(5);
        let book = check_out_copy(&check_out_copy(&book).unwrap()).unwrap();

        let result = revise_book(&book, "t", "a", "9781718503106", 1);
        assert_eq!(result, Err(CatalogError::CopiesOnLoan { on_loan: 2 }));
    }
}
