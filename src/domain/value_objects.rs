use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// 貸出ID
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LoanId(Uuid);

impl LoanId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    pub fn value(&self) -> Uuid {
        self.0
    }
}

impl Default for LoanId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for LoanId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// 書籍ID - カタログの書籍への参照
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BookId(Uuid);

impl BookId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    pub fn value(&self) -> Uuid {
        self.0
    }
}

impl Default for BookId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for BookId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// 利用者ID - 認証基盤が発行する不透明な識別子
///
/// 貸出コンテキストは利用者の詳細を知らず、この文字列だけを扱う。
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UserId(String);

impl UserId {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// ISBNのエラー
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IsbnError {
    /// ISBN-10/ISBN-13のどちらの形式にも一致しない
    InvalidFormat,
}

/// ISBN
///
/// 不変条件：ISBN-10（末尾のみX可）またはISBN-13の数字列。
/// "ISBN-13: " のような接頭辞と区切り文字（ハイフン・空白）は取り除き、
/// 正規化した形で保持する。一意性の比較はこの正規化形で行う。
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Isbn(String);

impl Isbn {
    pub fn parse(raw: &str) -> Result<Self, IsbnError> {
        let trimmed = raw.trim();
        let body = strip_isbn_prefix(trimmed);

        let compact: String = body
            .chars()
            .filter(|c| *c != '-' && *c != ' ')
            .map(|c| c.to_ascii_uppercase())
            .collect();

        let valid = match compact.len() {
            10 => {
                let (head, last) = compact.split_at(9);
                head.chars().all(|c| c.is_ascii_digit())
                    && last.chars().all(|c| c.is_ascii_digit() || c == 'X')
            }
            13 => {
                compact.chars().all(|c| c.is_ascii_digit())
                    && (compact.starts_with("978") || compact.starts_with("979"))
            }
            _ => false,
        };

        if !valid {
            return Err(IsbnError::InvalidFormat);
        }

        Ok(Self(compact))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Isbn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

fn strip_isbn_prefix(value: &str) -> &str {
    let Some(rest) = value.strip_prefix("ISBN") else {
        return value;
    };
    let rest = rest
        .strip_prefix("-10")
        .or_else(|| rest.strip_prefix("-13"))
        .unwrap_or(rest);
    let rest = rest.strip_prefix(':').unwrap_or(rest);
    rest.trim_start()
}

/// 所蔵冊数のエラー
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TotalCopiesError {
    /// 1冊未満または上限超過
    OutOfRange,
}

/// 所蔵冊数
///
/// 不変条件：1以上100以下
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TotalCopies(u32);

impl TotalCopies {
    pub const MIN: u32 = 1;
    pub const MAX: u32 = 100;

    pub fn value(&self) -> u32 {
        self.0
    }
}

impl TryFrom<u32> for TotalCopies {
    type Error = TotalCopiesError;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        if !(Self::MIN..=Self::MAX).contains(&value) {
            return Err(TotalCopiesError::OutOfRange);
        }
        Ok(Self(value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_loan_id_creation() {
        let id1 = LoanId::new();
        let id2 = LoanId::new();
        assert_ne!(id1, id2);
    }

    #[test]
    fn test_book_id_from_uuid() {
        let uuid = Uuid::new_v4();
        let id = BookId::from_uuid(uuid);
        assert_eq!(id.value(), uuid);
    }

    #[test]
    fn test_user_id_equality_is_by_value() {
        assert_eq!(UserId::new("alice"), UserId::new("alice".to_string()));
        assert_ne!(UserId::new("alice"), UserId::new("bob"));
    }

    #[test]
    fn test_isbn_parse_isbn13_with_hyphens() {
        let isbn = Isbn::parse("978-4-06-293769-0").unwrap();
        assert_eq!(isbn.as_str(), "9784062937690");
    }

    #[test]
    fn test_isbn_parse_with_prefix() {
        let isbn = Isbn::parse("ISBN-13: 978 0 13 468599 1").unwrap();
        assert_eq!(isbn.as_str(), "9780134685991");

        let isbn = Isbn::parse("ISBN 0-306-40615-2").unwrap();
        assert_eq!(isbn.as_str(), "0306406152");
    }

    #[test]
    fn test_isbn_parse_isbn10_with_check_x() {
        let isbn = Isbn::parse("080442957x").unwrap();
        assert_eq!(isbn.as_str(), "080442957X");
    }

    #[test]
    fn test_isbn_parse_rejects_invalid() {
        assert_eq!(Isbn::parse(""), Err(IsbnError::InvalidFormat));
        assert_eq!(Isbn::parse("12345"), Err(IsbnError::InvalidFormat));
        assert_eq!(Isbn::parse("X123456789"), Err(IsbnError::InvalidFormat));
        // 13桁は978/979で始まる必要がある
        assert_eq!(Isbn::parse("1234567890123"), Err(IsbnError::InvalidFormat));
    }

    #[test]
    fn test_isbn_normalized_forms_are_equal() {
        assert_eq!(
            Isbn::parse("978-0-13-468599-1").unwrap(),
            Isbn::parse("9780134685991").unwrap()
        );
    }

    #[test]
    fn test_total_copies_try_from_valid() {
        assert_eq!(TotalCopies::try_from(1).unwrap().value(), 1);
        assert_eq!(TotalCopies::try_from(100).unwrap().value(), 100);
    }

    #[test]
    fn test_total_copies_try_from_invalid() {
        assert_eq!(TotalCopies::try_from(0), Err(TotalCopiesError::OutOfRange));
        assert_eq!(
            TotalCopies::try_from(101),
            Err(TotalCopiesError::OutOfRange)
        );
    }
}
