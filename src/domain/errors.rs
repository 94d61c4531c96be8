use super::{IsbnError, TotalCopiesError};

/// 貸出のエラー
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BorrowError {
    /// 貸出可能な冊数が0
    NoCopiesAvailable,
}

/// 返却のエラー
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReturnError {
    /// 既に返却済み
    AlreadyReturned,
    /// 全冊が書架にあり、戻す先がない（在庫の不整合）
    AllCopiesOnShelf,
}

/// 書籍登録・更新のエラー
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CatalogError {
    /// タイトルが空、または50文字を超える
    InvalidTitle,
    /// 著者が空、または50文字を超える
    InvalidAuthor,
    /// ISBNの形式が不正
    InvalidIsbn,
    /// 所蔵冊数が範囲外（1〜100）
    InvalidTotalCopies,
    /// 貸出中の冊数を下回る所蔵冊数には変更できない
    CopiesOnLoan { on_loan: u32 },
}

impl From<IsbnError> for CatalogError {
    fn from(err: IsbnError) -> Self {
        match err {
            IsbnError::InvalidFormat => CatalogError::InvalidIsbn,
        }
    }
}

impl From<TotalCopiesError> for CatalogError {
    fn from(err: TotalCopiesError) -> Self {
        match err {
            TotalCopiesError::OutOfRange => CatalogError::InvalidTotalCopies,
        }
    }
}
