use crate::domain::{
    loan::Loan,
    value_objects::{BookId, LoanId, UserId},
};
use async_trait::async_trait;
use futures::stream::BoxStream;

use super::store_error::Result;

/// 貸出ストアポート
///
/// 貸出レコードの永続化を抽象化する。貸出は削除されない。
#[async_trait]
pub trait LoanStore: Send + Sync {
    /// IDで貸出を取得する
    async fn get(&self, loan_id: LoanId) -> Result<Option<Loan>>;

    /// 利用者の未返却の貸出を取得する
    ///
    /// 「同時に1冊まで」のルール確認に使用される。
    async fn find_active_by_user(&self, user_id: &UserId) -> Result<Option<Loan>>;

    /// 利用者の全貸出を取得する（返却済みを含む）
    async fn find_by_user(&self, user_id: &UserId) -> Result<Vec<Loan>>;

    /// 書籍を参照する未返却の貸出があるか
    ///
    /// 貸出中の書籍の削除防止に使用される。
    async fn has_active_for_book(&self, book_id: BookId) -> Result<bool>;

    /// 貸出を追加する
    ///
    /// 利用者が既に未返却の貸出を持つ場合は`StoreError::Conflict`。
    async fn insert(&self, loan: Loan) -> Result<()>;

    /// 貸出をレコード全体で置き換える
    ///
    /// 返却済みの貸出は不変。保存済みの貸出が返却済み、
    /// または存在しない場合は`StoreError::Conflict`。
    async fn update(&self, loan: Loan) -> Result<()>;

    /// すべての貸出をストリーム配信する
    ///
    /// 延滞検知などの一括処理に使用される。
    /// 呼び出しごとに現在の状態から読み直し、カーソルは保持しない。
    fn stream_all(&self) -> BoxStream<'_, Result<Loan>>;
}
