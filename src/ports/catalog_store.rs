use crate::domain::{
    book::Book,
    value_objects::{BookId, Isbn},
};
use async_trait::async_trait;

use super::store_error::Result;

/// カタログストアポート
///
/// 書籍レコードの永続化を抽象化する。更新はレコード全体の置き換え。
#[async_trait]
pub trait CatalogStore: Send + Sync {
    /// IDで書籍を取得する
    async fn get(&self, book_id: BookId) -> Result<Option<Book>>;

    /// ISBNで書籍を検索する
    ///
    /// ISBNの一意性確認に使用される。
    async fn find_by_isbn(&self, isbn: &Isbn) -> Result<Option<Book>>;

    /// 全書籍を取得する
    async fn list_all(&self) -> Result<Vec<Book>>;

    /// 書籍を追加する
    ///
    /// 同じISBNの書籍が既にある場合は`StoreError::Conflict`。
    async fn insert(&self, book: Book) -> Result<()>;

    /// 書籍をレコード全体で置き換える
    ///
    /// 保存済みの`version`が`book.version`と一致する場合のみ成功し、
    /// 版を1つ進める。不一致・行なし・ISBN重複は`StoreError::Conflict`。
    async fn update(&self, book: Book) -> Result<()>;

    /// 書籍を削除する
    ///
    /// 存在しない場合も成功扱い。
    async fn delete(&self, book_id: BookId) -> Result<()>;
}
