use thiserror::Error;

/// ストア層のエラー
///
/// ビジネスルールの失敗ではなく、永続化の結果だけを表す。
#[derive(Debug, Error)]
pub enum StoreError {
    /// 並行する書き込みに負けた
    ///
    /// 楽観ロックの版不一致、一意制約違反、既に返却済みの貸出への更新など。
    #[error("Write lost to a concurrent change")]
    Conflict,

    /// バックエンドの障害（I/Oなど）
    #[error("Storage backend error")]
    Backend(#[source] Box<dyn std::error::Error + Send + Sync>),
}

/// ストア層の Result型
pub type Result<T> = std::result::Result<T, StoreError>;
