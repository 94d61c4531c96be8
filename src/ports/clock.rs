use chrono::{DateTime, Utc};

/// 時計ポート
///
/// 返却期限・延滞判定を決定的にテストできるよう、現在時刻の取得を抽象化する。
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}
