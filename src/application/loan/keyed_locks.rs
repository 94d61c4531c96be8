use crate::domain::value_objects::{BookId, UserId};
use std::collections::HashMap;
use std::hash::Hash;
use std::sync::{Arc, Mutex, PoisonError};
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

/// キーごとの非同期ロック
///
/// 同じキーに対する読み取り・確認・書き込みの一連の処理を直列化する。
/// 誰も保持・待機していないスロットはロック取得時に回収される。
pub struct KeyedLocks<K> {
    slots: Mutex<HashMap<K, Arc<AsyncMutex<()>>>>,
}

impl<K> Default for KeyedLocks<K> {
    fn default() -> Self {
        Self {
            slots: Mutex::new(HashMap::new()),
        }
    }
}

impl<K: Eq + Hash> KeyedLocks<K> {
    pub fn new() -> Self {
        Self::default()
    }

    /// キーのロックを取得する
    ///
    /// ガードを破棄するまで、同じキーで`lock`を呼んだ他のタスクは待機する。
    pub async fn lock(&self, key: K) -> OwnedMutexGuard<()> {
        let slot = {
            let mut slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
            slots.retain(|_, slot| Arc::strong_count(slot) > 1);
            slots.entry(key).or_default().clone()
        };
        slot.lock_owned().await
    }

    /// 保持中のスロット数
    pub fn len(&self) -> usize {
        self.slots
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// 貸出エンジンの直列化スコープ
///
/// 取得順は常に 利用者 → 書籍。カタログ更新は書籍のみを取る。
#[derive(Default)]
pub struct LendingLocks {
    pub users: KeyedLocks<UserId>,
    pub books: KeyedLocks<BookId>,
}

impl LendingLocks {
    pub fn new() -> Self {
        Self::default()
    }
}
