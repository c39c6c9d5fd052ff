//! Universe 快取模組。
//!
//! 整輪抓取（清單頁 + 每檔明細頁）的結果在一個時間窗內共用，
//! 窗內的重複讀取不會再打來源網站；「重新整理」動作會把快取清掉，
//! 下次讀取時重抓。
//!
//! 以 `RwLock` 保護共享資料；若鎖取得失敗（poisoned），讀取回傳 `None`、
//! 寫入直接放棄，由上層視為快取未命中，不會 panic。

use std::{
    sync::RwLock,
    time::{Duration, Instant},
};

use once_cell::sync::Lazy;

use crate::declare::Instrument;

/// 全域 universe 快取實例
pub static UNIVERSE: Lazy<UniverseCache> = Lazy::new(Default::default);

#[derive(Default)]
pub struct UniverseCache {
    inner: RwLock<Option<Snapshot>>,
}

struct Snapshot {
    instruments: Vec<Instrument>,
    fetched_at: Instant,
}

impl UniverseCache {
    /// 回傳尚在存活時間內的快取結果；過期或沒有快取時回傳 `None`
    pub fn get(&self, ttl: Duration) -> Option<Vec<Instrument>> {
        let guard = self.inner.read().ok()?;
        let snapshot = guard.as_ref()?;

        if snapshot.fetched_at.elapsed() >= ttl {
            return None;
        }

        Some(snapshot.instruments.clone())
    }

    pub fn put(&self, instruments: Vec<Instrument>) {
        if let Ok(mut guard) = self.inner.write() {
            *guard = Some(Snapshot {
                instruments,
                fetched_at: Instant::now(),
            });
        }
    }

    /// 清掉快取，下次讀取強制重抓
    pub fn invalidate(&self) {
        if let Ok(mut guard) = self.inner.write() {
            *guard = None;
        }
    }
}
