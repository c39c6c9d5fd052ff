use std::time::Duration;

use crate::{cache, config::SETTINGS, declare::Instrument, error::ScreenerError};

/// MoneyDJ 理財網 ETF 專區
pub mod moneydj;

/// 取得 ETF universe，時間窗內重複呼叫直接回傳快取結果。
///
/// `force_refresh` 為 true 時先把快取清掉再抓。
/// 清單頁抓不到時回傳 [`ScreenerError::SourceUnavailable`]，
/// 與「抓到了但沒有任何一檔通過篩選」的空集合是兩回事。
pub async fn universe(force_refresh: bool) -> Result<Vec<Instrument>, ScreenerError> {
    let ttl = Duration::from_secs(SETTINGS.source.cache_ttl_minutes * 60);

    if force_refresh {
        cache::UNIVERSE.invalidate();
    }

    if let Some(cached) = cache::UNIVERSE.get(ttl) {
        return Ok(cached);
    }

    let fetched = moneydj::build_universe().await?;
    cache::UNIVERSE.put(fetched.clone());

    Ok(fetched)
}
