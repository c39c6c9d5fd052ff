use std::time::Duration;

use crate::{config::SETTINGS, declare::Instrument, error::ScreenerError, logging, util};

/// ETF 清單頁：挑出候選代號並套用排除規則
pub mod listing;
/// 個別 ETF 明細頁：名稱、市場別、股價與各期報酬率
pub mod performance;

/// 抓取一整輪 ETF universe。
///
/// 流程：抓清單頁 → 依發現順序過濾出候選代號 → 逐檔抓明細頁解析。
/// 個別明細頁失敗只記 log 然後略過，該檔不出現在結果內；
/// 清單頁本身失敗則整個 universe 視為無法取得。
pub async fn build_universe() -> Result<Vec<Instrument>, ScreenerError> {
    let listing_url = &SETTINGS.source.listing_url;
    let body = util::http::get(listing_url)
        .await
        .map_err(|why| ScreenerError::SourceUnavailable {
            reason: format!("{}: {:?}", listing_url, why),
        })?;

    let codes = listing::extract_candidates(&body)?;
    let delay = Duration::from_millis(SETTINGS.source.fetch_delay_millis);
    let mut instruments = Vec::with_capacity(codes.len());

    for code in codes {
        // 請求延遲，避免被目標網站封禁
        tokio::time::sleep(delay).await;

        let url = detail_url(&code);
        let body = match util::http::get(&url).await {
            Ok(body) => body,
            Err(why) => {
                logging::error_file_async(format!("Failed to fetch {} because {:?}", url, why));
                continue;
            }
        };

        match performance::parse(&code, &body) {
            Some(instrument) => instruments.push(instrument),
            None => {
                logging::info_file_async(format!("{} 找不到績效表格，略過", code));
            }
        }
    }

    logging::info_file_async(format!("ETF universe 抓取完成，共 {} 檔", instruments.len()));

    Ok(instruments)
}

fn detail_url(code: &str) -> String {
    SETTINGS.source.detail_url.replace("{code}", code)
}
