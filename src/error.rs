//! 元件邊界的錯誤分類。
//!
//! crawler / util 內部以 `anyhow::Result` 傳遞，離開元件時收斂成這裡的分類，
//! 讓呼叫端能區分「來源網站掛了」與「真的沒有符合條件的 ETF」。

/// Top-level error type for the screener components.
#[derive(Debug, thiserror::Error)]
pub enum ScreenerError {
    /// 清單頁抓不到或解析不出任何資料列，整個 universe 視為無法取得
    #[error("source unavailable: {reason}")]
    SourceUnavailable { reason: String },

    /// 網頁上預期的元素不存在
    #[error("markup incomplete: {reason}")]
    ParseIncomplete { reason: String },

    /// 持股存檔讀寫失敗，呼叫端應視為「沒有任何資料被改動」
    #[error("persistence failed: {reason}")]
    Persistence { reason: String },

    /// 使用者輸入不合法，尚未碰到任何 I/O
    #[error("invalid input: {reason}")]
    Validation { reason: String },
}

impl ScreenerError {
    pub fn persistence(why: impl std::fmt::Display) -> Self {
        ScreenerError::Persistence {
            reason: why.to_string(),
        }
    }

    pub fn validation(reason: impl Into<String>) -> Self {
        ScreenerError::Validation {
            reason: reason.into(),
        }
    }
}
