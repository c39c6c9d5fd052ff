use rust_decimal::Decimal;
use serde::Serialize;

/// 名稱無法解析時的預設值
pub const UNKNOWN_NAME: &str = "unknown";

/// 市場別
#[derive(PartialEq, Eq, Debug, Copy, Clone, Serialize)]
pub enum MarketType {
    /// 上市
    Listed,
    /// 上櫃
    OverTheCounter,
    /// 無法判別
    Unknown,
}

impl MarketType {
    pub fn name(&self) -> &'static str {
        match *self {
            MarketType::Listed => "上市",
            MarketType::OverTheCounter => "上櫃",
            MarketType::Unknown => "未知",
        }
    }

    /// 從網頁文字判斷市場別，文字中沒有「上市」或「上櫃」時回傳 None
    pub fn from_text(text: &str) -> Option<MarketType> {
        if text.contains("上市") {
            Some(MarketType::Listed)
        } else if text.contains("上櫃") {
            Some(MarketType::OverTheCounter)
        } else {
            None
        }
    }
}

/// 一檔 ETF 的市場數據，一次抓取週期內以 code 為唯一鍵
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Instrument {
    /// 標準化後的代號
    pub code: String,
    pub name: String,
    pub market_type: MarketType,
    /// 目前股價，無法解析時為 0
    pub price: Decimal,
    /// 一季報酬率(%)
    pub return_1q: Option<Decimal>,
    /// 半年報酬率(%)
    pub return_half_year: Option<Decimal>,
    /// 一年報酬率(%)
    pub return_1y: Option<Decimal>,
    /// 已解析出的各期報酬率平均值，取至小數第二位；全數缺漏時為 None
    pub composite_return: Option<Decimal>,
}
