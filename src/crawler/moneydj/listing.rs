use std::collections::HashSet;

use scraper::{Html, Selector};

use crate::error::ScreenerError;

/// 代號長度的合法範圍
const CODE_LEN_RANGE: std::ops::RangeInclusive<usize> = 4..=6;

/// 中國／香港市場曝險的關鍵字，命中即排除
const CHINA_MARKET_KEYWORDS: [&str; 8] = [
    "中國", "上證", "滬", "深", "恒生", "A50", "香港", "港股",
];

/// 判斷一個候選代號是否納入 universe。
///
/// 排除規則依序（先中先停）：
/// 1. 代號不是數字開頭。
/// 2. 代號長度不在 4~6 碼。
/// 3. 代號最後一碼是 L 或 R（槓桿／反向型的市場慣例）。
/// 4. 該列文字含中國／香港市場關鍵字。
pub fn accepts(code: &str, row_text: &str) -> bool {
    if !code.chars().next().is_some_and(|c| c.is_ascii_digit()) {
        return false;
    }

    if !CODE_LEN_RANGE.contains(&code.chars().count()) {
        return false;
    }

    if code
        .chars()
        .last()
        .is_some_and(|c| matches!(c.to_ascii_uppercase(), 'L' | 'R'))
    {
        return false;
    }

    if CHINA_MARKET_KEYWORDS.iter().any(|kw| row_text.contains(kw)) {
        return false;
    }

    true
}

/// 從清單頁挑出通過篩選的代號，保留發現順序並去除重複。
///
/// 候選代號取每列第一個超連結 href 的最後一段路徑。
/// 整頁連一個表格列都沒有時視為清單頁解析失敗。
pub fn extract_candidates(html: &str) -> Result<Vec<String>, ScreenerError> {
    let document = Html::parse_document(html);
    let row_selector =
        Selector::parse("tr").map_err(|why| ScreenerError::ParseIncomplete {
            reason: format!("Failed to Selector::parse because: {:?}", why),
        })?;
    let anchor_selector =
        Selector::parse("a[href]").map_err(|why| ScreenerError::ParseIncomplete {
            reason: format!("Failed to Selector::parse because: {:?}", why),
        })?;

    let mut rows_seen = 0usize;
    let mut seen = HashSet::new();
    let mut codes = Vec::new();

    for row in document.select(&row_selector) {
        rows_seen += 1;

        let Some(anchor) = row.select(&anchor_selector).next() else {
            continue;
        };
        let Some(href) = anchor.value().attr("href") else {
            continue;
        };
        let Some(code) = code_from_href(href) else {
            continue;
        };

        let row_text = row.text().collect::<String>();
        if !accepts(&code, &row_text) {
            continue;
        }

        if seen.insert(code.clone()) {
            codes.push(code);
        }
    }

    if rows_seen == 0 {
        return Err(ScreenerError::SourceUnavailable {
            reason: "清單頁沒有任何表格列".to_string(),
        });
    }

    Ok(codes)
}

/// 取 href 路徑的最後一段作為候選代號，query string 與 fragment 不算
fn code_from_href(href: &str) -> Option<String> {
    let path = href.split(['?', '#']).next()?;
    let segment = path.trim_end_matches('/').rsplit('/').next()?.trim();

    if segment.is_empty() {
        None
    } else {
        Some(segment.to_string())
    }
}
