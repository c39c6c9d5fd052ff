use rust_decimal::Decimal;
use scraper::{ElementRef, Html, Selector};

use crate::{
    declare::{Instrument, MarketType, UNKNOWN_NAME},
    util::{http::element, text},
};

/// 績效表格的樣式 class
const PERFORMANCE_TABLE_SELECTOR: &str = "table.datalist";
/// 報價元件的 id
const PRICE_WIDGET_SELECTOR: &str = "#Price1_lbTPrice";
/// 備援：帶 price class 的元素
const PRICE_CLASS_SELECTOR: &str = ".price";

/// 股價擷取策略，依序嘗試、取第一個成功的結果
const PRICE_EXTRACTORS: &[fn(&Html) -> Option<Decimal>] = &[price_from_widget, price_from_class];

#[derive(Default)]
struct PeriodReturns {
    one_quarter: Option<Decimal>,
    half_year: Option<Decimal>,
    one_year: Option<Decimal>,
}

/// 解析一檔 ETF 的明細頁。
///
/// 各欄位獨立 best-effort：名稱、市場別、股價任一缺漏都不影響其他欄位；
/// 只有整個績效表格找不到時才回傳 `None`。
pub fn parse(code: &str, html: &str) -> Option<Instrument> {
    let document = Html::parse_document(html);
    let table_selector = Selector::parse(PERFORMANCE_TABLE_SELECTOR).ok()?;
    let table = document.select(&table_selector).next()?;

    let periods = extract_period_returns(&table);

    Some(Instrument {
        code: text::normalize_code(code),
        name: extract_name(&document),
        market_type: extract_market_type(&document),
        price: extract_price(&document),
        composite_return: composite_return(&periods),
        return_1q: periods.one_quarter,
        return_half_year: periods.half_year,
        return_1y: periods.one_year,
    })
}

/// 名稱取第一個 h3，在第一個左括號處截斷
fn extract_name(document: &Html) -> String {
    element::select_first_text(document, "h3")
        .and_then(|t| t.split('(').next().map(|s| s.trim().to_string()))
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| UNKNOWN_NAME.to_string())
}

/// 先找含「市場」字樣的 li/td；沒有再退而掃描整份文件找獨立的「上市」「上櫃」
fn extract_market_type(document: &Html) -> MarketType {
    if let Ok(selector) = Selector::parse("li, td") {
        for node in document.select(&selector) {
            let node_text = node.text().collect::<String>();
            if !node_text.contains("市場") {
                continue;
            }
            if let Some(market) = MarketType::from_text(&node_text) {
                return market;
            }
        }
    }

    document
        .root_element()
        .text()
        .find_map(|t| match t.trim() {
            "上市" => Some(MarketType::Listed),
            "上櫃" => Some(MarketType::OverTheCounter),
            _ => None,
        })
        .unwrap_or(MarketType::Unknown)
}

fn extract_price(document: &Html) -> Decimal {
    PRICE_EXTRACTORS
        .iter()
        .find_map(|extract| extract(document))
        .unwrap_or(Decimal::ZERO)
}

fn price_from_widget(document: &Html) -> Option<Decimal> {
    price_from_selector(document, PRICE_WIDGET_SELECTOR)
}

fn price_from_class(document: &Html) -> Option<Decimal> {
    price_from_selector(document, PRICE_CLASS_SELECTOR)
}

fn price_from_selector(document: &Html, css_selector: &str) -> Option<Decimal> {
    element::select_first_decimal(document, css_selector).filter(|p| !p.is_sign_negative())
}

/// 逐列讀績效表格：第一格是期間名稱，第二格内的 span 是數值。
/// 解析不出來的數值直接略過，不補零。
fn extract_period_returns(table: &ElementRef) -> PeriodReturns {
    let mut periods = PeriodReturns::default();

    let (Ok(row_selector), Ok(cell_selector)) = (Selector::parse("tr"), Selector::parse("td"))
    else {
        return periods;
    };

    for row in table.select(&row_selector) {
        let cells: Vec<ElementRef> = row.select(&cell_selector).collect();
        let (Some(label_cell), Some(value_cell)) = (cells.first(), cells.get(1)) else {
            continue;
        };

        let label = label_cell.text().collect::<String>();
        let Some(raw_value) = element::parse_value(value_cell, "span") else {
            continue;
        };
        let Ok(value) = text::parse_decimal(raw_value.trim(), None) else {
            continue;
        };

        if label.contains("一季") {
            periods.one_quarter.get_or_insert(value);
        } else if label.contains("半年") {
            periods.half_year.get_or_insert(value);
        } else if label.contains("一年") {
            periods.one_year.get_or_insert(value);
        }
    }

    periods
}

/// 已解析出的各期報酬率平均值，取至小數第二位；一期都沒有時為 None
fn composite_return(periods: &PeriodReturns) -> Option<Decimal> {
    let values: Vec<Decimal> = [periods.one_quarter, periods.half_year, periods.one_year]
        .into_iter()
        .flatten()
        .collect();

    if values.is_empty() {
        return None;
    }

    let sum: Decimal = values.iter().copied().sum();
    Some((sum / Decimal::from(values.len() as i64)).round_dp(2))
}

#[cfg(test)]
mod tests {
    use rust_decimal_macros::dec;

    use super::*;

    const DETAIL_PAGE: &str = r#"
        <html><body>
          <h3>元大台灣50(0050.TW)</h3>
          <ul>
            <li>類型：國內成分股</li>
            <li>交易市場：上市</li>
          </ul>
          <span id="Price1_lbTPrice">1,052.50</span>
          <table class="datalist">
            <tr><td>一季</td><td><span>+10.00%</span></td></tr>
            <tr><td>半年</td><td><span>+20.00%</span></td></tr>
            <tr><td>一年</td><td><span>+30.00%</span></td></tr>
          </table>
        </body></html>
    "#;

    #[test]
    fn test_parse_full_page() {
        let instrument = parse("50", DETAIL_PAGE).unwrap();

        assert_eq!(instrument.code, "0050");
        assert_eq!(instrument.name, "元大台灣50");
        assert_eq!(instrument.market_type, MarketType::Listed);
        assert_eq!(instrument.price, dec!(1052.50));
        assert_eq!(instrument.return_1q, Some(dec!(10.00)));
        assert_eq!(instrument.return_half_year, Some(dec!(20.00)));
        assert_eq!(instrument.return_1y, Some(dec!(30.00)));
        assert_eq!(instrument.composite_return, Some(dec!(20.00)));
    }

    #[test]
    fn test_parse_without_performance_table_is_none() {
        let html = r#"<html><body><h3>元大高股息(0056)</h3></body></html>"#;
        assert!(parse("0056", html).is_none());
    }

    #[test]
    fn test_partial_periods_average_available_only() {
        let html = r#"
            <html><body>
              <table class="datalist">
                <tr><td>一季</td><td><span>6.00%</span></td></tr>
                <tr><td>半年</td><td><span>N/A</span></td></tr>
                <tr><td>一年</td><td><span>9.00%</span></td></tr>
              </table>
            </body></html>
        "#;

        let instrument = parse("0056", html).unwrap();
        assert_eq!(instrument.return_1q, Some(dec!(6.00)));
        assert_eq!(instrument.return_half_year, None);
        assert_eq!(instrument.return_1y, Some(dec!(9.00)));
        // (6 + 9) / 2 = 7.5
        assert_eq!(instrument.composite_return, Some(dec!(7.50)));
    }

    #[test]
    fn test_no_parsable_periods_yields_none_composite() {
        let html = r#"
            <html><body>
              <table class="datalist">
                <tr><td>一季</td><td><span>--</span></td></tr>
              </table>
            </body></html>
        "#;

        let instrument = parse("00735", html).unwrap();
        assert_eq!(instrument.composite_return, None);
        assert_eq!(instrument.name, UNKNOWN_NAME);
        assert_eq!(instrument.price, Decimal::ZERO);
        assert_eq!(instrument.market_type, MarketType::Unknown);
    }

    #[test]
    fn test_price_falls_back_to_class_selector() {
        let html = r#"
            <html><body>
              <div class="price">35.88</div>
              <table class="datalist">
                <tr><td>一年</td><td><span>12.34%</span></td></tr>
              </table>
            </body></html>
        "#;

        let instrument = parse("00878", html).unwrap();
        assert_eq!(instrument.price, dec!(35.88));
    }

    #[test]
    fn test_market_type_fallback_standalone_text() {
        let html = r#"
            <html><body>
              <div>上櫃</div>
              <table class="datalist">
                <tr><td>一年</td><td><span>1.00%</span></td></tr>
              </table>
            </body></html>
        "#;

        let instrument = parse("006201", html).unwrap();
        assert_eq!(instrument.market_type, MarketType::OverTheCounter);
    }
}
