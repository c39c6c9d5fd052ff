use rust_decimal::Decimal;
use scraper::{ElementRef, Html, Selector};

use crate::util::text;

/// Extracts the text value of an element selected by a given CSS selector.
///
/// 在 `element` 底下找第一個符合 `css_selector` 的節點並回傳其文字。
/// selector 不合法或找不到節點時回傳 `None`。
pub fn parse_value(element: &ElementRef, css_selector: &str) -> Option<String> {
    match Selector::parse(css_selector) {
        Ok(s) => element
            .select(&s)
            .next()
            .map(|v| v.text().collect::<String>()),
        Err(_) => None,
    }
}

/// 在整份文件內找第一個符合 `css_selector` 的節點並回傳其文字
pub fn select_first_text(document: &Html, css_selector: &str) -> Option<String> {
    let selector = Selector::parse(css_selector).ok()?;
    document
        .select(&selector)
        .next()
        .map(|element| element.text().collect::<String>())
}

/// 在整份文件內找第一個符合 `css_selector` 的節點並解析為 `Decimal`
pub fn select_first_decimal(document: &Html, css_selector: &str) -> Option<Decimal> {
    select_first_text(document, css_selector)
        .and_then(|v| text::parse_decimal(v.trim(), None).ok())
}

#[cfg(test)]
mod tests {
    use rust_decimal_macros::dec;

    use super::*;

    #[test]
    fn test_parse_value() {
        let html = r#"<div class="example"><span>Hello, world!</span></div>"#;
        let document = Html::parse_document(html);
        let selector = Selector::parse("div.example").unwrap();
        let element = document.select(&selector).next().unwrap();

        assert_eq!(
            parse_value(&element, "span"),
            Some("Hello, world!".to_string())
        );
        assert_eq!(parse_value(&element, "table"), None);
    }

    #[test]
    fn test_select_first_decimal() {
        let html = r#"<div class="price">1,234.50元</div>"#;
        let document = Html::parse_document(html);

        assert_eq!(
            select_first_decimal(&document, ".price"),
            Some(dec!(1234.50))
        );
        assert_eq!(select_first_decimal(&document, ".missing"), None);
    }
}
