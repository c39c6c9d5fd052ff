use std::{collections::HashSet, str::FromStr};

use anyhow::{anyhow, Result};
use rust_decimal::Decimal;

/// 解析數字前先清掉的字元：千分位、百分比、正號與單位
const NUMBER_ESCAPE_CHAR: &[char] = &['元', '%', '+', ',', ' ', '"', '\n', '\r'];

/// Canonicalizes a raw instrument code.
///
/// 規則依序為：
/// 1. 去頭尾空白，並移除試算表強制文字格式殘留的前導單引號。
/// 2. 純數字且長度不足 4 碼時，前面補 0 到 4 碼。
///
/// 歷史上還有「非 0 開頭就補 00」的寫法，這裡不採用，
/// 因為它會把本來就合法的 4 碼以上代號改壞。
///
/// # Example
///
/// ```
/// use etf_screener::util::text::normalize_code;
///
/// assert_eq!(normalize_code("50"), "0050");
/// assert_eq!(normalize_code("'0050"), "0050");
/// ```
pub fn normalize_code(raw: &str) -> String {
    let trimmed = raw.trim();
    let code = trimmed.strip_prefix('\'').unwrap_or(trimmed).trim();

    if !code.is_empty() && code.len() < 4 && code.chars().all(|c| c.is_ascii_digit()) {
        return format!("{:0>4}", code);
    }

    code.to_string()
}

/// Parses a decimal value from a given string.
///
/// 字串內可含千分位逗號、百分比符號等雜訊，會先經過 [`clean_escape_chars`]
/// 清理再解析；解析失敗時回傳錯誤。
///
/// # Arguments
///
/// * `s`: 待解析的字串。
/// * `escape_chars`: 除了預設集合外，額外要移除的字元。
pub fn parse_decimal(s: &str, escape_chars: Option<Vec<char>>) -> Result<Decimal> {
    let cleaned = clean_escape_chars(s, escape_chars);
    Decimal::from_str(&cleaned)
        .map_err(|why| anyhow!("Failed to parse '{}' as Decimal because {:?}", cleaned, why))
}

/// Removes a set of escape characters from a given string.
pub(crate) fn clean_escape_chars(s: &str, escape_chars: Option<Vec<char>>) -> String {
    let mut combined: Vec<char> = NUMBER_ESCAPE_CHAR.to_vec();
    if let Some(ec) = escape_chars {
        combined.extend(ec);
    }

    let filters = combined.iter().collect::<HashSet<_>>();
    s.chars().filter(|c| !filters.contains(c)).collect()
}
