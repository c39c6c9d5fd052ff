//! 持股帳本。
//!
//! 後端是一個只有「讀全部／附加／整份重寫」的表格存放區（見 [`store`]），
//! 代號在讀寫兩端都先標準化，使用者輸入的 `'0050`、`50` 與網頁上的
//! `0050` 才對得起來。
//!
//! `replace_all` 是讀出全部、換掉該使用者的列再寫回的 read-modify-write，
//! 兩個同時寫入的 session 可能互相蓋掉對方的修改，這是已接受的限制。

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{error::ScreenerError, util::text};

pub mod store;

pub use store::{CsvStore, TableStore};

/// 一筆持股：某使用者對某檔 ETF 的平均成本與股數
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HoldingsRow {
    pub username: String,
    /// 存放與比對都用標準化後的代號
    pub code: String,
    pub avg_cost: Decimal,
    pub quantity: i64,
}

pub struct HoldingsLedger {
    store: Box<dyn TableStore>,
}

impl HoldingsLedger {
    pub fn new(store: Box<dyn TableStore>) -> Self {
        HoldingsLedger { store }
    }

    /// 讀出某使用者的全部持股，代號一律標準化
    pub fn list(&self, username: &str) -> Result<Vec<HoldingsRow>, ScreenerError> {
        Ok(self
            .read_normalized()?
            .into_iter()
            .filter(|row| row.username == username)
            .collect())
    }

    /// 新增一筆持股
    pub fn add(
        &self,
        username: &str,
        code: &str,
        avg_cost: Decimal,
        quantity: i64,
    ) -> Result<(), ScreenerError> {
        let row = validate(username, code, avg_cost, quantity)?;
        self.store.append(&row)
    }

    /// 刪除第一筆符合 (username, code) 的持股；同一檔重複持有時一次只刪一筆。
    ///
    /// 回傳是否真的刪到東西。
    pub fn delete_one(&self, username: &str, code: &str) -> Result<bool, ScreenerError> {
        let canonical = text::normalize_code(code);
        let mut rows = self.read_normalized()?;

        let Some(index) = rows
            .iter()
            .position(|row| row.username == username && row.code == canonical)
        else {
            return Ok(false);
        };

        rows.remove(index);
        self.store.write_all(&rows)?;

        Ok(true)
    }

    /// 以 `rows` 整批取代某使用者的持股，其他使用者的列原封不動
    pub fn replace_all(
        &self,
        username: &str,
        rows: Vec<HoldingsRow>,
    ) -> Result<(), ScreenerError> {
        let replacement: Vec<HoldingsRow> = rows
            .into_iter()
            .map(|row| validate(username, &row.code, row.avg_cost, row.quantity))
            .collect::<Result<_, _>>()?;

        let mut all = self.read_normalized()?;
        all.retain(|row| row.username != username);
        all.extend(replacement);

        self.store.write_all(&all)
    }

    fn read_normalized(&self) -> Result<Vec<HoldingsRow>, ScreenerError> {
        let mut rows = self.store.read_all()?;
        for row in &mut rows {
            row.code = text::normalize_code(&row.code);
        }
        Ok(rows)
    }
}

/// 使用者輸入檢查，不合法就擋下來，完全不碰存放區
fn validate(
    username: &str,
    code: &str,
    avg_cost: Decimal,
    quantity: i64,
) -> Result<HoldingsRow, ScreenerError> {
    if username.trim().is_empty() {
        return Err(ScreenerError::validation("username 不可為空"));
    }

    let canonical = text::normalize_code(code);
    if canonical.is_empty() {
        return Err(ScreenerError::validation("code 不可為空"));
    }

    if avg_cost.is_sign_negative() {
        return Err(ScreenerError::validation("avg_cost 不可為負數"));
    }

    if quantity <= 0 {
        return Err(ScreenerError::validation("quantity 必須大於 0"));
    }

    Ok(HoldingsRow {
        username: username.to_string(),
        code: canonical,
        avg_cost,
        quantity,
    })
}

#[cfg(test)]
mod tests {
    use rust_decimal_macros::dec;
    use tempfile::tempdir;

    use super::*;

    fn ledger(dir: &tempfile::TempDir) -> HoldingsLedger {
        HoldingsLedger::new(Box::new(CsvStore::new(dir.path().join("holdings.csv"))))
    }

    #[test]
    fn test_add_normalizes_code_on_write() {
        let dir = tempdir().unwrap();
        let ledger = ledger(&dir);

        ledger.add("amy", "'50", dec!(100.0), 1000).unwrap();

        let rows = ledger.list("amy").unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].code, "0050");
    }

    #[test]
    fn test_add_rejects_bad_input_without_io() {
        let dir = tempdir().unwrap();
        let ledger = ledger(&dir);

        assert!(matches!(
            ledger.add("", "0050", dec!(1), 1),
            Err(ScreenerError::Validation { .. })
        ));
        assert!(matches!(
            ledger.add("amy", "  ", dec!(1), 1),
            Err(ScreenerError::Validation { .. })
        ));
        assert!(matches!(
            ledger.add("amy", "0050", dec!(-1), 1),
            Err(ScreenerError::Validation { .. })
        ));
        assert!(matches!(
            ledger.add("amy", "0050", dec!(1), 0),
            Err(ScreenerError::Validation { .. })
        ));

        // 全部被擋下，存檔不應該被建立
        assert!(!dir.path().join("holdings.csv").exists());
    }

    #[test]
    fn test_list_filters_by_username() {
        let dir = tempdir().unwrap();
        let ledger = ledger(&dir);

        ledger.add("amy", "0050", dec!(100), 1000).unwrap();
        ledger.add("bob", "0056", dec!(30), 2000).unwrap();

        let amy = ledger.list("amy").unwrap();
        assert_eq!(amy.len(), 1);
        assert_eq!(amy[0].code, "0050");
        assert!(ledger.list("carol").unwrap().is_empty());
    }

    #[test]
    fn test_delete_one_removes_exactly_one_duplicate() {
        let dir = tempdir().unwrap();
        let ledger = ledger(&dir);

        ledger.add("amy", "0050", dec!(100), 1000).unwrap();
        ledger.add("amy", "0050", dec!(110), 500).unwrap();
        ledger.add("bob", "0050", dec!(90), 100).unwrap();

        assert!(ledger.delete_one("amy", "50").unwrap());

        let amy = ledger.list("amy").unwrap();
        assert_eq!(amy.len(), 1);
        assert_eq!(amy[0].avg_cost, dec!(110));

        // 別的使用者不受影響
        assert_eq!(ledger.list("bob").unwrap().len(), 1);

        // 再刪一次才清空，第三次刪不到東西
        assert!(ledger.delete_one("amy", "0050").unwrap());
        assert!(!ledger.delete_one("amy", "0050").unwrap());
    }

    #[test]
    fn test_replace_all_keeps_other_users_rows() {
        let dir = tempdir().unwrap();
        let ledger = ledger(&dir);

        ledger.add("amy", "0050", dec!(100), 1000).unwrap();
        ledger.add("amy", "0056", dec!(30), 2000).unwrap();
        ledger.add("bob", "00878", dec!(20), 3000).unwrap();

        ledger
            .replace_all(
                "amy",
                vec![HoldingsRow {
                    username: "amy".to_string(),
                    code: "735".to_string(),
                    avg_cost: dec!(50),
                    quantity: 400,
                }],
            )
            .unwrap();

        let amy = ledger.list("amy").unwrap();
        assert_eq!(amy.len(), 1);
        assert_eq!(amy[0].code, "0735");

        let bob = ledger.list("bob").unwrap();
        assert_eq!(bob.len(), 1);
        assert_eq!(bob[0].code, "00878");
    }
}
