use std::{fs, fs::OpenOptions, path::PathBuf};

use crate::{error::ScreenerError, ledger::HoldingsRow};

/// 持股存檔的表頭
const HEADER: [&str; 4] = ["username", "code", "avg_cost", "quantity"];

/// 持股存檔的後端抽象：只有讀全部、附加一列與整份重寫三個原語，
/// 沒有列級別的更新或刪除。
pub trait TableStore: Send + Sync {
    fn read_all(&self) -> Result<Vec<HoldingsRow>, ScreenerError>;
    fn append(&self, row: &HoldingsRow) -> Result<(), ScreenerError>;
    fn write_all(&self, rows: &[HoldingsRow]) -> Result<(), ScreenerError>;
}

/// CSV 平面檔實作。
///
/// 整份重寫時先寫到暫存檔再 rename 蓋回去，寫到一半失敗不會留下
/// 被清空的存檔，讀取端看到的不是舊檔就是新檔。
pub struct CsvStore {
    path: PathBuf,
}

impl CsvStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        CsvStore { path: path.into() }
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self.path.as_os_str().to_os_string();
        name.push(".tmp");
        PathBuf::from(name)
    }
}

impl TableStore for CsvStore {
    fn read_all(&self) -> Result<Vec<HoldingsRow>, ScreenerError> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }

        let mut reader = csv::Reader::from_path(&self.path).map_err(ScreenerError::persistence)?;
        let mut rows = Vec::new();

        for record in reader.deserialize::<HoldingsRow>() {
            rows.push(record.map_err(ScreenerError::persistence)?);
        }

        Ok(rows)
    }

    fn append(&self, row: &HoldingsRow) -> Result<(), ScreenerError> {
        if !self.path.exists() {
            return self.write_all(std::slice::from_ref(row));
        }

        let file = OpenOptions::new()
            .append(true)
            .open(&self.path)
            .map_err(ScreenerError::persistence)?;
        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(file);

        writer.serialize(row).map_err(ScreenerError::persistence)?;
        writer.flush().map_err(ScreenerError::persistence)
    }

    fn write_all(&self, rows: &[HoldingsRow]) -> Result<(), ScreenerError> {
        let temp = self.temp_path();

        {
            let mut writer = csv::WriterBuilder::new()
                .has_headers(false)
                .from_path(&temp)
                .map_err(ScreenerError::persistence)?;

            writer
                .write_record(HEADER)
                .map_err(ScreenerError::persistence)?;

            for row in rows {
                writer.serialize(row).map_err(ScreenerError::persistence)?;
            }

            writer.flush().map_err(ScreenerError::persistence)?;
        }

        fs::rename(&temp, &self.path).map_err(ScreenerError::persistence)
    }
}
