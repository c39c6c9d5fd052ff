use std::{env, path::PathBuf};

use anyhow::Result;
use config::{Config as config_config, File as config_file};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

const CONFIG_PATH: &str = "app.json";

const SYSTEM_BIND: &str = "SYSTEM_BIND";
const SOURCE_LISTING_URL: &str = "SOURCE_LISTING_URL";
const SOURCE_DETAIL_URL: &str = "SOURCE_DETAIL_URL";
const SOURCE_CACHE_TTL_MINUTES: &str = "SOURCE_CACHE_TTL_MINUTES";
const SOURCE_FETCH_DELAY_MILLIS: &str = "SOURCE_FETCH_DELAY_MILLIS";
const LEDGER_CSV_PATH: &str = "LEDGER_CSV_PATH";

#[derive(Serialize, Deserialize, Default, Debug, Clone)]
pub struct App {
    #[serde(default)]
    pub system: System,
    #[serde(default)]
    pub source: Source,
    #[serde(default)]
    pub ledger: Ledger,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct System {
    /// HTTP 服務監聽位址
    #[serde(default = "System::default_bind")]
    pub bind: String,
}

impl System {
    fn default_bind() -> String {
        "0.0.0.0:9001".to_string()
    }
}

impl Default for System {
    fn default() -> Self {
        System {
            bind: System::default_bind(),
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct Source {
    /// ETF 清單頁
    #[serde(default = "Source::default_listing_url")]
    pub listing_url: String,
    /// 個別 ETF 明細頁，`{code}` 會被換成代號
    #[serde(default = "Source::default_detail_url")]
    pub detail_url: String,
    /// universe 快取存活時間（分鐘）
    #[serde(default = "Source::default_cache_ttl_minutes")]
    pub cache_ttl_minutes: u64,
    /// 每檔明細頁抓取間的延遲，對來源網站的禮貌性節流
    #[serde(default = "Source::default_fetch_delay_millis")]
    pub fetch_delay_millis: u64,
}

impl Source {
    fn default_listing_url() -> String {
        "https://www.moneydj.com/etf/x/rank/tw/list".to_string()
    }

    fn default_detail_url() -> String {
        "https://www.moneydj.com/etf/x/basic/tw/{code}".to_string()
    }

    fn default_cache_ttl_minutes() -> u64 {
        60
    }

    fn default_fetch_delay_millis() -> u64 {
        300
    }
}

impl Default for Source {
    fn default() -> Self {
        Source {
            listing_url: Source::default_listing_url(),
            detail_url: Source::default_detail_url(),
            cache_ttl_minutes: Source::default_cache_ttl_minutes(),
            fetch_delay_millis: Source::default_fetch_delay_millis(),
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct Ledger {
    /// 持股存檔路徑
    #[serde(default = "Ledger::default_csv_path")]
    pub csv_path: String,
}

impl Ledger {
    fn default_csv_path() -> String {
        "holdings.csv".to_string()
    }
}

impl Default for Ledger {
    fn default() -> Self {
        Ledger {
            csv_path: Ledger::default_csv_path(),
        }
    }
}

pub static SETTINGS: Lazy<App> = Lazy::new(|| App::get().expect("Config error"));

impl App {
    fn get() -> Result<Self> {
        let config_path = config_path();
        if config_path.exists() {
            let config: App = config_config::builder()
                .add_source(config_file::from(config_path))
                .build()?
                .try_deserialize()?;
            return Ok(config.override_with_env());
        }

        Ok(App::default().override_with_env())
    }

    /// 將來至於 env 的設定值覆蓋掉 json 上的設定值
    fn override_with_env(mut self) -> Self {
        if let Ok(bind) = env::var(SYSTEM_BIND) {
            self.system.bind = bind;
        }

        if let Ok(url) = env::var(SOURCE_LISTING_URL) {
            self.source.listing_url = url;
        }

        if let Ok(url) = env::var(SOURCE_DETAIL_URL) {
            self.source.detail_url = url;
        }

        if let Ok(ttl) = env::var(SOURCE_CACHE_TTL_MINUTES) {
            if let Ok(minutes) = ttl.parse::<u64>() {
                self.source.cache_ttl_minutes = minutes;
            }
        }

        if let Ok(delay) = env::var(SOURCE_FETCH_DELAY_MILLIS) {
            if let Ok(millis) = delay.parse::<u64>() {
                self.source.fetch_delay_millis = millis;
            }
        }

        if let Ok(path) = env::var(LEDGER_CSV_PATH) {
            self.ledger.csv_path = path;
        }

        self
    }
}

fn config_path() -> PathBuf {
    PathBuf::from(CONFIG_PATH)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let app = App::default();
        assert_eq!(app.source.cache_ttl_minutes, 60);
        assert!(app.source.detail_url.contains("{code}"));
        assert_eq!(app.ledger.csv_path, "holdings.csv");
    }
}
