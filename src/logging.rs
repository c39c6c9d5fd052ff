//! 檔案日誌模組。
//!
//! 寫檔在背景執行緒處理，呼叫端只把訊息丟進 channel 就返回，
//! 不會因磁碟慢而卡住抓取流程。日誌檔按日期輪替，放在 `log/` 目錄下。

use std::{
    fs,
    fs::OpenOptions,
    io::Write,
    path::{Path, PathBuf},
    thread,
};

use chrono::{DateTime, Local};
use concat_string::concat_string;
use crossbeam_channel::{unbounded, Sender};
use once_cell::sync::Lazy;

static LOGGER: Lazy<Logger> = Lazy::new(|| Logger::new("etf_screener"));

pub struct Logger {
    writer: Sender<LogMessage>,
}

impl Logger {
    fn new(log_name: &str) -> Self {
        let (tx, rx) = unbounded::<LogMessage>();
        let name = log_name.to_string();

        //寫入檔案的操作使用另一個線程處理
        thread::spawn(move || {
            while let Ok(received) = rx.recv() {
                let line = concat_string!(
                    received.created_at.format("%F %X%.6f").to_string(),
                    " ",
                    received.level.to_string(),
                    " ",
                    received.msg,
                    "\n"
                );

                if let Err(why) = append_line(&name, &line) {
                    error_console(format!("Failed to write log because {:?}", why));
                }
            }
        });

        Logger { writer: tx }
    }

    fn info(&self, log: String) {
        self.send(log::Level::Info, log);
    }

    fn error(&self, log: String) {
        self.send(log::Level::Error, log);
    }

    fn debug(&self, log: String) {
        self.send(log::Level::Debug, log);
    }

    fn send(&self, level: log::Level, msg: String) {
        if let Err(why) = self.writer.send(LogMessage::new(level, msg)) {
            error_console(why.to_string());
        }
    }
}

struct LogMessage {
    level: log::Level,
    msg: String,
    created_at: DateTime<Local>,
}

impl LogMessage {
    fn new(level: log::Level, msg: String) -> Self {
        LogMessage {
            level,
            msg,
            created_at: Local::now(),
        }
    }
}

fn append_line(name: &str, line: &str) -> std::io::Result<()> {
    let path = log_path(name)?;
    let mut file = OpenOptions::new().create(true).append(true).open(path)?;
    file.write_all(line.as_bytes())
}

fn log_path(name: &str) -> std::io::Result<PathBuf> {
    let dir = Path::new("log");
    if !dir.exists() {
        fs::create_dir_all(dir)?;
    }

    let mut log_path = PathBuf::from(dir);
    log_path.push(format!("{}_{}.log", name, Local::now().format("%Y-%m-%d")));

    Ok(log_path)
}

pub fn info_file_async(log: String) {
    LOGGER.info(log);
}

pub fn error_file_async(log: String) {
    LOGGER.error(log);
}

pub fn debug_file_async(log: String) {
    LOGGER.debug(log);
}

pub fn error_console(log: String) {
    eprintln!("{} {}", Local::now().format("%F %X%.6f"), log);
}
