use std::time::{Duration, Instant};

use anyhow::{anyhow, Result};
use once_cell::sync::OnceCell;
use reqwest::Client;

use crate::logging;

pub mod element;
pub mod user_agent;

/// A singleton instance of the reqwest client.
static CLIENT: OnceCell<Client> = OnceCell::new();

/// Returns the reqwest client singleton instance or creates one if it doesn't exist.
fn get_client() -> Result<&'static Client> {
    CLIENT.get_or_try_init(|| {
        Client::builder()
            // ===== 壓縮 =====
            .brotli(true)
            .gzip(true)
            // ===== 超時設置 =====
            .connect_timeout(Duration::from_secs(8))
            .timeout(Duration::from_secs(15))
            // ===== TCP =====
            .tcp_nodelay(true)
            .tcp_keepalive(Duration::from_secs(60))
            // ===== Headers =====
            .referer(true)
            .user_agent(user_agent::gen_random_ua())
            .build()
            .map_err(|e| anyhow!("Failed to create reqwest client: {:?}", e))
    })
}

/// Performs an HTTP GET request and returns the response as text.
///
/// 請求失敗不重試，由呼叫端決定略過或中止整個流程。
///
/// # Arguments
///
/// * `url`: The URL to send the GET request to.
///
/// # Returns
///
/// * `Result<String>`: The response text, or an error if the request fails,
///   the status is not 2xx, or the response cannot be decoded.
pub async fn get(url: &str) -> Result<String> {
    let start = Instant::now();
    let response = get_client()?
        .get(url)
        .send()
        .await
        .map_err(|why| anyhow!("Failed to GET {} because {:?}", url, why))?;

    let status = response.status();
    if !status.is_success() {
        return Err(anyhow!("GET {} returned status {}", url, status));
    }

    let text = response
        .text()
        .await
        .map_err(|why| anyhow!("Error parsing response text: {:?}", why))?;

    logging::info_file_async(format!("GET:{} {} ms", url, start.elapsed().as_millis()));

    Ok(text)
}
