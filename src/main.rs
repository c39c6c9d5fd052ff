use std::sync::Arc;

use etf_screener::{
    config::SETTINGS,
    ledger::{CsvStore, HoldingsLedger},
    logging, web,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();

    let state = Arc::new(web::AppState {
        ledger: HoldingsLedger::new(Box::new(CsvStore::new(SETTINGS.ledger.csv_path.as_str()))),
    });

    let listener = tokio::net::TcpListener::bind(&SETTINGS.system.bind).await?;
    logging::info_file_async(format!("etf_screener 啟動於 {}", SETTINGS.system.bind));

    axum::serve(listener, web::router(state)).await?;

    Ok(())
}
