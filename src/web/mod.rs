//! JSON API 層。
//!
//! 只負責把核心元件接到 HTTP 上：排行、持股損益、兩個寫入動作與 CSV 匯出。
//! 表格呈現與登入閘門不在這一層；已驗證的身分就是路徑上的 username，
//! 由呼叫端顯式傳入，不靠全域狀態。

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::{delete, get, post},
    Json, Router,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{
    calculation::portfolio::{compute_positions, PortfolioPosition},
    crawler,
    declare::Instrument,
    error::ScreenerError,
    ledger::{HoldingsLedger, HoldingsRow},
    logging,
};

pub struct AppState {
    pub ledger: HoldingsLedger,
}

pub type SharedState = Arc<AppState>;

pub fn router(state: SharedState) -> Router {
    Router::new()
        .route("/etfs", get(list_etfs))
        .route("/etfs/export", get(export_csv))
        .route("/portfolio/{username}", get(portfolio))
        .route(
            "/portfolio/{username}/holdings",
            post(add_holding).put(replace_holdings),
        )
        .route("/portfolio/{username}/holdings/{code}", delete(delete_holding))
        .with_state(state)
}

impl IntoResponse for ScreenerError {
    fn into_response(self) -> Response {
        let status = match &self {
            ScreenerError::Validation { .. } => StatusCode::BAD_REQUEST,
            ScreenerError::SourceUnavailable { .. } | ScreenerError::ParseIncomplete { .. } => {
                StatusCode::BAD_GATEWAY
            }
            ScreenerError::Persistence { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        };

        (
            status,
            Json(serde_json::json!({ "error": self.to_string() })),
        )
            .into_response()
    }
}

#[derive(Deserialize, Default)]
struct ListQuery {
    /// `?refresh=1` 會先清掉快取再抓
    #[serde(default)]
    refresh: u8,
}

/// 依綜合報酬率由高到低排序，沒有報酬率的排最後；同分維持發現順序
fn rank(instruments: &mut [Instrument]) {
    instruments.sort_by(|a, b| b.composite_return.cmp(&a.composite_return));
}

async fn list_etfs(
    Query(query): Query<ListQuery>,
) -> Result<Json<Vec<Instrument>>, ScreenerError> {
    let mut instruments = crawler::universe(query.refresh == 1).await?;
    rank(&mut instruments);

    Ok(Json(instruments))
}

#[derive(Serialize)]
pub struct PortfolioResponse {
    /// universe 抓不到時為 true：部位照算，只是市價都是 0
    pub universe_unavailable: bool,
    pub positions: Vec<PortfolioPosition>,
}

async fn portfolio(
    State(state): State<SharedState>,
    Path(username): Path<String>,
) -> Result<Json<PortfolioResponse>, ScreenerError> {
    let holdings = state.ledger.list(&username)?;

    // 來源網站掛掉不該讓使用者看不到自己的持股，降級成空 universe 繼續算
    let (universe, universe_unavailable) = match crawler::universe(false).await {
        Ok(instruments) => (instruments, false),
        Err(why) => {
            logging::error_file_async(format!("Failed to build universe because {:?}", why));
            (Vec::new(), true)
        }
    };

    Ok(Json(PortfolioResponse {
        universe_unavailable,
        positions: compute_positions(&holdings, &universe),
    }))
}

#[derive(Deserialize)]
pub struct HoldingRequest {
    pub code: String,
    pub avg_cost: Decimal,
    pub quantity: i64,
}

async fn add_holding(
    State(state): State<SharedState>,
    Path(username): Path<String>,
    Json(req): Json<HoldingRequest>,
) -> Result<StatusCode, ScreenerError> {
    state
        .ledger
        .add(&username, &req.code, req.avg_cost, req.quantity)?;

    Ok(StatusCode::CREATED)
}

async fn replace_holdings(
    State(state): State<SharedState>,
    Path(username): Path<String>,
    Json(rows): Json<Vec<HoldingRequest>>,
) -> Result<StatusCode, ScreenerError> {
    let rows = rows
        .into_iter()
        .map(|req| HoldingsRow {
            username: username.clone(),
            code: req.code,
            avg_cost: req.avg_cost,
            quantity: req.quantity,
        })
        .collect();

    state.ledger.replace_all(&username, rows)?;

    Ok(StatusCode::NO_CONTENT)
}

async fn delete_holding(
    State(state): State<SharedState>,
    Path((username, code)): Path<(String, String)>,
) -> Result<StatusCode, ScreenerError> {
    if state.ledger.delete_one(&username, &code)? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Ok(StatusCode::NOT_FOUND)
    }
}

/// 把排行結果匯出成 CSV 附件，對應原本畫面上的下載按鈕
async fn export_csv() -> Result<Response, ScreenerError> {
    let mut instruments = crawler::universe(false).await?;
    rank(&mut instruments);

    let mut writer = csv::Writer::from_writer(Vec::new());
    writer
        .write_record([
            "code",
            "name",
            "market",
            "price",
            "return_1q",
            "return_half_year",
            "return_1y",
            "composite_return",
        ])
        .map_err(ScreenerError::persistence)?;

    for instrument in &instruments {
        writer
            .write_record([
                instrument.code.as_str(),
                instrument.name.as_str(),
                instrument.market_type.name(),
                &instrument.price.to_string(),
                &decimal_field(instrument.return_1q),
                &decimal_field(instrument.return_half_year),
                &decimal_field(instrument.return_1y),
                &decimal_field(instrument.composite_return),
            ])
            .map_err(ScreenerError::persistence)?;
    }

    let body = writer
        .into_inner()
        .map_err(ScreenerError::persistence)?;

    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8"),
            (
                header::CONTENT_DISPOSITION,
                "attachment; filename=\"etf_analysis.csv\"",
            ),
        ],
        body,
    )
        .into_response())
}

fn decimal_field(value: Option<Decimal>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}
