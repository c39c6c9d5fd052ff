use std::collections::HashMap;

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::Serialize;

use crate::{declare::Instrument, ledger::HoldingsRow};

/// 代號對不到市價時顯示的名稱
const BAD_CODE_NAME: &str = "unknown(bad code)";

/// 一筆持股與市價 join 後的即時損益，每次計算都重新產生
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PortfolioPosition {
    pub code: String,
    pub name: String,
    /// 目前股價，代號解析不到時為 0
    pub price: Decimal,
    pub avg_cost: Decimal,
    pub quantity: i64,
    /// 市值 = 股價 × 股數
    pub market_value: Decimal,
    /// 成本 = 平均成本 × 股數
    pub cost_basis: Decimal,
    /// 未實現損益 = 市值 − 成本
    pub unrealized_pl: Decimal,
    /// 報酬率(%)，成本為零時定義為 0，不做除以零
    pub return_pct: Decimal,
}

/// 將持股 left join 上市價資料。
///
/// join key 是標準化後的代號；對不到的持股仍會產生一筆
/// price = 0、name = "unknown(bad code)" 的部位，使用者看得到自己的持股，
/// 只是該檔目前解析不出市價。
pub fn compute_positions(
    holdings: &[HoldingsRow],
    universe: &[Instrument],
) -> Vec<PortfolioPosition> {
    let by_code: HashMap<&str, &Instrument> = universe
        .iter()
        .map(|instrument| (instrument.code.as_str(), instrument))
        .collect();

    holdings
        .iter()
        .map(|holding| {
            let instrument = by_code.get(holding.code.as_str());
            let price = instrument.map_or(Decimal::ZERO, |i| i.price);
            let name = instrument.map_or_else(|| BAD_CODE_NAME.to_string(), |i| i.name.clone());

            let quantity = Decimal::from(holding.quantity);
            let market_value = price * quantity;
            let cost_basis = holding.avg_cost * quantity;
            let unrealized_pl = market_value - cost_basis;
            let return_pct = if cost_basis > Decimal::ZERO {
                (unrealized_pl / cost_basis * dec!(100)).round_dp(2)
            } else {
                Decimal::ZERO
            };

            PortfolioPosition {
                code: holding.code.clone(),
                name,
                price,
                avg_cost: holding.avg_cost,
                quantity: holding.quantity,
                market_value,
                cost_basis,
                unrealized_pl,
                return_pct,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::declare::MarketType;

    fn instrument(code: &str, price: Decimal) -> Instrument {
        Instrument {
            code: code.to_string(),
            name: format!("ETF {}", code),
            market_type: MarketType::Listed,
            price,
            return_1q: None,
            return_half_year: None,
            return_1y: None,
            composite_return: None,
        }
    }

    fn holding(code: &str, avg_cost: Decimal, quantity: i64) -> HoldingsRow {
        HoldingsRow {
            username: "amy".to_string(),
            code: code.to_string(),
            avg_cost,
            quantity,
        }
    }

    #[test]
    fn test_matched_position_arithmetic() {
        let universe = vec![instrument("0050", dec!(120))];
        let holdings = vec![holding("0050", dec!(100), 1000)];

        let positions = compute_positions(&holdings, &universe);
        assert_eq!(positions.len(), 1);

        let p = &positions[0];
        assert_eq!(p.name, "ETF 0050");
        assert_eq!(p.market_value, dec!(120000));
        assert_eq!(p.cost_basis, dec!(100000));
        assert_eq!(p.unrealized_pl, dec!(20000));
        assert_eq!(p.return_pct, dec!(20.00));
    }

    #[test]
    fn test_zero_cost_basis_has_no_division() {
        let universe = vec![instrument("0050", dec!(120))];
        let holdings = vec![holding("0050", Decimal::ZERO, 1000)];

        let p = &compute_positions(&holdings, &universe)[0];
        assert_eq!(p.return_pct, Decimal::ZERO);
        assert_eq!(p.unrealized_pl, p.market_value);
    }

    #[test]
    fn test_unmatched_holding_still_produces_position() {
        let universe = vec![instrument("0050", dec!(120))];
        let holdings = vec![holding("9999", dec!(10), 100)];

        let p = &compute_positions(&holdings, &universe)[0];
        assert_eq!(p.name, "unknown(bad code)");
        assert_eq!(p.price, Decimal::ZERO);
        assert_eq!(p.market_value, Decimal::ZERO);
        assert_eq!(p.unrealized_pl, dec!(-1000));
        assert_eq!(p.return_pct, dec!(-100.00));
    }

    #[test]
    fn test_inputs_are_not_mutated() {
        let universe = vec![instrument("0050", dec!(120))];
        let holdings = vec![holding("0050", dec!(100), 1000)];
        let holdings_before = holdings.clone();
        let universe_before = universe.clone();

        let _ = compute_positions(&holdings, &universe);

        assert_eq!(holdings, holdings_before);
        assert_eq!(universe, universe_before);
    }
}
