//! 차트용 데이터.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use trader_core::{month_key, CompletedTrade, EquityPoint};

use super::drawdown_fraction;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EquityCurvePoint {
    pub timestamp: i64,
    pub date: String,
    pub equity_value: Decimal,
    /// 초기 자본 대비 수익률 (%)
    pub return_percentage: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DrawdownPoint {
    pub timestamp: i64,
    pub date: String,
    /// 러닝 피크 대비 낙폭 (%)
    pub drawdown_percentage: Decimal,
    pub equity_value: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyReturn {
    /// "YYYY-MM" (청산 시각, UTC)
    pub month: String,
    /// 초기 자본 대비 해당 월 손익 (%)
    pub return_percentage: Decimal,
    pub profit_loss: Decimal,
    pub trade_count: usize,
}

/// 차트 데이터 묶음.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VisualizationData {
    pub equity_curve: Vec<EquityCurvePoint>,
    pub drawdown_chart: Vec<DrawdownPoint>,
    pub trades: Vec<CompletedTrade>,
    /// 월 오름차순
    pub monthly_returns: Vec<MonthlyReturn>,
}

/// 자산 곡선과 거래 목록으로 차트 데이터를 만듭니다.
pub fn calculate_visualization_data(
    initial_capital: Decimal,
    equity_curve: &[EquityPoint],
    trades: &[CompletedTrade],
) -> VisualizationData {
    let percent_of_capital = |value: Decimal| {
        if initial_capital.is_zero() {
            Decimal::ZERO
        } else {
            value / initial_capital * dec!(100)
        }
    };

    let curve = equity_curve
        .iter()
        .map(|point| EquityCurvePoint {
            timestamp: point.timestamp,
            date: point.date.clone(),
            equity_value: point.equity_value,
            return_percentage: percent_of_capital(point.equity_value - initial_capital),
        })
        .collect();

    let mut running_max = initial_capital;
    let drawdown_chart = equity_curve
        .iter()
        .map(|point| {
            running_max = running_max.max(point.equity_value);
            DrawdownPoint {
                timestamp: point.timestamp,
                date: point.date.clone(),
                drawdown_percentage: drawdown_fraction(running_max, point.equity_value)
                    * dec!(100),
                equity_value: point.equity_value,
            }
        })
        .collect();

    let mut months: BTreeMap<String, (Decimal, usize)> = BTreeMap::new();
    for trade in trades {
        let entry = months
            .entry(month_key(trade.exit_time))
            .or_insert((Decimal::ZERO, 0));
        entry.0 += trade.profit_loss;
        entry.1 += 1;
    }
    let monthly_returns = months
        .into_iter()
        .map(|(month, (profit_loss, trade_count))| MonthlyReturn {
            month,
            return_percentage: percent_of_capital(profit_loss),
            profit_loss,
            trade_count,
        })
        .collect();

    VisualizationData {
        equity_curve: curve,
        drawdown_chart,
        trades: trades.to_vec(),
        monthly_returns,
    }
}
