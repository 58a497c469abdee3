//! 대시보드 요약 지표.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use trader_core::{CompletedTrade, Currency, EquityPoint};

use super::drawdown_fraction;

/// 총 수익.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TotalReturn {
    /// 절대 수익
    pub value: Decimal,
    /// 수익률 (%)
    pub percentage: Decimal,
}

/// 최종 자산.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FinalEquity {
    pub value: Decimal,
    pub currency: Currency,
}

/// 승률.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WinRate {
    /// 승률 (%)
    pub value: Decimal,
    pub total_trades: usize,
    pub win_trades: usize,
}

/// 최대 낙폭.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MaxDrawdown {
    /// 비율 (0.185 = 18.5%)
    pub value: Decimal,
    /// 백분율
    pub percentage: Decimal,
    /// 최대 낙폭 시점의 피크 자산
    pub peak_value: Decimal,
    /// 최대 낙폭 시점의 자산
    pub trough_value: Decimal,
}

/// 요약 지표.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Summary {
    pub total_return: TotalReturn,
    pub final_equity: FinalEquity,
    pub win_rate: WinRate,
    pub max_drawdown: MaxDrawdown,
}

/// 요약 지표를 계산합니다.
///
/// 최대 낙폭은 초기 자본에서 시작하는 러닝 피크를 따라가며
/// `(피크 - 자산) / 피크`가 가장 큰 지점을 기록합니다.
pub fn calculate_summary(
    initial_capital: Decimal,
    final_equity: Decimal,
    trades: &[CompletedTrade],
    equity_curve: &[EquityPoint],
    currency: Currency,
) -> Summary {
    let total_return_value = final_equity - initial_capital;
    let total_return_pct = if initial_capital > Decimal::ZERO {
        total_return_value / initial_capital * dec!(100)
    } else {
        Decimal::ZERO
    };

    let win_trades = trades.iter().filter(|t| t.is_win()).count();
    let win_rate = if trades.is_empty() {
        Decimal::ZERO
    } else {
        Decimal::from(win_trades) / Decimal::from(trades.len()) * dec!(100)
    };

    let mut running_max = initial_capital;
    let mut max_drawdown = Decimal::ZERO;
    let mut peak_value = initial_capital;
    let mut trough_value = initial_capital;

    for point in equity_curve {
        if point.equity_value > running_max {
            running_max = point.equity_value;
        }
        let drawdown = drawdown_fraction(running_max, point.equity_value);
        if drawdown > max_drawdown {
            max_drawdown = drawdown;
            peak_value = running_max;
            trough_value = point.equity_value;
        }
    }

    Summary {
        total_return: TotalReturn {
            value: total_return_value,
            percentage: total_return_pct,
        },
        final_equity: FinalEquity {
            value: final_equity,
            currency,
        },
        win_rate: WinRate {
            value: win_rate,
            total_trades: trades.len(),
            win_trades,
        },
        max_drawdown: MaxDrawdown {
            value: max_drawdown,
            percentage: max_drawdown * dec!(100),
            peak_value,
            trough_value,
        },
    }
}
