//! 성과 지표 계산.
//!
//! 시뮬레이션이 만든 거래 목록과 자산 곡선에서 다음을 산출합니다:
//! - [`Summary`]: 총 수익률, 최종 자산, 승률, 최대 낙폭
//! - [`DetailedStats`]: 거래 통계, 수익성, 성장률, 변동성, 기간
//! - [`VisualizationData`]: 자산 곡선, 낙폭 차트, 월별 수익
//!
//! 0으로 나누는 경우는 모두 명시적으로 0 또는 무한대로 처리하며 NaN을 만들지 않습니다.

mod stats;
mod summary;
mod visualization;

pub use stats::{
    calculate_detailed_stats, DetailedStats, GrowthStats, PeriodInfo, ProfitabilityStats,
    TradeStats, VolatilityStats, ANNUALIZATION_FACTOR, DAYS_PER_YEAR, RISK_FREE_RATE,
};
pub use summary::{
    calculate_summary, FinalEquity, MaxDrawdown, Summary, TotalReturn, WinRate,
};
pub use visualization::{
    calculate_visualization_data, DrawdownPoint, EquityCurvePoint, MonthlyReturn,
    VisualizationData,
};

use rust_decimal::Decimal;
use trader_core::EquityPoint;

/// 러닝 피크 대비 낙폭 비율. 피크가 0 이하면 0.
pub(crate) fn drawdown_fraction(running_max: Decimal, equity: Decimal) -> Decimal {
    if running_max <= Decimal::ZERO {
        return Decimal::ZERO;
    }
    (running_max - equity) / running_max
}

/// 자산 곡선의 마지막 값. 곡선이 비어있으면 초기 자본.
pub(crate) fn final_equity_of(initial_capital: Decimal, equity_curve: &[EquityPoint]) -> Decimal {
    equity_curve
        .last()
        .map(|p| p.equity_value)
        .unwrap_or(initial_capital)
}

/// 무한대를 JSON `null`로 직렬화하고 `null`은 무한대로 읽는 `f64` 직렬화.
///
/// serde_json에는 무한대 리터럴이 없으므로 수익 팩터/손익비에 사용합니다.
pub mod ratio_serde {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &f64, serializer: S) -> Result<S::Ok, S::Error> {
        if value.is_finite() {
            serializer.serialize_f64(*value)
        } else {
            serializer.serialize_none()
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
        Ok(Option::<f64>::deserialize(deserializer)?.unwrap_or(f64::INFINITY))
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use rust_decimal::Decimal;
    use trader_core::{
        format_date, CompletedTrade, EquityPoint, ExitReason, TradeDirection, TradeStatus,
    };

    pub const HOUR_MS: i64 = 3_600_000;

    /// 손익만 지정한 테스트용 거래.
    pub fn trade(id: usize, exit_time: i64, profit_loss: Decimal) -> CompletedTrade {
        CompletedTrade {
            trade_id: id,
            entry_time: exit_time - HOUR_MS,
            entry_price: Decimal::ONE_HUNDRED,
            exit_time,
            exit_price: Decimal::ONE_HUNDRED,
            quantity: Decimal::ONE,
            direction: TradeDirection::Long,
            gross_profit_loss: profit_loss,
            profit_loss,
            profit_loss_percent: profit_loss,
            entry_fee: Decimal::ZERO,
            exit_fee: Decimal::ZERO,
            total_fee: Decimal::ZERO,
            duration: HOUR_MS,
            status: if profit_loss > Decimal::ZERO {
                TradeStatus::Profit
            } else {
                TradeStatus::Loss
            },
            exit_reason: ExitReason::ExitCondition,
        }
    }

    /// 자산 값 배열로 시간 단위 자산 곡선을 만듭니다.
    pub fn curve(values: &[Decimal]) -> Vec<EquityPoint> {
        values
            .iter()
            .enumerate()
            .map(|(i, value)| {
                let timestamp = i as i64 * HOUR_MS;
                EquityPoint {
                    timestamp,
                    date: format_date(timestamp),
                    equity_value: *value,
                    cash: *value,
                    unrealized_pnl: Decimal::ZERO,
                }
            })
            .collect()
    }
}
