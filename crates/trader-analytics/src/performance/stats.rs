//! 상세 통계 (거래, 수익성, 성장률, 변동성, 기간).

use chrono::NaiveDate;
use rust_decimal::{prelude::ToPrimitive, Decimal};
use serde::{Deserialize, Serialize};
use trader_core::{CompletedTrade, DateRange, EquityPoint};

use super::{final_equity_of, ratio_serde};

/// 무위험 이자율 (연 2%)
pub const RISK_FREE_RATE: f64 = 0.02;

/// 연율화 계수 (캔들 수익률 기준)
pub const ANNUALIZATION_FACTOR: f64 = 252.0;

/// 1년 일수 (CAGR 기간 계산용)
pub const DAYS_PER_YEAR: f64 = 365.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TradeStats {
    pub total_trades: usize,
    /// 순손익 > 0
    pub profitable_trades: usize,
    /// 순손익 < 0
    pub losing_trades: usize,
    /// 최장 연승
    pub consecutive_wins: usize,
    /// 최장 연패 (손익 0 포함)
    pub consecutive_losses: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfitabilityStats {
    /// (총이익 - 총손실) / 거래 수
    pub average_profit_per_trade: Decimal,
    /// 총이익 / 총손실. 손실 없이 이익만 있으면 무한대, 둘 다 없으면 0.
    #[serde(with = "ratio_serde")]
    pub profit_factor: f64,
    /// 평균 이익 / 평균 손실. 무한대/0 규칙은 수익 팩터와 같습니다.
    #[serde(with = "ratio_serde")]
    pub payoff_ratio: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GrowthStats {
    /// 연평균 성장률 (%)
    pub cagr: f64,
    pub total_profit: Decimal,
    /// 손실 합계의 절대값
    pub total_loss: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VolatilityStats {
    pub sharpe_ratio: f64,
    pub sortino_ratio: f64,
    /// 캔들 수익률의 표준편차 (%)
    pub std_dev: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PeriodInfo {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub days_count: i64,
    pub years_count: f64,
}

/// 상세 통계.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetailedStats {
    pub trades: TradeStats,
    pub profitability: ProfitabilityStats,
    pub growth: GrowthStats,
    pub volatility: VolatilityStats,
    pub period: PeriodInfo,
}

/// 상세 통계를 계산합니다.
pub fn calculate_detailed_stats(
    initial_capital: Decimal,
    trades: &[CompletedTrade],
    equity_curve: &[EquityPoint],
    date_range: &DateRange,
) -> DetailedStats {
    let winners: Vec<&CompletedTrade> = trades.iter().filter(|t| t.is_win()).collect();
    let losers: Vec<&CompletedTrade> = trades
        .iter()
        .filter(|t| t.profit_loss < Decimal::ZERO)
        .collect();
    let (consecutive_wins, consecutive_losses) = longest_streaks(trades);

    let total_profit: Decimal = winners.iter().map(|t| t.profit_loss).sum();
    let total_loss: Decimal = losers.iter().map(|t| t.profit_loss).sum::<Decimal>().abs();
    let avg_profit = average(total_profit, winners.len());
    let avg_loss = average(total_loss, losers.len());
    let average_profit_per_trade = average(total_profit - total_loss, trades.len());

    let days_count = date_range.days();
    let years_count = days_count as f64 / DAYS_PER_YEAR;
    let final_equity = final_equity_of(initial_capital, equity_curve);

    let returns = candle_returns(equity_curve);
    let (sharpe_ratio, sortino_ratio, std_dev) = volatility_ratios(&returns);

    DetailedStats {
        trades: TradeStats {
            total_trades: trades.len(),
            profitable_trades: winners.len(),
            losing_trades: losers.len(),
            consecutive_wins,
            consecutive_losses,
        },
        profitability: ProfitabilityStats {
            average_profit_per_trade,
            profit_factor: ratio(total_profit, total_loss),
            payoff_ratio: ratio(avg_profit, avg_loss),
        },
        growth: GrowthStats {
            cagr: cagr(initial_capital, final_equity, years_count),
            total_profit,
            total_loss,
        },
        volatility: VolatilityStats {
            sharpe_ratio,
            sortino_ratio,
            std_dev: std_dev * 100.0,
        },
        period: PeriodInfo {
            start_date: date_range.start_date,
            end_date: date_range.end_date,
            days_count,
            years_count,
        },
    }
}

/// 최장 연승/연패. 손익 0은 패배로 셉니다.
fn longest_streaks(trades: &[CompletedTrade]) -> (usize, usize) {
    let mut max_wins = 0;
    let mut max_losses = 0;
    let mut streak = 0;
    let mut winning = true;

    for trade in trades {
        let win = trade.is_win();
        if win == winning {
            streak += 1;
        } else {
            streak = 1;
            winning = win;
        }
        if win {
            max_wins = max_wins.max(streak);
        } else {
            max_losses = max_losses.max(streak);
        }
    }

    (max_wins, max_losses)
}

fn average(total: Decimal, count: usize) -> Decimal {
    if count == 0 {
        Decimal::ZERO
    } else {
        total / Decimal::from(count)
    }
}

/// `numerator / denominator`. 분모가 0이면 분자 > 0일 때 무한대, 아니면 0.
fn ratio(numerator: Decimal, denominator: Decimal) -> f64 {
    if denominator > Decimal::ZERO {
        to_f64(numerator / denominator)
    } else if numerator > Decimal::ZERO {
        f64::INFINITY
    } else {
        0.0
    }
}

fn cagr(initial_capital: Decimal, final_equity: Decimal, years: f64) -> f64 {
    if years <= 0.0 || initial_capital <= Decimal::ZERO {
        return 0.0;
    }
    let growth = to_f64(final_equity / initial_capital);
    if growth <= 0.0 {
        return -100.0;
    }
    (growth.powf(1.0 / years) - 1.0) * 100.0
}

/// 캔들 간 자산 수익률. 직전 자산이 0이면 0.
fn candle_returns(equity_curve: &[EquityPoint]) -> Vec<f64> {
    equity_curve
        .windows(2)
        .map(|w| {
            let prev = w[0].equity_value;
            if prev.is_zero() {
                0.0
            } else {
                to_f64((w[1].equity_value - prev) / prev)
            }
        })
        .collect()
}

/// (샤프, 소르티노, 수익률 표준편차).
///
/// 평균과 모표준편차를 ×252 / ×√252로 연율화하고 무위험 이자율 2%를 뺍니다.
/// 소르티노의 하방 편차는 음수 수익률 제곱 평균의 제곱근입니다.
fn volatility_ratios(returns: &[f64]) -> (f64, f64, f64) {
    if returns.is_empty() {
        return (0.0, 0.0, 0.0);
    }

    let n = returns.len() as f64;
    let mean = returns.iter().sum::<f64>() / n;
    let variance = returns.iter().map(|r| (r - mean).powi(2)).sum::<f64>() / n;
    let std_dev = variance.sqrt();

    let annualized_return = mean * ANNUALIZATION_FACTOR;
    let excess_return = annualized_return - RISK_FREE_RATE;
    let annualized_std = std_dev * ANNUALIZATION_FACTOR.sqrt();
    let sharpe = if annualized_std > 0.0 {
        excess_return / annualized_std
    } else {
        0.0
    };

    let negatives: Vec<f64> = returns.iter().copied().filter(|r| *r < 0.0).collect();
    let downside = if negatives.is_empty() {
        0.0
    } else {
        (negatives.iter().map(|r| r * r).sum::<f64>() / negatives.len() as f64).sqrt()
            * ANNUALIZATION_FACTOR.sqrt()
    };
    let sortino = if downside > 0.0 {
        excess_return / downside
    } else {
        0.0
    };

    (sharpe, sortino, std_dev)
}

fn to_f64(value: Decimal) -> f64 {
    value.to_f64().unwrap_or(0.0)
}
