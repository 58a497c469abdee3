//! 백테스팅 엔진
//!
//! 캔들을 하나씩 순회하며 규칙 기반 전략을 시뮬레이션합니다.
//!
//! # 캔들 처리 순서
//!
//! 워밍업 이후 각 캔들 `i`에 대해:
//!
//! 1. 포지션 보유 중이면 손절 → 익절 → 청산 조건 순으로 확인하고,
//!    처음 충족된 사유 하나로 종가에 청산합니다.
//! 2. 포지션이 없으면 (방금 청산한 경우 포함) 진입 조건을 평가하고,
//!    충족되면 종가에 진입합니다.
//! 3. 현금 + 포지션 평가액으로 자산 곡선 포인트를 추가합니다.
//!
//! 데이터가 끝났을 때 남은 포지션은 마지막 종가로 강제 청산합니다.
//!
//! # 사용 예시
//!
//! ```rust,ignore
//! use trader_backtest::{run_backtest, BacktestConfig};
//!
//! let config = BacktestConfig::default();
//! let result = run_backtest(&candles, &config)?;
//!
//! println!("{}", result.summary_text());
//! ```

use std::time::Instant;

use chrono::Utc;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use tracing::{debug, info, warn};
use trader_analytics::{
    calculate_detailed_stats, calculate_summary, calculate_visualization_data, IndicatorCache,
};
use trader_core::{
    format_date, Candle, CompletedTrade, EquityPoint, ExitReason, MoneyManagement, Position,
    PositionDirection, TradeDirection,
};
use trader_strategy::{evaluate_condition_group, validate_strategy_schema};

use crate::config::BacktestConfig;
use crate::error::{BacktestError, Result};
use crate::result::BacktestResult;

/// 진행 상황 로그 간격 (캔들 수)
const PROGRESS_LOG_INTERVAL: usize = 100;

/// 백테스팅 엔진
///
/// 하나의 캔들 배열과 그 배열로 만든 지표 캐시를 소유합니다.
/// 같은 캔들로 손절/익절이나 자금 관리만 바꿔 반복 실행할 때는
/// [`into_cache`](Self::into_cache)로 캐시를 꺼내 [`with_cache`](Self::with_cache)로 재사용합니다.
pub struct BacktestEngine<'a> {
    /// 시간 오름차순 캔들
    candles: &'a [Candle],

    /// 설정
    config: &'a BacktestConfig,

    /// 지표 캐시
    cache: IndicatorCache,
}

impl<'a> BacktestEngine<'a> {
    /// 새로운 백테스트 엔진을 생성합니다.
    ///
    /// 캔들 데이터와 설정을 검증한 뒤 지표를 사전 계산합니다.
    pub fn new(candles: &'a [Candle], config: &'a BacktestConfig) -> Result<Self> {
        validate_inputs(candles, config)?;

        let mut cache = IndicatorCache::new(candles);
        cache.warm_for_strategy(&config.strategy);

        Ok(Self {
            candles,
            config,
            cache,
        })
    }

    /// 이전 실행의 지표 캐시를 재사용하는 엔진을 생성합니다.
    ///
    /// 캐시는 같은 캔들 배열로 만들어져 있어야 합니다.
    pub fn with_cache(
        candles: &'a [Candle],
        config: &'a BacktestConfig,
        mut cache: IndicatorCache,
    ) -> Result<Self> {
        validate_inputs(candles, config)?;

        if cache.len() != candles.len() {
            return Err(BacktestError::DataError(format!(
                "지표 캐시와 캔들 수가 다릅니다 (캐시: {}, 캔들: {})",
                cache.len(),
                candles.len()
            )));
        }
        if !cache.matches(candles) {
            return Err(BacktestError::DataError(
                "지표 캐시가 다른 캔들 데이터로 만들어졌습니다".to_string(),
            ));
        }
        cache.warm_for_strategy(&config.strategy);

        Ok(Self {
            candles,
            config,
            cache,
        })
    }

    /// 시뮬레이션 시작 인덱스.
    pub fn warmup_period(&self) -> usize {
        self.config.strategy.warmup_period()
    }

    /// 지표 캐시를 꺼냅니다.
    pub fn into_cache(self) -> IndicatorCache {
        self.cache
    }

    /// 백테스트를 실행합니다.
    pub fn run(&mut self) -> Result<BacktestResult> {
        let started = Instant::now();
        let config = self.config;
        let candles = self.candles;
        let env = &config.environment;
        let warmup = self.warmup_period();
        let cost_pct = env.execution_cost_pct();

        info!(
            symbol = %env.symbol,
            candles = candles.len(),
            warmup,
            initial_capital = %env.initial_capital,
            "백테스트 시작"
        );

        let mut ledger = Ledger::new(env.initial_capital, cost_pct);

        for index in warmup..candles.len() {
            let candle = &candles[index];

            if index % PROGRESS_LOG_INTERVAL == 0 {
                debug!(
                    index,
                    cash = %ledger.cash,
                    trades = ledger.trades.len(),
                    "백테스트 진행 중"
                );
            }

            // 1. 청산
            let exit_reason = match ledger.position.as_ref() {
                Some(position) => self.exit_trigger(position, index)?,
                None => None,
            };
            if let Some(reason) = exit_reason {
                ledger.close(candle, reason)?;
            }

            // 2. 진입 (같은 캔들 재진입 허용)
            if ledger.position.is_none()
                && evaluate_condition_group(
                    &config.strategy.entry_condition,
                    &mut self.cache,
                    candles,
                    index,
                )
            {
                ledger.open(candle, &config.money_management)?;
            }

            // 3. 자산 기록
            ledger.record_equity(candle)?;
        }

        // 미청산 포지션 강제 청산
        if let Some(last) = candles.last() {
            if ledger.position.is_some() {
                warn!(time = last.time, price = %last.close, "데이터 종료: 포지션 강제 청산");
                ledger.close(last, ExitReason::ExitCondition)?;
                // 강제 청산 후 최종 자산 업데이트 (실현 손익 반영)
                ledger.settle_last_equity();
            }
        }

        let Ledger {
            trades,
            equity_curve,
            ..
        } = ledger;

        let initial_capital = env.initial_capital;
        let final_equity = equity_curve
            .last()
            .map(|p| p.equity_value)
            .unwrap_or(initial_capital);

        let summary = calculate_summary(
            initial_capital,
            final_equity,
            &trades,
            &equity_curve,
            env.initial_currency,
        );
        let stats =
            calculate_detailed_stats(initial_capital, &trades, &equity_curve, &env.date_range);
        let visualization = calculate_visualization_data(initial_capital, &equity_curve, &trades);

        let execution_time_ms = started.elapsed().as_millis() as u64;
        info!(
            trades = trades.len(),
            final_equity = %final_equity,
            execution_time_ms,
            "백테스트 완료"
        );

        Ok(BacktestResult {
            summary,
            stats,
            visualization,
            timestamp: Utc::now().timestamp_millis(),
            execution_time_ms,
            config: config.clone(),
        })
    }

    /// 보유 포지션의 청산 사유. 손절 → 익절 → 청산 조건 순으로 처음 충족된 것.
    fn exit_trigger(&mut self, position: &Position, index: usize) -> Result<Option<ExitReason>> {
        let config = self.config;
        let strategy = &config.strategy;
        let close = self.candles[index].close;
        let pnl_pct = position.pnl_percent(close).ok_or_else(|| overflow("손익률"))?;

        if strategy.stop_loss.enabled && pnl_pct <= -strategy.stop_loss.percentage {
            warn!(index, pnl_pct = %pnl_pct, "손절 발동");
            return Ok(Some(ExitReason::StopLoss));
        }
        if strategy.take_profit.enabled && pnl_pct >= strategy.take_profit.percentage {
            debug!(index, pnl_pct = %pnl_pct, "익절 발동");
            return Ok(Some(ExitReason::TakeProfit));
        }
        if evaluate_condition_group(&strategy.exit_condition, &mut self.cache, self.candles, index)
        {
            return Ok(Some(ExitReason::ExitCondition));
        }
        Ok(None)
    }
}

/// 현금, 단일 포지션, 거래 내역, 자산 곡선.
struct Ledger {
    cash: Decimal,
    /// 체결마다 적용되는 비용률 (%)
    cost_pct: Decimal,
    position: Option<Position>,
    trades: Vec<CompletedTrade>,
    equity_curve: Vec<EquityPoint>,
}

impl Ledger {
    fn new(initial_capital: Decimal, cost_pct: Decimal) -> Self {
        Self {
            cash: initial_capital,
            cost_pct,
            position: None,
            trades: Vec::new(),
            equity_curve: Vec::new(),
        }
    }

    /// 종가로 포지션을 엽니다. 수량이 0 이하면 진입하지 않습니다.
    ///
    /// 주문 금액 전체가 현금에서 빠지고 수수료는 수량 감소로 흡수됩니다.
    fn open(&mut self, candle: &Candle, money_management: &MoneyManagement) -> Result<bool> {
        if candle.close <= Decimal::ZERO {
            return Ok(false);
        }

        let order_amount = money_management
            .order_amount(self.cash)
            .ok_or_else(|| overflow("주문 금액"))?;
        let entry_fee = order_amount
            .checked_mul(self.cost_pct)
            .map(|v| v / dec!(100))
            .ok_or_else(|| overflow("진입 수수료"))?;
        let quantity = (order_amount - entry_fee)
            .checked_div(candle.close)
            .ok_or_else(|| overflow("진입 수량"))?;
        if quantity <= Decimal::ZERO {
            return Ok(false);
        }
        let cash = self
            .cash
            .checked_sub(order_amount)
            .ok_or_else(|| overflow("현금"))?;

        let direction = match money_management.position_direction {
            PositionDirection::Short => TradeDirection::Short,
            PositionDirection::Long | PositionDirection::Both => TradeDirection::Long,
        };

        self.cash = cash;
        debug!(
            time = candle.time,
            price = %candle.close,
            quantity = %quantity,
            ?direction,
            "포지션 진입"
        );
        self.position = Some(Position {
            entry_time: candle.time,
            entry_price: candle.close,
            quantity,
            entry_fee,
            direction,
        });
        Ok(true)
    }

    /// 종가로 포지션을 청산하고 완료 거래를 기록합니다.
    fn close(&mut self, candle: &Candle, reason: ExitReason) -> Result<()> {
        let Some(position) = self.position.take() else {
            return Ok(());
        };

        let exit_fee = position
            .quantity
            .checked_mul(candle.close)
            .and_then(|v| v.checked_mul(self.cost_pct))
            .map(|v| v / dec!(100))
            .ok_or_else(|| overflow("청산 수수료"))?;
        self.cash = position
            .market_value(candle.close)
            .and_then(|v| v.checked_sub(exit_fee))
            .and_then(|v| self.cash.checked_add(v))
            .ok_or_else(|| overflow("현금"))?;

        let trade = position
            .close(
                self.trades.len() + 1,
                candle.time,
                candle.close,
                exit_fee,
                reason,
            )
            .ok_or_else(|| overflow("거래 손익"))?;
        debug!(
            trade_id = trade.trade_id,
            price = %trade.exit_price,
            profit_loss = %trade.profit_loss,
            reason = reason.as_str(),
            "포지션 청산"
        );
        self.trades.push(trade);
        Ok(())
    }

    fn record_equity(&mut self, candle: &Candle) -> Result<()> {
        let (market_value, unrealized_pnl) = match &self.position {
            Some(position) => (
                position.market_value(candle.close),
                position.unrealized_pnl(candle.close),
            ),
            None => (Some(Decimal::ZERO), Some(Decimal::ZERO)),
        };
        let unrealized_pnl = unrealized_pnl.ok_or_else(|| overflow("미실현 손익"))?;
        let equity_value = market_value
            .and_then(|v| self.cash.checked_add(v))
            .ok_or_else(|| overflow("자산 평가액"))?;

        let date = if candle.date.is_empty() {
            format_date(candle.time)
        } else {
            candle.date.clone()
        };

        self.equity_curve.push(EquityPoint {
            timestamp: candle.time,
            date,
            equity_value,
            cash: self.cash,
            unrealized_pnl,
        });
        Ok(())
    }

    /// 마지막 자산 포인트를 청산 후 현금으로 갱신합니다.
    ///
    /// 최종 자산은 청산 수수료까지 반영한 현금이 됩니다.
    fn settle_last_equity(&mut self) {
        if let Some(last) = self.equity_curve.last_mut() {
            last.equity_value = self.cash;
            last.cash = self.cash;
            last.unrealized_pnl = Decimal::ZERO;
        }
    }
}

fn overflow(what: &str) -> BacktestError {
    BacktestError::CalculationError(format!("{} 계산 중 오버플로가 발생했습니다", what))
}

/// 캔들 데이터와 설정을 검증합니다.
fn validate_inputs(candles: &[Candle], config: &BacktestConfig) -> Result<()> {
    if candles.is_empty() {
        return Err(BacktestError::DataError(
            "캔들 데이터가 비어있습니다".to_string(),
        ));
    }

    // 시간순 정렬 확인 (중복 시각 불가)
    for window in candles.windows(2) {
        if window[0].time >= window[1].time {
            return Err(BacktestError::DataError(
                "캔들 데이터가 시간순으로 정렬되어 있지 않습니다".to_string(),
            ));
        }
    }

    config.validate()
}

/// 백테스트를 실행합니다.
///
/// 전략은 이미 스키마 검증을 통과했다고 가정합니다.
pub fn run_backtest(candles: &[Candle], config: &BacktestConfig) -> Result<BacktestResult> {
    BacktestEngine::new(candles, config)?.run()
}

/// 스키마 검증 후 백테스트를 실행합니다.
///
/// 검증 에러가 있으면 시뮬레이션 없이 [`BacktestError::StrategyError`]를 반환합니다.
pub fn run_validated_backtest(
    candles: &[Candle],
    config: &BacktestConfig,
) -> Result<BacktestResult> {
    let report = validate_strategy_schema(&config.strategy);
    if !report.is_valid() {
        return Err(BacktestError::StrategyError(report.error_messages()));
    }
    run_backtest(candles, config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use trader_core::{
        ComparisonOperator, Condition, ConditionGroup, IndicatorKind, StrategyConfig,
    };

    const HOUR_MS: i64 = 3_600_000;

    fn create_test_candles(count: usize, start_price: Decimal, trend: Decimal) -> Vec<Candle> {
        (0..count)
            .map(|i| {
                let price = start_price + trend * Decimal::from(i);
                Candle::new(
                    i as i64 * HOUR_MS,
                    price,
                    price * dec!(1.01),
                    price * dec!(0.99),
                    price,
                    dec!(100),
                )
            })
            .collect()
    }

    fn price_rule(id: &str, op: ComparisonOperator, value: Decimal) -> Condition {
        let mut condition = Condition::threshold(id, IndicatorKind::Price, 1, op, value);
        condition.description = format!("PRICE {} {}", op, value);
        condition
    }

    /// 가격이 `entry` 이상이면 진입, `exit` 이상이면 청산하는 전략 (손절/익절 없음).
    fn price_strategy(entry: Decimal, exit: Decimal) -> StrategyConfig {
        StrategyConfig::new(
            ConditionGroup::all(vec![price_rule("e", ComparisonOperator::GreaterOrEqual, entry)]),
            ConditionGroup::all(vec![price_rule("x", ComparisonOperator::GreaterOrEqual, exit)]),
        )
    }

    fn zero_cost_config(strategy: StrategyConfig) -> BacktestConfig {
        let mut config = BacktestConfig::default().with_strategy(strategy);
        config.environment.fee_preset.taker_fee = Decimal::ZERO;
        config.environment.slippage = Decimal::ZERO;
        config
    }

    #[test]
    fn test_backtest_empty_data() {
        let config = BacktestConfig::default();
        let result = run_backtest(&[], &config);
        assert_eq!(
            result.unwrap_err(),
            BacktestError::DataError("캔들 데이터가 비어있습니다".to_string())
        );
    }

    #[test]
    fn test_backtest_unsorted_data() {
        let mut candles = create_test_candles(10, dec!(100), Decimal::ONE);
        candles.swap(3, 4);
        let result = run_backtest(&candles, &BacktestConfig::default());
        assert!(matches!(result, Err(BacktestError::DataError(_))));

        let mut candles = create_test_candles(10, dec!(100), Decimal::ONE);
        candles[5].time = candles[4].time;
        let result = run_backtest(&candles, &BacktestConfig::default());
        assert!(matches!(result, Err(BacktestError::DataError(_))));
    }

    #[test]
    fn test_backtest_invalid_config() {
        let candles = create_test_candles(10, dec!(100), Decimal::ONE);
        let config = BacktestConfig::default().with_initial_capital(Decimal::ZERO);
        assert!(matches!(
            run_backtest(&candles, &config),
            Err(BacktestError::ConfigError(_))
        ));
    }

    #[test]
    fn test_warmup_longer_than_data() {
        // 기본 전략 워밍업 44 > 캔들 20
        let candles = create_test_candles(20, dec!(100), Decimal::ONE);
        let result = run_backtest(&candles, &BacktestConfig::default()).unwrap();

        assert!(result.visualization.equity_curve.is_empty());
        assert_eq!(result.summary.final_equity.value, dec!(10000));
        assert_eq!(result.stats.trades.total_trades, 0);
    }

    #[test]
    fn test_entry_fee_absorbed_into_quantity() {
        // 워밍업 31 (기간 1 + 30), 첫 캔들부터 진입
        let candles = create_test_candles(40, dec!(100), Decimal::ZERO);
        let config = BacktestConfig::default()
            .with_strategy(price_strategy(dec!(100), dec!(1000)));
        let result = run_backtest(&candles, &config).unwrap();

        // 비용률 0.15%: 수수료 15, 수량 (10000 - 15) / 100
        let trade = &result.visualization.trades[0];
        assert_eq!(trade.entry_fee, dec!(15));
        assert_eq!(trade.quantity, dec!(99.85));
        assert_eq!(trade.exit_reason, ExitReason::ExitCondition);
        assert_eq!(result.stats.trades.total_trades, 1);

        // 첫 포인트: 현금 0 + 99.85 * 100
        let first = &result.visualization.equity_curve[0];
        assert_eq!(first.equity_value, dec!(9985));

        // 강제 청산: 청산 수수료 9985 * 0.15% = 14.9775
        assert_eq!(trade.exit_fee, dec!(14.9775));
        assert_eq!(result.summary.final_equity.value, dec!(9970.0225));
        let last = result.visualization.equity_curve.last().unwrap();
        assert_eq!(last.equity_value, dec!(9970.0225));
        // 마지막 포인트는 청산 후 현금으로 정산됨
        assert_eq!(last.cash, dec!(9970.0225));
        assert_eq!(last.unrealized_pnl, Decimal::ZERO);
    }

    #[test]
    fn test_leveraged_compounding_overflow_is_error() {
        // 캔들마다 1% 상승, 매 캔들 청산 후 재진입: 레버리지 100배면 현금이 캔들마다 두 배
        let mut price = dec!(100);
        let candles: Vec<Candle> = (0..300)
            .map(|i| {
                let candle =
                    Candle::new(i as i64 * HOUR_MS, price, price, price, price, dec!(100));
                price *= dec!(1.01);
                candle
            })
            .collect();
        let config = zero_cost_config(price_strategy(Decimal::ZERO, Decimal::ZERO))
            .with_money_management(MoneyManagement::default().with_leverage(dec!(100)));
        assert!(config.validate().is_ok());

        let result = run_backtest(&candles, &config);
        assert!(
            matches!(result, Err(BacktestError::CalculationError(_))),
            "{:?}",
            result.map(|r| r.summary.final_equity.value)
        );
    }

    #[test]
    fn test_take_profit_precedes_exit_condition() {
        // 인덱스 31에서 100에 진입, 다음 캔들 111: 익절(10%)과 청산 조건(>=105) 동시 충족
        let mut closes = vec![dec!(100); 32];
        closes.push(dec!(111));
        let candles: Vec<Candle> = closes
            .iter()
            .enumerate()
            .map(|(i, c)| Candle::new(i as i64 * HOUR_MS, *c, *c, *c, *c, dec!(1)))
            .collect();

        let strategy = StrategyConfig::new(
            ConditionGroup::all(vec![price_rule("e", ComparisonOperator::LessOrEqual, dec!(100))]),
            ConditionGroup::all(vec![price_rule(
                "x",
                ComparisonOperator::GreaterOrEqual,
                dec!(105),
            )]),
        )
        .with_stop_loss(dec!(5))
        .with_take_profit(dec!(10));
        let config = zero_cost_config(strategy);
        let result = run_backtest(&candles, &config).unwrap();

        let trades = &result.visualization.trades;
        assert_eq!(trades.len(), 1);
        assert_eq!(trades[0].exit_reason, ExitReason::TakeProfit);
        assert_eq!(trades[0].profit_loss, dec!(1100));
        assert_eq!(result.summary.final_equity.value, dec!(11100));
    }

    #[test]
    fn test_stop_loss_and_same_candle_reentry() {
        // 100 진입 → 94 손절(-6%) → 같은 캔들에서 재진입
        let mut closes = vec![dec!(100); 32];
        closes.push(dec!(94));
        let candles: Vec<Candle> = closes
            .iter()
            .enumerate()
            .map(|(i, c)| Candle::new(i as i64 * HOUR_MS, *c, *c, *c, *c, dec!(1)))
            .collect();

        let strategy = StrategyConfig::new(
            ConditionGroup::all(vec![price_rule("e", ComparisonOperator::LessOrEqual, dec!(100))]),
            ConditionGroup::all(vec![price_rule("x", ComparisonOperator::GreaterThan, dec!(1000))]),
        )
        .with_stop_loss(dec!(5));
        let config = zero_cost_config(strategy);
        let result = run_backtest(&candles, &config).unwrap();

        let trades = &result.visualization.trades;
        assert_eq!(trades.len(), 2);
        assert_eq!(trades[0].exit_reason, ExitReason::StopLoss);
        assert_eq!(trades[0].exit_time, 32 * HOUR_MS);
        // 재진입한 포지션은 같은 캔들 종가로 강제 청산
        assert_eq!(trades[1].entry_time, 32 * HOUR_MS);
        assert_eq!(trades[1].exit_reason, ExitReason::ExitCondition);
        assert_eq!(result.summary.final_equity.value, dec!(9400));
    }

    #[test]
    fn test_short_position_accounting() {
        // 100에서 숏 진입, 90에서 청산: +10%
        let mut closes = vec![dec!(100); 32];
        closes.push(dec!(90));
        let candles: Vec<Candle> = closes
            .iter()
            .enumerate()
            .map(|(i, c)| Candle::new(i as i64 * HOUR_MS, *c, *c, *c, *c, dec!(1)))
            .collect();

        let strategy = StrategyConfig::new(
            ConditionGroup::all(vec![price_rule("e", ComparisonOperator::GreaterOrEqual, dec!(100))]),
            ConditionGroup::all(vec![price_rule("x", ComparisonOperator::LessOrEqual, dec!(90))]),
        );
        let mut config = zero_cost_config(strategy);
        config.money_management =
            MoneyManagement::percent_of_balance(dec!(50)).with_direction(PositionDirection::Short);
        let result = run_backtest(&candles, &config).unwrap();

        let trades = &result.visualization.trades;
        assert_eq!(trades.len(), 1);
        assert_eq!(trades[0].direction, TradeDirection::Short);
        assert_eq!(trades[0].profit_loss, dec!(500));
        assert_eq!(trades[0].profit_loss_percent, dec!(10));
        assert_eq!(result.summary.final_equity.value, dec!(10500));
    }

    #[test]
    fn test_both_direction_opens_long() {
        let candles = create_test_candles(35, dec!(100), Decimal::ONE);
        let mut config = zero_cost_config(price_strategy(dec!(100), dec!(1000)));
        config.money_management =
            MoneyManagement::default().with_direction(PositionDirection::Both);
        let result = run_backtest(&candles, &config).unwrap();
        assert!(result
            .visualization
            .trades
            .iter()
            .all(|t| t.direction == TradeDirection::Long));
    }

    #[test]
    fn test_cache_reuse() {
        let candles = create_test_candles(120, dec!(100), dec!(0.5));
        let config = BacktestConfig::default();
        let mut engine = BacktestEngine::new(&candles, &config).unwrap();
        let first = engine.run().unwrap();
        let cache = engine.into_cache();

        let tuned = config.clone().with_strategy(config.strategy.clone().with_stop_loss(dec!(2)));
        let mut engine = BacktestEngine::with_cache(&candles, &tuned, cache).unwrap();
        let second = engine.run().unwrap();
        assert_eq!(
            first.visualization.equity_curve.len(),
            second.visualization.equity_curve.len()
        );

        let short = create_test_candles(60, dec!(100), dec!(0.5));
        let cache = engine.into_cache();
        assert!(matches!(
            BacktestEngine::with_cache(&short, &config, cache),
            Err(BacktestError::DataError(_))
        ));
    }

    #[test]
    fn test_cache_from_other_candles_rejected() {
        // 같은 길이, 반대 추세: 상승 캐시로는 RSI < 30 진입이 일어나지 않음
        let rising = create_test_candles(120, dec!(100), dec!(0.5));
        let falling = create_test_candles(120, dec!(200), dec!(-0.5));
        let config = BacktestConfig::default();

        let fresh = run_backtest(&falling, &config).unwrap();
        assert!(fresh.stats.trades.total_trades > 0);

        let cache = BacktestEngine::new(&rising, &config).unwrap().into_cache();
        let result = BacktestEngine::with_cache(&falling, &config, cache);
        assert_eq!(
            result.err(),
            Some(BacktestError::DataError(
                "지표 캐시가 다른 캔들 데이터로 만들어졌습니다".to_string()
            ))
        );
    }

    #[test]
    fn test_validated_backtest_rejects_invalid_strategy() {
        let candles = create_test_candles(50, dec!(100), Decimal::ONE);
        let config = BacktestConfig::default().with_strategy(StrategyConfig::new(
            ConditionGroup::all(vec![]),
            ConditionGroup::all(vec![]),
        ));

        match run_validated_backtest(&candles, &config) {
            Err(BacktestError::StrategyError(message)) => {
                assert!(message.contains("진입 조건이 없습니다"));
                assert!(message.contains("청산 조건이 없습니다"));
            }
            other => panic!("unexpected: {:?}", other.map(|r| r.summary)),
        }

        // 같은 전략이라도 검증 없는 경로는 실행됨 (빈 그룹은 항상 거짓)
        let result = run_backtest(&candles, &config).unwrap();
        assert_eq!(result.stats.trades.total_trades, 0);
    }
}
