//! 드라이런과 전략 채택 게이트 테스트.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use trader_backtest::{
    accept_strategy, run_dry_run, run_dry_run_with_window, run_validated_backtest,
    BacktestConfig, BacktestError, DRY_RUN_WINDOW,
};
use trader_core::{
    Candle, ComparisonOperator, Condition, ConditionGroup, EnvironmentSetup, IndicatorKind,
    MoneyManagement, StrategyConfig,
};
use trader_strategy::{Severity, ValidationCategory};

const HOUR_MS: i64 = 3_600_000;

/// 지그재그 종가 (100 ↔ 101).
fn zigzag_candles(count: usize) -> Vec<Candle> {
    (0..count)
        .map(|i| {
            let close = if i % 2 == 0 { dec!(100) } else { dec!(101) };
            Candle::new(i as i64 * HOUR_MS, close, close, close, close, dec!(1))
        })
        .collect()
}

fn price_condition(id: &str, op: ComparisonOperator, value: Decimal) -> Condition {
    Condition::threshold(id, IndicatorKind::Price, 1, op, value)
}

/// 매 캔들 청산 후 재진입하는 전략.
fn always_trading() -> StrategyConfig {
    StrategyConfig::new(
        ConditionGroup::all(vec![price_condition("e", ComparisonOperator::GreaterThan, Decimal::ZERO)]),
        ConditionGroup::all(vec![price_condition("x", ComparisonOperator::GreaterThan, Decimal::ZERO)]),
    )
}

/// 절대 진입하지 않는 전략.
fn never_trading() -> StrategyConfig {
    StrategyConfig::new(
        ConditionGroup::all(vec![price_condition("e", ComparisonOperator::LessThan, Decimal::ZERO)]),
        ConditionGroup::all(vec![price_condition("x", ComparisonOperator::GreaterThan, Decimal::ZERO)]),
    )
}

/// 101을 넘을 때 진입, 101 아래로 내려가면 청산하는 전략 (2캔들마다 한 번 거래).
fn occasional_trading() -> StrategyConfig {
    StrategyConfig::new(
        ConditionGroup::all(vec![price_condition("e", ComparisonOperator::GreaterOrEqual, dec!(101))]),
        ConditionGroup::all(vec![price_condition("x", ComparisonOperator::LessThan, dec!(101))]),
    )
}

#[test]
fn dry_run_on_empty_candles_is_invalid() {
    let result = run_dry_run(
        &StrategyConfig::default(),
        &[],
        &EnvironmentSetup::default(),
        &MoneyManagement::default(),
    );

    assert!(!result.valid);
    assert_eq!(result.trade_count, 0);
    assert_eq!(result.error.as_deref(), Some("캔들 데이터가 비어있습니다"));
    assert_eq!(result.warnings[0].severity, Severity::Error);
    assert_eq!(result.warnings[0].message, "백테스트에 사용할 데이터가 없습니다");
}

#[test]
fn dry_run_without_trades_warns() {
    let result = run_dry_run(
        &never_trading(),
        &zigzag_candles(200),
        &EnvironmentSetup::default(),
        &MoneyManagement::default(),
    );

    assert!(result.valid);
    assert_eq!(result.trade_count, 0);
    let warning = &result.warnings[0];
    assert_eq!(warning.severity, Severity::Warning);
    assert_eq!(warning.category, ValidationCategory::Logic);
    assert_eq!(warning.message, "7일 테스트에서 거래가 발생하지 않았습니다");
    assert_eq!(
        warning.suggestion.as_deref(),
        Some("조건을 완화하거나 다른 지표를 사용해보세요")
    );
}

#[test]
fn dry_run_flags_too_frequent_trading() {
    // 168개 중 워밍업 31 이후 매 캔들 거래: 137건
    let result = run_dry_run(
        &always_trading(),
        &zigzag_candles(500),
        &EnvironmentSetup::default(),
        &MoneyManagement::default(),
    );

    assert!(result.valid);
    assert_eq!(result.trade_count, DRY_RUN_WINDOW - 31);
    assert_eq!(
        result.warnings[0].message,
        format!("7일 테스트에서 거래가 너무 빈번합니다 ({}건)", DRY_RUN_WINDOW - 31)
    );
}

#[test]
fn dry_run_reports_trade_count() {
    // 윈도 60: 워밍업 31 이후 29캔들
    let result = run_dry_run_with_window(
        &occasional_trading(),
        &zigzag_candles(300),
        &EnvironmentSetup::default(),
        &MoneyManagement::default(),
        60,
    );

    assert!(result.valid);
    assert!(result.trade_count > 0 && result.trade_count <= 100);
    assert_eq!(
        result.warnings[0].message,
        format!("7일 테스트에서 {}건의 거래가 발생했습니다", result.trade_count)
    );
    assert!(result.error.is_none());
}

#[test]
fn dry_run_engine_failure_is_reported() {
    let mut candles = zigzag_candles(50);
    candles.reverse();

    let result = run_dry_run(
        &StrategyConfig::default(),
        &candles,
        &EnvironmentSetup::default(),
        &MoneyManagement::default(),
    );

    assert!(!result.valid);
    assert_eq!(result.warnings[0].message, "전략 실행 중 오류가 발생했습니다");
    assert!(result.error.unwrap().contains("데이터 오류"));
}

#[test]
fn acceptance_requires_valid_schema() {
    let invalid = StrategyConfig::default().with_take_profit(dec!(-1));
    let report = accept_strategy(
        &invalid,
        &zigzag_candles(200),
        &EnvironmentSetup::default(),
        &MoneyManagement::default(),
    );

    assert!(!report.accepted);
    assert!(report.dry_run.is_none());
    assert_eq!(report.schema.error_count(), 1);
}

#[test]
fn acceptance_passes_with_warnings_only() {
    let report = accept_strategy(
        &never_trading(),
        &zigzag_candles(200),
        &EnvironmentSetup::default(),
        &MoneyManagement::default(),
    );

    assert!(report.accepted);
    assert!(report.schema.is_valid());
    assert_eq!(report.issues().count(), 1);
    assert!(report.issues().all(|i| i.severity == Severity::Warning));
}

#[test]
fn acceptance_rejects_failed_dry_run() {
    let report = accept_strategy(
        &StrategyConfig::default(),
        &[],
        &EnvironmentSetup::default(),
        &MoneyManagement::default(),
    );

    assert!(!report.accepted);
    assert!(report.dry_run.as_ref().is_some_and(|d| !d.valid));
}

#[test]
fn validated_backtest_gate() {
    let candles = zigzag_candles(100);
    let mut strategy = StrategyConfig::default();
    strategy.entry_condition.conditions[0].id = "2".to_string();

    let config = BacktestConfig::default().with_strategy(strategy);
    let err = run_validated_backtest(&candles, &config).unwrap_err();
    assert_eq!(
        err,
        BacktestError::StrategyError("중복된 조건 ID: 2".to_string())
    );

    let config = BacktestConfig::default();
    assert!(run_validated_backtest(&candles, &config).is_ok());
}
