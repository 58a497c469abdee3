//! 드라이런 검증과 전략 채택 게이트.
//!
//! 생성된 전략을 사용자가 채택하기 전에 최근 캔들 구간으로 같은 엔진을 실행해
//! 거래 빈도를 확인합니다. 별도 알고리즘이 아니라 잘린 캔들 배열로 호출한
//! 일반 백테스트입니다.

use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use trader_core::{Candle, EnvironmentSetup, MoneyManagement, StrategyConfig};
use trader_strategy::{
    validate_strategy_schema, ValidationCategory, ValidationIssue, ValidationReport,
};

use crate::config::BacktestConfig;
use crate::engine::run_backtest;

/// 드라이런에 사용하는 최근 캔들 수 (1시간봉 기준 약 7일)
pub const DRY_RUN_WINDOW: usize = 168;

/// 이 건수를 넘으면 거래가 너무 빈번하다고 경고합니다.
const MAX_DRY_RUN_TRADES: usize = 100;

/// 드라이런 결과
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DryRunResult {
    /// 엔진이 정상 실행되었는지 여부
    pub valid: bool,
    pub trade_count: usize,
    pub warnings: Vec<ValidationIssue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl DryRunResult {
    fn failed(issue: ValidationIssue, error: String) -> Self {
        Self {
            valid: false,
            trade_count: 0,
            warnings: vec![issue],
            error: Some(error),
        }
    }
}

/// 최근 [`DRY_RUN_WINDOW`]개 캔들로 드라이런을 실행합니다.
pub fn run_dry_run(
    strategy: &StrategyConfig,
    candles: &[Candle],
    environment: &EnvironmentSetup,
    money_management: &MoneyManagement,
) -> DryRunResult {
    run_dry_run_with_window(
        strategy,
        candles,
        environment,
        money_management,
        DRY_RUN_WINDOW,
    )
}

/// 최근 `window`개 캔들로 드라이런을 실행합니다.
pub fn run_dry_run_with_window(
    strategy: &StrategyConfig,
    candles: &[Candle],
    environment: &EnvironmentSetup,
    money_management: &MoneyManagement,
    window: usize,
) -> DryRunResult {
    let start = candles.len().saturating_sub(window);
    let recent = &candles[start..];

    if recent.is_empty() {
        return DryRunResult::failed(
            ValidationIssue::error(
                ValidationCategory::Logic,
                "백테스트에 사용할 데이터가 없습니다",
            ),
            "캔들 데이터가 비어있습니다".to_string(),
        );
    }

    let config = BacktestConfig::new(
        environment.clone(),
        strategy.clone(),
        money_management.clone(),
    );

    let result = match run_backtest(recent, &config) {
        Ok(result) => result,
        Err(e) => {
            warn!(error = %e, "드라이런 실패");
            return DryRunResult::failed(
                ValidationIssue::error(
                    ValidationCategory::Logic,
                    "전략 실행 중 오류가 발생했습니다",
                )
                .with_suggestion("전략 조건을 확인해주세요"),
                e.to_string(),
            );
        }
    };

    let trade_count = result.visualization.trades.len();
    let issue = if trade_count == 0 {
        ValidationIssue::warning(
            ValidationCategory::Logic,
            "7일 테스트에서 거래가 발생하지 않았습니다",
        )
        .with_suggestion("조건을 완화하거나 다른 지표를 사용해보세요")
    } else if trade_count > MAX_DRY_RUN_TRADES {
        ValidationIssue::warning(
            ValidationCategory::Logic,
            &format!("7일 테스트에서 거래가 너무 빈번합니다 ({}건)", trade_count),
        )
        .with_suggestion("조건을 엄격하게 하여 거래 빈도를 줄이는 것을 권장합니다")
    } else {
        ValidationIssue::warning(
            ValidationCategory::Logic,
            &format!("7일 테스트에서 {}건의 거래가 발생했습니다", trade_count),
        )
    };

    info!(candles = recent.len(), trade_count, "드라이런 완료");

    DryRunResult {
        valid: true,
        trade_count,
        warnings: vec![issue],
        error: None,
    }
}

/// 전략 채택 판정
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AcceptanceReport {
    /// 에러 심각도 항목이 하나도 없으면 채택
    pub accepted: bool,
    /// 스키마 검증 결과
    pub schema: ValidationReport,
    /// 스키마 에러가 있으면 실행하지 않음
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dry_run: Option<DryRunResult>,
}

impl AcceptanceReport {
    /// 스키마 검증과 드라이런의 모든 항목.
    pub fn issues(&self) -> impl Iterator<Item = &ValidationIssue> {
        self.schema
            .issues
            .iter()
            .chain(self.dry_run.iter().flat_map(|d| d.warnings.iter()))
    }
}

/// 스키마 검증 후 (에러가 없을 때만) 드라이런을 실행해 채택 여부를 판정합니다.
pub fn accept_strategy(
    strategy: &StrategyConfig,
    candles: &[Candle],
    environment: &EnvironmentSetup,
    money_management: &MoneyManagement,
) -> AcceptanceReport {
    accept_strategy_with_window(
        strategy,
        candles,
        environment,
        money_management,
        DRY_RUN_WINDOW,
    )
}

/// [`accept_strategy`]와 같지만 드라이런 구간 크기를 지정합니다.
pub fn accept_strategy_with_window(
    strategy: &StrategyConfig,
    candles: &[Candle],
    environment: &EnvironmentSetup,
    money_management: &MoneyManagement,
    window: usize,
) -> AcceptanceReport {
    let schema = validate_strategy_schema(strategy);
    let dry_run = schema.is_valid().then(|| {
        run_dry_run_with_window(strategy, candles, environment, money_management, window)
    });

    let accepted = schema.is_valid()
        && dry_run
            .as_ref()
            .is_some_and(|d| d.warnings.iter().all(|w| !w.is_error()));

    AcceptanceReport {
        accepted,
        schema,
        dry_run,
    }
}
