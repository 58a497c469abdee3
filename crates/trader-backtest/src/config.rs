//! 백테스트 실행 설정.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use trader_core::{EnvironmentSetup, MoneyManagement, OrderMode, StrategyConfig, MAX_LEVERAGE};

use crate::error::{BacktestError, Result};

/// 한 번의 백테스트에 필요한 모든 설정.
///
/// 값으로 전달되며 실행 중에는 변경되지 않습니다.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BacktestConfig {
    /// 종목, 기간, 자본, 수수료
    #[serde(default)]
    pub environment: EnvironmentSetup,
    /// 진입/청산 규칙
    #[serde(default)]
    pub strategy: StrategyConfig,
    /// 주문 크기, 레버리지, 방향
    #[serde(default)]
    pub money_management: MoneyManagement,
}

impl BacktestConfig {
    /// 새로운 백테스트 설정을 생성합니다.
    pub fn new(
        environment: EnvironmentSetup,
        strategy: StrategyConfig,
        money_management: MoneyManagement,
    ) -> Self {
        Self {
            environment,
            strategy,
            money_management,
        }
    }

    /// 실행 환경 설정
    pub fn with_environment(mut self, environment: EnvironmentSetup) -> Self {
        self.environment = environment;
        self
    }

    /// 전략 설정
    pub fn with_strategy(mut self, strategy: StrategyConfig) -> Self {
        self.strategy = strategy;
        self
    }

    /// 자금 관리 설정
    pub fn with_money_management(mut self, money_management: MoneyManagement) -> Self {
        self.money_management = money_management;
        self
    }

    /// 초기 자본 설정
    pub fn with_initial_capital(mut self, capital: Decimal) -> Self {
        self.environment.initial_capital = capital;
        self
    }

    /// 설정 검증
    ///
    /// 전략 구조 검증은 스키마 검증기 담당이며 여기서는 수치 범위만 확인합니다.
    pub fn validate(&self) -> Result<()> {
        let env = &self.environment;
        if env.initial_capital <= Decimal::ZERO {
            return Err(BacktestError::ConfigError(
                "초기 자본은 0보다 커야 합니다".to_string(),
            ));
        }
        if env.fee_preset.maker_fee < Decimal::ZERO || env.fee_preset.taker_fee < Decimal::ZERO {
            return Err(BacktestError::ConfigError(
                "수수료율은 0 이상이어야 합니다".to_string(),
            ));
        }
        if env.slippage < Decimal::ZERO {
            return Err(BacktestError::ConfigError(
                "슬리피지율은 0 이상이어야 합니다".to_string(),
            ));
        }

        let mm = &self.money_management;
        if mm.leverage < Decimal::ONE || mm.leverage > MAX_LEVERAGE {
            return Err(BacktestError::ConfigError(format!(
                "레버리지는 1 ~ {}배 사이여야 합니다 (현재: {})",
                MAX_LEVERAGE, mm.leverage
            )));
        }
        if mm.order_size.value <= Decimal::ZERO {
            return Err(BacktestError::ConfigError(
                "주문 크기는 0보다 커야 합니다".to_string(),
            ));
        }
        if mm.order_mode == OrderMode::PercentOfBalance && mm.order_size.value > dec!(100) {
            return Err(BacktestError::ConfigError(format!(
                "잔고 비율은 100%를 넘을 수 없습니다 (현재: {}%)",
                mm.order_size.value
            )));
        }
        Ok(())
    }
}
