//! 자금 관리 설정 (주문 크기, 레버리지, 포지션 방향).

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

/// 허용되는 최대 레버리지 배수
pub const MAX_LEVERAGE: Decimal = Decimal::ONE_HUNDRED;

/// 주문 크기 산정 방식.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum OrderMode {
    /// 현금 잔고의 N%
    #[default]
    PercentOfBalance,
    /// 고정 금액 (잔고를 넘지 않음)
    FixedAmount,
}

/// 주문 크기.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderSize {
    /// 비율(%) 또는 금액
    pub value: Decimal,
    /// 표시용 설명 (예: "100% of balance")
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,
}

/// 포지션 방향.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PositionDirection {
    #[default]
    Long,
    Short,
    /// 별도의 숏 진입 조건이 없으므로 롱으로 진입합니다.
    Both,
}

/// 자금 관리 설정.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MoneyManagement {
    pub order_mode: OrderMode,
    pub order_size: OrderSize,
    /// 레버리지 배수 (1 ~ [`MAX_LEVERAGE`])
    #[serde(default = "default_leverage")]
    pub leverage: Decimal,
    #[serde(default)]
    pub leverage_enabled: bool,
    #[serde(default)]
    pub position_direction: PositionDirection,
}

fn default_leverage() -> Decimal {
    Decimal::ONE
}

impl Default for MoneyManagement {
    /// 잔고 100%, 레버리지 1배(비활성), 롱 전용.
    fn default() -> Self {
        Self::percent_of_balance(dec!(100))
    }
}

impl MoneyManagement {
    /// 잔고 비율 주문.
    pub fn percent_of_balance(percent: Decimal) -> Self {
        Self {
            order_mode: OrderMode::PercentOfBalance,
            order_size: OrderSize {
                value: percent,
                description: format!("{}% of balance", percent),
            },
            leverage: Decimal::ONE,
            leverage_enabled: false,
            position_direction: PositionDirection::Long,
        }
    }

    /// 고정 금액 주문.
    pub fn fixed_amount(amount: Decimal) -> Self {
        Self {
            order_mode: OrderMode::FixedAmount,
            order_size: OrderSize {
                value: amount,
                description: format!("{} fixed", amount),
            },
            ..Self::default()
        }
    }

    /// 레버리지 설정 (활성화 포함)
    pub fn with_leverage(mut self, leverage: Decimal) -> Self {
        self.leverage = leverage;
        self.leverage_enabled = true;
        self
    }

    /// 포지션 방향 설정
    pub fn with_direction(mut self, direction: PositionDirection) -> Self {
        self.position_direction = direction;
        self
    }

    /// 현재 현금으로 산정한 주문 금액 (레버리지 반영). 오버플로 시 `None`.
    pub fn order_amount(&self, cash: Decimal) -> Option<Decimal> {
        let base = match self.order_mode {
            OrderMode::PercentOfBalance => {
                cash.checked_mul(self.order_size.value)?.checked_div(dec!(100))?
            }
            OrderMode::FixedAmount => self.order_size.value.min(cash),
        };
        if self.leverage_enabled {
            base.checked_mul(self.leverage)
        } else {
            Some(base)
        }
    }
}
