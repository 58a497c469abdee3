//! 시뮬레이션 중 생성되는 포지션, 완료 거래, 자산 곡선 포인트.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

/// 포지션 방향.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TradeDirection {
    Long,
    Short,
}

/// 보유 중인 포지션. 시뮬레이션 중 최대 하나만 존재합니다.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Position {
    pub entry_time: i64,
    pub entry_price: Decimal,
    pub quantity: Decimal,
    pub entry_fee: Decimal,
    pub direction: TradeDirection,
}

impl Position {
    /// 주어진 가격 기준 미실현 손익. 오버플로 시 `None`.
    pub fn unrealized_pnl(&self, price: Decimal) -> Option<Decimal> {
        self.price_change(price)?.checked_mul(self.quantity)
    }

    /// 진입가 대비 손익률 (%). 오버플로 시 `None`.
    pub fn pnl_percent(&self, price: Decimal) -> Option<Decimal> {
        if self.entry_price.is_zero() {
            return Some(Decimal::ZERO);
        }
        self.price_change(price)?
            .checked_div(self.entry_price)?
            .checked_mul(dec!(100))
    }

    /// 진입 명목가 (`entry_price * quantity`).
    pub fn notional(&self) -> Option<Decimal> {
        self.entry_price.checked_mul(self.quantity)
    }

    /// 포지션 평가액: 진입 원금 + 미실현 손익. 롱이면 `quantity * price`와 같습니다.
    pub fn market_value(&self, price: Decimal) -> Option<Decimal> {
        self.notional()?.checked_add(self.unrealized_pnl(price)?)
    }

    fn price_change(&self, price: Decimal) -> Option<Decimal> {
        match self.direction {
            TradeDirection::Long => price.checked_sub(self.entry_price),
            TradeDirection::Short => self.entry_price.checked_sub(price),
        }
    }

    /// 포지션을 청산하여 완료 거래로 변환합니다. 손익 계산이 오버플로하면 `None`.
    pub fn close(
        self,
        trade_id: usize,
        exit_time: i64,
        exit_price: Decimal,
        exit_fee: Decimal,
        exit_reason: ExitReason,
    ) -> Option<CompletedTrade> {
        let gross_profit_loss = self.unrealized_pnl(exit_price)?;
        let profit_loss = gross_profit_loss.checked_sub(exit_fee)?;
        let notional = self.notional()?;
        let profit_loss_percent = if notional.is_zero() {
            Decimal::ZERO
        } else {
            profit_loss.checked_div(notional)?.checked_mul(dec!(100))?
        };
        let status = if profit_loss > Decimal::ZERO {
            TradeStatus::Profit
        } else {
            TradeStatus::Loss
        };

        Some(CompletedTrade {
            trade_id,
            entry_time: self.entry_time,
            entry_price: self.entry_price,
            exit_time,
            exit_price,
            quantity: self.quantity,
            direction: self.direction,
            gross_profit_loss,
            profit_loss,
            profit_loss_percent,
            entry_fee: self.entry_fee,
            exit_fee,
            total_fee: self.entry_fee.checked_add(exit_fee)?,
            duration: exit_time - self.entry_time,
            status,
            exit_reason,
        })
    }
}

/// 거래 결과.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TradeStatus {
    Profit,
    Loss,
}

/// 청산 사유.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExitReason {
    /// 청산 조건 충족 (데이터 종료 시 강제 청산 포함)
    ExitCondition,
    StopLoss,
    TakeProfit,
}

impl ExitReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExitReason::ExitCondition => "exit_condition",
            ExitReason::StopLoss => "stop_loss",
            ExitReason::TakeProfit => "take_profit",
        }
    }
}

/// 청산이 끝난 거래 기록.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompletedTrade {
    /// 1부터 시작하는 순번
    pub trade_id: usize,
    pub entry_time: i64,
    pub entry_price: Decimal,
    pub exit_time: i64,
    pub exit_price: Decimal,
    pub quantity: Decimal,
    pub direction: TradeDirection,
    /// 청산 수수료 차감 전 손익
    pub gross_profit_loss: Decimal,
    /// 순손익 (청산 수수료 차감)
    pub profit_loss: Decimal,
    /// 진입 명목가 대비 순손익률 (%)
    pub profit_loss_percent: Decimal,
    pub entry_fee: Decimal,
    pub exit_fee: Decimal,
    pub total_fee: Decimal,
    /// 보유 기간 (ms)
    pub duration: i64,
    pub status: TradeStatus,
    pub exit_reason: ExitReason,
}

impl CompletedTrade {
    pub fn is_win(&self) -> bool {
        self.profit_loss > Decimal::ZERO
    }
}

/// 자산 곡선의 한 포인트 (워밍업 이후 캔들마다 하나).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EquityPoint {
    pub timestamp: i64,
    pub date: String,
    /// 현금 + 포지션 평가액
    pub equity_value: Decimal,
    pub cash: Decimal,
    #[serde(rename = "unrealizedPnL")]
    pub unrealized_pnl: Decimal,
}
