//! 기술 지표 계산.
//!
//! 모든 지표는 종가 배열을 받아 **입력과 같은 길이**의 배열을 반환합니다.
//! 워밍업 구간(값을 계산할 수 없는 앞부분)은 `None`으로 채워지며,
//! 데이터가 부족하면 전체가 `None`인 배열을 반환합니다. 오류는 발생하지 않습니다.
//!
//! | 지표 | 첫 유효 인덱스 |
//! |------|----------------|
//! | SMA(p), EMA(p) | `p - 1` |
//! | RSI(p) | `p` |
//! | MACD(f, s, g) | `s + g - 2` |
//! | 볼린저 밴드(p) | `p - 1` |
//!
//! # 사용 예시
//!
//! ```rust,ignore
//! use trader_analytics::{IndicatorEngine, RsiParams};
//!
//! let engine = IndicatorEngine::new();
//! let closes = trader_analytics::indicators::closes(&candles);
//! let rsi = engine.rsi(&closes, RsiParams { period: 14 });
//! ```

mod bollinger;
mod cache;
mod macd;
mod moving_average;
mod rsi;

pub use bollinger::{BollingerBand, BollingerBandsParams};
pub use cache::{
    IndicatorCache, PRECALC_BB_PERIODS, PRECALC_EMA_PERIODS, PRECALC_RSI_PERIODS,
    PRECALC_SMA_PERIODS,
};
pub use macd::{MacdParams, MacdValue};
pub use moving_average::{EmaParams, SmaParams};
pub use rsi::RsiParams;

use rust_decimal::Decimal;
use trader_core::Candle;

/// 지표 시계열. 워밍업 구간은 `None`.
pub type IndicatorSeries = Vec<Option<Decimal>>;

/// 상태 없는 지표 계산 엔진.
///
/// 지표별 계산 메서드는 각 하위 모듈의 `impl IndicatorEngine` 블록에 있습니다.
#[derive(Debug, Clone, Copy, Default)]
pub struct IndicatorEngine;

impl IndicatorEngine {
    pub fn new() -> Self {
        Self
    }
}

/// 캔들 배열에서 종가만 추출합니다.
pub fn closes(candles: &[Candle]) -> Vec<Decimal> {
    candles.iter().map(|c| c.close).collect()
}

/// 구간 평균. 빈 구간이면 0.
pub(crate) fn mean(values: &[Decimal]) -> Decimal {
    if values.is_empty() {
        return Decimal::ZERO;
    }
    values.iter().sum::<Decimal>() / Decimal::from(values.len())
}

#[cfg(test)]
pub(crate) mod test_support {
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    /// 테스트용 종가 배열 (시작가 + 추세 * i).
    pub fn trending_closes(count: usize, start: Decimal, trend: Decimal) -> Vec<Decimal> {
        (0..count).map(|i| start + trend * Decimal::from(i)).collect()
    }

    /// 톱니 모양 종가 배열 (상승 3회, 하락 2회 반복).
    pub fn zigzag_closes(count: usize) -> Vec<Decimal> {
        let mut price = dec!(100);
        (0..count)
            .map(|i| {
                if i % 5 < 3 {
                    price += dec!(1.5);
                } else {
                    price -= dec!(2);
                }
                price
            })
            .collect()
    }
}
