//! 이동평균 (SMA, EMA).

use rust_decimal::Decimal;

use super::{mean, IndicatorEngine, IndicatorSeries};

/// SMA 파라미터.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SmaParams {
    pub period: usize,
}

impl Default for SmaParams {
    fn default() -> Self {
        Self { period: 20 }
    }
}

/// EMA 파라미터.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EmaParams {
    pub period: usize,
}

impl Default for EmaParams {
    fn default() -> Self {
        Self { period: 20 }
    }
}

impl IndicatorEngine {
    /// 단순 이동평균. 슬라이딩 합으로 O(n)에 계산합니다.
    pub fn sma(&self, closes: &[Decimal], params: SmaParams) -> IndicatorSeries {
        let period = params.period;
        let mut values = vec![None; closes.len()];
        if period == 0 || closes.len() < period {
            return values;
        }

        let divisor = Decimal::from(period);
        let mut sum: Decimal = closes[..period].iter().sum();
        values[period - 1] = Some(sum / divisor);

        for i in period..closes.len() {
            sum += closes[i] - closes[i - period];
            values[i] = Some(sum / divisor);
        }

        values
    }

    /// 지수 이동평균.
    ///
    /// 승수 `2 / (period + 1)`, 첫 `period`개 종가의 SMA로 시드합니다.
    pub fn ema(&self, closes: &[Decimal], params: EmaParams) -> IndicatorSeries {
        let period = params.period;
        let mut values = vec![None; closes.len()];
        if period == 0 || closes.len() < period {
            return values;
        }

        let multiplier = Decimal::TWO / Decimal::from(period + 1);
        let mut ema = mean(&closes[..period]);
        values[period - 1] = Some(ema);

        for i in period..closes.len() {
            ema = (closes[i] - ema) * multiplier + ema;
            values[i] = Some(ema);
        }

        values
    }
}
