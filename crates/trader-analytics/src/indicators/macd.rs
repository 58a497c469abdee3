//! MACD.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::{mean, EmaParams, IndicatorEngine};

/// MACD 파라미터.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MacdParams {
    pub fast_period: usize,
    pub slow_period: usize,
    pub signal_period: usize,
}

impl Default for MacdParams {
    fn default() -> Self {
        Self {
            fast_period: 12,
            slow_period: 26,
            signal_period: 9,
        }
    }
}

/// 한 시점의 MACD 값.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MacdValue {
    pub macd: Decimal,
    pub signal: Decimal,
    pub histogram: Decimal,
}

impl IndicatorEngine {
    /// MACD 라인, 시그널, 히스토그램.
    ///
    /// MACD 라인 = EMA(fast) - EMA(slow). 시그널은 MACD 라인의 EMA이며
    /// 첫 `signal_period`개 유효 MACD 값의 평균으로 시드합니다.
    /// 세 값 모두 인덱스 `slow + signal - 2`부터 정의됩니다.
    pub fn macd(&self, closes: &[Decimal], params: MacdParams) -> Vec<Option<MacdValue>> {
        let MacdParams {
            fast_period,
            slow_period,
            signal_period,
        } = params;
        let mut values = vec![None; closes.len()];
        if fast_period == 0 || slow_period == 0 || signal_period == 0 {
            return values;
        }

        let macd_start = fast_period.max(slow_period) - 1;
        let signal_start = macd_start + signal_period - 1;
        if closes.len() <= signal_start {
            return values;
        }

        let fast = self.ema(closes, EmaParams { period: fast_period });
        let slow = self.ema(closes, EmaParams { period: slow_period });
        let macd_line: Vec<Decimal> = fast
            .iter()
            .zip(slow.iter())
            .skip(macd_start)
            .filter_map(|(f, s)| Some((*f)? - (*s)?))
            .collect();

        let multiplier = Decimal::TWO / Decimal::from(signal_period + 1);
        let mut signal = mean(&macd_line[..signal_period]);

        for (offset, macd) in macd_line.iter().enumerate().skip(signal_period - 1) {
            if offset >= signal_period {
                signal = (*macd - signal) * multiplier + signal;
            }
            values[macd_start + offset] = Some(MacdValue {
                macd: *macd,
                signal,
                histogram: *macd - signal,
            });
        }

        values
    }
}
