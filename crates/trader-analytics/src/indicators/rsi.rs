//! RSI (Wilder 평활).

use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use super::{IndicatorEngine, IndicatorSeries};

/// RSI 파라미터.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RsiParams {
    pub period: usize,
}

impl Default for RsiParams {
    fn default() -> Self {
        Self { period: 14 }
    }
}

impl IndicatorEngine {
    /// Wilder 방식 RSI.
    ///
    /// 첫 `period`개 변화량의 단순 평균으로 시드한 뒤
    /// `avg = (avg * (period - 1) + x) / period`로 평활합니다.
    /// 변화량 기반이므로 첫 유효값은 인덱스 `period`입니다.
    pub fn rsi(&self, closes: &[Decimal], params: RsiParams) -> IndicatorSeries {
        let period = params.period;
        let mut values = vec![None; closes.len()];
        if period == 0 || closes.len() <= period {
            return values;
        }

        let divisor = Decimal::from(period);
        let mut avg_gain = Decimal::ZERO;
        let mut avg_loss = Decimal::ZERO;

        for i in 1..=period {
            let change = closes[i] - closes[i - 1];
            if change > Decimal::ZERO {
                avg_gain += change;
            } else {
                avg_loss -= change;
            }
        }
        avg_gain /= divisor;
        avg_loss /= divisor;
        values[period] = Some(rsi_value(avg_gain, avg_loss));

        let smoothing = Decimal::from(period - 1);
        for i in (period + 1)..closes.len() {
            let change = closes[i] - closes[i - 1];
            let gain = change.max(Decimal::ZERO);
            let loss = (-change).max(Decimal::ZERO);

            avg_gain = (avg_gain * smoothing + gain) / divisor;
            avg_loss = (avg_loss * smoothing + loss) / divisor;
            values[i] = Some(rsi_value(avg_gain, avg_loss));
        }

        values
    }
}

/// `100 - 100 / (1 + RS)`와 같은 값인 `100 * gain / (gain + loss)`로 계산합니다.
/// 평균 손실이 0이면 100.
fn rsi_value(avg_gain: Decimal, avg_loss: Decimal) -> Decimal {
    if avg_loss.is_zero() {
        return dec!(100);
    }
    dec!(100) * avg_gain / (avg_gain + avg_loss)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::test_support::{trending_closes, zigzag_closes};
    use proptest::prelude::*;

    #[test]
    fn test_rsi_first_value_at_period() {
        let closes = zigzag_closes(30);
        let rsi = IndicatorEngine::new().rsi(&closes, RsiParams { period: 14 });

        assert_eq!(rsi.len(), 30);
        assert!(rsi[..14].iter().all(Option::is_none));
        assert!(rsi[14..].iter().all(Option::is_some));
    }

    #[test]
    fn test_rsi_all_gains_is_100() {
        let closes = trending_closes(20, dec!(100), dec!(1));
        let rsi = IndicatorEngine::new().rsi(&closes, RsiParams { period: 14 });
        assert_eq!(rsi[14], Some(dec!(100)));
        assert_eq!(rsi[19], Some(dec!(100)));
    }

    #[test]
    fn test_rsi_all_losses_is_0() {
        let closes = trending_closes(20, dec!(100), dec!(-1));
        let rsi = IndicatorEngine::new().rsi(&closes, RsiParams { period: 14 });
        assert_eq!(rsi[14], Some(Decimal::ZERO));
    }

    #[test]
    fn test_rsi_seed_value() {
        // 변화량: +2, -1, +2, -1 → 평균 이득 1, 평균 손실 0.5 → RS 2 → RSI 66.67
        let closes = vec![dec!(10), dec!(12), dec!(11), dec!(13), dec!(12)];
        let rsi = IndicatorEngine::new().rsi(&closes, RsiParams { period: 4 });
        let value = rsi[4].unwrap();
        assert!((value - dec!(66.6667)).abs() < dec!(0.001));
    }

    #[test]
    fn test_rsi_insufficient_data() {
        // period + 1개 미만이면 전부 None
        let closes = trending_closes(14, dec!(100), dec!(1));
        let rsi = IndicatorEngine::new().rsi(&closes, RsiParams { period: 14 });
        assert_eq!(rsi.len(), 14);
        assert!(rsi.iter().all(Option::is_none));
    }

    proptest! {
        #[test]
        fn prop_rsi_bounded(
            closes in proptest::collection::vec(1i64..10_000_000, 0..200),
            period in 1usize..30,
        ) {
            let closes: Vec<Decimal> = closes.into_iter().map(|v| Decimal::new(v, 2)).collect();
            let rsi = IndicatorEngine::new().rsi(&closes, RsiParams { period });

            prop_assert_eq!(rsi.len(), closes.len());
            for (i, value) in rsi.iter().enumerate() {
                prop_assert_eq!(value.is_some(), i >= period);
                if let Some(v) = value {
                    prop_assert!(*v >= Decimal::ZERO && *v <= dec!(100));
                }
            }
        }
    }
}
