//! 볼린저 밴드.

use rust_decimal::{Decimal, MathematicalOps};
use serde::{Deserialize, Serialize};

use super::{IndicatorEngine, SmaParams};

/// 볼린저 밴드 파라미터.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BollingerBandsParams {
    pub period: usize,
    /// 표준편차 승수
    pub std_dev_multiplier: Decimal,
}

impl Default for BollingerBandsParams {
    fn default() -> Self {
        Self {
            period: 20,
            std_dev_multiplier: Decimal::TWO,
        }
    }
}

/// 한 시점의 밴드 값.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BollingerBand {
    pub upper: Decimal,
    pub middle: Decimal,
    pub lower: Decimal,
}

impl IndicatorEngine {
    /// 중심선 = SMA(period), 폭 = 승수 × 모표준편차(윈도우 전체 스캔, `period`로 나눔).
    pub fn bollinger_bands(
        &self,
        closes: &[Decimal],
        params: BollingerBandsParams,
    ) -> Vec<Option<BollingerBand>> {
        let period = params.period;
        let middles = self.sma(closes, SmaParams { period });

        middles
            .iter()
            .enumerate()
            .map(|(i, middle)| {
                let middle = (*middle)?;
                let window = &closes[i + 1 - period..=i];
                let variance = window
                    .iter()
                    .map(|close| {
                        let diff = *close - middle;
                        diff * diff
                    })
                    .sum::<Decimal>()
                    / Decimal::from(period);
                let std_dev = variance.sqrt().unwrap_or(Decimal::ZERO);
                let width = params.std_dev_multiplier * std_dev;

                Some(BollingerBand {
                    upper: middle + width,
                    middle,
                    lower: middle - width,
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::test_support::zigzag_closes;
    use rust_decimal_macros::dec;

    #[test]
    fn test_bollinger_population_std_dev() {
        // 평균 5, 모분산 4 → 표준편차 2
        let closes = vec![
            dec!(2),
            dec!(4),
            dec!(4),
            dec!(4),
            dec!(5),
            dec!(5),
            dec!(7),
            dec!(9),
        ];
        let params = BollingerBandsParams {
            period: 8,
            std_dev_multiplier: dec!(2),
        };
        let bands = IndicatorEngine::new().bollinger_bands(&closes, params);

        assert!(bands[6].is_none());
        let band = bands[7].unwrap();
        assert_eq!(band.middle, dec!(5));
        assert!((band.upper - dec!(9)).abs() < dec!(0.0000001));
        assert!((band.lower - dec!(1)).abs() < dec!(0.0000001));
    }

    #[test]
    fn test_bollinger_ordering_and_length() {
        let closes = zigzag_closes(50);
        let bands = IndicatorEngine::new().bollinger_bands(&closes, BollingerBandsParams::default());

        assert_eq!(bands.len(), 50);
        assert!(bands[..19].iter().all(Option::is_none));
        for band in bands[19..].iter().flatten() {
            assert!(band.lower <= band.middle && band.middle <= band.upper);
        }
    }

    #[test]
    fn test_bollinger_insufficient_data() {
        let closes = zigzag_closes(10);
        let bands = IndicatorEngine::new().bollinger_bands(&closes, BollingerBandsParams::default());
        assert_eq!(bands.len(), 10);
        assert!(bands.iter().all(Option::is_none));
    }
}
