//! 지표 캐시.
//!
//! 하나의 캔들 배열에 대해 자주 쓰이는 지표를 미리 계산해 두고,
//! 미리 계산되지 않은 기간은 처음 조회될 때 계산하여 보관합니다.
//!
//! # 구조
//!
//! ```text
//! IndicatorCache        // 캔들 배열 하나에 귀속
//! ├── rsi       {7, 14, 21, 28}
//! ├── sma       {5, 10, 20, 50, 100, 200}
//! ├── ema       {5, 10, 12, 20, 26, 50, 100, 200}
//! ├── bollinger {20}
//! └── macd      (12, 26, 9) 고정
//! ```
//!
//! 캔들 배열이 바뀌면 새 캐시를 만들어야 합니다. 무효화 로직은 없고,
//! [`IndicatorCache::matches`]로 캐시가 주어진 캔들 배열로 만들어졌는지만 확인합니다.

use std::{collections::HashMap, time::Instant};

use rust_decimal::Decimal;
use tracing::debug;
use trader_core::{Candle, IndicatorKind, StrategyConfig};

use super::{
    closes, BollingerBand, BollingerBandsParams, EmaParams, IndicatorEngine, IndicatorSeries,
    MacdParams, MacdValue, RsiParams, SmaParams,
};

/// 미리 계산하는 RSI 기간.
pub const PRECALC_RSI_PERIODS: [usize; 4] = [7, 14, 21, 28];
/// 미리 계산하는 SMA 기간.
pub const PRECALC_SMA_PERIODS: [usize; 6] = [5, 10, 20, 50, 100, 200];
/// 미리 계산하는 EMA 기간.
pub const PRECALC_EMA_PERIODS: [usize; 8] = [5, 10, 12, 20, 26, 50, 100, 200];
/// 미리 계산하는 볼린저 밴드 기간.
pub const PRECALC_BB_PERIODS: [usize; 1] = [20];

/// `(지표, 기간)` 단위로 시계열을 보관하는 캐시.
#[derive(Debug, Clone)]
pub struct IndicatorCache {
    engine: IndicatorEngine,
    closes: Vec<Decimal>,
    /// 원본 캔들의 첫/마지막 시각 (종가만으로 만든 캐시는 `None`)
    time_span: Option<(i64, i64)>,
    rsi: HashMap<usize, IndicatorSeries>,
    sma: HashMap<usize, IndicatorSeries>,
    ema: HashMap<usize, IndicatorSeries>,
    bollinger: HashMap<usize, Vec<Option<BollingerBand>>>,
    macd: Vec<Option<MacdValue>>,
}

impl IndicatorCache {
    /// 캔들 배열에 대한 캐시를 만들고 기본 기간을 미리 계산합니다.
    pub fn new(candles: &[Candle]) -> Self {
        let time_span = candles.first().zip(candles.last()).map(|(f, l)| (f.time, l.time));
        Self::build(closes(candles), time_span)
    }

    /// 종가 배열로 캐시를 생성합니다.
    pub fn from_closes(closes: Vec<Decimal>) -> Self {
        Self::build(closes, None)
    }

    fn build(closes: Vec<Decimal>, time_span: Option<(i64, i64)>) -> Self {
        let started = Instant::now();
        let engine = IndicatorEngine::new();

        let rsi = PRECALC_RSI_PERIODS
            .iter()
            .map(|&period| (period, engine.rsi(&closes, RsiParams { period })))
            .collect();
        let sma = PRECALC_SMA_PERIODS
            .iter()
            .map(|&period| (period, engine.sma(&closes, SmaParams { period })))
            .collect();
        let ema = PRECALC_EMA_PERIODS
            .iter()
            .map(|&period| (period, engine.ema(&closes, EmaParams { period })))
            .collect();
        let bollinger = PRECALC_BB_PERIODS
            .iter()
            .map(|&period| {
                let params = BollingerBandsParams {
                    period,
                    ..Default::default()
                };
                (period, engine.bollinger_bands(&closes, params))
            })
            .collect();
        let macd = engine.macd(&closes, MacdParams::default());

        debug!(
            candles = closes.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "지표 사전 계산 완료"
        );

        Self {
            engine,
            closes,
            time_span,
            rsi,
            sma,
            ema,
            bollinger,
            macd,
        }
    }

    /// 캐시가 만들어진 캔들 수.
    pub fn len(&self) -> usize {
        self.closes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.closes.is_empty()
    }

    /// 캐시가 `candles`로 만들어졌는지 확인합니다.
    ///
    /// 종가 전체와 첫/마지막 시각을 비교합니다. 종가만으로 만든 캐시는 종가만 비교합니다.
    pub fn matches(&self, candles: &[Candle]) -> bool {
        if self.closes.len() != candles.len()
            || !self.closes.iter().zip(candles).all(|(close, c)| *close == c.close)
        {
            return false;
        }
        match self.time_span {
            Some(span) => {
                candles.first().zip(candles.last()).map(|(f, l)| (f.time, l.time)) == Some(span)
            }
            None => true,
        }
    }

    /// `index` 시점의 지표 값.
    ///
    /// PRICE는 종가, MACD 계열은 기간을 무시하고 기본 (12, 26, 9)를 사용합니다.
    /// 워밍업 구간이거나 범위를 벗어나면 `None`.
    pub fn value(&mut self, kind: IndicatorKind, period: u32, index: usize) -> Option<Decimal> {
        let period = period as usize;
        match kind {
            IndicatorKind::Rsi => self.rsi_series(period).get(index).copied().flatten(),
            IndicatorKind::Sma => self.sma_series(period).get(index).copied().flatten(),
            IndicatorKind::Ema => self.ema_series(period).get(index).copied().flatten(),
            IndicatorKind::BbUpper => self.band_at(period, index).map(|b| b.upper),
            IndicatorKind::BbMiddle => self.band_at(period, index).map(|b| b.middle),
            IndicatorKind::BbLower => self.band_at(period, index).map(|b| b.lower),
            IndicatorKind::Macd => self.macd_at(index).map(|m| m.macd),
            IndicatorKind::MacdSignal => self.macd_at(index).map(|m| m.signal),
            IndicatorKind::MacdHistogram => self.macd_at(index).map(|m| m.histogram),
            IndicatorKind::Price => self.closes.get(index).copied(),
        }
    }

    /// 전체 시계열 (캔들 배열과 같은 길이).
    pub fn series(&mut self, kind: IndicatorKind, period: u32) -> IndicatorSeries {
        (0..self.len())
            .map(|index| self.value(kind, period, index))
            .collect()
    }

    /// 전략이 참조하는 모든 `(지표, 기간)`을 미리 계산합니다.
    pub fn warm_for_strategy(&mut self, strategy: &StrategyConfig) {
        for (kind, period) in strategy.referenced_indicators() {
            // 첫 인덱스 조회로 지연 계산을 유도
            let _ = self.value(kind, period, 0);
        }
    }

    /// 해당 시계열이 이미 계산되어 있는지 여부.
    pub fn contains(&self, kind: IndicatorKind, period: u32) -> bool {
        let period = period as usize;
        match kind {
            IndicatorKind::Rsi => self.rsi.contains_key(&period),
            IndicatorKind::Sma => self.sma.contains_key(&period),
            IndicatorKind::Ema => self.ema.contains_key(&period),
            IndicatorKind::BbUpper | IndicatorKind::BbMiddle | IndicatorKind::BbLower => {
                self.bollinger.contains_key(&period)
            }
            IndicatorKind::Macd
            | IndicatorKind::MacdSignal
            | IndicatorKind::MacdHistogram
            | IndicatorKind::Price => true,
        }
    }

    // ===== 지연 계산 =====

    fn rsi_series(&mut self, period: usize) -> &IndicatorSeries {
        let (engine, closes) = (self.engine, &self.closes);
        self.rsi.entry(period).or_insert_with(|| {
            debug!(period, "RSI 지연 계산");
            engine.rsi(closes, RsiParams { period })
        })
    }

    fn sma_series(&mut self, period: usize) -> &IndicatorSeries {
        let (engine, closes) = (self.engine, &self.closes);
        self.sma.entry(period).or_insert_with(|| {
            debug!(period, "SMA 지연 계산");
            engine.sma(closes, SmaParams { period })
        })
    }

    fn ema_series(&mut self, period: usize) -> &IndicatorSeries {
        let (engine, closes) = (self.engine, &self.closes);
        self.ema.entry(period).or_insert_with(|| {
            debug!(period, "EMA 지연 계산");
            engine.ema(closes, EmaParams { period })
        })
    }

    fn band_at(&mut self, period: usize, index: usize) -> Option<BollingerBand> {
        let (engine, closes) = (self.engine, &self.closes);
        self.bollinger
            .entry(period)
            .or_insert_with(|| {
                debug!(period, "볼린저 밴드 지연 계산");
                let params = BollingerBandsParams {
                    period,
                    ..Default::default()
                };
                engine.bollinger_bands(closes, params)
            })
            .get(index)
            .copied()
            .flatten()
    }

    fn macd_at(&self, index: usize) -> Option<MacdValue> {
        self.macd.get(index).copied().flatten()
    }
}
