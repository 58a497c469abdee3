//! 기술 지표 및 성과 분석.
//!
//! - [`indicators`]: RSI, SMA, EMA, MACD, 볼린저 밴드 계산과 지표 캐시
//! - [`performance`]: 거래 목록과 자산 곡선에서 요약/상세 통계/차트 데이터 산출

pub mod indicators;
pub mod performance;

pub use indicators::{
    BollingerBand, BollingerBandsParams, EmaParams, IndicatorCache, IndicatorEngine, MacdParams,
    MacdValue, RsiParams, SmaParams,
};
pub use performance::{
    calculate_detailed_stats, calculate_summary, calculate_visualization_data, DetailedStats,
    Summary, VisualizationData,
};
