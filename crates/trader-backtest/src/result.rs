//! 백테스트 결과.

use serde::{Deserialize, Serialize};
use trader_analytics::{DetailedStats, Summary, VisualizationData};

use crate::config::BacktestConfig;

/// 백테스트 실행 결과
///
/// `timestamp`와 `execution_time_ms`를 제외한 모든 필드는 입력에 대해 결정적입니다.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BacktestResult {
    /// 요약 지표
    pub summary: Summary,
    /// 상세 통계
    pub stats: DetailedStats,
    /// 차트 데이터 (자산 곡선, 낙폭, 거래, 월별 수익)
    pub visualization: VisualizationData,
    /// 완료 시각 (ms)
    pub timestamp: i64,
    /// 실행 시간 (ms)
    pub execution_time_ms: u64,
    /// 실행에 사용한 설정
    pub config: BacktestConfig,
}

impl BacktestResult {
    /// 요약 문자열 반환
    pub fn summary_text(&self) -> String {
        let env = &self.config.environment;
        let summary = &self.summary;
        let stats = &self.stats;

        format!(
            "백테스트 결과 요약\n\
             ═══════════════════════════════════════\n\
             종목: {} ({})\n\
             기간: {} → {} ({} 일)\n\
             자산 포인트: {}\n\
             ───────────────────────────────────────\n\
             초기 자본: {} {}\n\
             최종 자산: {:.2} {}\n\
             순수익: {:.2}\n\
             총 수익률: {:.2}%\n\
             연율화 수익률: {}\n\
             ───────────────────────────────────────\n\
             총 거래: {}\n\
             승률: {:.1}%\n\
             프로핏 팩터: {}\n\
             손익비: {}\n\
             최대 연승/연패: {} / {}\n\
             ───────────────────────────────────────\n\
             샤프 비율: {:.2}\n\
             소르티노 비율: {:.2}\n\
             최대 낙폭: {:.2}%\n\
             ═══════════════════════════════════════",
            env.symbol,
            env.timeframe,
            stats.period.start_date,
            stats.period.end_date,
            stats.period.days_count,
            self.visualization.equity_curve.len(),
            env.initial_capital,
            env.initial_currency,
            summary.final_equity.value,
            summary.final_equity.currency,
            summary.total_return.value,
            summary.total_return.percentage,
            format_ratio(stats.growth.cagr).map_or_else(|| "-".to_string(), |v| format!("{}%", v)),
            stats.trades.total_trades,
            summary.win_rate.value,
            format_ratio(stats.profitability.profit_factor).unwrap_or_else(|| "∞".to_string()),
            format_ratio(stats.profitability.payoff_ratio).unwrap_or_else(|| "∞".to_string()),
            stats.trades.consecutive_wins,
            stats.trades.consecutive_losses,
            stats.volatility.sharpe_ratio,
            stats.volatility.sortino_ratio,
            summary.max_drawdown.percentage,
        )
    }
}

/// 유한한 값만 소수 둘째 자리로 표시합니다.
fn format_ratio(value: f64) -> Option<String> {
    value.is_finite().then(|| format!("{:.2}", value))
}
