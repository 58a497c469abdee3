//! 규칙 기반 전략 백테스터.
//!
//! 캔들 배열과 [`BacktestConfig`]를 받아 [`BacktestResult`]를 만듭니다.
//!
//! - [`engine`]: 캔들 단위 시뮬레이션 (단일 포지션)
//! - [`dry_run`]: 최근 구간 드라이런과 전략 채택 게이트
//! - [`result`]: 결과 타입과 텍스트 요약

pub mod config;
pub mod dry_run;
pub mod engine;
pub mod error;
pub mod result;

pub use config::BacktestConfig;
pub use dry_run::{
    accept_strategy, accept_strategy_with_window, run_dry_run, run_dry_run_with_window,
    AcceptanceReport, DryRunResult, DRY_RUN_WINDOW,
};
pub use engine::{run_backtest, run_validated_backtest, BacktestEngine};
pub use error::{BacktestError, Result};
pub use result::BacktestResult;
