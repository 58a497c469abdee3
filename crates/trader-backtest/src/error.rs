//! 백테스트 오류 타입.

use thiserror::Error;

/// 백테스트 오류
#[derive(Debug, Error, Clone, PartialEq)]
pub enum BacktestError {
    /// 설정 오류
    #[error("백테스트 설정 오류: {0}")]
    ConfigError(String),

    /// 데이터 오류
    #[error("데이터 오류: {0}")]
    DataError(String),

    /// 전략 오류
    #[error("전략 실행 오류: {0}")]
    StrategyError(String),

    /// 금액 계산이 표현 범위를 넘음
    #[error("계산 오류: {0}")]
    CalculationError(String),
}

/// 백테스트 결과 타입
pub type Result<T> = std::result::Result<T, BacktestError>;
