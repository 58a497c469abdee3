//! 도메인 식별자 파싱 오류.

use thiserror::Error;

/// 텍스트에서 도메인 식별자를 파싱할 때 발생하는 오류.
///
/// CLI 인자나 설정 파일의 잘못된 식별자를 실행 전에 거부하기 위해 사용합니다.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// 알 수 없는 지표
    #[error("알 수 없는 지표: {0}")]
    UnknownIndicator(String),

    /// 알 수 없는 비교 연산자
    #[error("알 수 없는 비교 연산자: {0}")]
    UnknownOperator(String),

    /// 알 수 없는 타임프레임
    #[error("알 수 없는 타임프레임: {0}")]
    UnknownTimeframe(String),
}
