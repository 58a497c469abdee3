//! 전략 백테스터 핵심 도메인 타입.
//!
//! 이 크레이트는 백테스터 전체에서 공유되는 데이터 모델을 정의합니다:
//! - 캔들 (OHLCV) 시계열
//! - 규칙 기반 전략 설정 (진입/청산 조건, 손절/익절)
//! - 자금 관리 및 실행 환경 설정
//! - 시뮬레이션 중 생성되는 포지션, 완료 거래, 자산 곡선 포인트
//!
//! 모든 설정 객체는 값으로 전달되는 불변 구조체이며 전역 상태를 두지 않습니다.

pub mod domain;
pub mod error;

pub use domain::*;
pub use error::ParseError;
