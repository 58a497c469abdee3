//! 규칙 기반 전략의 조건 평가와 스키마 검증.
//!
//! - [`conditions`]: 특정 캔들 인덱스에서 조건/조건 그룹을 평가
//! - [`validation`]: 시뮬레이션 전에 전략 구조를 검증 (수동 작성, AI 생성 공통)

pub mod conditions;
pub mod validation;

pub use conditions::{evaluate_condition, evaluate_condition_group, EQUALITY_EPSILON};
pub use validation::{
    validate_strategy_schema, Severity, StrategySchemaValidator, ValidationCategory,
    ValidationIssue, ValidationReport,
};
