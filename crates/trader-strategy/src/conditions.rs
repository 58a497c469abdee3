//! 조건 평가기.
//!
//! 조건은 각 인덱스에서 독립적으로 평가됩니다. 교차 연산자만 예외적으로
//! 직전 인덱스 값을 함께 조회하며, 평가기 자체는 인덱스 간 상태를 두지 않습니다.
//!
//! 지표 값이 정의되지 않은 시점(워밍업 구간)에서는 어떤 연산자든 거짓입니다.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use tracing::trace;
use trader_analytics::IndicatorCache;
use trader_core::{
    Candle, ComparisonOperator, Condition, ConditionGroup, IndicatorKind, LogicalOperator,
};

/// `==` 비교 허용 오차.
pub const EQUALITY_EPSILON: Decimal = dec!(0.0001);

/// `index` 시점에서 단일 조건을 평가합니다.
///
/// 좌변은 `indicator`(없으면 PRICE)와 `indicator_period`(없으면 14),
/// 우변은 `compare_to_indicator`가 있으면 그 지표, 없으면 고정값 `value`입니다.
/// 어느 쪽이든 값이 없으면 거짓을 반환하며 패닉하지 않습니다.
pub fn evaluate_condition(
    condition: &Condition,
    cache: &mut IndicatorCache,
    candles: &[Candle],
    index: usize,
) -> bool {
    let Some(comparison) = condition.comparison else {
        return false;
    };
    let Some((lhs, rhs)) = operands(condition, cache, candles, index) else {
        trace!(condition = %condition.description, index, "지표 값 없음: 조건 건너뜀");
        return false;
    };

    let result = match comparison {
        ComparisonOperator::LessThan => lhs < rhs,
        ComparisonOperator::GreaterThan => lhs > rhs,
        ComparisonOperator::LessOrEqual => lhs <= rhs,
        ComparisonOperator::GreaterOrEqual => lhs >= rhs,
        ComparisonOperator::Equal => (lhs - rhs).abs() < EQUALITY_EPSILON,
        ComparisonOperator::CrossesAbove | ComparisonOperator::CrossesBelow => {
            let previous = index
                .checked_sub(1)
                .and_then(|prev| operands(condition, cache, candles, prev));
            match (comparison, previous) {
                (ComparisonOperator::CrossesAbove, Some((prev_lhs, prev_rhs))) => {
                    prev_lhs <= prev_rhs && lhs > rhs
                }
                (ComparisonOperator::CrossesBelow, Some((prev_lhs, prev_rhs))) => {
                    prev_lhs >= prev_rhs && lhs < rhs
                }
                _ => false,
            }
        }
    };

    trace!(
        condition = %condition.description,
        index,
        lhs = %lhs,
        rhs = %rhs,
        result,
        "조건 평가"
    );
    result
}

/// 조건 그룹을 평가합니다. 비어있으면 거짓, AND는 모두 참, OR는 하나 이상 참.
pub fn evaluate_condition_group(
    group: &ConditionGroup,
    cache: &mut IndicatorCache,
    candles: &[Candle],
    index: usize,
) -> bool {
    if group.is_empty() {
        return false;
    }

    match group.operator {
        LogicalOperator::And => group
            .conditions
            .iter()
            .all(|c| evaluate_condition(c, cache, candles, index)),
        LogicalOperator::Or => group
            .conditions
            .iter()
            .any(|c| evaluate_condition(c, cache, candles, index)),
    }
}

/// 좌변/우변 값. 둘 중 하나라도 없으면 `None`.
fn operands(
    condition: &Condition,
    cache: &mut IndicatorCache,
    candles: &[Candle],
    index: usize,
) -> Option<(Decimal, Decimal)> {
    let lhs = resolve(
        cache,
        candles,
        condition.lhs_indicator(),
        condition.lhs_period(),
        index,
    )?;
    let rhs = match condition.compare_to_indicator {
        Some(kind) => resolve(cache, candles, kind, condition.rhs_period(), index)?,
        None => condition.value,
    };
    Some((lhs, rhs))
}

fn resolve(
    cache: &mut IndicatorCache,
    candles: &[Candle],
    kind: IndicatorKind,
    period: u32,
    index: usize,
) -> Option<Decimal> {
    match kind {
        IndicatorKind::Price => candles.get(index).map(|c| c.close),
        _ => cache.value(kind, period, index),
    }
}
