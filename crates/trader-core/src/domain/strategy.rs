//! 규칙 기반 전략 설정.
//!
//! 이 모듈은 전략을 구성하는 타입을 정의합니다:
//! - `IndicatorKind` - 조건에서 참조하는 지표 종류
//! - `ComparisonOperator` - 비교 연산자 (순간 비교 및 교차)
//! - `Condition` / `ConditionGroup` - 진입/청산 조건
//! - `RiskLimit` - 손절/익절 한도
//! - `StrategyConfig` - 전체 전략 설정
//!
//! JSON/TOML 필드 이름은 전략 생성기(수동 폼, AI 생성기)의 페이로드와
//! 동일한 camelCase를 사용합니다.

use std::{collections::BTreeSet, fmt, str::FromStr};

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::error::ParseError;

/// 조건에 기간이 지정되지 않았을 때 사용하는 기본 기간.
pub const DEFAULT_CONDITION_PERIOD: u32 = 14;

/// 워밍업 계산 시 최대 지표 기간에 더하는 여유 캔들 수.
pub const WARMUP_BUFFER: usize = 30;

// ==================== IndicatorKind ====================

/// 조건에서 참조할 수 있는 지표 종류.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum IndicatorKind {
    Rsi,
    Sma,
    Ema,
    Macd,
    MacdSignal,
    MacdHistogram,
    BbUpper,
    BbMiddle,
    BbLower,
    /// 종가 (기간 무관)
    Price,
}

impl IndicatorKind {
    /// 모든 지표 종류.
    pub const ALL: [IndicatorKind; 10] = [
        IndicatorKind::Rsi,
        IndicatorKind::Sma,
        IndicatorKind::Ema,
        IndicatorKind::Macd,
        IndicatorKind::MacdSignal,
        IndicatorKind::MacdHistogram,
        IndicatorKind::BbUpper,
        IndicatorKind::BbMiddle,
        IndicatorKind::BbLower,
        IndicatorKind::Price,
    ];

    /// 식별자 문자열 ("RSI", "MACD_SIGNAL" 등).
    pub fn as_str(&self) -> &'static str {
        match self {
            IndicatorKind::Rsi => "RSI",
            IndicatorKind::Sma => "SMA",
            IndicatorKind::Ema => "EMA",
            IndicatorKind::Macd => "MACD",
            IndicatorKind::MacdSignal => "MACD_SIGNAL",
            IndicatorKind::MacdHistogram => "MACD_HISTOGRAM",
            IndicatorKind::BbUpper => "BB_UPPER",
            IndicatorKind::BbMiddle => "BB_MIDDLE",
            IndicatorKind::BbLower => "BB_LOWER",
            IndicatorKind::Price => "PRICE",
        }
    }

    /// 표시용 이름.
    pub fn label(&self) -> &'static str {
        match self {
            IndicatorKind::Rsi => "RSI",
            IndicatorKind::Sma => "SMA",
            IndicatorKind::Ema => "EMA",
            IndicatorKind::Macd => "MACD",
            IndicatorKind::MacdSignal => "MACD Signal",
            IndicatorKind::MacdHistogram => "MACD Histogram",
            IndicatorKind::BbUpper => "BB Upper",
            IndicatorKind::BbMiddle => "BB Middle",
            IndicatorKind::BbLower => "BB Lower",
            IndicatorKind::Price => "Price",
        }
    }

    /// 폼에서 사용하는 기본 기간.
    pub fn default_period(&self) -> u32 {
        match self {
            IndicatorKind::Rsi => 14,
            IndicatorKind::Sma | IndicatorKind::Ema => 20,
            IndicatorKind::Macd | IndicatorKind::MacdHistogram => 12,
            IndicatorKind::MacdSignal => 9,
            IndicatorKind::BbUpper | IndicatorKind::BbMiddle | IndicatorKind::BbLower => 20,
            IndicatorKind::Price => 0,
        }
    }

    /// MACD 계열 여부 (기간 무시, 기본 12/26/9 사용).
    pub fn is_macd_family(&self) -> bool {
        matches!(
            self,
            IndicatorKind::Macd | IndicatorKind::MacdSignal | IndicatorKind::MacdHistogram
        )
    }

    /// 볼린저 밴드 계열 여부.
    pub fn is_bollinger(&self) -> bool {
        matches!(
            self,
            IndicatorKind::BbUpper | IndicatorKind::BbMiddle | IndicatorKind::BbLower
        )
    }
}

impl fmt::Display for IndicatorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for IndicatorKind {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_uppercase().replace('-', "_");
        IndicatorKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == normalized)
            .ok_or_else(|| ParseError::UnknownIndicator(s.to_string()))
    }
}

// ==================== ComparisonOperator ====================

/// 조건 비교 연산자.
///
/// `CrossesAbove`/`CrossesBelow`는 직전 인덱스와 현재 인덱스의 관계를 비교하는
/// 2-샘플 교차 판정이며 `>`/`<`와 다릅니다.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ComparisonOperator {
    #[serde(rename = "<")]
    LessThan,
    #[serde(rename = ">")]
    GreaterThan,
    #[serde(rename = "<=")]
    LessOrEqual,
    #[serde(rename = ">=")]
    GreaterOrEqual,
    #[serde(rename = "==")]
    Equal,
    #[serde(rename = "crosses_above")]
    CrossesAbove,
    #[serde(rename = "crosses_below")]
    CrossesBelow,
}

impl ComparisonOperator {
    /// 식별자 문자열.
    pub fn as_str(&self) -> &'static str {
        match self {
            ComparisonOperator::LessThan => "<",
            ComparisonOperator::GreaterThan => ">",
            ComparisonOperator::LessOrEqual => "<=",
            ComparisonOperator::GreaterOrEqual => ">=",
            ComparisonOperator::Equal => "==",
            ComparisonOperator::CrossesAbove => "crosses_above",
            ComparisonOperator::CrossesBelow => "crosses_below",
        }
    }

    /// 교차 연산자 여부.
    pub fn is_cross(&self) -> bool {
        matches!(
            self,
            ComparisonOperator::CrossesAbove | ComparisonOperator::CrossesBelow
        )
    }
}

impl fmt::Display for ComparisonOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ComparisonOperator {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "<" => Ok(ComparisonOperator::LessThan),
            ">" => Ok(ComparisonOperator::GreaterThan),
            "<=" => Ok(ComparisonOperator::LessOrEqual),
            ">=" => Ok(ComparisonOperator::GreaterOrEqual),
            "==" | "=" => Ok(ComparisonOperator::Equal),
            "crosses_above" => Ok(ComparisonOperator::CrossesAbove),
            "crosses_below" => Ok(ComparisonOperator::CrossesBelow),
            other => Err(ParseError::UnknownOperator(other.to_string())),
        }
    }
}

// ==================== Condition ====================

/// 조건 유형.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConditionType {
    /// 지표 vs 고정값 (예: RSI < 30)
    IndicatorThreshold,
    /// 지표 vs 지표 (예: SMA(20) > SMA(50))
    IndicatorCompare,
    /// 가격 기반 (예: Price > SMA(20))
    PriceAction,
}

impl ConditionType {
    /// 식별자 문자열.
    pub fn as_str(&self) -> &'static str {
        match self {
            ConditionType::IndicatorThreshold => "indicator_threshold",
            ConditionType::IndicatorCompare => "indicator_compare",
            ConditionType::PriceAction => "price_action",
        }
    }
}

/// 단일 조건.
///
/// `condition_type`/`comparison`이 `Option`인 이유는 외부 생성기가 만든
/// 불완전한 전략을 그대로 역직렬화한 뒤 스키마 검증기에서 누락을 보고하기
/// 위해서입니다.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Condition {
    /// 전략 내 고유 ID
    #[serde(default)]
    pub id: String,

    /// 조건 유형
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub condition_type: Option<ConditionType>,

    /// 좌변 지표 (없으면 PRICE)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub indicator: Option<IndicatorKind>,

    /// 좌변 지표 기간 (없거나 0이면 14)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub indicator_period: Option<u32>,

    /// 비교 연산자
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comparison: Option<ComparisonOperator>,

    /// 고정 비교값 (`compare_to_indicator`가 없을 때 사용)
    #[serde(default)]
    pub value: Decimal,

    /// 우변 지표
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub compare_to_indicator: Option<IndicatorKind>,

    /// 우변 지표 기간
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub compare_to_indicator_period: Option<u32>,

    /// 사람이 읽을 수 있는 설명
    #[serde(default)]
    pub description: String,
}

impl Condition {
    /// 지표 vs 고정값 조건 (예: RSI(14) < 30).
    pub fn threshold(
        id: impl Into<String>,
        indicator: IndicatorKind,
        period: u32,
        comparison: ComparisonOperator,
        value: Decimal,
    ) -> Self {
        let description = format!("{}({}) {} {}", indicator, period, comparison, value);
        Self {
            id: id.into(),
            condition_type: Some(ConditionType::IndicatorThreshold),
            indicator: Some(indicator),
            indicator_period: Some(period),
            comparison: Some(comparison),
            value,
            compare_to_indicator: None,
            compare_to_indicator_period: None,
            description,
        }
    }

    /// 지표 vs 지표 조건 (예: SMA(20) > SMA(50)).
    pub fn compare(
        id: impl Into<String>,
        indicator: IndicatorKind,
        period: u32,
        comparison: ComparisonOperator,
        other: IndicatorKind,
        other_period: u32,
    ) -> Self {
        let description = format!(
            "{}({}) {} {}({})",
            indicator, period, comparison, other, other_period
        );
        Self {
            id: id.into(),
            condition_type: Some(ConditionType::IndicatorCompare),
            indicator: Some(indicator),
            indicator_period: Some(period),
            comparison: Some(comparison),
            value: Decimal::ZERO,
            compare_to_indicator: Some(other),
            compare_to_indicator_period: Some(other_period),
            description,
        }
    }

    /// 종가 vs 지표 조건 (예: PRICE > SMA(20)).
    pub fn price(
        id: impl Into<String>,
        comparison: ComparisonOperator,
        other: IndicatorKind,
        other_period: u32,
    ) -> Self {
        let description = format!("PRICE {} {}({})", comparison, other, other_period);
        Self {
            id: id.into(),
            condition_type: Some(ConditionType::PriceAction),
            indicator: Some(IndicatorKind::Price),
            indicator_period: None,
            comparison: Some(comparison),
            value: Decimal::ZERO,
            compare_to_indicator: Some(other),
            compare_to_indicator_period: Some(other_period),
            description,
        }
    }

    /// 설명을 교체합니다.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// 평가에 사용할 좌변 지표.
    pub fn lhs_indicator(&self) -> IndicatorKind {
        self.indicator.unwrap_or(IndicatorKind::Price)
    }

    /// 평가에 사용할 좌변 기간.
    pub fn lhs_period(&self) -> u32 {
        effective_period(self.indicator_period)
    }

    /// 평가에 사용할 우변 기간.
    pub fn rhs_period(&self) -> u32 {
        effective_period(self.compare_to_indicator_period)
    }
}

fn effective_period(period: Option<u32>) -> u32 {
    match period {
        Some(p) if p > 0 => p,
        _ => DEFAULT_CONDITION_PERIOD,
    }
}

// ==================== ConditionGroup ====================

/// 조건 결합 연산자.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum LogicalOperator {
    #[default]
    And,
    Or,
}

/// AND/OR로 결합된 조건 묶음. 비어있으면 항상 거짓입니다.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ConditionGroup {
    #[serde(default)]
    pub operator: LogicalOperator,
    #[serde(default)]
    pub conditions: Vec<Condition>,
}

impl ConditionGroup {
    /// 모든 조건이 참이어야 하는 그룹.
    pub fn all(conditions: Vec<Condition>) -> Self {
        Self {
            operator: LogicalOperator::And,
            conditions,
        }
    }

    /// 하나라도 참이면 되는 그룹.
    pub fn any(conditions: Vec<Condition>) -> Self {
        Self {
            operator: LogicalOperator::Or,
            conditions,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.conditions.is_empty()
    }
}

// ==================== StrategyConfig ====================

/// 손절/익절 한도.
///
/// `percentage`는 항상 양수 크기로 해석됩니다 (손절 5 = -5% 도달 시 청산).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskLimit {
    pub enabled: bool,
    pub percentage: Decimal,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl RiskLimit {
    /// 활성화된 한도.
    pub fn new(percentage: Decimal) -> Self {
        Self {
            enabled: true,
            percentage,
            description: None,
        }
    }

    /// 비활성화된 한도.
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            percentage: Decimal::ZERO,
            description: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// 전략 설정.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StrategyConfig {
    /// 진입 조건
    pub entry_condition: ConditionGroup,
    /// 청산 조건
    pub exit_condition: ConditionGroup,
    /// 손절
    pub stop_loss: RiskLimit,
    /// 익절
    pub take_profit: RiskLimit,
}

impl Default for StrategyConfig {
    /// RSI(14) < 30 진입, RSI(14) > 70 청산, 손절 5%, 익절 10%.
    fn default() -> Self {
        Self {
            entry_condition: ConditionGroup::all(vec![Condition::threshold(
                "1",
                IndicatorKind::Rsi,
                14,
                ComparisonOperator::LessThan,
                dec!(30),
            )]),
            exit_condition: ConditionGroup::all(vec![Condition::threshold(
                "2",
                IndicatorKind::Rsi,
                14,
                ComparisonOperator::GreaterThan,
                dec!(70),
            )]),
            stop_loss: RiskLimit::new(dec!(5)).with_description("5% stop loss"),
            take_profit: RiskLimit::new(dec!(10)).with_description("10% take profit"),
        }
    }
}

impl StrategyConfig {
    /// 진입/청산 그룹으로 전략을 생성합니다. 손절/익절은 비활성화 상태입니다.
    pub fn new(entry_condition: ConditionGroup, exit_condition: ConditionGroup) -> Self {
        Self {
            entry_condition,
            exit_condition,
            stop_loss: RiskLimit::disabled(),
            take_profit: RiskLimit::disabled(),
        }
    }

    /// 손절 설정
    pub fn with_stop_loss(mut self, percentage: Decimal) -> Self {
        self.stop_loss = RiskLimit::new(percentage);
        self
    }

    /// 익절 설정
    pub fn with_take_profit(mut self, percentage: Decimal) -> Self {
        self.take_profit = RiskLimit::new(percentage);
        self
    }

    /// 진입 조건 다음에 청산 조건 순서로 모든 조건을 순회합니다.
    pub fn conditions(&self) -> impl Iterator<Item = &Condition> {
        self.entry_condition
            .conditions
            .iter()
            .chain(self.exit_condition.conditions.iter())
    }

    /// 조건에서 명시적으로 참조하는 모든 기간 (0 제외).
    pub fn referenced_periods(&self) -> BTreeSet<u32> {
        self.conditions()
            .flat_map(|c| [c.indicator_period, c.compare_to_indicator_period])
            .flatten()
            .filter(|p| *p > 0)
            .collect()
    }

    /// 조건이 참조하는 `(지표, 기간)` 쌍. 평가 시 적용되는 기본값이 반영됩니다.
    pub fn referenced_indicators(&self) -> BTreeSet<(IndicatorKind, u32)> {
        let mut pairs = BTreeSet::new();
        for condition in self.conditions() {
            pairs.insert((condition.lhs_indicator(), condition.lhs_period()));
            if let Some(other) = condition.compare_to_indicator {
                pairs.insert((other, condition.rhs_period()));
            }
        }
        pairs
    }

    /// 시뮬레이션 시작 인덱스 (최대 참조 기간 + 30).
    pub fn warmup_period(&self) -> usize {
        let max_period = self.referenced_periods().into_iter().max().unwrap_or(0);
        max_period as usize + WARMUP_BUFFER
    }
}
