//! 전략 스키마 검증기.
//!
//! 수동으로 작성한 전략과 외부 생성기가 만든 전략 모두 시뮬레이션 전에
//! 이 검증을 통과해야 합니다. 엔진은 검증된 전략을 전제로 동작합니다.

use std::collections::HashSet;
use std::fmt;

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use tracing::debug;
use trader_core::{Condition, ConditionGroup, ConditionType, IndicatorKind, StrategyConfig};

/// 손절 비율 경고 기준 (%)
const STOP_LOSS_WARNING_PCT: Decimal = dec!(50);

/// 심각도
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// 경고 (참고용)
    Warning,
    /// 에러 (전략 채택 불가)
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Warning => write!(f, "WARNING"),
            Severity::Error => write!(f, "ERROR"),
        }
    }
}

/// 문제 분류
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValidationCategory {
    Indicator,
    Risk,
    Logic,
}

impl ValidationCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            ValidationCategory::Indicator => "indicator",
            ValidationCategory::Risk => "risk",
            ValidationCategory::Logic => "logic",
        }
    }
}

impl fmt::Display for ValidationCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 검증 결과 항목
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationIssue {
    /// 심각도
    pub severity: Severity,
    /// 분류
    pub category: ValidationCategory,
    /// 문제 설명
    pub message: String,
    /// 권장 해결 방법
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,
}

impl ValidationIssue {
    /// 새 이슈 생성
    pub fn new(severity: Severity, category: ValidationCategory, message: &str) -> Self {
        Self {
            severity,
            category,
            message: message.to_string(),
            suggestion: None,
        }
    }

    pub fn error(category: ValidationCategory, message: &str) -> Self {
        Self::new(Severity::Error, category, message)
    }

    pub fn warning(category: ValidationCategory, message: &str) -> Self {
        Self::new(Severity::Warning, category, message)
    }

    /// 해결 방법 추가
    pub fn with_suggestion(mut self, suggestion: &str) -> Self {
        self.suggestion = Some(suggestion.to_string());
        self
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}: {}", self.severity, self.category, self.message)?;

        if let Some(ref suggestion) = self.suggestion {
            write!(f, "\n  해결: {}", suggestion)?;
        }

        Ok(())
    }
}

/// 검증 보고서
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ValidationReport {
    /// 발견된 이슈들 (발견 순서)
    pub issues: Vec<ValidationIssue>,
}

impl ValidationReport {
    /// 새 보고서 생성
    pub fn new() -> Self {
        Self::default()
    }

    /// 이슈 추가
    pub fn add_issue(&mut self, issue: ValidationIssue) {
        self.issues.push(issue);
    }

    /// 에러 수
    pub fn error_count(&self) -> usize {
        self.issues.iter().filter(|i| i.is_error()).count()
    }

    /// 경고 수
    pub fn warning_count(&self) -> usize {
        self.issues
            .iter()
            .filter(|i| i.severity == Severity::Warning)
            .count()
    }

    /// 검증 통과 여부
    pub fn is_valid(&self) -> bool {
        self.error_count() == 0
    }

    /// 심각도별 정렬된 이슈 목록 (에러 먼저)
    pub fn sorted_issues(&self) -> Vec<&ValidationIssue> {
        let mut sorted: Vec<_> = self.issues.iter().collect();
        sorted.sort_by(|a, b| b.severity.cmp(&a.severity));
        sorted
    }

    /// 에러 메시지만 `; `로 연결합니다.
    pub fn error_messages(&self) -> String {
        self.issues
            .iter()
            .filter(|i| i.is_error())
            .map(|i| i.message.as_str())
            .collect::<Vec<_>>()
            .join("; ")
    }
}

impl fmt::Display for ValidationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "═══════════════════════════════════════════════════════════════"
        )?;
        writeln!(f, "                      전략 검증 보고서")?;
        writeln!(
            f,
            "═══════════════════════════════════════════════════════════════"
        )?;
        writeln!(
            f,
            "  🔴 에러: {} 개  🟡 경고: {} 개",
            self.error_count(),
            self.warning_count()
        )?;
        writeln!(f)?;

        if self.issues.is_empty() {
            writeln!(f, "✅ 문제가 발견되지 않았습니다.")?;
        } else {
            writeln!(
                f,
                "───────────────────────────────────────────────────────────────"
            )?;
            for (i, issue) in self.sorted_issues().iter().enumerate() {
                writeln!(f, "{}. {}", i + 1, issue)?;
            }
        }

        Ok(())
    }
}

/// 전략 스키마 검증기
pub struct StrategySchemaValidator<'a> {
    strategy: &'a StrategyConfig,
}

impl<'a> StrategySchemaValidator<'a> {
    /// 새 검증기 생성
    pub fn new(strategy: &'a StrategyConfig) -> Self {
        Self { strategy }
    }

    /// 전체 검증 수행
    pub fn validate(&self) -> ValidationReport {
        let mut report = ValidationReport::new();

        self.check_group(
            &self.strategy.entry_condition,
            "진입 조건",
            &mut report,
        );
        self.check_group(&self.strategy.exit_condition, "청산 조건", &mut report);
        self.check_stop_loss(&mut report);
        self.check_take_profit(&mut report);
        self.check_unique_ids(&mut report);

        debug!(
            errors = report.error_count(),
            warnings = report.warning_count(),
            "전략 스키마 검증 완료"
        );
        report
    }

    /// 그룹이 비어있는지, 각 조건이 올바른지 검사
    fn check_group(&self, group: &ConditionGroup, name: &str, report: &mut ValidationReport) {
        if group.is_empty() {
            report.add_issue(
                ValidationIssue::error(ValidationCategory::Logic, &format!("{}이 없습니다", name))
                    .with_suggestion(&format!("최소 1개의 {}이 필요합니다", name)),
            );
            return;
        }

        for (i, condition) in group.conditions.iter().enumerate() {
            let label = format!("{} {}", name, i + 1);
            self.check_required_fields(condition, &label, report);
            self.check_indicator_fields(condition, &label, report);
        }
    }

    /// 필수 필드 누락 검사
    fn check_required_fields(
        &self,
        condition: &Condition,
        label: &str,
        report: &mut ValidationReport,
    ) {
        let missing = [
            (condition.id.is_empty(), "ID가 없습니다"),
            (condition.condition_type.is_none(), "타입이 없습니다"),
            (condition.comparison.is_none(), "비교 연산자가 없습니다"),
            (condition.description.is_empty(), "설명이 없습니다"),
        ];

        for (is_missing, message) in missing {
            if is_missing {
                report.add_issue(ValidationIssue::error(
                    ValidationCategory::Logic,
                    &format!("{}: {}", label, message),
                ));
            }
        }
    }

    /// 지표 관련 필드 검사
    fn check_indicator_fields(
        &self,
        condition: &Condition,
        label: &str,
        report: &mut ValidationReport,
    ) {
        let indicator_bearing = matches!(
            condition.condition_type,
            Some(ConditionType::IndicatorThreshold) | Some(ConditionType::IndicatorCompare)
        );

        if indicator_bearing {
            if condition.indicator.is_none() {
                report.add_issue(ValidationIssue::error(
                    ValidationCategory::Indicator,
                    &format!("{}: 지표가 지정되지 않았습니다", label),
                ));
            }
            if !matches!(condition.indicator_period, Some(p) if p >= 1) {
                report.add_issue(ValidationIssue::error(
                    ValidationCategory::Indicator,
                    &format!("{}: 지표 기간은 1 이상이어야 합니다", label),
                ));
            }
        }

        if condition.compare_to_indicator_period == Some(0) {
            report.add_issue(ValidationIssue::error(
                ValidationCategory::Indicator,
                &format!("{}: 비교 대상 지표 기간은 1 이상이어야 합니다", label),
            ));
        }

        if condition.indicator == Some(IndicatorKind::Rsi)
            && (condition.value < Decimal::ZERO || condition.value > Decimal::ONE_HUNDRED)
        {
            report.add_issue(ValidationIssue::error(
                ValidationCategory::Indicator,
                &format!(
                    "{}: RSI 값은 0-100 범위여야 합니다 (현재: {})",
                    label, condition.value
                ),
            ));
        }

        if condition.condition_type == Some(ConditionType::IndicatorCompare)
            && condition.compare_to_indicator.is_none()
        {
            report.add_issue(ValidationIssue::error(
                ValidationCategory::Indicator,
                &format!("{}: 비교 대상 지표가 없습니다", label),
            ));
        }
    }

    /// 손절 검사
    fn check_stop_loss(&self, report: &mut ValidationReport) {
        let stop_loss = &self.strategy.stop_loss;
        if !stop_loss.enabled {
            return;
        }

        if stop_loss.percentage <= Decimal::ZERO {
            report.add_issue(ValidationIssue::error(
                ValidationCategory::Risk,
                "손절 비율은 양수여야 합니다",
            ));
        }
        if stop_loss.percentage > STOP_LOSS_WARNING_PCT {
            report.add_issue(
                ValidationIssue::warning(
                    ValidationCategory::Risk,
                    "손절 비율이 매우 높습니다 (50% 초과)",
                )
                .with_suggestion("리스크 관리를 위해 5-10% 권장"),
            );
        }
    }

    /// 익절 검사
    fn check_take_profit(&self, report: &mut ValidationReport) {
        let take_profit = &self.strategy.take_profit;
        if take_profit.enabled && take_profit.percentage <= Decimal::ZERO {
            report.add_issue(ValidationIssue::error(
                ValidationCategory::Risk,
                "익절 비율은 양수여야 합니다",
            ));
        }
    }

    /// 진입/청산 전체에서 조건 ID 중복 검사
    fn check_unique_ids(&self, report: &mut ValidationReport) {
        let mut seen = HashSet::new();
        let mut duplicates: Vec<&str> = Vec::new();

        // 빈 ID는 필수 필드 검사에서 이미 보고됨
        for condition in self.strategy.conditions() {
            let id = condition.id.as_str();
            if id.is_empty() {
                continue;
            }
            if !seen.insert(id) && !duplicates.contains(&id) {
                duplicates.push(id);
            }
        }

        if !duplicates.is_empty() {
            report.add_issue(
                ValidationIssue::error(
                    ValidationCategory::Logic,
                    &format!("중복된 조건 ID: {}", duplicates.join(", ")),
                )
                .with_suggestion("각 조건은 고유한 ID를 가져야 합니다"),
            );
        }
    }
}

/// 전략 스키마를 검증합니다.
pub fn validate_strategy_schema(strategy: &StrategyConfig) -> ValidationReport {
    StrategySchemaValidator::new(strategy).validate()
}
