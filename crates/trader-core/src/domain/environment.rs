//! 백테스트 실행 환경 (종목, 타임프레임, 기간, 자본, 수수료).

use std::{fmt, str::FromStr};

use chrono::{Duration, NaiveDate, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::error::ParseError;

/// 캔들 간격.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Timeframe {
    #[serde(rename = "1m")]
    M1,
    #[serde(rename = "5m")]
    M5,
    #[serde(rename = "15m")]
    M15,
    #[default]
    #[serde(rename = "1h")]
    H1,
    #[serde(rename = "4h")]
    H4,
    #[serde(rename = "1d")]
    D1,
    #[serde(rename = "1w")]
    W1,
    #[serde(rename = "1M")]
    MN1,
}

impl Timeframe {
    pub fn as_str(&self) -> &'static str {
        match self {
            Timeframe::M1 => "1m",
            Timeframe::M5 => "5m",
            Timeframe::M15 => "15m",
            Timeframe::H1 => "1h",
            Timeframe::H4 => "4h",
            Timeframe::D1 => "1d",
            Timeframe::W1 => "1w",
            Timeframe::MN1 => "1M",
        }
    }

    /// 캔들 한 개의 길이 (ms). 월봉은 30일로 계산합니다.
    pub fn duration_ms(&self) -> i64 {
        const MINUTE: i64 = 60_000;
        match self {
            Timeframe::M1 => MINUTE,
            Timeframe::M5 => 5 * MINUTE,
            Timeframe::M15 => 15 * MINUTE,
            Timeframe::H1 => 60 * MINUTE,
            Timeframe::H4 => 240 * MINUTE,
            Timeframe::D1 => 1_440 * MINUTE,
            Timeframe::W1 => 7 * 1_440 * MINUTE,
            Timeframe::MN1 => 30 * 1_440 * MINUTE,
        }
    }
}

impl fmt::Display for Timeframe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Timeframe {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "1m" => Ok(Timeframe::M1),
            "5m" => Ok(Timeframe::M5),
            "15m" => Ok(Timeframe::M15),
            "1h" => Ok(Timeframe::H1),
            "4h" => Ok(Timeframe::H4),
            "1d" => Ok(Timeframe::D1),
            "1w" => Ok(Timeframe::W1),
            "1M" => Ok(Timeframe::MN1),
            other => Err(ParseError::UnknownTimeframe(other.to_string())),
        }
    }
}

/// 수수료 프리셋 (단위: %).
///
/// 시뮬레이션은 모든 체결을 테이커로 간주하므로 `maker_fee`는 기록용입니다.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeePreset {
    pub name: String,
    pub maker_fee: Decimal,
    pub taker_fee: Decimal,
}

impl FeePreset {
    pub fn new(name: impl Into<String>, maker_fee: Decimal, taker_fee: Decimal) -> Self {
        Self {
            name: name.into(),
            maker_fee,
            taker_fee,
        }
    }

    /// 기본 제공 프리셋 목록.
    pub fn presets() -> Vec<FeePreset> {
        vec![
            FeePreset::new("Binance VIP 0", dec!(0.1), dec!(0.1)),
            FeePreset::new("Binance VIP 1", dec!(0.09), dec!(0.1)),
            FeePreset::new("Binance Futures", dec!(0.02), dec!(0.04)),
            FeePreset::new("Upbit Standard", dec!(0.05), dec!(0.05)),
            FeePreset::new("Custom", dec!(0.1), dec!(0.1)),
        ]
    }

    /// 이름으로 프리셋을 찾습니다.
    pub fn by_name(name: &str) -> Option<FeePreset> {
        Self::presets()
            .into_iter()
            .find(|p| p.name.eq_ignore_ascii_case(name))
    }
}

impl Default for FeePreset {
    fn default() -> Self {
        FeePreset::new("Binance VIP 0", dec!(0.1), dec!(0.1))
    }
}

/// 기준 통화.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Currency {
    #[default]
    Usdt,
    Krw,
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Currency::Usdt => write!(f, "USDT"),
            Currency::Krw => write!(f, "KRW"),
        }
    }
}

/// 테스트 기간 (양 끝 포함, "YYYY-MM-DD").
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DateRange {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

impl DateRange {
    pub fn new(start_date: NaiveDate, end_date: NaiveDate) -> Self {
        Self {
            start_date,
            end_date,
        }
    }

    /// 시작일과 종료일 사이의 일수.
    pub fn days(&self) -> i64 {
        (self.end_date - self.start_date).num_days()
    }
}

impl Default for DateRange {
    /// 오늘 기준 최근 365일.
    fn default() -> Self {
        let end_date = Utc::now().date_naive();
        Self {
            start_date: end_date - Duration::days(365),
            end_date,
        }
    }
}

/// 백테스트 실행 환경.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnvironmentSetup {
    /// 종목 코드 (예: "BTCUSDT")
    pub symbol: String,
    /// 표시용 이름 (예: "BTC/USDT")
    #[serde(default)]
    pub symbol_display_name: String,
    #[serde(default)]
    pub timeframe: Timeframe,
    #[serde(default)]
    pub date_range: DateRange,
    /// 초기 자본
    pub initial_capital: Decimal,
    #[serde(default)]
    pub initial_currency: Currency,
    #[serde(default)]
    pub fee_preset: FeePreset,
    /// 슬리피지 (%)
    #[serde(default = "default_slippage")]
    pub slippage: Decimal,
}

fn default_slippage() -> Decimal {
    dec!(0.05)
}

impl Default for EnvironmentSetup {
    fn default() -> Self {
        Self {
            symbol: "BTCUSDT".to_string(),
            symbol_display_name: "BTC/USDT".to_string(),
            timeframe: Timeframe::H1,
            date_range: DateRange::default(),
            initial_capital: dec!(10000),
            initial_currency: Currency::Usdt,
            fee_preset: FeePreset::default(),
            slippage: default_slippage(),
        }
    }
}

impl EnvironmentSetup {
    /// 초기 자본 설정
    pub fn with_initial_capital(mut self, capital: Decimal) -> Self {
        self.initial_capital = capital;
        self
    }

    /// 수수료 프리셋 설정
    pub fn with_fee_preset(mut self, preset: FeePreset) -> Self {
        self.fee_preset = preset;
        self
    }

    /// 슬리피지 설정 (%)
    pub fn with_slippage(mut self, slippage: Decimal) -> Self {
        self.slippage = slippage;
        self
    }

    /// 테스트 기간 설정
    pub fn with_date_range(mut self, date_range: DateRange) -> Self {
        self.date_range = date_range;
        self
    }

    /// 체결마다 적용되는 비용률 (%): 테이커 수수료 + 슬리피지.
    pub fn execution_cost_pct(&self) -> Decimal {
        self.fee_preset.taker_fee + self.slippage
    }
}
