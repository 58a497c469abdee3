//! 캔들(OHLCV) 데이터와 시각 포맷 헬퍼.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// 하나의 시간 구간에 대한 OHLCV 캔들.
///
/// `time`은 구간 시작 시각(Unix ms)이며, 캔들 배열은 `time` 오름차순으로
/// 중복 없이 정렬되어 있어야 합니다.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candle {
    /// 시작 시각 (Unix ms)
    pub time: i64,
    /// 표시용 날짜 ("YYYY-MM-DD")
    #[serde(default)]
    pub date: String,
    /// 시가
    pub open: Decimal,
    /// 고가
    pub high: Decimal,
    /// 저가
    pub low: Decimal,
    /// 종가
    pub close: Decimal,
    /// 거래량
    pub volume: Decimal,
}

impl Candle {
    /// 새 캔들을 생성합니다. `date`는 `time`에서 계산됩니다.
    pub fn new(
        time: i64,
        open: Decimal,
        high: Decimal,
        low: Decimal,
        close: Decimal,
        volume: Decimal,
    ) -> Self {
        Self {
            time,
            date: format_date(time),
            open,
            high,
            low,
            close,
            volume,
        }
    }

    /// 시작 시각을 UTC 시각으로 변환합니다.
    pub fn datetime(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp_millis(self.time)
    }

    /// `date`가 비어있으면 `time`에서 채웁니다.
    pub fn with_date_filled(mut self) -> Self {
        if self.date.is_empty() {
            self.date = format_date(self.time);
        }
        self
    }
}

/// Unix ms를 "YYYY-MM-DD" (UTC)로 포맷합니다.
pub fn format_date(timestamp_ms: i64) -> String {
    format_timestamp(timestamp_ms, "%Y-%m-%d")
}

/// Unix ms를 월 키 "YYYY-MM" (UTC)로 포맷합니다.
pub fn month_key(timestamp_ms: i64) -> String {
    format_timestamp(timestamp_ms, "%Y-%m")
}

fn format_timestamp(timestamp_ms: i64, fmt: &str) -> String {
    DateTime::from_timestamp_millis(timestamp_ms)
        .map(|dt| dt.format(fmt).to_string())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_candle_new_fills_date() {
        // 2024-01-15 00:00:00 UTC
        let candle = Candle::new(
            1_705_276_800_000,
            dec!(100),
            dec!(101),
            dec!(99),
            dec!(100.5),
            dec!(10),
        );
        assert_eq!(candle.date, "2024-01-15");
        assert_eq!(month_key(candle.time), "2024-01");
    }

    #[test]
    fn test_candle_deserialize_without_date() {
        let json = r#"{"time":0,"open":1,"high":2,"low":0.5,"close":1.5,"volume":100}"#;
        let candle: Candle = serde_json::from_str(json).unwrap();
        assert!(candle.date.is_empty());
        assert_eq!(candle.close, dec!(1.5));

        let candle = candle.with_date_filled();
        assert_eq!(candle.date, "1970-01-01");
    }
}
