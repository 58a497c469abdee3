//! 캔들 데이터와 백테스트 설정 파일 입출력.

use std::path::Path;

use anyhow::{anyhow, Context, Result};
use tracing::debug;
use trader_backtest::{BacktestConfig, BacktestResult};
use trader_core::Candle;

/// 파일 형식 (확장자 기준)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FileFormat {
    Csv,
    Json,
    Toml,
}

fn detect_format(path: &Path) -> Option<FileFormat> {
    match path.extension()?.to_str()?.to_ascii_lowercase().as_str() {
        "csv" => Some(FileFormat::Csv),
        "json" => Some(FileFormat::Json),
        "toml" => Some(FileFormat::Toml),
        _ => None,
    }
}

fn read_existing(path: &Path) -> Result<String> {
    if !path.exists() {
        return Err(anyhow!("파일을 찾을 수 없습니다: {}", path.display()));
    }
    std::fs::read_to_string(path).with_context(|| format!("파일 읽기 실패: {}", path.display()))
}

/// 캔들 파일을 읽습니다.
///
/// - CSV: 헤더 `time,date,open,high,low,close,volume` (`date`는 생략 가능)
/// - JSON: 캔들 객체 배열
///
/// 결과는 `time` 오름차순으로 정렬되며 비어있는 `date`는 `time`에서 채웁니다.
pub fn load_candles(path: impl AsRef<Path>) -> Result<Vec<Candle>> {
    let path = path.as_ref();
    let content = read_existing(path)?;

    let candles: Vec<Candle> = match detect_format(path) {
        Some(FileFormat::Csv) => csv::Reader::from_reader(content.as_bytes())
            .deserialize()
            .collect::<Result<_, _>>()
            .with_context(|| format!("CSV 캔들 파싱 실패: {}", path.display()))?,
        Some(FileFormat::Json) => serde_json::from_str(&content)
            .with_context(|| format!("JSON 캔들 파싱 실패: {}", path.display()))?,
        _ => {
            return Err(anyhow!(
                "지원하지 않는 캔들 형식입니다. .csv 또는 .json을 사용하세요: {}",
                path.display()
            ))
        }
    };

    let mut candles: Vec<Candle> = candles.into_iter().map(Candle::with_date_filled).collect();
    candles.sort_by_key(|c| c.time);

    debug!(path = %path.display(), count = candles.len(), "캔들 로드 완료");
    Ok(candles)
}

/// 백테스트 설정 파일 (TOML 또는 JSON)을 읽습니다.
pub fn load_config(path: impl AsRef<Path>) -> Result<BacktestConfig> {
    let path = path.as_ref();
    let content = read_existing(path)?;

    match detect_format(path) {
        Some(FileFormat::Toml) => toml::from_str(&content)
            .with_context(|| format!("TOML 설정 파싱 실패: {}", path.display())),
        Some(FileFormat::Json) => serde_json::from_str(&content)
            .with_context(|| format!("JSON 설정 파싱 실패: {}", path.display())),
        _ => Err(anyhow!(
            "지원하지 않는 설정 형식입니다. .toml 또는 .json을 사용하세요: {}",
            path.display()
        )),
    }
}

/// 결과를 저장합니다. `.json`이면 JSON, 그 외에는 텍스트 요약.
pub fn save_result(result: &BacktestResult, path: impl AsRef<Path>, pretty: bool) -> Result<()> {
    let path = path.as_ref();

    // 디렉토리 생성
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let content = if detect_format(path) == Some(FileFormat::Json) {
        if pretty {
            serde_json::to_string_pretty(result)?
        } else {
            serde_json::to_string(result)?
        }
    } else {
        result.summary_text()
    };

    std::fs::write(path, content)
        .with_context(|| format!("결과 저장 실패: {}", path.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use rust_decimal_macros::dec;
    use tempfile::TempDir;
    use trader_backtest::run_backtest;
    use trader_core::{PositionDirection, Timeframe};

    use super::*;

    const CSV: &str = "\
time,date,open,high,low,close,volume
7200000,,102,103,101,102.5,12
0,1970-01-01,100,101,99,100.5,10
3600000,,101,102,100,101.5,11
";

    #[test]
    fn test_load_csv_sorts_and_fills_dates() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("candles.csv");
        std::fs::write(&path, CSV).unwrap();

        let candles = load_candles(&path).unwrap();

        assert_eq!(candles.len(), 3);
        assert_eq!(
            candles.iter().map(|c| c.time).collect::<Vec<_>>(),
            vec![0, 3_600_000, 7_200_000]
        );
        assert_eq!(candles[0].close, dec!(100.5));
        assert_eq!(candles[2].volume, dec!(12));
        assert!(candles.iter().all(|c| c.date == "1970-01-01"));
    }

    #[test]
    fn test_load_json_candles() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("candles.json");
        std::fs::write(
            &path,
            r#"[{"time": 86400000, "open": 1, "high": 2, "low": 0.5, "close": 1.5, "volume": 3}]"#,
        )
        .unwrap();

        let candles = load_candles(&path).unwrap();

        assert_eq!(candles.len(), 1);
        assert_eq!(candles[0].date, "1970-01-02");
        assert_eq!(candles[0].low, dec!(0.5));
    }

    #[test]
    fn test_load_candles_errors() {
        let dir = TempDir::new().unwrap();

        let missing = load_candles(dir.path().join("none.csv")).unwrap_err();
        assert!(missing.to_string().contains("파일을 찾을 수 없습니다"));

        let path = dir.path().join("candles.txt");
        std::fs::write(&path, CSV).unwrap();
        let unsupported = load_candles(&path).unwrap_err();
        assert!(unsupported.to_string().contains("지원하지 않는 캔들 형식"));
    }

    #[test]
    fn test_load_toml_config() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("backtest.toml");
        std::fs::write(
            &path,
            r#"
[environment]
symbol = "ETHUSDT"
timeframe = "4h"
initialCapital = 5000

[moneyManagement]
orderMode = "percentOfBalance"
positionDirection = "short"

[moneyManagement.orderSize]
value = 50
"#,
        )
        .unwrap();

        let config = load_config(&path).unwrap();

        assert_eq!(config.environment.symbol, "ETHUSDT");
        assert_eq!(config.environment.timeframe, Timeframe::H4);
        assert_eq!(config.environment.initial_capital, dec!(5000));
        assert_eq!(
            config.money_management.position_direction,
            PositionDirection::Short
        );
        assert_eq!(config.money_management.order_size.value, dec!(50));
        assert_eq!(config.strategy, BacktestConfig::default().strategy);
    }

    #[test]
    fn test_load_config_rejects_unknown_extension() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("backtest.yaml");
        std::fs::write(&path, "environment: {}").unwrap();

        assert!(load_config(&path).is_err());
    }

    #[test]
    fn test_save_result_json_and_text() {
        let dir = TempDir::new().unwrap();
        let candles: Vec<Candle> = (0..60)
            .map(|i| {
                let close = dec!(100) + rust_decimal::Decimal::from(i % 7);
                Candle::new(i * 3_600_000, close, close, close, close, dec!(1))
            })
            .collect();
        let result = run_backtest(&candles, &BacktestConfig::default()).unwrap();

        let json_path = dir.path().join("out/result.json");
        save_result(&result, &json_path, true).unwrap();
        let saved: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&json_path).unwrap()).unwrap();
        assert!(saved["summary"]["finalEquity"].is_object());
        assert_eq!(saved["config"]["environment"]["symbol"], "BTCUSDT");

        let text_path = dir.path().join("out/result.txt");
        save_result(&result, &text_path, false).unwrap();
        let text = std::fs::read_to_string(&text_path).unwrap();
        assert!(text.starts_with("백테스트 결과 요약"));
    }
}
