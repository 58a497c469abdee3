//! CLI 설정.
//!
//! 우선순위 (뒤가 앞을 덮어씀):
//! 1. 기본값
//! 2. `trader.toml` (선택)
//! 3. `TRADER_` 접두사 환경 변수 (예: `TRADER_LOG_FILTER=debug`)

use std::path::Path;

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use trader_backtest::DRY_RUN_WINDOW;

/// 기본 설정 파일 경로
pub const SETTINGS_FILE: &str = "trader.toml";

/// 환경 변수 접두사
const ENV_PREFIX: &str = "TRADER";

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CliSettings {
    /// `RUST_LOG`가 없을 때 사용할 로그 필터
    pub log_filter: String,
    /// `validate` 명령의 드라이런 캔들 수
    pub dry_run_window: usize,
    /// JSON 결과를 들여쓰기하여 저장할지 여부
    pub pretty_json: bool,
}

impl CliSettings {
    /// 작업 디렉토리의 `trader.toml`과 환경 변수에서 설정을 읽습니다.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(Path::new(SETTINGS_FILE), Environment::with_prefix(ENV_PREFIX))
    }

    fn load_from(path: &Path, environment: Environment) -> Result<Self, ConfigError> {
        Config::builder()
            .set_default("log_filter", "info")?
            .set_default("dry_run_window", DRY_RUN_WINDOW as u64)?
            .set_default("pretty_json", true)?
            .add_source(File::from(path).required(false))
            .add_source(environment.try_parsing(true))
            .build()?
            .try_deserialize()
    }
}
