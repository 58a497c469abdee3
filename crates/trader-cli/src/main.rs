//! 전략 백테스터 CLI.
//!
//! # 사용 예시
//!
//! ```bash
//! # RSI 전략 백테스트 후 JSON 결과 저장
//! trader backtest --candles data/btcusdt_1h.csv --config config/rsi.toml -o results/rsi.json
//!
//! # 전략 스키마 검증 + 최근 7일 드라이런
//! trader validate --config config/rsi.toml --candles data/btcusdt_1h.csv
//!
//! # RSI(14) 마지막 20개 값 출력
//! trader indicators --candles data/btcusdt_1h.csv --kind RSI --period 14 --tail 20
//! ```

use std::path::PathBuf;

use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use trader_analytics::IndicatorCache;
use trader_backtest::{accept_strategy_with_window, run_backtest, run_validated_backtest};
use trader_core::IndicatorKind;
use trader_strategy::validate_strategy_schema;

mod loader;
mod settings;

use loader::{load_candles, load_config, save_result};
use settings::CliSettings;

#[derive(Parser)]
#[command(name = "trader")]
#[command(about = "규칙 기반 전략 백테스터", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// 백테스트 실행
    Backtest {
        /// 캔들 파일 (CSV 또는 JSON)
        #[arg(long)]
        candles: PathBuf,

        /// 백테스트 설정 파일 (TOML 또는 JSON)
        #[arg(short, long)]
        config: PathBuf,

        /// 결과 저장 경로 (.json이면 JSON, 그 외 텍스트 요약)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// 전략 스키마 검증 생략
        #[arg(long)]
        skip_validation: bool,
    },

    /// 전략 검증 (스키마 검증 + 드라이런)
    Validate {
        /// 백테스트 설정 파일 (TOML 또는 JSON)
        #[arg(short, long)]
        config: PathBuf,

        /// 드라이런에 사용할 캔들 파일 (없으면 스키마 검증만)
        #[arg(long)]
        candles: Option<PathBuf>,
    },

    /// 지표 시계열 출력
    Indicators {
        /// 캔들 파일 (CSV 또는 JSON)
        #[arg(long)]
        candles: PathBuf,

        /// 지표 (RSI, SMA, EMA, MACD, MACD_SIGNAL, MACD_HISTOGRAM, BB_UPPER, BB_MIDDLE, BB_LOWER, PRICE)
        #[arg(short, long)]
        kind: String,

        /// 기간 (기본: 지표별 기본 기간)
        #[arg(short, long)]
        period: Option<u32>,

        /// 마지막 N개만 출력
        #[arg(long, default_value = "20")]
        tail: usize,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // .env 파일 로드 (없어도 에러 안남)
    dotenvy::dotenv().ok();

    let settings = CliSettings::load().context("CLI 설정 로드 실패")?;

    // 트레이싱 초기화 (RUST_LOG 우선)
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| settings.log_filter.as_str().into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Backtest {
            candles,
            config,
            output,
            skip_validation,
        } => run_backtest_command(&settings, candles, config, output, skip_validation).await,
        Commands::Validate { config, candles } => run_validate_command(&settings, config, candles),
        Commands::Indicators {
            candles,
            kind,
            period,
            tail,
        } => run_indicators_command(candles, &kind, period, tail),
    }
}

async fn run_backtest_command(
    settings: &CliSettings,
    candles_path: PathBuf,
    config_path: PathBuf,
    output: Option<PathBuf>,
    skip_validation: bool,
) -> Result<()> {
    let candles = load_candles(&candles_path)?;
    let config = load_config(&config_path)?;

    info!(
        candles = candles.len(),
        symbol = %config.environment.symbol,
        skip_validation,
        "백테스트 준비 완료"
    );

    // 시뮬레이션은 CPU 바운드이므로 블로킹 워커에서 실행
    let result = tokio::task::spawn_blocking(move || {
        if skip_validation {
            run_backtest(&candles, &config)
        } else {
            run_validated_backtest(&candles, &config)
        }
    })
    .await
    .context("백테스트 작업 실패")??;

    println!("{}", result.summary_text());

    if let Some(path) = output {
        save_result(&result, &path, settings.pretty_json)?;
        println!("결과 저장: {}", path.display());
    }

    Ok(())
}

fn run_validate_command(
    settings: &CliSettings,
    config_path: PathBuf,
    candles_path: Option<PathBuf>,
) -> Result<()> {
    let config = load_config(&config_path)?;

    let Some(candles_path) = candles_path else {
        let report = validate_strategy_schema(&config.strategy);
        println!("{}", report);
        return if report.is_valid() {
            Ok(())
        } else {
            Err(anyhow!("전략 검증 실패: {}", report.error_messages()))
        };
    };

    let candles = load_candles(&candles_path)?;
    let report = accept_strategy_with_window(
        &config.strategy,
        &candles,
        &config.environment,
        &config.money_management,
        settings.dry_run_window,
    );

    println!("{}", report.schema);
    if let Some(dry_run) = &report.dry_run {
        println!("드라이런 (최근 {}개 캔들)", settings.dry_run_window);
        for issue in &dry_run.warnings {
            println!("  {}", issue);
        }
        if let Some(error) = &dry_run.error {
            println!("  오류: {}", error);
        }
    }

    if report.accepted {
        println!("✅ 전략 채택 가능");
        Ok(())
    } else {
        Err(anyhow!("전략이 채택되지 않았습니다"))
    }
}

fn run_indicators_command(
    candles_path: PathBuf,
    kind: &str,
    period: Option<u32>,
    tail: usize,
) -> Result<()> {
    let kind: IndicatorKind = kind.parse()?;
    let period = period.unwrap_or_else(|| kind.default_period());

    let candles = load_candles(&candles_path)?;
    let mut cache = IndicatorCache::new(&candles);
    let series = cache.series(kind, period);

    println!("{}({})", kind.label(), period);
    println!("{:<12} {:>16} {:>16}", "날짜", "종가", "값");

    let start = candles.len().saturating_sub(tail);
    for (candle, value) in candles.iter().zip(&series).skip(start) {
        let value = value.map_or_else(|| "-".to_string(), |v| v.round_dp(4).to_string());
        println!("{:<12} {:>16} {:>16}", candle.date, candle.close, value);
    }

    Ok(())
}
