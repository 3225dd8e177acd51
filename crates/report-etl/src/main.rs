//! 일별 거래 리포트 ETL CLI.
//!
//! # 사용 예시
//!
//! ```bash
//! # 증분 실행 (워터마크 기준 미처리 일자만)
//! report-etl --config config/report.yaml run
//!
//! # 시작일을 바꿔 추출 계획만 확인
//! report-etl --start-date 2021-12-17 plan --json
//!
//! # 처리 이력 조회
//! report-etl watermark
//! ```

use anyhow::{anyhow, Context};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use report_core::{init_logging, JobConfig, LogConfig, DEFAULT_CONFIG_PATH, SOURCE_DATE_FORMAT};
use report_etl::Pipeline;
use std::path::PathBuf;
use tracing::{error, info};

#[derive(Parser)]
#[command(name = "report-etl")]
#[command(about = "증분 일별 거래 리포트 ETL", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// 설정 파일 경로
    #[arg(long, default_value = DEFAULT_CONFIG_PATH, global = true)]
    config: PathBuf,

    /// 로그 레벨 (trace, debug, info, warn, error). 생략 시 설정 파일 값 사용
    #[arg(long, global = true)]
    log_level: Option<String>,

    /// 추출 시작일 오버라이드 (YYYY-MM-DD)
    #[arg(long, value_parser = parse_date, global = true)]
    start_date: Option<NaiveDate>,
}

#[derive(Subcommand)]
enum Commands {
    /// 추출 → 집계 → 적재 한 번 실행
    Run {
        /// 실행 통계를 JSON으로 출력
        #[arg(long)]
        json: bool,
    },

    /// 추출 계획만 계산 (기록 없음)
    Plan {
        /// 계획을 JSON으로 출력
        #[arg(long)]
        json: bool,
    },

    /// 저장된 처리 이력 출력
    Watermark,
}

fn parse_date(value: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(value, SOURCE_DATE_FORMAT)
        .map_err(|e| format!("날짜 형식이 올바르지 않습니다 ({value}): {e}"))
}

fn main() -> anyhow::Result<()> {
    // .env 파일 로드 (없으면 무시)
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let config = JobConfig::load(&cli.config)
        .with_context(|| format!("설정 로드 실패: {}", cli.config.display()))?;

    // 로깅 초기화
    let mut log_config = LogConfig::from(&config.logging);
    if let Some(level) = &cli.log_level {
        log_config.level = level.clone();
    }
    init_logging(log_config).map_err(|e| anyhow!("로깅 초기화 실패: {e}"))?;

    info!(config = %cli.config.display(), "Report ETL 시작");

    let mut pipeline = Pipeline::from_config(&config)?;
    if let Some(start_date) = cli.start_date {
        pipeline = pipeline.with_start_date(start_date);
    }
    info!(start_date = %pipeline.start_date(), "파이프라인 준비 완료");

    match cli.command {
        Commands::Run { json } => match pipeline.run() {
            Ok(stats) => {
                stats.log_summary("일별 리포트");
                if json {
                    println!("{}", serde_json::to_string_pretty(&stats)?);
                }
            }
            Err(e) => {
                error!(kind = ?e.kind(), error = %e, "ETL 실행 실패");
                return Err(e.into());
            }
        },
        Commands::Plan { json } => {
            let plan = pipeline.plan()?;
            if json {
                println!("{}", serde_json::to_string_pretty(&plan)?);
            } else if plan.is_nothing_to_do() {
                println!("처리할 일자가 없습니다");
            } else {
                println!("extract_from: {}", plan.extract_from);
                if let Some(seed) = plan.seed_date {
                    println!("seed_date:    {seed}");
                }
                println!("report_from:  {}", plan.report_from);
                let dates: Vec<String> = plan
                    .candidate_dates
                    .iter()
                    .map(|d| d.to_string())
                    .collect();
                println!("candidates:   {}", dates.join(", "));
            }
        }
        Commands::Watermark => match pipeline.history()? {
            Some(history) => {
                for record in history.records() {
                    println!("{}\t{}", record.source_date, record.processed_at);
                }
                info!(
                    records = history.len(),
                    latest = ?history.latest_source_date(),
                    "처리 이력 조회 완료"
                );
            }
            None => println!("처리 이력이 없습니다"),
        },
    }

    info!("Report ETL 종료");
    Ok(())
}
