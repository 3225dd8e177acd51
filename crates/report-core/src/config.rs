//! 설정 관리.
//!
//! ETL 작업 설정을 정의하고 로드합니다. 설정은 YAML 파일에서 읽은 뒤
//! `REPORT__` 접두어 환경 변수로 오버라이드할 수 있으며, 로드 직후
//! [`JobConfig::validate`]로 검증되어 이후에는 변경되지 않습니다.

use crate::error::{CoreError, CoreResult};
use crate::logging::LogFormat;
use crate::types::TableFormat;
use chrono::format::{Item, StrftimeItems};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};

/// 기본 설정 파일 경로.
pub const DEFAULT_CONFIG_PATH: &str = "config/report.yaml";

/// ETL 작업 설정.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct JobConfig {
    /// 로깅 설정
    #[serde(default)]
    pub logging: LoggingConfig,
    /// 저장소 위치 설정
    pub storage: StorageConfig,
    /// 소스 스키마 설정
    pub source: SourceConfig,
    /// 대상 스키마 설정
    pub destination: DestinationConfig,
    /// 워터마크 설정
    #[serde(default)]
    pub watermark: WatermarkConfig,
}

/// 로깅 설정.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingConfig {
    /// 로그 레벨
    pub level: String,
    /// 로그 형식 (pretty, json, compact)
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}

/// 저장소 위치 설정.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StorageConfig {
    /// 소스 오브젝트 스토어 루트 디렉토리
    pub source_root: PathBuf,
    /// 대상 오브젝트 스토어 루트 디렉토리 (리포트 및 워터마크 저장)
    pub destination_root: PathBuf,
    /// 웨어하우스 루트 디렉토리 (warehouse 싱크 사용 시)
    #[serde(default)]
    pub warehouse_root: Option<PathBuf>,
}

/// 소스 스키마 설정.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SourceConfig {
    /// 최초 추출 시작일
    pub first_extract_date: NaiveDate,
    /// 소스 배치 파일 포맷
    #[serde(default)]
    pub format: TableFormat,
    /// 원시 컬럼 이름
    #[serde(default)]
    pub columns: SourceColumns,
}

/// 원시 체결 데이터의 컬럼 이름.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct SourceColumns {
    pub isin: String,
    pub mnemonic: String,
    pub date: String,
    pub time: String,
    pub start_price: String,
    pub end_price: String,
    pub min_price: String,
    pub max_price: String,
    pub traded_volume: String,
}

impl Default for SourceColumns {
    fn default() -> Self {
        Self {
            isin: "ISIN".to_string(),
            mnemonic: "Mnemonic".to_string(),
            date: "Date".to_string(),
            time: "Time".to_string(),
            start_price: "StartPrice".to_string(),
            end_price: "EndPrice".to_string(),
            min_price: "MinPrice".to_string(),
            max_price: "MaxPrice".to_string(),
            traded_volume: "TradedVolume".to_string(),
        }
    }
}

impl SourceColumns {
    /// 투영 대상 컬럼 (원시 레코드 필드 순서).
    pub fn all(&self) -> [&str; 9] {
        [
            &self.isin,
            &self.mnemonic,
            &self.date,
            &self.time,
            &self.start_price,
            &self.end_price,
            &self.min_price,
            &self.max_price,
            &self.traded_volume,
        ]
    }
}

/// 대상 스키마 설정.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DestinationConfig {
    /// 리포트 컬럼 이름
    #[serde(default)]
    pub columns: ReportColumns,
    /// 대상 키 접두어 (예: "report1/daily_report1_")
    pub key_prefix: String,
    /// 대상 키에 붙는 시각 포맷 (strftime)
    pub key_date_format: String,
    /// 출력 포맷
    #[serde(default)]
    pub format: TableFormat,
    /// 리포트 싱크 종류
    #[serde(default)]
    pub sink: SinkKind,
    /// 웨어하우스 테이블 ID (warehouse 싱크 사용 시)
    #[serde(default)]
    pub warehouse_table: Option<String>,
}

/// 리포트 출력 컬럼 이름.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct ReportColumns {
    pub isin: String,
    pub date: String,
    pub opening_price: String,
    pub closing_price: String,
    pub min_price: String,
    pub max_price: String,
    pub daily_traded_volume: String,
    pub change_prev_close: String,
}

impl Default for ReportColumns {
    fn default() -> Self {
        Self {
            isin: "isin".to_string(),
            date: "date".to_string(),
            opening_price: "opening_price_eur".to_string(),
            closing_price: "closing_price_eur".to_string(),
            min_price: "minimum_price_eur".to_string(),
            max_price: "maximum_price_eur".to_string(),
            daily_traded_volume: "daily_traded_volume".to_string(),
            change_prev_close: "change_prev_closing_%".to_string(),
        }
    }
}

impl ReportColumns {
    /// 출력 컬럼 순서.
    pub fn all(&self) -> [&str; 8] {
        [
            &self.isin,
            &self.date,
            &self.opening_price,
            &self.closing_price,
            &self.min_price,
            &self.max_price,
            &self.daily_traded_volume,
            &self.change_prev_close,
        ]
    }
}

/// 리포트 싱크 종류.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SinkKind {
    /// 대상 오브젝트 스토어에 실행마다 새 파일로 기록
    #[default]
    ObjectStore,
    /// 웨어하우스 테이블에 행 추가
    Warehouse,
}

/// 워터마크 설정.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct WatermarkConfig {
    /// 대상 오브젝트 스토어 안의 워터마크 키
    pub key: String,
    /// 워터마크 파일 포맷
    #[serde(default)]
    pub format: TableFormat,
}

impl Default for WatermarkConfig {
    fn default() -> Self {
        Self {
            key: "meta_file.csv".to_string(),
            format: TableFormat::Csv,
        }
    }
}

impl JobConfig {
    /// 파일과 환경 변수에서 설정을 로드하고 검증합니다.
    pub fn load<P: AsRef<Path>>(path: P) -> CoreResult<Self> {
        let builder = config::Config::builder()
            .set_default("logging.level", "info")?
            .set_default("logging.format", "pretty")?
            // 파일에서 로드
            .add_source(config::File::from(path.as_ref()))
            // 환경 변수로 오버라이드
            .add_source(
                config::Environment::with_prefix("REPORT")
                    .separator("__")
                    .try_parsing(true),
            );

        let config: JobConfig = builder.build()?.try_deserialize()?;
        config.validate()
    }

    /// 기본 경로에서 설정을 로드합니다.
    pub fn load_default() -> CoreResult<Self> {
        Self::load(DEFAULT_CONFIG_PATH)
    }

    /// YAML 문자열에서 설정을 로드합니다 (환경 변수 미적용).
    pub fn from_yaml_str(yaml: &str) -> CoreResult<Self> {
        let config: JobConfig = config::Config::builder()
            .add_source(config::File::from_str(yaml, config::FileFormat::Yaml))
            .build()?
            .try_deserialize()?;
        config.validate()
    }

    /// 설정 값의 일관성을 검증합니다.
    pub fn validate(self) -> CoreResult<Self> {
        check_unique_columns("source.columns", &self.source.columns.all())?;
        check_unique_columns("destination.columns", &self.destination.columns.all())?;

        if self.destination.key_prefix.trim().is_empty() {
            return Err(CoreError::Config(
                "destination.key_prefix가 비어 있습니다".to_string(),
            ));
        }
        if !is_valid_strftime(&self.destination.key_date_format) {
            return Err(CoreError::Config(format!(
                "destination.key_date_format이 올바르지 않습니다: {}",
                self.destination.key_date_format
            )));
        }
        if self.watermark.key.trim().is_empty() {
            return Err(CoreError::Config("watermark.key가 비어 있습니다".to_string()));
        }
        if let Err(e) = self.logging.format.parse::<LogFormat>() {
            return Err(CoreError::Config(format!("logging.format: {e}")));
        }

        if self.destination.sink == SinkKind::Warehouse {
            if self.storage.warehouse_root.is_none() {
                return Err(CoreError::Config(
                    "warehouse 싱크에는 storage.warehouse_root가 필요합니다".to_string(),
                ));
            }
            match self.destination.warehouse_table.as_deref() {
                Some(table) if !table.trim().is_empty() => {}
                _ => {
                    return Err(CoreError::Config(
                        "warehouse 싱크에는 destination.warehouse_table이 필요합니다".to_string(),
                    ))
                }
            }
        }

        Ok(self)
    }
}

fn check_unique_columns(section: &str, columns: &[&str]) -> CoreResult<()> {
    let mut seen = HashSet::new();
    for column in columns {
        if column.trim().is_empty() {
            return Err(CoreError::Config(format!("{section}: 빈 컬럼 이름")));
        }
        if !seen.insert(*column) {
            return Err(CoreError::Config(format!(
                "{section}: 중복 컬럼 이름 {column}"
            )));
        }
    }
    Ok(())
}

fn is_valid_strftime(fmt: &str) -> bool {
    !fmt.is_empty() && !StrftimeItems::new(fmt).any(|item| matches!(item, Item::Error))
}
