//! 데이터 모듈 오류 타입.

use report_core::CoreError;
use thiserror::Error;

/// 데이터 관련 오류.
#[derive(Debug, Error)]
pub enum DataError {
    /// 지원하지 않는 테이블 포맷 (기록 시도 전에 거부)
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    /// 기존 테이블의 컬럼 구성이 예상과 다름
    #[error("Schema mismatch: {0}")]
    Schema(String),

    /// 키가 존재하지 않음
    #[error("Object not found: {0}")]
    NotFound(String),

    /// 잘못된 오브젝트 키
    #[error("Invalid key: {0}")]
    InvalidKey(String),

    /// 값 파싱 오류
    #[error("Parse error: {0}")]
    ParseError(String),

    /// 파일 시스템 오류
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV 인코딩/디코딩 오류
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Arrow 변환 오류
    #[error("Arrow error: {0}")]
    Arrow(#[from] arrow::error::ArrowError),

    /// Parquet 인코딩/디코딩 오류
    #[error("Parquet error: {0}")]
    Parquet(#[from] parquet::errors::ParquetError),
}

impl DataError {
    /// 키 부재 오류인지 확인합니다.
    pub fn is_not_found(&self) -> bool {
        matches!(self, DataError::NotFound(_))
    }
}

impl From<CoreError> for DataError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::UnsupportedFormat(format) => DataError::UnsupportedFormat(format),
            other => DataError::ParseError(other.to_string()),
        }
    }
}

pub type Result<T> = std::result::Result<T, DataError>;
