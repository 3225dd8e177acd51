//! ETL 에러 타입 정의.

use report_core::CoreError;
use report_data::DataError;
use thiserror::Error;

/// ETL 에러.
#[derive(Debug, Error)]
pub enum EtlError {
    /// 저장소/코덱 에러
    #[error(transparent)]
    Data(#[from] DataError),

    /// 설정/입력 에러
    #[error(transparent)]
    Core(#[from] CoreError),

    /// 원시 데이터 컬럼 누락 또는 값 파싱 실패
    #[error("잘못된 입력 데이터: {0}")]
    MalformedInput(String),
}

/// 호출자가 분기하기 위한 평탄한 에러 분류.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// 지원하지 않는 포맷
    Format,
    /// 스키마 불일치
    Schema,
    /// 잘못된 원시 데이터
    MalformedInput,
    /// 저장소 I/O 및 인코딩
    Storage,
    /// 설정 오류
    Config,
}

impl EtlError {
    /// 에러 분류를 반환합니다.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Data(DataError::UnsupportedFormat(_)) => ErrorKind::Format,
            Self::Data(DataError::Schema(_)) => ErrorKind::Schema,
            Self::Data(DataError::ParseError(_)) => ErrorKind::MalformedInput,
            Self::Data(_) => ErrorKind::Storage,
            Self::Core(CoreError::UnsupportedFormat(_)) => ErrorKind::Format,
            Self::Core(CoreError::Config(_)) => ErrorKind::Config,
            Self::MalformedInput(_) => ErrorKind::MalformedInput,
        }
    }
}

/// Result 타입 별칭
pub type Result<T> = std::result::Result<T, EtlError>;
