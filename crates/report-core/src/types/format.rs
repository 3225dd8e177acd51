//! 오브젝트 스토어 테이블 포맷 정의.
//!
//! 지원하는 포맷은 구분자 텍스트(CSV)와 컬럼형 바이너리(Parquet) 두 가지입니다.

use crate::error::CoreError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// 테이블 직렬화 포맷.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum TableFormat {
    /// 쉼표 구분 텍스트
    #[default]
    Csv,
    /// Apache Parquet
    Parquet,
}

impl TableFormat {
    /// 파일 확장자를 반환합니다 (점 제외).
    pub fn extension(&self) -> &'static str {
        match self {
            TableFormat::Csv => "csv",
            TableFormat::Parquet => "parquet",
        }
    }
}

impl fmt::Display for TableFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

impl FromStr for TableFormat {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "csv" => Ok(TableFormat::Csv),
            "parquet" => Ok(TableFormat::Parquet),
            other => Err(CoreError::UnsupportedFormat(other.to_string())),
        }
    }
}

impl TryFrom<String> for TableFormat {
    type Error = CoreError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<TableFormat> for String {
    fn from(format: TableFormat) -> Self {
        format.extension().to_string()
    }
}
