//! 테이블 직렬화 코덱.
//!
//! [`TableFormat`]별로 [`Table`]을 바이트로 인코딩/디코딩합니다.

pub mod csv;
pub mod parquet;

use crate::error::Result;
use crate::table::Table;
use report_core::TableFormat;

/// 테이블을 지정한 포맷의 바이트로 인코딩합니다.
pub fn encode(table: &Table, format: TableFormat) -> Result<Vec<u8>> {
    match format {
        TableFormat::Csv => csv::encode(table, true),
        TableFormat::Parquet => parquet::encode(table),
    }
}

/// 지정한 포맷의 바이트를 테이블로 디코딩합니다.
pub fn decode(bytes: &[u8], format: TableFormat) -> Result<Table> {
    match format {
        TableFormat::Csv => csv::decode(bytes),
        TableFormat::Parquet => parquet::decode(bytes),
    }
}
