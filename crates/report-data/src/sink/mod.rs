//! 리포트 싱크.
//!
//! 변환된 리포트 테이블을 최종 목적지에 기록합니다.
//! - [`object_store::ObjectStoreSink`]: 실행마다 새 키로 파일 기록
//! - [`warehouse::WarehouseSink`]: 고정 테이블에 행 추가

pub mod object_store;
pub mod warehouse;

use crate::error::Result;
use crate::table::Table;

/// 리포트 기록 대상.
///
/// `target`의 의미는 구현마다 다릅니다 (오브젝트 키 또는 테이블 ID).
pub trait ReportSink: Send + Sync {
    /// 테이블을 기록합니다. 실패하면 아무것도 기록되지 않아야 합니다.
    fn write(&self, table: &Table, target: &str) -> Result<()>;

    /// 싱크 이름 (로그용).
    fn name(&self) -> &str;
}
