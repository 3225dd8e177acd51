//! 데이터 접근 및 저장.
//!
//! 이 crate는 다음을 제공합니다:
//! - 오브젝트 스토어 추상화 (로컬 디렉토리, 인메모리)
//! - 테이블 모델과 CSV / Parquet 코덱
//! - 리포트 싱크 (오브젝트 스토어, 웨어하우스 테이블)
//! - 워터마크(처리 이력) 저장소

pub mod codec;
pub mod error;
pub mod sink;
pub mod storage;
pub mod table;
pub mod watermark;

pub use error::{DataError, Result};
pub use table::{Cell, Table};

// 저장소 타입 재내보내기
pub use storage::local::LocalObjectStore;
pub use storage::memory::MemoryObjectStore;
pub use storage::table_store::TableStore;
pub use storage::ObjectStore;

// 싱크 재내보내기
pub use sink::object_store::ObjectStoreSink;
pub use sink::warehouse::WarehouseSink;
pub use sink::ReportSink;

pub use watermark::WatermarkStore;
