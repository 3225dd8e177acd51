//! 증분 일별 거래 리포트 ETL.
//!
//! 이 crate는 다음을 제공합니다:
//! - 워터마크 기반 추출 범위 결정
//! - 소스 배치 추출 및 일별 리포트 집계
//! - 리포트 적재 및 워터마크 갱신
//! - 위 단계를 묶은 파이프라인과 CLI 바이너리

pub mod error;
pub mod pipeline;
pub mod stages;
pub mod stats;

pub use error::{ErrorKind, EtlError, Result};
pub use pipeline::Pipeline;
pub use stages::{
    resolve, Aggregator, ExtractionPlan, Extractor, LoadOutcome, Loader, TargetNaming,
};
pub use stats::RunStats;
