//! ETL 단계.
//!
//! 추출 범위 결정 → 추출 → 집계 → 적재 순서로 실행됩니다.

pub mod aggregator;
pub mod extractor;
pub mod loader;
pub mod resolver;

pub use aggregator::Aggregator;
pub use extractor::{Extracted, Extractor};
pub use loader::{LoadOutcome, Loader, TargetNaming};
pub use resolver::{resolve, ExtractionPlan, NOTHING_TO_DO};
