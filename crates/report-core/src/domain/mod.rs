//! 도메인 모델.

pub mod report;
pub mod trade;
pub mod watermark;

pub use report::*;
pub use trade::*;
pub use watermark::*;
