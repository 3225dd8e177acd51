//! 공통 타입 정의.

pub mod decimal;
pub mod format;

pub use decimal::*;
pub use format::*;
