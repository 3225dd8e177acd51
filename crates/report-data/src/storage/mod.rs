//! 오브젝트 스토어 추상화.
//!
//! Extractor / Loader / WatermarkStore는 구체 타입 대신
//! [`ObjectStore`] 트레이트(list / get / put)만 주입받습니다.

pub mod local;
pub mod memory;
pub mod table_store;

use crate::error::{DataError, Result};

/// 키-바이트 오브젝트 스토어.
pub trait ObjectStore: Send + Sync {
    /// `prefix`로 시작하는 모든 키를 정렬된 순서로 반환합니다.
    fn list(&self, prefix: &str) -> Result<Vec<String>>;

    /// 키의 내용을 읽습니다. 키가 없으면 [`DataError::NotFound`].
    fn get(&self, key: &str) -> Result<Vec<u8>>;

    /// 키에 내용을 한 번에 기록합니다 (기존 내용 대체).
    fn put(&self, key: &str, bytes: &[u8]) -> Result<()>;

    /// 로그용 위치 표현 (예: `/data/reports/meta_file.csv`).
    fn describe(&self, key: &str) -> String {
        key.to_string()
    }
}

/// 오브젝트 키를 검증합니다.
///
/// 빈 키, 절대 경로, `.` / `..` 세그먼트는 허용하지 않습니다.
pub(crate) fn validate_key(key: &str) -> Result<()> {
    if key.is_empty() || key.starts_with('/') || key.ends_with('/') {
        return Err(DataError::InvalidKey(key.to_string()));
    }
    if key
        .split('/')
        .any(|segment| segment.is_empty() || segment == "." || segment == "..")
    {
        return Err(DataError::InvalidKey(key.to_string()));
    }
    Ok(())
}
