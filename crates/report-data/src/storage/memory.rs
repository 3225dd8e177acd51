//! 인메모리 오브젝트 스토어.
//!
//! 테스트 및 드라이런에서 사용합니다. 키 순서는 `BTreeMap` 정렬을 따릅니다.

use super::{validate_key, ObjectStore};
use crate::error::{DataError, Result};
use std::collections::BTreeMap;
use std::sync::RwLock;

/// 인메모리 오브젝트 스토어.
#[derive(Debug, Default)]
pub struct MemoryObjectStore {
    objects: RwLock<BTreeMap<String, Vec<u8>>>,
}

impl MemoryObjectStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// 저장된 오브젝트 수.
    pub fn len(&self) -> usize {
        self.read_objects().len()
    }

    pub fn is_empty(&self) -> bool {
        self.read_objects().is_empty()
    }

    fn read_objects(&self) -> std::sync::RwLockReadGuard<'_, BTreeMap<String, Vec<u8>>> {
        // 패닉으로 오염된 락이어도 데이터는 유효
        self.objects.read().unwrap_or_else(|e| e.into_inner())
    }
}

impl ObjectStore for MemoryObjectStore {
    fn list(&self, prefix: &str) -> Result<Vec<String>> {
        Ok(self
            .read_objects()
            .range(prefix.to_string()..)
            .take_while(|(key, _)| key.starts_with(prefix))
            .map(|(key, _)| key.clone())
            .collect())
    }

    fn get(&self, key: &str) -> Result<Vec<u8>> {
        self.read_objects()
            .get(key)
            .cloned()
            .ok_or_else(|| DataError::NotFound(key.to_string()))
    }

    fn put(&self, key: &str, bytes: &[u8]) -> Result<()> {
        validate_key(key)?;
        self.objects
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .insert(key.to_string(), bytes.to_vec());
        Ok(())
    }

    fn describe(&self, key: &str) -> String {
        format!("memory://{key}")
    }
}
