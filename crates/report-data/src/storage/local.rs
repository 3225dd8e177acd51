//! 로컬 디렉토리 기반 오브젝트 스토어.
//!
//! 키는 루트 디렉토리 기준 `/` 구분 상대 경로입니다.
//! 기록은 임시 파일에 쓴 뒤 rename하므로 부분 기록이 남지 않습니다.

use super::{validate_key, ObjectStore};
use crate::error::{DataError, Result};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::debug;

/// 임시 파일 접미사.
const TMP_SUFFIX: &str = ".tmp";

/// 동시 기록 시 임시 파일 이름 충돌 방지용 일련번호.
static TMP_SEQ: AtomicU64 = AtomicU64::new(0);

/// 로컬 디렉토리 오브젝트 스토어.
#[derive(Debug, Clone)]
pub struct LocalObjectStore {
    root: PathBuf,
}

impl LocalObjectStore {
    /// 루트 디렉토리로 스토어를 생성합니다 (디렉토리는 첫 기록 시 생성).
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn path_for(&self, key: &str) -> Result<PathBuf> {
        validate_key(key)?;
        Ok(key.split('/').fold(self.root.clone(), |path, seg| path.join(seg)))
    }

    fn collect_keys(&self, dir: &Path, keys: &mut Vec<String>) -> Result<()> {
        let entries = match fs::read_dir(dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(()),
            Err(e) => return Err(e.into()),
        };

        for entry in entries {
            let entry = entry?;
            let path = entry.path();
            if entry.file_type()?.is_dir() {
                self.collect_keys(&path, keys)?;
            } else if let Some(key) = self.key_for(&path) {
                if !key.ends_with(TMP_SUFFIX) {
                    keys.push(key);
                }
            }
        }
        Ok(())
    }

    fn key_for(&self, path: &Path) -> Option<String> {
        let relative = path.strip_prefix(&self.root).ok()?;
        let segments: Vec<&str> = relative
            .components()
            .map(|c| c.as_os_str().to_str())
            .collect::<Option<_>>()?;
        Some(segments.join("/"))
    }
}

impl ObjectStore for LocalObjectStore {
    fn list(&self, prefix: &str) -> Result<Vec<String>> {
        // 접두어의 디렉토리 부분부터 탐색
        let start_dir = match prefix.rfind('/') {
            Some(pos) => self.path_for(&prefix[..pos])?,
            None => self.root.clone(),
        };

        let mut keys = Vec::new();
        self.collect_keys(&start_dir, &mut keys)?;
        keys.retain(|key| key.starts_with(prefix));
        keys.sort();

        debug!(prefix = prefix, count = keys.len(), "키 목록 조회");
        Ok(keys)
    }

    fn get(&self, key: &str) -> Result<Vec<u8>> {
        let path = self.path_for(key)?;
        match fs::read(&path) {
            Ok(bytes) => Ok(bytes),
            Err(e) if e.kind() == ErrorKind::NotFound => Err(DataError::NotFound(key.to_string())),
            Err(e) => Err(e.into()),
        }
    }

    fn put(&self, key: &str, bytes: &[u8]) -> Result<()> {
        let path = self.path_for(key)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let seq = TMP_SEQ.fetch_add(1, Ordering::Relaxed);
        let mut tmp = path.clone().into_os_string();
        tmp.push(format!(".{}.{seq}{TMP_SUFFIX}", std::process::id()));
        let tmp = PathBuf::from(tmp);

        if let Err(e) = fs::write(&tmp, bytes).and_then(|_| fs::rename(&tmp, &path)) {
            // 실패한 기록의 임시 파일은 남기지 않음
            let _ = fs::remove_file(&tmp);
            return Err(e.into());
        }
        Ok(())
    }

    fn describe(&self, key: &str) -> String {
        format!("{}/{}", self.root.display(), key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_put_get_list() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalObjectStore::new(dir.path());

        store.put("2021-12-17/b.csv", b"b").unwrap();
        store.put("2021-12-17/a.csv", b"a").unwrap();
        store.put("2021-12-18/c.csv", b"c").unwrap();
        store.put("meta_file.csv", b"m").unwrap();

        assert_eq!(
            store.list("2021-12-17").unwrap(),
            ["2021-12-17/a.csv", "2021-12-17/b.csv"]
        );
        assert_eq!(store.list("2021-12-18/").unwrap(), ["2021-12-18/c.csv"]);
        assert_eq!(store.list("").unwrap().len(), 4);
        assert_eq!(store.get("meta_file.csv").unwrap(), b"m");
    }

    #[test]
    fn test_missing_key_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalObjectStore::new(dir.path());

        assert!(store.get("meta_file.csv").unwrap_err().is_not_found());
        assert!(store.list("2021-12-17").unwrap().is_empty());
        assert!(store.list("missing/dir/").unwrap().is_empty());
    }

    #[test]
    fn test_put_replaces_content() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalObjectStore::new(dir.path().join("nested"));

        store.put("report/r.csv", b"v1").unwrap();
        store.put("report/r.csv", b"v2").unwrap();

        assert_eq!(store.get("report/r.csv").unwrap(), b"v2");
        assert_eq!(store.list("report/").unwrap(), ["report/r.csv"]);
    }

    #[test]
    fn test_failed_put_leaves_no_tmp_file() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalObjectStore::new(dir.path());
        store.put("report/r.csv", b"r").unwrap();

        // 비어 있지 않은 디렉토리 위로는 rename 불가
        assert!(store.put("report", b"x").is_err());

        let leftovers: Vec<_> = fs::read_dir(dir.path())
            .unwrap()
            .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
            .filter(|name| name.ends_with(TMP_SUFFIX))
            .collect();
        assert!(leftovers.is_empty(), "{leftovers:?}");
        assert_eq!(store.get("report/r.csv").unwrap(), b"r");
    }

    #[test]
    fn test_invalid_key_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalObjectStore::new(dir.path());
        assert!(matches!(
            store.put("../escape.csv", b"x"),
            Err(DataError::InvalidKey(_))
        ));
    }
}
