//! 오브젝트 스토어 위의 테이블 읽기/쓰기.

use super::ObjectStore;
use crate::codec;
use crate::error::Result;
use crate::table::Table;
use report_core::TableFormat;
use std::sync::Arc;
use tracing::{debug, info};

/// 테이블 단위 오브젝트 스토어 커넥터.
#[derive(Clone)]
pub struct TableStore {
    store: Arc<dyn ObjectStore>,
}

impl TableStore {
    pub fn new(store: Arc<dyn ObjectStore>) -> Self {
        Self { store }
    }

    /// 접두어로 키 목록을 조회합니다.
    pub fn list_keys(&self, prefix: &str) -> Result<Vec<String>> {
        self.store.list(prefix)
    }

    /// 키의 테이블을 읽습니다.
    pub fn read_table(&self, key: &str, format: TableFormat) -> Result<Table> {
        debug!(location = %self.store.describe(key), format = %format, "파일 읽기");
        let bytes = self.store.get(key)?;
        codec::decode(&bytes, format)
    }

    /// 테이블을 키에 기록합니다.
    ///
    /// 빈 테이블은 기록하지 않고 `false`를 반환합니다.
    pub fn write_table(&self, table: &Table, key: &str, format: TableFormat) -> Result<bool> {
        if table.is_empty() {
            info!(key = key, "빈 테이블입니다. 파일을 기록하지 않습니다");
            return Ok(false);
        }

        let bytes = codec::encode(table, format)?;
        self.store.put(key, &bytes)?;
        info!(
            location = %self.store.describe(key),
            rows = table.len(),
            format = %format,
            "파일 기록 완료"
        );
        Ok(true)
    }

    /// 포맷 문자열로 테이블을 기록합니다.
    ///
    /// 지원하지 않는 포맷은 기록 시도 전에 `UnsupportedFormat`으로 거부됩니다.
    pub fn write_table_as(&self, table: &Table, key: &str, format: &str) -> Result<bool> {
        let format: TableFormat = format.parse()?;
        self.write_table(table, key, format)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DataError;
    use crate::storage::memory::MemoryObjectStore;
    use crate::table::Cell;

    fn store() -> (Arc<MemoryObjectStore>, TableStore) {
        let memory = Arc::new(MemoryObjectStore::new());
        let tables = TableStore::new(memory.clone());
        (memory, tables)
    }

    fn two_by_two() -> Table {
        Table::with_rows(
            ["col1", "col2"],
            vec![
                vec![Cell::from("A"), Cell::from("B")],
                vec![Cell::from("C"), Cell::from("D")],
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_write_and_read_csv() {
        let (_, tables) = store();
        assert!(tables.write_table(&two_by_two(), "test.csv", TableFormat::Csv).unwrap());
        assert_eq!(tables.read_table("test.csv", TableFormat::Csv).unwrap(), two_by_two());
    }

    #[test]
    fn test_write_and_read_parquet() {
        let (_, tables) = store();
        assert!(tables.write_table_as(&two_by_two(), "test.parquet", "parquet").unwrap());
        assert_eq!(
            tables.read_table("test.parquet", TableFormat::Parquet).unwrap(),
            two_by_two()
        );
    }

    #[test]
    fn test_empty_table_not_written() {
        let (memory, tables) = store();
        let empty = Table::new(["col1", "col2"]);
        assert!(!tables.write_table(&empty, "empty.csv", TableFormat::Csv).unwrap());
        assert!(memory.is_empty());
    }

    #[test]
    fn test_wrong_format_rejected_before_write() {
        let (memory, tables) = store();
        let err = tables.write_table_as(&two_by_two(), "test.xlsx", "xlsx").unwrap_err();
        assert!(matches!(err, DataError::UnsupportedFormat(f) if f == "xlsx"));
        assert!(memory.is_empty());
    }
}
