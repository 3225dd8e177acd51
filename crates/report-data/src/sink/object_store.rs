//! 오브젝트 스토어 싱크.

use super::ReportSink;
use crate::error::Result;
use crate::storage::table_store::TableStore;
use crate::table::Table;
use report_core::TableFormat;

/// 리포트를 오브젝트 스토어 키 하나로 기록하는 싱크.
#[derive(Clone)]
pub struct ObjectStoreSink {
    tables: TableStore,
    format: TableFormat,
}

impl ObjectStoreSink {
    pub fn new(tables: TableStore, format: TableFormat) -> Self {
        Self { tables, format }
    }
}

impl ReportSink for ObjectStoreSink {
    fn write(&self, table: &Table, target: &str) -> Result<()> {
        self.tables.write_table(table, target, self.format)?;
        Ok(())
    }

    fn name(&self) -> &str {
        "object_store"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::memory::MemoryObjectStore;
    use crate::storage::ObjectStore;
    use crate::table::Cell;
    use std::sync::Arc;

    #[test]
    fn test_write_report_key() {
        let memory = Arc::new(MemoryObjectStore::new());
        let sink = ObjectStoreSink::new(TableStore::new(memory.clone()), TableFormat::Csv);
        let table = Table::with_rows(
            ["isin", "date"],
            vec![vec![Cell::from("AT0000A0E9W5"), Cell::from("2021-12-17")]],
        )
        .unwrap();

        sink.write(&table, "report1/daily_report1_20220103_083000.csv")
            .unwrap();

        assert_eq!(
            memory
                .get("report1/daily_report1_20220103_083000.csv")
                .unwrap(),
            b"isin,date\nAT0000A0E9W5,2021-12-17\n"
        );
    }
}
