//! 소스 배치 추출.
//!
//! 소스 키는 `YYYY-MM-DD/...` 형태로 거래일 접두어를 가집니다.
//! 후보 일자마다 접두어로 키를 조회해 모두 읽고 하나의 테이블로 합칩니다.

use crate::error::Result;
use chrono::NaiveDate;
use report_core::{TableFormat, SOURCE_DATE_FORMAT};
use report_data::{Table, TableStore};
use tracing::{debug, info, instrument};

/// 추출 결과.
#[derive(Debug, Clone, Default)]
pub struct Extracted {
    /// 합쳐진 원시 테이블
    pub table: Table,
    /// 읽은 소스 키 수
    pub objects: usize,
}

/// 소스 오브젝트 스토어 추출기.
#[derive(Clone)]
pub struct Extractor {
    source: TableStore,
    format: TableFormat,
}

impl Extractor {
    pub fn new(source: TableStore, format: TableFormat) -> Self {
        Self { source, format }
    }

    /// 후보 일자의 모든 배치를 읽어 합칩니다.
    ///
    /// 배치가 하나도 없으면 빈 테이블을 반환합니다.
    #[instrument(skip(self, dates), fields(days = dates.len()))]
    pub fn extract(&self, dates: &[NaiveDate]) -> Result<Extracted> {
        let mut tables = Vec::new();

        for date in dates {
            let prefix = date.format(SOURCE_DATE_FORMAT).to_string();
            let keys = self.source.list_keys(&prefix)?;
            debug!(prefix = %prefix, count = keys.len(), "배치 키 조회");

            for key in keys {
                tables.push(self.source.read_table(&key, self.format)?);
            }
        }

        let objects = tables.len();
        let table = Table::concat(tables);
        info!(objects = objects, rows = table.len(), "추출 완료");

        Ok(Extracted { table, objects })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use report_data::{Cell, MemoryObjectStore, ObjectStore};
    use std::sync::Arc;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn extractor() -> (Arc<MemoryObjectStore>, Extractor) {
        let memory = Arc::new(MemoryObjectStore::new());
        let extractor = Extractor::new(TableStore::new(memory.clone()), TableFormat::Csv);
        (memory, extractor)
    }

    #[test]
    fn test_extract_concatenates_in_key_order() {
        let (memory, extractor) = extractor();
        memory
            .put("2021-12-17/2021-12-17_BINS_XETR14.csv", b"ISIN,Time\nB,14:00\n")
            .unwrap();
        memory
            .put("2021-12-17/2021-12-17_BINS_XETR13.csv", b"ISIN,Time\nA,13:00\n")
            .unwrap();
        memory
            .put("2021-12-18/2021-12-18_BINS_XETR07.csv", b"Time,ISIN\n07:00,C\n")
            .unwrap();
        memory
            .put("2021-12-19/2021-12-19_BINS_XETR07.csv", b"ISIN,Time\nD,07:00\n")
            .unwrap();

        let extracted = extractor
            .extract(&[date("2021-12-17"), date("2021-12-18")])
            .unwrap();

        assert_eq!(extracted.objects, 3);
        assert_eq!(extracted.table.columns(), ["ISIN", "Time"]);
        let isins: Vec<_> = extracted.table.rows().iter().map(|r| r[0].clone()).collect();
        assert_eq!(isins, [Cell::from("A"), Cell::from("B"), Cell::from("C")]);
    }

    #[test]
    fn test_extract_no_dates_or_no_batches() {
        let (_, extractor) = extractor();
        assert!(extractor.extract(&[]).unwrap().table.is_empty());

        let extracted = extractor.extract(&[date("2021-12-25")]).unwrap();
        assert!(extracted.table.is_empty());
        assert_eq!(extracted.objects, 0);
    }
}
