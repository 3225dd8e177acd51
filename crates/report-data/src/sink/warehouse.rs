//! 웨어하우스 테이블 싱크.
//!
//! 테이블 ID마다 `<root>/<table_id>.csv` 파일 하나를 유지하며,
//! 실행마다 행을 덧붙입니다. 기존 테이블의 컬럼 구성이 다르면
//! 아무것도 기록하지 않고 [`DataError::Schema`]로 실패합니다.

use super::ReportSink;
use crate::codec;
use crate::error::{DataError, Result};
use crate::table::Table;
use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use tracing::info;

/// 행 추가 방식 웨어하우스 싱크.
#[derive(Debug, Clone)]
pub struct WarehouseSink {
    root: PathBuf,
}

impl WarehouseSink {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// 테이블 ID의 저장 경로.
    pub fn table_path(&self, table_id: &str) -> Result<PathBuf> {
        validate_table_id(table_id)?;
        Ok(self.root.join(format!("{table_id}.csv")))
    }

    /// 대상 테이블에 행을 추가합니다.
    ///
    /// 테이블이 없으면 헤더와 함께 생성합니다. 기존 테이블과 컬럼 순서가
    /// 다르면 기존 순서에 맞춰 기록합니다. 반환값은 추가된 행 수입니다.
    pub fn append_rows(&self, table: &Table, table_id: &str) -> Result<usize> {
        let path = self.table_path(table_id)?;
        if table.is_empty() {
            info!(table_id = table_id, "추가할 행이 없습니다");
            return Ok(0);
        }

        let bytes = match read_existing(&path)? {
            Some(existing) => {
                let aligned = align_to(table, &existing.header, table_id)?;
                let rows = codec::csv::encode(&aligned, false)?;
                // 마지막 행에 개행이 없으면 새 행과 붙지 않도록 개행부터 기록
                if existing.ends_with_newline {
                    rows
                } else {
                    [b"\n".as_slice(), rows.as_slice()].concat()
                }
            }
            None => {
                fs::create_dir_all(&self.root)?;
                codec::csv::encode(table, true)?
            }
        };

        // 한 번의 write_all로 기록
        let mut file = OpenOptions::new().create(true).append(true).open(&path)?;
        file.write_all(&bytes)?;
        file.flush()?;

        info!(
            table_id = table_id,
            path = %path.display(),
            rows = table.len(),
            "웨어하우스 행 추가 완료"
        );
        Ok(table.len())
    }
}

impl ReportSink for WarehouseSink {
    fn write(&self, table: &Table, target: &str) -> Result<()> {
        self.append_rows(table, target)?;
        Ok(())
    }

    fn name(&self) -> &str {
        "warehouse"
    }
}

/// 테이블 ID 검증 (`dataset.table` 형태 허용).
fn validate_table_id(table_id: &str) -> Result<()> {
    let valid = !table_id.is_empty()
        && !table_id.starts_with('.')
        && !table_id.contains("..")
        && table_id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.'));
    if valid {
        Ok(())
    } else {
        Err(DataError::InvalidKey(table_id.to_string()))
    }
}

/// 기존 테이블 파일 정보.
struct ExistingTable {
    header: Vec<String>,
    ends_with_newline: bool,
}

fn read_existing(path: &Path) -> Result<Option<ExistingTable>> {
    let bytes = match fs::read(path) {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(e.into()),
    };
    if bytes.is_empty() {
        return Ok(None);
    }
    let table = codec::csv::decode(&bytes)?;
    Ok(Some(ExistingTable {
        header: table.columns().to_vec(),
        ends_with_newline: bytes.ends_with(b"\n"),
    }))
}

/// 기존 헤더 순서로 컬럼을 재배열합니다. 컬럼 집합이 다르면 실패합니다.
fn align_to(table: &Table, header: &[String], table_id: &str) -> Result<Table> {
    let mut expected: Vec<&String> = header.iter().collect();
    let mut actual: Vec<&String> = table.columns().iter().collect();
    expected.sort_unstable();
    actual.sort_unstable();
    if expected != actual {
        return Err(DataError::Schema(format!(
            "{table_id}: 기존 컬럼 {:?}와 리포트 컬럼 {:?}가 다릅니다",
            header,
            table.columns()
        )));
    }

    let mapping: Vec<usize> = header
        .iter()
        .filter_map(|name| table.column_index(name))
        .collect();
    let rows = table
        .rows()
        .iter()
        .map(|row| mapping.iter().map(|&i| row[i].clone()).collect())
        .collect();
    Table::with_rows(header.iter().cloned(), rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::Cell;

    fn report(rows: &[(&str, &str)]) -> Table {
        Table::with_rows(
            ["isin", "date"],
            rows.iter()
                .map(|(isin, date)| vec![Cell::from(*isin), Cell::from(*date)])
                .collect(),
        )
        .unwrap()
    }

    #[test]
    fn test_append_creates_then_appends() {
        let dir = tempfile::tempdir().unwrap();
        let sink = WarehouseSink::new(dir.path());

        assert_eq!(
            sink.append_rows(&report(&[("A", "2021-12-17")]), "xetra.daily_report")
                .unwrap(),
            1
        );
        sink.write(&report(&[("B", "2021-12-18")]), "xetra.daily_report")
            .unwrap();

        let content = fs::read_to_string(dir.path().join("xetra.daily_report.csv")).unwrap();
        assert_eq!(content, "isin,date\nA,2021-12-17\nB,2021-12-18\n");
    }

    #[test]
    fn test_append_reorders_columns() {
        let dir = tempfile::tempdir().unwrap();
        let sink = WarehouseSink::new(dir.path());
        fs::write(dir.path().join("t.csv"), "date,isin\n2021-12-16,Z\n").unwrap();

        sink.append_rows(&report(&[("A", "2021-12-17")]), "t").unwrap();

        let content = fs::read_to_string(dir.path().join("t.csv")).unwrap();
        assert_eq!(content, "date,isin\n2021-12-16,Z\n2021-12-17,A\n");
    }

    #[test]
    fn test_append_after_unterminated_last_row() {
        let dir = tempfile::tempdir().unwrap();
        let sink = WarehouseSink::new(dir.path());
        let path = dir.path().join("t.csv");
        fs::write(&path, "isin,date\nZ,2021-12-16").unwrap();

        sink.append_rows(&report(&[("A", "2021-12-17")]), "t").unwrap();

        let content = fs::read_to_string(&path).unwrap();
        assert_eq!(content, "isin,date\nZ,2021-12-16\nA,2021-12-17\n");
        let table = codec::csv::decode(content.as_bytes()).unwrap();
        assert_eq!(table.len(), 2);
    }

    #[test]
    fn test_schema_mismatch_leaves_table_untouched() {
        let dir = tempfile::tempdir().unwrap();
        let sink = WarehouseSink::new(dir.path());
        fs::write(dir.path().join("t.csv"), "isin,day\nZ,2021-12-16\n").unwrap();

        let err = sink.append_rows(&report(&[("A", "2021-12-17")]), "t").unwrap_err();

        assert!(matches!(err, DataError::Schema(_)));
        let content = fs::read_to_string(dir.path().join("t.csv")).unwrap();
        assert_eq!(content, "isin,day\nZ,2021-12-16\n");
    }

    #[test]
    fn test_invalid_table_id() {
        let sink = WarehouseSink::new("/tmp/unused");
        assert!(matches!(
            sink.append_rows(&report(&[("A", "2021-12-17")]), "../x"),
            Err(DataError::InvalidKey(_))
        ));
        assert!(sink.table_path("").is_err());
        assert!(sink.table_path("a/b").is_err());
    }

    #[test]
    fn test_empty_report_is_noop() {
        let dir = tempfile::tempdir().unwrap();
        let sink = WarehouseSink::new(dir.path());
        assert_eq!(sink.append_rows(&report(&[]), "t").unwrap(), 0);
        assert!(!dir.path().join("t.csv").exists());
    }
}
