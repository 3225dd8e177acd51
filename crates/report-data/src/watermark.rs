//! 워터마크(처리 이력) 저장소.
//!
//! 처리 이력은 대상 오브젝트 스토어의 단일 테이블(`source_date`,
//! `processed_date` 두 컬럼)로 저장됩니다.
//!
//! # 동작 방식
//!
//! 1. 기존 이력을 읽음 (없으면 빈 이력으로 간주)
//! 2. 컬럼 구성이 정확히 두 컬럼인지 검증 (다르면 기록 전에 실패)
//! 3. 기존 행 뒤에 새 행을 덧붙여 통째로 다시 기록
//!
//! 읽기 후 쓰기 사이에 잠금이 없으므로 동시 실행 시 마지막 기록이 이깁니다.

use crate::error::{DataError, Result};
use crate::storage::table_store::TableStore;
use crate::table::{Cell, Table};
use chrono::{NaiveDate, NaiveDateTime};
use report_core::{
    TableFormat, WatermarkHistory, WatermarkRecord, PROCESSED_DATE_COLUMN,
    PROCESSED_DATE_FORMAT, SOURCE_DATE_COLUMN, SOURCE_DATE_FORMAT,
};
use std::collections::BTreeSet;
use tracing::{debug, info, instrument};

/// 워터마크 저장소.
#[derive(Clone)]
pub struct WatermarkStore {
    tables: TableStore,
    key: String,
    format: TableFormat,
}

impl WatermarkStore {
    pub fn new(tables: TableStore, key: impl Into<String>, format: TableFormat) -> Self {
        Self {
            tables,
            key: key.into(),
            format,
        }
    }

    /// 처리 이력을 읽습니다.
    ///
    /// 저장된 이력이 없으면 `None`을 반환합니다.
    #[instrument(skip(self), fields(key = %self.key))]
    pub fn load(&self) -> Result<Option<WatermarkHistory>> {
        let table = match self.read_existing()? {
            Some(table) => table,
            None => {
                debug!("워터마크 파일 없음");
                return Ok(None);
            }
        };

        let history = parse_history(&table)?;
        debug!(records = history.len(), "워터마크 로드 완료");
        Ok(Some(history))
    }

    /// 새로 처리된 소스 일자를 이력에 추가합니다.
    ///
    /// `new_dates`가 비어 있으면 아무것도 하지 않습니다.
    /// 반환값은 추가된 레코드 수입니다.
    #[instrument(skip(self, new_dates), fields(key = %self.key, dates = new_dates.len()))]
    pub fn update(
        &self,
        new_dates: &BTreeSet<NaiveDate>,
        processed_at: NaiveDateTime,
    ) -> Result<usize> {
        if new_dates.is_empty() {
            info!("추가할 처리 일자가 없습니다. 워터마크를 기록하지 않습니다");
            return Ok(0);
        }

        let processed = processed_at.format(PROCESSED_DATE_FORMAT).to_string();
        let rows = new_dates
            .iter()
            .map(|date| {
                vec![
                    Cell::Text(date.format(SOURCE_DATE_FORMAT).to_string()),
                    Cell::Text(processed.clone()),
                ]
            })
            .collect();
        let new_table = Table::with_rows([SOURCE_DATE_COLUMN, PROCESSED_DATE_COLUMN], rows)?;

        // 스키마 검증은 기록 전에 수행 (실패 시 기존 이력 보존)
        let merged = match self.read_existing()? {
            Some(old) => {
                check_schema(&old)?;
                Table::concat([old, new_table])
            }
            None => new_table,
        };

        self.tables.write_table(&merged, &self.key, self.format)?;
        info!(
            added = new_dates.len(),
            total = merged.len(),
            "워터마크 갱신 완료"
        );
        Ok(new_dates.len())
    }

    fn read_existing(&self) -> Result<Option<Table>> {
        match self.tables.read_table(&self.key, self.format) {
            Ok(table) => Ok(Some(table)),
            Err(e) if e.is_not_found() => Ok(None),
            Err(e) => Err(e),
        }
    }
}

/// 컬럼 구성이 정확히 (`source_date`, `processed_date`)인지 검증합니다.
///
/// 컬럼 순서는 무관합니다.
fn check_schema(table: &Table) -> Result<()> {
    let mut actual: Vec<&str> = table.columns().iter().map(String::as_str).collect();
    actual.sort_unstable();

    let mut expected = vec![SOURCE_DATE_COLUMN, PROCESSED_DATE_COLUMN];
    expected.sort_unstable();

    if actual != expected {
        return Err(DataError::Schema(format!(
            "워터마크 컬럼이 올바르지 않습니다: {:?}",
            table.columns()
        )));
    }
    Ok(())
}

fn parse_history(table: &Table) -> Result<WatermarkHistory> {
    check_schema(table)?;

    // check_schema 통과 후에는 두 컬럼 모두 존재
    let (Some(date_idx), Some(processed_idx)) = (
        table.column_index(SOURCE_DATE_COLUMN),
        table.column_index(PROCESSED_DATE_COLUMN),
    ) else {
        return Err(DataError::Schema("워터마크 컬럼 누락".to_string()));
    };

    let records = table
        .rows()
        .iter()
        .map(|row| {
            let source_date = parse_cell(&row[date_idx], SOURCE_DATE_COLUMN, |s| {
                NaiveDate::parse_from_str(s, SOURCE_DATE_FORMAT)
            })?;
            let processed_at = parse_cell(&row[processed_idx], PROCESSED_DATE_COLUMN, |s| {
                NaiveDateTime::parse_from_str(s, PROCESSED_DATE_FORMAT)
            })?;
            Ok(WatermarkRecord::new(source_date, processed_at))
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(WatermarkHistory::from_records(records))
}

fn parse_cell<T, F>(cell: &Cell, column: &str, parse: F) -> Result<T>
where
    F: FnOnce(&str) -> std::result::Result<T, chrono::ParseError>,
{
    let text = cell
        .as_text()
        .ok_or_else(|| DataError::ParseError(format!("{column}: 빈 값")))?;
    parse(text.trim()).map_err(|e| DataError::ParseError(format!("{column}={text}: {e}")))
}
