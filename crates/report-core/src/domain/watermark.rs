//! 워터마크(처리 이력) 모델.
//!
//! 어떤 소스 일자가 언제 처리되었는지를 기록합니다.
//! 이력은 추가 전용이며 같은 `source_date`가 여러 번 나타날 수 있습니다
//! (재처리 시도마다 한 행).

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// 소스 일자 컬럼 이름.
pub const SOURCE_DATE_COLUMN: &str = "source_date";

/// 처리 시각 컬럼 이름.
pub const PROCESSED_DATE_COLUMN: &str = "processed_date";

/// 소스 일자 포맷 (소스 키 접두어와 동일).
pub const SOURCE_DATE_FORMAT: &str = "%Y-%m-%d";

/// 처리 시각 포맷.
pub const PROCESSED_DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// 워터마크 레코드.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WatermarkRecord {
    /// 처리된 소스 일자
    pub source_date: NaiveDate,
    /// 처리 시각
    pub processed_at: NaiveDateTime,
}

impl WatermarkRecord {
    pub fn new(source_date: NaiveDate, processed_at: NaiveDateTime) -> Self {
        Self {
            source_date,
            processed_at,
        }
    }
}

/// 워터마크 이력 (저장 순서 유지).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WatermarkHistory {
    records: Vec<WatermarkRecord>,
}

impl WatermarkHistory {
    /// 기존 레코드로 이력을 생성합니다.
    pub fn from_records(records: Vec<WatermarkRecord>) -> Self {
        Self { records }
    }

    /// 전체 레코드.
    pub fn records(&self) -> &[WatermarkRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// 한 번이라도 처리된 소스 일자 집합.
    pub fn processed_dates(&self) -> BTreeSet<NaiveDate> {
        self.records.iter().map(|r| r.source_date).collect()
    }

    /// 가장 최근에 처리된 소스 일자.
    pub fn latest_source_date(&self) -> Option<NaiveDate> {
        self.records.iter().map(|r| r.source_date).max()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, SOURCE_DATE_FORMAT).unwrap()
    }

    #[test]
    fn test_history_keeps_duplicates() {
        let at = date("2021-12-20").and_hms_opt(10, 0, 0).unwrap();
        let history = WatermarkHistory::from_records(vec![
            WatermarkRecord::new(date("2021-12-16"), at),
            WatermarkRecord::new(date("2021-12-17"), at),
            WatermarkRecord::new(date("2021-12-17"), at),
        ]);

        assert_eq!(history.len(), 3);
        assert_eq!(history.processed_dates().len(), 2);
        assert_eq!(history.latest_source_date(), Some(date("2021-12-17")));
    }
}
