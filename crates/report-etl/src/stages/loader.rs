//! 리포트 적재.
//!
//! 리포트를 싱크에 한 번에 기록한 뒤, 기록이 성공했을 때만
//! 리포트에 포함된 거래일을 워터마크에 추가합니다.

use super::aggregator::report_table;
use crate::error::Result;
use chrono::{NaiveDate, NaiveDateTime};
use report_core::{DailyReportRecord, ReportColumns, TableFormat};
use report_data::{ReportSink, WatermarkStore};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::sync::Arc;
use tracing::{info, instrument};

/// 리포트 기록 대상 이름 규칙.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TargetNaming {
    /// `prefix + now.format(date_format) + "." + extension` (실행마다 새 키)
    Timestamped {
        prefix: String,
        date_format: String,
        extension: String,
    },
    /// 고정 대상 (웨어하우스 테이블 ID)
    Fixed(String),
}

impl TargetNaming {
    /// 오브젝트 스토어 키 규칙을 생성합니다.
    pub fn timestamped(
        prefix: impl Into<String>,
        date_format: impl Into<String>,
        format: TableFormat,
    ) -> Self {
        Self::Timestamped {
            prefix: prefix.into(),
            date_format: date_format.into(),
            extension: format.extension().to_string(),
        }
    }

    /// 실행 시각에 대한 대상 이름.
    pub fn target(&self, now: NaiveDateTime) -> String {
        match self {
            Self::Timestamped {
                prefix,
                date_format,
                extension,
            } => format!("{prefix}{}.{extension}", now.format(date_format)),
            Self::Fixed(target) => target.clone(),
        }
    }
}

/// 적재 결과.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoadOutcome {
    /// 기록 대상 (빈 리포트면 None)
    pub target: Option<String>,
    /// 기록된 행 수
    pub rows: usize,
    /// 워터마크에 추가된 일자 수
    pub watermark_dates: usize,
}

/// 리포트 적재기.
#[derive(Clone)]
pub struct Loader {
    sink: Arc<dyn ReportSink>,
    naming: TargetNaming,
    columns: ReportColumns,
    watermark: WatermarkStore,
}

impl Loader {
    pub fn new(
        sink: Arc<dyn ReportSink>,
        naming: TargetNaming,
        columns: ReportColumns,
        watermark: WatermarkStore,
    ) -> Self {
        Self {
            sink,
            naming,
            columns,
            watermark,
        }
    }

    /// 리포트를 기록하고 워터마크를 갱신합니다.
    ///
    /// 싱크 기록이 실패하면 워터마크는 변경되지 않습니다.
    #[instrument(skip(self, report), fields(rows = report.len(), sink = self.sink.name()))]
    pub fn load(
        &self,
        report: &[DailyReportRecord],
        extract_from: NaiveDate,
        now: NaiveDateTime,
    ) -> Result<LoadOutcome> {
        if report.is_empty() {
            info!("리포트가 비어 있습니다. 기록을 건너뜁니다");
            self.watermark.update(&BTreeSet::new(), now)?;
            return Ok(LoadOutcome::default());
        }

        let target = self.naming.target(now);
        let table = report_table(&self.columns, report)?;
        self.sink.write(&table, &target)?;
        info!(target = %target, rows = table.len(), "리포트 기록 완료");

        let dates: BTreeSet<NaiveDate> = report
            .iter()
            .map(|r| r.date)
            .filter(|d| *d >= extract_from)
            .collect();
        let watermark_dates = self.watermark.update(&dates, now)?;

        Ok(LoadOutcome {
            target: Some(target),
            rows: table.len(),
            watermark_dates,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(s: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S").unwrap()
    }

    #[test]
    fn test_timestamped_target() {
        let naming = TargetNaming::timestamped(
            "report1/daily_report1_",
            "%Y%m%d_%H%M%S",
            TableFormat::Parquet,
        );
        assert_eq!(
            naming.target(at("2022-01-03 08:30:05")),
            "report1/daily_report1_20220103_083005.parquet"
        );
    }

    #[test]
    fn test_fixed_target() {
        let naming = TargetNaming::Fixed("xetra.daily_report".to_string());
        assert_eq!(naming.target(at("2022-01-03 08:30:05")), "xetra.daily_report");
    }
}
