//! 실행 통계 구조체.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// ETL 실행 통계
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RunStats {
    /// 추출 후보 일수
    pub candidate_days: usize,
    /// 읽은 소스 배치 파일 수
    pub source_objects: usize,
    /// 원시 행 수
    pub raw_rows: usize,
    /// 리포트 행 수
    pub report_rows: usize,
    /// 워터마크에 추가된 일자 수
    pub watermark_dates: usize,
    /// 리포트 기록 대상 (기록하지 않았으면 None)
    pub target: Option<String>,
    /// 처리할 일자가 없어 건너뜀
    pub skipped: bool,
    /// 소요 시간
    #[serde(skip)]
    pub elapsed: Duration,
}

impl RunStats {
    /// 새 통계 객체 생성
    pub fn new() -> Self {
        Self::default()
    }

    /// 건너뛴 실행 통계
    pub fn skipped() -> Self {
        Self {
            skipped: true,
            ..Self::default()
        }
    }

    /// 통계 요약 로그 출력
    pub fn log_summary(&self, operation: &str) {
        tracing::info!(
            operation = operation,
            candidate_days = self.candidate_days,
            source_objects = self.source_objects,
            raw_rows = self.raw_rows,
            report_rows = self.report_rows,
            watermark_dates = self.watermark_dates,
            target = self.target.as_deref().unwrap_or("-"),
            skipped = self.skipped,
            elapsed = format!("{:.1}s", self.elapsed.as_secs_f64()),
            "실행 완료"
        );
    }
}
