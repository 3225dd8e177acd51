//! 전체 ETL 파이프라인.
//!
//! 워터마크 로드 → 추출 범위 결정 → 추출 → 집계 → 적재를 한 번 실행합니다.
//! 처리할 일자가 없으면 추출 전에 종료합니다.

use crate::error::{EtlError, Result};
use crate::stages::{resolve, Aggregator, ExtractionPlan, Extractor, Loader, TargetNaming};
use crate::stats::RunStats;
use chrono::{Local, NaiveDate, NaiveDateTime};
use report_core::{CoreError, JobConfig, SinkKind, WatermarkHistory};
use report_data::{
    LocalObjectStore, ObjectStore, ObjectStoreSink, ReportSink, TableStore, WarehouseSink,
    WatermarkStore,
};
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, instrument};

/// 일별 리포트 ETL 파이프라인.
#[derive(Clone)]
pub struct Pipeline {
    start_date: NaiveDate,
    watermark: WatermarkStore,
    extractor: Extractor,
    aggregator: Aggregator,
    loader: Loader,
}

impl Pipeline {
    pub fn new(
        start_date: NaiveDate,
        watermark: WatermarkStore,
        extractor: Extractor,
        aggregator: Aggregator,
        loader: Loader,
    ) -> Self {
        Self {
            start_date,
            watermark,
            extractor,
            aggregator,
            loader,
        }
    }

    /// 설정의 로컬 디렉토리로 파이프라인을 구성합니다.
    pub fn from_config(config: &JobConfig) -> Result<Self> {
        let source = Arc::new(LocalObjectStore::new(&config.storage.source_root));
        let destination = Arc::new(LocalObjectStore::new(&config.storage.destination_root));
        Self::with_stores(config, source, destination)
    }

    /// 주어진 소스/대상 오브젝트 스토어로 파이프라인을 구성합니다.
    pub fn with_stores(
        config: &JobConfig,
        source: Arc<dyn ObjectStore>,
        destination: Arc<dyn ObjectStore>,
    ) -> Result<Self> {
        let destination = TableStore::new(destination);
        let watermark = WatermarkStore::new(
            destination.clone(),
            config.watermark.key.clone(),
            config.watermark.format,
        );

        let (sink, naming) = match config.destination.sink {
            SinkKind::ObjectStore => {
                let sink: Arc<dyn ReportSink> =
                    Arc::new(ObjectStoreSink::new(destination, config.destination.format));
                let naming = TargetNaming::timestamped(
                    config.destination.key_prefix.clone(),
                    config.destination.key_date_format.clone(),
                    config.destination.format,
                );
                (sink, naming)
            }
            SinkKind::Warehouse => {
                let (Some(root), Some(table)) = (
                    config.storage.warehouse_root.as_ref(),
                    config.destination.warehouse_table.as_ref(),
                ) else {
                    return Err(EtlError::Core(CoreError::Config(
                        "warehouse 싱크 설정이 누락되었습니다".to_string(),
                    )));
                };
                let sink: Arc<dyn ReportSink> = Arc::new(WarehouseSink::new(root));
                (sink, TargetNaming::Fixed(table.clone()))
            }
        };

        let loader = Loader::new(
            sink,
            naming,
            config.destination.columns.clone(),
            watermark.clone(),
        );

        Ok(Self::new(
            config.source.first_extract_date,
            watermark,
            Extractor::new(TableStore::new(source), config.source.format),
            Aggregator::new(
                config.source.columns.clone(),
                config.destination.columns.clone(),
            ),
            loader,
        ))
    }

    /// 시작일을 변경합니다.
    pub fn with_start_date(mut self, start_date: NaiveDate) -> Self {
        self.start_date = start_date;
        self
    }

    pub fn start_date(&self) -> NaiveDate {
        self.start_date
    }

    /// 저장된 처리 이력.
    pub fn history(&self) -> Result<Option<WatermarkHistory>> {
        Ok(self.watermark.load()?)
    }

    /// 오늘 기준 추출 계획을 결정합니다.
    pub fn plan(&self) -> Result<ExtractionPlan> {
        self.plan_at(Local::now().date_naive())
    }

    /// 주어진 날짜 기준 추출 계획을 결정합니다.
    pub fn plan_at(&self, today: NaiveDate) -> Result<ExtractionPlan> {
        let history = self.watermark.load()?;
        let plan = resolve(self.start_date, history.as_ref(), today);
        info!(
            start_date = %self.start_date,
            extract_from = %plan.extract_from,
            report_from = %plan.report_from,
            candidates = plan.candidate_dates.len(),
            "추출 계획 결정"
        );
        Ok(plan)
    }

    /// 현재 시각 기준으로 한 번 실행합니다.
    pub fn run(&self) -> Result<RunStats> {
        self.run_at(Local::now().naive_local())
    }

    /// 주어진 시각 기준으로 한 번 실행합니다.
    #[instrument(skip(self), fields(start_date = %self.start_date))]
    pub fn run_at(&self, now: NaiveDateTime) -> Result<RunStats> {
        let started = Instant::now();
        info!("=== 일별 리포트 ETL 시작 ===");

        let plan = self.plan_at(now.date())?;
        if plan.is_nothing_to_do() {
            info!("처리할 일자가 없습니다");
            let mut stats = RunStats::skipped();
            stats.elapsed = started.elapsed();
            return Ok(stats);
        }

        let mut stats = RunStats::new();
        stats.candidate_days = plan.candidate_dates.len();

        info!("Step 1/3: 추출");
        let extracted = self.extractor.extract(&plan.candidate_dates)?;
        stats.source_objects = extracted.objects;
        stats.raw_rows = extracted.table.len();

        info!("Step 2/3: 집계");
        let report = self.aggregator.transform(&extracted.table, plan.report_from)?;
        stats.report_rows = report.len();

        info!("Step 3/3: 적재");
        let outcome = self.loader.load(&report, plan.report_from, now)?;
        stats.watermark_dates = outcome.watermark_dates;
        stats.target = outcome.target;

        stats.elapsed = started.elapsed();
        info!("=== 일별 리포트 ETL 완료 ===");
        Ok(stats)
    }
}
