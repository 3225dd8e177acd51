//! 일별 리포트 집계.
//!
//! 구간 단위 원시 체결 레코드를 (종목, 거래일)당 한 행으로 집계합니다.
//!
//! # 집계 규칙
//!
//! - 시가: 해당일 가장 이른 구간의 시작 가격 (같은 시각이 여러 개면 최소값)
//! - 종가: 해당일 가장 늦은 구간의 시작 가격 (같은 시각이 여러 개면 최소값)
//! - 최저가 / 최고가: 구간 최저가의 최소 / 구간 최고가의 최대
//! - 거래량: 합계
//! - 변화율: (당일 시가 - 전일 종가) / 전일 종가 × 100
//!
//! 같은 시각 구간에 대해 최소값을 택하므로 결과는 입력 순서와 무관합니다.

use crate::error::{EtlError, Result};
use chrono::{NaiveDate, NaiveTime};
use report_core::{
    DailyReportRecord, DecimalExt, Price, RawTradeRecord, ReportColumns, SourceColumns, Volume,
    REPORT_DECIMAL_PLACES, SOURCE_DATE_FORMAT,
};
use report_data::{Cell, Table};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use std::collections::btree_map::Entry;
use std::collections::BTreeMap;
use std::str::FromStr;
use tracing::{debug, info, instrument, warn};

/// 허용하는 구간 시각 포맷.
const TIME_FORMATS: [&str; 2] = ["%H:%M", "%H:%M:%S"];

/// 일별 리포트 집계기.
#[derive(Debug, Clone, Default)]
pub struct Aggregator {
    source: SourceColumns,
    report: ReportColumns,
}

/// (종목, 거래일) 그룹 누적값.
#[derive(Debug, Clone)]
struct DailyAccumulator {
    first_time: NaiveTime,
    opening: Price,
    last_time: NaiveTime,
    closing: Price,
    min: Price,
    max: Price,
    volume: Volume,
}

impl DailyAccumulator {
    fn new(record: &RawTradeRecord) -> Self {
        Self {
            first_time: record.time,
            opening: record.start_price,
            last_time: record.time,
            closing: record.start_price,
            min: record.min_price,
            max: record.max_price,
            volume: record.traded_volume,
        }
    }

    fn add(&mut self, record: &RawTradeRecord) -> Result<()> {
        if record.time < self.first_time {
            self.first_time = record.time;
            self.opening = record.start_price;
        } else if record.time == self.first_time {
            self.opening = self.opening.min(record.start_price);
        }

        if record.time > self.last_time {
            self.last_time = record.time;
            self.closing = record.start_price;
        } else if record.time == self.last_time {
            self.closing = self.closing.min(record.start_price);
        }

        self.min = self.min.min(record.min_price);
        self.max = self.max.max(record.max_price);
        self.volume = self.volume.checked_add(record.traded_volume).ok_or_else(|| {
            EtlError::MalformedInput(format!("{} {} 거래량 합계 overflow", record.isin, record.date))
        })?;
        Ok(())
    }
}

impl Aggregator {
    pub fn new(source: SourceColumns, report: ReportColumns) -> Self {
        Self { source, report }
    }

    /// 원시 테이블을 일별 리포트로 변환합니다.
    ///
    /// `extract_from` 이전 일자의 행은 변화율 계산에만 쓰이고 결과에서 제외됩니다.
    /// 결과는 종목 오름차순, 거래일 오름차순입니다.
    #[instrument(skip(self, raw), fields(rows = raw.len(), extract_from = %extract_from))]
    pub fn transform(&self, raw: &Table, extract_from: NaiveDate) -> Result<Vec<DailyReportRecord>> {
        if raw.is_empty() {
            info!("원시 데이터가 비어 있습니다. 집계를 건너뜁니다");
            return Ok(Vec::new());
        }

        let mut records = self.parse_records(raw)?;
        records.sort_by_key(|r| r.time);

        let mut groups: BTreeMap<(String, NaiveDate), DailyAccumulator> = BTreeMap::new();
        for record in &records {
            match groups.entry((record.isin.clone(), record.date)) {
                Entry::Occupied(mut entry) => entry.get_mut().add(record)?,
                Entry::Vacant(entry) => {
                    entry.insert(DailyAccumulator::new(record));
                }
            }
        }

        let mut report = Vec::with_capacity(groups.len());
        let mut prev: Option<(&str, Price)> = None;
        for ((isin, date), acc) in &groups {
            let change = match prev {
                Some((prev_isin, prev_close)) if prev_isin == isin.as_str() => acc
                    .opening
                    .pct_change_from(prev_close)
                    .map(|pct| pct.round_away(REPORT_DECIMAL_PLACES)),
                _ => None,
            };
            prev = Some((isin.as_str(), acc.closing));

            if *date < extract_from {
                continue;
            }
            report.push(DailyReportRecord {
                isin: isin.clone(),
                date: *date,
                opening_price: acc.opening.round_away(REPORT_DECIMAL_PLACES),
                closing_price: acc.closing.round_away(REPORT_DECIMAL_PLACES),
                min_price: acc.min.round_away(REPORT_DECIMAL_PLACES),
                max_price: acc.max.round_away(REPORT_DECIMAL_PLACES),
                daily_traded_volume: acc.volume,
                change_prev_close_pct: change,
            });
        }

        info!(
            parsed = records.len(),
            groups = groups.len(),
            reported = report.len(),
            "집계 완료"
        );
        Ok(report)
    }

    /// 설정된 소스 컬럼으로 투영하고 레코드로 파싱합니다.
    ///
    /// 컬럼이 없으면 에러, 값이 비어 있는 행은 버립니다.
    pub fn parse_records(&self, raw: &Table) -> Result<Vec<RawTradeRecord>> {
        let idx = self
            .source
            .all()
            .map(|name| {
                raw.column_index(name)
                    .ok_or_else(|| EtlError::MalformedInput(format!("소스 컬럼 누락: {name}")))
            });
        let [isin, mnemonic, date, time, start, end, min, max, volume] = idx;
        let (isin, mnemonic, date, time) = (isin?, mnemonic?, date?, time?);
        let (start, end, min, max, volume) = (start?, end?, min?, max?, volume?);
        let projection = [isin, mnemonic, date, time, start, end, min, max, volume];

        let mut records = Vec::with_capacity(raw.len());
        let mut dropped = 0usize;
        for row in raw.rows() {
            if projection.iter().any(|&i| row[i].is_null()) {
                dropped += 1;
                continue;
            }
            records.push(RawTradeRecord {
                isin: text(&row[isin]),
                mnemonic: text(&row[mnemonic]),
                date: parse_date(&row[date], &self.source.date)?,
                time: parse_time(&row[time], &self.source.time)?,
                start_price: parse_decimal(&row[start], &self.source.start_price)?,
                end_price: parse_decimal(&row[end], &self.source.end_price)?,
                min_price: parse_decimal(&row[min], &self.source.min_price)?,
                max_price: parse_decimal(&row[max], &self.source.max_price)?,
                traded_volume: parse_volume(&row[volume], &self.source.traded_volume)?,
            });
        }

        if dropped > 0 {
            warn!(dropped = dropped, "값이 비어 있는 행을 제외했습니다");
        }
        debug!(records = records.len(), "원시 레코드 파싱 완료");
        Ok(records)
    }

    /// 리포트 레코드를 출력 테이블로 변환합니다.
    pub fn to_table(&self, records: &[DailyReportRecord]) -> Result<Table> {
        report_table(&self.report, records)
    }

    /// 출력 테이블을 리포트 레코드로 다시 읽습니다.
    pub fn from_table(&self, table: &Table) -> Result<Vec<DailyReportRecord>> {
        let columns = self.report.all();
        let idx = columns
            .iter()
            .map(|name| {
                table
                    .column_index(name)
                    .ok_or_else(|| EtlError::MalformedInput(format!("리포트 컬럼 누락: {name}")))
            })
            .collect::<Result<Vec<usize>>>()?;

        table
            .rows()
            .iter()
            .map(|row| {
                let change = &row[idx[7]];
                Ok(DailyReportRecord {
                    isin: text(&row[idx[0]]),
                    date: parse_date(&row[idx[1]], columns[1])?,
                    opening_price: parse_decimal(&row[idx[2]], columns[2])?,
                    closing_price: parse_decimal(&row[idx[3]], columns[3])?,
                    min_price: parse_decimal(&row[idx[4]], columns[4])?,
                    max_price: parse_decimal(&row[idx[5]], columns[5])?,
                    daily_traded_volume: parse_volume(&row[idx[6]], columns[6])?,
                    change_prev_close_pct: if change.is_null() {
                        None
                    } else {
                        Some(parse_decimal(change, columns[7])?)
                    },
                })
            })
            .collect()
    }
}

/// 리포트 레코드를 설정된 컬럼 이름의 테이블로 변환합니다.
pub fn report_table(columns: &ReportColumns, records: &[DailyReportRecord]) -> Result<Table> {
    let rows = records
        .iter()
        .map(|r| {
            vec![
                Cell::from(r.isin.as_str()),
                Cell::Text(r.date.format(SOURCE_DATE_FORMAT).to_string()),
                Cell::Decimal(r.opening_price),
                Cell::Decimal(r.closing_price),
                Cell::Decimal(r.min_price),
                Cell::Decimal(r.max_price),
                Cell::Int(r.daily_traded_volume),
                Cell::from(r.change_prev_close_pct),
            ]
        })
        .collect();
    Ok(Table::with_rows(columns.all(), rows)?)
}

fn text(cell: &Cell) -> String {
    cell.as_text().map(|s| s.trim().to_string()).unwrap_or_default()
}

fn malformed(column: &str, cell: &Cell) -> EtlError {
    EtlError::MalformedInput(format!("{column}: 파싱할 수 없는 값 '{cell}'"))
}

fn parse_date(cell: &Cell, column: &str) -> Result<NaiveDate> {
    let value = text(cell);
    NaiveDate::parse_from_str(&value, SOURCE_DATE_FORMAT).map_err(|_| malformed(column, cell))
}

fn parse_time(cell: &Cell, column: &str) -> Result<NaiveTime> {
    let value = text(cell);
    TIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveTime::parse_from_str(&value, fmt).ok())
        .ok_or_else(|| malformed(column, cell))
}

fn parse_decimal(cell: &Cell, column: &str) -> Result<Decimal> {
    match cell {
        Cell::Decimal(d) => Ok(*d),
        Cell::Int(v) => Ok(Decimal::from(*v)),
        Cell::Text(s) => {
            let s = s.trim();
            Decimal::from_str(s)
                .or_else(|_| Decimal::from_scientific(s))
                .map_err(|_| malformed(column, cell))
        }
        Cell::Null => Err(malformed(column, cell)),
    }
}

fn parse_volume(cell: &Cell, column: &str) -> Result<Volume> {
    match cell {
        Cell::Int(v) => Ok(*v),
        Cell::Decimal(d) if d.fract().is_zero() => d.to_i64().ok_or_else(|| malformed(column, cell)),
        Cell::Text(s) => {
            let s = s.trim();
            s.parse::<i64>().or_else(|_| {
                // "877.0" 형태 허용
                Decimal::from_str(s)
                    .ok()
                    .filter(|d| d.fract().is_zero())
                    .and_then(|d| d.to_i64())
                    .ok_or_else(|| malformed(column, cell))
            })
        }
        _ => Err(malformed(column, cell)),
    }
}
