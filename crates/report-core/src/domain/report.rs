//! 일별 리포트 레코드.

use crate::types::{Price, Volume};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// (종목, 거래일)당 한 행의 일별 집계 결과.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyReportRecord {
    /// 종목 식별자 (ISIN)
    pub isin: String,
    /// 거래일
    pub date: NaiveDate,
    /// 시가 (해당일 가장 이른 구간의 시작 가격)
    pub opening_price: Price,
    /// 종가 (해당일 가장 늦은 구간의 시작 가격)
    pub closing_price: Price,
    /// 최저가
    pub min_price: Price,
    /// 최고가
    pub max_price: Price,
    /// 일 거래량
    pub daily_traded_volume: Volume,
    /// 전일 종가 대비 변화율(%). 비교할 전일이 없으면 `None`.
    pub change_prev_close_pct: Option<Decimal>,
}
