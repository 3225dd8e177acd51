//! 원시 체결 레코드.
//!
//! 소스 오브젝트 스토어의 일별 배치 파일 한 행에 해당합니다.
//! 한 행은 하나의 체결 구간(예: 1분)을 나타냅니다.

use crate::types::{Price, Volume};
use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

/// 원시 체결 레코드.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawTradeRecord {
    /// 종목 식별자 (ISIN)
    pub isin: String,
    /// 종목 약칭
    pub mnemonic: String,
    /// 거래일
    pub date: NaiveDate,
    /// 구간 시작 시각
    pub time: NaiveTime,
    /// 구간 시작 가격
    pub start_price: Price,
    /// 구간 종료 가격
    pub end_price: Price,
    /// 구간 최저가
    pub min_price: Price,
    /// 구간 최고가
    pub max_price: Price,
    /// 구간 거래량
    pub traded_volume: Volume,
}
