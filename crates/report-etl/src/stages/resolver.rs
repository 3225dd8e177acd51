//! 추출 일자 범위 결정.
//!
//! 요청된 시작일과 워터마크 이력으로부터 이번 실행에서 읽을 소스 일자를
//! 결정합니다. 후보 구간은 `[start - 1일, today]`이며, 시작일 전날은
//! 첫 날의 전일 종가 대비 변화율 계산을 위한 시드 일자입니다.
//! 시드 일자는 이미 처리된 일자일 때만 리포트에 포함됩니다.

use chrono::{Days, NaiveDate};
use report_core::WatermarkHistory;
use serde::{Deserialize, Serialize};

/// "처리할 일자 없음"을 나타내는 먼 미래 날짜.
pub const NOTHING_TO_DO: NaiveDate = match NaiveDate::from_ymd_opt(2200, 1, 1) {
    Some(date) => date,
    None => NaiveDate::MAX,
};

/// 추출 계획.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractionPlan {
    /// 추출 범위의 첫 일자
    pub extract_from: NaiveDate,
    /// 전일 종가 계산용 시드 일자
    pub seed_date: Option<NaiveDate>,
    /// 리포트와 워터마크에 포함할 첫 일자 (이전 일자는 집계 후 버림)
    pub report_from: NaiveDate,
    /// 소스에서 읽을 일자 (오름차순)
    pub candidate_dates: Vec<NaiveDate>,
}

impl ExtractionPlan {
    /// 처리할 일자가 없는 계획.
    pub fn nothing_to_do() -> Self {
        Self {
            extract_from: NOTHING_TO_DO,
            seed_date: None,
            report_from: NOTHING_TO_DO,
            candidate_dates: Vec::new(),
        }
    }

    pub fn is_nothing_to_do(&self) -> bool {
        self.candidate_dates.is_empty()
    }
}

/// 추출 계획을 결정합니다.
///
/// - 이력 없음: `start`부터 리포트, 후보는 전체 구간
/// - 미처리 일자 있음: 가장 이른 미처리 일자의 전날부터 추출.
///   그 전날이 처리된 일자면 함께 리포트하고, 아니면 미처리 일자부터 리포트
/// - 모두 처리됨: [`ExtractionPlan::nothing_to_do`]
pub fn resolve(
    start: NaiveDate,
    history: Option<&WatermarkHistory>,
    today: NaiveDate,
) -> ExtractionPlan {
    let Some(window_start) = start.checked_sub_days(Days::new(1)) else {
        return ExtractionPlan::nothing_to_do();
    };
    if window_start > today {
        return ExtractionPlan::nothing_to_do();
    }
    let window: Vec<NaiveDate> = window_start
        .iter_days()
        .take_while(|d| *d <= today)
        .collect();

    let history = match history {
        Some(history) if !history.is_empty() => history,
        _ => {
            return ExtractionPlan {
                extract_from: start,
                seed_date: Some(window_start),
                report_from: start,
                candidate_dates: window,
            }
        }
    };

    let processed = history.processed_dates();
    let Some(first_missing) = window.iter().skip(1).find(|d| !processed.contains(d)).copied()
    else {
        return ExtractionPlan::nothing_to_do();
    };
    let Some(seed) = first_missing.pred_opt() else {
        return ExtractionPlan::nothing_to_do();
    };
    let report_from = if processed.contains(&seed) {
        seed
    } else {
        first_missing
    };

    ExtractionPlan {
        extract_from: seed,
        seed_date: Some(seed),
        report_from,
        candidate_dates: window.into_iter().filter(|d| *d >= seed).collect(),
    }
}
