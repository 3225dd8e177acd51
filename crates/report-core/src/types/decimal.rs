//! 리포트 수치 계산을 위한 Decimal 유틸리티.

use rust_decimal::{Decimal, RoundingStrategy};

/// 가격 타입.
pub type Price = Decimal;

/// 거래량 타입.
pub type Volume = i64;

/// 리포트 출력 소수점 자릿수.
pub const REPORT_DECIMAL_PLACES: u32 = 2;

/// Decimal 연산을 위한 확장 트레이트.
pub trait DecimalExt {
    /// 지정된 소수점 자릿수로 반올림합니다 (0.5는 0에서 먼 쪽으로).
    fn round_away(&self, dp: u32) -> Decimal;

    /// `base` 대비 변화율(%)을 계산합니다.
    ///
    /// `base`가 0이거나 계산이 표현 범위를 넘으면 `None`을 반환합니다.
    fn pct_change_from(&self, base: Decimal) -> Option<Decimal>;
}

impl DecimalExt for Decimal {
    fn round_away(&self, dp: u32) -> Decimal {
        self.round_dp_with_strategy(dp, RoundingStrategy::MidpointAwayFromZero)
    }

    fn pct_change_from(&self, base: Decimal) -> Option<Decimal> {
        if base.is_zero() {
            return None;
        }
        self.checked_sub(base)?
            .checked_div(base)?
            .checked_mul(Decimal::ONE_HUNDRED)
    }
}
