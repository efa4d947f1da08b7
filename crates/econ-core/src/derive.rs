//! 파생 지표 계산.
//!
//! 병합 중/후에 적용되는 순수 함수들입니다. 입력이 모두 존재하고 분모가
//! 0이 아닐 때만 값을 반환하며, 그 외에는 None (0도 NaN도 아님)을
//! 반환합니다.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use crate::domain::record::BeatMissMet;

/// 전기 대비 변동 계산.
///
/// 반환: `(변동 절대값 소수 4자리, 변동률 % 소수 2자리)`.
/// 기준값이 0이면 None (0으로 나누기 방지).
pub fn change(current: Decimal, previous: Decimal) -> Option<(Decimal, Decimal)> {
    if previous.is_zero() {
        return None;
    }
    let delta = (current - previous).round_dp(4);
    let pct = (delta / previous * dec!(100)).round_dp(2);
    Some((delta, pct))
}

/// 컨센서스 대비 서프라이즈 계산.
///
/// 반환: `(서프라이즈 소수 4자리, 서프라이즈 비율 % 소수 2자리)`.
/// 예상치가 0이면 None.
pub fn surprise(actual: Decimal, estimate: Decimal) -> Option<(Decimal, Decimal)> {
    if estimate.is_zero() {
        return None;
    }
    let diff = (actual - estimate).round_dp(4);
    let pct = (diff / estimate * dec!(100)).round_dp(2);
    Some((diff, pct))
}

/// 서프라이즈 분류. 정확히 0이면 "met".
pub fn classify_surprise(surprise: Decimal) -> BeatMissMet {
    if surprise > Decimal::ZERO {
        BeatMissMet::Beat
    } else if surprise < Decimal::ZERO {
        BeatMissMet::Miss
    } else {
        BeatMissMet::Met
    }
}

/// 마진 비율 (분자/매출, 소수 4자리). 매출이 0이면 None.
pub fn margin(numerator: Decimal, revenue: Decimal) -> Option<Decimal> {
    if revenue.is_zero() {
        return None;
    }
    Some((numerator / revenue).round_dp(4))
}
