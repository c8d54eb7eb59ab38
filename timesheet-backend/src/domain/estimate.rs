// timesheet-backend/src/domain/estimate.rs

use crate::domain::rollup::{minutes_to_hours, round_to};
use serde::Serialize;
use uuid::Uuid;

/// 見積もりの1行（従業員単位）
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EstimateLine {
    pub employee_id: Uuid,
    pub minutes: i64,
    pub hours: f64,
    pub rate: f64,
    pub amount: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Estimate {
    pub lines: Vec<EstimateLine>,
    pub total_hours: f64,
    pub total_amount: f64,
    pub employee_count: usize,
}

/// 承認済み分数と時給から見積もりを計算する
///
/// 金額は丸め済みの時間 × 時給。合計は行の金額の和で、合計側では丸め直さない。
pub fn estimate<I>(approved_minutes: I, rate: f64) -> Estimate
where
    I: IntoIterator<Item = (Uuid, i64)>,
{
    let lines: Vec<EstimateLine> = approved_minutes
        .into_iter()
        .map(|(employee_id, minutes)| {
            let hours = minutes_to_hours(minutes);
            EstimateLine {
                employee_id,
                minutes,
                hours,
                rate,
                amount: hours * rate,
            }
        })
        .collect();

    let total_hours = round_to(lines.iter().map(|l| l.hours).sum(), 2);
    let total_amount = lines.iter().map(|l| l.amount).sum();

    Estimate {
        employee_count: lines.len(),
        lines,
        total_hours,
        total_amount,
    }
}

/// 時給として受け付けられる値か
pub fn is_valid_rate(rate: f64) -> bool {
    rate.is_finite() && rate >= 0.0
}
