// timesheet-backend/src/domain/period.rs

use chrono::{Datelike, Duration, NaiveDate};
use serde::Serialize;

/// 両端を含む日付範囲
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, String> {
        if start > end {
            return Err(format!(
                "start_date ({}) must not be after end_date ({})",
                start, end
            ));
        }
        Ok(Self { start, end })
    }

    /// 指定日を含む月
    pub fn month_of(date: NaiveDate) -> Self {
        let start = first_day_of_month(date.year(), date.month()).unwrap_or(date);
        let end = next_month_start(start)
            .and_then(|next| next.pred_opt())
            .unwrap_or(date);
        Self { start, end }
    }

    /// 指定日を含む週（月曜始まり）
    pub fn week_of(date: NaiveDate) -> Self {
        let offset = i64::from(date.weekday().num_days_from_monday());
        let start = date - Duration::days(offset);
        Self {
            start,
            end: start + Duration::days(6),
        }
    }

    /// 前月
    pub fn previous_month_of(date: NaiveDate) -> Self {
        let this_month = Self::month_of(date);
        match this_month.start.pred_opt() {
            Some(last_day) => Self::month_of(last_day),
            None => this_month,
        }
    }

    /// "YYYY-MM" 形式の月指定を解釈する
    pub fn parse_month(value: &str) -> Result<Self, String> {
        let invalid = || format!("Invalid month '{}'. Expected YYYY-MM", value);

        let (year, month) = value.trim().split_once('-').ok_or_else(invalid)?;
        let year: i32 = year.parse().map_err(|_| invalid())?;
        let month: u32 = month.parse().map_err(|_| invalid())?;
        let start = first_day_of_month(year, month).ok_or_else(invalid)?;

        Ok(Self::month_of(start))
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }

    pub fn days(&self) -> Vec<NaiveDate> {
        self.start
            .iter_days()
            .take_while(|d| *d <= self.end)
            .collect()
    }

    /// "YYYY-MM" 表記（開始日の月）
    pub fn month_label(&self) -> String {
        format!("{:04}-{:02}", self.start.year(), self.start.month())
    }
}

fn first_day_of_month(year: i32, month: u32) -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(year, month, 1)
}

fn next_month_start(start: NaiveDate) -> Option<NaiveDate> {
    if start.month() == 12 {
        first_day_of_month(start.year() + 1, 1)
    } else {
        first_day_of_month(start.year(), start.month() + 1)
    }
}
