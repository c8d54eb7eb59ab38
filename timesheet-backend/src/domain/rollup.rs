// timesheet-backend/src/domain/rollup.rs

//! 分単位の集計エンジン
//!
//! 1回のクエリで取得したエントリー行を Rust 側で畳み込む。すべての集計形が
//! 同じスナップショットから計算されるため、サービス別合計と子会社合計、
//! 子会社合計と全体合計は常に一致する。

use crate::domain::time_entry_status::TimeEntryStatus;
use chrono::NaiveDate;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use std::ops::AddAssign;
use uuid::Uuid;

/// 集計対象となるエントリー1行分の事実
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryFact {
    pub employee_id: Uuid,
    pub subsidiary_id: Uuid,
    pub service_id: Option<Uuid>,
    pub work_date: NaiveDate,
    pub minutes: i64,
    pub status: TimeEntryStatus,
}

/// ステータス別の分数内訳。total は4区分の合計
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct MinuteSplit {
    pub total: i64,
    pub approved: i64,
    pub submitted: i64,
    pub draft: i64,
    pub rejected: i64,
}

impl MinuteSplit {
    pub fn record(&mut self, status: TimeEntryStatus, minutes: i64) {
        self.total += minutes;
        match status {
            TimeEntryStatus::Approved => self.approved += minutes,
            TimeEntryStatus::Submitted => self.submitted += minutes,
            TimeEntryStatus::Draft => self.draft += minutes,
            TimeEntryStatus::Rejected => self.rejected += minutes,
        }
    }

    /// 未承認（提出済み + 下書き）
    pub fn pending(&self) -> i64 {
        self.submitted + self.draft
    }

    pub fn of_status(&self, status: TimeEntryStatus) -> i64 {
        match status {
            TimeEntryStatus::Approved => self.approved,
            TimeEntryStatus::Submitted => self.submitted,
            TimeEntryStatus::Draft => self.draft,
            TimeEntryStatus::Rejected => self.rejected,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.total == 0
    }
}

impl AddAssign for MinuteSplit {
    fn add_assign(&mut self, other: Self) {
        self.total += other.total;
        self.approved += other.approved;
        self.submitted += other.submitted;
        self.draft += other.draft;
        self.rejected += other.rejected;
    }
}

/// サービス単位の集計。service_id が None のものは「サービスなし」
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ServiceBucket {
    pub service_id: Option<Uuid>,
    pub minutes: MinuteSplit,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SubsidiaryBucket {
    pub subsidiary_id: Uuid,
    pub minutes: MinuteSplit,
    pub services: Vec<ServiceBucket>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SubsidiaryCell {
    pub subsidiary_id: Uuid,
    pub minutes: MinuteSplit,
}

/// サービス軸の集計。子会社ごとの内訳を持つ
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ServiceRollup {
    pub service_id: Option<Uuid>,
    pub minutes: MinuteSplit,
    pub subsidiaries: Vec<SubsidiaryCell>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EmployeeBucket {
    pub employee_id: Uuid,
    pub minutes: MinuteSplit,
    pub subsidiaries: Vec<SubsidiaryBucket>,
}

/// 従業員 × 子会社 の1セル
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EmployeeSubsidiaryCell {
    pub employee_id: Uuid,
    pub subsidiary_id: Uuid,
    pub minutes: MinuteSplit,
}

/// 承認済み時間のある子会社の概要
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ApprovedSubsidiarySummary {
    pub subsidiary_id: Uuid,
    pub approved_minutes: i64,
    pub employee_count: usize,
}

fn fold_by<K, F>(facts: &[EntryFact], key: F) -> BTreeMap<K, MinuteSplit>
where
    K: Ord,
    F: Fn(&EntryFact) -> K,
{
    let mut groups: BTreeMap<K, MinuteSplit> = BTreeMap::new();
    for fact in facts {
        groups
            .entry(key(fact))
            .or_default()
            .record(fact.status, fact.minutes);
    }
    groups
}

/// 条件全体の合計
pub fn flat_total(facts: &[EntryFact]) -> MinuteSplit {
    let mut total = MinuteSplit::default();
    for fact in facts {
        total.record(fact.status, fact.minutes);
    }
    total
}

/// 子会社別の集計（サービス別内訳付き）
pub fn by_subsidiary(facts: &[EntryFact]) -> Vec<SubsidiaryBucket> {
    let cells = fold_by(facts, |f| (f.subsidiary_id, f.service_id));

    let mut buckets: Vec<SubsidiaryBucket> = Vec::new();
    for ((subsidiary_id, service_id), minutes) in cells {
        if minutes.is_empty() {
            continue;
        }
        match buckets.last_mut() {
            Some(bucket) if bucket.subsidiary_id == subsidiary_id => {
                bucket.minutes += minutes;
                bucket.services.push(ServiceBucket {
                    service_id,
                    minutes,
                });
            }
            _ => buckets.push(SubsidiaryBucket {
                subsidiary_id,
                minutes,
                services: vec![ServiceBucket {
                    service_id,
                    minutes,
                }],
            }),
        }
    }
    buckets
}

/// サービス別の集計（子会社別内訳付き）
pub fn by_service(facts: &[EntryFact]) -> Vec<ServiceRollup> {
    let cells = fold_by(facts, |f| (f.service_id, f.subsidiary_id));

    let mut rollups: Vec<ServiceRollup> = Vec::new();
    for ((service_id, subsidiary_id), minutes) in cells {
        if minutes.is_empty() {
            continue;
        }
        match rollups.last_mut() {
            Some(rollup) if rollup.service_id == service_id => {
                rollup.minutes += minutes;
                rollup.subsidiaries.push(SubsidiaryCell {
                    subsidiary_id,
                    minutes,
                });
            }
            _ => rollups.push(ServiceRollup {
                service_id,
                minutes,
                subsidiaries: vec![SubsidiaryCell {
                    subsidiary_id,
                    minutes,
                }],
            }),
        }
    }
    rollups
}

/// 従業員別の集計
///
/// `employee_ids` に含まれる従業員は、該当エントリーがなくてもゼロで返す。
pub fn by_employee(
    facts: &[EntryFact],
    employee_ids: &BTreeSet<Uuid>,
) -> BTreeMap<Uuid, EmployeeBucket> {
    let mut per_employee: BTreeMap<Uuid, Vec<EntryFact>> = employee_ids
        .iter()
        .map(|id| (*id, Vec::new()))
        .collect();

    for fact in facts {
        per_employee
            .entry(fact.employee_id)
            .or_default()
            .push(fact.clone());
    }

    per_employee
        .into_iter()
        .map(|(employee_id, own)| {
            let bucket = EmployeeBucket {
                employee_id,
                minutes: flat_total(&own),
                subsidiaries: by_subsidiary(&own),
            };
            (employee_id, bucket)
        })
        .collect()
}

/// 従業員 × 子会社 の表形式
pub fn by_employee_subsidiary(facts: &[EntryFact]) -> Vec<EmployeeSubsidiaryCell> {
    fold_by(facts, |f| (f.employee_id, f.subsidiary_id))
        .into_iter()
        .filter(|(_, minutes)| !minutes.is_empty())
        .map(|((employee_id, subsidiary_id), minutes)| EmployeeSubsidiaryCell {
            employee_id,
            subsidiary_id,
            minutes,
        })
        .collect()
}

/// 日別の合計分数
pub fn by_day(facts: &[EntryFact]) -> BTreeMap<NaiveDate, i64> {
    let mut days: BTreeMap<NaiveDate, i64> = BTreeMap::new();
    for fact in facts {
        *days.entry(fact.work_date).or_default() += fact.minutes;
    }
    days
}

/// 指定子会社における従業員別の承認済み分数
pub fn approved_by_employee(facts: &[EntryFact], subsidiary_id: Uuid) -> BTreeMap<Uuid, i64> {
    let mut minutes: BTreeMap<Uuid, i64> = BTreeMap::new();
    for fact in facts
        .iter()
        .filter(|f| f.subsidiary_id == subsidiary_id && f.status == TimeEntryStatus::Approved)
    {
        *minutes.entry(fact.employee_id).or_default() += fact.minutes;
    }
    minutes
}

/// 承認済み時間のある子会社ごとの合計と貢献した従業員数
pub fn approved_subsidiary_summaries(facts: &[EntryFact]) -> Vec<ApprovedSubsidiarySummary> {
    let mut groups: BTreeMap<Uuid, (i64, BTreeSet<Uuid>)> = BTreeMap::new();
    for fact in facts
        .iter()
        .filter(|f| f.status == TimeEntryStatus::Approved)
    {
        let (minutes, employees) = groups.entry(fact.subsidiary_id).or_default();
        *minutes += fact.minutes;
        employees.insert(fact.employee_id);
    }

    groups
        .into_iter()
        .filter(|(_, (minutes, _))| *minutes > 0)
        .map(
            |(subsidiary_id, (approved_minutes, employees))| ApprovedSubsidiarySummary {
                subsidiary_id,
                approved_minutes,
                employee_count: employees.len(),
            },
        )
        .collect()
}

/// 分を時間に変換（小数第2位で丸め）
pub fn minutes_to_hours(minutes: i64) -> f64 {
    round_to(minutes as f64 / 60.0, 2)
}

pub fn round_to(value: f64, digits: i32) -> f64 {
    let factor = 10f64.powi(digits);
    (value * factor).round() / factor
}
