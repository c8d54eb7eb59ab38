// tests/integration/report_tests.rs

use crate::common::app_helper::TestApp;
use crate::common::fixtures::{create_member, date, entry_request, Member, Org};
use timesheet_backend::api::dto::report_dto::{MinutesDto, ReportQuery, NO_SERVICE_LABEL};
use timesheet_backend::domain::role_name::RoleName;
use timesheet_backend::error::AppError;

fn march_query() -> ReportQuery {
    ReportQuery {
        start_date: Some(date(2024, 3, 1)),
        end_date: Some(date(2024, 3, 31)),
        ..Default::default()
    }
}

fn assert_split_eq(left: &MinutesDto, right: &MinutesDto) {
    assert_eq!(left.total_minutes, right.total_minutes);
    assert_eq!(left.approved_minutes, right.approved_minutes);
    assert_eq!(left.submitted_minutes, right.submitted_minutes);
    assert_eq!(left.draft_minutes, right.draft_minutes);
    assert_eq!(left.rejected_minutes, right.rejected_minutes);
}

fn sum_splits<'a>(splits: impl Iterator<Item = &'a MinutesDto>) -> MinutesDto {
    let mut sum = MinutesDto::default();
    for split in splits {
        sum.total_minutes += split.total_minutes;
        sum.approved_minutes += split.approved_minutes;
        sum.submitted_minutes += split.submitted_minutes;
        sum.draft_minutes += split.draft_minutes;
        sum.rejected_minutes += split.rejected_minutes;
    }
    sum
}

struct Seeded {
    org: Org,
    emma: Member,
    omar: Member,
    manager: Member,
}

/// 2人の従業員が子会社・サービス・状態をまたいで入力した3月のデータ
async fn seed(app: &TestApp) -> Seeded {
    let org = Org::create(app.conn()).await;
    let emma = create_member(
        app.conn(),
        "Emma",
        "Stone",
        &[RoleName::Employee],
        &[org.s1.id],
        Some(org.alpha.id),
    )
    .await;
    let omar = create_member(
        app.conn(),
        "Omar",
        "Haddad",
        &[RoleName::Employee],
        &[org.s1.id],
        Some(org.beta.id),
    )
    .await;
    let manager = create_member(app.conn(), "Mark", "Lee", &[RoleName::Manager], &[org.s1.id], None).await;

    let entries = &app.state.time_entry_service;
    let validation = &app.state.validation_service;

    // Emma: alpha/s1 承認, alpha/s2 却下, alpha/サービスなし 下書き
    let approved = entries
        .create(&emma.actor, entry_request(org.alpha.id, Some(org.s1.id), date(2024, 3, 4), 240))
        .await
        .unwrap();
    let rejected = entries
        .create(&emma.actor, entry_request(org.alpha.id, Some(org.s2.id), date(2024, 3, 5), 90))
        .await
        .unwrap();
    entries.submit(&emma.actor, &[approved.id, rejected.id]).await.unwrap();
    validation.approve(&manager.actor, approved.id).await.unwrap();
    validation
        .reject(&manager.actor, rejected.id, "wrong service")
        .await
        .unwrap();
    entries
        .create(&emma.actor, entry_request(org.alpha.id, None, date(2024, 3, 6), 45))
        .await
        .unwrap();

    // Omar: beta/s1 提出中, alpha/s1 提出中
    let first = entries
        .create(&omar.actor, entry_request(org.beta.id, Some(org.s1.id), date(2024, 3, 7), 300))
        .await
        .unwrap();
    let second = entries
        .create(&omar.actor, entry_request(org.alpha.id, Some(org.s1.id), date(2024, 3, 8), 60))
        .await
        .unwrap();
    entries.submit(&omar.actor, &[first.id, second.id]).await.unwrap();

    // 期間外
    entries
        .create(&omar.actor, entry_request(org.beta.id, Some(org.s2.id), date(2024, 4, 1), 480))
        .await
        .unwrap();

    Seeded {
        org,
        emma,
        omar,
        manager,
    }
}

#[tokio::test]
async fn test_rollups_sum_consistently() {
    let app = TestApp::new().await;
    let seeded = seed(&app).await;

    let report = app
        .state
        .report_service
        .full_report(&seeded.manager.actor, march_query())
        .await
        .unwrap();

    // 却下分も合計に含む
    assert_eq!(report.totals.total_minutes, 240 + 90 + 45 + 300 + 60);
    assert_eq!(report.totals.approved_minutes, 240);
    assert_eq!(report.totals.submitted_minutes, 360);
    assert_eq!(report.totals.draft_minutes, 45);
    assert_eq!(report.totals.rejected_minutes, 90);
    assert_eq!(report.totals.pending_minutes, 360 + 45);

    // 子会社の合計 == 全体
    assert_split_eq(&sum_splits(report.by_subsidiary.iter().map(|s| &s.minutes)), &report.totals);

    // 子会社内のサービス別合計 == 子会社の合計
    for subsidiary in &report.by_subsidiary {
        assert_split_eq(
            &sum_splits(subsidiary.services.iter().map(|s| &s.minutes)),
            &subsidiary.minutes,
        );
    }

    // サービス別の合計 == 全体
    assert_split_eq(&sum_splits(report.by_service.iter().map(|s| &s.minutes)), &report.totals);

    // 名前順、サービスなしは最後
    let names: Vec<&str> = report
        .by_subsidiary
        .iter()
        .map(|s| s.subsidiary_name.as_str())
        .collect();
    assert_eq!(names, vec!["Alpha Corp", "Beta Inc"]);
    assert_eq!(
        report.by_service.last().unwrap().service_name,
        NO_SERVICE_LABEL
    );
    assert!(report.by_service.last().unwrap().service_id.is_none());

    let alpha = &report.by_subsidiary[0];
    assert_eq!(alpha.subsidiary_id, seeded.org.alpha.id);
    assert_eq!(alpha.minutes.total_minutes, 240 + 90 + 45 + 60);
}

#[tokio::test]
async fn test_employee_rollups_and_table() {
    let app = TestApp::new().await;
    let seeded = seed(&app).await;

    let report = app
        .state
        .report_service
        .full_report(&seeded.manager.actor, march_query())
        .await
        .unwrap();

    // 管理範囲の従業員は入力がなくても並ぶ
    assert_eq!(report.employees.pagination.total_count, 3);
    let omar = report
        .employees
        .items
        .iter()
        .find(|e| e.employee_id == seeded.omar.employee_id())
        .unwrap();
    assert_eq!(omar.minutes.total_minutes, 360);
    assert_eq!(omar.subsidiary_name.as_deref(), Some("Beta Inc"));
    assert_eq!(omar.service_names, "Consulting");
    assert_eq!(omar.subsidiaries.len(), 2);

    let employee_total: i64 = report
        .employees
        .items
        .iter()
        .map(|e| e.minutes.total_minutes)
        .sum();
    assert_eq!(employee_total, report.totals.total_minutes);

    // Emma×Alpha, Omar×Alpha, Omar×Beta
    assert_eq!(report.table.len(), 3);
    let table_total: i64 = report.table.iter().map(|r| r.total_minutes).sum();
    assert_eq!(table_total, report.totals.total_minutes);
    assert_eq!(report.table[0].employee_name, "Haddad Omar");
    assert_eq!(report.table[0].subsidiary_name, "Alpha Corp");

    let personal = report.personal.unwrap();
    assert_eq!(personal.employee_id, seeded.manager.employee_id());
    assert_eq!(personal.totals.total_minutes, 0);
}

#[tokio::test]
async fn test_employee_sees_only_own_time() {
    let app = TestApp::new().await;
    let seeded = seed(&app).await;

    let report = app
        .state
        .report_service
        .full_report(&seeded.emma.actor, march_query())
        .await
        .unwrap();

    assert_eq!(report.totals.total_minutes, 240 + 90 + 45);
    assert_eq!(report.employees.items.len(), 1);
    assert_eq!(report.employees.items[0].employee_id, seeded.emma.employee_id());
    assert_eq!(report.personal.unwrap().totals.total_minutes, 375);
}

#[tokio::test]
async fn test_filters_and_sections_agree() {
    let app = TestApp::new().await;
    let seeded = seed(&app).await;
    let service = &app.state.report_service;

    let filtered = ReportQuery {
        subsidiary_id: Some(seeded.org.beta.id),
        ..march_query()
    };
    let subsidiaries = service
        .subsidiaries(&seeded.manager.actor, filtered.clone())
        .await
        .unwrap();
    assert_eq!(subsidiaries.subsidiaries.len(), 1);
    assert_eq!(subsidiaries.totals.total_minutes, 300);

    let services = service
        .services(&seeded.manager.actor, march_query())
        .await
        .unwrap();
    let full = service
        .subsidiaries(&seeded.manager.actor, march_query())
        .await
        .unwrap();
    assert_split_eq(&services.totals, &full.totals);

    let searched = service
        .employees(
            &seeded.manager.actor,
            ReportQuery {
                search: Some("Hadd".to_string()),
                ..march_query()
            },
        )
        .await
        .unwrap();
    assert_eq!(searched.employees.items.len(), 1);
    assert_eq!(searched.employees.items[0].employee_id, seeded.omar.employee_id());
}

#[tokio::test]
async fn test_empty_scope_returns_zeroed_rollups() {
    let app = TestApp::new().await;
    let seeded = seed(&app).await;

    let report = app
        .state
        .report_service
        .full_report(
            &seeded.manager.actor,
            ReportQuery {
                start_date: Some(date(2023, 1, 1)),
                end_date: Some(date(2023, 1, 31)),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    assert_eq!(report.totals.total_minutes, 0);
    assert!(report.by_subsidiary.is_empty());
    assert!(report.by_service.is_empty());
    assert!(report.table.is_empty());
}

#[tokio::test]
async fn test_page_beyond_range_returns_empty_employee_page() {
    let app = TestApp::new().await;
    let seeded = seed(&app).await;

    let report = app
        .state
        .report_service
        .employees(
            &seeded.manager.actor,
            ReportQuery {
                page: Some(u64::MAX),
                ..march_query()
            },
        )
        .await
        .unwrap();

    assert!(report.employees.items.is_empty());
    assert_eq!(report.employees.pagination.total_count, 3);
    assert!(!report.employees.pagination.has_next);
}

#[tokio::test]
async fn test_inverted_range_is_rejected() {
    let app = TestApp::new().await;
    let seeded = seed(&app).await;

    let err = app
        .state
        .report_service
        .full_report(
            &seeded.manager.actor,
            ReportQuery {
                start_date: Some(date(2024, 3, 31)),
                end_date: Some(date(2024, 3, 1)),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::ValidationError(_)));
}
