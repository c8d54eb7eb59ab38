// tests/integration/dashboard_tests.rs

use crate::common::app_helper::TestApp;
use crate::common::fixtures::{create_member, entry_request, Member, Org};
use chrono::Utc;
use timesheet_backend::domain::period::DateRange;
use timesheet_backend::domain::role_name::RoleName;

struct Seeded {
    emma: Member,
    manager: Member,
    admin: Member,
}

/// 今日付けで承認・却下・提出中・下書きを1件ずつ、前月に下書き1件
async fn seed(app: &TestApp) -> Seeded {
    let org = Org::create(app.conn()).await;
    let db = app.conn();
    let emma = create_member(db, "Emma", "Stone", &[RoleName::Employee], &[org.s1.id], Some(org.alpha.id)).await;
    let manager = create_member(db, "Mark", "Lee", &[RoleName::Manager], &[org.s1.id], None).await;
    let admin = create_member(db, "Ada", "Root", &[RoleName::Admin], &[], None).await;

    let today = Utc::now().date_naive();
    let entries = &app.state.time_entry_service;
    let validation = &app.state.validation_service;

    let mut ids = Vec::new();
    for minutes in [120, 60, 30] {
        let entry = entries
            .create(&emma.actor, entry_request(org.alpha.id, Some(org.s1.id), today, minutes))
            .await
            .unwrap();
        ids.push(entry.id);
    }
    entries.submit(&emma.actor, &ids).await.unwrap();
    validation.approve(&manager.actor, ids[0]).await.unwrap();
    validation
        .reject(&manager.actor, ids[1], "Duplicate")
        .await
        .unwrap();

    entries
        .create(&emma.actor, entry_request(org.alpha.id, None, today, 45))
        .await
        .unwrap();
    entries
        .create(
            &emma.actor,
            entry_request(org.beta.id, None, DateRange::previous_month_of(today).start, 200),
        )
        .await
        .unwrap();

    Seeded {
        emma,
        manager,
        admin,
    }
}

#[tokio::test]
async fn test_employee_block() {
    let app = TestApp::new().await;
    let seeded = seed(&app).await;
    let today = Utc::now().date_naive();

    let dashboard = app
        .state
        .dashboard_service
        .dashboard_on(&seeded.emma.actor, today)
        .await
        .unwrap();

    assert_eq!(dashboard.today, today);
    assert!(dashboard.roles.contains(&"EMPLOYEE".to_string()));
    assert!(dashboard.manager.is_none());
    assert!(dashboard.admin.is_none());

    let employee = dashboard.employee.unwrap();
    assert_eq!(employee.week_minutes, 255);
    assert_eq!(employee.month_minutes, 255);
    assert_eq!(employee.last_month_minutes, 200);
    assert_eq!(employee.week_hours, 4.25);
    assert_eq!(employee.month_status_counts.draft, 1);
    assert_eq!(employee.month_status_counts.submitted, 1);
    assert_eq!(employee.month_status_counts.approved, 1);
    assert_eq!(employee.month_status_counts.rejected, 1);
    assert_eq!(employee.recent_entries.len(), 5);

    // 月曜始まりの7日間、今日に全件
    assert_eq!(employee.week.len(), 7);
    assert_eq!(employee.week[0].date, DateRange::week_of(today).start);
    let day = employee.week.iter().find(|d| d.date == today).unwrap();
    assert_eq!(day.minutes, 255);
    assert_eq!(employee.week.iter().map(|d| d.minutes).sum::<i64>(), 255);
}

#[tokio::test]
async fn test_manager_block() {
    let app = TestApp::new().await;
    let seeded = seed(&app).await;

    let dashboard = app
        .state
        .dashboard_service
        .dashboard(&seeded.manager.actor)
        .await
        .unwrap();

    assert!(dashboard.admin.is_none());
    // マネージャー本人の従業員ブロックも出る
    assert_eq!(dashboard.employee.unwrap().week_minutes, 0);

    let manager = dashboard.manager.unwrap();
    assert_eq!(manager.team_size, 2);
    assert_eq!(manager.pending_validations, 1);
    assert_eq!(manager.approved_this_week, 1);
    assert_eq!(manager.rejected_this_week, 1);
    assert_eq!(manager.latest_pending.len(), 1);
    assert_eq!(manager.latest_pending[0].minutes, 30);
}

#[tokio::test]
async fn test_admin_block() {
    let app = TestApp::new().await;
    let seeded = seed(&app).await;

    let dashboard = app
        .state
        .dashboard_service
        .dashboard(&seeded.admin.actor)
        .await
        .unwrap();

    let admin = dashboard.admin.unwrap();
    assert_eq!(admin.active_employees, 3);
    assert_eq!(admin.users, 3);
    assert_eq!(admin.active_subsidiaries, 2);
    assert_eq!(admin.active_services, 2);
    assert_eq!(admin.entries_this_month, 4);

    // ADMIN は全員を管理する
    assert_eq!(dashboard.manager.unwrap().team_size, 3);
}
