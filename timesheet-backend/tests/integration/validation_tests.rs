// tests/integration/validation_tests.rs

use crate::common::app_helper::TestApp;
use crate::common::fixtures::{create_bare_user, create_member, date, entry_request, Member, Org};
use timesheet_backend::api::dto::validation_dto::{
    EmployeeEntriesQuery, StatusFilter, ValidationQuery,
};
use timesheet_backend::domain::role_name::RoleName;
use timesheet_backend::domain::time_entry_status::TimeEntryStatus;
use timesheet_backend::error::AppError;
use timesheet_backend::repository::time_entry_repository::TimeEntryRepository;
use uuid::Uuid;

/// E が 2024-03-01 に合計500分の下書きを2件作り提出する
async fn submit_two_entries(app: &TestApp, org: &Org, emp: &Member) -> Vec<Uuid> {
    let service = &app.state.time_entry_service;
    let mut ids = Vec::new();
    for minutes in [240, 260] {
        let entry = service
            .create(
                &emp.actor,
                entry_request(org.alpha.id, Some(org.s1.id), date(2024, 3, 1), minutes),
            )
            .await
            .unwrap();
        ids.push(entry.id);
    }
    let submitted = service.submit(&emp.actor, &ids).await.unwrap();
    assert_eq!(submitted.submitted_count, 2);
    ids
}

async fn status_of(app: &TestApp, id: Uuid) -> TimeEntryStatus {
    TimeEntryRepository::new(app.conn().clone())
        .find_by_id(id)
        .await
        .unwrap()
        .unwrap()
        .get_status()
}

#[tokio::test]
async fn test_bulk_approve_same_service_manager() {
    let app = TestApp::new().await;
    let org = Org::create(app.conn()).await;
    let emp = create_member(app.conn(), "Emma", "Stone", &[RoleName::Employee], &[org.s1.id], None).await;
    let manager = create_member(app.conn(), "Mark", "Lee", &[RoleName::Manager], &[org.s1.id], None).await;

    let ids = submit_two_entries(&app, &org, &emp).await;

    let result = app
        .state
        .validation_service
        .bulk_approve(&manager.actor, &ids)
        .await
        .unwrap();
    assert_eq!(result.approved_count, 2);

    let repo = TimeEntryRepository::new(app.conn().clone());
    for entry in repo.find_by_ids(&ids).await.unwrap() {
        assert_eq!(entry.get_status(), TimeEntryStatus::Approved);
        assert_eq!(entry.approved_by, Some(manager.user.id));
        assert!(entry.approved_at.is_some());
        assert!(entry.submitted_at.is_some());
    }

    // 所有者への通知は1件
    let inbox = app
        .state
        .notification_service
        .list(emp.user.id, 20)
        .await
        .unwrap();
    assert_eq!(inbox.total, 1);
    assert_eq!(inbox.notifications[0].notification_type, "TASK_APPROVED");
    assert!(inbox.notifications[0].message.contains("2 entry(ies)"));
    assert_eq!(app.sink.deliveries_to(&emp.user.email).len(), 1);
}

#[tokio::test]
async fn test_manager_of_disjoint_service_cannot_approve() {
    let app = TestApp::new().await;
    let org = Org::create(app.conn()).await;
    let emp = create_member(app.conn(), "Emma", "Stone", &[RoleName::Employee], &[org.s1.id], None).await;
    let outsider = create_member(app.conn(), "Nina", "Park", &[RoleName::Manager], &[org.s2.id], None).await;

    let ids = submit_two_entries(&app, &org, &emp).await;

    let err = app
        .state
        .validation_service
        .approve(&outsider.actor, ids[0])
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Forbidden(_)));
    assert_eq!(status_of(&app, ids[0]).await, TimeEntryStatus::Submitted);

    // 一括承認では黙って除外される
    let result = app
        .state
        .validation_service
        .bulk_approve(&outsider.actor, &ids)
        .await
        .unwrap();
    assert_eq!(result.approved_count, 0);
    assert_eq!(status_of(&app, ids[1]).await, TimeEntryStatus::Submitted);
}

#[tokio::test]
async fn test_reject_then_owner_edit_returns_to_draft() {
    let app = TestApp::new().await;
    let org = Org::create(app.conn()).await;
    let emp = create_member(app.conn(), "Emma", "Stone", &[RoleName::Employee], &[org.s1.id], None).await;
    let manager = create_member(app.conn(), "Mark", "Lee", &[RoleName::Manager], &[org.s1.id], None).await;

    let ids = submit_two_entries(&app, &org, &emp).await;

    let rejected = app
        .state
        .validation_service
        .reject(&manager.actor, ids[0], "incomplete description")
        .await
        .unwrap();
    assert_eq!(rejected.status, TimeEntryStatus::Rejected);
    assert_eq!(
        rejected.rejection_reason.as_deref(),
        Some("incomplete description")
    );
    assert!(rejected.approved_by.is_none());

    let inbox = app
        .state
        .notification_service
        .list(emp.user.id, 20)
        .await
        .unwrap();
    assert_eq!(inbox.notifications[0].notification_type, "TASK_REJECTED");
    assert!(inbox.notifications[0]
        .message
        .contains("incomplete description"));

    let edited = app
        .state
        .time_entry_service
        .update(
            &emp.actor,
            ids[0],
            entry_request(org.alpha.id, Some(org.s1.id), date(2024, 3, 1), 300),
        )
        .await
        .unwrap();
    assert_eq!(edited.status, TimeEntryStatus::Draft);
    assert!(edited.rejection_reason.is_none());
    assert_eq!(edited.minutes, 300);
}

#[tokio::test]
async fn test_reject_requires_reason_before_any_change() {
    let app = TestApp::new().await;
    let org = Org::create(app.conn()).await;
    let emp = create_member(app.conn(), "Emma", "Stone", &[RoleName::Employee], &[org.s1.id], None).await;
    let manager = create_member(app.conn(), "Mark", "Lee", &[RoleName::Manager], &[org.s1.id], None).await;

    let ids = submit_two_entries(&app, &org, &emp).await;
    let service = &app.state.validation_service;

    let too_long = "x".repeat(501);
    for reason in ["", "   ", too_long.as_str()] {
        let err = service
            .reject(&manager.actor, ids[0], reason)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::ValidationError(_)));
    }
    assert_eq!(status_of(&app, ids[0]).await, TimeEntryStatus::Submitted);

    // 前後の空白は取り除かれる
    let rejected = service
        .reject(&manager.actor, ids[0], "  missing ticket  ")
        .await
        .unwrap();
    assert_eq!(rejected.rejection_reason.as_deref(), Some("missing ticket"));
}

#[tokio::test]
async fn test_bulk_approve_counts_only_submitted_entries() {
    let app = TestApp::new().await;
    let org = Org::create(app.conn()).await;
    let emp = create_member(app.conn(), "Emma", "Stone", &[RoleName::Employee], &[org.s1.id], None).await;
    let manager = create_member(app.conn(), "Mark", "Lee", &[RoleName::Manager], &[org.s1.id], None).await;

    let ids = submit_two_entries(&app, &org, &emp).await;
    let draft = app
        .state
        .time_entry_service
        .create(&emp.actor, entry_request(org.alpha.id, None, date(2024, 3, 2), 30))
        .await
        .unwrap();

    app.state
        .validation_service
        .approve(&manager.actor, ids[0])
        .await
        .unwrap();

    let result = app
        .state
        .validation_service
        .bulk_approve(&manager.actor, &[ids[0], ids[1], draft.id, Uuid::new_v4()])
        .await
        .unwrap();
    assert_eq!(result.approved_count, 1);
    assert_eq!(status_of(&app, ids[1]).await, TimeEntryStatus::Approved);
    assert_eq!(status_of(&app, draft.id).await, TimeEntryStatus::Draft);
}

#[tokio::test]
async fn test_approve_requires_submitted_status() {
    let app = TestApp::new().await;
    let org = Org::create(app.conn()).await;
    let emp = create_member(app.conn(), "Emma", "Stone", &[RoleName::Employee], &[org.s1.id], None).await;
    let manager = create_member(app.conn(), "Mark", "Lee", &[RoleName::Manager], &[org.s1.id], None).await;

    let draft = app
        .state
        .time_entry_service
        .create(&emp.actor, entry_request(org.alpha.id, None, date(2024, 3, 2), 30))
        .await
        .unwrap();

    let err = app
        .state
        .validation_service
        .approve(&manager.actor, draft.id)
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        AppError::InvalidTransition {
            from: TimeEntryStatus::Draft,
            to: TimeEntryStatus::Approved
        }
    ));

    let err = app
        .state
        .validation_service
        .approve(&manager.actor, Uuid::new_v4())
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));
}

#[tokio::test]
async fn test_employee_and_empty_manager_cannot_review() {
    let app = TestApp::new().await;
    let org = Org::create(app.conn()).await;
    let emp = create_member(app.conn(), "Emma", "Stone", &[RoleName::Employee], &[org.s1.id], None).await;
    let peer = create_member(app.conn(), "Olga", "Ivanova", &[RoleName::Employee], &[org.s1.id], None).await;
    let (_, lonely_manager) =
        create_bare_user(app.conn(), "lonely@example.com", &[RoleName::Manager]).await;

    let ids = submit_two_entries(&app, &org, &emp).await;

    let err = app
        .state
        .validation_service
        .approve(&peer.actor, ids[0])
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Forbidden(_)));

    // 従業員レコードのない MANAGER は誰も管理しない
    let err = app
        .state
        .validation_service
        .approve(&lonely_manager, ids[0])
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Forbidden(_)));

    let index = app
        .state
        .validation_service
        .index(&lonely_manager, ValidationQuery::default())
        .await
        .unwrap();
    assert_eq!(index.employees.pagination.total_count, 0);
}

#[tokio::test]
async fn test_admin_reviews_any_employee() {
    let app = TestApp::new().await;
    let org = Org::create(app.conn()).await;
    let emp = create_member(app.conn(), "Emma", "Stone", &[RoleName::Employee], &[org.s2.id], None).await;
    let (_, admin) = create_bare_user(app.conn(), "admin@example.com", &[RoleName::Admin]).await;

    let ids = submit_two_entries(&app, &org, &emp).await;

    let result = app
        .state
        .validation_service
        .bulk_approve(&admin, &ids)
        .await
        .unwrap();
    assert_eq!(result.approved_count, 2);

    let err = app
        .state
        .validation_service
        .bulk_approve(&admin, &[])
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::ValidationError(_)));
}

#[tokio::test]
async fn test_index_and_show_list_managed_employees() {
    let app = TestApp::new().await;
    let org = Org::create(app.conn()).await;
    let emp = create_member(app.conn(), "Emma", "Stone", &[RoleName::Employee], &[org.s1.id], None).await;
    let outsider = create_member(app.conn(), "Otto", "Berg", &[RoleName::Employee], &[org.s2.id], None).await;
    let manager = create_member(app.conn(), "Mark", "Lee", &[RoleName::Manager], &[org.s1.id], None).await;

    submit_two_entries(&app, &org, &emp).await;
    submit_two_entries(&app, &org, &outsider).await;

    let index = app
        .state
        .validation_service
        .index(&manager.actor, ValidationQuery::default())
        .await
        .unwrap();
    assert_eq!(index.status, StatusFilter::Submitted);
    assert_eq!(index.employees.items.len(), 1);
    assert_eq!(index.employees.items[0].employee_id, emp.employee_id());
    assert_eq!(index.employees.items[0].entries_count, 2);
    assert_eq!(index.employees.items[0].name, "Stone Emma");

    let detail = app
        .state
        .validation_service
        .show(
            &manager.actor,
            emp.employee_id(),
            EmployeeEntriesQuery {
                month: Some("2024-03".to_string()),
            },
        )
        .await
        .unwrap();
    assert_eq!(detail.entries.len(), 2);
    assert_eq!(detail.total_minutes, 500);
    assert_eq!(detail.submitted_minutes, 500);
    assert_eq!(detail.approved_minutes, 0);

    let err = app
        .state
        .validation_service
        .show(
            &manager.actor,
            outsider.employee_id(),
            EmployeeEntriesQuery::default(),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Forbidden(_)));
}

#[tokio::test]
async fn test_bulk_approve_skips_owners_outside_scope() {
    let app = TestApp::new().await;
    let org = Org::create(app.conn()).await;
    let emp = create_member(app.conn(), "Emma", "Stone", &[RoleName::Employee], &[org.s1.id], None).await;
    let outsider = create_member(app.conn(), "Otto", "Berg", &[RoleName::Employee], &[org.s2.id], None).await;
    let manager = create_member(app.conn(), "Mark", "Lee", &[RoleName::Manager], &[org.s1.id], None).await;

    let own = submit_two_entries(&app, &org, &emp).await;
    let foreign = submit_two_entries(&app, &org, &outsider).await;
    let batch: Vec<Uuid> = own.iter().chain(foreign.iter()).copied().collect();

    let result = app
        .state
        .validation_service
        .bulk_approve(&manager.actor, &batch)
        .await
        .unwrap();
    assert_eq!(result.approved_count, 2);

    for id in &own {
        assert_eq!(status_of(&app, *id).await, TimeEntryStatus::Approved);
    }
    for id in &foreign {
        assert_eq!(status_of(&app, *id).await, TimeEntryStatus::Submitted);
    }

    // 範囲外の所有者には通知しない
    let inbox = app
        .state
        .notification_service
        .list(outsider.user.id, 20)
        .await
        .unwrap();
    assert!(inbox
        .notifications
        .iter()
        .all(|n| n.notification_type != "TASK_APPROVED"));
}

#[tokio::test]
async fn test_overlapping_bulk_approvals_approve_each_entry_once() {
    let app = TestApp::new().await;
    let org = Org::create(app.conn()).await;
    let emp = create_member(app.conn(), "Emma", "Stone", &[RoleName::Employee], &[org.s1.id], None).await;
    let manager = create_member(app.conn(), "Mark", "Lee", &[RoleName::Manager], &[org.s1.id], None).await;
    let (_, admin) = create_bare_user(app.conn(), "admin@example.com", &[RoleName::Admin]).await;

    let mut ids = submit_two_entries(&app, &org, &emp).await;
    let third = app
        .state
        .time_entry_service
        .create(&emp.actor, entry_request(org.alpha.id, Some(org.s1.id), date(2024, 3, 4), 120))
        .await
        .unwrap();
    app.state
        .time_entry_service
        .submit(&emp.actor, &[third.id])
        .await
        .unwrap();
    ids.push(third.id);

    let first_batch = vec![ids[0], ids[1]];
    let second_batch = vec![ids[1], ids[2]];
    let (first, second) = tokio::join!(
        app.state.validation_service.bulk_approve(&manager.actor, &first_batch),
        app.state.validation_service.bulk_approve(&admin, &second_batch),
    );
    let first = first.unwrap();
    let second = second.unwrap();
    assert_eq!(first.approved_count + second.approved_count, 3);

    let repo = TimeEntryRepository::new(app.conn().clone());
    let entries = repo.find_by_ids(&ids).await.unwrap();
    assert_eq!(entries.len(), 3);
    for entry in &entries {
        assert_eq!(entry.get_status(), TimeEntryStatus::Approved);
        assert!(entry.approved_by == Some(manager.user.id) || entry.approved_by == Some(admin.user_id));
    }

    // 同じIDをもう一度送っても何も承認しない
    let again = app
        .state
        .validation_service
        .bulk_approve(&manager.actor, &ids)
        .await
        .unwrap();
    assert_eq!(again.approved_count, 0);
}

#[tokio::test]
async fn test_page_beyond_range_returns_empty_page() {
    let app = TestApp::new().await;
    let org = Org::create(app.conn()).await;
    let emp = create_member(app.conn(), "Emma", "Stone", &[RoleName::Employee], &[org.s1.id], None).await;
    let (_, admin) = create_bare_user(app.conn(), "admin@example.com", &[RoleName::Admin]).await;

    submit_two_entries(&app, &org, &emp).await;

    let index = app
        .state
        .validation_service
        .index(
            &admin,
            ValidationQuery {
                page: Some(u64::MAX),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert!(index.employees.items.is_empty());
    assert_eq!(index.employees.pagination.total_count, 1);
    assert!(!index.employees.pagination.has_next);
}

#[tokio::test]
async fn test_employee_cannot_open_review_page() {
    let app = TestApp::new().await;
    let org = Org::create(app.conn()).await;
    let emp = create_member(app.conn(), "Emma", "Stone", &[RoleName::Employee], &[org.s1.id], None).await;

    submit_two_entries(&app, &org, &emp).await;

    let err = app
        .state
        .validation_service
        .show(&emp.actor, emp.employee_id(), EmployeeEntriesQuery::default())
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Forbidden(_)));
}
