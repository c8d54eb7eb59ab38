// tests/integration/timesheet_tests.rs

use crate::common::app_helper::TestApp;
use crate::common::fixtures::{actor_for, create_bare_user, create_member, date, entry_request, Org};
use sea_orm::{ActiveModelTrait, Set};
use timesheet_backend::domain::employee_model::{self, generated_code_candidates, generated_code_for_user};
use timesheet_backend::domain::time_entry_model;
use timesheet_backend::api::dto::time_entry_dto::{MonthQuery, TimeEntryRequest};
use timesheet_backend::domain::role_name::RoleName;
use timesheet_backend::domain::time_entry_status::TimeEntryStatus;
use timesheet_backend::error::AppError;
use timesheet_backend::repository::time_entry_repository::TimeEntryRepository;

fn is_validation(err: &AppError) -> bool {
    matches!(
        err,
        AppError::ValidationError(_) | AppError::ValidationErrors(_) | AppError::ValidationFailure(_)
    )
}

fn march() -> MonthQuery {
    MonthQuery {
        month: Some("2024-03".to_string()),
    }
}

#[tokio::test]
async fn test_employee_entry_starts_as_draft_without_approval() {
    let app = TestApp::new().await;
    let org = Org::create(app.conn()).await;
    let emp = create_member(app.conn(), "Emma", "Stone", &[RoleName::Employee], &[org.s1.id], None).await;

    let entry = app
        .state
        .time_entry_service
        .create(
            &emp.actor,
            entry_request(org.alpha.id, Some(org.s1.id), date(2024, 3, 1), 240),
        )
        .await
        .unwrap();

    assert_eq!(entry.status, TimeEntryStatus::Draft);
    assert_eq!(entry.employee_id, emp.employee_id());
    assert_eq!(entry.minutes, 240);
    assert_eq!(entry.hours, 4.0);
    assert!(entry.approved_by.is_none());
    assert!(entry.approved_at.is_none());
    assert!(entry.submitted_at.is_none());
}

#[tokio::test]
async fn test_manager_entry_is_approved_on_creation() {
    let app = TestApp::new().await;
    let org = Org::create(app.conn()).await;
    let manager = create_member(app.conn(), "Mark", "Lee", &[RoleName::Manager], &[org.s1.id], None).await;

    let entry = app
        .state
        .time_entry_service
        .create(
            &manager.actor,
            entry_request(org.alpha.id, Some(org.s1.id), date(2024, 3, 4), 90),
        )
        .await
        .unwrap();

    assert_eq!(entry.status, TimeEntryStatus::Approved);
    assert_eq!(entry.approved_by, Some(manager.user.id));
    assert!(entry.approved_at.is_some());
}

#[tokio::test]
async fn test_hours_and_minutes_are_combined() {
    let app = TestApp::new().await;
    let org = Org::create(app.conn()).await;
    let emp = create_member(app.conn(), "Emma", "Stone", &[RoleName::Employee], &[org.s1.id], None).await;

    let request = TimeEntryRequest {
        hours: Some(7),
        minutes: Some(30),
        ..entry_request(org.alpha.id, None, date(2024, 3, 5), 1)
    };
    let entry = app
        .state
        .time_entry_service
        .create(&emp.actor, request)
        .await
        .unwrap();

    assert_eq!(entry.minutes, 450);
    assert_eq!(entry.hours, 7.5);
    assert!(entry.service_id.is_none());
}

#[tokio::test]
async fn test_out_of_range_minutes_are_rejected_before_persistence() {
    let app = TestApp::new().await;
    let org = Org::create(app.conn()).await;
    let emp = create_member(app.conn(), "Emma", "Stone", &[RoleName::Employee], &[org.s1.id], None).await;
    let service = &app.state.time_entry_service;

    for minutes in [0, -15, 1441] {
        let err = service
            .create(
                &emp.actor,
                entry_request(org.alpha.id, Some(org.s1.id), date(2024, 3, 1), minutes),
            )
            .await
            .unwrap_err();
        assert!(is_validation(&err), "minutes {} gave {:?}", minutes, err);
    }

    // 24時間ちょうどは許容、それを超える時間指定は不可
    let over = TimeEntryRequest {
        hours: Some(24),
        minutes: Some(1),
        ..entry_request(org.alpha.id, Some(org.s1.id), date(2024, 3, 1), 1)
    };
    assert!(is_validation(&service.create(&emp.actor, over).await.unwrap_err()));

    let full_day = service
        .create(
            &emp.actor,
            entry_request(org.alpha.id, Some(org.s1.id), date(2024, 3, 2), 1440),
        )
        .await
        .unwrap();
    assert_eq!(full_day.minutes, 1440);

    let sheet = service.timesheet(&emp.actor, march()).await.unwrap();
    assert_eq!(sheet.entries.len(), 1);
    assert_eq!(sheet.total_minutes, 1440);
}

#[tokio::test]
async fn test_unknown_subsidiary_is_a_validation_error() {
    let app = TestApp::new().await;
    let org = Org::create(app.conn()).await;
    let emp = create_member(app.conn(), "Emma", "Stone", &[RoleName::Employee], &[org.s1.id], None).await;

    let err = app
        .state
        .time_entry_service
        .create(
            &emp.actor,
            entry_request(uuid::Uuid::new_v4(), Some(org.s1.id), date(2024, 3, 1), 60),
        )
        .await
        .unwrap_err();
    assert!(is_validation(&err));
}

#[tokio::test]
async fn test_submitted_entry_is_locked_for_owner() {
    let app = TestApp::new().await;
    let org = Org::create(app.conn()).await;
    let emp = create_member(app.conn(), "Emma", "Stone", &[RoleName::Employee], &[org.s1.id], None).await;
    let service = &app.state.time_entry_service;

    let entry = service
        .create(
            &emp.actor,
            entry_request(org.alpha.id, Some(org.s1.id), date(2024, 3, 1), 120),
        )
        .await
        .unwrap();
    service.submit(&emp.actor, &[entry.id]).await.unwrap();

    let err = service
        .update(
            &emp.actor,
            entry.id,
            entry_request(org.alpha.id, Some(org.s1.id), date(2024, 3, 1), 60),
        )
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        AppError::EntryLocked {
            status: TimeEntryStatus::Submitted
        }
    ));

    let err = service.delete(&emp.actor, entry.id).await.unwrap_err();
    assert!(matches!(err, AppError::EntryLocked { .. }));

    let sheet = service.timesheet(&emp.actor, march()).await.unwrap();
    assert_eq!(sheet.entries[0].minutes, 120);
    assert_eq!(sheet.entries[0].status, TimeEntryStatus::Submitted);
}

#[tokio::test]
async fn test_only_owner_can_modify_entry() {
    let app = TestApp::new().await;
    let org = Org::create(app.conn()).await;
    let owner = create_member(app.conn(), "Emma", "Stone", &[RoleName::Employee], &[org.s1.id], None).await;
    let other = create_member(app.conn(), "Olga", "Ivanova", &[RoleName::Employee], &[org.s1.id], None).await;
    let service = &app.state.time_entry_service;

    let entry = service
        .create(
            &owner.actor,
            entry_request(org.alpha.id, Some(org.s1.id), date(2024, 3, 1), 60),
        )
        .await
        .unwrap();

    let err = service.delete(&other.actor, entry.id).await.unwrap_err();
    assert!(matches!(err, AppError::Forbidden(_)));

    service.delete(&owner.actor, entry.id).await.unwrap();
    let err = service.delete(&owner.actor, entry.id).await.unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));
}

#[tokio::test]
async fn test_submit_moves_only_own_drafts() {
    let app = TestApp::new().await;
    let org = Org::create(app.conn()).await;
    let emp = create_member(app.conn(), "Emma", "Stone", &[RoleName::Employee], &[org.s1.id], None).await;
    let other = create_member(app.conn(), "Olga", "Ivanova", &[RoleName::Employee], &[org.s1.id], None).await;
    let service = &app.state.time_entry_service;

    let mine = service
        .create(&emp.actor, entry_request(org.alpha.id, None, date(2024, 3, 1), 60))
        .await
        .unwrap();
    let theirs = service
        .create(&other.actor, entry_request(org.alpha.id, None, date(2024, 3, 1), 60))
        .await
        .unwrap();

    let result = service
        .submit(&emp.actor, &[mine.id, theirs.id])
        .await
        .unwrap();
    assert_eq!(result.submitted_count, 1);
    assert_eq!(result.entry_ids, vec![mine.id]);

    let other_sheet = service.timesheet(&other.actor, march()).await.unwrap();
    assert_eq!(other_sheet.entries[0].status, TimeEntryStatus::Draft);

    // 下書きが残っていなければ NoEntries
    let err = service.submit(&emp.actor, &[]).await.unwrap_err();
    assert!(matches!(err, AppError::NoEntries(_)));
}

#[tokio::test]
async fn test_user_without_employee_gets_one_linked_on_first_entry() {
    let app = TestApp::new().await;
    let _org = Org::create(app.conn()).await;
    let (user, actor) = create_bare_user(app.conn(), "newcomer@example.com", &[RoleName::Employee]).await;
    assert!(actor.employee_id.is_none());

    let sheet = app
        .state
        .time_entry_service
        .timesheet(&actor, march())
        .await
        .unwrap();
    assert!(sheet.entries.is_empty());
    assert_eq!(sheet.subsidiaries.len(), 2);

    let linked = actor_for(app.conn(), user.id).await;
    assert_eq!(linked.employee_id, Some(sheet.employee.id));

    // 2回目は同じ従業員を返す
    let again = app
        .state
        .time_entry_service
        .ensure_employee(&linked)
        .await
        .unwrap();
    assert_eq!(again.id, sheet.employee.id);
}

#[tokio::test]
async fn test_generated_code_taken_by_another_user_gets_longer_code() {
    let app = TestApp::new().await;
    let _org = Org::create(app.conn()).await;
    let holder = create_member(app.conn(), "Hana", "Mori", &[RoleName::Employee], &[], None).await;
    let (newcomer, actor) = create_bare_user(app.conn(), "newcomer@example.com", &[RoleName::Employee]).await;

    // 既存ユーザーの従業員が新規ユーザーの生成コードを使っている
    let mut taken: employee_model::ActiveModel = holder.employee.clone().into();
    taken.employee_code = Set(generated_code_for_user(newcomer.id));
    taken.update(app.conn()).await.unwrap();

    let sheet = app
        .state
        .time_entry_service
        .timesheet(&actor, march())
        .await
        .unwrap();

    let expected = generated_code_candidates(newcomer.id).nth(1).unwrap();
    assert_eq!(sheet.employee.employee_code, expected);
    assert_ne!(sheet.employee.id, holder.employee_id());

    // 既存ユーザーの紐付けはそのまま、新規ユーザーは以後も同じ従業員
    let holder_actor = actor_for(app.conn(), holder.user.id).await;
    assert_eq!(holder_actor.employee_id, Some(holder.employee_id()));
    let linked = actor_for(app.conn(), newcomer.id).await;
    let again = app
        .state
        .time_entry_service
        .timesheet(&linked, march())
        .await
        .unwrap();
    assert_eq!(again.employee.id, sheet.employee.id);
}

#[tokio::test]
async fn test_orphaned_employee_with_generated_code_is_adopted() {
    let app = TestApp::new().await;
    let _org = Org::create(app.conn()).await;
    let (newcomer, actor) = create_bare_user(app.conn(), "returning@example.com", &[RoleName::Employee]).await;

    let orphan = employee_model::ActiveModel {
        employee_code: Set(generated_code_for_user(newcomer.id)),
        first_name: Set("Returning".to_string()),
        last_name: Set("Worker".to_string()),
        email: Set(None),
        ..Default::default()
    }
    .insert(app.conn())
    .await
    .unwrap();

    let employee = app
        .state
        .time_entry_service
        .ensure_employee(&actor)
        .await
        .unwrap();
    assert_eq!(employee.id, orphan.id);
    assert_eq!(employee.employee_code, orphan.employee_code);
}

#[tokio::test]
async fn test_entry_with_unreadable_status_cannot_change() {
    let app = TestApp::new().await;
    let org = Org::create(app.conn()).await;
    let emp = create_member(app.conn(), "Emma", "Stone", &[RoleName::Employee], &[org.s1.id], None).await;

    let entry = app
        .state
        .time_entry_service
        .create(
            &emp.actor,
            entry_request(org.alpha.id, Some(org.s1.id), date(2024, 3, 1), 60),
        )
        .await
        .unwrap();

    let repo = TimeEntryRepository::new(app.conn().clone());
    let stored = repo.find_by_id(entry.id).await.unwrap().unwrap();
    let mut corrupted: time_entry_model::ActiveModel = stored.into();
    corrupted.status = Set("ARCHIVED".to_string());
    corrupted.update(app.conn()).await.unwrap();

    let err = app
        .state
        .time_entry_service
        .update(
            &emp.actor,
            entry.id,
            entry_request(org.alpha.id, Some(org.s1.id), date(2024, 3, 1), 90),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::DbErr(_)));

    let err = app
        .state
        .time_entry_service
        .delete(&emp.actor, entry.id)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::DbErr(_)));

    let stored = repo.find_by_id(entry.id).await.unwrap().unwrap();
    assert_eq!(stored.status, "ARCHIVED");
    assert_eq!(stored.minutes, 60);
}

#[tokio::test]
async fn test_invalid_month_is_rejected() {
    let app = TestApp::new().await;
    let emp = create_member(app.conn(), "Emma", "Stone", &[RoleName::Employee], &[], None).await;

    let err = app
        .state
        .time_entry_service
        .timesheet(
            &emp.actor,
            MonthQuery {
                month: Some("2024-13".to_string()),
            },
        )
        .await
        .unwrap_err();
    assert!(is_validation(&err));
}
