// tests/integration/organization_tests.rs

use crate::common::app_helper::TestApp;
use crate::common::fixtures::{create_member, create_service, create_subsidiary, Org};
use timesheet_backend::domain::role_name::RoleName;
use timesheet_backend::error::AppError;
use uuid::Uuid;

#[tokio::test]
async fn test_list_groups_active_services_by_subsidiary() {
    let app = TestApp::new().await;
    let org = Org::create(app.conn()).await;
    let lonely = create_subsidiary(app.conn(), "GAMMA", "Gamma Ltd").await;
    let admin = create_member(app.conn(), "Ada", "Root", &[RoleName::Admin], &[], None).await;

    let listing = app
        .state
        .organization_service
        .list(&admin.actor)
        .await
        .unwrap();

    let names: Vec<&str> = listing.subsidiaries.iter().map(|s| s.name.as_str()).collect();
    assert_eq!(names, vec!["Alpha Corp", "Beta Inc", "Gamma Ltd"]);
    assert_eq!(listing.subsidiaries[0].services.len(), 2);
    assert_eq!(listing.subsidiaries[0].services[0].id, org.s1.id);
    assert_eq!(listing.subsidiaries[2].id, lonely.id);
    assert!(listing.subsidiaries[2].services.is_empty());
    assert_eq!(listing.services.len(), 2);
}

#[tokio::test]
async fn test_attach_detach_and_sync() {
    let app = TestApp::new().await;
    let org = Org::create(app.conn()).await;
    let audit = create_service(app.conn(), "Audit").await;
    let manager = create_member(app.conn(), "Mark", "Lee", &[RoleName::Manager], &[org.s1.id], None).await;
    let service = &app.state.organization_service;

    let attached = service
        .attach(&manager.actor, org.alpha.id, audit.id)
        .await
        .unwrap();
    assert_eq!(attached.subsidiary_id, org.alpha.id);
    assert_eq!(attached.service_ids.len(), 3);
    assert!(attached.service_ids.contains(&audit.id));

    // 同じ紐付けを重ねても1件のまま
    let again = service
        .attach(&manager.actor, org.alpha.id, audit.id)
        .await
        .unwrap();
    assert_eq!(again.service_ids.len(), 3);

    let detached = service
        .detach(&manager.actor, org.alpha.id, org.s2.id)
        .await
        .unwrap();
    assert_eq!(detached.service_ids.len(), 2);
    assert!(!detached.service_ids.contains(&org.s2.id));

    // 無効にした紐付けは再度有効にできる
    let reattached = service
        .attach(&manager.actor, org.alpha.id, org.s2.id)
        .await
        .unwrap();
    assert!(reattached.service_ids.contains(&org.s2.id));

    let synced = service
        .sync(&manager.actor, org.alpha.id, vec![audit.id, audit.id])
        .await
        .unwrap();
    assert_eq!(synced.service_ids, vec![audit.id]);

    let cleared = service
        .sync(&manager.actor, org.alpha.id, Vec::new())
        .await
        .unwrap();
    assert!(cleared.service_ids.is_empty());

    // 他の子会社には影響しない
    let listing = service.list(&manager.actor).await.unwrap();
    let beta = listing
        .subsidiaries
        .iter()
        .find(|s| s.id == org.beta.id)
        .unwrap();
    assert_eq!(beta.services.len(), 2);
}

#[tokio::test]
async fn test_invalid_changes_are_rejected() {
    let app = TestApp::new().await;
    let org = Org::create(app.conn()).await;
    let manager = create_member(app.conn(), "Mark", "Lee", &[RoleName::Manager], &[org.s1.id], None).await;
    let emma = create_member(app.conn(), "Emma", "Stone", &[RoleName::Employee], &[org.s1.id], None).await;
    let service = &app.state.organization_service;

    let err = service.list(&emma.actor).await.unwrap_err();
    assert!(matches!(err, AppError::Forbidden(_)));

    let err = service
        .attach(&emma.actor, org.alpha.id, org.s1.id)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Forbidden(_)));

    let err = service
        .attach(&manager.actor, org.alpha.id, Uuid::new_v4())
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::ValidationError(_)));

    let err = service
        .sync(&manager.actor, org.alpha.id, vec![org.s1.id, Uuid::new_v4()])
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::ValidationError(_)));

    let err = service
        .detach(&manager.actor, Uuid::new_v4(), org.s1.id)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));

    // 失敗した sync は既存の紐付けを変えない
    let listing = service.list(&manager.actor).await.unwrap();
    assert_eq!(listing.subsidiaries[0].services.len(), 2);
}

#[tokio::test]
async fn test_visible_employees_follow_scope() {
    let app = TestApp::new().await;
    let org = Org::create(app.conn()).await;
    let db = app.conn();
    let manager = create_member(db, "Mark", "Lee", &[RoleName::Manager], &[org.s1.id], None).await;
    let emma = create_member(db, "Emma", "Stone", &[RoleName::Employee], &[org.s1.id], None).await;
    create_member(db, "Zoe", "Park", &[RoleName::Employee], &[org.s2.id], None).await;

    let visible = app.state.employee_service.visible(&manager.actor).await.unwrap();
    let names: Vec<&str> = visible.iter().map(|e| e.name.as_str()).collect();
    assert_eq!(names, vec!["Lee Mark", "Stone Emma"]);

    let own = app.state.employee_service.visible(&emma.actor).await.unwrap();
    assert_eq!(own.len(), 1);
    assert_eq!(own[0].id, emma.employee_id());
}
