// tests/integration/api_tests.rs

use crate::common::app_helper::TestApp;
use crate::common::fixtures::{create_member, Org};
use crate::common::request::{body_json, create_request, get};
use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use serde_json::json;
use timesheet_backend::domain::role_name::RoleName;
use timesheet_backend::logging::REQUEST_ID_HEADER;
use tower::ServiceExt;

#[tokio::test]
async fn test_health_is_public() {
    let app = TestApp::new().await;

    let response = app
        .router()
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers().contains_key(REQUEST_ID_HEADER));
    let body = body_json(response).await;
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn test_missing_or_invalid_token_is_unauthorized() {
    let app = TestApp::new().await;

    let response = app
        .router()
        .oneshot(Request::builder().uri("/timesheet").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body = body_json(response).await;
    assert_eq!(body["success"], false);
    assert_eq!(body["error_type"], "unauthorized");

    let response = app
        .router()
        .oneshot(get("/timesheet", "not-a-token"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_request_id_is_propagated() {
    let app = TestApp::new().await;

    let response = app
        .router()
        .oneshot(
            Request::builder()
                .uri("/health")
                .header(REQUEST_ID_HEADER, "trace-42")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.headers()[REQUEST_ID_HEADER], "trace-42");
}

#[tokio::test]
async fn test_entry_lifecycle_over_http() {
    let app = TestApp::new().await;
    let org = Org::create(app.conn()).await;
    let emma = create_member(app.conn(), "Emma", "Stone", &[RoleName::Employee], &[org.s1.id], Some(org.alpha.id)).await;
    let manager = create_member(app.conn(), "Mark", "Lee", &[RoleName::Manager], &[org.s1.id], None).await;
    let emma_token = app.token_for(emma.user.id);
    let manager_token = app.token_for(manager.user.id);

    // 作成
    let payload = json!({
        "subsidiary_id": org.alpha.id,
        "service_id": org.s1.id,
        "work_date": "2024-03-04",
        "hours": 2,
        "minutes": 30,
        "note": "Client workshop"
    });
    let response = app
        .router()
        .oneshot(create_request("POST", "/timesheet", &emma_token, Some(&payload)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let body = body_json(response).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["minutes"], 150);
    assert_eq!(body["data"]["status"], "DRAFT");
    let entry_id = body["data"]["id"].as_str().unwrap().to_string();

    // 月次表
    let response = app
        .router()
        .oneshot(get("/timesheet?month=2024-03", &emma_token))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["data"]["total_minutes"], 150);

    // 提出
    let response = app
        .router()
        .oneshot(create_request(
            "POST",
            "/timesheet/submit",
            &emma_token,
            Some(&json!({ "entry_ids": [] })),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["data"]["submitted_count"], 1);

    // 提出後は編集できない
    let response = app
        .router()
        .oneshot(create_request(
            "PUT",
            &format!("/timesheet/{}", entry_id),
            &emma_token,
            Some(&payload),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);
    let body = body_json(response).await;
    assert_eq!(body["error_type"], "entry_locked");

    // 従業員は承認できない
    let response = app
        .router()
        .oneshot(create_request::<()>(
            "POST",
            &format!("/validation/{}/approve", entry_id),
            &emma_token,
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    // 空の理由は 400
    let response = app
        .router()
        .oneshot(create_request(
            "POST",
            &format!("/validation/{}/reject", entry_id),
            &manager_token,
            Some(&json!({ "reason": "" })),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = app
        .router()
        .oneshot(create_request::<()>(
            "POST",
            &format!("/validation/{}/approve", entry_id),
            &manager_token,
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["data"]["status"], "APPROVED");

    // 二重承認は 409
    let response = app
        .router()
        .oneshot(create_request::<()>(
            "POST",
            &format!("/validation/{}/approve", entry_id),
            &manager_token,
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);
    let body = body_json(response).await;
    assert_eq!(body["error_type"], "invalid_transition");

    // 承認の通知
    let response = app
        .router()
        .oneshot(get("/notifications/count", &emma_token))
        .await
        .unwrap();
    let body = body_json(response).await;
    assert_eq!(body["data"]["unread"], 1);
}

#[tokio::test]
async fn test_delete_and_bad_identifiers() {
    let app = TestApp::new().await;
    let org = Org::create(app.conn()).await;
    let emma = create_member(app.conn(), "Emma", "Stone", &[RoleName::Employee], &[org.s1.id], None).await;
    let token = app.token_for(emma.user.id);

    let payload = json!({
        "subsidiary_id": org.alpha.id,
        "work_date": "2024-03-04",
        "minutes": 45
    });
    let response = app
        .router()
        .oneshot(create_request("POST", "/timesheet", &token, Some(&payload)))
        .await
        .unwrap();
    let body = body_json(response).await;
    let entry_id = body["data"]["id"].as_str().unwrap().to_string();

    let response = app
        .router()
        .oneshot(create_request::<()>(
            "DELETE",
            &format!("/timesheet/{}", entry_id),
            &token,
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = app
        .router()
        .oneshot(create_request::<()>("DELETE", "/timesheet/not-a-uuid", &token, None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    // 範囲外の分数
    let payload = json!({
        "subsidiary_id": org.alpha.id,
        "work_date": "2024-03-04",
        "minutes": 0
    });
    let response = app
        .router()
        .oneshot(create_request("POST", "/timesheet", &token, Some(&payload)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["success"], false);

    // 空の提出は 422
    let response = app
        .router()
        .oneshot(create_request(
            "POST",
            "/timesheet/submit",
            &token,
            Some(&json!({})),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn test_read_endpoints_respond() {
    let app = TestApp::new().await;
    let org = Org::create(app.conn()).await;
    let manager = create_member(app.conn(), "Mark", "Lee", &[RoleName::Manager], &[org.s1.id], None).await;
    let emma = create_member(app.conn(), "Emma", "Stone", &[RoleName::Employee], &[org.s1.id], None).await;
    let manager_token = app.token_for(manager.user.id);
    let emma_token = app.token_for(emma.user.id);

    for uri in [
        "/reports?start_date=2024-03-01&end_date=2024-03-31",
        "/reports/subsidiaries",
        "/reports/services",
        "/reports/employees?search=Stone",
        "/estimation?rate=25",
        "/dashboard",
        "/validation?status=SUBMITTED",
        "/subsidiary-services",
        "/employees/visible",
        "/notifications",
        "/notifications/unread",
    ] {
        let response = app.router().oneshot(get(uri, &manager_token)).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK, "GET {}", uri);
    }

    let response = app
        .router()
        .oneshot(get(
            "/reports?start_date=2024-03-31&end_date=2024-03-01",
            &manager_token,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = app
        .router()
        .oneshot(get(&format!("/estimation/{}?rate=-1", org.alpha.id), &manager_token))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = app
        .router()
        .oneshot(get("/subsidiary-services", &emma_token))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = app
        .router()
        .oneshot(get(
            &format!("/validation/employees/{}", emma.employee_id()),
            &manager_token,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["data"]["employee"]["name"], "Stone Emma");

    // 審査ページは本人でも従業員ロールだけでは見られない
    let response = app
        .router()
        .oneshot(get(
            &format!("/validation/employees/{}", emma.employee_id()),
            &emma_token,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    for uri in [
        "/validation?page=18446744073709551615",
        "/reports/employees?page=18446744073709551615",
    ] {
        let response = app.router().oneshot(get(uri, &manager_token)).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK, "GET {}", uri);
        let body = body_json(response).await;
        assert_eq!(body["data"]["employees"]["items"].as_array().map(Vec::len), Some(0), "GET {}", uri);
    }
}
