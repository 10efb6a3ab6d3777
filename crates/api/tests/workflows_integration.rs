//! Integration tests for the workflow lifecycle endpoints.

mod common;

use axum::http::{Method, StatusCode};
use common::{
    delete_request_with_auth, get_request_with_auth, json_request, parse_response_body, TestApp,
};
use serde_json::json;

#[tokio::test]
async fn test_create_workflow_starts_pending() {
    let app = TestApp::new().await;
    let admin = app.admin("chief").await;

    let workflow = app.workflow(&admin, "Night round").await;
    assert_eq!(workflow["workflowId"], "WF001");
    assert_eq!(workflow["status"], "Pending");
    assert_eq!(workflow["createdBy"], admin.id);
    assert_eq!(workflow["isActive"], true);
    assert!(workflow.get("startDateTime").is_none());

    let second = app.workflow(&admin, "Morning round").await;
    assert_eq!(second["workflowId"], "WF002");
}

#[tokio::test]
async fn test_create_workflow_duplicate_title_conflicts() {
    let app = TestApp::new().await;
    let admin = app.admin("chief").await;
    app.workflow(&admin, "Night round").await;

    let response = app
        .send(json_request(
            Method::POST,
            "/api/v1/workflows",
            Some(&admin.token),
            json!({ "workflowTitle": "Night round", "createdBy": admin.id }),
        ))
        .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_create_workflow_rejects_non_admin_creator() {
    let app = TestApp::new().await;
    let admin = app.admin("chief").await;

    let malformed = app
        .send(json_request(
            Method::POST,
            "/api/v1/workflows",
            Some(&admin.token),
            json!({ "workflowTitle": "Night round", "createdBy": "PTR001" }),
        ))
        .await;
    assert_eq!(malformed.status(), StatusCode::BAD_REQUEST);

    let unknown = app
        .send(json_request(
            Method::POST,
            "/api/v1/workflows",
            Some(&admin.token),
            json!({ "workflowTitle": "Night round", "createdBy": "ADM404" }),
        ))
        .await;
    assert_eq!(unknown.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_start_requires_checklists_and_valid_instant() {
    let app = TestApp::new().await;
    let admin = app.admin("chief").await;
    app.location(&admin, "GATE-1").await;
    app.workflow(&admin, "Night round").await;

    let empty = app
        .send(json_request(
            Method::POST,
            "/api/v1/workflows/WF001/start",
            Some(&admin.token),
            json!({ "startDateTime": "2024-05-01T08:00:00Z" }),
        ))
        .await;
    assert_eq!(empty.status(), StatusCode::BAD_REQUEST);

    app.checklist(&admin, "WF001", "GATE-1", "Check gate").await;

    let garbage = app
        .send(json_request(
            Method::POST,
            "/api/v1/workflows/WF001/start",
            Some(&admin.token),
            json!({ "startDateTime": "yesterday-ish" }),
        ))
        .await;
    assert_eq!(garbage.status(), StatusCode::BAD_REQUEST);

    let started = app
        .send(json_request(
            Method::POST,
            "/api/v1/workflows/WF001/start",
            Some(&admin.token),
            json!({ "startDateTime": "2024-05-01T08:00:00Z" }),
        ))
        .await;
    assert_eq!(started.status(), StatusCode::OK);
    let workflow = parse_response_body(started).await;
    assert_eq!(workflow["status"], "Inprogress");
    assert_eq!(workflow["startDateTime"], "2024-05-01T08:00:00Z");

    let again = app
        .send(json_request(
            Method::POST,
            "/api/v1/workflows/WF001/start",
            Some(&admin.token),
            json!({ "startDateTime": "2024-05-01T09:00:00Z" }),
        ))
        .await;
    assert_eq!(again.status(), StatusCode::CONFLICT);
    let body = parse_response_body(again).await;
    assert_eq!(body["error"], "invalid_state");
}

#[tokio::test]
async fn test_complete_reports_outstanding_then_completes() {
    let app = TestApp::new().await;
    let admin = app.admin("chief").await;
    let patrol = app.patrol("guard").await;
    app.location(&admin, "GATE-1").await;
    app.workflow(&admin, "Night round").await;
    app.checklist(&admin, "WF001", "GATE-1", "Check gate").await;
    app.checklist(&admin, "WF001", "GATE-1", "Check fence").await;
    assert_eq!(
        app.assign(&admin, &patrol, &["CHK001", "CHK002"]).await.status(),
        StatusCode::OK
    );
    app.complete(&patrol.token, &["CHK001"]).await;

    let deferred = app
        .send(json_request(
            Method::POST,
            "/api/v1/workflows/WF001/complete",
            Some(&patrol.token),
            json!({}),
        ))
        .await;
    assert_eq!(deferred.status(), StatusCode::OK);
    let body = parse_response_body(deferred).await;
    assert_eq!(body["completed"], false);
    assert_eq!(body["outstandingChecklists"], json!(["CHK002"]));
    assert_eq!(body["workflow"]["status"], "Pending");

    app.complete(&patrol.token, &["CHK002"]).await;

    let done = app
        .send(json_request(
            Method::POST,
            "/api/v1/workflows/WF001/complete",
            Some(&patrol.token),
            json!({}),
        ))
        .await;
    assert_eq!(done.status(), StatusCode::OK);
    let body = parse_response_body(done).await;
    assert_eq!(body["completed"], true);
    assert!(body.get("outstandingChecklists").is_none());
    assert_eq!(body["workflow"]["status"], "Completed");
    assert_eq!(body["workflow"]["workflowStatus"], "Ontime");
    assert_eq!(body["workflow"]["isActive"], false);

    // Completing twice is not an error.
    let repeat = app
        .send(json_request(
            Method::POST,
            "/api/v1/workflows/WF001/complete",
            Some(&patrol.token),
            json!({}),
        ))
        .await;
    assert_eq!(repeat.status(), StatusCode::OK);
    assert_eq!(parse_response_body(repeat).await["completed"], true);
}

#[tokio::test]
async fn test_complete_without_checklists_not_found() {
    let app = TestApp::new().await;
    let admin = app.admin("chief").await;
    app.workflow(&admin, "Night round").await;

    let response = app
        .send(json_request(
            Method::POST,
            "/api/v1/workflows/WF001/complete",
            Some(&admin.token),
            json!({}),
        ))
        .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_list_filters_and_completed_views() {
    let app = TestApp::new().await;
    let admin = app.admin("chief").await;
    let patrol = app.patrol("guard").await;
    app.location(&admin, "GATE-1").await;
    app.workflow(&admin, "Night round").await;
    app.workflow(&admin, "Morning round").await;
    app.checklist(&admin, "WF001", "GATE-1", "Check gate").await;
    app.assign(&admin, &patrol, &["CHK001"]).await;
    app.complete(&patrol.token, &["CHK001"]).await;
    app.send(json_request(
        Method::POST,
        "/api/v1/workflows/WF001/complete",
        Some(&admin.token),
        json!({}),
    ))
    .await;

    let all = parse_response_body(
        app.send(get_request_with_auth("/api/v1/workflows", &admin.token))
            .await,
    )
    .await;
    assert_eq!(all.as_array().unwrap().len(), 2);

    let pending = parse_response_body(
        app.send(get_request_with_auth(
            "/api/v1/workflows?status=Pending",
            &admin.token,
        ))
        .await,
    )
    .await;
    assert_eq!(pending.as_array().unwrap().len(), 1);
    assert_eq!(pending[0]["workflowId"], "WF002");

    let completed = parse_response_body(
        app.send(get_request_with_auth("/api/v1/workflows/completed", &admin.token))
            .await,
    )
    .await;
    assert_eq!(completed.as_array().unwrap().len(), 1);
    assert_eq!(completed[0]["workflowId"], "WF001");

    let for_patrol = parse_response_body(
        app.send(get_request_with_auth(
            &format!("/api/v1/workflows/completed/{}", patrol.id),
            &admin.token,
        ))
        .await,
    )
    .await;
    assert_eq!(for_patrol.as_array().unwrap().len(), 1);
    assert_eq!(for_patrol[0]["workflowTitle"], "Night round");
    assert_eq!(for_patrol[0]["checklists"][0]["checklistId"], "CHK001");

    let nobody = parse_response_body(
        app.send(get_request_with_auth(
            "/api/v1/workflows/completed/PTR404",
            &admin.token,
        ))
        .await,
    )
    .await;
    assert_eq!(nobody, json!([]));
}

#[tokio::test]
async fn test_update_only_while_pending() {
    let app = TestApp::new().await;
    let admin = app.admin("chief").await;
    app.location(&admin, "GATE-1").await;
    app.workflow(&admin, "Night round").await;
    app.checklist(&admin, "WF001", "GATE-1", "Check gate").await;

    let renamed = app
        .send(json_request(
            Method::PUT,
            "/api/v1/workflows/WF001",
            Some(&admin.token),
            json!({ "workflowTitle": "Late night round", "description": "East wing" }),
        ))
        .await;
    assert_eq!(renamed.status(), StatusCode::OK);
    let body = parse_response_body(renamed).await;
    assert_eq!(body["workflowTitle"], "Late night round");
    assert_eq!(body["modifiedBy"], admin.id);

    app.send(json_request(
        Method::POST,
        "/api/v1/workflows/WF001/start",
        Some(&admin.token),
        json!({ "startDateTime": "2024-05-01" }),
    ))
    .await;

    let locked = app
        .send(json_request(
            Method::PUT,
            "/api/v1/workflows/WF001",
            Some(&admin.token),
            json!({ "description": "West wing" }),
        ))
        .await;
    assert_eq!(locked.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_delete_requires_admin() {
    let app = TestApp::new().await;
    let admin = app.admin("chief").await;
    let patrol = app.patrol("guard").await;
    app.workflow(&admin, "Night round").await;

    let forbidden = app
        .send(delete_request_with_auth("/api/v1/workflows/WF001", &patrol.token))
        .await;
    assert_eq!(forbidden.status(), StatusCode::FORBIDDEN);

    let deleted = app
        .send(delete_request_with_auth("/api/v1/workflows/WF001", &admin.token))
        .await;
    assert_eq!(deleted.status(), StatusCode::NO_CONTENT);

    let gone = app
        .send(get_request_with_auth("/api/v1/workflows/WF001", &admin.token))
        .await;
    assert_eq!(gone.status(), StatusCode::NOT_FOUND);

    let again = app
        .send(delete_request_with_auth("/api/v1/workflows/WF001", &admin.token))
        .await;
    assert_eq!(again.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_active_checklists_of_workflow() {
    let app = TestApp::new().await;
    let admin = app.admin("chief").await;
    let patrol = app.patrol("guard").await;
    app.location(&admin, "GATE-1").await;
    app.workflow(&admin, "Night round").await;
    app.checklist(&admin, "WF001", "GATE-1", "Check gate").await;
    app.checklist(&admin, "WF001", "GATE-1", "Check fence").await;
    app.assign(&admin, &patrol, &["CHK002"]).await;

    let deactivated = app
        .send(json_request(
            Method::PUT,
            "/api/v1/checklists/CHK002",
            Some(&admin.token),
            json!({ "isActive": false }),
        ))
        .await;
    assert_eq!(deactivated.status(), StatusCode::OK);

    let body = parse_response_body(
        app.send(get_request_with_auth(
            "/api/v1/workflows/WF001/checklists",
            &admin.token,
        ))
        .await,
    )
    .await;
    let ids: Vec<&str> = body
        .as_array()
        .unwrap()
        .iter()
        .map(|c| c["checklistId"].as_str().unwrap())
        .collect();
    assert_eq!(ids, vec!["CHK001"]);
}
