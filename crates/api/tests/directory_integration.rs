//! Integration tests for companies, locations and the user directory.

mod common;

use axum::http::{Method, StatusCode};
use common::{
    delete_request_with_auth, get_request_with_auth, json_request, multipart_request,
    parse_response_body, FilePart, TestApp, TEST_PASSWORD,
};
use serde_json::json;

// ============================================================================
// Companies and locations
// ============================================================================

#[tokio::test]
async fn test_create_company_and_list() {
    let app = TestApp::new().await;
    let admin = app.admin("chief").await;

    let response = app
        .send(json_request(
            Method::POST,
            "/api/v1/companies",
            Some(&admin.token),
            json!({
                "companyName": "Contoso Guards",
                "companyLocation": "Market Street",
                "latitude": 51.5,
                "longitude": -0.12
            }),
        ))
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let company = parse_response_body(response).await;
    assert_eq!(company["companyCode"], "CMP002");

    let duplicate = app
        .send(json_request(
            Method::POST,
            "/api/v1/companies",
            Some(&admin.token),
            json!({
                "companyName": "Contoso Guards",
                "companyLocation": "Market Street",
                "latitude": 51.5,
                "longitude": -0.12
            }),
        ))
        .await;
    assert_eq!(duplicate.status(), StatusCode::CONFLICT);

    let listed = parse_response_body(
        app.send(get_request_with_auth("/api/v1/companies", &admin.token))
            .await,
    )
    .await;
    assert_eq!(listed.as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_create_company_rejects_bad_coordinates() {
    let app = TestApp::new().await;
    let admin = app.admin("chief").await;

    let response = app
        .send(json_request(
            Method::POST,
            "/api/v1/companies",
            Some(&admin.token),
            json!({
                "companyName": "Contoso Guards",
                "companyLocation": "Market Street",
                "latitude": 123.0,
                "longitude": 0.0
            }),
        ))
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_locations() {
    let app = TestApp::new().await;
    let admin = app.admin("chief").await;

    let location = app.location(&admin, "GATE-1").await;
    assert_eq!(location["locationId"], "LOC001");
    assert_eq!(location["createdBy"], admin.id);

    let duplicate = app
        .send(json_request(
            Method::POST,
            "/api/v1/locations",
            Some(&admin.token),
            json!({
                "locationCode": "GATE-1",
                "latitude": 1.0,
                "longitude": 1.0,
                "createdBy": admin.id
            }),
        ))
        .await;
    assert_eq!(duplicate.status(), StatusCode::CONFLICT);

    let fetched = parse_response_body(
        app.send(get_request_with_auth("/api/v1/locations/GATE-1", &admin.token))
            .await,
    )
    .await;
    assert_eq!(fetched["locationId"], "LOC001");

    let missing = app
        .send(get_request_with_auth("/api/v1/locations/NOWHERE", &admin.token))
        .await;
    assert_eq!(missing.status(), StatusCode::NOT_FOUND);
}

// ============================================================================
// Users
// ============================================================================

#[tokio::test]
async fn test_list_users_and_patrols() {
    let app = TestApp::new().await;
    let admin = app.admin("chief").await;
    app.signup("Patrol", "guard").await;
    app.signup("Patrol", "relief").await;

    let users = parse_response_body(
        app.send(get_request_with_auth("/api/v1/users", &admin.token))
            .await,
    )
    .await;
    assert_eq!(users.as_array().unwrap().len(), 3);

    let patrols = parse_response_body(
        app.send(get_request_with_auth("/api/v1/patrols", &admin.token))
            .await,
    )
    .await;
    let ids: Vec<&str> = patrols
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["patrolId"].as_str().unwrap())
        .collect();
    assert_eq!(ids, vec!["PTR001", "PTR002"]);
}

#[tokio::test]
async fn test_patrol_detail_lists_checklists_and_media() {
    let app = TestApp::new().await;
    let admin = app.admin("chief").await;
    let patrol = app.patrol("guard").await;
    app.location(&admin, "GATE-1").await;
    app.workflow(&admin, "Night round").await;
    app.checklist(&admin, "WF001", "GATE-1", "Check gate").await;
    app.assign(&admin, &patrol, &["CHK001"]).await;
    app.send(multipart_request(
        "/api/v1/media",
        &patrol.token,
        &[("mediaType", "audio"), ("patrolId", patrol.id.as_str())],
        &[FilePart {
            file_name: "note.wav",
            content_type: "audio/wav",
            bytes: b"RIFF",
        }],
    ))
    .await;

    let response = app
        .send(get_request_with_auth(
            &format!("/api/v1/patrols/{}", patrol.id),
            &admin.token,
        ))
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let detail = parse_response_body(response).await;
    assert_eq!(detail["patrolId"], patrol.id);
    assert_eq!(detail["checklistIds"], json!(["CHK001"]));
    assert_eq!(detail["multimedia"][0]["mediaType"], "audio");

    let missing = app
        .send(get_request_with_auth("/api/v1/patrols/PTR404", &admin.token))
        .await;
    assert_eq!(missing.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_update_patrol_profile() {
    let app = TestApp::new().await;
    let admin = app.admin("chief").await;
    let patrol = app.patrol("guard").await;

    let response = app
        .send(json_request(
            Method::PUT,
            &format!("/api/v1/users/patrols/{}", patrol.id),
            Some(&admin.token),
            json!({
                "username": "guard.night@gmail.com",
                "password": TEST_PASSWORD,
                "email": "guard.night@gmail.com",
                "patrolGuardName": "Night guard",
                "mobileNumber": "9111111111",
                "companyCode": app.company_code
            }),
        ))
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = parse_response_body(response).await;
    assert_eq!(body["patrolId"], patrol.id);
    assert_eq!(body["role"], "Patrol");
    assert_eq!(body["patrolGuardName"], "Night guard");
    assert_eq!(body["department"], "Security");
    assert_eq!(body["modifiedBy"], admin.id);

    // The new login name works for the next sign-in.
    app.login("guard.night@gmail.com").await;
}

#[tokio::test]
async fn test_update_user_login_clash_conflicts() {
    let app = TestApp::new().await;
    let admin = app.admin("chief").await;
    let patrol = app.patrol("guard").await;

    let response = app
        .send(json_request(
            Method::PUT,
            &format!("/api/v1/users/patrols/{}", patrol.id),
            Some(&admin.token),
            json!({
                "username": admin.username,
                "password": TEST_PASSWORD,
                "email": admin.username,
                "patrolGuardName": "Guard",
                "mobileNumber": "9111111111",
                "companyCode": app.company_code
            }),
        ))
        .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_delete_user_requires_admin() {
    let app = TestApp::new().await;
    let admin = app.admin("chief").await;
    let patrol = app.patrol("guard").await;
    let other = app.patrol("relief").await;

    let forbidden = app
        .send(delete_request_with_auth(
            &format!("/api/v1/users/patrols/{}", other.id),
            &patrol.token,
        ))
        .await;
    assert_eq!(forbidden.status(), StatusCode::FORBIDDEN);

    let deleted = app
        .send(delete_request_with_auth(
            &format!("/api/v1/users/patrols/{}", other.id),
            &admin.token,
        ))
        .await;
    assert_eq!(deleted.status(), StatusCode::NO_CONTENT);

    let again = app
        .send(delete_request_with_auth(
            &format!("/api/v1/users/patrols/{}", other.id),
            &admin.token,
        ))
        .await;
    assert_eq!(again.status(), StatusCode::NOT_FOUND);
}
