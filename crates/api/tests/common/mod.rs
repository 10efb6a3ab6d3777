//! Common test utilities for integration tests.
//!
//! The router is wired over the in-memory store and blob store, so these
//! tests run without a database. One-time codes are read back from the
//! mock notifier.

// Not every helper is used by every test binary.
#![allow(dead_code)]

use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    response::Response,
    Router,
};
use domain::models::company::CreateCompanyRequest;
use domain::services::{InMemoryEntityStore, MemoryBlobStore, MockNotificationService};
use patrol_api::{
    app::{create_app, AppState},
    config::Config,
};
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

pub const TEST_PASSWORD: &str = "Secret123!";
const BOUNDARY: &str = "patrol-test-boundary";

/// Test configuration: rate limiting off, fixed signing secret.
pub fn test_config() -> Config {
    Config::load_for_test(&[("database.url", "postgres://unused@localhost/patrol_test")])
        .expect("test config")
}

/// A fully wired application plus handles on its fakes.
pub struct TestApp {
    pub router: Router,
    pub state: AppState,
    pub notifier: Arc<MockNotificationService>,
    pub blobs: Arc<MemoryBlobStore>,
    pub company_code: String,
}

/// A signed-in user.
#[derive(Debug, Clone)]
pub struct TestUser {
    pub id: String,
    pub username: String,
    pub token: String,
}

impl TestApp {
    pub async fn new() -> Self {
        Self::with_config(test_config()).await
    }

    pub async fn with_config(config: Config) -> Self {
        let store = Arc::new(InMemoryEntityStore::new());
        let notifier = Arc::new(MockNotificationService::new());
        let blobs = Arc::new(MemoryBlobStore::new());
        let state = AppState::new(config, store, blobs.clone(), notifier.clone())
            .expect("app state");

        // Signup needs an existing company and company creation is protected.
        let company = state
            .directory
            .create_company(CreateCompanyRequest {
                company_name: "Northwind Security".to_string(),
                company_location: "Harbour Road".to_string(),
                latitude: 12.97,
                longitude: 77.59,
            })
            .await
            .expect("seed company");

        Self {
            router: create_app(state.clone()),
            state,
            notifier,
            blobs,
            company_code: company.company_code,
        }
    }

    pub async fn send(&self, request: Request<Body>) -> Response {
        self.router.clone().oneshot(request).await.unwrap()
    }

    pub fn signup_body(&self, role: &str, local_part: &str) -> Value {
        let username = format!("{}@gmail.com", local_part);
        json!({
            "username": username,
            "password": TEST_PASSWORD,
            "email": username,
            "patrolGuardName": format!("{} guard", local_part),
            "mobileNumber": "9000000000",
            "companyCode": self.company_code,
            "role": role,
            "department": "Security",
            "designation": "Guard"
        })
    }

    pub async fn signup(&self, role: &str, local_part: &str) -> Value {
        let response = self
            .send(json_request(
                Method::POST,
                "/api/v1/auth/signup",
                None,
                self.signup_body(role, local_part),
            ))
            .await;
        assert_eq!(response.status(), StatusCode::CREATED);
        parse_response_body(response).await
    }

    /// Runs the password step and returns the code the notifier received.
    pub async fn request_code(&self, username: &str) -> String {
        let response = self
            .send(json_request(
                Method::POST,
                "/api/v1/auth/login",
                None,
                json!({ "username": username, "password": TEST_PASSWORD }),
            ))
            .await;
        assert_eq!(response.status(), StatusCode::OK);
        self.notifier
            .last_code_for(username)
            .expect("code delivered")
    }

    pub async fn login(&self, username: &str) -> String {
        let code = self.request_code(username).await;
        let response = self
            .send(json_request(
                Method::POST,
                "/api/v1/auth/verify-otp",
                None,
                json!({ "username": username, "otp": code }),
            ))
            .await;
        assert_eq!(response.status(), StatusCode::OK);
        let body = parse_response_body(response).await;
        body["accessToken"].as_str().unwrap().to_string()
    }

    pub async fn admin(&self, local_part: &str) -> TestUser {
        let user = self.signup("Admin", local_part).await;
        let username = user["username"].as_str().unwrap().to_string();
        TestUser {
            id: user["adminId"].as_str().unwrap().to_string(),
            token: self.login(&username).await,
            username,
        }
    }

    pub async fn patrol(&self, local_part: &str) -> TestUser {
        let user = self.signup("Patrol", local_part).await;
        let username = user["username"].as_str().unwrap().to_string();
        TestUser {
            id: user["patrolId"].as_str().unwrap().to_string(),
            token: self.login(&username).await,
            username,
        }
    }

    /// Creates a checkpoint location as `admin`.
    pub async fn location(&self, admin: &TestUser, code: &str) -> Value {
        let response = self
            .send(json_request(
                Method::POST,
                "/api/v1/locations",
                Some(&admin.token),
                json!({
                    "locationCode": code,
                    "latitude": 12.9,
                    "longitude": 77.6,
                    "createdBy": admin.id
                }),
            ))
            .await;
        assert_eq!(response.status(), StatusCode::CREATED);
        parse_response_body(response).await
    }

    pub async fn workflow(&self, admin: &TestUser, title: &str) -> Value {
        let response = self
            .send(json_request(
                Method::POST,
                "/api/v1/workflows",
                Some(&admin.token),
                json!({ "workflowTitle": title, "createdBy": admin.id }),
            ))
            .await;
        assert_eq!(response.status(), StatusCode::CREATED);
        parse_response_body(response).await
    }

    pub async fn checklist(
        &self,
        admin: &TestUser,
        workflow_id: &str,
        location_code: &str,
        title: &str,
    ) -> Value {
        let response = self
            .send(json_request(
                Method::POST,
                "/api/v1/checklists",
                Some(&admin.token),
                json!({
                    "workflowId": workflow_id,
                    "locationCode": location_code,
                    "title": title,
                    "createdBy": admin.id
                }),
            ))
            .await;
        assert_eq!(response.status(), StatusCode::CREATED);
        parse_response_body(response).await
    }

    pub async fn assign(
        &self,
        admin: &TestUser,
        patrol: &TestUser,
        checklist_ids: &[&str],
    ) -> Response {
        self.send(json_request(
            Method::PUT,
            "/api/v1/checklists/assign",
            Some(&admin.token),
            json!({
                "checklistIds": checklist_ids,
                "assignedTo": patrol.id,
                "assignedBy": admin.id
            }),
        ))
        .await
    }

    pub async fn complete(&self, token: &str, checklist_ids: &[&str]) -> Value {
        let response = self
            .send(json_request(
                Method::PUT,
                "/api/v1/checklists/complete",
                Some(token),
                json!({ "checklistIds": checklist_ids }),
            ))
            .await;
        assert_eq!(response.status(), StatusCode::OK);
        parse_response_body(response).await
    }
}

/// Helper to create a JSON request, optionally carrying a bearer token.
pub fn json_request(method: Method, uri: &str, token: Option<&str>, body: Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    builder
        .body(Body::from(serde_json::to_string(&body).unwrap()))
        .unwrap()
}

pub fn get_request_with_auth(uri: &str, token: &str) -> Request<Body> {
    Request::builder()
        .method(Method::GET)
        .uri(uri)
        .header(header::AUTHORIZATION, format!("Bearer {}", token))
        .body(Body::empty())
        .unwrap()
}

pub fn delete_request_with_auth(uri: &str, token: &str) -> Request<Body> {
    Request::builder()
        .method(Method::DELETE)
        .uri(uri)
        .header(header::AUTHORIZATION, format!("Bearer {}", token))
        .body(Body::empty())
        .unwrap()
}

pub fn empty_request_with_auth(method: Method, uri: &str, token: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::AUTHORIZATION, format!("Bearer {}", token))
        .body(Body::empty())
        .unwrap()
}

/// A file part of a multipart form.
pub struct FilePart<'a> {
    pub file_name: &'a str,
    pub content_type: &'a str,
    pub bytes: &'a [u8],
}

/// Builds a `multipart/form-data` request by hand.
pub fn multipart_request(
    uri: &str,
    token: &str,
    fields: &[(&str, &str)],
    files: &[FilePart<'_>],
) -> Request<Body> {
    let mut body = Vec::new();
    for (name, value) in fields {
        body.extend_from_slice(
            format!(
                "--{}\r\nContent-Disposition: form-data; name=\"{}\"\r\n\r\n{}\r\n",
                BOUNDARY, name, value
            )
            .as_bytes(),
        );
    }
    for file in files {
        body.extend_from_slice(
            format!(
                "--{}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"{}\"\r\nContent-Type: {}\r\n\r\n",
                BOUNDARY, file.file_name, file.content_type
            )
            .as_bytes(),
        );
        body.extend_from_slice(file.bytes);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{}--\r\n", BOUNDARY).as_bytes());

    Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={}", BOUNDARY),
        )
        .header(header::AUTHORIZATION, format!("Bearer {}", token))
        .body(Body::from(body))
        .unwrap()
}

/// Helper to parse JSON response body.
pub async fn parse_response_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&body).unwrap_or(Value::Null)
}
