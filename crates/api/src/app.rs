use axum::{
    extract::DefaultBodyLimit,
    middleware,
    routing::{get, patch, post, put},
    Router,
};
use domain::services::{
    AttachmentService, BlobStore, ChecklistLifecycle, DirectoryService, EntityStore,
    IncidentService, NotificationService, ReportingService, WorkflowLifecycle,
};
use shared::jwt::{JwtConfig, JwtError};
use std::sync::Arc;
use std::time::Duration;
use tower_http::{
    compression::CompressionLayer,
    cors::{AllowOrigin, Any, CorsLayer},
    services::ServeDir,
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::Config;
use crate::middleware::{
    metrics_handler, metrics_middleware, rate_limit_middleware, require_auth,
    security_headers_middleware, trace_id, RateLimiterState,
};
use crate::routes::{
    attachments, auth, checklists, directory, health, incidents, reports, workflows,
};
use crate::services::AuthService;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub store: Arc<dyn EntityStore>,
    pub jwt: Arc<JwtConfig>,
    pub auth: Arc<AuthService>,
    pub directory: Arc<DirectoryService>,
    pub workflows: Arc<WorkflowLifecycle>,
    pub checklists: Arc<ChecklistLifecycle>,
    pub attachments: Arc<AttachmentService>,
    pub incidents: Arc<IncidentService>,
    pub reporting: Arc<ReportingService>,
    pub rate_limiter: Option<Arc<RateLimiterState>>,
}

impl AppState {
    /// Wires every service over one store.
    pub fn new(
        config: Config,
        store: Arc<dyn EntityStore>,
        blobs: Arc<dyn BlobStore>,
        notifier: Arc<dyn NotificationService>,
    ) -> Result<Self, JwtError> {
        let jwt = Arc::new(JwtConfig::new(
            &config.jwt.secret,
            config.jwt.access_token_expiry_secs,
            config.jwt.leeway_secs,
        )?);

        let auth = AuthService::new(store.clone(), notifier, jwt.clone(), config.otp.clone());
        let attachments =
            AttachmentService::new(store.clone(), blobs, config.uploads.max_upload_bytes);
        let rate_limiter =
            RateLimiterState::new(config.security.rate_limit_per_minute).map(Arc::new);

        Ok(Self {
            jwt,
            auth: Arc::new(auth),
            directory: Arc::new(DirectoryService::new(store.clone())),
            workflows: Arc::new(WorkflowLifecycle::new(store.clone())),
            checklists: Arc::new(ChecklistLifecycle::new(store.clone())),
            attachments: Arc::new(attachments),
            incidents: Arc::new(IncidentService::new(store.clone())),
            reporting: Arc::new(ReportingService::new(store.clone())),
            store,
            rate_limiter,
            config: Arc::new(config),
        })
    }
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    if origins.is_empty() {
        // Development default
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any)
    } else {
        let origins: Vec<_> = origins.iter().filter_map(|o| o.parse().ok()).collect();
        CorsLayer::new()
            .allow_origin(AllowOrigin::list(origins))
            .allow_methods(Any)
            .allow_headers(Any)
    }
}

pub fn create_app(state: AppState) -> Router {
    let config = state.config.clone();

    // Middleware order: auth runs first, then rate limiting (which needs the principal)
    let protected_routes = Router::new()
        // Directory
        .route(
            "/api/v1/companies",
            post(directory::create_company).get(directory::list_companies),
        )
        .route(
            "/api/v1/locations",
            post(directory::create_location).get(directory::list_locations),
        )
        .route("/api/v1/locations/:location_code", get(directory::get_location))
        .route("/api/v1/users", get(directory::list_users))
        .route("/api/v1/patrols", get(directory::list_patrols))
        .route("/api/v1/patrols/:patrol_id", get(directory::patrol_detail))
        .route(
            "/api/v1/users/admins/:admin_id",
            put(directory::update_admin).delete(directory::delete_admin),
        )
        .route(
            "/api/v1/users/patrols/:patrol_id",
            put(directory::update_patrol).delete(directory::delete_patrol),
        )
        // Workflows
        .route(
            "/api/v1/workflows",
            post(workflows::create_workflow).get(workflows::list_workflows),
        )
        .route("/api/v1/workflows/completed", get(workflows::list_completed))
        .route(
            "/api/v1/workflows/completed/:patrol_id",
            get(workflows::completed_for_patrol),
        )
        .route(
            "/api/v1/workflows/:workflow_id",
            get(workflows::get_workflow)
                .put(workflows::update_workflow)
                .delete(workflows::delete_workflow),
        )
        .route(
            "/api/v1/workflows/:workflow_id/checklists",
            get(workflows::active_checklists),
        )
        .route("/api/v1/workflows/:workflow_id/start", post(workflows::start_workflow))
        .route(
            "/api/v1/workflows/:workflow_id/complete",
            post(workflows::complete_workflow),
        )
        // Checklists
        .route("/api/v1/checklists", post(checklists::create_checklist))
        .route("/api/v1/checklists/assign", put(checklists::assign_checklists))
        .route("/api/v1/checklists/complete", put(checklists::complete_checklists))
        .route("/api/v1/checklists/assigned", get(checklists::assigned_checklists))
        .route("/api/v1/checklists/open", get(checklists::open_checklists))
        .route(
            "/api/v1/checklists/grouped/:patrol_id",
            get(checklists::grouped_checklists),
        )
        .route(
            "/api/v1/checklists/workflow/:workflow_id",
            get(checklists::checklists_by_workflow),
        )
        .route(
            "/api/v1/checklists/:checklist_id",
            get(checklists::get_checklist).put(checklists::update_checklist),
        )
        .route(
            "/api/v1/checklists/:checklist_id/scan-end",
            patch(checklists::record_scan_end),
        )
        // Attachments
        .route("/api/v1/scans", post(attachments::record_scan))
        .route("/api/v1/media", post(attachments::upload_media))
        .route("/api/v1/signatures", post(attachments::upload_signature))
        .route("/api/v1/history", post(attachments::upload_history))
        // Incidents
        .route(
            "/api/v1/incident-masters",
            post(incidents::create_master).get(incidents::list_masters),
        )
        .route(
            "/api/v1/incident-masters/:code",
            get(incidents::get_master)
                .put(incidents::update_master)
                .delete(incidents::delete_master),
        )
        .route("/api/v1/incidents", post(incidents::report_incidents))
        // Reports
        .route("/api/v1/reports/:patrol_id", get(reports::patrol_report))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            rate_limit_middleware,
        ))
        .route_layer(middleware::from_fn_with_state(state.clone(), require_auth));

    let public_routes = Router::new()
        .route("/api/health", get(health::health_check))
        .route("/api/health/live", get(health::live))
        .route("/api/health/ready", get(health::ready))
        .route("/api/v1/auth/signup", post(auth::signup))
        .route("/api/v1/auth/login", post(auth::login))
        .route("/api/v1/auth/verify-otp", post(auth::verify_otp))
        .route("/metrics", get(metrics_handler))
        .nest_service("/uploads", ServeDir::new(&config.uploads.directory));

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        // Global middleware (order matters: bottom layers run first)
        .layer(DefaultBodyLimit::max(config.server.max_body_size))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            security_headers_middleware,
        ))
        .layer(CompressionLayer::new())
        .layer(TimeoutLayer::new(Duration::from_secs(
            config.server.request_timeout_secs,
        )))
        .layer(middleware::from_fn(metrics_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(middleware::from_fn(trace_id))
        .layer(cors_layer(&config.security.cors_origins))
        .with_state(state)
}
