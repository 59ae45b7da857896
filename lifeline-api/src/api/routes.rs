use axum::{
    extract::DefaultBodyLimit,
    middleware,
    routing::{get, post},
    Router,
};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing::debug;

use lifeline_domain::auth::{auth_middleware, configure_security_layers};

use crate::api::handlers::{agent, health, records, reports, users};
use crate::api::state::AppState;
use crate::openapi::configure_swagger_routes;

/// Build the application router over `state`
pub fn create_app(state: AppState) -> Router {
    debug!("Creating application router");

    // Routes below require a valid bearer token
    let protected = Router::new()
        .route(
            "/api/users/me",
            get(users::me).patch(users::update_me).delete(users::delete_me),
        )
        .route(
            "/api/reports/upload",
            post(reports::upload_report).layer(DefaultBodyLimit::max(reports::MAX_UPLOAD_BYTES)),
        )
        .merge(records::health_records::routes())
        .merge(records::medicines::routes())
        .merge(records::appointments::routes())
        .merge(records::reports::routes())
        .merge(records::blood_requests::routes())
        .merge(records::emergencies::routes())
        .route("/api/ai/summarize-report/:report_id", post(reports::summarize_report))
        .route("/agent/timeline", post(agent::timeline))
        .route("/agent/chat", post(agent::chat))
        .route("/agent/chat/clear", post(agent::clear_chat))
        .route("/agent/suggest-doctor", post(agent::suggest_doctor))
        .route_layer(middleware::from_fn_with_state(state.tokens.clone(), auth_middleware));

    debug!("Protected routes configured");

    let public = Router::new()
        .route("/", get(health::root))
        .route("/health", get(health::health_check))
        .route("/api/users", post(users::register))
        .route("/api/users/login", post(users::login));

    let files = ServeDir::new(&state.files_root);

    let app = Router::new()
        .merge(public)
        .merge(protected)
        .with_state(state)
        .nest_service("/files", files)
        .merge(configure_swagger_routes());

    debug!("Routes merged");

    configure_security_layers(app).layer(TraceLayer::new_for_http())
}
