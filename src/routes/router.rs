use axum::error_handling::HandleErrorLayer;
use axum::extract::{DefaultBodyLimit, MatchedPath, Request};
use axum::http::{HeaderValue, Method, header};
use axum::{
    Router, middleware,
    routing::{get, post},
};
use std::time::Duration;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info_span;

use crate::auth::require_auth;
use crate::core::config::Args;
use crate::core::error::{self, ConfigError};
use crate::core::state::AppState;
use crate::routes::{admin, attachment, task, user};

pub(crate) fn routes(state: AppState, config: &Args) -> Result<Router, ConfigError> {
    // everything here runs behind the auth gate
    let protected = Router::new()
        .route("/validate", get(user::validate))
        .route("/users", get(admin::list_users))
        .route("/tasks", get(task::list).post(task::create))
        .route(
            "/tasks/{id}",
            get(task::get).put(task::update).delete(task::delete),
        )
        .route("/tasks/{id}/upload", post(attachment::upload))
        .route("/tasks/{id}/attachments", get(attachment::list))
        .route("/tasks/{id}/attachments/{name}", get(attachment::download))
        .route_layer(middleware::from_fn_with_state(state.clone(), require_auth));

    let cors = CorsLayer::new()
        .allow_origin(HeaderValue::from_str(&config.allowed_origin)?)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
        .allow_credentials(true)
        .max_age(Duration::from_secs(12 * 60 * 60));

    Ok(Router::new()
        .route("/", get(|| async { "OK" }))
        .route("/signup", post(user::signup))
        .route("/login", post(user::login))
        .route("/logout", post(user::logout))
        .merge(protected)
        .layer(DefaultBodyLimit::max(config.max_upload_bytes))
        .with_state(state)
        .layer(
            ServiceBuilder::new()
                .layer(
                    TraceLayer::new_for_http().make_span_with(|request: &Request<_>| {
                        let matched_path = request
                            .extensions()
                            .get::<MatchedPath>()
                            .map(MatchedPath::as_str);

                        info_span!(
                            "request",
                            method = ?request.method(),
                            matched_path,
                        )
                    }),
                )
                .layer(HandleErrorLayer::new(error::handle_middleware_errors))
                .timeout(config.request_timeout())
                .buffer(128)
                .rate_limit(config.rate_limit_per_sec, Duration::from_secs(1))
                .layer(cors),
        ))
}
