// src/routes.rs

use std::path::Path;

use axum::{
    Router,
    extract::DefaultBodyLimit,
    http::{HeaderName, HeaderValue, Method, header},
    middleware,
    routing::{get, post, put},
};
use tower::ServiceBuilder;
use tower_http::{
    cors::CorsLayer,
    services::{ServeDir, ServeFile},
    trace::TraceLayer,
};

use crate::{
    handlers::{auth, dashboard, questions, system},
    state::AppState,
    utils::auth::{ADMIN_TOKEN_HEADER, auth_middleware},
};

/// Question images travel inline, so bodies may be large.
const MAX_BODY_BYTES: usize = 12 * 1024 * 1024;

fn cors_layer(port: u16) -> CorsLayer {
    let origins: Vec<HeaderValue> = [
        format!("http://localhost:{}", port),
        format!("http://127.0.0.1:{}", port),
    ]
    .iter()
    .filter_map(|origin| HeaderValue::from_str(origin).ok())
    .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([
            header::AUTHORIZATION,
            header::CONTENT_TYPE,
            HeaderName::from_static(ADMIN_TOKEN_HEADER),
        ])
}

/// Assembles the main application router.
///
/// * `/api/health` and `/api/auth/login` are open; every other API route
///   requires a live session.
/// * Unknown `/api` paths get a JSON 404.
/// * Everything else is served from the public directory, falling back to
///   `index.html` for client-side routes.
pub fn create_router(state: AppState) -> Router {
    let public_dir = state.config.public_dir.clone();
    let cors = cors_layer(state.config.port);

    let open_routes = Router::new()
        .route("/health", get(system::health))
        .route("/auth/login", post(auth::login));

    let protected_routes = Router::new()
        .route("/auth/logout", post(auth::logout))
        .route("/dashboard", get(dashboard::get_dashboard))
        .route("/results", get(dashboard::get_results))
        .route("/scorecard", get(dashboard::get_scorecard))
        .route("/exam/summary", get(questions::exam_summary))
        .route(
            "/exam/questions",
            get(questions::list_questions).post(questions::create_question),
        )
        .route(
            "/exam/questions/{id}",
            put(questions::update_question).delete(questions::delete_question),
        )
        .route("/config", get(system::get_config))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ));

    let api_routes = open_routes
        .merge(protected_routes)
        .fallback(system::api_not_found);

    let index = Path::new(&public_dir).join("index.html");
    let static_files = ServeDir::new(&public_dir).fallback(ServeFile::new(index));

    Router::new()
        .nest("/api", api_routes)
        .fallback_service(static_files)
        // Global Middleware (applied from outside in)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors)
                .layer(DefaultBodyLimit::max(MAX_BODY_BYTES)),
        )
        .with_state(state)
}
