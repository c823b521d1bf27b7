// src/routes.rs

use axum::{
    Router, http::Method, middleware,
    routing::{delete, get, post, put},
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::{
    handlers::{admin, auth, content, exam},
    state::AppState,
    utils::jwt::{admin_middleware, auth_middleware},
};

/// Assembles the main application router.
///
/// * Merges all sub-routers (auth, content, exam, admin).
/// * Applies global middleware (Trace, CORS).
/// * Injects global state (pool + config).
pub fn create_router(state: AppState) -> Router {
    let origins = [
        "http://localhost:3000".parse().unwrap(),
        "http://127.0.0.1:3000".parse().unwrap(),
    ];

    let cors = CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([
            axum::http::header::AUTHORIZATION,
            axum::http::header::CONTENT_TYPE,
        ]);

    let auth_routes = Router::new()
        .route("/register", post(auth::register))
        .route("/login", post(auth::login))
        // Logout needs the claims to know whose device slot to release.
        .merge(
            Router::new()
                .route("/logout", post(auth::logout))
                .layer(middleware::from_fn_with_state(
                    state.clone(),
                    auth_middleware,
                )),
        );

    let content_routes = Router::new()
        .route("/topics", get(content::list_topics))
        .route("/packages", get(content::list_packages))
        .route("/tickets", get(content::list_tickets));

    // Every exam operation is owned: the whole subtree sits behind auth.
    let exam_routes = Router::new()
        .route("/package", post(exam::start_package))
        .route("/marathon", post(exam::start_marathon))
        .route("/ticket", post(exam::start_ticket))
        .route("/active", get(exam::get_active_session))
        .route("/{id}/autosave", post(exam::auto_save))
        .route("/{id}/submit", post(exam::submit))
        .route("/{id}/abandon", post(exam::abandon))
        .route("/{id}/result", get(exam::get_result))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ));

    let admin_routes = Router::new()
        .route("/users", get(admin::list_users).post(admin::create_user))
        .route(
            "/users/{id}",
            put(admin::update_user).delete(admin::delete_user),
        )
        .route("/users/{id}/device-limit", put(admin::set_user_device_limit))
        .route("/device-limit", put(admin::set_default_device_limit))
        .route("/topics", post(admin::create_topic))
        .route(
            "/topics/{id}",
            put(admin::update_topic).delete(admin::delete_topic),
        )
        .route("/questions", post(admin::create_question))
        .route(
            "/questions/{id}",
            put(admin::update_question).delete(admin::delete_question),
        )
        .route("/packages", post(admin::create_package))
        .route(
            "/packages/{id}",
            put(admin::update_package).delete(admin::delete_package),
        )
        .route("/tickets", post(admin::create_ticket))
        .route("/tickets/{id}", delete(admin::delete_ticket))
        // Double middleware protection: Auth first, then Admin check
        .layer(middleware::from_fn(admin_middleware))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ));

    Router::new()
        .nest("/api/auth", auth_routes)
        .nest("/api/content", content_routes)
        .nest("/api/exam", exam_routes)
        .nest("/api/admin", admin_routes)
        // Global Middleware (applied from outside in)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
