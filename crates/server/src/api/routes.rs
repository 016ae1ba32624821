use axum::{
    middleware,
    routing::{get, post, put},
    Router,
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use super::middleware::metrics_middleware;
use super::{dashboard, departments, handlers, tickets};
use crate::state::AppState;

pub fn create_router(state: Arc<AppState>) -> Router {
    // API routes
    let api_routes = Router::new()
        // System
        .route("/health", get(handlers::health))
        .route("/config", get(handlers::get_config))
        .route("/statuses", get(handlers::list_statuses))
        // Tickets
        .route(
            "/tickets",
            post(tickets::create_ticket).get(tickets::list_tickets),
        )
        .route("/tickets/{id}", get(tickets::get_ticket))
        .route("/tickets/{id}/status", put(tickets::update_status))
        .route("/tickets/{id}/department", put(tickets::reroute))
        .route(
            "/tickets/{id}/recategorize",
            post(tickets::recategorize_ticket),
        )
        // Departments
        .route("/departments", get(departments::list_departments))
        .route(
            "/departments/{department}/tickets",
            get(departments::department_tickets),
        )
        // Dashboard
        .route("/dashboard/summary", get(dashboard::summary))
        .route("/dashboard/routing", get(dashboard::routing))
        .route("/dashboard/validation", get(dashboard::validation))
        .method_not_allowed_fallback(handlers::method_not_allowed);

    Router::new()
        .route("/", get(handlers::index))
        .route("/metrics", get(handlers::metrics))
        .nest("/api", api_routes)
        .fallback(handlers::not_found)
        .method_not_allowed_fallback(handlers::method_not_allowed)
        .with_state(state)
        .layer(middleware::from_fn(metrics_middleware))
        .layer(TraceLayer::new_for_http())
}
