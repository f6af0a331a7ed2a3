use crate::presentation::app_state::AppState;
use crate::presentation::handlers;
use axum::{
    routing::{get, patch, post, put},
    Router,
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/healthz", get(handlers::health_check))
        .route("/dashboard/stats", get(handlers::get_stats))
        .route("/dashboard/stats/refresh", post(handlers::refresh_stats))
        .route("/dashboard/stats/search", post(handlers::search_stats))
        .route("/dashboard/stats/:section/page", post(handlers::set_section_page))
        .route("/dashboard/stats/:section/size", post(handlers::set_section_size))
        .route("/dashboard/stats/:section/next", post(handlers::next_section_page))
        .route(
            "/dashboard/stats/:section/previous",
            post(handlers::previous_section_page),
        )
        .route("/dashboard/activities", get(handlers::get_activities))
        .route("/dashboard/activities/refresh", post(handlers::refresh_activities))
        .route("/dashboard/activities/next", post(handlers::next_activity_page))
        .route(
            "/dashboard/activities/previous",
            post(handlers::previous_activity_page),
        )
        .route("/dashboard/messages", get(handlers::list_messages))
        .route("/dashboard/publications", get(handlers::list_publications))
        .route("/dashboard/users", get(handlers::list_users))
        .route(
            "/dashboard/passcodes",
            get(handlers::list_passcodes).post(handlers::create_passcode),
        )
        .route("/dashboard/users/:id/block", patch(handlers::block_user))
        .route("/dashboard/users/:id/unblock", patch(handlers::unblock_user))
        .route(
            "/dashboard/users/:id",
            put(handlers::update_user).delete(handlers::delete_user),
        )
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}
