use axum::{
    extract::DefaultBodyLimit,
    routing::{delete, get, post},
    Router,
};

use crate::features::reports::handlers::{self, ReportState};

/// Create routes for the reports feature
///
/// All routes are public; `max_upload_size` caps the multipart body of `/upload`
pub fn routes(state: ReportState, max_upload_size: usize) -> Router {
    Router::new()
        .route(
            "/upload",
            post(handlers::upload_report).layer(DefaultBodyLimit::max(max_upload_size)),
        )
        .route("/posts", get(handlers::list_reports))
        .route("/update_status/{id}", post(handlers::update_report_status))
        .route("/delete_post/{id}", delete(handlers::delete_report))
        .with_state(state)
}
