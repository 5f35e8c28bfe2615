use axum::Router;
use tower_http::services::ServeDir;

use crate::modules::storage::LocalMediaStore;
use crate::shared::constants::UPLOADS_ROUTE;

/// Serve stored photos as static files
///
/// Content type is inferred from the file extension; unknown names get 404.
pub fn routes(media: &LocalMediaStore) -> Router {
    Router::new().nest_service(UPLOADS_ROUTE, ServeDir::new(media.root()))
}
