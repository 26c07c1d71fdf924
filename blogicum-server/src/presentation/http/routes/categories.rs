use axum::{Router, routing::get};

use crate::presentation::AppState;
use crate::presentation::http::handlers::categories::{category_posts, list_categories};

pub(crate) fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_categories))
        .route("/{slug}", get(category_posts))
}
