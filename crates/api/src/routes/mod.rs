pub mod health;
pub mod scripts;

use axum::Router;

use crate::state::AppState;

/// Build the `/api` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /admin/scripts                                   list (GET), execute (POST)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new().nest("/admin/scripts", scripts::router())
}
