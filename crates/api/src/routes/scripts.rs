//! Route definitions for the admin script endpoints.

use axum::routing::get;
use axum::Router;

use crate::handlers::scripts;
use crate::state::AppState;

/// Admin routes mounted at `/admin/scripts`.
///
/// ```text
/// GET    /                          -> list_scripts
/// POST   /                          -> execute_script
/// ```
pub fn router() -> Router<AppState> {
    Router::new().route(
        "/",
        get(scripts::list_scripts).post(scripts::execute_script),
    )
}
