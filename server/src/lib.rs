//! HTTP surface of the editor: routes, handlers, and the HTML control
//! panel. Handlers own the per-request cycle: resolve session, take the
//! session lock, parse the file, apply the mutation protocol, serialize
//! back, redirect.

pub mod error;
pub mod handlers;
pub mod html;
pub mod params;
pub mod state;

use axum::routing::{get, post};
use axum::Router;
use state::AppState;

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::view))
        .route("/imgs/:sessionid", get(handlers::image))
        .route("/selectnode", get(handlers::select_node))
        .route("/selectedge", get(handlers::select_edge))
        .route("/addnode", post(handlers::add_node))
        .route("/deletenode", post(handlers::delete_node))
        .route("/editnode", post(handlers::edit_node))
        .with_state(state)
}
