use axum::{
    Json, Router, middleware,
    routing::{get, post, put},
};
use serde_json::{Value, json};

use crate::middleware::require_auth;
use crate::{AppState, auth, missions};

/// All `/api` routes plus `/health`. Register and login are public; every
/// other `/api` route needs a bearer token. CORS and tracing layers are left
/// to the binary.
pub fn router(state: AppState) -> Router {
    let public_routes = Router::new()
        .route("/api/auth/register", post(auth::register))
        .route("/api/auth/login", post(auth::login));

    // The legacy client addresses the collection with a trailing slash.
    let protected_routes = Router::new()
        .route("/api/auth/verify", post(auth::verify))
        .route(
            "/api/missions",
            get(missions::list_missions).post(missions::create_mission),
        )
        .route(
            "/api/missions/",
            get(missions::list_missions).post(missions::create_mission),
        )
        .route(
            "/api/missions/{id}",
            put(missions::update_mission).delete(missions::delete_mission),
        )
        .route_layer(middleware::from_fn_with_state(state.clone(), require_auth));

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .route("/health", get(health))
        .with_state(state)
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}
