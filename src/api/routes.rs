//! API Routes
//!
//! Configures the Axum router with all policy service endpoints.

use axum::{
    routing::{delete, get, post},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use super::handlers::{
    clear_cache_handler, create_policies_handler, create_policy_handler, delete_policy_handler,
    filter_policies_handler, get_all_policies_handler, get_policies_page_handler,
    get_policy_by_number_handler, get_policy_handler, health_handler, stats_handler,
    update_policy_handler, AppState,
};

/// Creates the main router with all endpoints configured.
///
/// # Endpoints
/// - `POST /api/v1/policies` - Create a policy
/// - `GET /api/v1/policies` - Paged listing (`page`, `size`)
/// - `POST /api/v1/policies/batch` - Create several policies at once
/// - `GET /api/v1/policies/all` - Unpaged listing
/// - `GET /api/v1/policies/filter` - Filtered listing
/// - `GET /api/v1/policies/policyNumber/:policy_number` - Lookup by policy number
/// - `GET|PUT|DELETE /api/v1/policies/:id` - Lookup, update, delete by id
/// - `GET /stats` - Per-region cache statistics
/// - `DELETE /cache` - Clear every cache region
/// - `GET /health` - Health check endpoint
///
/// # Middleware
/// - CORS: Allows any origin (configurable for production)
/// - Tracing: Logs all requests for debugging
pub fn create_router(state: AppState) -> Router {
    // Configure CORS middleware
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let policies = Router::new()
        .route("/", post(create_policy_handler).get(get_policies_page_handler))
        .route("/batch", post(create_policies_handler))
        .route("/all", get(get_all_policies_handler))
        .route("/filter", get(filter_policies_handler))
        .route(
            "/policyNumber/:policy_number",
            get(get_policy_by_number_handler),
        )
        .route(
            "/:id",
            get(get_policy_handler)
                .put(update_policy_handler)
                .delete(delete_policy_handler),
        );

    Router::new()
        .nest("/api/v1/policies", policies)
        .route("/stats", get(stats_handler))
        .route("/cache", delete(clear_cache_handler))
        .route("/health", get(health_handler))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
