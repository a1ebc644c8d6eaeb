//! API Handlers
//!
//! HTTP request handlers for each policy endpoint. Handlers only translate
//! between HTTP and the policy service.

use std::sync::Arc;

use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Path, Query, State,
    },
    http::{header, StatusCode},
    response::IntoResponse,
    Json,
};

use crate::cache::PolicyCaches;
use crate::config::Config;
use crate::error::{PolicyError, Result};
use crate::models::{
    ClearResponse, FilterQuery, HealthResponse, NewPolicy, Page, PageQuery, PolicyId,
    PolicyPatch, PolicyRecord, RegionStatsResponse, StatsResponse,
};
use crate::service::PolicyService;
use crate::store::{InMemoryPolicyStore, PolicyStore};

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    /// Policy service (shares store and cache regions across clones)
    pub service: PolicyService,
    /// Page size when a paged listing does not specify one
    pub default_page_size: usize,
}

impl AppState {
    /// Creates a new AppState around an existing service.
    pub fn new(service: PolicyService) -> Self {
        Self {
            service,
            default_page_size: Config::default().default_page_size,
        }
    }

    /// Creates a new AppState from configuration, backed by an in-memory store.
    pub fn from_config(config: &Config) -> Self {
        let store: Arc<dyn PolicyStore> = Arc::new(InMemoryPolicyStore::new());
        let caches = Arc::new(PolicyCaches::from_config(config));
        Self {
            service: PolicyService::new(store, caches),
            default_page_size: config.default_page_size,
        }
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}

fn parse_id(raw: &str) -> Result<PolicyId> {
    raw.parse().map_err(|_| {
        PolicyError::InvalidArgument(format!("Policy id must be a positive integer, got '{}'", raw))
    })
}

fn json_body<T>(body: std::result::Result<Json<T>, JsonRejection>) -> Result<T> {
    body.map(|Json(value)| value)
        .map_err(|rejection| PolicyError::InvalidArgument(rejection.body_text()))
}

/// Handler for POST /api/v1/policies
pub async fn create_policy_handler(
    State(state): State<AppState>,
    body: std::result::Result<Json<NewPolicy>, JsonRejection>,
) -> Result<impl IntoResponse> {
    let created = state.service.create_policy(json_body(body)?).await?;
    let location = created
        .id
        .map(|id| format!("/api/v1/policies/{}", id))
        .unwrap_or_default();

    Ok((
        StatusCode::CREATED,
        [(header::LOCATION, location)],
        Json(created),
    ))
}

/// Handler for POST /api/v1/policies/batch
pub async fn create_policies_handler(
    State(state): State<AppState>,
    body: std::result::Result<Json<Vec<NewPolicy>>, JsonRejection>,
) -> Result<Json<Vec<PolicyRecord>>> {
    let created = state.service.create_policies(json_body(body)?).await?;
    Ok(Json(created))
}

/// Handler for GET /api/v1/policies/:id
pub async fn get_policy_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<PolicyRecord>> {
    let policy = state.service.get_policy(parse_id(&id)?).await?;
    Ok(Json(policy))
}

/// Handler for GET /api/v1/policies/policyNumber/:policy_number
pub async fn get_policy_by_number_handler(
    State(state): State<AppState>,
    Path(policy_number): Path<String>,
) -> Result<Json<PolicyRecord>> {
    let policy = state.service.get_policy_by_number(&policy_number).await?;
    Ok(Json(policy))
}

/// Handler for GET /api/v1/policies/all
pub async fn get_all_policies_handler(
    State(state): State<AppState>,
) -> Result<Json<Vec<PolicyRecord>>> {
    let policies = state.service.get_all_policies().await?;
    Ok(Json(policies))
}

/// Handler for GET /api/v1/policies?page=&size=
pub async fn get_policies_page_handler(
    State(state): State<AppState>,
    query: std::result::Result<Query<PageQuery>, QueryRejection>,
) -> Result<Json<Page<PolicyRecord>>> {
    let Query(query) =
        query.map_err(|rejection| PolicyError::InvalidArgument(rejection.body_text()))?;
    let page = state
        .service
        .get_policies_page(
            query.page.unwrap_or(0),
            query.size.unwrap_or(state.default_page_size),
        )
        .await?;
    Ok(Json(page))
}

/// Handler for GET /api/v1/policies/filter
pub async fn filter_policies_handler(
    State(state): State<AppState>,
    query: std::result::Result<Query<FilterQuery>, QueryRejection>,
) -> Result<Json<Vec<PolicyRecord>>> {
    let Query(query) =
        query.map_err(|rejection| PolicyError::InvalidArgument(rejection.body_text()))?;
    let filter = query.into_filter()?;
    let policies = state.service.find_policies(&filter).await?;
    Ok(Json(policies))
}

/// Handler for PUT /api/v1/policies/:id
pub async fn update_policy_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: std::result::Result<Json<PolicyPatch>, JsonRejection>,
) -> Result<Json<PolicyRecord>> {
    let id = parse_id(&id)?;
    let updated = state.service.update_policy(id, json_body(body)?).await?;
    Ok(Json(updated))
}

/// Handler for DELETE /api/v1/policies/:id
pub async fn delete_policy_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode> {
    state.service.delete_policy(parse_id(&id)?).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Handler for GET /stats
pub async fn stats_handler(State(state): State<AppState>) -> Json<StatsResponse> {
    let regions = state
        .service
        .caches()
        .stats()
        .await
        .into_iter()
        .map(|(name, stats)| RegionStatsResponse::new(name, &stats))
        .collect();

    Json(StatsResponse { regions })
}

/// Handler for DELETE /cache
pub async fn clear_cache_handler(State(state): State<AppState>) -> Json<ClearResponse> {
    let cleared = state.service.clear_caches().await;
    Json(ClearResponse::new(cleared))
}

/// Handler for GET /health
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::healthy())
}
