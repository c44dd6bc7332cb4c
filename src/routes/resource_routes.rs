use axum::{
    extract::{Path, Query, State},
    routing::{get, put},
    Extension, Json, Router,
};
use uuid::Uuid;

use crate::dto::api_response::ApiResponse;
use crate::dto::resource_dto::{AssignVehicleRequest, CandidateQuery, ResourceCandidateResponse};
use crate::middleware::TenantContext;
use crate::models::resource::Driver;
use crate::state::AppState;
use crate::utils::errors::AppError;

pub fn create_resource_router() -> Router<AppState> {
    Router::new()
        .route("/candidates", get(list_candidates))
        .route("/drivers/:id/vehicle", put(assign_default_vehicle))
}

async fn list_candidates(
    State(state): State<AppState>,
    Extension(tenant): Extension<TenantContext>,
    Query(query): Query<CandidateQuery>,
) -> Result<Json<ApiResponse<Vec<ResourceCandidateResponse>>>, AppError> {
    let candidates = state
        .resource_controller()
        .list_candidates(tenant.tenant_id, query)
        .await?;
    Ok(Json(ApiResponse::success(candidates)))
}

async fn assign_default_vehicle(
    State(state): State<AppState>,
    Extension(tenant): Extension<TenantContext>,
    Path(driver_id): Path<Uuid>,
    Json(request): Json<AssignVehicleRequest>,
) -> Result<Json<ApiResponse<Driver>>, AppError> {
    let response = state
        .resource_controller()
        .assign_default_vehicle(tenant.tenant_id, driver_id, request)
        .await?;
    Ok(Json(response))
}
