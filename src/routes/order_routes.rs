use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
    Extension, Json, Router,
};
use chrono::Utc;
use uuid::Uuid;

use crate::dto::api_response::ApiResponse;
use crate::dto::order_dto::{CreateOrderRequest, OrderListQuery, OrderResponse, UpdateOrderRequest};
use crate::middleware::TenantContext;
use crate::state::AppState;
use crate::utils::errors::AppError;

pub fn create_order_router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_orders).post(create_order))
        .route("/:id", get(get_order).patch(update_order).delete(delete_order))
}

async fn create_order(
    State(state): State<AppState>,
    Extension(tenant): Extension<TenantContext>,
    Json(request): Json<CreateOrderRequest>,
) -> Result<(StatusCode, Json<ApiResponse<OrderResponse>>), AppError> {
    let response = state
        .order_controller()
        .create(tenant.tenant_id, request, Utc::now())
        .await?;
    Ok((StatusCode::CREATED, Json(response)))
}

async fn list_orders(
    State(state): State<AppState>,
    Extension(tenant): Extension<TenantContext>,
    Query(query): Query<OrderListQuery>,
) -> Result<Json<ApiResponse<Vec<OrderResponse>>>, AppError> {
    let orders = state.order_controller().list(tenant.tenant_id, query.status).await?;
    Ok(Json(ApiResponse::success(orders)))
}

async fn get_order(
    State(state): State<AppState>,
    Extension(tenant): Extension<TenantContext>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<OrderResponse>>, AppError> {
    let order = state.order_controller().get(tenant.tenant_id, id).await?;
    Ok(Json(ApiResponse::success(order)))
}

async fn update_order(
    State(state): State<AppState>,
    Extension(tenant): Extension<TenantContext>,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateOrderRequest>,
) -> Result<Json<ApiResponse<OrderResponse>>, AppError> {
    let response = state
        .order_controller()
        .update(tenant.tenant_id, id, request, Utc::now())
        .await?;
    Ok(Json(response))
}

async fn delete_order(
    State(state): State<AppState>,
    Extension(tenant): Extension<TenantContext>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<()>>, AppError> {
    state.order_controller().delete(tenant.tenant_id, id).await?;
    Ok(Json(ApiResponse::message("Order deleted".to_string())))
}
