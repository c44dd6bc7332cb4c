//! Orquestador del ciclo de vida de pedidos
//!
//! Coordina validación de payload, referencias del tenant, rutas, recursos,
//! asignación de número, reglas de hitos y avisos de recursos en uso.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use rand::Rng;
use tracing::{info, warn};
use uuid::Uuid;
use validator::Validate;

use crate::dto::api_response::ApiResponse;
use crate::dto::order_dto::{CargoItemRequest, CreateOrderRequest, OrderResponse, UpdateOrderRequest};
use crate::models::order::{Order, OrderStatus};
use crate::models::resource::ResourceKind;
use crate::repositories::WaybillRepository;
use crate::services::milestones::apply_patch;
use crate::services::order_number::OrderNumberGenerator;
use crate::services::resource_conflicts::{order_warnings, ResourceConflictChecker};
use crate::services::route_validator::RouteValidator;
use crate::utils::errors::{
    bad_request_error, conflict_error, not_found_error, validation_error, AppError, AppResult,
};

const RETRY_BASE_DELAY_MS: u64 = 25;

pub struct OrderController {
    repository: Arc<dyn WaybillRepository>,
    max_number_attempts: u32,
}

impl OrderController {
    pub fn new(repository: Arc<dyn WaybillRepository>, max_number_attempts: u32) -> Self {
        Self {
            repository,
            max_number_attempts: max_number_attempts.max(1),
        }
    }

    pub async fn create(
        &self,
        tenant_id: Uuid,
        request: CreateOrderRequest,
        now: DateTime<Utc>,
    ) -> AppResult<ApiResponse<OrderResponse>> {
        request.validate()?;
        validate_cargo(&request.cargo_items)?;

        self.check_customer(tenant_id, request.customer_id).await?;
        if let Some(contract_id) = request.contract_id {
            self.check_contract(tenant_id, contract_id, request.customer_id).await?;
        }
        RouteValidator::new(self.repository.as_ref())
            .validate(
                tenant_id,
                request.customer_id,
                request.from_location_id,
                request.to_location_id,
            )
            .await?;

        let accessory_ids = dedup(request.accessory_ids);
        self.check_resource(tenant_id, request.vehicle_id, ResourceKind::Vehicle).await?;
        self.check_resource(tenant_id, request.attachment_id, ResourceKind::Attachment).await?;
        self.check_accessories(tenant_id, &accessory_ids).await?;
        self.check_driver(tenant_id, request.driver_id).await?;

        let mut order = Order {
            id: Uuid::new_v4(),
            tenant_id,
            order_number: String::new(),
            customer_id: request.customer_id,
            contract_id: request.contract_id,
            from_location_id: request.from_location_id,
            to_location_id: request.to_location_id,
            vehicle_id: request.vehicle_id,
            attachment_id: request.attachment_id,
            accessory_ids,
            driver_id: request.driver_id,
            cargo_items: request
                .cargo_items
                .into_iter()
                .map(CargoItemRequest::into_cargo_item)
                .collect(),
            status: OrderStatus::Pending,
            requested_at: request.requested_at,
            eta: request.eta,
            arrival_at_loading: None,
            loading_completed_at: None,
            arrival_at_offloading: None,
            unloading_completed_at: None,
            start_odometer: request.start_odometer,
            closing_odometer: None,
            run_distance: None,
            notes: request.notes,
            created_at: now,
            updated_at: now,
        };

        let saved = self.insert_with_number(&mut order, now).await?;
        let warnings = ResourceConflictChecker::new(self.repository.as_ref())
            .warnings_for(tenant_id, &saved)
            .await?;

        info!("📦 Pedido {} creado para cliente {}", saved.order_number, saved.customer_id);
        let message = format!("Order {} created", saved.order_number);
        Ok(ApiResponse::success_with_message(OrderResponse::new(saved, warnings), message))
    }

    /// Genera número e inserta; ante un duplicado concurrente vuelve a generar
    async fn insert_with_number(&self, order: &mut Order, now: DateTime<Utc>) -> AppResult<Order> {
        let generator = OrderNumberGenerator::new(self.repository.as_ref());
        let mut attempt = 0;

        loop {
            attempt += 1;
            order.order_number = generator.generate(order.tenant_id, now).await?.to_string();

            match self.repository.insert_order(order).await {
                Ok(saved) => return Ok(saved),
                Err(AppError::DuplicateOrderNumber(number)) if attempt < self.max_number_attempts => {
                    warn!(
                        "⚠️ Número {} ya asignado, reintentando ({}/{})",
                        number, attempt, self.max_number_attempts
                    );
                    tokio::time::sleep(retry_delay(attempt)).await;
                }
                Err(AppError::DuplicateOrderNumber(number)) => {
                    warn!("❌ Sin número de pedido libre tras {} intentos", attempt);
                    return Err(conflict_error(format!(
                        "Could not allocate a unique order number after {} attempts (last tried {})",
                        attempt, number
                    )));
                }
                Err(e) => return Err(e),
            }
        }
    }

    pub async fn update(
        &self,
        tenant_id: Uuid,
        order_id: Uuid,
        request: UpdateOrderRequest,
        now: DateTime<Utc>,
    ) -> AppResult<ApiResponse<OrderResponse>> {
        request.validate()?;
        if let Some(items) = &request.cargo_items {
            validate_cargo(items)?;
        }

        let mut order = self
            .repository
            .find_order(tenant_id, order_id)
            .await?
            .ok_or_else(|| not_found_error("Order", order_id))?;

        let customer_id = request.customer_id.unwrap_or(order.customer_id);
        let from_location_id = request.from_location_id.unwrap_or(order.from_location_id);
        let to_location_id = request.to_location_id.unwrap_or(order.to_location_id);
        let contract_id = request.contract_id.or(order.contract_id);

        if request.customer_id.is_some() {
            self.check_customer(tenant_id, customer_id).await?;
        }
        if request.contract_id.is_some() || request.customer_id.is_some() {
            if let Some(contract_id) = contract_id {
                self.check_contract(tenant_id, contract_id, customer_id).await?;
            }
        }
        if request.customer_id.is_some() || request.from_location_id.is_some() || request.to_location_id.is_some() {
            RouteValidator::new(self.repository.as_ref())
                .validate(tenant_id, customer_id, from_location_id, to_location_id)
                .await?;
        }

        let accessory_ids = request.accessory_ids.clone().map(dedup);
        self.check_resource(tenant_id, request.vehicle_id, ResourceKind::Vehicle).await?;
        self.check_resource(tenant_id, request.attachment_id, ResourceKind::Attachment).await?;
        if let Some(ids) = &accessory_ids {
            self.check_accessories(tenant_id, ids).await?;
        }
        self.check_driver(tenant_id, request.driver_id).await?;

        let patch = request.milestone_patch();
        let start_odometer = request.start_odometer.unwrap_or(order.start_odometer);
        let mut closes_order = false;
        if !patch.is_empty() || request.start_odometer.is_some() {
            let outcome = apply_patch(&order.timeline(), start_odometer, order.closing_odometer, &patch)?;
            order.set_timeline(&outcome.timeline);
            order.closing_odometer = outcome.closing_odometer;
            order.run_distance = outcome.run_distance;
            closes_order = outcome.closes_order;
        }

        order.customer_id = customer_id;
        order.contract_id = contract_id;
        order.from_location_id = from_location_id;
        order.to_location_id = to_location_id;
        order.start_odometer = start_odometer;
        if request.vehicle_id.is_some() {
            order.vehicle_id = request.vehicle_id;
        }
        if request.attachment_id.is_some() {
            order.attachment_id = request.attachment_id;
        }
        if let Some(ids) = accessory_ids {
            order.accessory_ids = ids;
        }
        if request.driver_id.is_some() {
            order.driver_id = request.driver_id;
        }
        if let Some(items) = request.cargo_items {
            order.cargo_items = items.into_iter().map(CargoItemRequest::into_cargo_item).collect();
        }
        if request.requested_at.is_some() {
            order.requested_at = request.requested_at;
        }
        if request.eta.is_some() {
            order.eta = request.eta;
        }
        if request.notes.is_some() {
            order.notes = request.notes;
        }

        let previous_status = order.status;
        if let Some(status) = request.status {
            order.status = status;
        }
        if closes_order {
            order.status = OrderStatus::Closed;
        }
        if order.status != previous_status {
            info!(
                "🔄 Pedido {}: {:?} → {:?}",
                order.order_number, previous_status, order.status
            );
        }
        order.updated_at = now;

        let saved = self.repository.update_order(&order).await?;
        let warnings = ResourceConflictChecker::new(self.repository.as_ref())
            .warnings_for(tenant_id, &saved)
            .await?;

        let message = format!("Order {} updated", saved.order_number);
        Ok(ApiResponse::success_with_message(OrderResponse::new(saved, warnings), message))
    }

    pub async fn get(&self, tenant_id: Uuid, order_id: Uuid) -> AppResult<OrderResponse> {
        let order = self
            .repository
            .find_order(tenant_id, order_id)
            .await?
            .ok_or_else(|| not_found_error("Order", order_id))?;

        let warnings = ResourceConflictChecker::new(self.repository.as_ref())
            .warnings_for(tenant_id, &order)
            .await?;
        Ok(OrderResponse::new(order, warnings))
    }

    pub async fn list(&self, tenant_id: Uuid, status: Option<OrderStatus>) -> AppResult<Vec<OrderResponse>> {
        let orders = self.repository.list_orders(tenant_id, status).await?;
        let assignments = self.repository.active_assignments(tenant_id).await?;

        Ok(orders
            .into_iter()
            .map(|order| {
                let warnings = order_warnings(&assignments, &order);
                OrderResponse::new(order, warnings)
            })
            .collect())
    }

    pub async fn delete(&self, tenant_id: Uuid, order_id: Uuid) -> AppResult<()> {
        if !self.repository.delete_order(tenant_id, order_id).await? {
            return Err(not_found_error("Order", order_id));
        }

        info!("🗑️ Pedido {} eliminado", order_id);
        Ok(())
    }

    async fn check_customer(&self, tenant_id: Uuid, customer_id: Uuid) -> AppResult<()> {
        self.repository
            .find_customer(tenant_id, customer_id)
            .await?
            .ok_or_else(|| not_found_error("Customer", customer_id))?;
        Ok(())
    }

    async fn check_contract(&self, tenant_id: Uuid, contract_id: Uuid, customer_id: Uuid) -> AppResult<()> {
        let contract = self
            .repository
            .find_contract(tenant_id, contract_id)
            .await?
            .ok_or_else(|| not_found_error("Contract", contract_id))?;

        if contract.customer_id != customer_id {
            return Err(bad_request_error(format!(
                "Contract {} does not belong to the order's customer",
                contract.reference
            )));
        }
        Ok(())
    }

    async fn check_resource(&self, tenant_id: Uuid, resource_id: Option<Uuid>, expected: ResourceKind) -> AppResult<()> {
        let Some(resource_id) = resource_id else {
            return Ok(());
        };

        let resource = self
            .repository
            .find_resource(tenant_id, resource_id)
            .await?
            .ok_or_else(|| not_found_error(&expected.to_string(), resource_id))?;

        if resource.kind() != expected {
            return Err(bad_request_error(format!(
                "Resource '{}' is of kind {}, expected {}",
                resource.name,
                resource.kind(),
                expected
            )));
        }
        Ok(())
    }

    async fn check_accessories(&self, tenant_id: Uuid, accessory_ids: &[Uuid]) -> AppResult<()> {
        for id in accessory_ids {
            self.check_resource(tenant_id, Some(*id), ResourceKind::Accessory).await?;
        }
        Ok(())
    }

    async fn check_driver(&self, tenant_id: Uuid, driver_id: Option<Uuid>) -> AppResult<()> {
        if let Some(driver_id) = driver_id {
            self.repository
                .find_driver(tenant_id, driver_id)
                .await?
                .ok_or_else(|| not_found_error("Driver", driver_id))?;
        }
        Ok(())
    }
}

/// Valida cada item indicando su posición (1-based) en el mensaje
fn validate_cargo(items: &[CargoItemRequest]) -> AppResult<()> {
    for (index, item) in items.iter().enumerate() {
        if let Err(errors) = item.validate() {
            return Err(validation_error(
                "cargo_items",
                format!("Cargo item {} is invalid: {}", index + 1, errors),
            ));
        }
    }
    Ok(())
}

/// Espera antes de reintentar: crece con el intento y añade jitter aleatorio
fn retry_delay(attempt: u32) -> Duration {
    let base = RETRY_BASE_DELAY_MS * u64::from(attempt);
    let jitter = rand::thread_rng().gen_range(0..=RETRY_BASE_DELAY_MS);
    Duration::from_millis(base + jitter)
}

/// Elimina ids repetidos conservando el orden de llegada
fn dedup(ids: Vec<Uuid>) -> Vec<Uuid> {
    let mut seen = std::collections::HashSet::new();
    ids.into_iter().filter(|id| seen.insert(*id)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dedup_keeps_first_occurrence() {
        let (a, b) = (Uuid::new_v4(), Uuid::new_v4());
        assert_eq!(dedup(vec![a, b, a, b]), vec![a, b]);
    }

    #[test]
    fn test_retry_delay_grows_with_jitter() {
        for attempt in 1..=4u32 {
            let delay = retry_delay(attempt).as_millis() as u64;
            let base = RETRY_BASE_DELAY_MS * u64::from(attempt);
            assert!(delay >= base && delay <= base + RETRY_BASE_DELAY_MS);
        }
    }
}
