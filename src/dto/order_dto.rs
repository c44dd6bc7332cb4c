use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::models::order::{CargoItem, Order, OrderStatus};
use crate::services::milestones::{MilestonePatch, MilestoneStage};
use crate::services::resource_conflicts::ResourceWarning;
use crate::utils::validation::{validate_non_negative, validate_not_empty};

// Item de carga en requests de creación/actualización
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CargoItemRequest {
    #[validate(custom = "validate_not_empty", length(max = 500))]
    pub description: String,
    #[validate(custom = "validate_non_negative")]
    pub weight: Option<Decimal>,
    #[validate(custom = "validate_non_negative")]
    pub volume: Option<Decimal>,
    #[validate(custom = "validate_non_negative")]
    pub value: Option<Decimal>,
}

impl CargoItemRequest {
    pub fn into_cargo_item(self) -> CargoItem {
        CargoItem {
            id: Uuid::new_v4(),
            description: self.description.trim().to_string(),
            weight: self.weight,
            volume: self.volume,
            value: self.value,
        }
    }
}

// Request para crear un pedido
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateOrderRequest {
    pub customer_id: Uuid,
    pub contract_id: Option<Uuid>,
    pub from_location_id: Uuid,
    pub to_location_id: Uuid,
    pub vehicle_id: Option<Uuid>,
    pub attachment_id: Option<Uuid>,
    #[serde(default)]
    pub accessory_ids: Vec<Uuid>,
    pub driver_id: Option<Uuid>,
    #[serde(default)]
    pub cargo_items: Vec<CargoItemRequest>,
    pub requested_at: Option<DateTime<Utc>>,
    pub eta: Option<DateTime<Utc>>,
    #[validate(custom = "validate_non_negative")]
    pub start_odometer: Decimal,
    #[validate(length(max = 2000))]
    pub notes: Option<String>,
}

// Request para actualizar un pedido; los campos ausentes no cambian
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateOrderRequest {
    pub customer_id: Option<Uuid>,
    pub contract_id: Option<Uuid>,
    pub from_location_id: Option<Uuid>,
    pub to_location_id: Option<Uuid>,
    pub vehicle_id: Option<Uuid>,
    pub attachment_id: Option<Uuid>,
    pub accessory_ids: Option<Vec<Uuid>>,
    pub driver_id: Option<Uuid>,
    pub cargo_items: Option<Vec<CargoItemRequest>>,
    pub status: Option<OrderStatus>,
    pub requested_at: Option<DateTime<Utc>>,
    pub eta: Option<DateTime<Utc>>,
    pub arrival_at_loading: Option<DateTime<Utc>>,
    pub loading_completed_at: Option<DateTime<Utc>>,
    pub arrival_at_offloading: Option<DateTime<Utc>>,
    pub unloading_completed_at: Option<DateTime<Utc>>,
    #[validate(custom = "validate_non_negative")]
    pub start_odometer: Option<Decimal>,
    #[validate(custom = "validate_non_negative")]
    pub closing_odometer: Option<Decimal>,
    #[validate(length(max = 2000))]
    pub notes: Option<String>,
}

impl UpdateOrderRequest {
    pub fn milestone_patch(&self) -> MilestonePatch {
        MilestonePatch {
            arrival_at_loading: self.arrival_at_loading,
            loading_completed_at: self.loading_completed_at,
            arrival_at_offloading: self.arrival_at_offloading,
            unloading_completed_at: self.unloading_completed_at,
            closing_odometer: self.closing_odometer,
        }
    }
}

// Filtro de listado
#[derive(Debug, Default, Deserialize)]
pub struct OrderListQuery {
    pub status: Option<OrderStatus>,
}

// Response de pedido con métricas derivadas y avisos de recursos en uso
#[derive(Debug, Serialize)]
pub struct OrderResponse {
    #[serde(flatten)]
    pub order: Order,
    pub milestone_stage: MilestoneStage,
    pub loading_duration_minutes: Option<i64>,
    pub unloading_duration_minutes: Option<i64>,
    pub resource_warnings: Vec<ResourceWarning>,
}

impl OrderResponse {
    pub fn new(order: Order, resource_warnings: Vec<ResourceWarning>) -> Self {
        let timeline = order.timeline();
        Self {
            milestone_stage: timeline.stage(),
            loading_duration_minutes: timeline.loading_duration_minutes(),
            unloading_duration_minutes: timeline.unloading_duration_minutes(),
            order,
            resource_warnings,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_request_rejects_negative_odometer() {
        let request: CreateOrderRequest = serde_json::from_value(serde_json::json!({
            "customer_id": Uuid::new_v4(),
            "from_location_id": Uuid::new_v4(),
            "to_location_id": Uuid::new_v4(),
            "start_odometer": -5
        }))
        .unwrap();

        let errors = request.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("start_odometer"));
        assert!(request.accessory_ids.is_empty());
    }

    #[test]
    fn test_cargo_item_requires_description() {
        let item = CargoItemRequest {
            description: "  ".to_string(),
            weight: Some(Decimal::new(1200, 0)),
            volume: None,
            value: None,
        };
        assert!(item.validate().unwrap_err().field_errors().contains_key("description"));
    }

    #[test]
    fn test_update_request_omitted_fields_are_unchanged() {
        let request: UpdateOrderRequest =
            serde_json::from_value(serde_json::json!({ "notes": "gate 4" })).unwrap();

        assert!(request.milestone_patch().is_empty());
        assert!(request.status.is_none());
        assert!(request.accessory_ids.is_none());
    }
}
