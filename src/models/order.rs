//! Modelo de Order (Waybill)
//!
//! Agregado raíz del motor: referencias a cliente, ubicaciones y recursos,
//! hitos operativos, odómetros y carga. Los items de carga pertenecen al pedido.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Type};
use uuid::Uuid;

use crate::services::milestones::MilestoneTimeline;

/// Estado del pedido - mapea al ENUM order_status
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Type, PartialEq, Eq, Hash)]
#[sqlx(type_name = "order_status", rename_all = "snake_case")]
pub enum OrderStatus {
    Pending,
    Dispatched,
    InProgress,
    Closed,
}

impl OrderStatus {
    /// Solo los pedidos en curso bloquean recursos
    pub fn locks_resources(self) -> bool {
        self == OrderStatus::InProgress
    }
}

/// Item de carga transportado por un pedido
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, PartialEq)]
pub struct CargoItem {
    pub id: Uuid,
    pub description: String,
    pub weight: Option<Decimal>,
    pub volume: Option<Decimal>,
    pub value: Option<Decimal>,
}

/// Pedido completo con sus colecciones
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Order {
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub order_number: String,
    pub customer_id: Uuid,
    pub contract_id: Option<Uuid>,
    pub from_location_id: Uuid,
    pub to_location_id: Uuid,
    pub vehicle_id: Option<Uuid>,
    pub attachment_id: Option<Uuid>,
    pub accessory_ids: Vec<Uuid>,
    pub driver_id: Option<Uuid>,
    pub cargo_items: Vec<CargoItem>,
    pub status: OrderStatus,
    pub requested_at: Option<DateTime<Utc>>,
    pub eta: Option<DateTime<Utc>>,
    pub arrival_at_loading: Option<DateTime<Utc>>,
    pub loading_completed_at: Option<DateTime<Utc>>,
    pub arrival_at_offloading: Option<DateTime<Utc>>,
    pub unloading_completed_at: Option<DateTime<Utc>>,
    pub start_odometer: Decimal,
    pub closing_odometer: Option<Decimal>,
    pub run_distance: Option<Decimal>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Order {
    pub fn timeline(&self) -> MilestoneTimeline {
        MilestoneTimeline {
            arrival_at_loading: self.arrival_at_loading,
            loading_completed_at: self.loading_completed_at,
            arrival_at_offloading: self.arrival_at_offloading,
            unloading_completed_at: self.unloading_completed_at,
        }
    }

    pub fn set_timeline(&mut self, timeline: &MilestoneTimeline) {
        self.arrival_at_loading = timeline.arrival_at_loading;
        self.loading_completed_at = timeline.loading_completed_at;
        self.arrival_at_offloading = timeline.arrival_at_offloading;
        self.unloading_completed_at = timeline.unloading_completed_at;
    }
}

/// Fila plana de la tabla orders (sin colecciones)
#[derive(Debug, Clone, FromRow)]
pub struct OrderRow {
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub order_number: String,
    pub customer_id: Uuid,
    pub contract_id: Option<Uuid>,
    pub from_location_id: Uuid,
    pub to_location_id: Uuid,
    pub vehicle_id: Option<Uuid>,
    pub attachment_id: Option<Uuid>,
    pub driver_id: Option<Uuid>,
    pub status: OrderStatus,
    pub requested_at: Option<DateTime<Utc>>,
    pub eta: Option<DateTime<Utc>>,
    pub arrival_at_loading: Option<DateTime<Utc>>,
    pub loading_completed_at: Option<DateTime<Utc>>,
    pub arrival_at_offloading: Option<DateTime<Utc>>,
    pub unloading_completed_at: Option<DateTime<Utc>>,
    pub start_odometer: Decimal,
    pub closing_odometer: Option<Decimal>,
    pub run_distance: Option<Decimal>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl OrderRow {
    pub fn into_order(self, accessory_ids: Vec<Uuid>, cargo_items: Vec<CargoItem>) -> Order {
        Order {
            id: self.id,
            tenant_id: self.tenant_id,
            order_number: self.order_number,
            customer_id: self.customer_id,
            contract_id: self.contract_id,
            from_location_id: self.from_location_id,
            to_location_id: self.to_location_id,
            vehicle_id: self.vehicle_id,
            attachment_id: self.attachment_id,
            accessory_ids,
            driver_id: self.driver_id,
            cargo_items,
            status: self.status,
            requested_at: self.requested_at,
            eta: self.eta,
            arrival_at_loading: self.arrival_at_loading,
            loading_completed_at: self.loading_completed_at,
            arrival_at_offloading: self.arrival_at_offloading,
            unloading_completed_at: self.unloading_completed_at,
            start_odometer: self.start_odometer,
            closing_odometer: self.closing_odometer,
            run_distance: self.run_distance,
            notes: self.notes,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

/// Asignación de recursos de un pedido activo, usada por el chequeo de conflictos
#[derive(Debug, Clone, FromRow, PartialEq)]
pub struct ResourceAssignment {
    pub order_id: Uuid,
    pub vehicle_id: Option<Uuid>,
    pub attachment_id: Option<Uuid>,
    pub driver_id: Option<Uuid>,
}

impl From<&Order> for ResourceAssignment {
    fn from(order: &Order) -> Self {
        Self {
            order_id: order.id,
            vehicle_id: order.vehicle_id,
            attachment_id: order.attachment_id,
            driver_id: order.driver_id,
        }
    }
}
