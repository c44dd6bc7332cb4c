//! Repositorios
//!
//! `WaybillRepository` es la frontera con el almacenamiento. Cada método recibe
//! el `tenant_id` explícitamente: una entidad de otro tenant es indistinguible
//! de una inexistente.

pub mod memory_repository;
pub mod waybill_repository;

pub use memory_repository::InMemoryWaybillRepository;
pub use waybill_repository::PgWaybillRepository;

use async_trait::async_trait;
use uuid::Uuid;

use crate::models::order::{Order, OrderStatus, ResourceAssignment};
use crate::models::reference::{Contract, Customer, CustomerRoute, Location};
use crate::models::resource::{Driver, Resource, ResourceKind};
use crate::utils::errors::AppResult;

#[async_trait]
pub trait WaybillRepository: Send + Sync {
    async fn find_customer(&self, tenant_id: Uuid, id: Uuid) -> AppResult<Option<Customer>>;

    async fn find_contract(&self, tenant_id: Uuid, id: Uuid) -> AppResult<Option<Contract>>;

    async fn find_location(&self, tenant_id: Uuid, id: Uuid) -> AppResult<Option<Location>>;

    async fn customer_routes(&self, tenant_id: Uuid, customer_id: Uuid) -> AppResult<Vec<CustomerRoute>>;

    async fn find_resource(&self, tenant_id: Uuid, id: Uuid) -> AppResult<Option<Resource>>;

    async fn list_resources(&self, tenant_id: Uuid, kind: ResourceKind) -> AppResult<Vec<Resource>>;

    async fn find_driver(&self, tenant_id: Uuid, id: Uuid) -> AppResult<Option<Driver>>;

    async fn list_drivers(&self, tenant_id: Uuid) -> AppResult<Vec<Driver>>;

    /// Fija (o limpia) el vehículo por defecto de un conductor.
    ///
    /// La exclusividad vehículo↔conductor la garantiza el almacenamiento:
    /// devuelve `Conflict` si el vehículo ya es el de otro conductor y
    /// `NotFound` si el conductor no existe en el tenant.
    async fn assign_default_vehicle(
        &self,
        tenant_id: Uuid,
        driver_id: Uuid,
        vehicle_id: Option<Uuid>,
    ) -> AppResult<Driver>;

    /// Recursos referenciados por pedidos que bloquean recursos (en curso)
    async fn active_assignments(&self, tenant_id: Uuid) -> AppResult<Vec<ResourceAssignment>>;

    /// Número de pedido más alto del tenant que empieza por `prefix`
    async fn last_order_number(&self, tenant_id: Uuid, prefix: &str) -> AppResult<Option<String>>;

    /// Inserta el pedido con sus items; `DuplicateOrderNumber` si el número ya existe
    async fn insert_order(&self, order: &Order) -> AppResult<Order>;

    async fn find_order(&self, tenant_id: Uuid, id: Uuid) -> AppResult<Option<Order>>;

    async fn list_orders(&self, tenant_id: Uuid, status: Option<OrderStatus>) -> AppResult<Vec<Order>>;

    /// Persiste el agregado completo (el número de pedido nunca cambia)
    async fn update_order(&self, order: &Order) -> AppResult<Order>;

    /// Borra el pedido y sus items; `false` si no existía en el tenant
    async fn delete_order(&self, tenant_id: Uuid, id: Uuid) -> AppResult<bool>;
}
