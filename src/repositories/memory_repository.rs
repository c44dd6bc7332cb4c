//! Repositorio en memoria
//!
//! Misma semántica que el repositorio PostgreSQL (filtro por tenant, número de
//! pedido único por tenant, vehículo por defecto único por conductor), con las
//! comprobaciones hechas bajo un único lock de escritura. Se usa en tests y en
//! entornos sin base de datos.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::WaybillRepository;
use crate::models::order::{Order, OrderStatus, ResourceAssignment};
use crate::models::reference::{Contract, Customer, CustomerRoute, Location};
use crate::models::resource::{Driver, Resource, ResourceKind};
use crate::services::order_number::OrderNumber;
use crate::utils::errors::{conflict_error, not_found_error, AppError, AppResult};

#[derive(Default)]
struct Store {
    customers: HashMap<Uuid, Customer>,
    contracts: HashMap<Uuid, Contract>,
    locations: HashMap<Uuid, Location>,
    routes: Vec<CustomerRoute>,
    resources: HashMap<Uuid, Resource>,
    drivers: HashMap<Uuid, Driver>,
    orders: HashMap<Uuid, Order>,
}

#[derive(Default)]
pub struct InMemoryWaybillRepository {
    store: RwLock<Store>,
}

impl InMemoryWaybillRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn add_customer(&self, customer: Customer) {
        self.store.write().await.customers.insert(customer.id, customer);
    }

    pub async fn add_contract(&self, contract: Contract) {
        self.store.write().await.contracts.insert(contract.id, contract);
    }

    pub async fn add_location(&self, location: Location) {
        self.store.write().await.locations.insert(location.id, location);
    }

    pub async fn add_route(&self, route: CustomerRoute) {
        self.store.write().await.routes.push(route);
    }

    pub async fn add_resource(&self, resource: Resource) {
        self.store.write().await.resources.insert(resource.id, resource);
    }

    pub async fn add_driver(&self, driver: Driver) {
        self.store.write().await.drivers.insert(driver.id, driver);
    }
}

fn in_tenant<T>(entity: Option<&T>, tenant_id: Uuid, tenant_of: impl Fn(&T) -> Uuid) -> Option<T>
where
    T: Clone,
{
    entity.filter(|e| tenant_of(e) == tenant_id).cloned()
}

#[async_trait]
impl WaybillRepository for InMemoryWaybillRepository {
    async fn find_customer(&self, tenant_id: Uuid, id: Uuid) -> AppResult<Option<Customer>> {
        let store = self.store.read().await;
        Ok(in_tenant(store.customers.get(&id), tenant_id, |c| c.tenant_id))
    }

    async fn find_contract(&self, tenant_id: Uuid, id: Uuid) -> AppResult<Option<Contract>> {
        let store = self.store.read().await;
        Ok(in_tenant(store.contracts.get(&id), tenant_id, |c| c.tenant_id))
    }

    async fn find_location(&self, tenant_id: Uuid, id: Uuid) -> AppResult<Option<Location>> {
        let store = self.store.read().await;
        Ok(in_tenant(store.locations.get(&id), tenant_id, |l| l.tenant_id))
    }

    async fn customer_routes(&self, tenant_id: Uuid, customer_id: Uuid) -> AppResult<Vec<CustomerRoute>> {
        let store = self.store.read().await;
        Ok(store
            .routes
            .iter()
            .filter(|r| r.tenant_id == tenant_id && r.customer_id == customer_id)
            .cloned()
            .collect())
    }

    async fn find_resource(&self, tenant_id: Uuid, id: Uuid) -> AppResult<Option<Resource>> {
        let store = self.store.read().await;
        Ok(in_tenant(store.resources.get(&id), tenant_id, |r| r.tenant_id))
    }

    async fn list_resources(&self, tenant_id: Uuid, kind: ResourceKind) -> AppResult<Vec<Resource>> {
        let store = self.store.read().await;
        let mut resources: Vec<Resource> = store
            .resources
            .values()
            .filter(|r| r.tenant_id == tenant_id && r.kind() == kind)
            .cloned()
            .collect();
        resources.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(resources)
    }

    async fn find_driver(&self, tenant_id: Uuid, id: Uuid) -> AppResult<Option<Driver>> {
        let store = self.store.read().await;
        Ok(in_tenant(store.drivers.get(&id), tenant_id, |d| d.tenant_id))
    }

    async fn list_drivers(&self, tenant_id: Uuid) -> AppResult<Vec<Driver>> {
        let store = self.store.read().await;
        let mut drivers: Vec<Driver> = store
            .drivers
            .values()
            .filter(|d| d.tenant_id == tenant_id)
            .cloned()
            .collect();
        drivers.sort_by(|a, b| a.full_name.cmp(&b.full_name));
        Ok(drivers)
    }

    async fn assign_default_vehicle(
        &self,
        tenant_id: Uuid,
        driver_id: Uuid,
        vehicle_id: Option<Uuid>,
    ) -> AppResult<Driver> {
        let mut store = self.store.write().await;

        if let Some(vehicle_id) = vehicle_id {
            let taken = store.drivers.values().any(|d| {
                d.tenant_id == tenant_id && d.id != driver_id && d.default_vehicle_id == Some(vehicle_id)
            });
            if taken {
                return Err(conflict_error(format!(
                    "Vehicle '{}' is already assigned to another driver",
                    vehicle_id
                )));
            }
        }

        let driver = store
            .drivers
            .get_mut(&driver_id)
            .filter(|d| d.tenant_id == tenant_id)
            .ok_or_else(|| not_found_error("Driver", driver_id))?;
        driver.default_vehicle_id = vehicle_id;
        Ok(driver.clone())
    }

    async fn active_assignments(&self, tenant_id: Uuid) -> AppResult<Vec<ResourceAssignment>> {
        let store = self.store.read().await;
        Ok(store
            .orders
            .values()
            .filter(|o| o.tenant_id == tenant_id && o.status.locks_resources())
            .map(ResourceAssignment::from)
            .collect())
    }

    async fn last_order_number(&self, tenant_id: Uuid, prefix: &str) -> AppResult<Option<String>> {
        let store = self.store.read().await;
        Ok(store
            .orders
            .values()
            .filter(|o| o.tenant_id == tenant_id && o.order_number.starts_with(prefix))
            .filter_map(|o| OrderNumber::parse(&o.order_number).map(|n| (n.sequence(), &o.order_number)))
            .max_by_key(|(sequence, _)| *sequence)
            .map(|(_, number)| number.clone()))
    }

    async fn insert_order(&self, order: &Order) -> AppResult<Order> {
        let mut store = self.store.write().await;

        let duplicate = store
            .orders
            .values()
            .any(|o| o.tenant_id == order.tenant_id && o.order_number == order.order_number);
        if duplicate {
            return Err(AppError::DuplicateOrderNumber(order.order_number.clone()));
        }

        store.orders.insert(order.id, order.clone());
        Ok(order.clone())
    }

    async fn find_order(&self, tenant_id: Uuid, id: Uuid) -> AppResult<Option<Order>> {
        let store = self.store.read().await;
        Ok(in_tenant(store.orders.get(&id), tenant_id, |o| o.tenant_id))
    }

    async fn list_orders(&self, tenant_id: Uuid, status: Option<OrderStatus>) -> AppResult<Vec<Order>> {
        let store = self.store.read().await;
        let mut orders: Vec<Order> = store
            .orders
            .values()
            .filter(|o| o.tenant_id == tenant_id && status.map_or(true, |s| o.status == s))
            .cloned()
            .collect();
        orders.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(orders)
    }

    async fn update_order(&self, order: &Order) -> AppResult<Order> {
        let mut store = self.store.write().await;
        let existing = store
            .orders
            .get_mut(&order.id)
            .filter(|o| o.tenant_id == order.tenant_id)
            .ok_or_else(|| not_found_error("Order", order.id))?;

        let order_number = existing.order_number.clone();
        *existing = order.clone();
        existing.order_number = order_number;
        Ok(existing.clone())
    }

    async fn delete_order(&self, tenant_id: Uuid, id: Uuid) -> AppResult<bool> {
        let mut store = self.store.write().await;
        let owned = store.orders.get(&id).is_some_and(|o| o.tenant_id == tenant_id);
        if owned {
            store.orders.remove(&id);
        }
        Ok(owned)
    }
}
