use std::collections::HashMap;

use async_trait::async_trait;
use rust_decimal::Decimal;
use sqlx::{PgPool, Postgres, Transaction};
use tracing::debug;
use uuid::Uuid;

use super::WaybillRepository;
use crate::models::order::{CargoItem, Order, OrderRow, OrderStatus, ResourceAssignment};
use crate::models::reference::{Contract, Customer, CustomerRoute, Location};
use crate::models::resource::{Driver, Resource, ResourceKind, ResourceRow};
use crate::services::order_number::OrderNumber;
use crate::utils::errors::{conflict_error, is_unique_violation, not_found_error, AppError, AppResult};

const ORDER_NUMBER_CONSTRAINT: &str = "orders_tenant_order_number_key";
const DEFAULT_VEHICLE_CONSTRAINT: &str = "drivers_default_vehicle_key";

const ORDER_COLUMNS: &str = r#"
    id, tenant_id, order_number, customer_id, contract_id, from_location_id, to_location_id,
    vehicle_id, attachment_id, driver_id, status, requested_at, eta,
    arrival_at_loading, loading_completed_at, arrival_at_offloading, unloading_completed_at,
    start_odometer, closing_odometer, run_distance, notes, created_at, updated_at
"#;

const RESOURCE_COLUMNS: &str =
    "id, tenant_id, kind, name, registration, make, model, attachment_type, serial_number, created_at";

const DRIVER_COLUMNS: &str = "id, tenant_id, full_name, license_number, default_vehicle_id";

#[derive(Debug, sqlx::FromRow)]
struct CargoItemRow {
    order_id: Uuid,
    id: Uuid,
    description: String,
    weight: Option<Decimal>,
    volume: Option<Decimal>,
    value: Option<Decimal>,
}

#[derive(Debug, sqlx::FromRow)]
struct AccessoryLinkRow {
    order_id: Uuid,
    resource_id: Uuid,
}

/// Repositorio PostgreSQL del motor de waybills
pub struct PgWaybillRepository {
    pool: PgPool,
}

impl PgWaybillRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Carga accesorios e items de carga de varios pedidos en dos consultas
    async fn load_children(
        &self,
        order_ids: &[Uuid],
    ) -> AppResult<(HashMap<Uuid, Vec<Uuid>>, HashMap<Uuid, Vec<CargoItem>>)> {
        let links = sqlx::query_as::<_, AccessoryLinkRow>(
            r#"
            SELECT order_id, resource_id
            FROM order_accessories
            WHERE order_id = ANY($1)
            ORDER BY order_id, position
            "#,
        )
        .bind(order_ids)
        .fetch_all(&self.pool)
        .await?;

        let cargo_rows = sqlx::query_as::<_, CargoItemRow>(
            r#"
            SELECT order_id, id, description, weight, volume, value
            FROM cargo_items
            WHERE order_id = ANY($1)
            ORDER BY order_id, position
            "#,
        )
        .bind(order_ids)
        .fetch_all(&self.pool)
        .await?;

        let mut accessories: HashMap<Uuid, Vec<Uuid>> = HashMap::new();
        for link in links {
            accessories.entry(link.order_id).or_default().push(link.resource_id);
        }

        let mut cargo: HashMap<Uuid, Vec<CargoItem>> = HashMap::new();
        for row in cargo_rows {
            cargo.entry(row.order_id).or_default().push(CargoItem {
                id: row.id,
                description: row.description,
                weight: row.weight,
                volume: row.volume,
                value: row.value,
            });
        }

        Ok((accessories, cargo))
    }

    async fn assemble(&self, rows: Vec<OrderRow>) -> AppResult<Vec<Order>> {
        let ids: Vec<Uuid> = rows.iter().map(|row| row.id).collect();
        let (mut accessories, mut cargo) = self.load_children(&ids).await?;

        Ok(rows
            .into_iter()
            .map(|row| {
                let id = row.id;
                row.into_order(
                    accessories.remove(&id).unwrap_or_default(),
                    cargo.remove(&id).unwrap_or_default(),
                )
            })
            .collect())
    }

    async fn write_children(tx: &mut Transaction<'_, Postgres>, order: &Order) -> AppResult<()> {
        for (position, accessory_id) in order.accessory_ids.iter().enumerate() {
            sqlx::query("INSERT INTO order_accessories (order_id, resource_id, position) VALUES ($1, $2, $3)")
                .bind(order.id)
                .bind(accessory_id)
                .bind(position as i32)
                .execute(&mut **tx)
                .await?;
        }

        for (position, item) in order.cargo_items.iter().enumerate() {
            sqlx::query(
                r#"
                INSERT INTO cargo_items (id, order_id, position, description, weight, volume, value)
                VALUES ($1, $2, $3, $4, $5, $6, $7)
                "#,
            )
            .bind(item.id)
            .bind(order.id)
            .bind(position as i32)
            .bind(&item.description)
            .bind(item.weight)
            .bind(item.volume)
            .bind(item.value)
            .execute(&mut **tx)
            .await?;
        }

        Ok(())
    }
}

#[async_trait]
impl WaybillRepository for PgWaybillRepository {
    async fn find_customer(&self, tenant_id: Uuid, id: Uuid) -> AppResult<Option<Customer>> {
        let customer = sqlx::query_as::<_, Customer>(
            "SELECT id, tenant_id, name FROM customers WHERE id = $1 AND tenant_id = $2",
        )
        .bind(id)
        .bind(tenant_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(customer)
    }

    async fn find_contract(&self, tenant_id: Uuid, id: Uuid) -> AppResult<Option<Contract>> {
        let contract = sqlx::query_as::<_, Contract>(
            "SELECT id, tenant_id, customer_id, reference FROM contracts WHERE id = $1 AND tenant_id = $2",
        )
        .bind(id)
        .bind(tenant_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(contract)
    }

    async fn find_location(&self, tenant_id: Uuid, id: Uuid) -> AppResult<Option<Location>> {
        let location = sqlx::query_as::<_, Location>(
            "SELECT id, tenant_id, name FROM locations WHERE id = $1 AND tenant_id = $2",
        )
        .bind(id)
        .bind(tenant_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(location)
    }

    async fn customer_routes(&self, tenant_id: Uuid, customer_id: Uuid) -> AppResult<Vec<CustomerRoute>> {
        let routes = sqlx::query_as::<_, CustomerRoute>(
            r#"
            SELECT id, tenant_id, customer_id, from_location_id, to_location_id
            FROM customer_routes
            WHERE tenant_id = $1 AND customer_id = $2
            "#,
        )
        .bind(tenant_id)
        .bind(customer_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(routes)
    }

    async fn find_resource(&self, tenant_id: Uuid, id: Uuid) -> AppResult<Option<Resource>> {
        let row = sqlx::query_as::<_, ResourceRow>(&format!(
            "SELECT {} FROM resources WHERE id = $1 AND tenant_id = $2",
            RESOURCE_COLUMNS
        ))
        .bind(id)
        .bind(tenant_id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(Resource::try_from).transpose()
    }

    async fn list_resources(&self, tenant_id: Uuid, kind: ResourceKind) -> AppResult<Vec<Resource>> {
        let rows = sqlx::query_as::<_, ResourceRow>(&format!(
            "SELECT {} FROM resources WHERE tenant_id = $1 AND kind = $2 ORDER BY name",
            RESOURCE_COLUMNS
        ))
        .bind(tenant_id)
        .bind(kind)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Resource::try_from).collect()
    }

    async fn find_driver(&self, tenant_id: Uuid, id: Uuid) -> AppResult<Option<Driver>> {
        let driver = sqlx::query_as::<_, Driver>(&format!(
            "SELECT {} FROM drivers WHERE id = $1 AND tenant_id = $2",
            DRIVER_COLUMNS
        ))
        .bind(id)
        .bind(tenant_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(driver)
    }

    async fn list_drivers(&self, tenant_id: Uuid) -> AppResult<Vec<Driver>> {
        let drivers = sqlx::query_as::<_, Driver>(&format!(
            "SELECT {} FROM drivers WHERE tenant_id = $1 ORDER BY full_name",
            DRIVER_COLUMNS
        ))
        .bind(tenant_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(drivers)
    }

    async fn assign_default_vehicle(
        &self,
        tenant_id: Uuid,
        driver_id: Uuid,
        vehicle_id: Option<Uuid>,
    ) -> AppResult<Driver> {
        let result = sqlx::query_as::<_, Driver>(&format!(
            "UPDATE drivers SET default_vehicle_id = $3 WHERE id = $1 AND tenant_id = $2 RETURNING {}",
            DRIVER_COLUMNS
        ))
        .bind(driver_id)
        .bind(tenant_id)
        .bind(vehicle_id)
        .fetch_optional(&self.pool)
        .await;

        match result {
            Ok(Some(driver)) => Ok(driver),
            Ok(None) => Err(not_found_error("Driver", driver_id)),
            Err(e) if is_unique_violation(&e, DEFAULT_VEHICLE_CONSTRAINT) => Err(conflict_error(format!(
                "Vehicle '{}' is already assigned to another driver",
                vehicle_id.map(|id| id.to_string()).unwrap_or_default()
            ))),
            Err(e) => Err(AppError::Database(e)),
        }
    }

    async fn active_assignments(&self, tenant_id: Uuid) -> AppResult<Vec<ResourceAssignment>> {
        let assignments = sqlx::query_as::<_, ResourceAssignment>(
            r#"
            SELECT id AS order_id, vehicle_id, attachment_id, driver_id
            FROM orders
            WHERE tenant_id = $1 AND status = $2
            "#,
        )
        .bind(tenant_id)
        .bind(OrderStatus::InProgress)
        .fetch_all(&self.pool)
        .await?;

        Ok(assignments)
    }

    async fn last_order_number(&self, tenant_id: Uuid, prefix: &str) -> AppResult<Option<String>> {
        // length primero: las secuencias de más de 5 dígitos ordenan después
        let number: Option<(String,)> = sqlx::query_as(
            r#"
            SELECT order_number
            FROM orders
            WHERE tenant_id = $1 AND order_number ~ $2
            ORDER BY length(order_number) DESC, order_number DESC
            LIMIT 1
            "#,
        )
        .bind(tenant_id)
        .bind(OrderNumber::sequence_pattern(prefix))
        .fetch_optional(&self.pool)
        .await?;

        Ok(number.map(|(n,)| n))
    }

    async fn insert_order(&self, order: &Order) -> AppResult<Order> {
        let mut tx = self.pool.begin().await?;

        let inserted = sqlx::query(
            r#"
            INSERT INTO orders (
                id, tenant_id, order_number, customer_id, contract_id, from_location_id, to_location_id,
                vehicle_id, attachment_id, driver_id, status, requested_at, eta,
                arrival_at_loading, loading_completed_at, arrival_at_offloading, unloading_completed_at,
                start_odometer, closing_odometer, run_distance, notes, created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17, $18, $19, $20, $21, $22, $23)
            "#,
        )
        .bind(order.id)
        .bind(order.tenant_id)
        .bind(&order.order_number)
        .bind(order.customer_id)
        .bind(order.contract_id)
        .bind(order.from_location_id)
        .bind(order.to_location_id)
        .bind(order.vehicle_id)
        .bind(order.attachment_id)
        .bind(order.driver_id)
        .bind(order.status)
        .bind(order.requested_at)
        .bind(order.eta)
        .bind(order.arrival_at_loading)
        .bind(order.loading_completed_at)
        .bind(order.arrival_at_offloading)
        .bind(order.unloading_completed_at)
        .bind(order.start_odometer)
        .bind(order.closing_odometer)
        .bind(order.run_distance)
        .bind(&order.notes)
        .bind(order.created_at)
        .bind(order.updated_at)
        .execute(&mut *tx)
        .await;

        if let Err(e) = inserted {
            if is_unique_violation(&e, ORDER_NUMBER_CONSTRAINT) {
                return Err(AppError::DuplicateOrderNumber(order.order_number.clone()));
            }
            return Err(AppError::Database(e));
        }

        Self::write_children(&mut tx, order).await?;
        tx.commit().await?;

        debug!("💾 Pedido {} insertado ({})", order.order_number, order.id);
        Ok(order.clone())
    }

    async fn find_order(&self, tenant_id: Uuid, id: Uuid) -> AppResult<Option<Order>> {
        let row = sqlx::query_as::<_, OrderRow>(&format!(
            "SELECT {} FROM orders WHERE id = $1 AND tenant_id = $2",
            ORDER_COLUMNS
        ))
        .bind(id)
        .bind(tenant_id)
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(row) => Ok(self.assemble(vec![row]).await?.pop()),
            None => Ok(None),
        }
    }

    async fn list_orders(&self, tenant_id: Uuid, status: Option<OrderStatus>) -> AppResult<Vec<Order>> {
        let rows = sqlx::query_as::<_, OrderRow>(&format!(
            r#"
            SELECT {}
            FROM orders
            WHERE tenant_id = $1 AND ($2::order_status IS NULL OR status = $2)
            ORDER BY created_at DESC
            "#,
            ORDER_COLUMNS
        ))
        .bind(tenant_id)
        .bind(status)
        .fetch_all(&self.pool)
        .await?;

        self.assemble(rows).await
    }

    async fn update_order(&self, order: &Order) -> AppResult<Order> {
        let mut tx = self.pool.begin().await?;

        let result = sqlx::query(
            r#"
            UPDATE orders SET
                customer_id = $3,
                contract_id = $4,
                from_location_id = $5,
                to_location_id = $6,
                vehicle_id = $7,
                attachment_id = $8,
                driver_id = $9,
                status = $10,
                requested_at = $11,
                eta = $12,
                arrival_at_loading = $13,
                loading_completed_at = $14,
                arrival_at_offloading = $15,
                unloading_completed_at = $16,
                start_odometer = $17,
                closing_odometer = $18,
                run_distance = $19,
                notes = $20,
                updated_at = $21
            WHERE id = $1 AND tenant_id = $2
            "#,
        )
        .bind(order.id)
        .bind(order.tenant_id)
        .bind(order.customer_id)
        .bind(order.contract_id)
        .bind(order.from_location_id)
        .bind(order.to_location_id)
        .bind(order.vehicle_id)
        .bind(order.attachment_id)
        .bind(order.driver_id)
        .bind(order.status)
        .bind(order.requested_at)
        .bind(order.eta)
        .bind(order.arrival_at_loading)
        .bind(order.loading_completed_at)
        .bind(order.arrival_at_offloading)
        .bind(order.unloading_completed_at)
        .bind(order.start_odometer)
        .bind(order.closing_odometer)
        .bind(order.run_distance)
        .bind(&order.notes)
        .bind(order.updated_at)
        .execute(&mut *tx)
        .await?;

        if result.rows_affected() == 0 {
            return Err(not_found_error("Order", order.id));
        }

        sqlx::query("DELETE FROM order_accessories WHERE order_id = $1")
            .bind(order.id)
            .execute(&mut *tx)
            .await?;
        sqlx::query("DELETE FROM cargo_items WHERE order_id = $1")
            .bind(order.id)
            .execute(&mut *tx)
            .await?;
        Self::write_children(&mut tx, order).await?;

        tx.commit().await?;
        Ok(order.clone())
    }

    async fn delete_order(&self, tenant_id: Uuid, id: Uuid) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM orders WHERE id = $1 AND tenant_id = $2")
            .bind(id)
            .bind(tenant_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
