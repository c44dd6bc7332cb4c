//! Vehículo por defecto de un conductor
//!
//! Regla dura (a diferencia del aviso "en uso"): un vehículo es el vehículo por
//! defecto de como máximo un conductor, y solo recursos de tipo Vehicle pueden
//! serlo. La unicidad la impone el almacenamiento, no una lectura previa.

use tracing::info;
use uuid::Uuid;

use crate::models::resource::{Driver, ResourceKind};
use crate::repositories::WaybillRepository;
use crate::utils::errors::{bad_request_error, not_found_error, AppResult};

pub struct DriverAssignment<'a> {
    repository: &'a dyn WaybillRepository,
}

impl<'a> DriverAssignment<'a> {
    pub fn new(repository: &'a dyn WaybillRepository) -> Self {
        Self { repository }
    }

    /// Asigna `vehicle_id` (o lo limpia con `None`) como vehículo por defecto del conductor
    pub async fn assign_default_vehicle(
        &self,
        tenant_id: Uuid,
        driver_id: Uuid,
        vehicle_id: Option<Uuid>,
    ) -> AppResult<Driver> {
        self.repository
            .find_driver(tenant_id, driver_id)
            .await?
            .ok_or_else(|| not_found_error("Driver", driver_id))?;

        if let Some(vehicle_id) = vehicle_id {
            let resource = self
                .repository
                .find_resource(tenant_id, vehicle_id)
                .await?
                .ok_or_else(|| not_found_error("Vehicle", vehicle_id))?;

            if resource.kind() != ResourceKind::Vehicle {
                return Err(bad_request_error(format!(
                    "Only resources of kind Vehicle can be assigned to a driver; '{}' is of kind {}",
                    resource.name,
                    resource.kind()
                )));
            }
        }

        let driver = self
            .repository
            .assign_default_vehicle(tenant_id, driver_id, vehicle_id)
            .await?;

        info!("👤 Conductor {} → vehículo por defecto {:?}", driver.full_name, driver.default_vehicle_id);
        Ok(driver)
    }
}
