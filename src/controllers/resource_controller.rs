use std::sync::Arc;

use uuid::Uuid;

use crate::dto::api_response::ApiResponse;
use crate::dto::resource_dto::{AssignVehicleRequest, CandidateQuery, ResourceCandidateResponse};
use crate::models::resource::Driver;
use crate::repositories::WaybillRepository;
use crate::services::driver_assignment::DriverAssignment;
use crate::services::resource_conflicts::{ResourceConflictChecker, ResourceType};
use crate::utils::errors::AppResult;

pub struct ResourceController {
    repository: Arc<dyn WaybillRepository>,
}

impl ResourceController {
    pub fn new(repository: Arc<dyn WaybillRepository>) -> Self {
        Self { repository }
    }

    /// Candidatos de un tipo con su indicador "en uso"
    pub async fn list_candidates(
        &self,
        tenant_id: Uuid,
        query: CandidateQuery,
    ) -> AppResult<Vec<ResourceCandidateResponse>> {
        let checker = ResourceConflictChecker::new(self.repository.as_ref());

        match query.kind.resource_kind() {
            Some(kind) => {
                let resources = self.repository.list_resources(tenant_id, kind).await?;
                let ids: Vec<Uuid> = resources.iter().map(|r| r.id).collect();
                let flags = checker
                    .annotate(tenant_id, &ids, query.kind, query.exclude_order_id)
                    .await?;

                Ok(resources
                    .into_iter()
                    .map(|resource| {
                        let in_use = flags.get(&resource.id).copied().unwrap_or(false);
                        ResourceCandidateResponse::from_resource(resource, query.kind, in_use)
                    })
                    .collect())
            }
            None => {
                let drivers = self.repository.list_drivers(tenant_id).await?;
                let ids: Vec<Uuid> = drivers.iter().map(|d| d.id).collect();
                let flags = checker
                    .annotate(tenant_id, &ids, ResourceType::Driver, query.exclude_order_id)
                    .await?;

                Ok(drivers
                    .into_iter()
                    .map(|driver| {
                        let in_use = flags.get(&driver.id).copied().unwrap_or(false);
                        ResourceCandidateResponse::from_driver(driver, in_use)
                    })
                    .collect())
            }
        }
    }

    pub async fn assign_default_vehicle(
        &self,
        tenant_id: Uuid,
        driver_id: Uuid,
        request: AssignVehicleRequest,
    ) -> AppResult<ApiResponse<Driver>> {
        let driver = DriverAssignment::new(self.repository.as_ref())
            .assign_default_vehicle(tenant_id, driver_id, request.vehicle_id)
            .await?;

        let message = match driver.default_vehicle_id {
            Some(_) => "Default vehicle assigned".to_string(),
            None => "Default vehicle cleared".to_string(),
        };
        Ok(ApiResponse::success_with_message(driver, message))
    }
}
