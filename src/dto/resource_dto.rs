use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::resource::{Driver, Resource, ResourceDetails};
use crate::services::resource_conflicts::ResourceType;

// Query del listado de candidatos para un hueco de asignación
#[derive(Debug, Deserialize)]
pub struct CandidateQuery {
    pub kind: ResourceType,
    pub exclude_order_id: Option<Uuid>,
}

// Candidato anotado con el indicador "en uso"
#[derive(Debug, Serialize)]
pub struct ResourceCandidateResponse {
    pub id: Uuid,
    pub resource_type: ResourceType,
    pub name: String,
    pub is_in_use: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<ResourceDetails>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_vehicle_id: Option<Uuid>,
}

impl ResourceCandidateResponse {
    pub fn from_resource(resource: Resource, resource_type: ResourceType, is_in_use: bool) -> Self {
        Self {
            id: resource.id,
            resource_type,
            name: resource.name,
            is_in_use,
            details: Some(resource.details),
            default_vehicle_id: None,
        }
    }

    pub fn from_driver(driver: Driver, is_in_use: bool) -> Self {
        Self {
            id: driver.id,
            resource_type: ResourceType::Driver,
            name: driver.full_name,
            is_in_use,
            details: None,
            default_vehicle_id: driver.default_vehicle_id,
        }
    }
}

// Request para fijar (o limpiar con null) el vehículo por defecto de un conductor
#[derive(Debug, Default, Deserialize)]
pub struct AssignVehicleRequest {
    #[serde(default)]
    pub vehicle_id: Option<Uuid>,
}
