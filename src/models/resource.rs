//! Modelo de recursos físicos y conductores
//!
//! Vehículos, remolques (attachments) y accesorios comparten una tabla con
//! discriminador `kind`; en memoria se representan como un tipo suma con los
//! campos comunes en `Resource` y los específicos en cada variante.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Type};
use uuid::Uuid;

use crate::utils::errors::{internal_error, AppError};

/// Tipo de recurso - mapea al ENUM resource_kind
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Type, PartialEq, Eq, Hash)]
#[sqlx(type_name = "resource_kind", rename_all = "lowercase")]
pub enum ResourceKind {
    Vehicle,
    Attachment,
    Accessory,
}

impl std::fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            ResourceKind::Vehicle => "Vehicle",
            ResourceKind::Attachment => "Attachment",
            ResourceKind::Accessory => "Accessory",
        };
        f.write_str(name)
    }
}

/// Campos específicos de cada tipo de recurso
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "kind")]
pub enum ResourceDetails {
    Vehicle {
        registration: String,
        make: Option<String>,
        model: Option<String>,
    },
    Attachment {
        registration: String,
        attachment_type: Option<String>,
    },
    Accessory {
        serial_number: Option<String>,
    },
}

/// Recurso físico asignable a un pedido
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Resource {
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub name: String,
    pub created_at: DateTime<Utc>,
    #[serde(flatten)]
    pub details: ResourceDetails,
}

impl Resource {
    pub fn kind(&self) -> ResourceKind {
        match self.details {
            ResourceDetails::Vehicle { .. } => ResourceKind::Vehicle,
            ResourceDetails::Attachment { .. } => ResourceKind::Attachment,
            ResourceDetails::Accessory { .. } => ResourceKind::Accessory,
        }
    }
}

/// Fila plana de la tabla resources
#[derive(Debug, Clone, FromRow)]
pub struct ResourceRow {
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub kind: ResourceKind,
    pub name: String,
    pub registration: Option<String>,
    pub make: Option<String>,
    pub model: Option<String>,
    pub attachment_type: Option<String>,
    pub serial_number: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl TryFrom<ResourceRow> for Resource {
    type Error = AppError;

    fn try_from(row: ResourceRow) -> Result<Self, Self::Error> {
        let details = match row.kind {
            ResourceKind::Vehicle => ResourceDetails::Vehicle {
                registration: row.registration.ok_or_else(|| {
                    internal_error(format!("Vehicle {} has no registration", row.id))
                })?,
                make: row.make,
                model: row.model,
            },
            ResourceKind::Attachment => ResourceDetails::Attachment {
                registration: row.registration.ok_or_else(|| {
                    internal_error(format!("Attachment {} has no registration", row.id))
                })?,
                attachment_type: row.attachment_type,
            },
            ResourceKind::Accessory => ResourceDetails::Accessory {
                serial_number: row.serial_number,
            },
        };

        Ok(Self {
            id: row.id,
            tenant_id: row.tenant_id,
            name: row.name,
            created_at: row.created_at,
            details,
        })
    }
}

/// Conductor con su vehículo por defecto
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, PartialEq)]
pub struct Driver {
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub full_name: String,
    pub license_number: Option<String>,
    pub default_vehicle_id: Option<Uuid>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(kind: ResourceKind, registration: Option<&str>) -> ResourceRow {
        ResourceRow {
            id: Uuid::new_v4(),
            tenant_id: Uuid::new_v4(),
            kind,
            name: "Unit 7".to_string(),
            registration: registration.map(str::to_string),
            make: Some("Scania".to_string()),
            model: Some("R450".to_string()),
            attachment_type: Some("Flatbed".to_string()),
            serial_number: Some("SN-1".to_string()),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_row_becomes_matching_variant() {
        let vehicle = Resource::try_from(row(ResourceKind::Vehicle, Some("KDA 123A"))).unwrap();
        assert_eq!(vehicle.kind(), ResourceKind::Vehicle);
        assert!(matches!(vehicle.details, ResourceDetails::Vehicle { ref registration, .. } if registration == "KDA 123A"));

        let accessory = Resource::try_from(row(ResourceKind::Accessory, None)).unwrap();
        assert_eq!(accessory.kind(), ResourceKind::Accessory);
    }

    #[test]
    fn test_vehicle_row_without_registration_is_rejected() {
        let result = Resource::try_from(row(ResourceKind::Attachment, None));
        assert!(matches!(result, Err(AppError::Internal(_))));
    }

    #[test]
    fn test_resource_serializes_with_kind_tag() {
        let vehicle = Resource::try_from(row(ResourceKind::Vehicle, Some("KDA 123A"))).unwrap();
        let json = serde_json::to_value(&vehicle).unwrap();
        assert_eq!(json["kind"], "Vehicle");
        assert_eq!(json["registration"], "KDA 123A");
    }
}
