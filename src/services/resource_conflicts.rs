//! Chequeo de conflictos de recursos
//!
//! Marca como "en uso" los vehículos, remolques y conductores referenciados por
//! pedidos en curso del tenant. Es una foto de solo lectura y meramente
//! informativa: no reserva ni bloquea la asignación.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

use crate::models::order::{Order, ResourceAssignment};
use crate::models::resource::ResourceKind;
use crate::repositories::WaybillRepository;
use crate::utils::errors::AppResult;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum ResourceType {
    Vehicle,
    Attachment,
    Accessory,
    Driver,
}

impl ResourceType {
    /// Tipo físico equivalente; `None` para conductores
    pub fn resource_kind(self) -> Option<ResourceKind> {
        match self {
            ResourceType::Vehicle => Some(ResourceKind::Vehicle),
            ResourceType::Attachment => Some(ResourceKind::Attachment),
            ResourceType::Accessory => Some(ResourceKind::Accessory),
            ResourceType::Driver => None,
        }
    }
}

/// Recurso asignado a un pedido que ya está en uso en otro pedido en curso
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct ResourceWarning {
    pub resource_type: ResourceType,
    pub resource_id: Uuid,
}

/// Hueco de la asignación que corresponde al tipo; los accesorios no bloquean
fn slot(assignment: &ResourceAssignment, resource_type: ResourceType) -> Option<Uuid> {
    match resource_type {
        ResourceType::Vehicle => assignment.vehicle_id,
        ResourceType::Attachment => assignment.attachment_id,
        ResourceType::Driver => assignment.driver_id,
        ResourceType::Accessory => None,
    }
}

pub fn in_use_ids(
    assignments: &[ResourceAssignment],
    resource_type: ResourceType,
    exclude_order_id: Option<Uuid>,
) -> HashSet<Uuid> {
    assignments
        .iter()
        .filter(|a| Some(a.order_id) != exclude_order_id)
        .filter_map(|a| slot(a, resource_type))
        .collect()
}

pub fn annotate_ids(candidates: &[Uuid], in_use: &HashSet<Uuid>) -> HashMap<Uuid, bool> {
    candidates.iter().map(|id| (*id, in_use.contains(id))).collect()
}

pub struct ResourceConflictChecker<'a> {
    repository: &'a dyn WaybillRepository,
}

impl<'a> ResourceConflictChecker<'a> {
    pub fn new(repository: &'a dyn WaybillRepository) -> Self {
        Self { repository }
    }

    /// `resource_id → en uso`, ignorando opcionalmente el pedido que se está editando
    pub async fn annotate(
        &self,
        tenant_id: Uuid,
        resource_ids: &[Uuid],
        resource_type: ResourceType,
        exclude_order_id: Option<Uuid>,
    ) -> AppResult<HashMap<Uuid, bool>> {
        let assignments = self.repository.active_assignments(tenant_id).await?;
        let in_use = in_use_ids(&assignments, resource_type, exclude_order_id);
        debug!(
            "🚛 {:?}: {} recursos en uso en {} pedidos activos",
            resource_type,
            in_use.len(),
            assignments.len()
        );

        Ok(annotate_ids(resource_ids, &in_use))
    }

    /// Avisos para los recursos asignados a `order`, sin contar el propio pedido
    pub async fn warnings_for(&self, tenant_id: Uuid, order: &Order) -> AppResult<Vec<ResourceWarning>> {
        let assignments = self.repository.active_assignments(tenant_id).await?;
        Ok(order_warnings(&assignments, order))
    }
}

/// Recursos de `order` que otro pedido activo ya tiene asignados
pub fn order_warnings(assignments: &[ResourceAssignment], order: &Order) -> Vec<ResourceWarning> {
    let assigned = [
        (ResourceType::Vehicle, order.vehicle_id),
        (ResourceType::Attachment, order.attachment_id),
        (ResourceType::Driver, order.driver_id),
    ];

    assigned
        .into_iter()
        .filter_map(|(resource_type, id)| id.map(|id| (resource_type, id)))
        .filter(|(resource_type, id)| in_use_ids(assignments, *resource_type, Some(order.id)).contains(id))
        .map(|(resource_type, resource_id)| ResourceWarning {
            resource_type,
            resource_id,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assignment(vehicle: Option<Uuid>, driver: Option<Uuid>) -> ResourceAssignment {
        ResourceAssignment {
            order_id: Uuid::new_v4(),
            vehicle_id: vehicle,
            attachment_id: None,
            driver_id: driver,
        }
    }

    #[test]
    fn test_active_vehicle_is_flagged() {
        let (v, w) = (Uuid::new_v4(), Uuid::new_v4());
        let active = vec![assignment(Some(v), None)];

        let flags = annotate_ids(&[v, w], &in_use_ids(&active, ResourceType::Vehicle, None));
        assert_eq!(flags[&v], true);
        assert_eq!(flags[&w], false);
    }

    #[test]
    fn test_excluded_order_does_not_conflict_with_itself() {
        let v = Uuid::new_v4();
        let active = vec![assignment(Some(v), None)];
        let own_order = active[0].order_id;

        let in_use = in_use_ids(&active, ResourceType::Vehicle, Some(own_order));
        assert!(!in_use.contains(&v));
    }

    #[test]
    fn test_slots_are_not_mixed_between_types() {
        let shared = Uuid::new_v4();
        let active = vec![assignment(None, Some(shared))];

        assert!(in_use_ids(&active, ResourceType::Driver, None).contains(&shared));
        assert!(in_use_ids(&active, ResourceType::Vehicle, None).is_empty());
        assert!(in_use_ids(&active, ResourceType::Accessory, None).is_empty());
    }
}
