//! Validador de elegibilidad de rutas
//!
//! Un cliente sin rutas configuradas no tiene restricciones. Con rutas, el par
//! origen→destino debe coincidir exactamente con alguna (la inversa no vale).

use tracing::debug;
use uuid::Uuid;

use crate::models::reference::CustomerRoute;
use crate::repositories::WaybillRepository;
use crate::utils::errors::{bad_request_error, not_found_error, AppResult};

pub const SAME_LOCATION_MESSAGE: &str = "From and To locations cannot be the same";

/// Decisión pura sobre un par origen/destino
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteDecision {
    SameLocation,
    Unrestricted,
    Allowed,
    NotAllowed,
}

impl RouteDecision {
    pub fn is_accepted(self) -> bool {
        matches!(self, RouteDecision::Unrestricted | RouteDecision::Allowed)
    }
}

pub fn check_route(from_id: Uuid, to_id: Uuid, routes: &[CustomerRoute]) -> RouteDecision {
    if from_id == to_id {
        return RouteDecision::SameLocation;
    }
    if routes.is_empty() {
        return RouteDecision::Unrestricted;
    }
    if routes
        .iter()
        .any(|r| r.from_location_id == from_id && r.to_location_id == to_id)
    {
        RouteDecision::Allowed
    } else {
        RouteDecision::NotAllowed
    }
}

pub struct RouteValidator<'a> {
    repository: &'a dyn WaybillRepository,
}

impl<'a> RouteValidator<'a> {
    pub fn new(repository: &'a dyn WaybillRepository) -> Self {
        Self { repository }
    }

    /// Valida el par para el cliente; ambas ubicaciones deben existir en el tenant
    pub async fn validate(&self, tenant_id: Uuid, customer_id: Uuid, from_id: Uuid, to_id: Uuid) -> AppResult<()> {
        if from_id == to_id {
            return Err(bad_request_error(SAME_LOCATION_MESSAGE));
        }

        let from = self
            .repository
            .find_location(tenant_id, from_id)
            .await?
            .ok_or_else(|| not_found_error("Location", from_id))?;
        let to = self
            .repository
            .find_location(tenant_id, to_id)
            .await?
            .ok_or_else(|| not_found_error("Location", to_id))?;

        let routes = self.repository.customer_routes(tenant_id, customer_id).await?;
        let decision = check_route(from_id, to_id, &routes);
        debug!("🛣️ Ruta {} → {} para cliente {}: {:?}", from.name, to.name, customer_id, decision);

        if decision.is_accepted() {
            Ok(())
        } else {
            Err(bad_request_error(format!(
                "Route from {} to {} is not available for this customer.",
                from.name, to.name
            )))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn route(from: Uuid, to: Uuid) -> CustomerRoute {
        CustomerRoute {
            id: Uuid::new_v4(),
            tenant_id: Uuid::new_v4(),
            customer_id: Uuid::new_v4(),
            from_location_id: from,
            to_location_id: to,
        }
    }

    #[test]
    fn test_same_location_wins_over_configuration() {
        let a = Uuid::new_v4();
        assert_eq!(check_route(a, a, &[]), RouteDecision::SameLocation);
        assert_eq!(check_route(a, a, &[route(a, a)]), RouteDecision::SameLocation);
    }

    #[test]
    fn test_empty_route_set_is_unrestricted() {
        assert_eq!(check_route(Uuid::new_v4(), Uuid::new_v4(), &[]), RouteDecision::Unrestricted);
    }

    #[test]
    fn test_configured_routes_are_direction_sensitive() {
        let (a, b, c) = (Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4());
        let routes = vec![route(a, b)];

        assert_eq!(check_route(a, b, &routes), RouteDecision::Allowed);
        assert_eq!(check_route(b, a, &routes), RouteDecision::NotAllowed);
        assert_eq!(check_route(a, c, &routes), RouteDecision::NotAllowed);
        assert!(!RouteDecision::NotAllowed.is_accepted());
    }
}
