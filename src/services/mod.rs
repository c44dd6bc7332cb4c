//! Services module
//!
//! Este módulo contiene la lógica de negocio del motor de waybills. Cada
//! servicio toma prestado el repositorio y no guarda estado entre requests.

pub mod driver_assignment;
pub mod milestones;
pub mod order_number;
pub mod resource_conflicts;
pub mod route_validator;

pub use driver_assignment::DriverAssignment;
pub use order_number::{OrderNumber, OrderNumberGenerator};
pub use resource_conflicts::{ResourceConflictChecker, ResourceType, ResourceWarning};
pub use route_validator::RouteValidator;
