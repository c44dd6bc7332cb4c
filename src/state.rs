//! Shared application state
//!
//! Este módulo define el estado compartido de la aplicación que se pasa
//! a través del router de Axum.

use std::sync::Arc;

use crate::config::environment::EnvironmentConfig;
use crate::controllers::{OrderController, ResourceController};
use crate::repositories::WaybillRepository;
use crate::utils::jwt::JwtConfig;

#[derive(Clone)]
pub struct AppState {
    pub repository: Arc<dyn WaybillRepository>,
    pub config: EnvironmentConfig,
    pub jwt: JwtConfig,
}

impl AppState {
    pub fn new(repository: Arc<dyn WaybillRepository>, config: EnvironmentConfig) -> Self {
        let jwt = JwtConfig::from(&config);
        Self {
            repository,
            config,
            jwt,
        }
    }

    pub fn order_controller(&self) -> OrderController {
        OrderController::new(self.repository.clone(), self.config.order_number_max_attempts)
    }

    pub fn resource_controller(&self) -> ResourceController {
        ResourceController::new(self.repository.clone())
    }
}
