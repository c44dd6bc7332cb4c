//! Datos de referencia consumidos por el motor
//!
//! Clientes, ubicaciones, contratos y rutas permitidas. Su CRUD vive fuera
//! de este servicio; aquí solo se leen, siempre filtrados por tenant.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, PartialEq)]
pub struct Customer {
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, PartialEq)]
pub struct Location {
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, PartialEq)]
pub struct Contract {
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub customer_id: Uuid,
    pub reference: String,
}

/// Par origen/destino permitido para un cliente (sensible a la dirección)
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, PartialEq)]
pub struct CustomerRoute {
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub customer_id: Uuid,
    pub from_location_id: Uuid,
    pub to_location_id: Uuid,
}
