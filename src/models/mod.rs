//! Modelos del sistema
//!
//! Este módulo contiene los modelos de datos que mapean al schema PostgreSQL
//! del motor de waybills.

pub mod order;
pub mod reference;
pub mod resource;
