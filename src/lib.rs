//! Fleet Waybill
//!
//! Motor del ciclo de vida de pedidos de transporte (waybills): numeración
//! `AFWB-YY-NNNNN`, elegibilidad de rutas por cliente, avisos de recursos en
//! uso, hitos operativos y cierre automático.

pub mod config;
pub mod controllers;
pub mod database;
pub mod dto;
pub mod middleware;
pub mod models;
pub mod repositories;
pub mod routes;
pub mod services;
pub mod state;
pub mod utils;
