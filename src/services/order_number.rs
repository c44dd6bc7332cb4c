//! Generador de números de pedido
//!
//! Formato público y persistido: `AFWB-YY-NNNNN` (p. ej. `AFWB-25-00042`).
//! La secuencia es creciente por (tenant, año). El generador solo propone el
//! siguiente número; la unicidad la garantiza la restricción
//! `(tenant_id, order_number)` y el orquestador reintenta ante un duplicado.

use chrono::{DateTime, Datelike, Utc};
use lazy_static::lazy_static;
use regex::Regex;
use tracing::debug;
use uuid::Uuid;

use crate::repositories::WaybillRepository;
use crate::utils::errors::AppResult;

pub const ORDER_NUMBER_PREFIX: &str = "AFWB";
const SEQUENCE_WIDTH: usize = 5;

lazy_static! {
    static ref ORDER_NUMBER_REGEX: Regex =
        Regex::new(r"^AFWB-(\d{2})-(\d{5,})$").expect("order number regex is valid");
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct OrderNumber {
    year: u32,
    sequence: u64,
}

impl OrderNumber {
    pub fn new(year: u32, sequence: u64) -> Self {
        Self {
            year: year % 100,
            sequence,
        }
    }

    pub fn year(&self) -> u32 {
        self.year
    }

    pub fn sequence(&self) -> u64 {
        self.sequence
    }

    /// Prefijo `AFWB-YY-` del año de `now`
    pub fn prefix_for(now: DateTime<Utc>) -> String {
        format!("{}-{:02}-", ORDER_NUMBER_PREFIX, two_digit_year(now))
    }

    /// Expresión regular (válida también como `~` de PostgreSQL) de los números
    /// bien formados bajo `prefix`; deja fuera filas importadas como `AFWB-25-legacy`
    pub fn sequence_pattern(prefix: &str) -> String {
        format!(r"^{}\d{{{},}}$", regex::escape(prefix), SEQUENCE_WIDTH)
    }

    /// Parseo estricto del formato público
    pub fn parse(value: &str) -> Option<Self> {
        let captures = ORDER_NUMBER_REGEX.captures(value)?;
        let year = captures.get(1)?.as_str().parse().ok()?;
        let sequence = captures.get(2)?.as_str().parse().ok()?;
        Some(Self { year, sequence })
    }

    /// Siguiente número tras `last` (secuencia 0 si no hay o no es legible)
    pub fn next_after(last: Option<&str>, now: DateTime<Utc>) -> Self {
        let last_sequence = last.and_then(trailing_sequence).unwrap_or(0);
        Self {
            year: two_digit_year(now),
            sequence: last_sequence + 1,
        }
    }
}

impl std::fmt::Display for OrderNumber {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}-{:02}-{:0width$}",
            ORDER_NUMBER_PREFIX,
            self.year,
            self.sequence,
            width = SEQUENCE_WIDTH
        )
    }
}

fn two_digit_year(now: DateTime<Utc>) -> u32 {
    now.year().rem_euclid(100) as u32
}

fn trailing_sequence(number: &str) -> Option<u64> {
    number.rsplit('-').next()?.parse().ok()
}

/// Propone números de pedido leyendo el último emitido del tenant
pub struct OrderNumberGenerator<'a> {
    repository: &'a dyn WaybillRepository,
}

impl<'a> OrderNumberGenerator<'a> {
    pub fn new(repository: &'a dyn WaybillRepository) -> Self {
        Self { repository }
    }

    pub async fn generate(&self, tenant_id: Uuid, now: DateTime<Utc>) -> AppResult<OrderNumber> {
        let prefix = OrderNumber::prefix_for(now);
        let last = self.repository.last_order_number(tenant_id, &prefix).await?;
        let next = OrderNumber::next_after(last.as_deref(), now);

        debug!("🔢 Último número {:?} → siguiente {}", last, next);
        Ok(next)
    }
}
