//! Utilidades de validación
//!
//! Validadores custom usados por los DTOs con `#[validate(custom = "...")]`.

use serde::Serialize;
use validator::ValidationError;

/// Validar que un string no esté vacío (ignorando espacios)
pub fn validate_not_empty(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        let mut error = ValidationError::new("not_empty");
        error.add_param("value".into(), &value.to_string());
        return Err(error);
    }
    Ok(())
}

/// Validar que un valor sea no negativo
pub fn validate_non_negative<T>(value: &T) -> Result<(), ValidationError>
where
    T: PartialOrd + std::fmt::Display + num_traits::Zero + Serialize,
{
    if *value < T::zero() {
        let mut error = ValidationError::new("non_negative");
        error.add_param("value".into(), value);
        return Err(error);
    }
    Ok(())
}
