//! Middleware de autenticación JWT
//!
//! Verifica el token Bearer y deja en las extensions de la request el contexto
//! de tenant que usan todos los handlers de `/api`.

use axum::{
    extract::{Request, State},
    http::header,
    middleware::Next,
    response::Response,
};
use tracing::debug;
use uuid::Uuid;

use crate::{
    state::AppState,
    utils::{
        errors::AppError,
        jwt::{extract_token_from_header, verify_token},
    },
};

/// Tenant y usuario de la request autenticada
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TenantContext {
    pub tenant_id: Uuid,
    pub user_id: Uuid,
}

/// Middleware de autenticación JWT
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let auth_header = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .ok_or_else(|| AppError::Unauthorized("Token de autorización requerido".to_string()))?;

    let token = extract_token_from_header(auth_header)?;
    let claims = verify_token(token, &state.jwt)?;

    let context = TenantContext {
        tenant_id: Uuid::parse_str(&claims.company_id)
            .map_err(|_| AppError::Unauthorized("ID de empresa inválido".to_string()))?,
        user_id: Uuid::parse_str(&claims.sub)
            .map_err(|_| AppError::Unauthorized("ID de usuario inválido".to_string()))?,
    };
    debug!("🔐 Request autenticada para tenant {}", context.tenant_id);

    // Inyectar contexto en las extensions
    request.extensions_mut().insert(context);

    Ok(next.run(request).await)
}
