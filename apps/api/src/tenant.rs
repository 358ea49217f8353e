use std::str::FromStr;

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use quillform_core::{AppError, TenantId};

use crate::error::ApiError;

/// Tenant partition key supplied by the hosting application.
///
/// This composition root reads it from the `x-tenant-id` header; the host's
/// own authentication stack is expected to sit in front and vouch for it.
#[derive(Debug, Clone, Copy)]
pub struct Tenant(pub TenantId);

impl<S> FromRequestParts<S> for Tenant
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let raw = parts
            .headers
            .get("x-tenant-id")
            .and_then(|value| value.to_str().ok())
            .ok_or_else(|| {
                ApiError(AppError::Unauthorized(
                    "missing x-tenant-id header".to_owned(),
                ))
            })?;

        let tenant_id = TenantId::from_str(raw).map_err(ApiError)?;
        Ok(Self(tenant_id))
    }
}
