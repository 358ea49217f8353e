use std::str::FromStr;

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use quillform_application::FieldPatch;
use quillform_core::FieldId;
use quillform_domain::RenderedControl;

use crate::dto::{FieldResponse, UpdateFieldRequest};
use crate::error::ApiResult;
use crate::state::AppState;
use crate::tenant::Tenant;

pub async fn update_field_handler(
    State(state): State<AppState>,
    Tenant(tenant_id): Tenant,
    Path(field_id): Path<String>,
    Json(payload): Json<UpdateFieldRequest>,
) -> ApiResult<Json<FieldResponse>> {
    let field_id = FieldId::from_str(field_id.as_str())?;
    let field = state
        .builder_service
        .patch_field(
            tenant_id,
            field_id,
            FieldPatch {
                label: payload.label,
                placeholder: payload.placeholder,
                default_value: payload.default_value,
                min_value: payload.min_value,
                max_value: payload.max_value,
                step_value: payload.step_value,
                options: payload.options,
                help: payload.help,
            },
        )
        .await?;

    Ok(Json(FieldResponse::from(field)))
}

pub async fn delete_field_handler(
    State(state): State<AppState>,
    Tenant(tenant_id): Tenant,
    Path(field_id): Path<String>,
) -> ApiResult<StatusCode> {
    let field_id = FieldId::from_str(field_id.as_str())?;
    state
        .builder_service
        .delete_field(tenant_id, field_id)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

pub async fn preview_field_handler(
    State(state): State<AppState>,
    Tenant(tenant_id): Tenant,
    Path(field_id): Path<String>,
) -> ApiResult<Json<RenderedControl>> {
    let field_id = FieldId::from_str(field_id.as_str())?;
    let control = state
        .builder_service
        .preview_field(tenant_id, field_id)
        .await?;

    Ok(Json(control))
}
