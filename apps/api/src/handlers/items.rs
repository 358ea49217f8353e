use std::str::FromStr;

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use quillform_core::{ItemId, QuestionnaireId};
use quillform_domain::{ItemType, MoveDirection, MoveOutcome, UiType};

use quillform_application::{ItemPatch, NewItemInput, ParentChange, SaveFieldInput};

use crate::dto::{
    CreateFieldRequest, CreateItemRequest, FieldResponse, ItemResponse, MoveItemRequest,
    MoveItemResponse, UpdateItemRequest,
};
use crate::error::ApiResult;
use crate::state::AppState;
use crate::tenant::Tenant;

pub async fn add_item_handler(
    State(state): State<AppState>,
    Tenant(tenant_id): Tenant,
    Path(questionnaire_id): Path<String>,
    Json(payload): Json<CreateItemRequest>,
) -> ApiResult<(StatusCode, Json<ItemResponse>)> {
    let questionnaire_id = QuestionnaireId::from_str(questionnaire_id.as_str())?;
    let parent_id = payload
        .parent_id
        .as_deref()
        .map(ItemId::from_str)
        .transpose()?;

    let item = state
        .builder_service
        .add_item(
            tenant_id,
            questionnaire_id,
            NewItemInput {
                parent_id,
                item_type: ItemType::from_str(payload.item_type.as_str())?,
                title: payload.title,
                help: payload.help,
                required: payload.required.unwrap_or(false),
                visible_when: payload.visible_when,
            },
        )
        .await?;

    Ok((StatusCode::CREATED, Json(ItemResponse::from(item))))
}

pub async fn update_item_handler(
    State(state): State<AppState>,
    Tenant(tenant_id): Tenant,
    Path(item_id): Path<String>,
    Json(payload): Json<UpdateItemRequest>,
) -> ApiResult<Json<ItemResponse>> {
    let item_id = ItemId::from_str(item_id.as_str())?;

    // An empty parent_id string promotes the item to a root node.
    let parent_change = payload
        .parent_id
        .map(|raw| {
            if raw.trim().is_empty() {
                Ok(ParentChange::Root)
            } else {
                ItemId::from_str(raw.as_str()).map(ParentChange::To)
            }
        })
        .transpose()?;

    let item = state
        .builder_service
        .patch_item(
            tenant_id,
            item_id,
            ItemPatch {
                title: payload.title,
                help: payload.help,
                required: payload.required,
                parent_id: parent_change,
                sort: payload.sort,
                visible_when: payload.visible_when,
            },
        )
        .await?;

    Ok(Json(ItemResponse::from(item)))
}

pub async fn move_item_handler(
    State(state): State<AppState>,
    Tenant(tenant_id): Tenant,
    Path(item_id): Path<String>,
    Json(payload): Json<MoveItemRequest>,
) -> ApiResult<Json<MoveItemResponse>> {
    let item_id = ItemId::from_str(item_id.as_str())?;
    let direction = MoveDirection::from_str(payload.direction.as_str())?;

    let outcome = state
        .builder_service
        .move_item(tenant_id, item_id, direction)
        .await?;

    Ok(Json(MoveItemResponse {
        moved: outcome == MoveOutcome::Moved,
    }))
}

pub async fn delete_item_handler(
    State(state): State<AppState>,
    Tenant(tenant_id): Tenant,
    Path(item_id): Path<String>,
) -> ApiResult<StatusCode> {
    let item_id = ItemId::from_str(item_id.as_str())?;
    state.builder_service.delete_item(tenant_id, item_id).await?;

    Ok(StatusCode::NO_CONTENT)
}

pub async fn list_fields_handler(
    State(state): State<AppState>,
    Tenant(tenant_id): Tenant,
    Path(item_id): Path<String>,
) -> ApiResult<Json<Vec<FieldResponse>>> {
    let item_id = ItemId::from_str(item_id.as_str())?;
    let fields = state
        .builder_service
        .list_fields(tenant_id, item_id)
        .await?
        .into_iter()
        .map(FieldResponse::from)
        .collect();

    Ok(Json(fields))
}

pub async fn add_field_handler(
    State(state): State<AppState>,
    Tenant(tenant_id): Tenant,
    Path(item_id): Path<String>,
    Json(payload): Json<CreateFieldRequest>,
) -> ApiResult<(StatusCode, Json<FieldResponse>)> {
    let item_id = ItemId::from_str(item_id.as_str())?;
    let field = state
        .builder_service
        .add_field(
            tenant_id,
            item_id,
            SaveFieldInput {
                ui_type: UiType::from_str(payload.ui_type.as_str())?,
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

    Ok((StatusCode::CREATED, Json(FieldResponse::from(field))))
}
