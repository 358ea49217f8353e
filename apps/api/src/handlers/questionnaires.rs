use std::str::FromStr;

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use quillform_core::QuestionnaireId;

use crate::dto::{
    CreateQuestionnaireRequest, QuestionnaireOverviewResponse, QuestionnaireResponse,
};
use crate::error::ApiResult;
use crate::state::AppState;
use crate::tenant::Tenant;

pub async fn create_questionnaire_handler(
    State(state): State<AppState>,
    Tenant(tenant_id): Tenant,
    Json(payload): Json<CreateQuestionnaireRequest>,
) -> ApiResult<(StatusCode, Json<QuestionnaireResponse>)> {
    let questionnaire = state
        .builder_service
        .create_questionnaire(tenant_id, payload.name, payload.description)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(QuestionnaireResponse::from(questionnaire)),
    ))
}

pub async fn get_questionnaire_handler(
    State(state): State<AppState>,
    Tenant(tenant_id): Tenant,
    Path(questionnaire_id): Path<String>,
) -> ApiResult<Json<QuestionnaireOverviewResponse>> {
    let questionnaire_id = QuestionnaireId::from_str(questionnaire_id.as_str())?;
    let overview = state
        .builder_service
        .get_questionnaire(tenant_id, questionnaire_id)
        .await?;

    Ok(Json(QuestionnaireOverviewResponse::from(overview)))
}
