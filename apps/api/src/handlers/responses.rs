use std::str::FromStr;

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use quillform_application::CreateResponseInput;
use quillform_core::{ApplicationId, QuestionnaireId, ResponseId};

use crate::dto::{
    CloneAnswersRequest, CloneOutcomeResponse, CreateResponseRequest, ResponseSummaryResponse,
};
use crate::error::ApiResult;
use crate::state::AppState;
use crate::tenant::Tenant;

#[derive(Debug, serde::Deserialize)]
pub struct ResponseListQuery {
    pub application_id: String,
}

pub async fn list_responses_handler(
    State(state): State<AppState>,
    Tenant(tenant_id): Tenant,
    Path(questionnaire_id): Path<String>,
    Query(query): Query<ResponseListQuery>,
) -> ApiResult<Json<Vec<ResponseSummaryResponse>>> {
    let questionnaire_id = QuestionnaireId::from_str(questionnaire_id.as_str())?;
    let application_id = ApplicationId::from_str(query.application_id.as_str())?;

    let responses = state
        .version_service
        .list_responses(tenant_id, questionnaire_id, application_id)
        .await?
        .into_iter()
        .map(ResponseSummaryResponse::from)
        .collect();

    Ok(Json(responses))
}

pub async fn create_response_handler(
    State(state): State<AppState>,
    Tenant(tenant_id): Tenant,
    Path(questionnaire_id): Path<String>,
    Json(payload): Json<CreateResponseRequest>,
) -> ApiResult<(StatusCode, Json<ResponseSummaryResponse>)> {
    let questionnaire_id = QuestionnaireId::from_str(questionnaire_id.as_str())?;
    let application_id = ApplicationId::from_str(payload.application_id.as_str())?;
    let clone_from = payload
        .clone_from
        .as_deref()
        .map(ResponseId::from_str)
        .transpose()?;

    let response = state
        .version_service
        .create_response(
            tenant_id,
            questionnaire_id,
            application_id,
            CreateResponseInput { clone_from },
        )
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(ResponseSummaryResponse::from(response)),
    ))
}

pub async fn clone_application_handler(
    State(state): State<AppState>,
    Tenant(tenant_id): Tenant,
    Path(application_id): Path<String>,
    Json(payload): Json<CloneAnswersRequest>,
) -> ApiResult<Json<CloneOutcomeResponse>> {
    let target_application_id = ApplicationId::from_str(application_id.as_str())?;
    let questionnaire_id = QuestionnaireId::from_str(payload.questionnaire_id.as_str())?;
    let source_application_id = ApplicationId::from_str(payload.source_application_id.as_str())?;

    let outcome = state
        .version_service
        .clone_application_answers(
            tenant_id,
            questionnaire_id,
            source_application_id,
            target_application_id,
        )
        .await?;

    Ok(Json(CloneOutcomeResponse::from(outcome)))
}
