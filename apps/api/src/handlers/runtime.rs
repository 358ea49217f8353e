use std::str::FromStr;

use axum::Json;
use axum::extract::{Path, Query, State};
use quillform_application::RuntimeContextKey;
use quillform_core::{AppError, ApplicationId, QuestionnaireId, ResponseId};
use quillform_domain::{OutgoingAnswer, ResponseStatus};

use crate::dto::{RuntimePayloadResponse, SaveAnswersRequest};
use crate::error::ApiResult;
use crate::state::AppState;
use crate::tenant::Tenant;

/// Context selector: either an explicit response id, or a questionnaire plus
/// application pair.
#[derive(Debug, serde::Deserialize)]
pub struct RuntimeContextQuery {
    pub response_id: Option<String>,
    pub questionnaire_id: Option<String>,
    pub application_id: Option<String>,
}

impl RuntimeContextQuery {
    fn into_key(self) -> Result<RuntimeContextKey, AppError> {
        if let Some(response_id) = self.response_id.as_deref() {
            return Ok(RuntimeContextKey::Response(ResponseId::from_str(
                response_id,
            )?));
        }

        match (self.questionnaire_id.as_deref(), self.application_id.as_deref()) {
            (Some(questionnaire_id), Some(application_id)) => {
                Ok(RuntimeContextKey::Application {
                    questionnaire_id: QuestionnaireId::from_str(questionnaire_id)?,
                    application_id: ApplicationId::from_str(application_id)?,
                })
            }
            _ => Err(AppError::Validation(
                "runtime context requires response_id, or questionnaire_id and application_id"
                    .to_owned(),
            )),
        }
    }
}

pub async fn runtime_context_handler(
    State(state): State<AppState>,
    Tenant(tenant_id): Tenant,
    Query(query): Query<RuntimeContextQuery>,
) -> ApiResult<Json<RuntimePayloadResponse>> {
    let key = query.into_key()?;
    let payload = state.runner_service.load_context(tenant_id, key).await?;

    Ok(Json(RuntimePayloadResponse::from(payload)))
}

pub async fn save_answers_handler(
    State(state): State<AppState>,
    Tenant(tenant_id): Tenant,
    Path(response_id): Path<String>,
    Json(payload): Json<SaveAnswersRequest>,
) -> ApiResult<Json<RuntimePayloadResponse>> {
    let response_id = ResponseId::from_str(response_id.as_str())?;
    let target_status = ResponseStatus::from_str(payload.status.as_str())?;

    let mut answers = Vec::with_capacity(payload.answers.len());
    for entry in payload.answers {
        answers.push(OutgoingAnswer {
            item_id: quillform_core::ItemId::from_str(entry.item_id.as_str())?,
            field_id: entry
                .field_id
                .as_deref()
                .map(quillform_core::FieldId::from_str)
                .transpose()?,
            value: entry.value,
        });
    }

    let refreshed = state
        .runner_service
        .save_answers(tenant_id, response_id, answers, target_status)
        .await?;

    Ok(Json(RuntimePayloadResponse::from(refreshed)))
}
