use quillform_application::RuntimePayload;
use quillform_domain::{AnswerKey, ResponseRecord};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use ts_rs::TS;

use super::builder::{FieldResponse, ItemResponse, QuestionnaireResponse};

/// One answer inside a runtime payload.
///
/// `key` carries the `i-<id>` / `f-<id>` wire form the runner keys its local
/// state by.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/answer-dto.ts"
)]
pub struct AnswerDto {
    pub key: String,
    pub item_id: String,
    pub field_id: Option<String>,
    #[ts(type = "unknown")]
    pub value: Value,
}

/// Full response detail inside a runtime payload.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/response-detail-response.ts"
)]
pub struct ResponseDetailResponse {
    pub id: String,
    pub application_id: String,
    pub status: String,
    pub started_at: Option<String>,
    pub submitted_at: Option<String>,
    pub answers: Vec<AnswerDto>,
}

impl From<ResponseRecord> for ResponseDetailResponse {
    fn from(value: ResponseRecord) -> Self {
        let answers = value
            .answers()
            .iter()
            .map(|answer| {
                let key = match answer.field_id() {
                    Some(field_id) => AnswerKey::Field(field_id),
                    None => AnswerKey::Item(answer.item_id()),
                };

                AnswerDto {
                    key: key.to_string(),
                    item_id: answer.item_id().to_string(),
                    field_id: answer.field_id().map(|field_id| field_id.to_string()),
                    value: answer.effective_value(),
                }
            })
            .collect();

        Self {
            id: value.id().to_string(),
            application_id: value.application_id().to_string(),
            status: value.status().as_str().to_owned(),
            started_at: value.started_at().map(|at| at.to_rfc3339()),
            submitted_at: value.submitted_at().map(|at| at.to_rfc3339()),
            answers,
        }
    }
}

/// Normalized payload the runner renders from.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/runtime-payload-response.ts"
)]
pub struct RuntimePayloadResponse {
    pub questionnaire: QuestionnaireResponse,
    pub items: Vec<ItemResponse>,
    pub fields: Vec<FieldResponse>,
    pub response: ResponseDetailResponse,
}

impl From<RuntimePayload> for RuntimePayloadResponse {
    fn from(value: RuntimePayload) -> Self {
        let items = value
            .items
            .into_iter()
            .zip(value.outline.iter())
            .map(|(item, entry)| ItemResponse::with_outline(item, entry))
            .collect();

        Self {
            questionnaire: QuestionnaireResponse::from(value.questionnaire),
            items,
            fields: value.fields.into_iter().map(FieldResponse::from).collect(),
            response: ResponseDetailResponse::from(value.response),
        }
    }
}

/// One outgoing answer entry in a save request.
#[derive(Debug, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/save-answer-entry.ts"
)]
pub struct SaveAnswerEntry {
    pub item_id: String,
    pub field_id: Option<String>,
    #[ts(type = "unknown")]
    pub value: Value,
}

/// Incoming payload for a draft save or submit.
#[derive(Debug, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/save-answers-request.ts"
)]
pub struct SaveAnswersRequest {
    pub status: String,
    pub answers: Vec<SaveAnswerEntry>,
}
