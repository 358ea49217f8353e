use quillform_application::CloneOutcome;
use quillform_domain::ResponseRecord;
use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// One response version in a listing.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/response-summary-response.ts"
)]
pub struct ResponseSummaryResponse {
    pub id: String,
    pub questionnaire_id: String,
    pub application_id: String,
    pub status: String,
    pub started_at: Option<String>,
    pub submitted_at: Option<String>,
    pub answer_count: u32,
}

impl From<ResponseRecord> for ResponseSummaryResponse {
    fn from(value: ResponseRecord) -> Self {
        Self {
            id: value.id().to_string(),
            questionnaire_id: value.questionnaire_id().to_string(),
            application_id: value.application_id().to_string(),
            status: value.status().as_str().to_owned(),
            started_at: value.started_at().map(|at| at.to_rfc3339()),
            submitted_at: value.submitted_at().map(|at| at.to_rfc3339()),
            answer_count: value.answers().len() as u32,
        }
    }
}

/// Incoming payload for response version creation.
#[derive(Debug, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/create-response-request.ts"
)]
pub struct CreateResponseRequest {
    pub application_id: String,
    pub clone_from: Option<String>,
}

/// Incoming payload for a cross-application answer clone.
#[derive(Debug, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/clone-answers-request.ts"
)]
pub struct CloneAnswersRequest {
    pub questionnaire_id: String,
    pub source_application_id: String,
}

/// Copy counts reported after a cross-application clone.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/clone-outcome-response.ts"
)]
pub struct CloneOutcomeResponse {
    pub answers_copied: u32,
    pub attachments_copied: u32,
}

impl From<CloneOutcome> for CloneOutcomeResponse {
    fn from(value: CloneOutcome) -> Self {
        Self {
            answers_copied: value.answers_copied as u32,
            attachments_copied: value.attachments_copied as u32,
        }
    }
}
