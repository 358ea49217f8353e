use std::collections::HashSet;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use quillform_core::{
    AppError, AppResult, ApplicationId, AttachmentId, FieldId, ItemId, NonEmptyString,
    QuestionnaireId, ResponseId,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::answer_state::is_empty_value;

/// Lifecycle status of a response version.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResponseStatus {
    /// Draft: answers accumulate via draft saves.
    InProgress,
    /// Explicitly submitted; re-submitting is allowed and idempotent.
    Submitted,
}

impl ResponseStatus {
    /// Returns a stable storage value for the status.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::InProgress => "in_progress",
            Self::Submitted => "submitted",
        }
    }
}

impl FromStr for ResponseStatus {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "in_progress" => Ok(Self::InProgress),
            "submitted" => Ok(Self::Submitted),
            _ => Err(AppError::Validation(format!(
                "unknown response status '{value}'"
            ))),
        }
    }
}

/// One persisted value for an (item, field) pair within a response.
///
/// `field_id` is `None` when the answer attaches to the item itself, e.g. a
/// free-text note on a question without fields. When both representations are
/// present, `value_json` takes precedence over `value_text`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnswerRecord {
    item_id: ItemId,
    field_id: Option<FieldId>,
    value_text: Option<String>,
    value_json: Option<Value>,
}

impl AnswerRecord {
    /// Creates a validated answer record.
    ///
    /// Empty values are never persisted; an answer whose effective value is
    /// empty is rejected here and must instead be removed from outgoing state.
    pub fn new(
        item_id: ItemId,
        field_id: Option<FieldId>,
        value_text: Option<String>,
        value_json: Option<Value>,
    ) -> AppResult<Self> {
        let record = Self {
            item_id,
            field_id,
            value_text,
            value_json,
        };

        if is_empty_value(&record.effective_value()) {
            return Err(AppError::Validation(
                "empty answer values are not persisted".to_owned(),
            ));
        }

        Ok(record)
    }

    /// Creates an answer record from a single JSON value.
    ///
    /// Plain strings are stored as text; everything else as JSON.
    pub fn from_value(item_id: ItemId, field_id: Option<FieldId>, value: Value) -> AppResult<Self> {
        match value {
            Value::String(text) => Self::new(item_id, field_id, Some(text), None),
            other => Self::new(item_id, field_id, None, Some(other)),
        }
    }

    /// Returns the answered item.
    #[must_use]
    pub fn item_id(&self) -> ItemId {
        self.item_id
    }

    /// Returns the answered field, or `None` for an item-level answer.
    #[must_use]
    pub fn field_id(&self) -> Option<FieldId> {
        self.field_id
    }

    /// Returns the raw text representation, if stored.
    #[must_use]
    pub fn value_text(&self) -> Option<&str> {
        self.value_text.as_deref()
    }

    /// Returns the raw JSON representation, if stored.
    #[must_use]
    pub fn value_json(&self) -> Option<&Value> {
        self.value_json.as_ref()
    }

    /// Returns the effective value; JSON takes precedence over text.
    #[must_use]
    pub fn effective_value(&self) -> Value {
        if let Some(value) = &self.value_json {
            return value.clone();
        }

        self.value_text
            .as_ref()
            .map(|text| Value::String(text.clone()))
            .unwrap_or(Value::Null)
    }
}

/// One versioned attempt at answering a questionnaire for an application.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResponseRecord {
    id: ResponseId,
    questionnaire_id: QuestionnaireId,
    application_id: ApplicationId,
    status: ResponseStatus,
    started_at: Option<DateTime<Utc>>,
    submitted_at: Option<DateTime<Utc>>,
    answers: Vec<AnswerRecord>,
}

impl ResponseRecord {
    /// Creates a fresh in-progress response with no answers.
    #[must_use]
    pub fn new(
        id: ResponseId,
        questionnaire_id: QuestionnaireId,
        application_id: ApplicationId,
        started_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            questionnaire_id,
            application_id,
            status: ResponseStatus::InProgress,
            started_at: Some(started_at),
            submitted_at: None,
            answers: Vec::new(),
        }
    }

    /// Reassembles a stored response, enforcing per-key answer uniqueness.
    #[allow(clippy::too_many_arguments)]
    pub fn from_parts(
        id: ResponseId,
        questionnaire_id: QuestionnaireId,
        application_id: ApplicationId,
        status: ResponseStatus,
        started_at: Option<DateTime<Utc>>,
        submitted_at: Option<DateTime<Utc>>,
        answers: Vec<AnswerRecord>,
    ) -> AppResult<Self> {
        require_unique_answer_keys(&answers)?;

        Ok(Self {
            id,
            questionnaire_id,
            application_id,
            status,
            started_at,
            submitted_at,
            answers,
        })
    }

    /// Returns the response identifier.
    #[must_use]
    pub fn id(&self) -> ResponseId {
        self.id
    }

    /// Returns the answered questionnaire.
    #[must_use]
    pub fn questionnaire_id(&self) -> QuestionnaireId {
        self.questionnaire_id
    }

    /// Returns the application (configuration item) context.
    #[must_use]
    pub fn application_id(&self) -> ApplicationId {
        self.application_id
    }

    /// Returns the lifecycle status.
    #[must_use]
    pub fn status(&self) -> ResponseStatus {
        self.status
    }

    /// Returns when the response was started.
    #[must_use]
    pub fn started_at(&self) -> Option<DateTime<Utc>> {
        self.started_at
    }

    /// Returns when the response was first submitted.
    #[must_use]
    pub fn submitted_at(&self) -> Option<DateTime<Utc>> {
        self.submitted_at
    }

    /// Returns all persisted answers.
    #[must_use]
    pub fn answers(&self) -> &[AnswerRecord] {
        self.answers.as_slice()
    }

    /// Looks up the answer for an (item, field) pair.
    #[must_use]
    pub fn answer(&self, item_id: ItemId, field_id: Option<FieldId>) -> Option<&AnswerRecord> {
        self.answers
            .iter()
            .find(|answer| answer.item_id() == item_id && answer.field_id() == field_id)
    }

    /// Replaces all answers wholesale.
    ///
    /// Saves never merge: the incoming list is the complete new answer set.
    pub fn replace_answers(&mut self, answers: Vec<AnswerRecord>) -> AppResult<()> {
        require_unique_answer_keys(&answers)?;
        self.answers = answers;
        Ok(())
    }

    /// Marks the response submitted.
    ///
    /// Idempotent: a response already submitted keeps its original
    /// `submitted_at` stamp, so duplicate submissions are harmless.
    pub fn submit(&mut self, at: DateTime<Utc>) {
        self.status = ResponseStatus::Submitted;
        if self.submitted_at.is_none() {
            self.submitted_at = Some(at);
        }
    }
}

fn require_unique_answer_keys(answers: &[AnswerRecord]) -> AppResult<()> {
    let mut seen = HashSet::new();
    for answer in answers {
        if !seen.insert((answer.item_id(), answer.field_id())) {
            return Err(AppError::Conflict(format!(
                "duplicate answer for item '{}' field '{}'",
                answer.item_id(),
                answer
                    .field_id()
                    .map(|field_id| field_id.to_string())
                    .unwrap_or_else(|| "-".to_owned())
            )));
        }
    }

    Ok(())
}

/// Stored reference to an uploaded file belonging to an answer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttachmentRecord {
    id: AttachmentId,
    response_id: ResponseId,
    field_id: FieldId,
    file_name: NonEmptyString,
    content_type: Option<String>,
    storage_key: NonEmptyString,
}

impl AttachmentRecord {
    /// Creates a validated attachment reference.
    pub fn new(
        id: AttachmentId,
        response_id: ResponseId,
        field_id: FieldId,
        file_name: impl Into<String>,
        content_type: Option<String>,
        storage_key: impl Into<String>,
    ) -> AppResult<Self> {
        Ok(Self {
            id,
            response_id,
            field_id,
            file_name: NonEmptyString::new(file_name)?,
            content_type,
            storage_key: NonEmptyString::new(storage_key)?,
        })
    }

    /// Returns the attachment identifier.
    #[must_use]
    pub fn id(&self) -> AttachmentId {
        self.id
    }

    /// Returns the owning response.
    #[must_use]
    pub fn response_id(&self) -> ResponseId {
        self.response_id
    }

    /// Returns the field the upload belongs to.
    #[must_use]
    pub fn field_id(&self) -> FieldId {
        self.field_id
    }

    /// Returns the original file name.
    #[must_use]
    pub fn file_name(&self) -> &NonEmptyString {
        &self.file_name
    }

    /// Returns the MIME type, if known.
    #[must_use]
    pub fn content_type(&self) -> Option<&str> {
        self.content_type.as_deref()
    }

    /// Returns the opaque storage handle.
    #[must_use]
    pub fn storage_key(&self) -> &NonEmptyString {
        &self.storage_key
    }

    /// Returns a copy of this attachment re-homed to another response.
    ///
    /// Used when cloning answers between response versions or applications;
    /// the storage handle is shared, the row is new.
    #[must_use]
    pub fn duplicated_for(&self, id: AttachmentId, response_id: ResponseId) -> Self {
        Self {
            id,
            response_id,
            field_id: self.field_id,
            file_name: self.file_name.clone(),
            content_type: self.content_type.clone(),
            storage_key: self.storage_key.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use quillform_core::{ApplicationId, FieldId, ItemId, QuestionnaireId, ResponseId};
    use serde_json::json;

    use super::{AnswerRecord, ResponseRecord, ResponseStatus};

    #[test]
    fn answer_rejects_empty_effective_value() {
        let result = AnswerRecord::new(ItemId::new(), None, Some(String::new()), None);
        assert!(result.is_err());

        let result = AnswerRecord::new(ItemId::new(), None, None, Some(json!([])));
        assert!(result.is_err());
    }

    #[test]
    fn answer_json_takes_precedence_over_text() {
        let answer = AnswerRecord::new(
            ItemId::new(),
            Some(FieldId::new()),
            Some("stale".to_owned()),
            Some(json!(["b"])),
        );
        assert!(answer.is_ok());
        assert_eq!(
            answer.unwrap_or_else(|_| unreachable!()).effective_value(),
            json!(["b"])
        );
    }

    #[test]
    fn response_rejects_duplicate_answer_keys() {
        let item_id = ItemId::new();
        let field_id = FieldId::new();
        let answers = vec![
            AnswerRecord::from_value(item_id, Some(field_id), json!("first"))
                .unwrap_or_else(|_| unreachable!()),
            AnswerRecord::from_value(item_id, Some(field_id), json!("second"))
                .unwrap_or_else(|_| unreachable!()),
        ];

        let result = ResponseRecord::from_parts(
            ResponseId::new(),
            QuestionnaireId::new(),
            ApplicationId::new(),
            ResponseStatus::InProgress,
            Some(Utc::now()),
            None,
            answers,
        );
        assert!(result.is_err());
    }

    #[test]
    fn submit_is_idempotent() {
        let mut response = ResponseRecord::new(
            ResponseId::new(),
            QuestionnaireId::new(),
            ApplicationId::new(),
            Utc::now(),
        );

        let first = Utc::now();
        response.submit(first);
        assert_eq!(response.status(), ResponseStatus::Submitted);
        assert_eq!(response.submitted_at(), Some(first));

        response.submit(Utc::now());
        assert_eq!(response.status(), ResponseStatus::Submitted);
        assert_eq!(response.submitted_at(), Some(first));
    }
}
