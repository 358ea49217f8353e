use std::sync::Arc;

use chrono::Utc;
use quillform_core::{AppError, AppResult, ItemId, ResponseId, TenantId};
use quillform_domain::{
    AnswerKey, AnswerRecord, AnswerState, FieldDefinition, FieldTypeRegistry, Item, OutgoingAnswer,
    OutlineEntry, OutlineTree, QuestionnaireDefinition, ResponseRecord, ResponseStatus,
    is_empty_value,
};
use serde_json::Value;

use crate::builder_service::order_by_outline;
use crate::questionnaire_ports::{QuestionnaireRepository, RuntimeContextKey};
use crate::version_service::VersionService;

/// Normalized payload the runner renders a questionnaire from.
#[derive(Debug, Clone)]
pub struct RuntimePayload {
    /// The questionnaire definition.
    pub questionnaire: QuestionnaireDefinition,
    /// Items in depth-first outline order.
    pub items: Vec<Item>,
    /// Flattened outline entries matching `items`.
    pub outline: Vec<OutlineEntry>,
    /// Fields grouped by item in outline order, insertion order within an
    /// item.
    pub fields: Vec<FieldDefinition>,
    /// The active response version.
    pub response: ResponseRecord,
}

/// Loads runtime contexts and persists answers as versioned responses.
#[derive(Clone)]
pub struct RunnerService {
    repository: Arc<dyn QuestionnaireRepository>,
    versions: VersionService,
    registry: Arc<FieldTypeRegistry>,
}

impl RunnerService {
    /// Creates a runner service from a repository implementation.
    #[must_use]
    pub fn new(repository: Arc<dyn QuestionnaireRepository>, versions: VersionService) -> Self {
        Self {
            repository,
            versions,
            registry: Arc::new(FieldTypeRegistry::new()),
        }
    }

    /// Returns the field-type registry used for rendering and coercion.
    #[must_use]
    pub fn registry(&self) -> &FieldTypeRegistry {
        &self.registry
    }

    /// Loads the runtime payload for a context key.
    ///
    /// An application key selects the default response version (in-progress
    /// preferred, else most recent), creating a fresh in-progress version
    /// when none exists yet.
    pub async fn load_context(
        &self,
        tenant_id: TenantId,
        key: RuntimeContextKey,
    ) -> AppResult<RuntimePayload> {
        let response = match key {
            RuntimeContextKey::Response(response_id) => self
                .repository
                .find_response(tenant_id, response_id)
                .await?
                .ok_or_else(|| {
                    AppError::NotFound(format!("response '{response_id}' does not exist"))
                })?,
            RuntimeContextKey::Application {
                questionnaire_id,
                application_id,
            } => {
                match self
                    .versions
                    .default_response(tenant_id, questionnaire_id, application_id)
                    .await?
                {
                    Some(existing) => existing,
                    None => {
                        self.versions
                            .create_response(
                                tenant_id,
                                questionnaire_id,
                                application_id,
                                crate::questionnaire_ports::CreateResponseInput::default(),
                            )
                            .await?
                    }
                }
            }
        };

        self.assemble_payload(tenant_id, response).await
    }

    /// Persists an outgoing answer list against a response version.
    ///
    /// The list replaces the response's answers wholesale; the returned
    /// payload is the canonical post-save state. Submitting an already
    /// submitted response is allowed and idempotent; a draft save never
    /// un-submits.
    pub async fn save_answers(
        &self,
        tenant_id: TenantId,
        response_id: ResponseId,
        answers: Vec<OutgoingAnswer>,
        target_status: ResponseStatus,
    ) -> AppResult<RuntimePayload> {
        let mut response = self
            .repository
            .find_response(tenant_id, response_id)
            .await?
            .ok_or_else(|| {
                AppError::NotFound(format!("response '{response_id}' does not exist"))
            })?;

        let items = self
            .repository
            .list_items(tenant_id, response.questionnaire_id())
            .await?;
        let fields = self
            .repository
            .list_questionnaire_fields(tenant_id, response.questionnaire_id())
            .await?;

        let mut records = Vec::with_capacity(answers.len());
        for outgoing in answers {
            if !items.iter().any(|item| item.id() == outgoing.item_id) {
                return Err(AppError::Validation(format!(
                    "answer references unknown item '{}'",
                    outgoing.item_id
                )));
            }

            let coerced = match outgoing.field_id {
                Some(field_id) => {
                    let field = fields
                        .iter()
                        .find(|field| field.id() == field_id)
                        .ok_or_else(|| {
                            AppError::Validation(format!(
                                "answer references unknown field '{field_id}'"
                            ))
                        })?;
                    if field.item_id() != outgoing.item_id {
                        return Err(AppError::Validation(format!(
                            "field '{field_id}' does not belong to item '{}'",
                            outgoing.item_id
                        )));
                    }

                    self.registry.coerce_value(field, outgoing.value)?
                }
                None => (!is_empty_value(&outgoing.value)).then_some(outgoing.value),
            };

            // Empty values are "no answer"; they are dropped, never stored.
            if let Some(value) = coerced {
                records.push(AnswerRecord::from_value(
                    outgoing.item_id,
                    outgoing.field_id,
                    value,
                )?);
            }
        }

        response.replace_answers(records)?;
        if target_status == ResponseStatus::Submitted {
            response.submit(Utc::now());
        }

        self.repository
            .save_response(tenant_id, response.clone())
            .await?;

        self.assemble_payload(tenant_id, response).await
    }

    async fn assemble_payload(
        &self,
        tenant_id: TenantId,
        response: ResponseRecord,
    ) -> AppResult<RuntimePayload> {
        let questionnaire = self
            .repository
            .find_questionnaire(tenant_id, response.questionnaire_id())
            .await?
            .ok_or_else(|| {
                AppError::NotFound(format!(
                    "questionnaire '{}' does not exist for tenant '{tenant_id}'",
                    response.questionnaire_id()
                ))
            })?;

        let items = self
            .repository
            .list_items(tenant_id, response.questionnaire_id())
            .await?;
        let outline = OutlineTree::build(&items)?.flatten();
        let items = order_by_outline(items, &outline);

        let all_fields = self
            .repository
            .list_questionnaire_fields(tenant_id, response.questionnaire_id())
            .await?;
        let mut fields = Vec::with_capacity(all_fields.len());
        for item in &items {
            fields.extend(
                all_fields
                    .iter()
                    .filter(|field| field.item_id() == item.id())
                    .cloned(),
            );
        }

        Ok(RuntimePayload {
            questionnaire,
            items,
            outline,
            fields,
            response,
        })
    }
}

/// Token for one load request; stale tokens are discarded on install.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadTicket(u64);

/// Client-side editing model for one mounted runner.
///
/// Owns the loaded payload, the in-progress answer state, the active-item
/// pointer for the side navigation, and a load-generation counter that guards
/// against a stale load result clobbering a fresher one.
#[derive(Clone)]
pub struct RunnerSession {
    service: RunnerService,
    tenant_id: TenantId,
    payload: Option<RuntimePayload>,
    state: AnswerState,
    active_item: Option<ItemId>,
    generation: u64,
}

impl RunnerSession {
    /// Creates an empty session for one tenant.
    #[must_use]
    pub fn new(service: RunnerService, tenant_id: TenantId) -> Self {
        Self {
            service,
            tenant_id,
            payload: None,
            state: AnswerState::new(),
            active_item: None,
            generation: 0,
        }
    }

    /// Starts a load, superseding any load still in flight.
    pub fn begin_load(&mut self) -> LoadTicket {
        self.generation += 1;
        LoadTicket(self.generation)
    }

    /// Installs a loaded payload.
    ///
    /// Returns `false` and leaves the session untouched when the ticket was
    /// superseded by a newer [`Self::begin_load`].
    pub fn install_payload(&mut self, ticket: LoadTicket, payload: RuntimePayload) -> bool {
        if ticket.0 != self.generation {
            return false;
        }

        self.state = AnswerState::from_response(&payload.response);
        self.active_item = payload.outline.first().map(OutlineEntry::item_id);
        self.payload = Some(payload);
        true
    }

    /// Loads a runtime context into the session.
    ///
    /// Returns whether the result was installed (`false` means a newer load
    /// superseded this one while it was in flight).
    pub async fn load(&mut self, key: RuntimeContextKey) -> AppResult<bool> {
        let ticket = self.begin_load();
        let payload = self.service.load_context(self.tenant_id, key).await?;
        Ok(self.install_payload(ticket, payload))
    }

    /// Returns the loaded payload, if any.
    #[must_use]
    pub fn payload(&self) -> Option<&RuntimePayload> {
        self.payload.as_ref()
    }

    /// Returns the tracked answer state.
    #[must_use]
    pub fn answers(&self) -> &AnswerState {
        &self.state
    }

    /// Returns whether unsaved edits exist.
    #[must_use]
    pub fn dirty(&self) -> bool {
        self.state.dirty()
    }

    /// Returns the item the side navigation highlights.
    #[must_use]
    pub fn active_item(&self) -> Option<ItemId> {
        self.active_item
    }

    /// Sets the active item directly, as a side-nav click does.
    pub fn set_active_item(&mut self, item_id: ItemId) {
        self.active_item = Some(item_id);
    }

    /// Updates the active item from the set of sections currently
    /// intersecting the viewport: the topmost one in outline order wins. An
    /// empty set keeps the current pointer.
    pub fn observe_intersections(&mut self, visible: &[ItemId]) {
        let Some(payload) = &self.payload else {
            return;
        };

        if let Some(topmost) = payload
            .outline
            .iter()
            .map(OutlineEntry::item_id)
            .find(|item_id| visible.contains(item_id))
        {
            self.active_item = Some(topmost);
        }
    }

    /// Updates one tracked answer value.
    pub fn update_answer(&mut self, key: AnswerKey, value: Value) {
        self.state.set(key, value);
    }

    /// Adds or removes one option value in a multi-choice answer.
    pub fn toggle_choice(&mut self, key: AnswerKey, option_value: &str) {
        self.state.toggle_choice(key, option_value);
    }

    /// Persists the current answer state as a draft save or submit.
    ///
    /// On success the session replaces its payload and state wholesale with
    /// the server's canonical result and the dirty flag clears. On failure
    /// nothing local changes, so the user's edits survive a retry.
    pub async fn save(&mut self, target_status: ResponseStatus) -> AppResult<()> {
        let payload = self.payload.as_ref().ok_or_else(|| {
            AppError::Validation("no runtime context is loaded".to_owned())
        })?;

        let outgoing = self.state.outgoing(&payload.fields)?;
        let refreshed = self
            .service
            .save_answers(
                self.tenant_id,
                payload.response.id(),
                outgoing,
                target_status,
            )
            .await?;

        self.state = AnswerState::from_response(&refreshed.response);
        self.payload = Some(refreshed);
        Ok(())
    }
}

#[cfg(test)]
mod tests;
