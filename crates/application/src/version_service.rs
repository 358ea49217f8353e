use std::sync::Arc;

use chrono::Utc;
use quillform_core::{
    AppError, AppResult, ApplicationId, AttachmentId, QuestionnaireId, ResponseId, TenantId,
};
use quillform_domain::{ResponseRecord, ResponseStatus};

use crate::questionnaire_ports::{CloneOutcome, CreateResponseInput, QuestionnaireRepository};

/// Enumerates and creates response versions, including answer clones.
#[derive(Clone)]
pub struct VersionService {
    repository: Arc<dyn QuestionnaireRepository>,
}

impl VersionService {
    /// Creates a version service from a repository implementation.
    #[must_use]
    pub fn new(repository: Arc<dyn QuestionnaireRepository>) -> Self {
        Self { repository }
    }

    /// Lists response versions newest first.
    pub async fn list_responses(
        &self,
        tenant_id: TenantId,
        questionnaire_id: QuestionnaireId,
        application_id: ApplicationId,
    ) -> AppResult<Vec<ResponseRecord>> {
        let mut responses = self
            .repository
            .list_responses(tenant_id, questionnaire_id, application_id)
            .await?;

        // Newest first; id breaks ties so repeated listings stay stable.
        responses.sort_by(|left, right| {
            right
                .started_at()
                .cmp(&left.started_at())
                .then_with(|| right.id().cmp(&left.id()))
        });

        Ok(responses)
    }

    /// Returns the version the runner opens by default.
    ///
    /// An in-progress version wins over submitted ones; otherwise the most
    /// recent version overall is selected.
    pub async fn default_response(
        &self,
        tenant_id: TenantId,
        questionnaire_id: QuestionnaireId,
        application_id: ApplicationId,
    ) -> AppResult<Option<ResponseRecord>> {
        let responses = self
            .list_responses(tenant_id, questionnaire_id, application_id)
            .await?;

        let in_progress = responses
            .iter()
            .find(|response| response.status() == ResponseStatus::InProgress)
            .cloned();

        Ok(in_progress.or_else(|| responses.into_iter().next()))
    }

    /// Creates a fresh in-progress response version.
    ///
    /// With `clone_from`, the source response's answers and attachment
    /// references are copied into the new version. The clone is additive
    /// only: the source is never mutated.
    pub async fn create_response(
        &self,
        tenant_id: TenantId,
        questionnaire_id: QuestionnaireId,
        application_id: ApplicationId,
        input: CreateResponseInput,
    ) -> AppResult<ResponseRecord> {
        self.require_questionnaire(tenant_id, questionnaire_id)
            .await?;

        let mut response = ResponseRecord::new(
            ResponseId::new(),
            questionnaire_id,
            application_id,
            Utc::now(),
        );

        if let Some(source_id) = input.clone_from {
            let source = self
                .repository
                .find_response(tenant_id, source_id)
                .await?
                .ok_or_else(|| {
                    AppError::NotFound(format!("source response '{source_id}' does not exist"))
                })?;

            if source.questionnaire_id() != questionnaire_id {
                return Err(AppError::Validation(format!(
                    "source response '{source_id}' belongs to a different questionnaire"
                )));
            }

            self.copy_answers(tenant_id, &source, &mut response).await?;
        }

        self.repository
            .save_response(tenant_id, response.clone())
            .await?;

        Ok(response)
    }

    /// Copies answers and attachments between applications under the same
    /// questionnaire, into the target's default response (created when
    /// absent). Reports how much was copied.
    pub async fn clone_application_answers(
        &self,
        tenant_id: TenantId,
        questionnaire_id: QuestionnaireId,
        source_application_id: ApplicationId,
        target_application_id: ApplicationId,
    ) -> AppResult<CloneOutcome> {
        if source_application_id == target_application_id {
            return Err(AppError::Validation(
                "source and target application must differ".to_owned(),
            ));
        }

        let source = self
            .default_response(tenant_id, questionnaire_id, source_application_id)
            .await?
            .ok_or_else(|| {
                AppError::NotFound(format!(
                    "application '{source_application_id}' has no response for questionnaire '{questionnaire_id}'"
                ))
            })?;

        let mut target = match self
            .default_response(tenant_id, questionnaire_id, target_application_id)
            .await?
        {
            Some(existing) => existing,
            None => ResponseRecord::new(
                ResponseId::new(),
                questionnaire_id,
                target_application_id,
                Utc::now(),
            ),
        };

        let outcome = self.copy_answers(tenant_id, &source, &mut target).await?;
        self.repository.save_response(tenant_id, target).await?;

        Ok(outcome)
    }

    async fn copy_answers(
        &self,
        tenant_id: TenantId,
        source: &ResponseRecord,
        target: &mut ResponseRecord,
    ) -> AppResult<CloneOutcome> {
        // Stored answers are non-empty by invariant, so the copy is the
        // complete persistable set.
        let answers = source.answers().to_vec();
        let answers_copied = answers.len();
        target.replace_answers(answers)?;

        let mut attachments_copied = 0;
        for attachment in self
            .repository
            .list_attachments(tenant_id, source.id())
            .await?
        {
            self.repository
                .save_attachment(
                    tenant_id,
                    attachment.duplicated_for(AttachmentId::new(), target.id()),
                )
                .await?;
            attachments_copied += 1;
        }

        Ok(CloneOutcome {
            answers_copied,
            attachments_copied,
        })
    }

    async fn require_questionnaire(
        &self,
        tenant_id: TenantId,
        questionnaire_id: QuestionnaireId,
    ) -> AppResult<()> {
        if self
            .repository
            .find_questionnaire(tenant_id, questionnaire_id)
            .await?
            .is_none()
        {
            return Err(AppError::NotFound(format!(
                "questionnaire '{questionnaire_id}' does not exist for tenant '{tenant_id}'"
            )));
        }

        Ok(())
    }
}
