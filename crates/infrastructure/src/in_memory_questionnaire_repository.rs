use std::collections::HashMap;

use async_trait::async_trait;
use quillform_application::QuestionnaireRepository;
use quillform_core::{
    AppError, AppResult, ApplicationId, FieldId, ItemId, QuestionnaireId, ResponseId, TenantId,
};
use quillform_domain::{
    AttachmentRecord, FieldDefinition, Item, QuestionnaireDefinition, ResponseRecord,
};
use tokio::sync::RwLock;

/// In-memory questionnaire repository implementation.
///
/// Field rows are kept in a vector per tenant so insertion order — the field
/// display contract — survives round trips.
#[derive(Debug, Default)]
pub struct InMemoryQuestionnaireRepository {
    questionnaires: RwLock<HashMap<(TenantId, QuestionnaireId), QuestionnaireDefinition>>,
    items: RwLock<HashMap<(TenantId, ItemId), Item>>,
    fields: RwLock<Vec<(TenantId, FieldDefinition)>>,
    responses: RwLock<HashMap<(TenantId, ResponseId), ResponseRecord>>,
    attachments: RwLock<Vec<(TenantId, AttachmentRecord)>>,
}

impl InMemoryQuestionnaireRepository {
    /// Creates an empty in-memory repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl QuestionnaireRepository for InMemoryQuestionnaireRepository {
    async fn save_questionnaire(
        &self,
        tenant_id: TenantId,
        questionnaire: QuestionnaireDefinition,
    ) -> AppResult<()> {
        let key = (tenant_id, questionnaire.id());
        let mut questionnaires = self.questionnaires.write().await;

        if questionnaires.contains_key(&key) {
            return Err(AppError::Conflict(format!(
                "questionnaire '{}' already exists for tenant '{}'",
                key.1, key.0
            )));
        }

        questionnaires.insert(key, questionnaire);
        Ok(())
    }

    async fn find_questionnaire(
        &self,
        tenant_id: TenantId,
        questionnaire_id: QuestionnaireId,
    ) -> AppResult<Option<QuestionnaireDefinition>> {
        Ok(self
            .questionnaires
            .read()
            .await
            .get(&(tenant_id, questionnaire_id))
            .cloned())
    }

    async fn list_questionnaires(
        &self,
        tenant_id: TenantId,
    ) -> AppResult<Vec<QuestionnaireDefinition>> {
        let questionnaires = self.questionnaires.read().await;

        let mut listed: Vec<QuestionnaireDefinition> = questionnaires
            .iter()
            .filter_map(|((stored_tenant_id, _), questionnaire)| {
                (stored_tenant_id == &tenant_id).then(|| questionnaire.clone())
            })
            .collect();
        listed.sort_by(|left, right| {
            left.name()
                .as_str()
                .cmp(right.name().as_str())
                .then_with(|| left.id().cmp(&right.id()))
        });

        Ok(listed)
    }

    async fn save_item(&self, tenant_id: TenantId, item: Item) -> AppResult<()> {
        self.items
            .write()
            .await
            .insert((tenant_id, item.id()), item);
        Ok(())
    }

    async fn list_items(
        &self,
        tenant_id: TenantId,
        questionnaire_id: QuestionnaireId,
    ) -> AppResult<Vec<Item>> {
        let items = self.items.read().await;
        let mut listed: Vec<Item> = items
            .iter()
            .filter_map(|((stored_tenant_id, _), item)| {
                (stored_tenant_id == &tenant_id && item.questionnaire_id() == questionnaire_id)
                    .then(|| item.clone())
            })
            .collect();
        listed.sort_by_key(|item| (item.sort(), item.id()));

        Ok(listed)
    }

    async fn find_item(&self, tenant_id: TenantId, item_id: ItemId) -> AppResult<Option<Item>> {
        Ok(self
            .items
            .read()
            .await
            .get(&(tenant_id, item_id))
            .cloned())
    }

    async fn delete_item(&self, tenant_id: TenantId, item_id: ItemId) -> AppResult<()> {
        if self
            .items
            .write()
            .await
            .remove(&(tenant_id, item_id))
            .is_none()
        {
            return Err(AppError::NotFound(format!(
                "item '{item_id}' does not exist"
            )));
        }

        Ok(())
    }

    async fn save_field(&self, tenant_id: TenantId, field: FieldDefinition) -> AppResult<()> {
        let mut fields = self.fields.write().await;
        let existing = fields.iter().position(|(stored_tenant_id, stored)| {
            stored_tenant_id == &tenant_id && stored.id() == field.id()
        });

        match existing {
            Some(position) => fields[position] = (tenant_id, field),
            None => fields.push((tenant_id, field)),
        }

        Ok(())
    }

    async fn list_fields(
        &self,
        tenant_id: TenantId,
        item_id: ItemId,
    ) -> AppResult<Vec<FieldDefinition>> {
        Ok(self
            .fields
            .read()
            .await
            .iter()
            .filter_map(|(stored_tenant_id, field)| {
                (stored_tenant_id == &tenant_id && field.item_id() == item_id)
                    .then(|| field.clone())
            })
            .collect())
    }

    async fn list_questionnaire_fields(
        &self,
        tenant_id: TenantId,
        questionnaire_id: QuestionnaireId,
    ) -> AppResult<Vec<FieldDefinition>> {
        let owned_items: Vec<ItemId> = self
            .list_items(tenant_id, questionnaire_id)
            .await?
            .iter()
            .map(Item::id)
            .collect();

        Ok(self
            .fields
            .read()
            .await
            .iter()
            .filter_map(|(stored_tenant_id, field)| {
                (stored_tenant_id == &tenant_id && owned_items.contains(&field.item_id()))
                    .then(|| field.clone())
            })
            .collect())
    }

    async fn find_field(
        &self,
        tenant_id: TenantId,
        field_id: FieldId,
    ) -> AppResult<Option<FieldDefinition>> {
        Ok(self
            .fields
            .read()
            .await
            .iter()
            .find_map(|(stored_tenant_id, field)| {
                (stored_tenant_id == &tenant_id && field.id() == field_id)
                    .then(|| field.clone())
            }))
    }

    async fn delete_field(&self, tenant_id: TenantId, field_id: FieldId) -> AppResult<()> {
        let mut fields = self.fields.write().await;
        let before = fields.len();
        fields.retain(|(stored_tenant_id, field)| {
            !(stored_tenant_id == &tenant_id && field.id() == field_id)
        });

        if fields.len() == before {
            return Err(AppError::NotFound(format!(
                "field '{field_id}' does not exist"
            )));
        }

        Ok(())
    }

    async fn save_response(&self, tenant_id: TenantId, response: ResponseRecord) -> AppResult<()> {
        self.responses
            .write()
            .await
            .insert((tenant_id, response.id()), response);
        Ok(())
    }

    async fn list_responses(
        &self,
        tenant_id: TenantId,
        questionnaire_id: QuestionnaireId,
        application_id: ApplicationId,
    ) -> AppResult<Vec<ResponseRecord>> {
        let responses = self.responses.read().await;
        let mut listed: Vec<ResponseRecord> = responses
            .iter()
            .filter_map(|((stored_tenant_id, _), response)| {
                (stored_tenant_id == &tenant_id
                    && response.questionnaire_id() == questionnaire_id
                    && response.application_id() == application_id)
                    .then(|| response.clone())
            })
            .collect();
        listed.sort_by(|left, right| left.id().cmp(&right.id()));

        Ok(listed)
    }

    async fn find_response(
        &self,
        tenant_id: TenantId,
        response_id: ResponseId,
    ) -> AppResult<Option<ResponseRecord>> {
        Ok(self
            .responses
            .read()
            .await
            .get(&(tenant_id, response_id))
            .cloned())
    }

    async fn save_attachment(
        &self,
        tenant_id: TenantId,
        attachment: AttachmentRecord,
    ) -> AppResult<()> {
        self.attachments.write().await.push((tenant_id, attachment));
        Ok(())
    }

    async fn list_attachments(
        &self,
        tenant_id: TenantId,
        response_id: ResponseId,
    ) -> AppResult<Vec<AttachmentRecord>> {
        Ok(self
            .attachments
            .read()
            .await
            .iter()
            .filter_map(|(stored_tenant_id, attachment)| {
                (stored_tenant_id == &tenant_id && attachment.response_id() == response_id)
                    .then(|| attachment.clone())
            })
            .collect())
    }
}
