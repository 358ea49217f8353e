use async_trait::async_trait;
use quillform_core::{
    AppResult, ApplicationId, FieldId, ItemId, QuestionnaireId, ResponseId, TenantId,
};
use quillform_domain::{
    AttachmentRecord, FieldDefinition, Item, QuestionnaireDefinition, ResponseRecord,
};

/// Persistence port for the questionnaire graph.
///
/// The hosting application supplies the durable implementation; this crate
/// ships only the in-memory adapter. Every operation is partitioned by
/// [`TenantId`]; tenancy enforcement beyond key scoping is a host concern.
#[async_trait]
pub trait QuestionnaireRepository: Send + Sync {
    /// Saves a new questionnaire definition.
    async fn save_questionnaire(
        &self,
        tenant_id: TenantId,
        questionnaire: QuestionnaireDefinition,
    ) -> AppResult<()>;

    /// Looks up a questionnaire definition.
    async fn find_questionnaire(
        &self,
        tenant_id: TenantId,
        questionnaire_id: QuestionnaireId,
    ) -> AppResult<Option<QuestionnaireDefinition>>;

    /// Lists all questionnaire definitions.
    async fn list_questionnaires(
        &self,
        tenant_id: TenantId,
    ) -> AppResult<Vec<QuestionnaireDefinition>>;

    /// Saves or updates an outline item.
    async fn save_item(&self, tenant_id: TenantId, item: Item) -> AppResult<()>;

    /// Lists all items of a questionnaire, unordered.
    async fn list_items(
        &self,
        tenant_id: TenantId,
        questionnaire_id: QuestionnaireId,
    ) -> AppResult<Vec<Item>>;

    /// Looks up a single item.
    async fn find_item(&self, tenant_id: TenantId, item_id: ItemId) -> AppResult<Option<Item>>;

    /// Deletes an item. Fields and reparenting of children are handled by the
    /// calling service, not here.
    async fn delete_item(&self, tenant_id: TenantId, item_id: ItemId) -> AppResult<()>;

    /// Saves or updates a field definition.
    async fn save_field(&self, tenant_id: TenantId, field: FieldDefinition) -> AppResult<()>;

    /// Lists the fields of one question item in insertion order.
    ///
    /// Insertion order is the display contract; there is no field-level sort
    /// column.
    async fn list_fields(
        &self,
        tenant_id: TenantId,
        item_id: ItemId,
    ) -> AppResult<Vec<FieldDefinition>>;

    /// Lists every field of a questionnaire, grouped by item in insertion
    /// order.
    async fn list_questionnaire_fields(
        &self,
        tenant_id: TenantId,
        questionnaire_id: QuestionnaireId,
    ) -> AppResult<Vec<FieldDefinition>>;

    /// Looks up a single field.
    async fn find_field(
        &self,
        tenant_id: TenantId,
        field_id: FieldId,
    ) -> AppResult<Option<FieldDefinition>>;

    /// Deletes a field definition.
    async fn delete_field(&self, tenant_id: TenantId, field_id: FieldId) -> AppResult<()>;

    /// Saves or updates a response version.
    async fn save_response(&self, tenant_id: TenantId, response: ResponseRecord) -> AppResult<()>;

    /// Lists response versions for a questionnaire and application, unordered.
    async fn list_responses(
        &self,
        tenant_id: TenantId,
        questionnaire_id: QuestionnaireId,
        application_id: ApplicationId,
    ) -> AppResult<Vec<ResponseRecord>>;

    /// Looks up a single response version.
    async fn find_response(
        &self,
        tenant_id: TenantId,
        response_id: ResponseId,
    ) -> AppResult<Option<ResponseRecord>>;

    /// Saves an attachment reference.
    async fn save_attachment(
        &self,
        tenant_id: TenantId,
        attachment: AttachmentRecord,
    ) -> AppResult<()>;

    /// Lists attachment references of a response.
    async fn list_attachments(
        &self,
        tenant_id: TenantId,
        response_id: ResponseId,
    ) -> AppResult<Vec<AttachmentRecord>>;
}
