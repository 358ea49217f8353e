use std::sync::Arc;

use quillform_core::{AppError, AppResult, FieldId, ItemId, QuestionnaireId, TenantId};
use quillform_domain::{
    FieldDefinition, FieldTypeRegistry, Item, MoveDirection, MoveOutcome, OutlineEntry,
    OutlineTree, QuestionnaireDefinition, RenderMode, RenderedControl, apply_move,
    normalize_options,
};

use crate::questionnaire_ports::{
    FieldPatch, ItemPatch, NewItemInput, ParentChange, QuestionnaireRepository, SaveFieldInput,
};

/// A questionnaire definition with its items in outline order.
#[derive(Debug, Clone)]
pub struct QuestionnaireOverview {
    /// The questionnaire definition.
    pub questionnaire: QuestionnaireDefinition,
    /// Items ordered by depth-first outline traversal.
    pub items: Vec<Item>,
    /// Flattened outline entries matching `items`.
    pub outline: Vec<OutlineEntry>,
}

/// Author-facing mutation surface over the outline tree and field registry.
#[derive(Clone)]
pub struct BuilderService {
    repository: Arc<dyn QuestionnaireRepository>,
    registry: Arc<FieldTypeRegistry>,
}

impl BuilderService {
    /// Creates a builder service from a repository implementation.
    #[must_use]
    pub fn new(repository: Arc<dyn QuestionnaireRepository>) -> Self {
        Self {
            repository,
            registry: Arc::new(FieldTypeRegistry::new()),
        }
    }

    /// Creates a new questionnaire definition.
    pub async fn create_questionnaire(
        &self,
        tenant_id: TenantId,
        name: impl Into<String>,
        description: Option<String>,
    ) -> AppResult<QuestionnaireDefinition> {
        let questionnaire =
            QuestionnaireDefinition::new(QuestionnaireId::new(), name, description)?;
        self.repository
            .save_questionnaire(tenant_id, questionnaire.clone())
            .await?;

        Ok(questionnaire)
    }

    /// Returns a questionnaire with its items in outline order.
    pub async fn get_questionnaire(
        &self,
        tenant_id: TenantId,
        questionnaire_id: QuestionnaireId,
    ) -> AppResult<QuestionnaireOverview> {
        let questionnaire = self
            .require_questionnaire(tenant_id, questionnaire_id)
            .await?;
        let items = self
            .repository
            .list_items(tenant_id, questionnaire_id)
            .await?;

        let outline = OutlineTree::build(&items)?.flatten();
        let ordered_items = order_by_outline(items, &outline);

        Ok(QuestionnaireOverview {
            questionnaire,
            items: ordered_items,
            outline,
        })
    }

    /// Appends a new item as the last child of the target parent.
    ///
    /// Sibling sort values are re-sequenced from zero before the append, so
    /// sort values stay dense no matter how many inserts happen.
    pub async fn add_item(
        &self,
        tenant_id: TenantId,
        questionnaire_id: QuestionnaireId,
        input: NewItemInput,
    ) -> AppResult<Item> {
        self.require_questionnaire(tenant_id, questionnaire_id)
            .await?;
        let items = self
            .repository
            .list_items(tenant_id, questionnaire_id)
            .await?;

        if let Some(parent_id) = input.parent_id
            && !items.iter().any(|item| item.id() == parent_id)
        {
            return Err(AppError::NotFound(format!(
                "parent item '{parent_id}' does not exist in questionnaire '{questionnaire_id}'"
            )));
        }

        let mut siblings: Vec<&Item> = items
            .iter()
            .filter(|item| item.parent_id() == input.parent_id)
            .collect();
        siblings.sort_by_key(|item| (item.sort(), item.id()));

        for (position, sibling) in siblings.iter().enumerate() {
            if sibling.sort() != position as i64 {
                let mut resequenced = (*sibling).clone();
                resequenced.set_sort(position as i64);
                self.repository.save_item(tenant_id, resequenced).await?;
            }
        }

        let title = input
            .title
            .filter(|title| !title.trim().is_empty())
            .unwrap_or_else(|| input.item_type.default_title().to_owned());

        let item = Item::new(
            ItemId::new(),
            questionnaire_id,
            input.parent_id,
            input.item_type,
            title,
            input.help,
            siblings.len() as i64,
            input.required,
            input.visible_when,
        )?;
        self.repository.save_item(tenant_id, item.clone()).await?;

        Ok(item)
    }

    /// Applies a partial update to an item.
    ///
    /// A reparent is validated against the full tree before anything is
    /// persisted: the new parent must exist in the same questionnaire and the
    /// change must not close a cycle.
    pub async fn patch_item(
        &self,
        tenant_id: TenantId,
        item_id: ItemId,
        patch: ItemPatch,
    ) -> AppResult<Item> {
        let mut item = self.require_item(tenant_id, item_id).await?;

        if let Some(title) = patch.title {
            item.rename(title)?;
        }
        if let Some(help) = patch.help {
            item.set_help(Some(help));
        }
        if let Some(required) = patch.required {
            item.set_required(required);
        }
        if let Some(sort) = patch.sort {
            item.set_sort(sort);
        }
        if let Some(visible_when) = patch.visible_when {
            item.set_visible_when((!visible_when.is_null()).then_some(visible_when));
        }

        if let Some(parent_change) = patch.parent_id {
            let items = self
                .repository
                .list_items(tenant_id, item.questionnaire_id())
                .await?;

            let new_parent = match parent_change {
                ParentChange::Root => None,
                ParentChange::To(parent_id) => {
                    if !items.iter().any(|existing| existing.id() == parent_id) {
                        return Err(AppError::NotFound(format!(
                            "parent item '{parent_id}' does not exist in questionnaire '{}'",
                            item.questionnaire_id()
                        )));
                    }
                    Some(parent_id)
                }
            };
            item.set_parent(new_parent)?;

            // Depth is recomputed for the whole subtree on the next build;
            // here the patched tree only has to prove itself acyclic.
            let mut patched: Vec<Item> = items
                .into_iter()
                .filter(|existing| existing.id() != item_id)
                .collect();
            patched.push(item.clone());
            OutlineTree::build(&patched)?;
        }

        self.repository.save_item(tenant_id, item.clone()).await?;

        Ok(item)
    }

    /// Deletes an item, reparenting its children to the former parent.
    ///
    /// Children are never orphaned silently; the item's fields are removed
    /// with it.
    pub async fn delete_item(&self, tenant_id: TenantId, item_id: ItemId) -> AppResult<()> {
        let item = self.require_item(tenant_id, item_id).await?;
        let items = self
            .repository
            .list_items(tenant_id, item.questionnaire_id())
            .await?;

        for mut child in items {
            if child.parent_id() == Some(item_id) {
                child.set_parent(item.parent_id())?;
                self.repository.save_item(tenant_id, child).await?;
            }
        }

        for field in self.repository.list_fields(tenant_id, item_id).await? {
            self.repository.delete_field(tenant_id, field.id()).await?;
        }

        self.repository.delete_item(tenant_id, item_id).await
    }

    /// Moves an item within the outline tree.
    ///
    /// Boundary moves return [`MoveOutcome::Boundary`] and persist nothing.
    pub async fn move_item(
        &self,
        tenant_id: TenantId,
        item_id: ItemId,
        direction: MoveDirection,
    ) -> AppResult<MoveOutcome> {
        let item = self.require_item(tenant_id, item_id).await?;
        let mut items = self
            .repository
            .list_items(tenant_id, item.questionnaire_id())
            .await?;
        let before = items.clone();

        let outcome = apply_move(&mut items, item_id, direction)?;
        if outcome == MoveOutcome::Boundary {
            return Ok(outcome);
        }

        for moved in items {
            let unchanged = before
                .iter()
                .any(|original| *original == moved);
            if !unchanged {
                self.repository.save_item(tenant_id, moved).await?;
            }
        }

        Ok(outcome)
    }

    /// Attaches a new field to a question item.
    ///
    /// Dropping a field affordance onto a header is rejected; headers cannot
    /// own fields.
    pub async fn add_field(
        &self,
        tenant_id: TenantId,
        item_id: ItemId,
        input: SaveFieldInput,
    ) -> AppResult<FieldDefinition> {
        let item = self.require_item(tenant_id, item_id).await?;
        if !item.is_question() {
            return Err(AppError::Validation(format!(
                "cannot attach a field to header item '{item_id}'"
            )));
        }

        let options = input
            .options
            .as_ref()
            .map(normalize_options)
            .unwrap_or_default();

        let field = FieldDefinition::new(
            FieldId::new(),
            item_id,
            input.ui_type,
            input.label,
            input.placeholder,
            input.default_value,
            input.min_value,
            input.max_value,
            input.step_value,
            options,
            input.help,
        )?;
        self.repository.save_field(tenant_id, field.clone()).await?;

        Ok(field)
    }

    /// Applies a partial update to a field.
    pub async fn patch_field(
        &self,
        tenant_id: TenantId,
        field_id: FieldId,
        patch: FieldPatch,
    ) -> AppResult<FieldDefinition> {
        let field = self.require_field(tenant_id, field_id).await?;

        let options = match patch.options.as_ref() {
            Some(raw) => normalize_options(raw),
            None => field.options().to_vec(),
        };

        let updated = FieldDefinition::new(
            field.id(),
            field.item_id(),
            field.ui_type(),
            patch.label.or_else(|| field.label().map(str::to_owned)),
            patch
                .placeholder
                .or_else(|| field.placeholder().map(str::to_owned)),
            patch
                .default_value
                .or_else(|| field.default_value().map(str::to_owned)),
            patch.min_value.or(field.min_value()),
            patch.max_value.or(field.max_value()),
            patch.step_value.or(field.step_value()),
            options,
            patch.help.or_else(|| field.help().map(str::to_owned)),
        )?;
        self.repository
            .save_field(tenant_id, updated.clone())
            .await?;

        Ok(updated)
    }

    /// Removes a field from its question item.
    pub async fn delete_field(&self, tenant_id: TenantId, field_id: FieldId) -> AppResult<()> {
        self.require_field(tenant_id, field_id).await?;
        self.repository.delete_field(tenant_id, field_id).await
    }

    /// Lists the fields of a question item in insertion order.
    pub async fn list_fields(
        &self,
        tenant_id: TenantId,
        item_id: ItemId,
    ) -> AppResult<Vec<FieldDefinition>> {
        self.require_item(tenant_id, item_id).await?;
        self.repository.list_fields(tenant_id, item_id).await
    }

    /// Renders the builder's disabled preview for a field.
    pub async fn preview_field(
        &self,
        tenant_id: TenantId,
        field_id: FieldId,
    ) -> AppResult<RenderedControl> {
        let field = self.require_field(tenant_id, field_id).await?;
        let item = self.require_item(tenant_id, field.item_id()).await?;

        Ok(self.registry.render(
            &field,
            item.title().as_str(),
            RenderMode::DisabledPreview,
            None,
        ))
    }

    async fn require_questionnaire(
        &self,
        tenant_id: TenantId,
        questionnaire_id: QuestionnaireId,
    ) -> AppResult<QuestionnaireDefinition> {
        self.repository
            .find_questionnaire(tenant_id, questionnaire_id)
            .await?
            .ok_or_else(|| {
                AppError::NotFound(format!(
                    "questionnaire '{questionnaire_id}' does not exist for tenant '{tenant_id}'"
                ))
            })
    }

    async fn require_item(&self, tenant_id: TenantId, item_id: ItemId) -> AppResult<Item> {
        self.repository
            .find_item(tenant_id, item_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("item '{item_id}' does not exist")))
    }

    async fn require_field(
        &self,
        tenant_id: TenantId,
        field_id: FieldId,
    ) -> AppResult<FieldDefinition> {
        self.repository
            .find_field(tenant_id, field_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("field '{field_id}' does not exist")))
    }
}

pub(crate) fn order_by_outline(items: Vec<Item>, outline: &[OutlineEntry]) -> Vec<Item> {
    let mut remaining = items;
    let mut ordered = Vec::with_capacity(remaining.len());
    for entry in outline {
        if let Some(position) = remaining.iter().position(|item| item.id() == entry.item_id()) {
            ordered.push(remaining.swap_remove(position));
        }
    }

    ordered
}
