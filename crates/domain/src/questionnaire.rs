use std::str::FromStr;

use quillform_core::{AppError, AppResult, ItemId, NonEmptyString, QuestionnaireId};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A named questionnaire definition owning a tree of items.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuestionnaireDefinition {
    id: QuestionnaireId,
    name: NonEmptyString,
    description: Option<String>,
}

impl QuestionnaireDefinition {
    /// Creates a validated questionnaire definition.
    pub fn new(
        id: QuestionnaireId,
        name: impl Into<String>,
        description: Option<String>,
    ) -> AppResult<Self> {
        Ok(Self {
            id,
            name: NonEmptyString::new(name)?,
            description: normalize_optional_text(description),
        })
    }

    /// Returns the questionnaire identifier.
    #[must_use]
    pub fn id(&self) -> QuestionnaireId {
        self.id
    }

    /// Returns the display name.
    #[must_use]
    pub fn name(&self) -> &NonEmptyString {
        &self.name
    }

    /// Returns the optional description.
    #[must_use]
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }
}

/// Kind of node in the questionnaire outline tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemType {
    /// Organizational node; cannot own fields or answers of its own.
    Header,
    /// Answerable node; owns zero or more fields.
    Question,
}

impl ItemType {
    /// Returns a stable storage value for the item type.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Header => "header",
            Self::Question => "question",
        }
    }

    /// Returns the title given to a freshly dropped node of this type.
    #[must_use]
    pub fn default_title(&self) -> &'static str {
        match self {
            Self::Header => "New section",
            Self::Question => "New question",
        }
    }
}

impl FromStr for ItemType {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "header" => Ok(Self::Header),
            "question" => Ok(Self::Question),
            _ => Err(AppError::Validation(format!("unknown item type '{value}'"))),
        }
    }
}

/// One node of the questionnaire outline (header or question).
///
/// The tree is stored flat: each item carries a nullable parent reference and a
/// sibling sort value. Hierarchy, depth, and outline numbers are derived by
/// [`crate::OutlineTree`]; nothing here is a back-pointer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    id: ItemId,
    questionnaire_id: QuestionnaireId,
    parent_id: Option<ItemId>,
    item_type: ItemType,
    title: NonEmptyString,
    help: Option<String>,
    sort: i64,
    required: bool,
    visible_when: Option<Value>,
}

impl Item {
    /// Creates a validated outline item.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        id: ItemId,
        questionnaire_id: QuestionnaireId,
        parent_id: Option<ItemId>,
        item_type: ItemType,
        title: impl Into<String>,
        help: Option<String>,
        sort: i64,
        required: bool,
        visible_when: Option<Value>,
    ) -> AppResult<Self> {
        if parent_id == Some(id) {
            return Err(AppError::Validation(
                "item cannot be its own parent".to_owned(),
            ));
        }

        Ok(Self {
            id,
            questionnaire_id,
            parent_id,
            item_type,
            title: NonEmptyString::new(title)?,
            help: normalize_optional_text(help),
            sort,
            required,
            visible_when,
        })
    }

    /// Returns the item identifier.
    #[must_use]
    pub fn id(&self) -> ItemId {
        self.id
    }

    /// Returns the owning questionnaire identifier.
    #[must_use]
    pub fn questionnaire_id(&self) -> QuestionnaireId {
        self.questionnaire_id
    }

    /// Returns the parent item, or `None` for a root node.
    #[must_use]
    pub fn parent_id(&self) -> Option<ItemId> {
        self.parent_id
    }

    /// Returns the item type.
    #[must_use]
    pub fn item_type(&self) -> ItemType {
        self.item_type
    }

    /// Returns whether this item can own fields and answers.
    #[must_use]
    pub fn is_question(&self) -> bool {
        self.item_type == ItemType::Question
    }

    /// Returns the display title.
    #[must_use]
    pub fn title(&self) -> &NonEmptyString {
        &self.title
    }

    /// Returns the optional rich-text help.
    #[must_use]
    pub fn help(&self) -> Option<&str> {
        self.help.as_deref()
    }

    /// Returns the sibling sort value.
    #[must_use]
    pub fn sort(&self) -> i64 {
        self.sort
    }

    /// Returns whether an answer is required for this question.
    #[must_use]
    pub fn required(&self) -> bool {
        self.required
    }

    /// Returns the opaque conditional-visibility expression, if any.
    #[must_use]
    pub fn visible_when(&self) -> Option<&Value> {
        self.visible_when.as_ref()
    }

    /// Renames the item.
    pub fn rename(&mut self, title: impl Into<String>) -> AppResult<()> {
        self.title = NonEmptyString::new(title)?;
        Ok(())
    }

    /// Replaces the help text; empty input clears it.
    pub fn set_help(&mut self, help: Option<String>) {
        self.help = normalize_optional_text(help);
    }

    /// Sets the required flag.
    pub fn set_required(&mut self, required: bool) {
        self.required = required;
    }

    /// Moves the item under a new parent.
    ///
    /// Tree-level validity (existing parent, no cycle) is the caller's
    /// responsibility; only self-parenting is rejected here.
    pub fn set_parent(&mut self, parent_id: Option<ItemId>) -> AppResult<()> {
        if parent_id == Some(self.id) {
            return Err(AppError::Validation(
                "item cannot be its own parent".to_owned(),
            ));
        }

        self.parent_id = parent_id;
        Ok(())
    }

    /// Sets the sibling sort value.
    pub fn set_sort(&mut self, sort: i64) {
        self.sort = sort;
    }

    /// Replaces the conditional-visibility expression.
    pub fn set_visible_when(&mut self, visible_when: Option<Value>) {
        self.visible_when = visible_when;
    }
}

fn normalize_optional_text(value: Option<String>) -> Option<String> {
    value.and_then(|text| {
        let trimmed = text.trim().to_owned();
        (!trimmed.is_empty()).then_some(trimmed)
    })
}
