use quillform_application::QuestionnaireOverview;
use quillform_domain::{FieldDefinition, FieldOption, Item, OutlineEntry, QuestionnaireDefinition};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use ts_rs::TS;

/// Incoming payload for questionnaire creation.
#[derive(Debug, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/create-questionnaire-request.ts"
)]
pub struct CreateQuestionnaireRequest {
    pub name: String,
    pub description: Option<String>,
}

/// API representation of a questionnaire definition.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/questionnaire-response.ts"
)]
pub struct QuestionnaireResponse {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
}

impl From<QuestionnaireDefinition> for QuestionnaireResponse {
    fn from(value: QuestionnaireDefinition) -> Self {
        Self {
            id: value.id().to_string(),
            name: value.name().as_str().to_owned(),
            description: value.description().map(str::to_owned),
        }
    }
}

/// API representation of an outline item.
///
/// `outline` and `depth` are present when the item is returned as part of a
/// built tree; they are display caches, never authoritative.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/item-response.ts"
)]
pub struct ItemResponse {
    pub id: String,
    pub questionnaire_id: String,
    pub parent_id: Option<String>,
    pub item_type: String,
    pub title: String,
    pub help: Option<String>,
    pub sort: i64,
    pub required: bool,
    #[ts(type = "unknown | null")]
    pub visible_when: Option<Value>,
    pub outline: Option<String>,
    pub depth: Option<u32>,
}

impl From<Item> for ItemResponse {
    fn from(value: Item) -> Self {
        Self {
            id: value.id().to_string(),
            questionnaire_id: value.questionnaire_id().to_string(),
            parent_id: value.parent_id().map(|parent_id| parent_id.to_string()),
            item_type: value.item_type().as_str().to_owned(),
            title: value.title().as_str().to_owned(),
            help: value.help().map(str::to_owned),
            sort: value.sort(),
            required: value.required(),
            visible_when: value.visible_when().cloned(),
            outline: None,
            depth: None,
        }
    }
}

impl ItemResponse {
    pub(crate) fn with_outline(item: Item, entry: &OutlineEntry) -> Self {
        let mut response = Self::from(item);
        response.outline = Some(entry.outline().to_owned());
        response.depth = Some(entry.depth() as u32);
        response
    }
}

/// Questionnaire plus its items in outline order.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/questionnaire-overview-response.ts"
)]
pub struct QuestionnaireOverviewResponse {
    pub questionnaire: QuestionnaireResponse,
    pub items: Vec<ItemResponse>,
}

impl From<QuestionnaireOverview> for QuestionnaireOverviewResponse {
    fn from(value: QuestionnaireOverview) -> Self {
        let items = value
            .items
            .into_iter()
            .zip(value.outline.iter())
            .map(|(item, entry)| ItemResponse::with_outline(item, entry))
            .collect();

        Self {
            questionnaire: QuestionnaireResponse::from(value.questionnaire),
            items,
        }
    }
}

/// Incoming payload for item creation.
#[derive(Debug, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/create-item-request.ts"
)]
pub struct CreateItemRequest {
    pub parent_id: Option<String>,
    pub item_type: String,
    pub title: Option<String>,
    pub help: Option<String>,
    pub required: Option<bool>,
    #[ts(type = "unknown | null")]
    pub visible_when: Option<Value>,
}

/// Incoming payload for item updates; absent fields stay unchanged.
///
/// `parent_id` accepts an item id or the empty string for "promote to root";
/// a blank `help` clears the help text.
#[derive(Debug, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/update-item-request.ts"
)]
pub struct UpdateItemRequest {
    pub title: Option<String>,
    pub help: Option<String>,
    pub required: Option<bool>,
    pub parent_id: Option<String>,
    pub sort: Option<i64>,
    #[ts(type = "unknown | null")]
    pub visible_when: Option<Value>,
}

/// Incoming payload for a move operation.
#[derive(Debug, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/move-item-request.ts"
)]
pub struct MoveItemRequest {
    pub direction: String,
}

/// Result of a move operation; boundary moves report `moved: false`.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/move-item-response.ts"
)]
pub struct MoveItemResponse {
    pub moved: bool,
}

/// API transport representation of one field option.
#[derive(Debug, Serialize, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/field-option-dto.ts"
)]
pub struct FieldOptionDto {
    pub label: String,
    pub value: String,
}

impl From<&FieldOption> for FieldOptionDto {
    fn from(value: &FieldOption) -> Self {
        Self {
            label: value.label().to_owned(),
            value: value.value().to_owned(),
        }
    }
}

/// Incoming payload for field creation.
#[derive(Debug, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/create-field-request.ts"
)]
pub struct CreateFieldRequest {
    pub ui_type: String,
    pub label: Option<String>,
    pub placeholder: Option<String>,
    pub default_value: Option<String>,
    pub min_value: Option<f64>,
    pub max_value: Option<f64>,
    pub step_value: Option<f64>,
    #[ts(type = "unknown | null")]
    pub options: Option<Value>,
    pub help: Option<String>,
}

/// Incoming payload for field updates; absent fields stay unchanged.
#[derive(Debug, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/update-field-request.ts"
)]
pub struct UpdateFieldRequest {
    pub label: Option<String>,
    pub placeholder: Option<String>,
    pub default_value: Option<String>,
    pub min_value: Option<f64>,
    pub max_value: Option<f64>,
    pub step_value: Option<f64>,
    #[ts(type = "unknown | null")]
    pub options: Option<Value>,
    pub help: Option<String>,
}

/// API representation of a field definition.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/field-response.ts"
)]
pub struct FieldResponse {
    pub id: String,
    pub item_id: String,
    pub ui_type: String,
    pub label: Option<String>,
    pub placeholder: Option<String>,
    pub default_value: Option<String>,
    pub min_value: Option<f64>,
    pub max_value: Option<f64>,
    pub step_value: Option<f64>,
    pub options: Vec<FieldOptionDto>,
    pub help: Option<String>,
}

impl From<FieldDefinition> for FieldResponse {
    fn from(value: FieldDefinition) -> Self {
        Self {
            id: value.id().to_string(),
            item_id: value.item_id().to_string(),
            ui_type: value.ui_type().as_str().to_owned(),
            label: value.label().map(str::to_owned),
            placeholder: value.placeholder().map(str::to_owned),
            default_value: value.default_value().map(str::to_owned),
            min_value: value.min_value(),
            max_value: value.max_value(),
            step_value: value.step_value(),
            options: value.options().iter().map(FieldOptionDto::from).collect(),
            help: value.help().map(str::to_owned),
        }
    }
}
