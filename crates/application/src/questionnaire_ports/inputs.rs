use quillform_core::{ApplicationId, ItemId, QuestionnaireId, ResponseId};
use quillform_domain::{ItemType, UiType};
use serde_json::Value;

/// Input for appending a new outline item.
#[derive(Debug, Clone)]
pub struct NewItemInput {
    /// Parent to append under; `None` appends a new root.
    pub parent_id: Option<ItemId>,
    /// Header or question.
    pub item_type: ItemType,
    /// Display title; blank input falls back to the type's default title.
    pub title: Option<String>,
    /// Optional rich-text help.
    pub help: Option<String>,
    /// Whether an answer is required.
    pub required: bool,
    /// Opaque conditional-visibility expression.
    pub visible_when: Option<Value>,
}

/// Target of a reparent operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParentChange {
    /// Promote the item to a root node.
    Root,
    /// Move the item under the given parent.
    To(ItemId),
}

/// Partial update for an outline item; `None` fields stay unchanged.
///
/// `help` follows the empty-clears convention: a blank string removes the
/// help text. `visible_when` is replaced wholesale when present; JSON null
/// clears it.
#[derive(Debug, Clone, Default)]
pub struct ItemPatch {
    /// New title.
    pub title: Option<String>,
    /// New help text; blank clears.
    pub help: Option<String>,
    /// New required flag.
    pub required: Option<bool>,
    /// Reparent request.
    pub parent_id: Option<ParentChange>,
    /// New sibling sort value.
    pub sort: Option<i64>,
    /// New conditional-visibility expression; null clears.
    pub visible_when: Option<Value>,
}

/// Input for attaching a field to a question item.
#[derive(Debug, Clone)]
pub struct SaveFieldInput {
    /// Rendering/editing behavior tag.
    pub ui_type: UiType,
    /// Display label.
    pub label: Option<String>,
    /// Placeholder text.
    pub placeholder: Option<String>,
    /// Default value shown in previews.
    pub default_value: Option<String>,
    /// Lower bound for range types.
    pub min_value: Option<f64>,
    /// Upper bound for range types.
    pub max_value: Option<f64>,
    /// Step for range types.
    pub step_value: Option<f64>,
    /// Raw options payload; normalized on save.
    pub options: Option<Value>,
    /// Help text.
    pub help: Option<String>,
}

/// Partial update for a field; `None` fields stay unchanged.
///
/// String fields follow the empty-clears convention. Numeric bounds are
/// set-only; the options list is renormalized wholesale when present (an
/// empty array clears it). The ui type is immutable after creation.
#[derive(Debug, Clone, Default)]
pub struct FieldPatch {
    /// New label; blank clears.
    pub label: Option<String>,
    /// New placeholder; blank clears.
    pub placeholder: Option<String>,
    /// New default value; blank clears.
    pub default_value: Option<String>,
    /// New lower bound.
    pub min_value: Option<f64>,
    /// New upper bound.
    pub max_value: Option<f64>,
    /// New step.
    pub step_value: Option<f64>,
    /// Raw replacement options payload.
    pub options: Option<Value>,
    /// New help text; blank clears.
    pub help: Option<String>,
}

/// Input for creating a response version.
#[derive(Debug, Clone, Copy, Default)]
pub struct CreateResponseInput {
    /// Source response whose answers and attachments are copied in.
    pub clone_from: Option<ResponseId>,
}

/// Context key the runner loads a payload for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuntimeContextKey {
    /// Application (configuration item) context; the runner selects or
    /// creates the default response version.
    Application {
        /// Questionnaire being answered.
        questionnaire_id: QuestionnaireId,
        /// Application the answers are scoped to.
        application_id: ApplicationId,
    },
    /// Explicit response version.
    Response(ResponseId),
}

/// Counts reported back from a cross-application answer clone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CloneOutcome {
    /// Answers copied into the target response.
    pub answers_copied: usize,
    /// Attachment references copied into the target response.
    pub attachments_copied: usize,
}
