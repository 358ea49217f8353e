//! Domain entities and invariants for the questionnaire core.

#![forbid(unsafe_code)]

mod answer_state;
mod field;
mod outline;
mod questionnaire;
mod response;

pub use answer_state::{AnswerKey, AnswerState, OutgoingAnswer, is_empty_value};
pub use field::{
    ControlKind, FieldDefinition, FieldOption, FieldTypeRegistry, FieldTypeSpec, RenderMode,
    RenderedControl, UiType, ValueShape, normalize_options,
};
pub use outline::{
    MoveDirection, MoveOutcome, OutlineEntry, OutlineNode, OutlineTree, apply_move,
};
pub use questionnaire::{Item, ItemType, QuestionnaireDefinition};
pub use response::{AnswerRecord, AttachmentRecord, ResponseRecord, ResponseStatus};
