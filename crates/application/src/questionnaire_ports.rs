//! Ports and input types for the questionnaire services.

mod inputs;
mod repository;

pub use inputs::{
    CloneOutcome, CreateResponseInput, FieldPatch, ItemPatch, NewItemInput, ParentChange,
    RuntimeContextKey, SaveFieldInput,
};
pub use repository::QuestionnaireRepository;
