//! Application services and ports for the questionnaire core.

#![forbid(unsafe_code)]

mod builder_service;
mod questionnaire_ports;
mod runner_service;
mod version_service;

#[cfg(test)]
mod test_support;

pub use builder_service::{BuilderService, QuestionnaireOverview};
pub use questionnaire_ports::{
    CloneOutcome, CreateResponseInput, FieldPatch, ItemPatch, NewItemInput, ParentChange,
    QuestionnaireRepository, RuntimeContextKey, SaveFieldInput,
};
pub use runner_service::{LoadTicket, RunnerService, RunnerSession, RuntimePayload};
pub use version_service::VersionService;
