//! Infrastructure adapters for the questionnaire application ports.

#![forbid(unsafe_code)]

mod in_memory_questionnaire_repository;

pub use in_memory_questionnaire_repository::InMemoryQuestionnaireRepository;
