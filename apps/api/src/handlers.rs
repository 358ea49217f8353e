//! HTTP handlers for the questionnaire API.

pub mod fields;
pub mod health;
pub mod items;
pub mod questionnaires;
pub mod responses;
pub mod runtime;
