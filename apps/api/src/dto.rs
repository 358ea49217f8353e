//! Transport types for the JSON API.

mod builder;
mod responses;
mod runtime;

pub use builder::{
    CreateFieldRequest, CreateItemRequest, CreateQuestionnaireRequest, FieldOptionDto,
    FieldResponse, ItemResponse, MoveItemRequest, MoveItemResponse, QuestionnaireOverviewResponse,
    QuestionnaireResponse, UpdateFieldRequest, UpdateItemRequest,
};
pub use responses::{
    CloneAnswersRequest, CloneOutcomeResponse, CreateResponseRequest, ResponseSummaryResponse,
};
pub use runtime::{
    AnswerDto, ResponseDetailResponse, RuntimePayloadResponse, SaveAnswerEntry, SaveAnswersRequest,
};
