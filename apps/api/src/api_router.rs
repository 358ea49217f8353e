use axum::Router;
use axum::http::header::CONTENT_TYPE;
use axum::http::{HeaderValue, Method};
use axum::routing::{get, patch, post};
use quillform_core::AppError;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::state::AppState;

/// Builds the API router with CORS and request tracing.
pub fn build(state: AppState, frontend_url: &str) -> Result<Router, AppError> {
    let cors_layer = CorsLayer::new()
        .allow_origin(
            HeaderValue::from_str(frontend_url)
                .map_err(|error| AppError::Internal(format!("invalid FRONTEND_URL: {error}")))?,
        )
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([CONTENT_TYPE]);

    let router = Router::new()
        .route("/health", get(handlers::health::health_handler))
        .route(
            "/api/questionnaires",
            post(handlers::questionnaires::create_questionnaire_handler),
        )
        .route(
            "/api/questionnaires/{questionnaire_id}",
            get(handlers::questionnaires::get_questionnaire_handler),
        )
        .route(
            "/api/questionnaires/{questionnaire_id}/items",
            post(handlers::items::add_item_handler),
        )
        .route(
            "/api/items/{item_id}",
            patch(handlers::items::update_item_handler)
                .delete(handlers::items::delete_item_handler),
        )
        .route(
            "/api/items/{item_id}/move",
            post(handlers::items::move_item_handler),
        )
        .route(
            "/api/items/{item_id}/fields",
            get(handlers::items::list_fields_handler).post(handlers::items::add_field_handler),
        )
        .route(
            "/api/fields/{field_id}",
            patch(handlers::fields::update_field_handler)
                .delete(handlers::fields::delete_field_handler),
        )
        .route(
            "/api/fields/{field_id}/preview",
            post(handlers::fields::preview_field_handler),
        )
        .route(
            "/api/questionnaires/{questionnaire_id}/responses",
            get(handlers::responses::list_responses_handler)
                .post(handlers::responses::create_response_handler),
        )
        .route(
            "/api/runtime/context",
            get(handlers::runtime::runtime_context_handler),
        )
        .route(
            "/api/runtime/responses/{response_id}/answers",
            post(handlers::runtime::save_answers_handler),
        )
        .route(
            "/api/applications/{application_id}/clone",
            post(handlers::responses::clone_application_handler),
        )
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer)
        .with_state(state);

    Ok(router)
}
