//! Quillform API composition root.
//!
//! Wires the questionnaire services over the in-memory repository adapter. A
//! hosting application replaces the repository (and fronts the router with its
//! own authentication) to run this against durable storage.

#![forbid(unsafe_code)]

mod api_config;
mod api_router;
mod dto;
mod error;
mod handlers;
mod state;
mod tenant;

use std::sync::Arc;

use quillform_application::{BuilderService, RunnerService, VersionService};
use quillform_core::AppError;
use quillform_infrastructure::InMemoryQuestionnaireRepository;
use tracing::info;

use crate::api_config::{ApiConfig, init_tracing};
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<(), AppError> {
    dotenvy::dotenv().ok();
    init_tracing();

    let config = ApiConfig::load()?;

    let repository = Arc::new(InMemoryQuestionnaireRepository::new());
    let version_service = VersionService::new(repository.clone());
    let app_state = AppState {
        builder_service: BuilderService::new(repository.clone()),
        runner_service: RunnerService::new(repository, version_service.clone()),
        version_service,
    };

    let app = api_router::build(app_state, config.frontend_url.as_str())?;

    let address = config.socket_address()?;
    let listener = tokio::net::TcpListener::bind(address)
        .await
        .map_err(|error| AppError::Internal(format!("failed to bind listener: {error}")))?;

    info!(%address, "quillform-api listening");

    axum::serve(listener, app)
        .await
        .map_err(|error| AppError::Internal(format!("api server error: {error}")))
}
