use quillform_application::{BuilderService, RunnerService, VersionService};

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub builder_service: BuilderService,
    pub runner_service: RunnerService,
    pub version_service: VersionService,
}
