#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("config ({context}): {detail}")]
    Config { context: &'static str, detail: String },

    #[error(transparent)]
    StepConfig(#[from] step_pipeline::ConfigError),

    #[error("{0}")]
    Component(#[from] step_api::ComponentError),

    #[error("{0}")]
    Step(#[from] step_pipeline::StepRunError),
}
