//! Pipeline error type.
//!
//! Stage entry points return [`PipelineError`]; the consumer loops log it
//! and move on to the next event.

use veille_core::error::CoreError;
use veille_events::EmailError;

use crate::generation::GenerationError;
use crate::news::NewsError;
use crate::report::RenderError;

#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error(transparent)]
    Core(#[from] CoreError),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("News fetch failed: {0}")]
    News(#[from] NewsError),

    #[error("Text generation failed: {0}")]
    Generation(#[from] GenerationError),

    #[error("Email delivery failed: {0}")]
    Email(#[from] EmailError),

    #[error("Report rendering failed: {0}")]
    Render(#[from] RenderError),

    #[error("Report file error: {0}")]
    Io(#[from] std::io::Error),
}
