use pageink_core::storage::StorageError;
use pageink_render::RendererError;
use thiserror::Error;

/// Errors surfaced when opening a session or exporting.
#[derive(Debug, Error)]
pub enum EditorError {
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error(transparent)]
    Render(#[from] RendererError),
    #[error("Page {0} is unavailable")]
    PageUnavailable(u32),
}
