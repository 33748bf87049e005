//! PageInk Application
//!
//! The editing session that ties input, storage, rendering and the host
//! channel together, plus the offline export used by `pageink-export`.

mod editor;
mod error;
mod export;
mod shortcuts;
mod source;

pub use editor::Editor;
pub use error::EditorError;
pub use export::export_page;
pub use shortcuts::{KeyAction, Shortcut, ShortcutRegistry};
pub use source::{BlankPages, PageSource};

pub use pageink_render::PageBitmap;
