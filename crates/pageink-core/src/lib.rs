//! PageInk Core Library
//!
//! Platform-agnostic data structures and logic for annotating paged documents
//! with freehand ink and text-boxes.

pub mod codec;
pub mod config;
pub mod eraser;
pub mod geometry;
pub mod input;
pub mod protocol;
pub mod storage;
pub mod store;
pub mod stroke;
pub mod swipe;
pub mod textbox;
pub mod tools;

pub use codec::{PageState, StrokeRecord, SurfaceSizes, TextBoxRecord, load_page, save_page};
pub use config::EditorConfig;
pub use eraser::{EraseOutcome, erase};
pub use geometry::PageLayout;
pub use input::{GestureOutcome, InkController, InkSegment, InputConfig, PointerKind};
pub use protocol::{HostCommand, HostEvent};
pub use storage::{PageKey, PageStore, StorageError, StorageResult};
pub use store::StrokeStore;
pub use stroke::{InkColor, InkTool, Stroke};
pub use swipe::{PageNavigator, SwipeConfig, SwipeDetector, SwipeDirection};
pub use textbox::{HitPart, TextBox, TextBoxConfig, TextBoxId, TextBoxManager, TextBoxOutcome};
pub use tools::{ToolMode, ToolSettings};
