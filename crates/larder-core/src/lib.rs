pub mod app;
pub mod audio;
pub mod capture;
#[cfg(feature = "clipboard")]
pub mod clipboard;
pub mod config;
pub mod cooking;
pub mod http;
pub mod library;
pub mod narration;
pub mod provider;
pub mod recipe;
pub mod settings;
pub mod storage;
pub mod verbose;

pub use app::{Action, App, AppState, Completion, NarrationStart, View};
pub use audio::{AudioSink, CpalSink, NullSink};
pub use capture::{CaptureError, CaptureSession, FfmpegCamera, FrameSource, ImageFileSource, StillImage};
#[cfg(feature = "clipboard")]
pub use clipboard::{copy_shopping_list, copy_text};
pub use config::Service;
pub use cooking::CookingSession;
pub use library::RecipeStore;
pub use narration::{NarrationResult, Narrator};
pub use provider::{GeminiProvider, GenerationError, GenerationRequest, RecipeBackend};
pub use recipe::{Illustration, Recipe, RecipeDraft};
pub use settings::Settings;
pub use storage::{FileStore, KeyValueStore, MemoryStore};
pub use verbose::set_verbose;
