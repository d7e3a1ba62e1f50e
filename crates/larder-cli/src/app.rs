use anyhow::{Context, Result};
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind},
    terminal::{disable_raw_mode, enable_raw_mode},
};
use larder_core::{App, AudioSink, FileStore, GeminiProvider, Recipe, RecipeStore, Settings};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

pub fn ensure_ffmpeg_installed() -> Result<()> {
    if std::process::Command::new("ffmpeg")
        .arg("-version")
        .output()
        .is_err()
    {
        eprintln!("Error: FFmpeg is not installed or not in PATH.");
        eprintln!("\nlarder uses FFmpeg to read frames from your camera.");
        eprintln!("Please install FFmpeg:");
        eprintln!("  - Ubuntu/Debian: sudo apt install ffmpeg");
        eprintln!("  - macOS: brew install ffmpeg");
        eprintln!("  - Windows: choco install ffmpeg or download from ffmpeg.org");
        eprintln!("\nOr pass a photo instead: larder generate --image photo.jpg\n");
        std::process::exit(1);
    }
    Ok(())
}

/// Storage for the pantry and shopping list
pub fn open_storage(settings: &Settings) -> FileStore {
    let dir = settings.data_dir();
    larder_core::verbose!("Data directory: {}", dir.display());
    FileStore::new(dir)
}

/// Load pantry and shopping list without needing an API key
pub fn load_library(settings: &Settings) -> (RecipeStore, FileStore) {
    let storage = open_storage(settings);
    let store = RecipeStore::load(&storage);
    (store, storage)
}

/// Build the controller with the Gemini backend.
///
/// Exits with setup instructions when no API key is configured.
pub fn build_app(settings: &Settings, sink: Arc<dyn AudioSink>) -> App {
    let provider = match GeminiProvider::from_settings(settings) {
        Ok(provider) => provider,
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    };
    larder_core::verbose!("{provider:?}");
    App::new(Arc::new(provider), Box::new(open_storage(settings)), sink)
}

/// Token cancelled when the user hits Ctrl-C
pub fn cancel_on_ctrl_c() -> (CancellationToken, tokio::task::JoinHandle<()>) {
    let token = CancellationToken::new();
    let child = token.clone();
    let watcher = tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            child.cancel();
        }
    });
    (token, watcher)
}

pub fn wait_for_enter() -> Result<()> {
    std::io::stdout().flush()?;

    let _raw = RawMode::enable()?;
    loop {
        if let Event::Key(key_event) = event::read()? {
            if key_event.kind == KeyEventKind::Press && key_event.code == KeyCode::Enter {
                break;
            }
        }
    }
    Ok(())
}

/// Raw terminal mode, restored on drop
pub struct RawMode;

impl RawMode {
    pub fn enable() -> Result<Self> {
        enable_raw_mode().context("Failed to enable raw terminal mode")?;
        Ok(Self)
    }
}

impl Drop for RawMode {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
    }
}

/// Write an illustration to `path`, adding the right extension when missing
pub fn export_illustration(recipe: &Recipe, path: &Path) -> Result<Option<PathBuf>> {
    let Some(illustration) = recipe.illustration() else {
        return Ok(None);
    };
    let path = if path.extension().is_some() {
        path.to_path_buf()
    } else {
        path.with_extension(illustration.extension())
    };
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    std::fs::write(&path, illustration.bytes()?)
        .with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(Some(path))
}
