//! `larder generate`: one recipe from a craving and/or a photo.

use anyhow::Result;
use larder_core::{
    App, Completion, FfmpegCamera, GenerationError, ImageFileSource, NullSink, Settings,
};
use std::sync::Arc;

use crate::app::{self, export_illustration};
use crate::args::GenerateArgs;
use crate::{render, ui};

pub async fn run(args: GenerateArgs) -> Result<()> {
    let settings = Settings::load();
    let mut app = app::build_app(&settings, Arc::new(NullSink));

    if let Some(path) = &args.image {
        app = app.with_camera(Box::new(ImageFileSource::new(path)));
        take_photo(&mut app, false)?;
    } else if args.camera {
        app::ensure_ffmpeg_installed()?;
        app = app.with_camera(Box::new(FfmpegCamera::new(&settings.camera_device)));
        take_photo(&mut app, true)?;
    }

    if !generate(&mut app, &args.craving()).await? {
        return Ok(());
    }

    if args.illustrate || args.image_out.is_some() {
        illustrate(&mut app).await;
    }

    let Some(recipe) = app.state().current.clone() else {
        return Ok(());
    };

    if args.json {
        println!("{}", serde_json::to_string_pretty(&recipe)?);
    } else {
        println!();
        print!("{}", render::recipe(&recipe));
        println!();
    }

    if let Some(path) = &args.image_out {
        match export_illustration(&recipe, path)? {
            Some(written) => ui::success(&format!("Illustration written to {}", written.display())),
            None => ui::info("No illustration available"),
        }
    }

    if args.save {
        save(&mut app);
    } else if !args.json {
        ui::info("Add --save to keep this recipe in your pantry");
    }

    Ok(())
}

/// Open the camera (or image file) and take the still for the next generation
pub fn take_photo(app: &mut App, live: bool) -> Result<()> {
    if app.open_camera().is_err() {
        return Err(notice_error(app));
    }
    if live {
        ui::info("Camera is on. Press Enter to take the photo.");
        app::wait_for_enter()?;
    }
    if let Err(e) = app.capture_still() {
        app.close_camera();
        anyhow::bail!("{e}");
    }
    ui::success("Photo taken");
    Ok(())
}

/// Run one generation with Ctrl-C cancellation.
///
/// Returns false when cancelled.
pub async fn generate(app: &mut App, craving: &str) -> Result<bool> {
    let (cancel, watcher) = app::cancel_on_ctrl_c();
    ui::info("Cooking up a recipe… (Ctrl-C to cancel)");
    let result = app.generate(craving, &cancel).await;
    watcher.abort();

    match result {
        Ok(Completion::Done) => Ok(true),
        Ok(Completion::Cancelled) => {
            ui::info("Cancelled");
            Ok(false)
        }
        Err(GenerationError::EmptyRequest) => {
            anyhow::bail!("Tell me what you feel like eating, or add a photo with --image/--camera")
        }
        Err(_) => Err(notice_error(app)),
    }
}

/// Ask for an illustration; failures are silent
pub async fn illustrate(app: &mut App) {
    let (cancel, watcher) = app::cancel_on_ctrl_c();
    ui::info("Drawing the dish…");
    app.illustrate_current(&cancel).await;
    watcher.abort();
}

pub fn save(app: &mut App) {
    let Some(title) = app.state().current.as_ref().map(|r| r.title.clone()) else {
        return;
    };
    if app.state().current_is_saved() {
        ui::info(&format!("'{title}' is already in your pantry"));
        return;
    }
    app.save_current();
    ui::success(&format!("Saved '{title}' to your pantry"));
}

/// Turn the pending notice into an error, clearing it
fn notice_error(app: &mut App) -> anyhow::Error {
    let message = app
        .state()
        .notice
        .as_ref()
        .map(|n| n.message.clone())
        .unwrap_or_else(|| "Something went wrong".to_string());
    app.dispatch(larder_core::Action::DismissNotice);
    anyhow::anyhow!(message)
}
