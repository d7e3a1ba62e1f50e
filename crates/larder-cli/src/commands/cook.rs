//! Cooking mode in the terminal.
//!
//! ←/→ (or p/n) move between steps, space reads the step aloud, q leaves.

use anyhow::Result;
use crossterm::{
    cursor::MoveTo,
    event::{self, Event, KeyCode, KeyEventKind, KeyModifiers},
    execute,
    terminal::{Clear, ClearType},
};
use larder_core::{App, AudioSink, CpalSink, NarrationResult, NarrationStart, NullSink, Settings};
use std::io::Write;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;

use crate::app::{self, RawMode};
use crate::args::CookArgs;
use crate::render;

/// How often the screen refreshes while waiting for keys
const POLL_INTERVAL: Duration = Duration::from_millis(100);

pub async fn run(args: CookArgs) -> Result<()> {
    let settings = Settings::load();

    let sink: Arc<dyn AudioSink> = match (&args.device, args.mute) {
        (_, true) => Arc::new(NullSink),
        (Some(device), false) => Arc::new(CpalSink::with_device(device.clone())),
        (None, false) => Arc::new(CpalSink::new()),
    };
    let mut app = export_audio(app::build_app(&settings, sink), &args)?;

    if !app.start_cooking(Some(&args.id)) {
        anyhow::bail!(
            "No saved recipe matches '{}' (see `larder library list`)",
            args.id
        );
    }

    cook_loop(&mut app).await
}

#[cfg(feature = "wav-export")]
fn export_audio(app: App, args: &CookArgs) -> Result<App> {
    use anyhow::Context;

    let Some(dir) = &args.save_audio else {
        return Ok(app);
    };
    std::fs::create_dir_all(dir).with_context(|| format!("Failed to create {}", dir.display()))?;
    Ok(app.with_narration_export(dir))
}

#[cfg(not(feature = "wav-export"))]
fn export_audio(app: App, _args: &CookArgs) -> Result<App> {
    Ok(app)
}

/// Drive cooking mode until the user leaves it
pub async fn cook_loop(app: &mut App) -> Result<()> {
    let mut narrations: Vec<JoinHandle<NarrationResult>> = Vec::new();
    let mut last_frame = None;

    {
        let _raw = RawMode::enable()?;

        while let Some(session) = app.state().cooking.as_ref() {
            let frame = render::cooking(session, app.state().speaking());
            if last_frame.as_ref() != Some(&frame) {
                draw(&frame)?;
                last_frame = Some(frame);
            }

            narrations.retain(|handle| !handle.is_finished());

            let ready = tokio::task::block_in_place(|| event::poll(POLL_INTERVAL))?;
            if !ready {
                continue;
            }

            let Event::Key(key) = event::read()? else {
                continue;
            };
            if key.kind != KeyEventKind::Press {
                continue;
            }

            match key.code {
                KeyCode::Right | KeyCode::Char('n') | KeyCode::Char('l') => app.next_step(),
                KeyCode::Left | KeyCode::Char('p') | KeyCode::Char('h') => app.previous_step(),
                KeyCode::Char(' ') | KeyCode::Enter => {
                    if let NarrationStart::Started(handle) = app.narrate_step() {
                        narrations.push(handle);
                    }
                }
                KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                    app.exit_cooking()
                }
                KeyCode::Char('q') | KeyCode::Esc => app.exit_cooking(),
                _ => {}
            }
        }
    }

    // let a step that is already playing finish
    for handle in narrations {
        if let Ok(NarrationResult::Failed(reason)) = handle.await {
            larder_core::verbose!("Narration failed: {reason}");
        }
    }
    println!();
    Ok(())
}

fn draw(frame: &str) -> Result<()> {
    let mut stdout = std::io::stdout();
    execute!(stdout, Clear(ClearType::All), MoveTo(0, 0))?;
    // raw mode: no implicit carriage return
    write!(stdout, "{}", frame.replace('\n', "\r\n"))?;
    stdout.flush()?;
    Ok(())
}
