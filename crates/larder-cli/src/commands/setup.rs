//! Setup wizard
//!
//! Asks for the Gemini API key (keeping an existing one if wanted) and a
//! narration voice, then saves settings.

use anyhow::Result;
use larder_core::Settings;
use larder_core::settings::validate_api_key;

use crate::ui;

const API_KEY_URL: &str = "https://aistudio.google.com/apikey";

/// Prebuilt voices offered by the speech model
const VOICES: &[(&str, &str)] = &[
    ("Kore", "firm"),
    ("Puck", "upbeat"),
    ("Charon", "informative"),
    ("Aoede", "breezy"),
    ("Fenrir", "excitable"),
];

pub fn run() -> Result<()> {
    ui::header("larder setup");

    let mut settings = Settings::load();

    let existing_key = settings.api_key();
    let keep = match &existing_key {
        Some(_) => ui::select("Keep current API key?", &["Yes", "No"], Some(0))? == 0,
        None => false,
    };

    if keep {
        // key may only live in the environment; persist it
        if settings.api_key.is_none() {
            settings.api_key = existing_key;
            ui::info("API key saved to settings");
        }
    } else {
        ui::info(&format!("Get your API key from: {API_KEY_URL}"));
        settings.api_key = Some(prompt_and_validate_key()?);
    }

    let items: Vec<String> = VOICES
        .iter()
        .map(|(name, tone)| format!("{name:<8} - {tone}"))
        .collect();
    let default = VOICES
        .iter()
        .position(|(name, _)| *name == settings.voice)
        .unwrap_or(0);
    let choice = ui::select("Narration voice", &items, Some(default))?;
    settings.voice = VOICES[choice].0.to_string();

    settings.save()?;

    println!();
    ui::success(&format!(
        "Configuration saved to {}",
        Settings::path().display()
    ));
    println!();
    println!("Try it out:");
    println!("  larder generate spicy ramen --save");
    println!("  larder                          # interactive menu");
    println!();

    Ok(())
}

fn prompt_and_validate_key() -> Result<String> {
    loop {
        let api_key = ui::password("Gemini API key")?;
        match validate_api_key(&api_key) {
            Ok(()) => return Ok(api_key.trim().to_string()),
            Err(e) => ui::error(&e.to_string()),
        }
    }
}
