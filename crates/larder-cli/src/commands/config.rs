use anyhow::{Context, Result};
use larder_core::config::Service;
use larder_core::settings::validate_api_key;
use larder_core::Settings;

use crate::args::ConfigArgs;
use crate::ui;

pub fn run(args: ConfigArgs) -> Result<()> {
    let mut settings = Settings::load();

    if args.show || args.is_empty() {
        print_settings(&settings);
        return Ok(());
    }

    if let Some(key) = args.api_key {
        validate_api_key(&key)?;
        settings.api_key = Some(key.trim().to_string());
        ui::success("API key saved");
    }

    for spec in &args.model {
        let (service, model) = parse_model_override(spec)?;
        ui::success(&format!("{} model set to {model}", service.display_name()));
        settings.models.insert(service, model);
    }

    if let Some(voice) = args.voice {
        ui::success(&format!("Voice set to {voice}"));
        settings.voice = voice;
    }

    if let Some(device) = args.camera_device {
        ui::success(&format!("Camera device set to {device}"));
        settings.camera_device = device;
    }

    if let Some(dir) = args.data_dir {
        ui::success(&format!("Data directory set to {}", dir.display()));
        settings.data_dir = Some(dir);
    }

    if let Some(secs) = args.timeout {
        settings.request_timeout_secs = (secs > 0).then_some(secs);
        match settings.request_timeout_secs {
            Some(secs) => ui::success(&format!("Request timeout set to {secs}s")),
            None => ui::success("Request timeout cleared"),
        }
    }

    if let Some(url) = args.api_base_url {
        ui::success(&format!("API base URL set to {url}"));
        settings.api_base_url = url;
    }

    settings.save()?;
    Ok(())
}

/// Parse `generation=gemini-2.5-pro`
fn parse_model_override(spec: &str) -> Result<(Service, String)> {
    let (service, model) = spec
        .split_once('=')
        .with_context(|| format!("Expected SERVICE=MODEL, got '{spec}'"))?;
    let service: Service = service.trim().parse().map_err(anyhow::Error::msg)?;
    let model = model.trim();
    if model.is_empty() {
        anyhow::bail!("Model name for {service} is empty");
    }
    Ok((service, model.to_string()))
}

fn print_settings(settings: &Settings) {
    let key = match (&settings.api_key, settings.api_key()) {
        (Some(key), _) => mask(key),
        (None, Some(_)) => "(from environment)".to_string(),
        (None, None) => "(not set)".to_string(),
    };

    println!("Settings file:   {}", Settings::path().display());
    println!("API key:         {key}");
    for service in Service::all() {
        println!(
            "{:<16} {}",
            format!("{} model:", service.display_name()),
            settings.model_for(*service)
        );
    }
    println!("Voice:           {}", settings.voice);
    println!("Camera device:   {}", settings.camera_device);
    println!("Data directory:  {}", settings.data_dir().display());
    println!(
        "Request timeout: {}",
        settings
            .request_timeout_secs
            .map(|s| format!("{s}s"))
            .unwrap_or_else(|| "none".to_string())
    );
    println!("API base URL:    {}", settings.api_base_url);
}

fn mask(key: &str) -> String {
    let tail: String = key.chars().rev().take(4).collect::<Vec<_>>().into_iter().rev().collect();
    format!("****{tail}")
}
