//! Copy the shopping list to the system clipboard.

use anyhow::{Context, Result};
use arboard::Clipboard;
use std::io::Write;
use std::process::{Command, Stdio};

use crate::library::RecipeStore;

/// Check if running inside a Flatpak sandbox
fn is_flatpak() -> bool {
    std::path::Path::new("/.flatpak-info").exists()
}

/// GNOME/Mutter lacks wlr-data-control, so inside Flatpak go through wl-copy.
fn copy_via_wl_copy(text: &str) -> Result<()> {
    let mut child = Command::new("wl-copy")
        .stdin(Stdio::piped())
        .spawn()
        .context("Failed to spawn wl-copy")?;

    if let Some(mut stdin) = child.stdin.take() {
        stdin
            .write_all(text.as_bytes())
            .context("Failed to write to wl-copy")?;
    }

    let status = child.wait().context("Failed to wait for wl-copy")?;
    if !status.success() {
        anyhow::bail!("wl-copy exited with {status}");
    }
    Ok(())
}

pub fn copy_text(text: &str) -> Result<()> {
    if is_flatpak() {
        return copy_via_wl_copy(text);
    }

    let mut clipboard = Clipboard::new().context("Failed to access clipboard")?;
    clipboard
        .set_text(text)
        .context("Failed to copy text to clipboard")?;
    Ok(())
}

/// Copy the shopping list (optionally with saved recipes' ingredients).
///
/// Returns the number of lines copied; an empty list copies nothing.
pub fn copy_shopping_list(store: &RecipeStore, with_recipes: bool) -> Result<usize> {
    let text = store.shopping_text(with_recipes);
    if text.is_empty() {
        return Ok(0);
    }
    copy_text(&text)?;
    let lines = text.lines().filter(|l| !l.is_empty()).count();
    crate::verbose!("Copied {lines} shopping lines to clipboard");
    Ok(lines)
}
