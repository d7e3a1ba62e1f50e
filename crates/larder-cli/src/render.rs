//! Text rendering of the application state.
//!
//! Every function here is pure: it takes state and returns the text to print.

use console::style;
use larder_core::{AppState, CookingSession, Recipe, RecipeStore};

/// Length of the id prefix shown in listings (accepted back by `find`)
pub const SHORT_ID_LEN: usize = 8;

pub fn short_id(id: &str) -> &str {
    id.get(..SHORT_ID_LEN).unwrap_or(id)
}

/// One line per saved recipe
pub fn recipe_line(recipe: &Recipe) -> String {
    format!(
        "{}  {}  ({}, {} steps, {})",
        style(short_id(&recipe.id)).dim(),
        style(&recipe.title).bold(),
        recipe.prep_time,
        recipe.step_count(),
        recipe.created_at.format("%Y-%m-%d"),
    )
}

/// Full recipe card
pub fn recipe(recipe: &Recipe) -> String {
    let mut out = String::new();
    out.push_str(&format!("{}\n", style(&recipe.title).bold().cyan()));
    if !recipe.description.is_empty() {
        out.push_str(&format!("{}\n", recipe.description));
    }
    out.push('\n');
    out.push_str(&format!(
        "Prep: {}   Serves: {}\n",
        recipe.prep_time, recipe.servings
    ));
    let n = &recipe.nutrition;
    out.push_str(&format!(
        "Calories: {}   Protein: {}   Carbs: {}   Fat: {}\n",
        n.calories, n.protein, n.carbs, n.fat
    ));
    if recipe.image.is_some() {
        out.push_str("Illustrated\n");
    }

    out.push_str(&format!("\n{}\n", style("Ingredients").bold()));
    for ingredient in &recipe.ingredients {
        out.push_str(&format!("  - {ingredient}\n"));
    }

    out.push_str(&format!("\n{}\n", style("Instructions").bold()));
    for (i, step) in recipe.instructions.iter().enumerate() {
        out.push_str(&format!("  {}. {step}\n", i + 1));
    }
    out
}

/// Library view: saved recipes matching the filter
pub fn library(state: &AppState) -> String {
    let visible = state.visible_recipes();
    if state.library.recipes().is_empty() {
        return "Your pantry is empty. Generate a recipe and save it, or add one by hand.\n"
            .to_string();
    }
    if visible.is_empty() {
        return format!("No saved recipes match \"{}\".\n", state.filter.trim());
    }
    let mut out = String::new();
    for recipe in visible {
        out.push_str(&recipe_line(recipe));
        out.push('\n');
    }
    out
}

/// Shopping view: numbered manual items, then saved recipes' ingredients
pub fn shopping(store: &RecipeStore) -> String {
    let mut out = String::new();

    if store.shopping_items().is_empty() {
        out.push_str("Nothing on your list yet.\n");
    } else {
        for (i, item) in store.shopping_items().iter().enumerate() {
            out.push_str(&format!("{:>3}. {item}\n", i + 1));
        }
    }

    for group in store.ingredient_groups() {
        out.push_str(&format!(
            "\n{} {}\n",
            style(group.title).bold(),
            style(format!("({})", short_id(group.recipe_id))).dim()
        ));
        for ingredient in group.ingredients {
            out.push_str(&format!("     - {ingredient}\n"));
        }
    }
    out
}

/// Cooking overlay for the current step
pub fn cooking(session: &CookingSession, speaking: bool) -> String {
    let step = session.step() + 1;
    let total = session.step_count();
    let width = 30;
    let filled = ((session.progress() * width as f32).round() as usize).min(width);

    let mut out = String::new();
    out.push_str(&format!("{}\n\n", style(&session.recipe().title).bold().cyan()));
    out.push_str(&format!(
        "Step {step} of {total}  [{}{}]\n\n",
        "#".repeat(filled),
        "-".repeat(width - filled)
    ));
    out.push_str(&format!("{}\n\n", session.current_instruction()));

    let prev = if session.has_previous() { "← previous" } else { "" };
    let next = if session.has_next() { "next →" } else { "last step" };
    let speak = if speaking { "speaking…" } else { "space: read aloud" };
    out.push_str(&format!(
        "{}\n",
        style(format!("{prev}   {next}   {speak}   q: done")).dim()
    ));
    out
}
