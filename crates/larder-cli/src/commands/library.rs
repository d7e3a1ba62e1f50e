//! Saved recipes: list, show, add by hand, remove.
//!
//! These work on the stored collections directly and need no API key.

use anyhow::Result;
use larder_core::{Action, AppState, KeyValueStore, Recipe, RecipeDraft, RecipeStore, Settings};

use crate::app::{export_illustration, load_library};
use crate::args::LibraryCommand;
use crate::{render, ui};

pub fn run(action: LibraryCommand) -> Result<()> {
    let settings = Settings::load();
    let (store, storage) = load_library(&settings);

    match action {
        LibraryCommand::List { filter } => {
            let mut state = AppState::new(store);
            state.apply(Action::SetFilter(filter.unwrap_or_default()));
            print!("{}", render::library(&state));
        }
        LibraryCommand::Show {
            id,
            json,
            image_out,
        } => {
            let recipe = find(&store, &id)?;
            if json {
                println!("{}", serde_json::to_string_pretty(recipe)?);
            } else {
                print!("{}", render::recipe(recipe));
            }
            if let Some(path) = image_out {
                match export_illustration(recipe, &path)? {
                    Some(written) => {
                        ui::success(&format!("Illustration written to {}", written.display()))
                    }
                    None => ui::info("This recipe has no illustration"),
                }
            }
        }
        LibraryCommand::Add {
            title,
            description,
            ingredients,
            steps,
            prep_time,
            servings,
        } => {
            let draft = match title {
                Some(title) => RecipeDraft {
                    title,
                    description: description.unwrap_or_default(),
                    ingredients,
                    instructions: steps,
                    prep_time: prep_time.unwrap_or_default(),
                    servings: servings.unwrap_or_default(),
                },
                None => prompt_draft()?,
            };
            add(store, &storage, draft)?;
        }
        LibraryCommand::Remove { id } => {
            let mut store = store;
            let recipe = find(&store, &id)?;
            let (id, title) = (recipe.id.clone(), recipe.title.clone());
            if let Some(which) = store.remove_recipe(&id) {
                store.persist(which, &storage)?;
            }
            ui::success(&format!("Removed '{title}'"));
        }
    }
    Ok(())
}

fn find<'a>(store: &'a RecipeStore, id: &str) -> Result<&'a Recipe> {
    store
        .find(id)
        .ok_or_else(|| anyhow::anyhow!("No saved recipe matches '{id}' (see `larder library list`)"))
}

/// Append a hand-entered dish and persist it
pub fn add(mut store: RecipeStore, storage: &dyn KeyValueStore, draft: RecipeDraft) -> Result<()> {
    let recipe = draft.into_recipe()?;
    let line = render::recipe_line(&recipe);
    if let Some(which) = store.append_recipe(recipe) {
        store.persist(which, storage)?;
    }
    ui::success(&format!("Added {line}"));
    Ok(())
}

/// Ask for a dish field by field
pub fn prompt_draft() -> Result<RecipeDraft> {
    let title = loop {
        let title = ui::input("Title", None)?;
        if !title.trim().is_empty() {
            break title;
        }
        ui::error("A dish needs a title");
    };
    Ok(RecipeDraft {
        title,
        description: ui::input("Description", None)?,
        ingredients: ui::input_lines("Ingredients")?,
        instructions: ui::input_lines("Steps")?,
        prep_time: ui::input("Prep time", None)?,
        servings: ui::input("Servings", None)?,
    })
}
