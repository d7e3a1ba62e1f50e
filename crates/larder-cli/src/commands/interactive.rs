//! Interactive menu (`larder` with no command).
//!
//! Three views (create, pantry, shopping list) plus the camera and cooking
//! overlays, all drawn from the controller state.

use anyhow::Result;
use larder_core::{Action, App, AudioSink, CpalSink, FfmpegCamera, Settings, View};
use std::sync::Arc;

use super::{cook, generate, library};
use crate::{app, render, ui};

pub async fn run() -> Result<()> {
    let settings = Settings::load();
    let sink: Arc<dyn AudioSink> = Arc::new(CpalSink::new());
    let mut app = app::build_app(&settings, sink)
        .with_camera(Box::new(FfmpegCamera::new(&settings.camera_device)));

    ui::header("larder");

    loop {
        show_notice(&mut app);

        let view = app.state().view;
        let keep_going = match view {
            View::Generate => create_view(&mut app).await?,
            View::Library => pantry_view(&mut app).await?,
            View::Shopping => shopping_view(&mut app)?,
        };
        if !keep_going {
            break;
        }
    }

    app.exit_cooking();
    app.close_camera();
    Ok(())
}

fn show_notice(app: &mut App) {
    if let Some(notice) = app.state().notice.clone() {
        ui::error(&notice.message);
        app.dispatch(Action::DismissNotice);
    }
}

/// Menu entries for switching views, leaving out the current one
fn view_switches(current: View) -> Vec<(String, Option<View>)> {
    let mut items: Vec<(String, Option<View>)> = View::all()
        .iter()
        .filter(|v| **v != current)
        .map(|v| (format!("Go to {}", v.title()), Some(*v)))
        .collect();
    items.push(("Quit".to_string(), None));
    items
}

async fn create_view(app: &mut App) -> Result<bool> {
    if let Some(recipe) = &app.state().current {
        println!();
        print!("{}", render::recipe(recipe));
        println!();
    }

    #[derive(Clone, Copy)]
    enum Choice {
        Generate,
        Photo,
        DropPhoto,
        Illustrate,
        Save,
        Cook,
        Switch(Option<View>),
    }

    let state = app.state();
    let mut items: Vec<(String, Choice)> = vec![("Create a recipe".into(), Choice::Generate)];
    if state.pending_image.is_some() {
        items.push(("Remove ingredient photo".into(), Choice::DropPhoto));
    } else {
        items.push(("Add a photo of your ingredients".into(), Choice::Photo));
    }
    if let Some(recipe) = &state.current {
        if recipe.image.is_none() {
            items.push(("Illustrate this dish".into(), Choice::Illustrate));
        }
        if !state.current_is_saved() {
            items.push(("Save to pantry".into(), Choice::Save));
        }
        items.push(("Cook this".into(), Choice::Cook));
    }
    for (label, view) in view_switches(View::Generate) {
        items.push((label, Choice::Switch(view)));
    }

    let labels: Vec<&str> = items.iter().map(|(label, _)| label.as_str()).collect();
    let title = match state.pending_image {
        Some(_) => format!("{} (photo attached)", View::Generate.title()),
        None => View::Generate.title().to_string(),
    };
    let choice = items[ui::select(&title, &labels, Some(0))?].1;

    match choice {
        Choice::Generate => {
            let craving = ui::input("What do you feel like eating?", None)?;
            if let Err(e) = generate::generate(app, &craving).await {
                ui::error(&e.to_string());
            }
        }
        Choice::Photo => {
            if let Err(e) = generate::take_photo(app, true) {
                ui::error(&e.to_string());
            }
        }
        Choice::DropPhoto => app.clear_photo(),
        Choice::Illustrate => generate::illustrate(app).await,
        Choice::Save => generate::save(app),
        Choice::Cook => {
            if app.start_cooking(None) {
                cook::cook_loop(app).await?;
            }
        }
        Choice::Switch(Some(view)) => app.dispatch(Action::SetView(view)),
        Choice::Switch(None) => return Ok(false),
    }
    Ok(true)
}

async fn pantry_view(app: &mut App) -> Result<bool> {
    println!();
    print!("{}", render::library(app.state()));
    println!();

    let recipes: Vec<(String, String)> = app
        .state()
        .visible_recipes()
        .iter()
        .map(|r| (r.id.clone(), r.title.clone()))
        .collect();

    let mut labels: Vec<String> = recipes
        .iter()
        .map(|(_, title)| format!("Open '{title}'"))
        .collect();
    let open_count = labels.len();
    labels.push("Search".into());
    labels.push("Add a dish by hand".into());
    labels.push("Remove a recipe".into());
    let switches = view_switches(View::Library);
    labels.extend(switches.iter().map(|(label, _)| label.clone()));

    let choice = ui::select(View::Library.title(), &labels, Some(0))?;
    if choice < open_count {
        app.dispatch(Action::SelectRecipe(recipes[choice].0.clone()));
        return Ok(true);
    }

    match choice - open_count {
        0 => {
            let query = ui::input("Title contains", Some(app.state().filter.as_str()))?;
            app.dispatch(Action::SetFilter(query));
        }
        1 => match library::prompt_draft().and_then(|draft| app.add_manual(draft)) {
            Ok(recipe) => ui::success(&format!("Added {}", render::recipe_line(&recipe))),
            Err(e) => ui::error(&e.to_string()),
        },
        2 => {
            if recipes.is_empty() {
                ui::info("Nothing to remove");
            } else {
                let titles: Vec<&str> = recipes.iter().map(|(_, t)| t.as_str()).collect();
                let index = ui::select("Remove which recipe?", &titles, None)?;
                if ui::confirm(&format!("Remove '{}'?", titles[index]), false)? {
                    app.remove_recipe(&recipes[index].0);
                }
            }
        }
        n => match switches[n - 3].1 {
            Some(view) => app.dispatch(Action::SetView(view)),
            None => return Ok(false),
        },
    }
    Ok(true)
}

fn shopping_view(app: &mut App) -> Result<bool> {
    println!();
    print!("{}", render::shopping(&app.state().library));
    println!();

    let mut labels = vec!["Add an item".to_string(), "Remove an item".to_string()];
    let switches = view_switches(View::Shopping);
    labels.extend(switches.iter().map(|(label, _)| label.clone()));

    match ui::select(View::Shopping.title(), &labels, Some(0))? {
        0 => {
            let item = ui::input("Item", None)?;
            app.add_shopping_item(&item);
        }
        1 => {
            let items = app.state().library.shopping_items().to_vec();
            if items.is_empty() {
                ui::info("Nothing to remove");
            } else {
                let index = ui::select("Remove which item?", &items, None)?;
                app.remove_shopping_item(index);
            }
        }
        n => match switches[n - 2].1 {
            Some(view) => app.dispatch(Action::SetView(view)),
            None => return Ok(false),
        },
    }
    Ok(true)
}
