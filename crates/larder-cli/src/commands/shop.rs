use anyhow::Result;
use larder_core::Settings;

use crate::app::load_library;
use crate::args::ShopCommand;
use crate::{render, ui};

pub fn run(action: ShopCommand) -> Result<()> {
    let settings = Settings::load();
    let (mut store, storage) = load_library(&settings);

    match action {
        ShopCommand::List => print!("{}", render::shopping(&store)),
        ShopCommand::Add { item } => {
            let item = item.join(" ");
            match store.add_shopping_item(&item) {
                Some(which) => {
                    store.persist(which, &storage)?;
                    ui::success(&format!("Added '{}'", item.trim()));
                }
                None => ui::info("Nothing to add"),
            }
        }
        ShopCommand::Remove { number } => {
            let removed = number
                .checked_sub(1)
                .and_then(|index| store.shopping_items().get(index).cloned().map(|item| (index, item)));
            match removed {
                Some((index, item)) => {
                    if let Some(which) = store.remove_shopping_item(index) {
                        store.persist(which, &storage)?;
                    }
                    ui::success(&format!("Removed '{item}'"));
                }
                None => ui::info(&format!("No item number {number}")),
            }
        }
        #[cfg(feature = "clipboard")]
        ShopCommand::Copy { with_recipes } => {
            match larder_core::copy_shopping_list(&store, with_recipes)? {
                0 => ui::info("Shopping list is empty"),
                n => ui::success(&format!("Copied {n} lines to the clipboard")),
            }
        }
    }
    Ok(())
}
