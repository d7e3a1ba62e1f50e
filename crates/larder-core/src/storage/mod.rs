//! Persistence adapter for the saved-recipe collection and the shopping list.
//!
//! Collections are stored as JSON strings in a key-value store. There is no
//! schema version: anything that fails to parse at load time is treated as an
//! empty collection.

mod file;
mod memory;

use anyhow::{Context, Result};
use serde::Serialize;
use serde::de::DeserializeOwned;

pub use file::FileStore;
pub use memory::MemoryStore;

use crate::recipe::Recipe;

/// Key holding the JSON array of saved recipes
pub const SAVED_RECIPES_KEY: &str = "larder_saved_recipes";

/// Key holding the JSON array of shopping items
pub const SHOPPING_LIST_KEY: &str = "larder_shopping_list";

/// String-valued key-value storage.
pub trait KeyValueStore: Send + Sync {
    /// Read the value stored under `key`, `None` if never written
    fn get(&self, key: &str) -> Result<Option<String>>;

    /// Replace the value stored under `key`
    fn set(&self, key: &str, value: &str) -> Result<()>;
}

/// Load a JSON array from the store.
///
/// Missing keys, read errors and malformed JSON all yield an empty vector.
pub fn load_collection<T: DeserializeOwned>(store: &dyn KeyValueStore, key: &str) -> Vec<T> {
    let raw = match store.get(key) {
        Ok(Some(raw)) => raw,
        Ok(None) => return Vec::new(),
        Err(e) => {
            crate::verbose!("Failed to read '{key}': {e:#}");
            return Vec::new();
        }
    };

    serde_json::from_str(&raw).unwrap_or_else(|e| {
        crate::verbose!("Discarding malformed '{key}' ({} bytes): {e}", raw.len());
        Vec::new()
    })
}

/// Serialize a collection and write it under `key`
pub fn save_collection<T: Serialize>(
    store: &dyn KeyValueStore,
    key: &str,
    items: &[T],
) -> Result<()> {
    let json = serde_json::to_string(items)
        .with_context(|| format!("Failed to serialize '{key}'"))?;
    store.set(key, &json)
}

pub fn load_recipes(store: &dyn KeyValueStore) -> Vec<Recipe> {
    load_collection(store, SAVED_RECIPES_KEY)
}

pub fn save_recipes(store: &dyn KeyValueStore, recipes: &[Recipe]) -> Result<()> {
    save_collection(store, SAVED_RECIPES_KEY, recipes)
}

pub fn load_shopping_list(store: &dyn KeyValueStore) -> Vec<String> {
    load_collection(store, SHOPPING_LIST_KEY)
}

pub fn save_shopping_list(store: &dyn KeyValueStore, items: &[String]) -> Result<()> {
    save_collection(store, SHOPPING_LIST_KEY, items)
}
