//! Recipe store: the saved-recipe library and the shopping list.
//!
//! Mutations report which collection changed so the caller can mirror it to
//! storage right away.

use anyhow::Result;

use crate::recipe::Recipe;
use crate::storage::{self, KeyValueStore};

/// Which persisted collection a mutation touched
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Persist {
    Recipes,
    ShoppingList,
}

/// Ingredients of one saved recipe, as shown in the shopping view
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IngredientGroup<'a> {
    pub recipe_id: &'a str,
    pub title: &'a str,
    pub ingredients: &'a [String],
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecipeStore {
    recipes: Vec<Recipe>,
    shopping: Vec<String>,
}

impl RecipeStore {
    pub fn new(recipes: Vec<Recipe>, shopping: Vec<String>) -> Self {
        Self { recipes, shopping }
    }

    /// Load both collections, treating unreadable data as empty
    pub fn load(kv: &dyn KeyValueStore) -> Self {
        let store = Self::new(storage::load_recipes(kv), storage::load_shopping_list(kv));
        crate::verbose!(
            "Loaded {} saved recipes, {} shopping items",
            store.recipes.len(),
            store.shopping.len()
        );
        store
    }

    /// Write one collection back to storage
    pub fn persist(&self, which: Persist, kv: &dyn KeyValueStore) -> Result<()> {
        match which {
            Persist::Recipes => storage::save_recipes(kv, &self.recipes),
            Persist::ShoppingList => storage::save_shopping_list(kv, &self.shopping),
        }
    }

    pub fn recipes(&self) -> &[Recipe] {
        &self.recipes
    }

    pub fn shopping_items(&self) -> &[String] {
        &self.shopping
    }

    pub fn get(&self, id: &str) -> Option<&Recipe> {
        self.recipes.iter().find(|r| r.id == id)
    }

    /// Look a recipe up by id, or by unique id prefix (as typed on the CLI)
    pub fn find(&self, id_or_prefix: &str) -> Option<&Recipe> {
        if let Some(exact) = self.get(id_or_prefix) {
            return Some(exact);
        }
        let mut matches = self
            .recipes
            .iter()
            .filter(|r| r.id.starts_with(id_or_prefix));
        match (matches.next(), matches.next()) {
            (Some(only), None) if !id_or_prefix.is_empty() => Some(only),
            _ => None,
        }
    }

    pub fn contains_title(&self, title: &str) -> bool {
        self.recipes.iter().any(|r| r.title == title)
    }

    /// Save a recipe unless one with the exact same title is already saved
    pub fn add_recipe(&mut self, recipe: Recipe) -> Option<Persist> {
        if self.contains_title(&recipe.title) {
            crate::verbose!("'{}' already saved, skipping", recipe.title);
            return None;
        }
        self.recipes.push(recipe);
        Some(Persist::Recipes)
    }

    /// Append a hand-entered dish without the title check
    pub fn append_recipe(&mut self, recipe: Recipe) -> Option<Persist> {
        self.recipes.push(recipe);
        Some(Persist::Recipes)
    }

    /// Remove the recipe with `id`; no-op when absent
    pub fn remove_recipe(&mut self, id: &str) -> Option<Persist> {
        let index = self.recipes.iter().position(|r| r.id == id)?;
        self.recipes.remove(index);
        Some(Persist::Recipes)
    }

    /// Append trimmed text; blank input is ignored
    pub fn add_shopping_item(&mut self, text: &str) -> Option<Persist> {
        let item = text.trim();
        if item.is_empty() {
            return None;
        }
        self.shopping.push(item.to_string());
        Some(Persist::ShoppingList)
    }

    /// Remove the item at `index`; out-of-range is a no-op
    pub fn remove_shopping_item(&mut self, index: usize) -> Option<Persist> {
        if index >= self.shopping.len() {
            return None;
        }
        self.shopping.remove(index);
        Some(Persist::ShoppingList)
    }

    /// Saved recipes whose title contains `query`, ignoring case
    pub fn filter(&self, query: &str) -> Vec<&Recipe> {
        let needle = query.trim().to_lowercase();
        self.recipes
            .iter()
            .filter(|r| needle.is_empty() || r.title.to_lowercase().contains(&needle))
            .collect()
    }

    /// Read-only projection of saved recipes' ingredients for the shopping view
    pub fn ingredient_groups(&self) -> Vec<IngredientGroup<'_>> {
        self.recipes
            .iter()
            .filter(|r| !r.ingredients.is_empty())
            .map(|r| IngredientGroup {
                recipe_id: &r.id,
                title: &r.title,
                ingredients: &r.ingredients,
            })
            .collect()
    }

    /// Plain-text shopping list, one item per line.
    ///
    /// With `with_recipes` the saved recipes' ingredients follow under a
    /// heading per recipe.
    pub fn shopping_text(&self, with_recipes: bool) -> String {
        let mut out = String::new();
        for item in &self.shopping {
            out.push_str("- ");
            out.push_str(item);
            out.push('\n');
        }
        if with_recipes {
            for group in self.ingredient_groups() {
                if !out.is_empty() {
                    out.push('\n');
                }
                out.push_str(group.title);
                out.push_str(":\n");
                for ingredient in group.ingredients {
                    out.push_str("- ");
                    out.push_str(ingredient);
                    out.push('\n');
                }
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recipe::RecipeDraft;
    use crate::storage::MemoryStore;

    fn recipe(title: &str) -> Recipe {
        RecipeDraft {
            title: title.into(),
            ingredients: vec!["noodles".into()],
            instructions: vec!["Boil".into()],
            ..Default::default()
        }
        .into_recipe()
        .unwrap()
    }

    #[test]
    fn duplicate_title_is_a_no_op() {
        let mut store = RecipeStore::default();
        assert_eq!(store.add_recipe(recipe("Ramen")), Some(Persist::Recipes));
        assert_eq!(store.add_recipe(recipe("Ramen")), None);
        assert_eq!(store.recipes().len(), 1);

        // exact match only
        assert!(store.add_recipe(recipe("ramen")).is_some());
        assert_eq!(store.recipes().len(), 2);
    }

    #[test]
    fn remove_by_id_removes_one() {
        let mut store = RecipeStore::default();
        let a = recipe("A");
        let id = a.id.clone();
        store.add_recipe(a);
        store.add_recipe(recipe("B"));

        assert_eq!(store.remove_recipe(&id), Some(Persist::Recipes));
        assert_eq!(store.recipes().len(), 1);
        assert_eq!(store.remove_recipe(&id), None);
        assert_eq!(store.recipes().len(), 1);
    }

    #[test]
    fn shopping_add_then_remove_first() {
        let mut store = RecipeStore::default();
        store.add_shopping_item("Milk");
        store.add_shopping_item("Eggs");
        store.remove_shopping_item(0);
        assert_eq!(store.shopping_items(), ["Eggs".to_string()]);
    }

    #[test]
    fn shopping_ignores_blank_and_trims() {
        let mut store = RecipeStore::default();
        assert_eq!(store.add_shopping_item("   "), None);
        assert_eq!(
            store.add_shopping_item("  Basil  "),
            Some(Persist::ShoppingList)
        );
        assert_eq!(store.remove_shopping_item(5), None);
        assert_eq!(store.shopping_items(), ["Basil".to_string()]);
    }

    #[test]
    fn filter_is_case_insensitive_and_non_mutating() {
        let mut store = RecipeStore::default();
        store.add_recipe(recipe("Spicy Ramen"));
        store.add_recipe(recipe("Tomato Soup"));
        store.add_recipe(recipe("Miso RAMEN bowl"));

        let hits: Vec<_> = store.filter("ramen").iter().map(|r| r.title.clone()).collect();
        assert_eq!(hits, vec!["Spicy Ramen", "Miso RAMEN bowl"]);
        assert_eq!(store.filter("").len(), 3);
        assert_eq!(store.recipes().len(), 3);
    }

    #[test]
    fn find_accepts_unique_prefix() {
        let mut store = RecipeStore::default();
        let r = recipe("Pho");
        let id = r.id.clone();
        store.add_recipe(r);

        assert_eq!(store.find(&id[..8]).map(|r| r.title.as_str()), Some("Pho"));
        assert!(store.find("").is_none());
    }

    #[test]
    fn shopping_text_lists_items_then_recipes() {
        let mut store = RecipeStore::default();
        store.add_shopping_item("Milk");
        store.add_recipe(recipe("Ramen"));

        assert_eq!(store.shopping_text(false), "- Milk\n");
        assert_eq!(
            store.shopping_text(true),
            "- Milk\n\nRamen:\n- noodles\n"
        );
        assert_eq!(RecipeStore::default().shopping_text(true), "");
    }

    #[test]
    fn persist_mirrors_collections() {
        let kv = MemoryStore::new();
        let mut store = RecipeStore::default();
        let which = store.add_recipe(recipe("Dal")).unwrap();
        store.persist(which, &kv).unwrap();
        let which = store.add_shopping_item("Lentils").unwrap();
        store.persist(which, &kv).unwrap();

        assert_eq!(RecipeStore::load(&kv), store);
    }
}
