//! Recipe data model.

use anyhow::{Context, Result};
use base64::{Engine, engine::general_purpose::STANDARD as BASE64};
use chrono::{DateTime, SubsecRound, Utc};
use serde::{Deserialize, Serialize};

/// Step used for manually entered dishes that come without instructions
pub const PLACEHOLDER_INSTRUCTION: &str = "No instructions provided.";

/// Nutrition facts as display labels ("450 kcal", "12g"), never computed
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Nutrition {
    pub calories: String,
    pub protein: String,
    pub carbs: String,
    pub fat: String,
}

/// A structured dish description.
///
/// `id` is assigned once at creation and never changes afterwards.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Recipe {
    pub id: String,
    pub title: String,
    pub description: String,
    pub ingredients: Vec<String>,
    pub instructions: Vec<String>,
    pub prep_time: String,
    pub servings: String,
    pub nutrition: Nutrition,
    /// Illustration as a `data:` URL
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub created_at: DateTime<Utc>,
}

/// Creation timestamp at the precision it is stored with
pub fn now_millis() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(3)
}

/// Fresh unique identifier for a new recipe
pub fn new_recipe_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

impl Recipe {
    /// Number of instruction steps
    pub fn step_count(&self) -> usize {
        self.instructions.len()
    }

    /// Decoded illustration, if one is attached
    pub fn illustration(&self) -> Option<Illustration> {
        self.image.as_deref().and_then(Illustration::from_data_url)
    }
}

/// A dish entered by hand in the library view.
#[derive(Debug, Clone, Default)]
pub struct RecipeDraft {
    pub title: String,
    pub description: String,
    pub ingredients: Vec<String>,
    pub instructions: Vec<String>,
    pub prep_time: String,
    pub servings: String,
}

impl RecipeDraft {
    /// Turn the draft into a recipe with a fresh id and timestamp.
    ///
    /// Blank lines are dropped; a draft without steps gets the placeholder
    /// step so cooking mode always has something to show.
    pub fn into_recipe(self) -> Result<Recipe> {
        let title = self.title.trim().to_string();
        if title.is_empty() {
            anyhow::bail!("A dish needs a title");
        }

        let mut instructions = clean_lines(self.instructions);
        if instructions.is_empty() {
            instructions.push(PLACEHOLDER_INSTRUCTION.to_string());
        }

        Ok(Recipe {
            id: new_recipe_id(),
            title,
            description: self.description.trim().to_string(),
            ingredients: clean_lines(self.ingredients),
            instructions,
            prep_time: or_dash(self.prep_time),
            servings: or_dash(self.servings),
            nutrition: Nutrition {
                calories: "-".into(),
                protein: "-".into(),
                carbs: "-".into(),
                fat: "-".into(),
            },
            image: None,
            created_at: now_millis(),
        })
    }
}

fn clean_lines(lines: Vec<String>) -> Vec<String> {
    lines
        .into_iter()
        .map(|l| l.trim().to_string())
        .filter(|l| !l.is_empty())
        .collect()
}

fn or_dash(label: String) -> String {
    let label = label.trim();
    if label.is_empty() {
        "-".to_string()
    } else {
        label.to_string()
    }
}

/// An embedded image returned by the illustration service
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Illustration {
    pub mime_type: String,
    /// Base64 payload as delivered by the service
    pub data: String,
}

impl Illustration {
    pub fn to_data_url(&self) -> String {
        format!("data:{};base64,{}", self.mime_type, self.data)
    }

    pub fn from_data_url(url: &str) -> Option<Self> {
        let rest = url.strip_prefix("data:")?;
        let (mime_type, data) = rest.split_once(";base64,")?;
        Some(Self {
            mime_type: mime_type.to_string(),
            data: data.to_string(),
        })
    }

    /// Raw image bytes
    pub fn bytes(&self) -> Result<Vec<u8>> {
        BASE64
            .decode(self.data.as_bytes())
            .context("Illustration payload is not valid base64")
    }

    /// File extension matching the MIME type
    pub fn extension(&self) -> &'static str {
        match self.mime_type.as_str() {
            "image/jpeg" | "image/jpg" => "jpg",
            "image/webp" => "webp",
            _ => "png",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Recipe {
        Recipe {
            id: "abc".into(),
            title: "Shakshuka".into(),
            description: "Eggs poached in spiced tomato".into(),
            ingredients: vec!["4 eggs".into(), "1 can tomatoes".into()],
            instructions: vec!["Simmer sauce".into(), "Crack eggs in".into()],
            prep_time: "25 mins".into(),
            servings: "2".into(),
            nutrition: Nutrition {
                calories: "320 kcal".into(),
                protein: "18g".into(),
                carbs: "14g".into(),
                fat: "20g".into(),
            },
            image: None,
            created_at: DateTime::from_timestamp_millis(1_700_000_000_123).unwrap(),
        }
    }

    #[test]
    fn serializes_with_camel_case_keys_and_millis() {
        let json = serde_json::to_value(sample()).unwrap();
        assert_eq!(json["prepTime"], "25 mins");
        assert_eq!(json["createdAt"], 1_700_000_000_123i64);
        assert!(json.get("image").is_none());
        assert_eq!(json["nutrition"]["calories"], "320 kcal");
    }

    #[test]
    fn draft_without_steps_gets_placeholder() {
        let recipe = RecipeDraft {
            title: "  Toast ".into(),
            ingredients: vec!["bread".into(), "  ".into()],
            ..Default::default()
        }
        .into_recipe()
        .unwrap();

        assert_eq!(recipe.title, "Toast");
        assert_eq!(recipe.ingredients, vec!["bread".to_string()]);
        assert_eq!(recipe.instructions, vec![PLACEHOLDER_INSTRUCTION.to_string()]);
        assert!(!recipe.id.is_empty());
    }

    #[test]
    fn stored_recipe_reloads_equal() {
        let recipe = RecipeDraft {
            title: "Toast".into(),
            ..Default::default()
        }
        .into_recipe()
        .unwrap();

        let json = serde_json::to_string(&recipe).unwrap();
        let reloaded: Recipe = serde_json::from_str(&json).unwrap();
        assert_eq!(reloaded, recipe);
    }

    #[test]
    fn draft_requires_title() {
        assert!(RecipeDraft::default().into_recipe().is_err());
    }

    #[test]
    fn data_url_round_trip() {
        let illustration = Illustration {
            mime_type: "image/png".into(),
            data: BASE64.encode([1u8, 2, 3]),
        };
        let url = illustration.to_data_url();
        assert!(url.starts_with("data:image/png;base64,"));

        let parsed = Illustration::from_data_url(&url).unwrap();
        assert_eq!(parsed, illustration);
        assert_eq!(parsed.bytes().unwrap(), vec![1, 2, 3]);
        assert!(Illustration::from_data_url("https://example.com/x.png").is_none());
    }
}
