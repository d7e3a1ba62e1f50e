//! Structured recipe generation.

use base64::{Engine, engine::general_purpose::STANDARD as BASE64};
use serde::Deserialize;
use serde_json::json;

use super::GeminiProvider;
use super::wire::{Content, GenerateContentRequest, GenerateContentResponse, InlineData, Part};
use crate::provider::{GenerationError, GenerationRequest};
use crate::recipe::{Nutrition, Recipe, new_recipe_id, now_millis};

const SYSTEM_INSTRUCTION: &str = "You are a professional chef. \
Reply with one complete recipe that a home cook can follow. \
Keep ingredient lines short and include quantities. \
Write each instruction as a single actionable step.";

/// Response schema sent with every generation request; all fields required
fn recipe_schema() -> serde_json::Value {
    let string = json!({ "type": "STRING" });
    let string_list = json!({ "type": "ARRAY", "items": { "type": "STRING" } });
    json!({
        "type": "OBJECT",
        "properties": {
            "title": string,
            "description": string,
            "prepTime": string,
            "servings": string,
            "nutrition": {
                "type": "OBJECT",
                "properties": {
                    "calories": string,
                    "protein": string,
                    "carbs": string,
                    "fat": string
                },
                "required": ["calories", "protein", "carbs", "fat"]
            },
            "ingredients": string_list,
            "instructions": string_list
        },
        "required": [
            "title", "description", "prepTime", "servings",
            "nutrition", "ingredients", "instructions"
        ]
    })
}

fn build_request(request: &GenerationRequest) -> GenerateContentRequest {
    let mut parts = Vec::with_capacity(2);
    if let Some(image) = &request.image {
        parts.push(Part::Inline {
            inline_data: InlineData {
                mime_type: image.mime_type.clone(),
                data: BASE64.encode(&image.bytes),
            },
        });
    }
    parts.push(Part::text(request.prompt()));

    GenerateContentRequest {
        contents: vec![Content::user(parts)],
        system_instruction: Some(Content::system(SYSTEM_INSTRUCTION)),
        generation_config: Some(json!({
            "responseMimeType": "application/json",
            "responseSchema": recipe_schema(),
        })),
    }
}

pub(super) async fn generate_recipe(
    provider: &GeminiProvider,
    request: &GenerationRequest,
) -> Result<Recipe, GenerationError> {
    if request.is_empty() {
        return Err(GenerationError::EmptyRequest);
    }

    crate::verbose!(
        "Generating recipe with {} (image: {})",
        provider.text_model,
        request
            .image
            .as_ref()
            .map(|i| format!("{:.1} KB", i.bytes.len() as f64 / 1024.0))
            .unwrap_or_else(|| "none".into())
    );

    let body = build_request(request);
    let response: GenerateContentResponse = provider
        .post(&provider.text_model, "generateContent", &body)
        .await?;

    let text = response.first_text().ok_or(GenerationError::EmptyResponse)?;
    parse_recipe_payload(&text)
}

/// Recipe as the model returns it, before validation
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RecipePayload {
    title: Option<String>,
    description: Option<String>,
    prep_time: Option<String>,
    servings: Option<serde_json::Value>,
    nutrition: Option<NutritionPayload>,
    ingredients: Option<Vec<String>>,
    instructions: Option<Vec<String>>,
}

#[derive(Debug, Deserialize)]
struct NutritionPayload {
    calories: Option<serde_json::Value>,
    protein: Option<serde_json::Value>,
    carbs: Option<serde_json::Value>,
    fat: Option<serde_json::Value>,
}

/// Parse and validate a generation payload into a new recipe.
///
/// Every required field is checked: the schema is requested but the reply is
/// not trusted. Tolerates a ```json fence around the object and numbers where
/// labels were expected.
pub fn parse_recipe_payload(text: &str) -> Result<Recipe, GenerationError> {
    let payload: RecipePayload = serde_json::from_str(strip_code_fence(text))?;

    let title = required_text(payload.title, "title")?;
    let description = required_text(payload.description, "description")?;
    let prep_time = required_text(payload.prep_time, "prepTime")?;
    let servings = required_label(payload.servings, "servings")?;

    let nutrition = payload
        .nutrition
        .ok_or(GenerationError::MissingField("nutrition"))?;
    let nutrition = Nutrition {
        calories: required_label(nutrition.calories, "nutrition.calories")?,
        protein: required_label(nutrition.protein, "nutrition.protein")?,
        carbs: required_label(nutrition.carbs, "nutrition.carbs")?,
        fat: required_label(nutrition.fat, "nutrition.fat")?,
    };

    let ingredients = required_list(payload.ingredients, "ingredients")?;
    let instructions = required_list(payload.instructions, "instructions")?;

    Ok(Recipe {
        id: new_recipe_id(),
        title,
        description,
        ingredients,
        instructions,
        prep_time,
        servings,
        nutrition,
        image: None,
        created_at: now_millis(),
    })
}

fn strip_code_fence(text: &str) -> &str {
    let trimmed = text.trim();
    trimmed
        .strip_prefix("```json")
        .or_else(|| trimmed.strip_prefix("```"))
        .and_then(|rest| rest.strip_suffix("```"))
        .map(str::trim)
        .unwrap_or(trimmed)
}

fn required_text(value: Option<String>, field: &'static str) -> Result<String, GenerationError> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .ok_or(GenerationError::MissingField(field))
}

fn required_label(
    value: Option<serde_json::Value>,
    field: &'static str,
) -> Result<String, GenerationError> {
    let label = match value {
        Some(serde_json::Value::String(s)) => s.trim().to_string(),
        Some(serde_json::Value::Number(n)) => n.to_string(),
        _ => String::new(),
    };
    if label.is_empty() {
        return Err(GenerationError::MissingField(field));
    }
    Ok(label)
}

fn required_list(
    value: Option<Vec<String>>,
    field: &'static str,
) -> Result<Vec<String>, GenerationError> {
    let items: Vec<String> = value
        .unwrap_or_default()
        .into_iter()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect();
    if items.is_empty() {
        return Err(GenerationError::MissingField(field));
    }
    Ok(items)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capture::StillImage;

    const RAMEN: &str = r#"{
        "title": "Spicy Miso Ramen",
        "description": "A rich, fiery bowl.",
        "prepTime": "30 mins",
        "servings": 2,
        "nutrition": {"calories": "620 kcal", "protein": "28g", "carbs": "70g", "fat": 22},
        "ingredients": ["200g ramen noodles", "2 tbsp chili paste", "  "],
        "instructions": ["Boil noodles", "Mix broth", "Assemble"]
    }"#;

    #[test]
    fn parses_complete_payload() {
        let before = now_millis();
        let recipe = parse_recipe_payload(RAMEN).unwrap();

        assert_eq!(recipe.title, "Spicy Miso Ramen");
        assert_eq!(recipe.servings, "2");
        assert_eq!(recipe.nutrition.fat, "22");
        assert_eq!(recipe.ingredients.len(), 2);
        assert_eq!(recipe.instructions.len(), 3);
        assert!(!recipe.id.is_empty());
        assert!(recipe.created_at >= before);
        assert!(recipe.image.is_none());
    }

    #[test]
    fn every_parse_gets_a_new_id() {
        let a = parse_recipe_payload(RAMEN).unwrap();
        let b = parse_recipe_payload(RAMEN).unwrap();
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn accepts_fenced_json() {
        let fenced = format!("```json\n{RAMEN}\n```");
        assert!(parse_recipe_payload(&fenced).is_ok());
    }

    #[test]
    fn rejects_missing_instructions() {
        let payload = RAMEN.replace(
            r#""instructions": ["Boil noodles", "Mix broth", "Assemble"]"#,
            r#""instructions": []"#,
        );
        assert!(matches!(
            parse_recipe_payload(&payload),
            Err(GenerationError::MissingField("instructions"))
        ));
    }

    #[test]
    fn rejects_missing_nutrition_field() {
        let payload = RAMEN.replace(r#""protein": "28g", "#, "");
        assert!(matches!(
            parse_recipe_payload(&payload),
            Err(GenerationError::MissingField("nutrition.protein"))
        ));
    }

    #[test]
    fn rejects_non_json() {
        assert!(matches!(
            parse_recipe_payload("Sorry, I can't help with that."),
            Err(GenerationError::Parse(_))
        ));
    }

    #[test]
    fn text_request_has_single_part_and_schema() {
        let body = serde_json::to_value(build_request(&GenerationRequest::text("spicy ramen")))
            .unwrap();
        let parts = body["contents"][0]["parts"].as_array().unwrap();
        assert_eq!(parts.len(), 1);
        assert_eq!(parts[0]["text"], "Create a recipe for: spicy ramen");
        assert_eq!(
            body["generationConfig"]["responseMimeType"],
            "application/json"
        );
        assert_eq!(
            body["generationConfig"]["responseSchema"]["required"]
                .as_array()
                .unwrap()
                .len(),
            7
        );
        assert!(body["systemInstruction"]["parts"][0]["text"].is_string());
    }

    #[test]
    fn image_request_puts_inline_jpeg_first() {
        let request =
            GenerationRequest::with_image("dinner", StillImage::jpeg(vec![0xFF, 0xD8, 0xFF]));
        let body = serde_json::to_value(build_request(&request)).unwrap();
        let parts = body["contents"][0]["parts"].as_array().unwrap();
        assert_eq!(parts.len(), 2);
        assert_eq!(parts[0]["inlineData"]["mimeType"], "image/jpeg");
        assert_eq!(parts[0]["inlineData"]["data"], "/9j/");
        assert!(parts[1]["text"].as_str().unwrap().ends_with("dinner"));
    }
}
