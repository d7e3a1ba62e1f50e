//! Dish illustration via Imagen.

use anyhow::{Context, Result};

use super::GeminiProvider;
use super::wire::{PredictInstance, PredictParameters, PredictRequest, PredictResponse};
use crate::recipe::Illustration;

const ASPECT_RATIO: &str = "1:1";

fn illustration_prompt(title: &str) -> String {
    format!(
        "A professional, appetizing food photograph of {}, \
         plated and served, soft natural light, shallow depth of field.",
        title.trim()
    )
}

pub(super) async fn illustrate(provider: &GeminiProvider, title: &str) -> Result<Illustration> {
    if title.trim().is_empty() {
        anyhow::bail!("Cannot illustrate a recipe without a title");
    }

    let body = PredictRequest {
        instances: vec![PredictInstance {
            prompt: illustration_prompt(title),
        }],
        parameters: PredictParameters {
            sample_count: 1,
            aspect_ratio: ASPECT_RATIO,
        },
    };

    let response: PredictResponse = provider
        .post(&provider.image_model, "predict", &body)
        .await
        .context("Illustration request failed")?;

    illustration_from_response(response)
}

fn illustration_from_response(response: PredictResponse) -> Result<Illustration> {
    let prediction = response
        .predictions
        .into_iter()
        .find(|p| p.bytes_base64_encoded.is_some())
        .context("Illustration service returned no image")?;

    let illustration = Illustration {
        mime_type: prediction
            .mime_type
            .unwrap_or_else(|| "image/png".to_string()),
        data: prediction.bytes_base64_encoded.unwrap_or_default(),
    };
    crate::verbose!(
        "Received {} illustration ({:.1} KB base64)",
        illustration.mime_type,
        illustration.data.len() as f64 / 1024.0
    );
    Ok(illustration)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_asks_for_one_square_image() {
        let body = PredictRequest {
            instances: vec![PredictInstance {
                prompt: illustration_prompt("Pad Thai"),
            }],
            parameters: PredictParameters {
                sample_count: 1,
                aspect_ratio: ASPECT_RATIO,
            },
        };
        let json = serde_json::to_value(body).unwrap();
        assert_eq!(json["parameters"]["aspectRatio"], "1:1");
        assert_eq!(json["parameters"]["sampleCount"], 1);
        assert!(
            json["instances"][0]["prompt"]
                .as_str()
                .unwrap()
                .contains("Pad Thai")
        );
    }

    #[test]
    fn reads_first_prediction() {
        let response: PredictResponse = serde_json::from_str(
            r#"{"predictions": [{"bytesBase64Encoded": "iVBORw0K", "mimeType": "image/png"}]}"#,
        )
        .unwrap();
        let illustration = illustration_from_response(response).unwrap();
        assert_eq!(illustration.to_data_url(), "data:image/png;base64,iVBORw0K");
    }

    #[test]
    fn empty_predictions_fail() {
        let response: PredictResponse = serde_json::from_str("{}").unwrap();
        assert!(illustration_from_response(response).is_err());
    }
}
