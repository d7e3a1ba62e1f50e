//! Step narration via the Gemini TTS model.

use anyhow::{Context, Result};
use base64::{Engine, engine::general_purpose::STANDARD as BASE64};
use serde_json::json;

use super::GeminiProvider;
use super::wire::{Content, GenerateContentRequest, GenerateContentResponse, Part};

fn build_request(text: &str, voice: &str) -> GenerateContentRequest {
    GenerateContentRequest {
        contents: vec![Content::user(vec![Part::text(text.trim())])],
        system_instruction: None,
        generation_config: Some(json!({
            "responseModalities": ["AUDIO"],
            "speechConfig": {
                "voiceConfig": {
                    "prebuiltVoiceConfig": { "voiceName": voice }
                }
            }
        })),
    }
}

pub(super) async fn synthesize(provider: &GeminiProvider, text: &str) -> Result<Vec<u8>> {
    if text.trim().is_empty() {
        anyhow::bail!("Nothing to narrate");
    }

    let body = build_request(text, &provider.voice);
    let response: GenerateContentResponse = provider
        .post(&provider.tts_model, "generateContent", &body)
        .await
        .context("Speech request failed")?;

    audio_from_response(&response)
}

fn audio_from_response(response: &GenerateContentResponse) -> Result<Vec<u8>> {
    let blob = response
        .first_inline_data()
        .context("Speech service returned no audio")?;
    crate::verbose!("Received speech payload ({})", blob.mime_type);

    BASE64
        .decode(blob.data.as_bytes())
        .context("Speech payload is not valid base64")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_selects_audio_and_voice() {
        let json = serde_json::to_value(build_request("Chop the onions.", "Kore")).unwrap();
        assert_eq!(json["contents"][0]["parts"][0]["text"], "Chop the onions.");
        assert_eq!(json["generationConfig"]["responseModalities"][0], "AUDIO");
        assert_eq!(
            json["generationConfig"]["speechConfig"]["voiceConfig"]["prebuiltVoiceConfig"]
                ["voiceName"],
            "Kore"
        );
        assert!(json.get("systemInstruction").is_none());
    }

    #[test]
    fn decodes_inline_audio() {
        let encoded = BASE64.encode([0x00u8, 0x80, 0xFF, 0x7F]);
        let response: GenerateContentResponse = serde_json::from_value(json!({
            "candidates": [{
                "content": {"parts": [{"inlineData": {"mimeType": "audio/L16;rate=24000", "data": encoded}}]}
            }]
        }))
        .unwrap();
        assert_eq!(
            audio_from_response(&response).unwrap(),
            vec![0x00, 0x80, 0xFF, 0x7F]
        );
    }

    #[test]
    fn missing_audio_is_an_error() {
        let response: GenerateContentResponse =
            serde_json::from_value(json!({"candidates": []})).unwrap();
        assert!(audio_from_response(&response).is_err());
    }
}
