use anyhow::{Context, anyhow};
use serde::{Deserialize, Serialize};

const GEMINI_API_URL: &str =
    "https://generativelanguage.googleapis.com/v1beta/models/gemini-pro:generateContent";

/// Upper bound on the text handed to the generation service in one call.
pub const MAX_CHUNK_CHARS: usize = 2000;

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct QaPair {
    pub question: String,
    pub answer: String,
}

/// Client for the question/answer generation service. The API key comes
/// from `GEMINI_API_KEY`; without one the client generates nothing, which
/// keeps local development off the network.
#[derive(Clone)]
pub struct GeneratorClient {
    http: reqwest::Client,
    api_key: Option<String>,
}

impl GeneratorClient {
    pub fn from_env() -> Self {
        GeneratorClient {
            http: reqwest::Client::new(),
            api_key: std::env::var("GEMINI_API_KEY").ok(),
        }
    }

    /// Question/answer pairs for one chunk of text. Transport or payload
    /// failures degrade to an empty batch; the service may also
    /// legitimately return none.
    pub async fn flashcards_for_chunk(&self, chunk: &str) -> Vec<QaPair> {
        let Some(api_key) = &self.api_key else {
            return Vec::new();
        };

        match self.request_chunk(api_key, chunk).await {
            Ok(content) => parse_flashcards(&content),
            Err(e) => {
                log::warn!("Flashcard generation failed: {e:#}");
                Vec::new()
            }
        }
    }

    async fn request_chunk(&self, api_key: &str, chunk: &str) -> anyhow::Result<String> {
        let prompt = format!(
            "Create up to 5 flashcards from this text.\n\
             Return ONLY JSON in this format:\n\
             [\n\
               {{\"question\": \"Q1\", \"answer\": \"A1\"}},\n\
               {{\"question\": \"Q2\", \"answer\": \"A2\"}}\n\
             ]\n\n\
             Text:\n{chunk}"
        );
        let body = serde_json::json!({
            "contents": [{ "parts": [{ "text": prompt }] }]
        });

        let response = self
            .http
            .post(format!("{GEMINI_API_URL}?key={api_key}"))
            .json(&body)
            .send()
            .await
            .context("generation request failed")?
            .error_for_status()
            .context("generation service returned an error status")?;

        let payload: serde_json::Value =
            response.json().await.context("generation payload was not JSON")?;

        payload
            .pointer("/candidates/0/content/parts/0/text")
            .and_then(|text| text.as_str())
            .map(str::to_owned)
            .ok_or_else(|| anyhow!("generation payload carries no text"))
    }
}

/// Splits text into sentence-aligned chunks below `max_chars`.
pub fn chunk_text(text: &str, max_chars: usize) -> Vec<String> {
    if text.trim().is_empty() {
        return Vec::new();
    }

    let mut chunks = Vec::new();
    let mut current = String::new();

    for sentence in text.split(". ") {
        if current.len() + sentence.len() < max_chars {
            current.push_str(sentence);
            current.push_str(". ");
        } else {
            if !current.is_empty() {
                chunks.push(current.trim().to_string());
            }
            current = format!("{sentence}. ");
        }
    }
    if !current.is_empty() {
        chunks.push(current.trim().to_string());
    }

    chunks
}

/// Extracts QA pairs from the model's reply. The reply should be a JSON
/// array, but models wrap it in prose or fences often enough that the
/// outermost bracketed slice is tried as a fallback. Items without both
/// fields are dropped; garbage yields an empty batch.
pub fn parse_flashcards(content: &str) -> Vec<QaPair> {
    let value = serde_json::from_str::<serde_json::Value>(content)
        .ok()
        .or_else(|| {
            let start = content.find('[')?;
            let end = content.rfind(']')?;
            if start >= end {
                return None;
            }
            serde_json::from_str(&content[start..=end]).ok()
        });

    let Some(serde_json::Value::Array(items)) = value else {
        return Vec::new();
    };

    items
        .into_iter()
        .filter_map(|item| {
            let question = item.get("question")?.as_str()?.to_owned();
            let answer = item.get("answer")?.as_str()?.to_owned();
            Some(QaPair { question, answer })
        })
        .collect()
}
