use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::models::{CounterpartEntry, MatchQuery};

/// Errors that can occur when talking to the generative oracle
#[derive(Debug, Error)]
pub enum OracleError {
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("oracle call timed out")]
    Timeout,

    #[error("API returned error: {0}")]
    Api(String),

    #[error("model not found: {0}")]
    ModelGone(String),
}

/// The engine treats the oracle as a pure text-completion function; it owns
/// no knowledge of the oracle's configuration beyond this call.
#[async_trait]
pub trait Oracle: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<String, OracleError>;
}

/// Gemini REST client.
///
/// Every call carries a request timeout; an unresponsive oracle must not
/// block the fallback cascade.
pub struct GeminiClient {
    client: Client,
    base_url: String,
    api_key: String,
    model: String,
}

impl GeminiClient {
    pub fn new(base_url: String, api_key: String, model: String, timeout_secs: u64) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            client,
            base_url,
            api_key,
            model,
        }
    }
}

#[async_trait]
impl Oracle for GeminiClient {
    async fn generate(&self, prompt: &str) -> Result<String, OracleError> {
        let url = format!(
            "{}/models/{}:generateContent?key={}",
            self.base_url.trim_end_matches('/'),
            self.model,
            urlencoding::encode(&self.api_key)
        );

        let payload = serde_json::json!({
            "contents": [{ "parts": [{ "text": prompt }] }]
        });

        let response = self
            .client
            .post(&url)
            .json(&payload)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    OracleError::Timeout
                } else {
                    OracleError::Request(e)
                }
            })?;

        if response.status() == StatusCode::NOT_FOUND {
            return Err(OracleError::ModelGone(self.model.clone()));
        }
        if !response.status().is_success() {
            return Err(OracleError::Api(format!(
                "generation failed: {}",
                response.status()
            )));
        }

        let json: Value = response.json().await?;
        json.pointer("/candidates/0/content/parts/0/text")
            .and_then(Value::as_str)
            .map(str::to_string)
            .ok_or_else(|| OracleError::Api("no text candidate in response".into()))
    }
}

/// Extract structured JSON from free-form oracle output.
///
/// Slices from the first `{`/`[` to the last `}`/`]` and parses. The only
/// defense against an LLM wrapping JSON in prose or markdown fences; any
/// failure yields `None`, never an error.
pub fn extract_json(text: &str) -> Option<Value> {
    let start = [text.find('{'), text.find('[')]
        .into_iter()
        .flatten()
        .min()?;
    let end = [text.rfind('}'), text.rfind(']')]
        .into_iter()
        .flatten()
        .max()?;
    if end < start {
        return None;
    }
    serde_json::from_str(&text[start..=end]).ok()
}

/// Oracle verdict on a single offer/counterpart pairing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchAnalysis {
    pub score: f64,
    pub reasons: Vec<String>,
    #[serde(default)]
    pub consultation: Option<String>,
}

/// A counterpart synthesized by the oracle, scores and reasons embedded.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SynthesizedCounterpart {
    #[serde(rename = "companyName", alias = "factoryName")]
    pub company_name: String,
    pub city: String,
    #[serde(rename = "pricePerKg", default)]
    pub price_per_kg: Option<f64>,
    #[serde(rename = "compatibilityScore")]
    pub compatibility_score: f64,
    pub reasons: Vec<String>,
    #[serde(rename = "requiredQuantity", default)]
    pub required_quantity: Option<f64>,
}

/// AI-augmented discovery facade with a process-lifetime circuit breaker.
///
/// The breaker transitions one way only (available -> unavailable, on a
/// "model gone" class of error) and never resets. Relaxed atomics suffice:
/// two concurrent calls both observing "available" and both failing once
/// more is a benign race.
pub struct AiDiscovery {
    oracle: Option<Arc<dyn Oracle>>,
    available: AtomicBool,
}

impl AiDiscovery {
    pub fn new(oracle: Arc<dyn Oracle>) -> Self {
        Self {
            oracle: Some(oracle),
            available: AtomicBool::new(true),
        }
    }

    /// For deployments without an oracle configured: every call returns
    /// `None` immediately and the cascade falls through.
    pub fn disabled() -> Self {
        Self {
            oracle: None,
            available: AtomicBool::new(false),
        }
    }

    pub fn is_available(&self) -> bool {
        self.oracle.is_some() && self.available.load(Ordering::Relaxed)
    }

    async fn generate_checked(&self, prompt: &str) -> Option<String> {
        let oracle = self.oracle.as_ref()?;
        if !self.available.load(Ordering::Relaxed) {
            return None;
        }
        match oracle.generate(prompt).await {
            Ok(text) => Some(text),
            Err(OracleError::ModelGone(model)) => {
                tracing::warn!(
                    "oracle model '{}' gone, disabling AI discovery for the rest of this process",
                    model
                );
                self.available.store(false, Ordering::Relaxed);
                None
            }
            Err(e) => {
                tracing::warn!("oracle call failed, falling back: {}", e);
                None
            }
        }
    }

    /// Ask the oracle to judge one pairing. Advisory only; `None` on any
    /// failure and the caller falls back to deterministic scoring.
    pub async fn analyze_match(
        &self,
        query: &MatchQuery,
        counterpart: &CounterpartEntry,
    ) -> Option<MatchAnalysis> {
        let prompt = format!(
            "Analyze compatibility for a circular economy.\n\
             Waste: {} ({}kg) at {}.\n\
             Buyer: {} at {}.\n\
             Return ONLY a JSON object: {{\"score\": number, \"reasons\": string[], \"consultation\": string}}",
            query.material_type,
            query.quantity_kg,
            query.city,
            counterpart.company_name,
            counterpart.city
        );

        let text = self.generate_checked(&prompt).await?;
        let value = extract_json(&text)?;
        let analysis: MatchAnalysis = serde_json::from_value(value).ok()?;
        if !(0.0..=100.0).contains(&analysis.score) {
            return None;
        }
        Some(analysis)
    }

    /// Ask the oracle to synthesize realistic buyers for an offer.
    pub async fn discover_buyers(&self, query: &MatchQuery) -> Option<Vec<SynthesizedCounterpart>> {
        let prompt = format!(
            "Find 3 realistic industrial buyers in India for:\n\
             Material: {}\n\
             Quantity: {} kg\n\
             Location: {}\n\n\
             Return ONLY a JSON array of 3 objects: [{{\"companyName\": \"...\", \"city\": \"...\", \
             \"pricePerKg\": number, \"compatibilityScore\": number, \
             \"reasons\": [\"...\", \"...\", \"...\"], \"requiredQuantity\": number}}]",
            query.material_type,
            query.quantity_kg,
            non_empty_or(&query.city, "Mumbai"),
        );
        self.discover(&prompt).await
    }

    /// Mirror of `discover_buyers` for the supplier-discovery direction.
    pub async fn discover_suppliers(
        &self,
        query: &MatchQuery,
    ) -> Option<Vec<SynthesizedCounterpart>> {
        let prompt = format!(
            "Find 3 realistic industrial suppliers in India offering:\n\
             Material: {}\n\
             Quantity needed: {} kg\n\
             Location: {}\n\n\
             Return ONLY a JSON array of 3 objects: [{{\"companyName\": \"...\", \"city\": \"...\", \
             \"pricePerKg\": number, \"compatibilityScore\": number, \
             \"reasons\": [\"...\", \"...\", \"...\"], \"requiredQuantity\": number}}]",
            query.material_type,
            query.quantity_kg,
            non_empty_or(&query.city, "Mumbai"),
        );
        self.discover(&prompt).await
    }

    async fn discover(&self, prompt: &str) -> Option<Vec<SynthesizedCounterpart>> {
        let text = self.generate_checked(prompt).await?;
        let value = extract_json(&text)?;
        validate_candidates(value)
    }
}

/// Shape validation for synthesized candidates. The oracle is untrusted free
/// text: a non-array, an empty array, or any element with a missing field or
/// out-of-range score rejects the whole result. No partial salvage.
fn validate_candidates(value: Value) -> Option<Vec<SynthesizedCounterpart>> {
    let items = value.as_array()?;
    if items.is_empty() {
        return None;
    }
    let mut out = Vec::with_capacity(items.len());
    for item in items {
        let candidate: SynthesizedCounterpart = serde_json::from_value(item.clone()).ok()?;
        if candidate.company_name.trim().is_empty() {
            return None;
        }
        if !(0.0..=100.0).contains(&candidate.compatibility_score) {
            return None;
        }
        out.push(candidate);
    }
    Some(out)
}

fn non_empty_or<'a>(s: &'a str, fallback: &'a str) -> &'a str {
    if s.trim().is_empty() {
        fallback
    } else {
        s
    }
}
