use crate::error::{classify_relay_failure, GenerateError};
use crate::provider::ChatResponse;
use crate::{parse_ideas, Idea};
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};
use tracing::{debug, info};

/// Body sent to the relay's generation endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct GenerateRequest {
    pub niche: String,
    pub style: String,
    pub count: u32,
}

/// Error body the relay returns on failure.
#[derive(Debug, Deserialize)]
struct RelayError {
    #[serde(default)]
    error: String,
}

/// Result of one generation round.
#[derive(Debug, Clone)]
pub struct Generation {
    pub ideas: Vec<Idea>,
    pub elapsed: Duration,
}

/// Output seam for whatever surface displays ideas. The console
/// implementation lives in the CLI; tests substitute their own.
pub trait IdeaRenderer {
    fn set_loading(&mut self, loading: bool);
    fn show_ideas(&mut self, generation: &Generation);
    fn show_error(&mut self, message: &str);
}

/// Client for the relay service. Knows nothing about the upstream
/// provider beyond the shape of the passed-through envelope.
#[derive(Debug, Clone)]
pub struct IdeaClient {
    http: reqwest::Client,
    relay_url: String,
}

impl IdeaClient {
    pub fn new(relay_url: impl Into<String>) -> Self {
        let mut relay_url = relay_url.into();
        while relay_url.ends_with('/') {
            relay_url.pop();
        }
        Self {
            http: reqwest::Client::new(),
            relay_url,
        }
    }

    /// Requests a batch of ideas and segments the completion text.
    pub async fn generate(
        &self,
        niche: &str,
        style: &str,
        count: u32,
    ) -> Result<Generation, GenerateError> {
        let started = Instant::now();
        let request = GenerateRequest {
            niche: niche.to_string(),
            style: style.to_string(),
            count,
        };
        debug!(niche, style, count, relay = %self.relay_url, "requesting ideas");
        let response = self
            .http
            .post(format!("{}/generate", self.relay_url))
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body: RelayError = response.json().await.unwrap_or(RelayError {
                error: String::new(),
            });
            return Err(classify_relay_failure(status.as_u16(), &body.error));
        }

        let envelope: ChatResponse = response
            .json()
            .await
            .map_err(|err| GenerateError::MalformedResponse(err.to_string()))?;
        let text = envelope
            .first_text()
            .ok_or_else(|| GenerateError::MalformedResponse("no choices in response".to_string()))?;

        let ideas = parse_ideas(text);
        if ideas.is_empty() {
            return Err(GenerateError::EmptyResult);
        }
        let elapsed = started.elapsed();
        let elapsed_ms = elapsed.as_millis() as u64;
        info!(count = ideas.len(), elapsed_ms, "ideas generated");
        Ok(Generation { ideas, elapsed })
    }

    /// Requests a single replacement idea, for swapping out one entry
    /// without regenerating the whole batch.
    pub async fn regenerate_one(
        &self,
        niche: &str,
        style: &str,
    ) -> Result<Idea, GenerateError> {
        let generation = self.generate(niche, style, 1).await?;
        generation
            .ideas
            .into_iter()
            .next()
            .ok_or(GenerateError::EmptyResult)
    }
}

/// Runs one generation round against the given renderer: loading state
/// on, then either the ideas or a user-facing error message.
pub async fn run_generation(
    client: &IdeaClient,
    renderer: &mut dyn IdeaRenderer,
    niche: &str,
    style: &str,
    count: u32,
) {
    renderer.set_loading(true);
    let outcome = client.generate(niche, style, count).await;
    renderer.set_loading(false);
    match outcome {
        Ok(generation) => renderer.show_ideas(&generation),
        Err(err) => renderer.show_error(&err.user_message()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct RecordingRenderer {
        loading_events: Vec<bool>,
        ideas: Vec<String>,
        errors: Vec<String>,
    }

    impl IdeaRenderer for RecordingRenderer {
        fn set_loading(&mut self, loading: bool) {
            self.loading_events.push(loading);
        }

        fn show_ideas(&mut self, generation: &Generation) {
            self.ideas = generation
                .ideas
                .iter()
                .map(|idea| idea.as_str().to_string())
                .collect();
        }

        fn show_error(&mut self, message: &str) {
            self.errors.push(message.to_string());
        }
    }

    #[test]
    fn request_body_matches_the_relay_contract() {
        let request = GenerateRequest {
            niche: "fitness".to_string(),
            style: "funny".to_string(),
            count: 10,
        };
        let value = serde_json::to_value(&request).expect("serializable request");
        assert_eq!(value["niche"], "fitness");
        assert_eq!(value["style"], "funny");
        assert_eq!(value["count"], 10);
    }

    #[test]
    fn client_normalizes_trailing_slashes() {
        let client = IdeaClient::new("http://127.0.0.1:3000//");
        assert_eq!(client.relay_url, "http://127.0.0.1:3000");
    }

    #[test]
    fn relay_error_body_tolerates_missing_field() {
        let body: RelayError = serde_json::from_str("{}").expect("decodable");
        assert_eq!(body.error, "");
    }

    #[tokio::test]
    async fn transport_failures_reach_the_renderer_as_messages() {
        // Nothing listens on this port; the request fails in transport.
        let client = IdeaClient::new("http://127.0.0.1:1");
        let mut renderer = RecordingRenderer::default();
        run_generation(&client, &mut renderer, "fitness", "funny", 3).await;
        assert_eq!(renderer.loading_events, vec![true, false]);
        assert!(renderer.ideas.is_empty());
        assert_eq!(renderer.errors.len(), 1);
        assert!(renderer.errors[0].starts_with("Failed to generate ideas."));
    }
}
