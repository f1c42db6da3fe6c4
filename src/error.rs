use thiserror::Error;

/// Failure taxonomy for the generation flow, shared by the relay and the
/// orchestrator client.
#[derive(Debug, Error)]
pub enum GenerateError {
    /// The relay has no upstream credential configured. Fatal for the
    /// request; no outbound call is attempted.
    #[error("missing GROQ API credential")]
    MissingCredential,

    /// The upstream provider answered with a non-success status.
    #[error("upstream completion request failed (status {status})")]
    UpstreamStatus { status: u16 },

    /// The relay (or the provider) could not be reached at all.
    #[error("network error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The call succeeded but the completion text yielded zero ideas.
    #[error("the completion contained no usable ideas")]
    EmptyResult,

    /// The caller sent a request the relay refuses to forward.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// The upstream envelope did not have the expected shape.
    #[error("malformed completion envelope: {0}")]
    MalformedResponse(String),
}

impl GenerateError {
    /// One user-facing line per failure class, mirroring how the web client
    /// words its toast notifications.
    pub fn user_message(&self) -> String {
        let hint = match self {
            Self::MissingCredential => "Please check your Groq API key.",
            Self::UpstreamStatus { status: 429 } => "Rate limit reached. Please wait a moment.",
            Self::UpstreamStatus { status: 402 | 403 } => {
                "Free tier quota exceeded. Try again later."
            }
            Self::Transport(_) => "Network error. Please check your connection.",
            Self::EmptyResult => "The model returned no usable ideas. Try again.",
            _ => "Please try again.",
        };
        format!("Failed to generate ideas. {hint}")
    }

    /// Whether the failing call reached the upstream provider. Used to keep
    /// the credential failure distinct from upstream trouble in logs.
    pub fn reached_upstream(&self) -> bool {
        matches!(
            self,
            Self::UpstreamStatus { .. } | Self::EmptyResult | Self::MalformedResponse(_)
        )
    }
}

/// Maps a relay error response back onto the taxonomy on the client side.
/// The relay only exposes an opaque `{"error": ...}` body, so this goes by
/// status and the credential wording the relay is known to use.
pub fn classify_relay_failure(status: u16, message: &str) -> GenerateError {
    let lowered = message.to_lowercase();
    if lowered.contains("credential") || lowered.contains("key") {
        GenerateError::MissingCredential
    } else {
        GenerateError::UpstreamStatus { status }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_messages_follow_failure_class() {
        assert!(
            GenerateError::MissingCredential
                .user_message()
                .contains("Groq API key")
        );
        assert!(
            GenerateError::UpstreamStatus { status: 429 }
                .user_message()
                .contains("Rate limit")
        );
        assert!(
            GenerateError::UpstreamStatus { status: 402 }
                .user_message()
                .contains("quota")
        );
        assert!(
            GenerateError::UpstreamStatus { status: 500 }
                .user_message()
                .contains("try again")
        );
        assert!(GenerateError::EmptyResult.user_message().contains("no usable ideas"));
    }

    #[test]
    fn relay_failures_classify_by_body_wording() {
        assert!(matches!(
            classify_relay_failure(500, "missing GROQ API credential"),
            GenerateError::MissingCredential
        ));
        assert!(matches!(
            classify_relay_failure(500, "Missing Groq API Key"),
            GenerateError::MissingCredential
        ));
        assert!(matches!(
            classify_relay_failure(429, "upstream completion request failed"),
            GenerateError::UpstreamStatus { status: 429 }
        ));
    }

    #[test]
    fn only_post_call_failures_count_as_upstream() {
        assert!(!GenerateError::MissingCredential.reached_upstream());
        assert!(GenerateError::UpstreamStatus { status: 502 }.reached_upstream());
        assert!(GenerateError::EmptyResult.reached_upstream());
    }
}
