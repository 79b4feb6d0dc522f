use thiserror::Error;

/// Why a validation request produced no usable response.
///
/// The widget never surfaces these to the page beyond the generic "unexpected" placeholder;
/// they exist for logging and for callers that talk to the service directly.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("request to the validation service failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("validation service answered with HTTP status {0}")]
    Status(u16),
    #[error("validation service response is not valid JSON: {0}")]
    Decode(#[from] serde_json::Error),
    /// For services that answer through a channel, such as `testing::ScriptedService`: the
    /// answering side went away without replying.
    /// [`HttpValidationService`](crate::HttpValidationService) reports lost connections as
    /// [`Transport`](Self::Transport) instead.
    #[error("validation request was dropped before a response arrived")]
    Dropped,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RegistryError {
    #[error("a widget is already registered for control \"{0}\"")]
    DuplicateControl(String),
}
