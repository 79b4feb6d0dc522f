use serde::{Deserialize, Serialize};
use strum_macros::IntoStaticStr;

use markup::LineEnding;

/// Default location of the up-conversion service, relative to the page.
pub const DEFAULT_SERVICE_URL: &str = "/snuggletex/ASCIIMathMLUpConversionService";

/// How the serialized markup travels to the validation service.
///
/// Deployments of the service accept both forms; which one a page uses is a compatibility
/// decision, so it is configured explicitly rather than guessed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, IntoStaticStr, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ServiceTransport {
    /// The markup is the raw request body.
    #[default]
    #[strum(serialize = "POST")]
    Post,
    /// The markup is sent as the `asciiMathML` query parameter, with line breaks removed.
    #[strum(serialize = "GET")]
    Get,
}

/// Texts shown in the validated-result container while no validated markup is available.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct Placeholders {
    /// Shown from the moment an edit is noticed until its response arrives.
    pub pending: String,
    /// Shown when the service reports errors for the input.
    pub failure: String,
    /// Shown when the response is neither a success nor a failure, or never arrives.
    pub unexpected: String,
}

impl Default for Placeholders {
    fn default() -> Self {
        Placeholders {
            pending: "...".to_string(),
            failure: "?".to_string(),
            unexpected: "UNEXPECTED ERROR".to_string(),
        }
    }
}

/// Configuration shared by all widgets of a page.
///
/// # Example usage
///
/// ```rust
/// use asciimath_widget::{ServiceTransport, WidgetConfig};
///
/// let config = WidgetConfig {
///     service_url: "https://example.org/upconvert".to_string(),
///     transport: ServiceTransport::Get,
///     ..Default::default()
/// };
/// assert_eq!(config.placeholders.failure, "?");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct WidgetConfig {
    /// Endpoint of the validation service.
    pub service_url: String,
    pub transport: ServiceTransport,
    /// Line break used when serializing the parsed expression.
    pub line_ending: LineEnding,
    pub placeholders: Placeholders,
}

impl Default for WidgetConfig {
    fn default() -> Self {
        WidgetConfig {
            service_url: DEFAULT_SERVICE_URL.to_string(),
            transport: ServiceTransport::default(),
            line_ending: LineEnding::default(),
            placeholders: Placeholders::default(),
        }
    }
}
