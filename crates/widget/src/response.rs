use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Body returned by the up-conversion service.
///
/// Every field is optional. The widget only looks at `pmath`, `cmath` and `errors`; the
/// remaining annotations are kept for callers that want them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ServiceResponse {
    /// Echo of the submitted markup.
    #[serde(rename = "asciiMathML", default, skip_serializing_if = "Option::is_none")]
    pub ascii_math_ml: Option<String>,
    /// Validated presentation MathML, as an XML document string.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pmath: Option<String>,
    /// Presentation MathML with explicit bracketing.
    #[serde(rename = "pmathBracketed", default, skip_serializing_if = "Option::is_none")]
    pub pmath_bracketed: Option<String>,
    /// Content MathML source, shown next to the validated rendering. Only present when the
    /// input could be up-converted.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cmath: Option<String>,
    /// Maxima input form of the expression.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub maxima: Option<String>,
    /// Up-conversion failures. Comes with `pmath` but without `cmath`.
    #[serde(rename = "cmathFailures", default, skip_serializing_if = "Option::is_none")]
    pub cmath_failures: Option<String>,
    #[serde(rename = "maximaFailures", default, skip_serializing_if = "Option::is_none")]
    pub maxima_failures: Option<String>,
    /// Present and non-null when the service rejected the input.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub errors: Option<Value>,
}

/// What a validation response means for the validated-result view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationResult {
    Success {
        /// Markup to render in the validated-result container.
        validated_markup: String,
        /// Source text for the companion container.
        display_source: String,
    },
    Failure {
        reason: String,
    },
    /// Neither a success nor a failure; also used for transport problems.
    Unexpected,
}

impl From<ServiceResponse> for ValidationResult {
    fn from(response: ServiceResponse) -> Self {
        // `pmath` is returned even when up-conversion failed; only `cmath` marks success.
        if let (Some(pmath), Some(cmath)) = (response.pmath, response.cmath) {
            return ValidationResult::Success {
                validated_markup: pmath,
                display_source: cmath,
            };
        }
        match response.errors {
            Some(Value::String(reason)) => ValidationResult::Failure { reason },
            Some(errors) => ValidationResult::Failure {
                reason: errors.to_string(),
            },
            None => ValidationResult::Unexpected,
        }
    }
}
