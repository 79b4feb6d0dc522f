//! Live preview and server-side validation for ASCIIMath input controls.
//!
//! Each [`Widget`] watches one text input. When its content changes, the widget shows a
//! pending placeholder, waits for typing to pause for [`DEBOUNCE_DELAY`], renders the parsed
//! expression as MathML into a preview container and sends the same markup to a
//! [`ValidationService`]. Only the response to the most recent request is ever shown; older
//! responses are dropped whenever they arrive. On form submission the markup is written into
//! a hidden field synchronously.
//!
//! The widget does not talk to a browser directly. The page, the parser, the service and the
//! event loop are supplied as [`Capabilities`], which makes the whole pipeline testable
//! without one:
//!
//! ```rust
//! use asciimath_widget::testing::{Recorded, TestBed, success};
//! use asciimath_widget::{Widget, WidgetConfig, WidgetControls};
//! use markup::{Element, MarkupNode};
//! use std::rc::Rc;
//!
//! let parser = |input: &str| -> MarkupNode {
//!     Element::new("math").with_child(Element::new("mi").with_text(input)).into()
//! };
//! let bed = TestBed::new();
//! bed.host.set_input("in", "x");
//!
//! let controls = WidgetControls::new("in", "out", "preview", "validated");
//! let widget = Widget::new(controls, Rc::new(WidgetConfig::default()), bed.capabilities(parser));
//! widget.initialize();
//!
//! for request in bed.service.take_requests() {
//!     request.respond(success("<math><mi>x</mi></math>", "<apply/>"));
//! }
//! bed.runtime.run_until_stalled();
//! assert_eq!(
//!     bed.host.container("validated"),
//!     Some(Recorded::Markup("<math><mi>x</mi></math>".to_string()))
//! );
//! ```
//!
//! # Features
//!
//! - `test-util`: enables the [`testing`] module.
//!
mod change;
mod config;
mod debounce;
mod error;
mod host;
mod parser;
mod registry;
mod response;
mod runtime;
mod service;
mod supersede;
#[cfg(any(test, feature = "test-util"))]
pub mod testing;
mod widget;

use std::time::Duration;

pub use self::change::ChangeDetector;
pub use self::config::{DEFAULT_SERVICE_URL, Placeholders, ServiceTransport, WidgetConfig};
pub use self::debounce::{Debouncer, TimerId};
pub use self::error::{RegistryError, ServiceError};
pub use self::host::{Content, WidgetHost};
pub use self::parser::{ExpressionParser, escape_backticks};
pub use self::registry::WidgetRegistry;
pub use self::response::{ServiceResponse, ValidationResult};
pub use self::runtime::Runtime;
pub use self::service::{HttpValidationService, QUERY_PARAMETER, ValidationService};
pub use self::supersede::{RequestToken, RequestTracker};
pub use self::widget::{Capabilities, Widget, WidgetControls, WidgetPhase};

pub use markup::LineEnding;

/// How long the input must stay unchanged before the preview is refreshed.
pub const DEBOUNCE_DELAY: Duration = Duration::from_millis(500);
