use std::cell::RefCell;
use std::rc::{Rc, Weak};

use markup::serialize_with;
use strum_macros::IntoStaticStr;
use tracing::{debug, warn};

use crate::DEBOUNCE_DELAY;
use crate::change::ChangeDetector;
use crate::config::WidgetConfig;
use crate::debounce::Debouncer;
use crate::host::{Content, WidgetHost};
use crate::parser::{ExpressionParser, escape_backticks};
use crate::response::ValidationResult;
use crate::runtime::Runtime;
use crate::service::ValidationService;
use crate::supersede::{RequestToken, RequestTracker};

/// Element ids of the controls that make up one widget.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WidgetControls {
    /// The text input the user types ASCIIMath into. Also identifies the widget.
    pub input: String,
    /// Hidden form field that receives the serialized markup on submission.
    pub output: String,
    /// Container for the locally rendered preview.
    pub preview: String,
    /// Container for the markup returned by the validation service.
    pub validated: String,
    /// Optional container echoing the preview's markup as text.
    pub preview_source: Option<String>,
    /// Optional container echoing the validated result's source as text.
    pub validated_source: Option<String>,
}

impl WidgetControls {
    pub fn new(
        input: impl Into<String>,
        output: impl Into<String>,
        preview: impl Into<String>,
        validated: impl Into<String>,
    ) -> Self {
        WidgetControls {
            input: input.into(),
            output: output.into(),
            preview: preview.into(),
            validated: validated.into(),
            preview_source: None,
            validated_source: None,
        }
    }

    pub fn with_preview_source(mut self, id: impl Into<String>) -> Self {
        self.preview_source = Some(id.into());
        self
    }

    pub fn with_validated_source(mut self, id: impl Into<String>) -> Self {
        self.validated_source = Some(id.into());
        self
    }
}

/// Everything a widget needs from its environment.
#[derive(Clone)]
pub struct Capabilities {
    pub host: Rc<dyn WidgetHost>,
    pub parser: Rc<dyn ExpressionParser>,
    pub service: Rc<dyn ValidationService>,
    pub runtime: Rc<dyn Runtime>,
}

/// Where a widget is in its edit cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, IntoStaticStr)]
pub enum WidgetPhase {
    /// Nothing scheduled and nothing outstanding.
    Idle,
    /// An edit was noticed and the refresh timer is armed.
    PendingDebounce,
    /// A validation request was sent and its response has not been applied yet.
    AwaitingResponse,
}

struct WidgetInner {
    controls: WidgetControls,
    config: Rc<WidgetConfig>,
    caps: Capabilities,
    changes: RefCell<ChangeDetector>,
    debouncer: Debouncer,
    requests: RefCell<RequestTracker>,
}

/// One input control together with its preview, validation and submission behaviour.
///
/// Cloning a `Widget` yields another handle to the same widget. Timers and response
/// handlers only hold weak references, so dropping every handle stops all further updates.
#[derive(Clone)]
pub struct Widget {
    inner: Rc<WidgetInner>,
}

impl Widget {
    pub fn new(controls: WidgetControls, config: Rc<WidgetConfig>, caps: Capabilities) -> Self {
        let debouncer = Debouncer::new(Rc::clone(&caps.runtime));
        Widget {
            inner: Rc::new(WidgetInner {
                controls,
                config,
                caps,
                changes: RefCell::new(ChangeDetector::default()),
                debouncer,
                requests: RefCell::new(RequestTracker::default()),
            }),
        }
    }

    fn from_weak(weak: &Weak<WidgetInner>) -> Option<Self> {
        weak.upgrade().map(|inner| Widget { inner })
    }

    #[inline]
    pub fn controls(&self) -> &WidgetControls {
        &self.inner.controls
    }

    pub fn phase(&self) -> WidgetPhase {
        if self.inner.debouncer.is_pending() {
            WidgetPhase::PendingDebounce
        } else if self.inner.requests.borrow().in_flight() {
            WidgetPhase::AwaitingResponse
        } else {
            WidgetPhase::Idle
        }
    }

    /// Renders the current input right away, as if it had just been typed into an empty
    /// field, and sends it for validation.
    pub fn initialize(&self) {
        let text = self.read_input();
        self.inner.changes.borrow_mut().has_changed(&text);
        self.show_pending();
        self.refresh();
    }

    /// Reacts to any event that may have changed the input.
    ///
    /// Returns `false` if the text is the same as last time, in which case nothing happens.
    /// Otherwise the validated view shows the pending placeholder and a refresh is scheduled
    /// after [`DEBOUNCE_DELAY`], replacing any refresh scheduled earlier.
    pub fn handle_edit(&self) -> bool {
        let text = self.read_input();
        if !self.inner.changes.borrow_mut().has_changed(&text) {
            return false;
        }
        self.show_pending();
        let weak = Rc::downgrade(&self.inner);
        let timer = self.inner.debouncer.schedule(DEBOUNCE_DELAY, move || {
            if let Some(widget) = Widget::from_weak(&weak) {
                widget.refresh();
            }
        });
        debug!(control = %self.inner.controls.input, %timer, "refresh scheduled");
        true
    }

    /// Serializes the current input into the output field and returns the markup.
    ///
    /// Runs synchronously and does not wait for, or touch, any pending refresh or
    /// validation.
    pub fn handle_submit(&self) -> String {
        let markup = self.render_markup();
        self.inner
            .caps
            .host
            .set_field_value(&self.inner.controls.output, &markup);
        markup
    }

    fn read_input(&self) -> String {
        self.inner.caps.host.input_value(&self.inner.controls.input)
    }

    fn show_pending(&self) {
        let pending = &self.inner.config.placeholders.pending;
        self.inner
            .caps
            .host
            .replace_content(&self.inner.controls.validated, Content::Text(pending));
    }

    fn render_markup(&self) -> String {
        let input = self.read_input();
        let tree = self.inner.caps.parser.parse(&escape_backticks(&input));
        serialize_with(&tree, self.inner.config.line_ending)
    }

    fn refresh(&self) {
        let phase: &'static str = self.phase().into();
        debug!(control = %self.inner.controls.input, phase, "refreshing preview");
        let markup = self.render_markup();
        self.update_preview(&markup);
        self.request_validation(markup);
    }

    fn update_preview(&self, markup: &str) {
        let host = &self.inner.caps.host;
        let controls = &self.inner.controls;
        host.replace_content(&controls.preview, Content::Markup(markup));
        if let Some(source) = &controls.preview_source {
            host.replace_content(source, Content::Text(markup));
        }
    }

    fn request_validation(&self, markup: String) {
        let token = self.inner.requests.borrow_mut().issue();
        let control = self.inner.controls.input.clone();
        debug!(%control, %token, "requesting validation");

        let response = self.inner.caps.service.validate(markup);
        let weak = Rc::downgrade(&self.inner);
        self.inner.caps.runtime.spawn(Box::pin(async move {
            let result = match response.await {
                Ok(response) => ValidationResult::from(response),
                Err(error) => {
                    warn!(%control, %token, %error, "validation request failed");
                    ValidationResult::Unexpected
                }
            };
            if let Some(widget) = Widget::from_weak(&weak) {
                widget.apply_validation(token, &result);
            }
        }));
    }

    fn apply_validation(&self, token: RequestToken, result: &ValidationResult) -> bool {
        let control = &self.inner.controls.input;
        if !self.inner.requests.borrow_mut().settle(token) {
            debug!(%control, %token, "discarding superseded response");
            return false;
        }

        let placeholders = &self.inner.config.placeholders;
        let (validated, source) = match result {
            ValidationResult::Success {
                validated_markup,
                display_source,
            } => (
                Content::Markup(validated_markup),
                Content::Text(display_source),
            ),
            ValidationResult::Failure { reason } => {
                debug!(%control, %token, %reason, "input rejected by the validation service");
                (Content::Text(&placeholders.failure), Content::Empty)
            }
            ValidationResult::Unexpected => (Content::Text(&placeholders.unexpected), Content::Empty),
        };
        debug!(%control, %token, "applying validation response");

        let host = &self.inner.caps.host;
        host.replace_content(&self.inner.controls.validated, validated);
        if let Some(id) = &self.inner.controls.validated_source {
            host.replace_content(id, source);
        }
        true
    }
}

impl std::fmt::Debug for Widget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Widget")
            .field("controls", &self.inner.controls)
            .field("phase", &self.phase())
            .finish_non_exhaustive()
    }
}
