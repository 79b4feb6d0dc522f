#[cfg(target_arch = "wasm32")]
use lol_alloc::{AssumeSingleThreaded, FreeListAllocator};

// SAFETY: This application is single threaded, so using AssumeSingleThreaded is allowed.
#[cfg(target_arch = "wasm32")]
#[global_allocator]
static ALLOCATOR: AssumeSingleThreaded<FreeListAllocator> =
    unsafe { AssumeSingleThreaded::new(FreeListAllocator::new()) };

mod bind;
mod dom;
mod parser;
mod runtime;

use std::cell::RefCell;
use std::rc::Rc;

use gloo_events::EventListener;
use markup::LineEnding;
use tracing::warn;
use url::Url;
use wasm_bindgen::prelude::*;
use web_sys::Document;
use widget::{
    Capabilities, HttpValidationService, Placeholders, ServiceTransport, WidgetConfig,
    WidgetControls, WidgetRegistry,
};

pub use self::dom::{DomHost, typeset};
pub use self::parser::{AsciiMathParser, dom_to_markup};
pub use self::runtime::BrowserRuntime;

#[wasm_bindgen]
pub struct ConfigParseError {
    message: &'static str,
}

#[wasm_bindgen]
impl ConfigParseError {
    #[wasm_bindgen(getter, unchecked_return_type = "string")]
    pub fn message(&self) -> JsValue {
        JsValue::from_str(self.message)
    }
}

#[wasm_bindgen(typescript_custom_section)]
const WIDGET_OPTIONS: &'static str = r#"
interface WidgetOptions {
    serviceUrl?: string;
    transport?: "post" | "get";
    lineEnding?: "lf" | "crlf";
    pendingText?: string;
    failureText?: string;
    unexpectedText?: string;
}
"#;

#[wasm_bindgen]
extern "C" {
    #[wasm_bindgen(typescript_type = "WidgetOptions")]
    pub type WidgetOptions;

    #[wasm_bindgen(method, getter)]
    fn serviceUrl(this: &WidgetOptions) -> Option<String>;

    #[wasm_bindgen(method, getter)]
    fn transport(this: &WidgetOptions) -> Option<String>;

    #[wasm_bindgen(method, getter)]
    fn lineEnding(this: &WidgetOptions) -> Option<String>;

    #[wasm_bindgen(method, getter)]
    fn pendingText(this: &WidgetOptions) -> Option<String>;

    #[wasm_bindgen(method, getter)]
    fn failureText(this: &WidgetOptions) -> Option<String>;

    #[wasm_bindgen(method, getter)]
    fn unexpectedText(this: &WidgetOptions) -> Option<String>;
}

impl WidgetOptions {
    fn to_config(&self) -> Result<WidgetConfig, ConfigParseError> {
        let defaults = WidgetConfig::default();
        let transport = match self.transport().as_deref() {
            None => defaults.transport,
            Some("post") => ServiceTransport::Post,
            Some("get") => ServiceTransport::Get,
            Some(_) => {
                return Err(ConfigParseError {
                    message: "Invalid value for transport",
                });
            }
        };
        let line_ending = match self.lineEnding().as_deref() {
            None => defaults.line_ending,
            Some("lf") => LineEnding::Lf,
            Some("crlf") => LineEnding::CrLf,
            Some(_) => {
                return Err(ConfigParseError {
                    message: "Invalid value for lineEnding",
                });
            }
        };
        let placeholders = Placeholders {
            pending: self.pendingText().unwrap_or(defaults.placeholders.pending),
            failure: self.failureText().unwrap_or(defaults.placeholders.failure),
            unexpected: self
                .unexpectedText()
                .unwrap_or(defaults.placeholders.unexpected),
        };
        Ok(WidgetConfig {
            service_url: self.serviceUrl().unwrap_or(defaults.service_url),
            transport,
            line_ending,
            placeholders,
        })
    }
}

fn init_logging() {
    use tracing::Level;
    use tracing::subscriber::set_global_default;
    use tracing_subscriber::Registry;
    use tracing_subscriber::layer::SubscriberExt;

    let console_level = if cfg!(debug_assertions) {
        Level::DEBUG
    } else {
        Level::INFO
    };
    let wasm_layer = tracing_wasm::WASMLayer::new(
        tracing_wasm::WASMLayerConfigBuilder::new()
            .set_max_level(console_level)
            .build(),
    );
    // Fails if a subscriber is already installed, which is fine.
    let _ = set_global_default(Registry::default().with(wasm_layer));
}

/// The ASCIIMath widgets of one page.
#[wasm_bindgen]
pub struct AsciiMathWidgets {
    document: Document,
    registry: Rc<RefCell<WidgetRegistry>>,
}

#[wasm_bindgen]
impl AsciiMathWidgets {
    #[wasm_bindgen(constructor)]
    pub fn new(options: &WidgetOptions) -> Result<AsciiMathWidgets, JsValue> {
        init_logging();
        let config = options.to_config()?;

        let window = web_sys::window().ok_or_else(|| JsValue::from_str("no window"))?;
        let document = window
            .document()
            .ok_or_else(|| JsValue::from_str("no document"))?;
        let base = Url::parse(&window.location().href()?).map_err(|_| ConfigParseError {
            message: "Invalid page location",
        })?;
        let service = HttpValidationService::from_config(&config, Some(&base)).map_err(|_| {
            ConfigParseError {
                message: "Invalid value for serviceUrl",
            }
        })?;

        let caps = Capabilities {
            host: Rc::new(DomHost::new(document.clone())),
            parser: Rc::new(AsciiMathParser::new()),
            service: Rc::new(service),
            runtime: Rc::new(BrowserRuntime),
        };
        Ok(AsciiMathWidgets {
            document,
            registry: Rc::new(RefCell::new(WidgetRegistry::new(config, caps))),
        })
    }

    /// Sets up a widget once the document has loaded.
    ///
    /// If the document is still loading, problems found later are logged instead of
    /// returned.
    pub fn register(
        &self,
        input_id: String,
        output_id: String,
        preview_id: String,
        validated_id: String,
        preview_source_id: Option<String>,
        validated_source_id: Option<String>,
    ) -> Result<(), JsValue> {
        let mut controls = WidgetControls::new(input_id, output_id, preview_id, validated_id);
        controls.preview_source = preview_source_id;
        controls.validated_source = validated_source_id;

        if self.document.ready_state() != "loading" {
            return setup(&self.document, &self.registry, controls);
        }
        let document = self.document.clone();
        let registry = Rc::clone(&self.registry);
        EventListener::once(&self.document, "DOMContentLoaded", move |_| {
            let control = controls.input.clone();
            if let Err(error) = setup(&document, &registry, controls) {
                warn!(%control, ?error, "widget setup failed");
            }
        })
        .forget();
        Ok(())
    }

    /// Number of widgets set up so far.
    #[wasm_bindgen(getter)]
    pub fn size(&self) -> u32 {
        self.registry.borrow().len() as u32
    }
}

fn setup(
    document: &Document,
    registry: &RefCell<WidgetRegistry>,
    controls: WidgetControls,
) -> Result<(), JsValue> {
    let required = [
        &controls.input,
        &controls.output,
        &controls.preview,
        &controls.validated,
    ];
    if let Some(id) = required
        .into_iter()
        .find(|id| document.get_element_by_id(id).is_none())
    {
        return Err(bind::missing_element(id));
    }
    let widget = registry
        .borrow_mut()
        .register(controls)
        .map_err(|error| JsValue::from_str(&error.to_string()))?;
    bind::bind(document, &widget)
}
