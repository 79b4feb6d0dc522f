use js_sys::{Array, Function, Reflect};
use tracing::warn;
use wasm_bindgen::prelude::*;
use web_sys::{Document, DomParser, Element, HtmlInputElement, HtmlTextAreaElement, Node, SupportedType};
use widget::{Content, WidgetHost};

/// A [`WidgetHost`] backed by the live document.
#[derive(Debug, Clone)]
pub struct DomHost {
    document: Document,
}

impl DomHost {
    pub fn new(document: Document) -> Self {
        DomHost { document }
    }

    fn element(&self, id: &str) -> Option<Element> {
        let element = self.document.get_element_by_id(id);
        if element.is_none() {
            warn!(id, "element not found");
        }
        element
    }

    /// Parses `markup` as XML and imports its root element into the document.
    fn import_markup(&self, markup: &str) -> Result<Node, JsValue> {
        let parsed = DomParser::new()?.parse_from_string(markup, SupportedType::ApplicationXml)?;
        if parsed.get_elements_by_tag_name("parsererror").length() > 0 {
            return Err(JsValue::from_str("markup is not well-formed"));
        }
        let root = parsed
            .document_element()
            .ok_or_else(|| JsValue::from_str("markup has no root element"))?;
        self.document.import_node_with_deep(&root, true)
    }
}

impl WidgetHost for DomHost {
    fn input_value(&self, control_id: &str) -> String {
        let Some(element) = self.element(control_id) else {
            return String::new();
        };
        if let Some(input) = element.dyn_ref::<HtmlInputElement>() {
            input.value()
        } else if let Some(textarea) = element.dyn_ref::<HtmlTextAreaElement>() {
            textarea.value()
        } else {
            element.text_content().unwrap_or_default()
        }
    }

    fn set_field_value(&self, field_id: &str, value: &str) {
        let Some(element) = self.element(field_id) else {
            return;
        };
        if let Some(input) = element.dyn_ref::<HtmlInputElement>() {
            input.set_value(value);
        } else if let Some(textarea) = element.dyn_ref::<HtmlTextAreaElement>() {
            textarea.set_value(value);
        } else {
            warn!(id = field_id, "output field is not a form control");
        }
    }

    fn replace_content(&self, container_id: &str, content: Content<'_>) {
        let Some(container) = self.element(container_id) else {
            return;
        };
        match content {
            Content::Empty => container.set_text_content(None),
            Content::Text(text) => container.set_text_content(Some(text)),
            Content::Markup(markup) => match self.import_markup(markup) {
                Ok(node) => {
                    container.set_text_content(None);
                    if let Err(error) = container.append_child(&node) {
                        warn!(id = container_id, ?error, "could not insert markup");
                        return;
                    }
                    typeset(&container);
                }
                Err(error) => {
                    warn!(id = container_id, ?error, "showing markup as text");
                    container.set_text_content(Some(markup));
                }
            },
        }
    }
}

fn property(target: &JsValue, name: &str) -> Option<JsValue> {
    Reflect::get(target, &JsValue::from_str(name))
        .ok()
        .filter(|value| !value.is_undefined() && !value.is_null())
}

/// Asks MathJax, if present, to typeset `container`. Does not wait for it to finish.
///
/// MathJax 2 exposes a `Hub` with a job queue; MathJax 3 only has `typesetPromise`.
pub fn typeset(container: &Element) {
    let Some(mathjax) = property(&js_sys::global(), "MathJax") else {
        return;
    };
    let outcome = if let Some(hub) = property(&mathjax, "Hub")
        && let Some(queue) = property(&hub, "Queue").and_then(|queue| queue.dyn_into::<Function>().ok())
    {
        let job = Array::of3(&JsValue::from_str("Typeset"), &hub, container);
        queue.call1(&hub, &job)
    } else if let Some(typeset) =
        property(&mathjax, "typesetPromise").and_then(|typeset| typeset.dyn_into::<Function>().ok())
    {
        typeset.call1(&mathjax, &Array::of1(container))
    } else {
        return;
    };
    if let Err(error) = outcome {
        warn!(?error, "MathJax typesetting failed");
    }
}
