use gloo_events::EventListener;
use wasm_bindgen::JsValue;
use web_sys::Document;
use widget::Widget;

/// Events after which the input may hold new text. `keydown` usually arrives before the
/// value changes and is then ignored as unchanged.
const EDIT_EVENTS: [&str; 3] = ["change", "keyup", "keydown"];

/// Attaches the widget's handlers to its input control and to the form containing it.
///
/// The listeners stay attached for the lifetime of the page.
pub(crate) fn bind(document: &Document, widget: &Widget) -> Result<(), JsValue> {
    let input_id = &widget.controls().input;
    let input = document
        .get_element_by_id(input_id)
        .ok_or_else(|| missing_element(input_id))?;

    for event in EDIT_EVENTS {
        let widget = widget.clone();
        EventListener::new(&input, event, move |_| {
            widget.handle_edit();
        })
        .forget();
    }

    match input.closest("form")? {
        Some(form) => {
            let widget = widget.clone();
            EventListener::new(&form, "submit", move |_| {
                widget.handle_submit();
            })
            .forget();
        }
        None => tracing::debug!(control = %input_id, "input is not inside a form"),
    }
    Ok(())
}

pub(crate) fn missing_element(id: &str) -> JsValue {
    JsValue::from_str(&format!("no element with id \"{id}\""))
}
