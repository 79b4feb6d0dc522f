use js_sys::Reflect;
use markup::{Attribute, Element as MarkupElement, MarkupNode};
use tracing::warn;
use wasm_bindgen::prelude::*;
use web_sys::{Element, Node};
use widget::ExpressionParser;

#[wasm_bindgen]
extern "C" {
    /// Provided by `ASCIIMathML.js`. Returns a `<span>` wrapping a single `<math>` element.
    #[wasm_bindgen(catch, js_name = AMparseMath)]
    fn am_parse_math(input: &str) -> Result<Node, JsValue>;
}

/// Globals of `ASCIIMathML.js` that are cleared so the generated elements carry no styling.
const RESET_GLOBALS: [&str; 2] = ["mathcolor", "mathfontfamily"];

/// The ASCIIMath parser loaded into the page.
#[derive(Debug)]
pub struct AsciiMathParser(());

impl AsciiMathParser {
    /// Clears the parser's default colour and font family.
    pub fn new() -> Self {
        let global = js_sys::global();
        for name in RESET_GLOBALS {
            if Reflect::set(&global, &JsValue::from_str(name), &JsValue::from_str("")).is_err() {
                warn!(name, "could not reset ASCIIMath default");
            }
        }
        AsciiMathParser(())
    }
}

impl Default for AsciiMathParser {
    fn default() -> Self {
        Self::new()
    }
}

impl ExpressionParser for AsciiMathParser {
    fn parse(&self, input: &str) -> MarkupNode {
        match am_parse_math(input) {
            Ok(wrapper) => match wrapper.first_child() {
                Some(math) => dom_to_markup(&math),
                None => empty_math(),
            },
            Err(error) => {
                warn!(?error, "ASCIIMath parser threw");
                empty_math()
            }
        }
    }
}

fn empty_math() -> MarkupNode {
    MarkupElement::new("math").into()
}

/// Copies a DOM subtree into a [`MarkupNode`] tree.
///
/// Elements keep their tag name and attributes in document order; text nodes keep their
/// value. Comments, processing instructions and the like become [`MarkupNode::Other`].
pub fn dom_to_markup(node: &Node) -> MarkupNode {
    match node.node_type() {
        Node::ELEMENT_NODE => match node.dyn_ref::<Element>() {
            Some(element) => MarkupNode::Element(element_to_markup(element)),
            None => MarkupNode::Other,
        },
        Node::TEXT_NODE | Node::CDATA_SECTION_NODE => {
            MarkupNode::Text(node.node_value().unwrap_or_default())
        }
        _ => MarkupNode::Other,
    }
}

fn element_to_markup(element: &Element) -> MarkupElement {
    let mut result = MarkupElement::new(element.node_name());

    let attributes = element.attributes();
    result.attributes = (0..attributes.length())
        .filter_map(|index| attributes.item(index))
        .map(|attr| Attribute {
            name: attr.name(),
            value: Some(attr.value()),
        })
        .collect();

    let children = element.child_nodes();
    result.children = (0..children.length())
        .filter_map(|index| children.item(index))
        .map(|child| dom_to_markup(&child))
        .collect();

    result
}
