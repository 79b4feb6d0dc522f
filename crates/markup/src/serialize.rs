#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::escape::escape_markup;
use crate::tree::{Element, MarkupNode};

/// Namespace declared on every serialized `<math>` element.
pub const MATHML_NAMESPACE: &str = "http://www.w3.org/1998/Math/MathML";

const INDENT: &str = "  ";

/// Line break used between elements in the serialized output.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum LineEnding {
    #[default]
    Lf,
    CrLf,
}

impl LineEnding {
    #[inline]
    pub const fn as_str(self) -> &'static str {
        match self {
            LineEnding::Lf => "\n",
            LineEnding::CrLf => "\r\n",
        }
    }
}

/// Serializes `node` with `\n` line breaks. See [`serialize_with`].
#[inline]
pub fn serialize(node: &MarkupNode) -> String {
    serialize_with(node, LineEnding::Lf)
}

/// Serializes an expression tree into indented, escaped MathML source.
///
/// Elements are opened on a new line, indented by two spaces per level. Token elements
/// (`mi`, `mn`, `mo`) keep their closing tag on the same line as their content, all other
/// elements close on a line of their own. Attributes whose value is empty, `italic` or
/// `inherit` are dropped, and `<math>` always receives the MathML namespace.
///
/// The output does not start with a line break.
pub fn serialize_with(node: &MarkupNode, line_ending: LineEnding) -> String {
    let newline = line_ending.as_str();
    let mut output = String::new();
    emit(&mut output, node, 0, newline);
    if output.starts_with(newline) {
        output.drain(..newline.len());
    }
    output
}

fn emit(output: &mut String, node: &MarkupNode, depth: usize, newline: &str) {
    match node {
        MarkupNode::Element(element) => emit_element(output, element, depth, newline),
        MarkupNode::Text(text) => escape_markup(output, text),
        MarkupNode::Other => {}
    }
}

fn emit_element(output: &mut String, element: &Element, depth: usize, newline: &str) {
    let name = element.tag.to_lowercase();
    new_line_and_indent(output, newline, depth);
    output.push('<');
    output.push_str(&name);
    for attribute in element.attributes.iter().filter(|a| a.is_significant()) {
        output.push(' ');
        output.push_str(&attribute.name);
        output.push_str("=\"");
        escape_markup(output, attribute.value.as_deref().unwrap_or_default());
        output.push('"');
    }
    if name == "math" {
        output.push_str(" xmlns=\"");
        output.push_str(MATHML_NAMESPACE);
        output.push('"');
    }
    output.push('>');
    for child in &element.children {
        emit(output, child, depth + 1, newline);
    }
    if !is_token_element(&name) {
        new_line_and_indent(output, newline, depth);
    }
    output.push_str("</");
    output.push_str(&name);
    output.push('>');
}

#[inline]
fn is_token_element(name: &str) -> bool {
    matches!(name, "mi" | "mn" | "mo")
}

fn new_line_and_indent(output: &mut String, newline: &str, depth: usize) {
    output.push_str(newline);
    for _ in 0..depth {
        output.push_str(INDENT);
    }
}
