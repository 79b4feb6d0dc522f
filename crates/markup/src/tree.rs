#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A node of a parsed math expression, as handed over by the ASCIIMath parser.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum MarkupNode {
    /// `<tag attr="...">...</tag>`
    Element(Element),
    /// Character data.
    Text(String),
    /// Comments, processing instructions and any other node kind a document may contain.
    /// These never contribute to the serialized output.
    Other,
}

impl MarkupNode {
    pub fn text(value: impl Into<String>) -> Self {
        MarkupNode::Text(value.into())
    }

    pub fn as_element(&self) -> Option<&Element> {
        match self {
            MarkupNode::Element(element) => Some(element),
            _ => None,
        }
    }
}

impl From<Element> for MarkupNode {
    #[inline]
    fn from(element: Element) -> Self {
        MarkupNode::Element(element)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Element {
    /// Tag name as reported by the parser. Case is normalized during serialization.
    pub tag: String,
    #[cfg_attr(feature = "serde", serde(default))]
    pub attributes: Vec<Attribute>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub children: Vec<MarkupNode>,
}

impl Element {
    pub fn new(tag: impl Into<String>) -> Self {
        Element {
            tag: tag.into(),
            attributes: Vec::new(),
            children: Vec::new(),
        }
    }

    /// Appends an attribute, keeping insertion order.
    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.push(Attribute {
            name: name.into(),
            value: Some(value.into()),
        });
        self
    }

    /// Appends a child node, keeping insertion order.
    pub fn with_child(mut self, child: impl Into<MarkupNode>) -> Self {
        self.children.push(child.into());
        self
    }

    pub fn with_text(self, text: impl Into<String>) -> Self {
        self.with_child(MarkupNode::Text(text.into()))
    }
}

/// An attribute of an [`Element`].
///
/// `value` is `None` when the parser exposed the attribute without a value.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Attribute {
    pub name: String,
    #[cfg_attr(feature = "serde", serde(default))]
    pub value: Option<String>,
}

impl Attribute {
    /// Values the upstream parser injects as defaults. They carry no information and are
    /// dropped from the output.
    const NOISE_VALUES: [&'static str; 3] = ["", "italic", "inherit"];

    /// Whether this attribute should appear in serialized output.
    pub fn is_significant(&self) -> bool {
        self.value
            .as_deref()
            .is_some_and(|value| !Self::NOISE_VALUES.contains(&value))
    }
}
