//! Markup tree and serializer for the ASCIIMath input widget.
//!
//! The ASCIIMath parser produces a tree of element and text nodes. This crate turns such a
//! tree into MathML source with a fixed layout and a strict escaping policy, so that the
//! same input always produces byte-identical markup.
//!
//! # Example
//!
//! ```rust
//! use asciimath_markup::{Element, MarkupNode, serialize};
//!
//! let tree: MarkupNode = Element::new("math")
//!     .with_child(
//!         Element::new("mrow")
//!             .with_child(Element::new("mi").with_attribute("mathvariant", "italic").with_text("x"))
//!             .with_child(Element::new("mo").with_text("≤"))
//!             .with_child(Element::new("mn").with_text("1")),
//!     )
//!     .into();
//!
//! assert_eq!(
//!     serialize(&tree),
//!     "<math xmlns=\"http://www.w3.org/1998/Math/MathML\">\n  <mrow>\n    <mi>x</mi>\n    <mo>&#8804;</mo>\n    <mn>1</mn>\n  </mrow>\n</math>"
//! );
//! ```
mod escape;
mod serialize;
mod tree;

pub use self::escape::{escape, escape_markup};
pub use self::serialize::{LineEnding, MATHML_NAMESPACE, serialize, serialize_with};
pub use self::tree::{Attribute, Element, MarkupNode};
