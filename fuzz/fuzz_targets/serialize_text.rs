#![no_main]

use libfuzzer_sys::fuzz_target;
use markup::{Element, MarkupNode, escape, serialize};

fuzz_target!(|data: &str| {
    let tree: MarkupNode = Element::new("math")
        .with_child(Element::new("mi").with_attribute("title", data).with_text(data))
        .into();
    let output = serialize(&tree);

    // Everything outside the printable ASCII range must have been turned into a reference.
    assert!(
        output.bytes().all(|b| b == b'\n' || (b' '..=b'~').contains(&b)),
        "non-printable byte in {output:?}"
    );

    let escaped = escape(data);
    assert!(!escaped.contains('<') && !escaped.contains('>'));
    assert!(output.contains(escaped.as_str()));
});
