use std::fmt::Write;

/// Escapes `input` for inclusion in MathML text content or in a double-quoted attribute.
///
/// Every character is handled on its own:
/// - `&`, `<` and `>` become `&amp;`, `&lt;` and `&gt;`,
/// - printable ASCII (U+0020 to U+007E) is copied unchanged,
/// - everything else, including control characters, DEL and all non-ASCII characters,
///   becomes a decimal numeric character reference such as `&#8734;`.
///
/// The output is therefore always printable ASCII.
pub fn escape_markup(output: &mut String, input: &str) {
    for ch in input.chars() {
        match ch {
            '&' => output.push_str("&amp;"),
            '<' => output.push_str("&lt;"),
            '>' => output.push_str("&gt;"),
            ' '..='~' => output.push(ch),
            _ => {
                // Writing to a `String` cannot fail.
                let _ = write!(output, "&#{};", u32::from(ch));
            }
        }
    }
}

/// Convenience wrapper around [`escape_markup`] that allocates a new string.
pub fn escape(input: &str) -> String {
    let mut output = String::with_capacity(input.len());
    escape_markup(&mut output, input);
    output
}
