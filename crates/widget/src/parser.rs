use std::borrow::Cow;

use markup::MarkupNode;

/// Turns raw ASCIIMath input into an expression tree.
///
/// Parsing is total: malformed input still yields some tree, possibly a degenerate one.
pub trait ExpressionParser {
    fn parse(&self, input: &str) -> MarkupNode;
}

impl<F> ExpressionParser for F
where
    F: Fn(&str) -> MarkupNode,
{
    #[inline]
    fn parse(&self, input: &str) -> MarkupNode {
        self(input)
    }
}

/// Escapes backticks, which the ASCIIMath grammar would otherwise read as the end of math
/// mode.
pub fn escape_backticks(input: &str) -> Cow<'_, str> {
    if input.contains('`') {
        Cow::Owned(input.replace('`', "\\`"))
    } else {
        Cow::Borrowed(input)
    }
}
