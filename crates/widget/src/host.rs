/// New content for a container.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Content<'a> {
    /// Remove all children.
    Empty,
    /// A single text node.
    Text(&'a str),
    /// MathML source to be parsed, inserted and typeset.
    Markup(&'a str),
}

/// The page a widget lives in.
///
/// Elements are addressed by id. Hosts resolve ids on every call, so containers that are
/// replaced by the page keep working.
pub trait WidgetHost {
    /// Current value of the input control `control_id`. Missing controls read as empty.
    fn input_value(&self, control_id: &str) -> String;

    /// Sets the value of the form field `field_id`.
    fn set_field_value(&self, field_id: &str, value: &str);

    /// Removes every child of `container_id` and inserts `content` in their place.
    ///
    /// Inserted markup is handed to the typesetter afterwards; the host does not wait for
    /// typesetting to finish.
    fn replace_content(&self, container_id: &str, content: Content<'_>);
}
