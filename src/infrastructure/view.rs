//! View layer contract consumed by the controller host.

/// The single content element the shell renders controllers into.
///
/// The host resets it on every controller hand-off: content is emptied, the
/// class list goes back to the baseline captured when the application was
/// built, and the id is replaced by the incoming controller's id.
pub trait ViewContainer {
    /// Removes all content.
    fn empty(&mut self);

    /// Appends a content fragment (markup, a node handle, ...).
    fn append(&mut self, fragment: String);

    /// Current class list, in order.
    fn class_names(&self) -> Vec<String>;

    /// Replaces the class list.
    fn set_class_names(&mut self, classes: Vec<String>);

    /// Sets or clears the element id.
    fn set_element_id(&mut self, id: Option<&str>);
}
