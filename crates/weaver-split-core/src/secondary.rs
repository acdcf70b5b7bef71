//! Plain-text (secondary) editor adapter.
//!
//! The secondary editor owns its buffer, cursor and undo history. The core
//! overwrites its content and listens for direct user edits; nothing else.

/// Callback fired with the full buffer text after a direct user edit.
pub type ChangeCallback = Box<dyn Fn(&str)>;

/// Interface to the plain-text editing component.
///
/// Methods take `&self`: implementations are handles to a component that
/// keeps its own state (a DOM element, a `RefCell`).
pub trait SecondaryEditor {
    /// Overwrite the buffer. Must not fire the change callback.
    fn set_content(&self, text: &str);

    /// Current buffer text.
    fn content(&self) -> String;

    /// Replace the change callback.
    fn set_on_change(&self, callback: Option<ChangeCallback>);
}
