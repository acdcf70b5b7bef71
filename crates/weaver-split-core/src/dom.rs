//! DOM abstraction used by the layout manager.
//!
//! Mirrors the handful of DOM operations the split layout needs. Methods take
//! `&self` because, like the browser DOM, implementations hand out cheap
//! node handles over shared state. The browser implementation lives in
//! `weaver-split-browser`; `testing::MemoryDom` is an in-memory one.

use crate::error::LayoutError;

pub trait DomTree: Clone {
    /// Node handle. Equality is node identity.
    type Node: Clone + PartialEq + std::fmt::Debug;

    /// Parent element, if attached.
    fn parent(&self, node: &Self::Node) -> Option<Self::Node>;

    /// Create a detached `div` with `class`.
    fn create_element(&self, class: &str) -> Result<Self::Node, LayoutError>;

    /// Put `new_child` in `old_child`'s slot under `parent`.
    ///
    /// `new_child` is detached from wherever it was first.
    fn replace_child(
        &self,
        parent: &Self::Node,
        new_child: &Self::Node,
        old_child: &Self::Node,
    ) -> Result<(), LayoutError>;

    /// Append `child` as the last child of `parent`, moving it if attached.
    fn append_child(&self, parent: &Self::Node, child: &Self::Node) -> Result<(), LayoutError>;

    /// Detach `node`. No-op when already detached.
    fn remove(&self, node: &Self::Node);

    fn add_class(&self, node: &Self::Node, class: &str);

    fn remove_class(&self, node: &Self::Node, class: &str);

    fn has_class(&self, node: &Self::Node, class: &str) -> bool;
}
