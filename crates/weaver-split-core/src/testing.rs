//! In-memory collaborators for tests: a DOM arena and a secondary editor.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use crate::dom::DomTree;
use crate::error::LayoutError;
use crate::secondary::{ChangeCallback, SecondaryEditor};

/// Node handle into a [`MemoryDom`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(usize);

#[derive(Debug, Default)]
struct NodeData {
    classes: Vec<String>,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

/// Arena-backed `DomTree`. Clones share the same tree.
#[derive(Debug, Clone, Default)]
pub struct MemoryDom {
    nodes: Rc<RefCell<Vec<NodeData>>>,
}

impl MemoryDom {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a detached element with the given classes.
    pub fn element(&self, classes: &[&str]) -> NodeId {
        let mut nodes = self.nodes.borrow_mut();
        nodes.push(NodeData {
            classes: classes.iter().map(|c| c.to_string()).collect(),
            ..Default::default()
        });
        NodeId(nodes.len() - 1)
    }

    pub fn children(&self, node: NodeId) -> Vec<NodeId> {
        self.nodes.borrow()[node.0].children.clone()
    }

    fn detach(nodes: &mut [NodeData], node: NodeId) {
        if let Some(parent) = nodes[node.0].parent.take() {
            nodes[parent.0].children.retain(|c| *c != node);
        }
    }

    fn is_ancestor(nodes: &[NodeData], ancestor: NodeId, node: NodeId) -> bool {
        let mut current = Some(node);
        while let Some(n) = current {
            if n == ancestor {
                return true;
            }
            current = nodes[n.0].parent;
        }
        false
    }
}

impl DomTree for MemoryDom {
    type Node = NodeId;

    fn parent(&self, node: &NodeId) -> Option<NodeId> {
        self.nodes.borrow()[node.0].parent
    }

    fn create_element(&self, class: &str) -> Result<NodeId, LayoutError> {
        Ok(self.element(&[class]))
    }

    fn replace_child(
        &self,
        parent: &NodeId,
        new_child: &NodeId,
        old_child: &NodeId,
    ) -> Result<(), LayoutError> {
        let mut nodes = self.nodes.borrow_mut();
        if nodes[old_child.0].parent != Some(*parent) {
            return Err(LayoutError::Dom("old child is not a child of parent".into()));
        }
        if Self::is_ancestor(&nodes, *new_child, *parent) {
            return Err(LayoutError::Dom("hierarchy request error".into()));
        }
        if new_child == old_child {
            return Ok(());
        }
        Self::detach(&mut nodes, *new_child);
        let idx = nodes[parent.0]
            .children
            .iter()
            .position(|c| c == old_child)
            .ok_or_else(|| LayoutError::Dom("old child missing".into()))?;
        nodes[parent.0].children[idx] = *new_child;
        nodes[old_child.0].parent = None;
        nodes[new_child.0].parent = Some(*parent);
        Ok(())
    }

    fn append_child(&self, parent: &NodeId, child: &NodeId) -> Result<(), LayoutError> {
        let mut nodes = self.nodes.borrow_mut();
        if Self::is_ancestor(&nodes, *child, *parent) {
            return Err(LayoutError::Dom("hierarchy request error".into()));
        }
        Self::detach(&mut nodes, *child);
        nodes[parent.0].children.push(*child);
        nodes[child.0].parent = Some(*parent);
        Ok(())
    }

    fn remove(&self, node: &NodeId) {
        Self::detach(&mut self.nodes.borrow_mut(), *node);
    }

    fn add_class(&self, node: &NodeId, class: &str) {
        let mut nodes = self.nodes.borrow_mut();
        let classes = &mut nodes[node.0].classes;
        if !classes.iter().any(|c| c == class) {
            classes.push(class.to_string());
        }
    }

    fn remove_class(&self, node: &NodeId, class: &str) {
        self.nodes.borrow_mut()[node.0]
            .classes
            .retain(|c| c != class);
    }

    fn has_class(&self, node: &NodeId, class: &str) -> bool {
        self.nodes.borrow()[node.0].classes.iter().any(|c| c == class)
    }
}

/// Secondary editor backed by a `String`, counting `set_content` calls.
#[derive(Default)]
pub struct MemoryEditor {
    buffer: RefCell<String>,
    on_change: RefCell<Option<Rc<dyn Fn(&str)>>>,
    set_content_calls: Cell<usize>,
}

impl MemoryEditor {
    pub fn new(initial: &str) -> Self {
        Self {
            buffer: RefCell::new(initial.to_string()),
            ..Default::default()
        }
    }

    /// Simulate the user replacing the buffer, firing the change callback.
    pub fn type_text(&self, text: &str) {
        *self.buffer.borrow_mut() = text.to_string();
        let callback = self.on_change.borrow().clone();
        if let Some(callback) = callback {
            callback(text);
        }
    }

    pub fn set_content_calls(&self) -> usize {
        self.set_content_calls.get()
    }

    pub fn has_on_change(&self) -> bool {
        self.on_change.borrow().is_some()
    }
}

impl SecondaryEditor for MemoryEditor {
    fn set_content(&self, text: &str) {
        self.set_content_calls.set(self.set_content_calls.get() + 1);
        *self.buffer.borrow_mut() = text.to_string();
    }

    fn content(&self) -> String {
        self.buffer.borrow().clone()
    }

    fn set_on_change(&self, callback: Option<ChangeCallback>) {
        *self.on_change.borrow_mut() = callback.map(Rc::from);
    }
}
