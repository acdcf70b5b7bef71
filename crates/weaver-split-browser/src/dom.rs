//! `DomTree` over the browser DOM.

use weaver_split_core::{DomTree, LayoutError};

use crate::js_error_message;

/// Browser DOM handle. Nodes are `web_sys::Element`s.
#[derive(Debug, Clone)]
pub struct BrowserDom {
    document: web_sys::Document,
}

impl BrowserDom {
    /// DOM of the current window's document.
    pub fn new() -> Result<Self, LayoutError> {
        let window = web_sys::window().ok_or(LayoutError::Dom("no window".into()))?;
        let document = window
            .document()
            .ok_or(LayoutError::Dom("no document".into()))?;
        Ok(Self { document })
    }

    pub fn document(&self) -> &web_sys::Document {
        &self.document
    }

    /// Create a detached element with `tag`.
    pub fn create(&self, tag: &str) -> Result<web_sys::Element, LayoutError> {
        self.document
            .create_element(tag)
            .map_err(|e| LayoutError::Dom(format!("create {tag}: {}", js_error_message(&e))))
    }
}

impl DomTree for BrowserDom {
    type Node = web_sys::Element;

    fn parent(&self, node: &web_sys::Element) -> Option<web_sys::Element> {
        node.parent_element()
    }

    fn create_element(&self, class: &str) -> Result<web_sys::Element, LayoutError> {
        let element = self.create("div")?;
        element.set_class_name(class);
        Ok(element)
    }

    fn replace_child(
        &self,
        parent: &web_sys::Element,
        new_child: &web_sys::Element,
        old_child: &web_sys::Element,
    ) -> Result<(), LayoutError> {
        parent
            .replace_child(new_child, old_child)
            .map(|_| ())
            .map_err(|e| LayoutError::Dom(format!("replaceChild: {}", js_error_message(&e))))
    }

    fn append_child(
        &self,
        parent: &web_sys::Element,
        child: &web_sys::Element,
    ) -> Result<(), LayoutError> {
        parent
            .append_child(child)
            .map(|_| ())
            .map_err(|e| LayoutError::Dom(format!("appendChild: {}", js_error_message(&e))))
    }

    fn remove(&self, node: &web_sys::Element) {
        node.remove();
    }

    fn add_class(&self, node: &web_sys::Element, class: &str) {
        if let Err(e) = node.class_list().add_1(class) {
            tracing::warn!(class, error = %js_error_message(&e), "classList.add failed");
        }
    }

    fn remove_class(&self, node: &web_sys::Element, class: &str) {
        if let Err(e) = node.class_list().remove_1(class) {
            tracing::warn!(class, error = %js_error_message(&e), "classList.remove failed");
        }
    }

    fn has_class(&self, node: &web_sys::Element, class: &str) -> bool {
        node.class_list().contains(class)
    }
}
