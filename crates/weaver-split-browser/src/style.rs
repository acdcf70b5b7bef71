//! `<style>` element carrying the CSS for the current theme handles.
//!
//! The layout only attaches class handles; this keeps a stylesheet with the
//! matching rules in `<head>`, rewritten on every theme flush.

use std::rc::Rc;

use wasm_bindgen::JsCast;
use weaver_split_core::{FlushSubscription, LayoutError, ThemeManager};

use crate::dom::BrowserDom;

const STYLE_MARKER: &str = "data-weaver-split";

/// Installed stylesheet. Removes itself and its flush subscription on drop.
pub struct ThemeStyles {
    element: web_sys::HtmlStyleElement,
    theme: Rc<ThemeManager>,
    subscription: FlushSubscription,
}

impl ThemeStyles {
    pub fn install(
        dom: &BrowserDom,
        theme: &Rc<ThemeManager>,
        hidden_class: &str,
    ) -> Result<Self, LayoutError> {
        let head = dom
            .document()
            .head()
            .ok_or(LayoutError::Dom("document has no head".into()))?;
        let element = dom
            .create("style")?
            .dyn_into::<web_sys::HtmlStyleElement>()
            .map_err(|_| LayoutError::Dom("created element is not a style element".into()))?;
        if let Err(e) = element.set_attribute(STYLE_MARKER, "") {
            tracing::warn!(error = %crate::js_error_message(&e), "could not mark style element");
        }
        element.set_text_content(Some(&theme.stylesheet(hidden_class)));
        head.append_child(&element)
            .map_err(|e| LayoutError::Dom(crate::js_error_message(&e)))?;

        let subscription = {
            let element = element.clone();
            let hidden_class = hidden_class.to_string();
            theme.on_flush(Rc::new(move |theme: &ThemeManager| {
                element.set_text_content(Some(&theme.stylesheet(&hidden_class)));
            }))
        };

        Ok(Self {
            element,
            theme: theme.clone(),
            subscription,
        })
    }

    pub fn css(&self) -> String {
        self.element.text_content().unwrap_or_default()
    }
}

impl Drop for ThemeStyles {
    fn drop(&mut self) {
        self.theme.remove_flush(self.subscription);
        self.element.remove();
    }
}
