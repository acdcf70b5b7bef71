//! `<textarea>`-backed secondary editor.
//!
//! The textarea owns cursor and undo; we only read its value on `input`
//! events and overwrite it on `set_content`. Setting `value` programmatically
//! does not fire `input`, so `set_content` never reaches the change callback.

use std::cell::RefCell;
use std::rc::Rc;

use gloo_events::EventListener;
use wasm_bindgen::JsCast;
use web_sys::HtmlTextAreaElement;

use weaver_split_core::{ChangeCallback, DomTree, LayoutError, SecondaryEditor};

use crate::dom::BrowserDom;

type SharedCallback = Rc<RefCell<Option<Rc<dyn Fn(&str)>>>>;

pub struct TextareaEditor {
    textarea: HtmlTextAreaElement,
    on_change: SharedCallback,
    _input_listener: EventListener,
}

impl TextareaEditor {
    /// Create a textarea inside `pane` holding `initial`.
    pub fn mount(
        dom: &BrowserDom,
        pane: &web_sys::Element,
        initial: &str,
    ) -> Result<Self, LayoutError> {
        let textarea = dom
            .create("textarea")?
            .dyn_into::<HtmlTextAreaElement>()
            .map_err(|_| LayoutError::Secondary("created element is not a textarea".into()))?;
        textarea.set_spellcheck(false);
        textarea.set_value(initial);
        dom.append_child(pane, &textarea)?;

        let on_change: SharedCallback = Rc::new(RefCell::new(None));
        let input_listener = {
            let textarea = textarea.clone();
            let on_change = on_change.clone();
            EventListener::new(&textarea.clone(), "input", move |_event| {
                // Clone out so the callback can replace itself.
                let callback = on_change.borrow().clone();
                if let Some(callback) = callback {
                    callback(&textarea.value());
                }
            })
        };

        tracing::trace!(len = initial.len(), "mounted textarea secondary editor");
        Ok(Self {
            textarea,
            on_change,
            _input_listener: input_listener,
        })
    }

    pub fn element(&self) -> &HtmlTextAreaElement {
        &self.textarea
    }
}

impl SecondaryEditor for TextareaEditor {
    fn set_content(&self, text: &str) {
        if self.textarea.value() == text {
            return;
        }
        let selection = (
            self.textarea.selection_start().ok().flatten(),
            self.textarea.selection_end().ok().flatten(),
        );
        self.textarea.set_value(text);

        // Keep the caret where it was, clamped to the new length.
        if let (Some(start), Some(end)) = selection {
            let len = text.encode_utf16().count() as u32;
            let _ = self
                .textarea
                .set_selection_range(start.min(len), end.min(len));
        }
    }

    fn content(&self) -> String {
        self.textarea.value()
    }

    fn set_on_change(&self, callback: Option<ChangeCallback>) {
        *self.on_change.borrow_mut() = callback.map(Rc::from);
    }
}
