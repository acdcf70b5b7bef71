//! Browser DOM layer for weaver split editing.
//!
//! Implements the core's platform traits on top of `web-sys`. It assumes a
//! `wasm32-unknown-unknown` target environment.
//!
//! # Architecture
//!
//! - `dom`: `BrowserDom`, the `DomTree` over `web_sys::Element`
//! - `textarea`: `TextareaEditor`, a `<textarea>` secondary editor
//! - `style`: `<style>` element kept in sync with theme flushes
//!
//! # Re-exports
//!
//! This crate re-exports `weaver-split-core` for convenience, so consumers
//! only need to depend on `weaver-split-browser`.

// Re-export core crate
pub use weaver_split_core;
pub use weaver_split_core::*;

pub mod dom;
pub mod style;
pub mod textarea;

pub use dom::BrowserDom;
pub use style::ThemeStyles;
pub use textarea::TextareaEditor;

/// Format a JS exception for error messages.
pub(crate) fn js_error_message(err: &wasm_bindgen::JsValue) -> String {
    err.as_string()
        .or_else(|| {
            js_sys::Reflect::get(err, &"message".into())
                .ok()
                .and_then(|m| m.as_string())
        })
        .unwrap_or_else(|| format!("{:?}", err))
}
