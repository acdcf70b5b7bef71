//! Theme observer for the split layout.
//!
//! The theme manager maps a palette to opaque style handles (class names) per
//! layout role and notifies subscribers when the palette is flushed. The
//! layout registers one subscription per activation and removes it on
//! deactivation, so a detached wrapper never receives style updates.

use std::cell::{Cell, RefCell};
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::rc::Rc;

use serde::{Deserialize, Serialize};
use smol_str::{SmolStr, format_smolstr};

use crate::color::{rgba_u32_to_css, rgba_u32_to_css_alpha};

/// Colors used by the split layout, packed RGBA.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ThemePalette {
    pub background: u32,
    /// Foreground text color.
    pub solid: u32,
    pub scrollbar_thumb: u32,
}

impl Default for ThemePalette {
    // rose-pine dawn
    fn default() -> Self {
        Self {
            background: 0xFAF4EDFF,
            solid: 0x575279FF,
            scrollbar_thumb: 0x9893A5FF,
        }
    }
}

/// Element a style handle applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StyleRole {
    Wrapper,
    Pane,
}

impl StyleRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            StyleRole::Wrapper => "wrapper",
            StyleRole::Pane => "pane",
        }
    }
}

/// Opaque class token for a styled element.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct StyleHandle(SmolStr);

impl StyleHandle {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for StyleHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Handle for removing a flush callback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FlushSubscription(u64);

pub type FlushCallback = Rc<dyn Fn(&ThemeManager)>;

/// Palette holder and flush observer.
pub struct ThemeManager {
    palette: Cell<ThemePalette>,
    subscribers: RefCell<Vec<(FlushSubscription, FlushCallback)>>,
    next_subscription: Cell<u64>,
}

impl Default for ThemeManager {
    fn default() -> Self {
        Self::new(ThemePalette::default())
    }
}

impl std::fmt::Debug for ThemeManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ThemeManager")
            .field("palette", &self.palette.get())
            .field("subscribers", &self.subscribers.borrow().len())
            .finish()
    }
}

impl ThemeManager {
    pub fn new(palette: ThemePalette) -> Self {
        Self {
            palette: Cell::new(palette),
            subscribers: RefCell::new(Vec::new()),
            next_subscription: Cell::new(0),
        }
    }

    pub fn palette(&self) -> ThemePalette {
        self.palette.get()
    }

    /// Replace the palette and flush.
    pub fn set_palette(&self, palette: ThemePalette) {
        self.palette.set(palette);
        self.flush();
    }

    pub fn on_flush(&self, callback: FlushCallback) -> FlushSubscription {
        let id = FlushSubscription(self.next_subscription.get());
        self.next_subscription.set(id.0 + 1);
        self.subscribers.borrow_mut().push((id, callback));
        id
    }

    /// Remove a flush callback. Returns false if it was not registered.
    pub fn remove_flush(&self, subscription: FlushSubscription) -> bool {
        let mut subscribers = self.subscribers.borrow_mut();
        let before = subscribers.len();
        subscribers.retain(|(id, _)| *id != subscription);
        subscribers.len() != before
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.borrow().len()
    }

    /// Run every flush callback.
    pub fn flush(&self) {
        // Callbacks may subscribe or unsubscribe while running.
        let callbacks: Vec<FlushCallback> = self
            .subscribers
            .borrow()
            .iter()
            .map(|(_, cb)| cb.clone())
            .collect();
        tracing::trace!(count = callbacks.len(), "theme flush");
        for callback in callbacks {
            callback(self);
        }
    }

    /// Style handle for `role` under the current palette.
    pub fn style(&self, role: StyleRole) -> StyleHandle {
        let mut hasher = DefaultHasher::new();
        self.palette.get().hash(&mut hasher);
        let hash = hasher.finish() as u32;
        StyleHandle(format_smolstr!("weaver-split-{}-{:08x}", role.as_str(), hash))
    }

    /// CSS rules for the current style handles.
    ///
    /// `hidden_class` is the class the layout toggles on a hidden pane.
    pub fn stylesheet(&self, hidden_class: &str) -> String {
        let palette = self.palette.get();
        let wrapper = self.style(StyleRole::Wrapper);
        let pane = self.style(StyleRole::Pane);
        let background = rgba_u32_to_css(palette.background);
        let solid = rgba_u32_to_css(palette.solid);
        let divider = rgba_u32_to_css_alpha(palette.solid, 0.12);
        let thumb = rgba_u32_to_css(palette.scrollbar_thumb);

        format!(
            r#".{wrapper} {{
    display: flex;
    height: 100%;
}}

.{wrapper} > div {{
    width: 50%;
}}

.{wrapper}:has(> .{pane}.{hidden_class}) > div {{
    width: 100%;
}}

.{pane} {{
    background: {background};
    color: {solid};
    border-left: 1px solid {divider};
}}

.{pane}.{hidden_class} {{
    display: none;
}}

.{pane} > textarea {{
    box-sizing: border-box;
    width: 100%;
    height: 100%;
    border: none;
    resize: none;
    outline: none;
    background: inherit;
    color: inherit;
    font-family: ui-monospace, monospace;
    scrollbar-width: thin;
    scrollbar-color: {thumb} transparent;
}}
"#
        )
    }
}
