//! SplitEditor - markdown document with an optional source pane.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use wasm_bindgen::prelude::*;

use weaver_split_browser::{
    BrowserDom, DomTree, ListenerId, MarkdownTranscoder, MountedWrapper, PlainView, SplitConfig,
    SplitLayout, StructuredView, TextareaEditor, ThemeManager, ThemePalette, ThemeStyles,
    Transaction, UpdateEvent, default_md_options, unmount,
};

use crate::types::JsThemePalette;

type Layout = SplitLayout<BrowserDom, TextareaEditor>;

const STRUCTURED_CLASS: &str = "weaver-split-structured";

/// Parse an optional config object; `undefined`/`null` gives the defaults.
fn parse_config(config: JsValue) -> Result<SplitConfig, JsError> {
    let config: SplitConfig = if config.is_undefined() || config.is_null() {
        SplitConfig::default()
    } else {
        serde_wasm_bindgen::from_value(config)
            .map_err(|e| JsError::new(&format!("Invalid config: {}", e)))?
    };
    config
        .validate()
        .map_err(|e| JsError::new(&e.to_string()))?;
    Ok(config)
}

fn render_html(markdown: &str) -> String {
    let parser = markdown_weaver::Parser::new_ext(markdown, default_md_options());
    let mut html_buf = String::new();
    markdown_weaver::html::push_html(&mut html_buf, parser);
    html_buf
}

/// Mounted structured editor state.
struct Mounted {
    root: web_sys::Element,
    layout: Rc<RefCell<Layout>>,
    render_listener: ListenerId,
    _styles: ThemeStyles,
}

/// Structured markdown editor with split mode, exposed to JavaScript.
#[wasm_bindgen]
pub struct SplitEditor {
    view: Rc<RefCell<PlainView>>,
    transcoder: Rc<MarkdownTranscoder>,
    theme: Rc<ThemeManager>,
    config: SplitConfig,
    mounted: Option<Mounted>,
}

#[wasm_bindgen]
impl SplitEditor {
    /// Create an editor from markdown text.
    ///
    /// `config` is an optional `{ wrapperClass, paneClass, hiddenClass,
    /// startHidden }` object.
    #[wasm_bindgen(js_name = fromMarkdown)]
    pub fn from_markdown(content: &str, config: JsValue) -> Result<SplitEditor, JsError> {
        let config = parse_config(config)?;
        let transcoder = Rc::new(MarkdownTranscoder::markdown());
        let doc = transcoder
            .text_to_tree(content)
            .ok_or_else(|| JsError::new("Markdown has an unterminated code fence"))?;
        Ok(Self {
            view: Rc::new(RefCell::new(PlainView::new(doc))),
            transcoder,
            theme: Rc::new(ThemeManager::new(ThemePalette::default())),
            config,
            mounted: None,
        })
    }

    /// Canonical markdown of the structured document.
    #[wasm_bindgen(js_name = getMarkdown)]
    pub fn get_markdown(&self) -> String {
        self.transcoder.tree_to_text(&self.view.borrow().doc())
    }

    /// Render the structured editor into `container`.
    pub fn mount(&mut self, container: web_sys::HtmlElement) -> Result<(), JsError> {
        if self.mounted.is_some() {
            return Err(JsError::new("Editor is already mounted"));
        }
        let dom = BrowserDom::new().map_err(|e| JsError::new(&e.to_string()))?;
        let root = dom
            .create_element(STRUCTURED_CLASS)
            .map_err(|e| JsError::new(&e.to_string()))?;
        root.set_inner_html(&render_html(&self.get_markdown()));
        container
            .append_child(&root)
            .map_err(|e| JsError::new(&format!("Failed to mount editor: {:?}", e)))?;

        let render_listener = {
            let root = root.clone();
            let transcoder = self.transcoder.clone();
            self.view
                .borrow_mut()
                .subscribe(Rc::new(move |event: &UpdateEvent| {
                    root.set_inner_html(&render_html(&transcoder.tree_to_text(&event.doc)));
                }))
        };

        let styles = ThemeStyles::install(&dom, &self.theme, &self.config.hidden_class)
            .map_err(|e| JsError::new(&e.to_string()))?;

        self.mounted = Some(Mounted {
            root,
            layout: Rc::new(RefCell::new(Layout::new(dom, self.config.clone()))),
            render_listener,
            _styles: styles,
        });
        Ok(())
    }

    /// Replace the document with `content` as a host-side edit.
    ///
    /// Returns false, leaving the document alone, when `content` does not
    /// parse.
    #[wasm_bindgen(js_name = applyMarkdown)]
    pub fn apply_markdown(&self, content: &str) -> bool {
        let Some(doc) = self.transcoder.text_to_tree(content) else {
            return false;
        };
        let mut view = self.view.borrow_mut();
        let span = view.doc().full_span();
        view.dispatch(Transaction::replace(span, doc.blocks));
        true
    }

    /// Change the theme palette. Mounted styles update immediately.
    #[wasm_bindgen(js_name = setPalette)]
    pub fn set_palette(&self, palette: JsThemePalette) -> Result<(), JsError> {
        self.theme.set_palette(palette.to_palette()?);
        Ok(())
    }

    /// Enter split mode.
    ///
    /// Returns `[paneElement, deactivate, onEditorInput]`. `deactivate()`
    /// restores the original layout; `onEditorInput(text)` overwrites the
    /// source pane without touching the structured document.
    pub fn activate(&self, palette: Option<JsThemePalette>) -> Result<js_sys::Array, JsError> {
        self.enter_split(None, palette)
    }

    /// Enter split mode inside a wrapper from `mountWrapper`.
    ///
    /// The wrapper must hold this editor's container. The split layout takes
    /// it over: `deactivate()` unmounts it and the handle reports
    /// `isMounted() === false` from here on.
    #[wasm_bindgen(js_name = activateIn)]
    pub fn activate_in(
        &self,
        wrapper: &mut SplitWrapper,
        palette: Option<JsThemePalette>,
    ) -> Result<js_sys::Array, JsError> {
        let mounted = self
            .mounted
            .as_ref()
            .ok_or_else(|| JsError::new("Editor must be mounted before activating split mode"))?;
        let Some(anchor) = wrapper.mounted.as_ref().map(|w| &w.anchor) else {
            return Err(JsError::new("Wrapper is no longer mounted"));
        };
        if mounted.root.parent_element().as_ref() != Some(&anchor.container) {
            return Err(JsError::new("Wrapper does not hold this editor"));
        }
        self.enter_split(wrapper.mounted.take(), palette)
    }

    /// Leave split mode. No-op when not split.
    pub fn deactivate(&self) {
        if let Some(mounted) = &self.mounted {
            mounted.layout.borrow_mut().deactivate();
        }
    }

    /// Show or hide the source pane.
    #[wasm_bindgen(js_name = setPaneHidden)]
    pub fn set_pane_hidden(&self, hidden: bool) {
        if let Some(mounted) = &self.mounted {
            mounted.layout.borrow_mut().set_pane_hidden(hidden);
        }
    }

    #[wasm_bindgen(js_name = isSplit)]
    pub fn is_split(&self) -> bool {
        self.mounted
            .as_ref()
            .is_some_and(|m| m.layout.borrow().is_split())
    }
}

impl SplitEditor {
    fn enter_split(
        &self,
        wrapper: Option<MountedWrapper<web_sys::Element>>,
        palette: Option<JsThemePalette>,
    ) -> Result<js_sys::Array, JsError> {
        let mounted = self
            .mounted
            .as_ref()
            .ok_or_else(|| JsError::new("Editor must be mounted before activating split mode"))?;
        if let Some(palette) = palette {
            self.theme.set_palette(palette.to_palette()?);
        }

        let pane = {
            let mut layout = mounted
                .layout
                .try_borrow_mut()
                .map_err(|_| JsError::new("Split layout is busy"))?;
            let dom = layout.dom().clone();
            let mount_secondary = move |pane: &web_sys::Element, initial: &str| {
                TextareaEditor::mount(&dom, pane, initial)
            };
            let transcoder = self.transcoder.clone();
            match wrapper {
                Some(wrapper) => {
                    layout.activate(wrapper, &self.theme, &self.view, transcoder, mount_secondary)
                }
                None => layout.split(
                    &mounted.root,
                    &self.theme,
                    &self.view,
                    transcoder,
                    mount_secondary,
                ),
            }
            .map_err(|e| JsError::new(&e.to_string()))?
        };

        let deactivate = {
            let layout: Weak<RefCell<Layout>> = Rc::downgrade(&mounted.layout);
            Closure::<dyn FnMut()>::new(move || {
                let Some(layout) = layout.upgrade() else {
                    return;
                };
                match layout.try_borrow_mut() {
                    Ok(mut layout) => {
                        layout.deactivate();
                    }
                    Err(_) => tracing::warn!("split layout busy, deactivate ignored"),
                }
            })
        };

        let on_editor_input = {
            let layout: Weak<RefCell<Layout>> = Rc::downgrade(&mounted.layout);
            Closure::<dyn FnMut(String)>::new(move |text: String| {
                if let Some(layout) = layout.upgrade() {
                    if let Ok(layout) = layout.try_borrow() {
                        layout.on_editor_input(&text);
                    }
                }
            })
        };

        Ok(js_sys::Array::of3(
            &pane,
            &deactivate.into_js_value(),
            &on_editor_input.into_js_value(),
        ))
    }
}

impl Drop for SplitEditor {
    fn drop(&mut self) {
        if let Some(mounted) = self.mounted.take() {
            mounted.layout.borrow_mut().deactivate();
            self.view.borrow_mut().unsubscribe(mounted.render_listener);
            mounted.root.remove();
        }
    }
}

/// Two-column wrapper mounted by `mountWrapper`.
///
/// Either `unmount()` it or hand it to `SplitEditor.activateIn`.
#[wasm_bindgen]
pub struct SplitWrapper {
    dom: BrowserDom,
    mounted: Option<MountedWrapper<web_sys::Element>>,
}

#[wasm_bindgen]
impl SplitWrapper {
    /// The wrapper element, while mounted.
    #[wasm_bindgen(getter)]
    pub fn element(&self) -> Option<web_sys::Element> {
        self.mounted.as_ref().map(|m| m.wrapper.clone())
    }

    #[wasm_bindgen(js_name = isMounted)]
    pub fn is_mounted(&self) -> bool {
        self.mounted.is_some()
    }

    /// Put the editor container back where it was. Returns the container, or
    /// `undefined` if the wrapper was already unmounted or handed over.
    pub fn unmount(&mut self) -> Option<web_sys::Element> {
        let mounted = self.mounted.take()?;
        Some(unmount(&self.dom, &mounted))
    }
}

/// Wrap the container of `editor_root` in a two-column wrapper element.
///
/// For hosts driving the layout themselves; `SplitEditor.activate` does this
/// on its own.
#[wasm_bindgen(js_name = mountWrapper)]
pub fn mount_wrapper(
    editor_root: web_sys::Element,
    config: JsValue,
) -> Result<SplitWrapper, JsError> {
    let config = parse_config(config)?;
    let dom = BrowserDom::new().map_err(|e| JsError::new(&e.to_string()))?;
    let mounted = weaver_split_browser::mount_wrapper(&dom, &editor_root, &config)
        .map_err(|e| JsError::new(&e.to_string()))?;
    Ok(SplitWrapper {
        dom,
        mounted: Some(mounted),
    })
}
