//! WASM browser tests for weaver-split-browser.
//!
//! Run with: `wasm-pack test --headless --firefox` or `--chrome`

use std::cell::RefCell;
use std::rc::Rc;

use wasm_bindgen_test::*;

wasm_bindgen_test_configure!(run_in_browser);

use weaver_split_browser::{
    BrowserDom, DomTree, MarkdownTranscoder, PlainView, SecondaryEditor, SplitConfig,
    SplitLayout, StructuredView, TextareaEditor, ThemeManager, ThemePalette, ThemeStyles,
    mount_wrapper, unmount,
};

fn dom() -> BrowserDom {
    BrowserDom::new().unwrap()
}

/// `host > container > root`, with `host` attached to the body.
struct Page {
    host: web_sys::Element,
    container: web_sys::Element,
    root: web_sys::Element,
}

fn page(dom: &BrowserDom) -> Page {
    let host = dom.create("div").unwrap();
    let container = dom.create_element("editor-container").unwrap();
    let root = dom.create_element("editor").unwrap();
    container.append_child(&root).unwrap();
    host.append_child(&container).unwrap();
    dom.document().body().unwrap().append_child(&host).unwrap();
    Page {
        host,
        container,
        root,
    }
}

fn fire_input(textarea: &web_sys::HtmlTextAreaElement, value: &str) {
    textarea.set_value(value);
    let event = web_sys::Event::new("input").unwrap();
    textarea.dispatch_event(&event).unwrap();
}

type Layout = SplitLayout<BrowserDom, TextareaEditor>;

fn split(
    dom: &BrowserDom,
    root: &web_sys::Element,
    markdown: &str,
) -> (Layout, Rc<RefCell<PlainView>>, Rc<ThemeManager>, web_sys::Element) {
    let transcoder = Rc::new(MarkdownTranscoder::markdown());
    let doc = transcoder.text_to_tree(markdown).unwrap();
    let view = Rc::new(RefCell::new(PlainView::new(doc)));
    let theme = Rc::new(ThemeManager::new(ThemePalette::default()));
    let mut layout = Layout::new(dom.clone(), SplitConfig::default());
    let mount_dom = dom.clone();
    let pane = layout
        .split(root, &theme, &view, transcoder, move |pane, initial| {
            TextareaEditor::mount(&mount_dom, pane, initial)
        })
        .unwrap();
    (layout, view, theme, pane)
}

// === DomTree ===

#[wasm_bindgen_test]
fn test_classes() {
    let dom = dom();
    let el = dom.create_element("a").unwrap();
    assert!(dom.has_class(&el, "a"));
    dom.add_class(&el, "b");
    assert!(dom.has_class(&el, "b"));
    dom.remove_class(&el, "a");
    assert!(!dom.has_class(&el, "a"));
}

#[wasm_bindgen_test]
fn test_replace_child_error_maps_to_dom_error() {
    let dom = dom();
    let parent = dom.create("div").unwrap();
    let stranger = dom.create("div").unwrap();
    let fresh = dom.create("div").unwrap();
    let err = dom.replace_child(&parent, &fresh, &stranger).unwrap_err();
    assert!(matches!(err, weaver_split_browser::LayoutError::Dom(_)));
}

// === Wrapper mount ===

#[wasm_bindgen_test]
fn test_mount_and_unmount_wrapper() {
    let dom = dom();
    let p = page(&dom);
    let config = SplitConfig::default();

    let mounted = mount_wrapper(&dom, &p.root, &config).unwrap();
    assert_eq!(p.container.parent_element().as_ref(), Some(&mounted.wrapper));
    assert_eq!(mounted.wrapper.parent_element().as_ref(), Some(&p.host));
    assert!(dom.has_class(&mounted.wrapper, &config.wrapper_class));

    let restored = unmount(&dom, &mounted);
    assert_eq!(restored, p.container);
    assert_eq!(p.container.parent_element().as_ref(), Some(&p.host));
    assert!(mounted.wrapper.parent_element().is_none());
    assert_eq!(p.host.child_element_count(), 1);
    p.host.remove();
}

#[wasm_bindgen_test]
fn test_mount_detached_editor_fails() {
    let dom = dom();
    let editor = dom.create_element("editor").unwrap();
    assert!(mount_wrapper(&dom, &editor, &SplitConfig::default()).is_err());
}

// === Split lifecycle ===

#[wasm_bindgen_test]
fn test_split_mounts_textarea_with_markdown() {
    let dom = dom();
    let p = page(&dom);
    let (layout, _view, _theme, pane) = split(&dom, &p.root, "# Hello");

    assert!(layout.is_split());
    let textarea = layout.secondary().unwrap().element().clone();
    assert_eq!(textarea.value(), "# Hello");
    assert_eq!(
        textarea.parent_element().as_ref(),
        Some(&pane),
        "textarea lives in the pane"
    );
    drop(layout);
    assert_eq!(p.container.parent_element().as_ref(), Some(&p.host));
    p.host.remove();
}

#[wasm_bindgen_test]
fn test_textarea_input_updates_view() {
    let dom = dom();
    let p = page(&dom);
    let (mut layout, view, _theme, _pane) = split(&dom, &p.root, "# Hello");

    let textarea = layout.secondary().unwrap().element().clone();
    fire_input(&textarea, "# Hello world");
    let doc = view.borrow().doc();
    assert_eq!(
        MarkdownTranscoder::markdown().tree_to_text(&doc),
        "# Hello world"
    );
    // The change came from the textarea, so its value is untouched.
    assert_eq!(textarea.value(), "# Hello world");

    layout.deactivate();
    p.host.remove();
}

#[wasm_bindgen_test]
fn test_unterminated_fence_leaves_view_alone() {
    let dom = dom();
    let p = page(&dom);
    let (mut layout, view, _theme, _pane) = split(&dom, &p.root, "text");

    let before = view.borrow().doc();
    let textarea = layout.secondary().unwrap().element().clone();
    fire_input(&textarea, "```rust\nfn main() {");
    assert_eq!(view.borrow().doc(), before);

    layout.deactivate();
    p.host.remove();
}

#[wasm_bindgen_test]
fn test_structured_change_reaches_textarea() {
    let dom = dom();
    let p = page(&dom);
    let (mut layout, view, _theme, _pane) = split(&dom, &p.root, "one");

    let blocks = MarkdownTranscoder::markdown()
        .text_to_tree("two")
        .unwrap()
        .blocks;
    let size = view.borrow().doc().content_size();
    view.borrow_mut()
        .dispatch(weaver_split_browser::Transaction::replace(0..size, blocks));
    assert_eq!(layout.secondary().unwrap().content(), "two");

    layout.deactivate();
    p.host.remove();
}

#[wasm_bindgen_test]
fn test_deactivate_restores_layout_and_stops_sync() {
    let dom = dom();
    let p = page(&dom);
    let (mut layout, view, _theme, pane) = split(&dom, &p.root, "# Hello");
    let textarea = layout.secondary().unwrap().element().clone();
    let listeners = view.borrow().listener_count();
    assert_eq!(listeners, 1);

    let restored = layout.deactivate().unwrap();
    assert_eq!(restored, p.container);
    assert_eq!(p.container.parent_element().as_ref(), Some(&p.host));
    assert!(pane.parent_element().is_none());
    assert_eq!(view.borrow().listener_count(), 0);

    let before = view.borrow().doc();
    fire_input(&textarea, "changed");
    assert_eq!(view.borrow().doc(), before);
    p.host.remove();
}

#[wasm_bindgen_test]
fn test_pane_hidden_toggle() {
    let dom = dom();
    let p = page(&dom);
    let (mut layout, _view, _theme, pane) = split(&dom, &p.root, "x");
    let hidden = layout.config().hidden_class.clone();

    layout.set_pane_hidden(true);
    assert!(dom.has_class(&pane, &hidden));
    layout.set_pane_hidden(false);
    assert!(!dom.has_class(&pane, &hidden));

    layout.deactivate();
    p.host.remove();
}

// === Theme styles ===

#[wasm_bindgen_test]
fn test_theme_styles_follow_palette() {
    let dom = dom();
    let theme = Rc::new(ThemeManager::new(ThemePalette::default()));
    let styles = ThemeStyles::install(&dom, &theme, "hidden").unwrap();
    let before = styles.css();
    assert!(before.contains(theme.style(weaver_split_browser::StyleRole::Pane).as_str()));

    theme.set_palette(ThemePalette {
        background: 0x000000FF,
        solid: 0xFFFFFFFF,
        scrollbar_thumb: 0x808080FF,
    });
    assert_ne!(styles.css(), before);

    assert_eq!(theme.subscriber_count(), 1);
    drop(styles);
    assert_eq!(theme.subscriber_count(), 0);
    let leftover = dom
        .document()
        .query_selector("style[data-weaver-split]")
        .unwrap();
    assert!(leftover.is_none());
}

#[wasm_bindgen_test]
fn test_split_tags_wrapper_with_theme_handle() {
    let dom = dom();
    let p = page(&dom);
    let (mut layout, _view, theme, pane) = split(&dom, &p.root, "x");
    let wrapper = layout.wrapper().unwrap().clone();
    let wrapper_style = theme.style(weaver_split_browser::StyleRole::Wrapper);
    assert!(dom.has_class(&wrapper, wrapper_style.as_str()));
    assert!(dom.has_class(
        &pane,
        theme.style(weaver_split_browser::StyleRole::Pane).as_str()
    ));

    layout.deactivate();
    assert_eq!(theme.subscriber_count(), 0);
    p.host.remove();
}

#[wasm_bindgen_test]
fn test_textarea_set_content_keeps_clamped_selection() {
    let dom = dom();
    let pane = dom.create_element("pane").unwrap();
    dom.document().body().unwrap().append_child(&pane).unwrap();
    let editor = TextareaEditor::mount(&dom, &pane, "hello world").unwrap();
    let textarea = editor.element().clone();
    textarea.set_selection_range(8, 11).unwrap();

    editor.set_content("hello");
    assert_eq!(textarea.value(), "hello");
    assert_eq!(textarea.selection_start().unwrap(), Some(5));
    assert_eq!(textarea.selection_end().unwrap(), Some(5));
    pane.remove();
}
