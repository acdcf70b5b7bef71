//! Two-column layout lifecycle.
//!
//! `mount_wrapper`/`unmount` are a pure pair: mounting swaps the structured
//! editor's container for a wrapper element and moves the container inside
//! it, recording a [`MountAnchor`]; unmounting uses only the anchor to put the
//! container back in the wrapper's slot.
//!
//! [`SplitLayout`] is the `Unsplit -> Split -> Unsplit` state machine on top:
//! it adds the secondary pane, wires the sync controller and the theme
//! subscription, and undoes all of it on `deactivate`.

use std::cell::RefCell;
use std::rc::Rc;

use crate::config::SplitConfig;
use crate::dom::DomTree;
use crate::error::LayoutError;
use crate::secondary::SecondaryEditor;
use crate::sync::SyncController;
use crate::theme::{FlushSubscription, StyleHandle, StyleRole, ThemeManager};
use crate::transcode::{DocParser, DocSerializer, Transcoder};
use crate::view::StructuredView;

/// Where the structured editor's container lived before mounting.
#[derive(Debug, Clone, PartialEq)]
pub struct MountAnchor<N> {
    pub parent: N,
    pub container: N,
}

/// A wrapper element mounted in place of the editor container.
#[derive(Debug, Clone, PartialEq)]
pub struct MountedWrapper<N> {
    pub wrapper: N,
    pub anchor: MountAnchor<N>,
}

/// Wrap the structured editor's container in a new wrapper element.
///
/// `editor_root` is the structured editor's root node; its parent is the
/// container that gets moved, and the container's parent is where the wrapper
/// goes. Missing either is a setup error: the editor is not mounted yet.
pub fn mount_wrapper<D: DomTree>(
    dom: &D,
    editor_root: &D::Node,
    config: &SplitConfig,
) -> Result<MountedWrapper<D::Node>, LayoutError> {
    let container = dom
        .parent(editor_root)
        .ok_or(LayoutError::MissingRoot("structured editor has no container"))?;
    let parent = dom
        .parent(&container)
        .ok_or(LayoutError::MissingRoot("editor container is not attached"))?;

    let wrapper = dom.create_element(&config.wrapper_class)?;
    dom.replace_child(&parent, &wrapper, &container)?;
    if let Err(err) = dom.append_child(&wrapper, &container) {
        // Put the container back before reporting.
        if let Err(rollback) = dom.replace_child(&parent, &container, &wrapper) {
            tracing::warn!(%rollback, "could not put editor container back");
        }
        return Err(err);
    }
    tracing::trace!(?wrapper, ?container, "mounted split wrapper");

    Ok(MountedWrapper {
        wrapper,
        anchor: MountAnchor { parent, container },
    })
}

/// Inverse of [`mount_wrapper`]. Returns the restored container.
///
/// Safe to call any number of times: once the container is back under its
/// original parent and the wrapper is detached, further calls change nothing.
pub fn unmount<D: DomTree>(dom: &D, mounted: &MountedWrapper<D::Node>) -> D::Node {
    let MountedWrapper { wrapper, anchor } = mounted;

    if dom.parent(wrapper).as_ref() == Some(&anchor.parent) {
        if let Err(err) = dom.replace_child(&anchor.parent, &anchor.container, wrapper) {
            tracing::warn!(%err, "could not swap container back, appending");
            if let Err(err) = dom.append_child(&anchor.parent, &anchor.container) {
                tracing::warn!(%err, "could not restore editor container");
            }
        }
    } else if dom.parent(&anchor.container).as_ref() != Some(&anchor.parent) {
        // Wrapper was detached by someone else; fall back to appending.
        if let Err(err) = dom.append_child(&anchor.parent, &anchor.container) {
            tracing::warn!(%err, "could not restore editor container");
        }
    }
    dom.remove(wrapper);
    anchor.container.clone()
}

struct ActiveSplit<D: DomTree, E> {
    mounted: MountedWrapper<D::Node>,
    pane: D::Node,
    secondary: Rc<E>,
    hidden: bool,
    /// Run in order on deactivate.
    teardown: Vec<Box<dyn FnOnce()>>,
}

/// Split layout state machine for one editor instance.
pub struct SplitLayout<D: DomTree, E> {
    dom: D,
    config: SplitConfig,
    active: Option<ActiveSplit<D, E>>,
}

impl<D, E> SplitLayout<D, E>
where
    D: DomTree + 'static,
    E: SecondaryEditor + 'static,
{
    pub fn new(dom: D, config: SplitConfig) -> Self {
        Self {
            dom,
            config,
            active: None,
        }
    }

    pub fn config(&self) -> &SplitConfig {
        &self.config
    }

    pub fn dom(&self) -> &D {
        &self.dom
    }

    pub fn is_split(&self) -> bool {
        self.active.is_some()
    }

    pub fn wrapper(&self) -> Option<&D::Node> {
        self.active.as_ref().map(|a| &a.mounted.wrapper)
    }

    pub fn pane(&self) -> Option<&D::Node> {
        self.active.as_ref().map(|a| &a.pane)
    }

    pub fn secondary(&self) -> Option<&Rc<E>> {
        self.active.as_ref().map(|a| &a.secondary)
    }

    /// Mount the wrapper around `editor_root` and activate split mode.
    pub fn split<V, P, S, F>(
        &mut self,
        editor_root: &D::Node,
        theme: &Rc<ThemeManager>,
        view: &Rc<RefCell<V>>,
        transcoder: Rc<Transcoder<P, S>>,
        mount_secondary: F,
    ) -> Result<D::Node, LayoutError>
    where
        V: StructuredView + 'static,
        P: DocParser + 'static,
        S: DocSerializer + 'static,
        F: FnOnce(&D::Node, &str) -> Result<E, LayoutError>,
    {
        if self.is_split() {
            return Err(LayoutError::AlreadySplit);
        }
        let mounted = mount_wrapper(&self.dom, editor_root, &self.config)?;
        self.activate(mounted, theme, view, transcoder, mount_secondary)
    }

    /// Enter split mode inside an already mounted wrapper.
    ///
    /// Creates the secondary pane, mounts the secondary editor in it with the
    /// serialized structured document, and appends the pane after the editor
    /// container. Returns the pane element. On failure the wrapper is unmounted
    /// again.
    pub fn activate<V, P, S, F>(
        &mut self,
        mounted: MountedWrapper<D::Node>,
        theme: &Rc<ThemeManager>,
        view: &Rc<RefCell<V>>,
        transcoder: Rc<Transcoder<P, S>>,
        mount_secondary: F,
    ) -> Result<D::Node, LayoutError>
    where
        V: StructuredView + 'static,
        P: DocParser + 'static,
        S: DocSerializer + 'static,
        F: FnOnce(&D::Node, &str) -> Result<E, LayoutError>,
    {
        if self.is_split() {
            unmount(&self.dom, &mounted);
            return Err(LayoutError::AlreadySplit);
        }

        let initial = transcoder.tree_to_text(&view.borrow().doc());
        let (pane, secondary) = match self.build_pane(&mounted, &initial, mount_secondary) {
            Ok(built) => built,
            Err(err) => {
                unmount(&self.dom, &mounted);
                return Err(err);
            }
        };

        let mut teardown: Vec<Box<dyn FnOnce()>> = Vec::new();

        let sync = SyncController::new(transcoder, view, &secondary);
        sync.attach_secondary();
        let listener = view.borrow_mut().subscribe(sync.structured_listener());
        let weak_view = Rc::downgrade(view);
        teardown.push(Box::new(move || {
            sync.detach_secondary();
            if let Some(view) = weak_view.upgrade() {
                match view.try_borrow_mut() {
                    Ok(mut view) => view.unsubscribe(listener),
                    Err(_) => tracing::warn!("structured view busy, listener left subscribed"),
                }
            }
        }));

        let subscription = self.subscribe_theme(theme, &mounted.wrapper, &pane);
        let weak_theme = Rc::downgrade(theme);
        teardown.push(Box::new(move || {
            if let Some(theme) = weak_theme.upgrade() {
                theme.remove_flush(subscription);
            }
        }));

        let hidden = self.config.start_hidden;
        if hidden {
            self.dom.add_class(&pane, &self.config.hidden_class);
        }

        tracing::debug!(initial_len = initial.len(), "split layout active");
        self.active = Some(ActiveSplit {
            mounted,
            pane: pane.clone(),
            secondary,
            hidden,
            teardown,
        });
        Ok(pane)
    }

    fn build_pane<F>(
        &self,
        mounted: &MountedWrapper<D::Node>,
        initial: &str,
        mount_secondary: F,
    ) -> Result<(D::Node, Rc<E>), LayoutError>
    where
        F: FnOnce(&D::Node, &str) -> Result<E, LayoutError>,
    {
        let pane = self.dom.create_element(&self.config.pane_class)?;
        let secondary = mount_secondary(&pane, initial)?;
        if let Err(err) = self.dom.append_child(&mounted.wrapper, &pane) {
            self.dom.remove(&pane);
            return Err(err);
        }
        Ok((pane, Rc::new(secondary)))
    }

    /// Register the flush callback applying style handles, and run it once.
    fn subscribe_theme(
        &self,
        theme: &Rc<ThemeManager>,
        wrapper: &D::Node,
        pane: &D::Node,
    ) -> FlushSubscription {
        let dom = self.dom.clone();
        let wrapper = wrapper.clone();
        let pane = pane.clone();
        let applied: RefCell<Option<(StyleHandle, StyleHandle)>> = RefCell::new(None);

        let apply = Rc::new(move |theme: &ThemeManager| {
            let wrapper_style = theme.style(StyleRole::Wrapper);
            let pane_style = theme.style(StyleRole::Pane);
            let mut applied = applied.borrow_mut();
            if let Some((old_wrapper, old_pane)) = applied.take() {
                dom.remove_class(&wrapper, old_wrapper.as_str());
                dom.remove_class(&pane, old_pane.as_str());
            }
            dom.add_class(&wrapper, wrapper_style.as_str());
            dom.add_class(&pane, pane_style.as_str());
            *applied = Some((wrapper_style, pane_style));
        });

        apply(theme.as_ref());
        theme.on_flush(apply)
    }

    /// Leave split mode. Returns the restored editor container.
    ///
    /// No-op returning `None` when not split.
    pub fn deactivate(&mut self) -> Option<D::Node> {
        let Some(active) = self.active.take() else {
            tracing::trace!("deactivate while unsplit, ignoring");
            return None;
        };
        for step in active.teardown {
            step();
        }
        let container = unmount(&self.dom, &active.mounted);
        self.dom.remove(&active.pane);
        tracing::debug!("split layout restored");
        Some(container)
    }

    /// Passthrough for hosts pushing source text directly.
    pub fn on_editor_input(&self, text: &str) {
        if let Some(active) = &self.active {
            active.secondary.set_content(text);
        }
    }

    /// Show or hide the secondary pane. No-op when not split.
    pub fn set_pane_hidden(&mut self, hidden: bool) {
        let Some(active) = self.active.as_mut() else {
            return;
        };
        if hidden {
            self.dom.add_class(&active.pane, &self.config.hidden_class);
        } else {
            self.dom.remove_class(&active.pane, &self.config.hidden_class);
        }
        active.hidden = hidden;
    }

    pub fn is_pane_hidden(&self) -> bool {
        self.active.as_ref().is_some_and(|a| a.hidden)
    }
}

impl<D: DomTree, E> Drop for SplitLayout<D, E> {
    fn drop(&mut self) {
        if let Some(active) = self.active.take() {
            for step in active.teardown {
                step();
            }
            unmount(&self.dom, &active.mounted);
            self.dom.remove(&active.pane);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{MemoryDom, MemoryEditor, NodeId};
    use crate::transcode::MarkdownTranscoder;
    use crate::tree::Block;
    use crate::view::{PlainView, Transaction};

    struct Page {
        dom: MemoryDom,
        root: NodeId,
        container: NodeId,
        editor: NodeId,
    }

    /// root > container > editor
    fn page() -> Page {
        let dom = MemoryDom::new();
        let root = dom.element(&["root"]);
        let container = dom.element(&["editor-container"]);
        let editor = dom.element(&["editor"]);
        dom.append_child(&root, &container).unwrap();
        dom.append_child(&container, &editor).unwrap();
        Page {
            dom,
            root,
            container,
            editor,
        }
    }

    struct Env {
        theme: Rc<ThemeManager>,
        view: Rc<RefCell<PlainView>>,
        transcoder: Rc<MarkdownTranscoder>,
    }

    fn env(markdown: &str) -> Env {
        let transcoder = Rc::new(MarkdownTranscoder::markdown());
        let doc = transcoder.text_to_tree(markdown).unwrap();
        Env {
            theme: Rc::new(ThemeManager::default()),
            view: Rc::new(RefCell::new(PlainView::new(doc))),
            transcoder,
        }
    }

    fn split(layout: &mut SplitLayout<MemoryDom, MemoryEditor>, p: &Page, e: &Env) -> NodeId {
        layout
            .split(
                &p.editor,
                &e.theme,
                &e.view,
                e.transcoder.clone(),
                |_pane: &NodeId, initial: &str| Ok(MemoryEditor::new(initial)),
            )
            .unwrap()
    }

    #[test]
    fn test_mount_wrapper_structure() {
        let p = page();
        let mounted = mount_wrapper(&p.dom, &p.editor, &SplitConfig::default()).unwrap();

        assert_eq!(p.dom.children(p.root), vec![mounted.wrapper]);
        assert_eq!(p.dom.children(mounted.wrapper), vec![p.container]);
        assert!(p.dom.has_class(&mounted.wrapper, "weaver-two-columns-wrapper"));
        assert_eq!(mounted.anchor.parent, p.root);
    }

    #[test]
    fn test_mount_wrapper_requires_mounted_editor() {
        let dom = MemoryDom::new();
        let editor = dom.element(&[]);
        assert!(matches!(
            mount_wrapper(&dom, &editor, &SplitConfig::default()),
            Err(LayoutError::MissingRoot(_))
        ));

        let container = dom.element(&[]);
        dom.append_child(&container, &editor).unwrap();
        assert!(matches!(
            mount_wrapper(&dom, &editor, &SplitConfig::default()),
            Err(LayoutError::MissingRoot(_))
        ));
    }

    #[test]
    fn test_unmount_restores_position_among_siblings() {
        let p = page();
        let before = p.dom.element(&[]);
        let after = p.dom.element(&[]);
        p.dom.replace_child(&p.root, &before, &p.container).unwrap();
        p.dom.append_child(&p.root, &p.container).unwrap();
        p.dom.append_child(&p.root, &after).unwrap();

        let mounted = mount_wrapper(&p.dom, &p.editor, &SplitConfig::default()).unwrap();
        assert_eq!(p.dom.children(p.root), vec![before, mounted.wrapper, after]);

        unmount(&p.dom, &mounted);
        assert_eq!(p.dom.children(p.root), vec![before, p.container, after]);
    }

    #[test]
    fn test_unmount_after_wrapper_detached() {
        let p = page();
        let mounted = mount_wrapper(&p.dom, &p.editor, &SplitConfig::default()).unwrap();
        p.dom.remove(&mounted.wrapper);

        let restored = unmount(&p.dom, &mounted);
        assert_eq!(restored, p.container);
        assert_eq!(p.dom.children(p.root), vec![p.container]);
    }

    #[test]
    fn test_activate_builds_two_columns() {
        let p = page();
        let e = env("# Hello");
        let mut layout = SplitLayout::new(p.dom.clone(), SplitConfig::default());

        let pane = split(&mut layout, &p, &e);
        let wrapper = *layout.wrapper().unwrap();

        assert!(layout.is_split());
        assert_eq!(p.dom.children(p.root), vec![wrapper]);
        assert_eq!(p.dom.children(wrapper), vec![p.container, pane]);
        assert!(p.dom.has_class(&pane, "weaver-split-editor"));
        assert_eq!(layout.secondary().unwrap().content(), "# Hello");
    }

    #[test]
    fn test_activate_then_deactivate_restores_dom() {
        let p = page();
        let e = env("text");
        let mut layout = SplitLayout::new(p.dom.clone(), SplitConfig::default());

        let pane = split(&mut layout, &p, &e);
        let restored = layout.deactivate();

        assert_eq!(restored, Some(p.container));
        assert_eq!(p.dom.children(p.root), vec![p.container]);
        assert_eq!(p.dom.children(p.container), vec![p.editor]);
        assert_eq!(p.dom.parent(&pane), None);
        assert!(!layout.is_split());
    }

    #[test]
    fn test_deactivate_twice_is_noop() {
        let p = page();
        let e = env("text");
        let mut layout = SplitLayout::new(p.dom.clone(), SplitConfig::default());
        split(&mut layout, &p, &e);

        layout.deactivate();
        let after_first = (p.dom.children(p.root), p.dom.children(p.container));
        assert_eq!(layout.deactivate(), None);
        let after_second = (p.dom.children(p.root), p.dom.children(p.container));
        assert_eq!(after_first, after_second);
    }

    #[test]
    fn test_deactivate_before_activate_is_noop() {
        let p = page();
        let mut layout: SplitLayout<MemoryDom, MemoryEditor> =
            SplitLayout::new(p.dom.clone(), SplitConfig::default());
        assert_eq!(layout.deactivate(), None);
        assert_eq!(p.dom.children(p.root), vec![p.container]);
    }

    #[test]
    fn test_activate_twice_fails() {
        let p = page();
        let e = env("text");
        let mut layout = SplitLayout::new(p.dom.clone(), SplitConfig::default());
        split(&mut layout, &p, &e);

        let err = layout
            .split(&p.editor, &e.theme, &e.view, e.transcoder.clone(), |_, initial| {
                Ok(MemoryEditor::new(initial))
            })
            .unwrap_err();
        assert_eq!(err, LayoutError::AlreadySplit);
        assert_eq!(p.dom.children(p.root).len(), 1);
    }

    #[test]
    fn test_failed_secondary_mount_restores_dom() {
        let p = page();
        let e = env("text");
        let mut layout: SplitLayout<MemoryDom, MemoryEditor> =
            SplitLayout::new(p.dom.clone(), SplitConfig::default());

        let err = layout
            .split(&p.editor, &e.theme, &e.view, e.transcoder.clone(), |_, _| {
                Err(LayoutError::Secondary("boom".into()))
            })
            .unwrap_err();

        assert!(matches!(err, LayoutError::Secondary(_)));
        assert!(!layout.is_split());
        assert_eq!(p.dom.children(p.root), vec![p.container]);
    }

    #[test]
    fn test_theme_flush_updates_styles_until_deactivate() {
        let p = page();
        let e = env("text");
        let mut layout = SplitLayout::new(p.dom.clone(), SplitConfig::default());
        let pane = split(&mut layout, &p, &e);
        let wrapper = *layout.wrapper().unwrap();

        let first = e.theme.style(StyleRole::Pane);
        assert!(p.dom.has_class(&pane, first.as_str()));
        assert!(p.dom.has_class(&wrapper, e.theme.style(StyleRole::Wrapper).as_str()));
        assert_eq!(e.theme.subscriber_count(), 1);

        e.theme.set_palette(crate::theme::ThemePalette {
            background: 0x000000FF,
            solid: 0xFFFFFFFF,
            scrollbar_thumb: 0x808080FF,
        });
        let second = e.theme.style(StyleRole::Pane);
        assert!(p.dom.has_class(&pane, second.as_str()));
        assert!(!p.dom.has_class(&pane, first.as_str()));

        // Flushing repeatedly leaves one handle per element.
        e.theme.flush();
        e.theme.flush();
        assert!(p.dom.has_class(&pane, second.as_str()));

        layout.deactivate();
        assert_eq!(e.theme.subscriber_count(), 0);
        e.theme.set_palette(crate::theme::ThemePalette::default());
        assert!(!p.dom.has_class(&pane, e.theme.style(StyleRole::Pane).as_str()));
    }

    #[test]
    fn test_pane_hidden_toggle() {
        let p = page();
        let e = env("text");
        let mut layout = SplitLayout::new(p.dom.clone(), SplitConfig::default());
        let pane = split(&mut layout, &p, &e);

        layout.set_pane_hidden(true);
        assert!(p.dom.has_class(&pane, "hidden"));
        assert!(layout.is_pane_hidden());
        layout.set_pane_hidden(false);
        assert!(!p.dom.has_class(&pane, "hidden"));
    }

    #[test]
    fn test_start_hidden() {
        let p = page();
        let e = env("text");
        let config = SplitConfig {
            start_hidden: true,
            ..Default::default()
        };
        let mut layout = SplitLayout::new(p.dom.clone(), config);
        let pane = split(&mut layout, &p, &e);
        assert!(p.dom.has_class(&pane, "hidden"));
    }

    #[test]
    fn test_on_editor_input_passthrough() {
        let p = page();
        let e = env("a");
        let mut layout = SplitLayout::new(p.dom.clone(), SplitConfig::default());
        split(&mut layout, &p, &e);

        layout.on_editor_input("pushed");
        assert_eq!(layout.secondary().unwrap().content(), "pushed");
        assert_eq!(e.view.borrow().doc().blocks, vec![Block::paragraph("a")]);
    }

    #[test]
    fn test_scenario_hello_world() {
        let p = page();
        let e = env("# Hello");
        let mut layout = SplitLayout::new(p.dom.clone(), SplitConfig::default());
        split(&mut layout, &p, &e);
        let secondary = layout.secondary().unwrap().clone();
        assert_eq!(secondary.content(), "# Hello");

        secondary.type_text("# Hello world");

        assert_eq!(
            e.view.borrow().doc().blocks,
            vec![Block::heading(1, "Hello world")]
        );
        assert_eq!(secondary.content(), "# Hello world");
        assert_eq!(secondary.set_content_calls(), 0);
    }

    #[test]
    fn test_deactivate_disconnects_sync() {
        let p = page();
        let e = env("a");
        let mut layout = SplitLayout::new(p.dom.clone(), SplitConfig::default());
        split(&mut layout, &p, &e);
        let secondary = layout.secondary().unwrap().clone();

        layout.deactivate();
        assert_eq!(e.view.borrow().listener_count(), 0);
        assert!(!secondary.has_on_change());

        let span = e.view.borrow().doc().full_span();
        e.view
            .borrow_mut()
            .dispatch(Transaction::replace(span, vec![Block::paragraph("b")]));
        assert_eq!(secondary.set_content_calls(), 0);
    }

    #[test]
    fn test_drop_restores_dom() {
        let p = page();
        let e = env("a");
        {
            let mut layout = SplitLayout::new(p.dom.clone(), SplitConfig::default());
            split(&mut layout, &p, &e);
        }
        assert_eq!(p.dom.children(p.root), vec![p.container]);
        assert_eq!(e.theme.subscriber_count(), 0);
    }
}
