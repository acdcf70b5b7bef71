//! Structured editor view: transactions, update events and listeners.
//!
//! The structured (WYSIWYG) editor is an external collaborator. The core only
//! needs three things from it: read the current tree, dispatch a transaction,
//! and subscribe to the updates that dispatch produces.

use std::ops::Range;
use std::rc::Rc;

use crate::tree::{Block, Doc};

/// A state-transition request for the structured editor.
///
/// Replaces the top-level blocks in `range` with `content`. `sync` marks a
/// transaction that originated from the secondary editor; listeners that
/// would push content back to the secondary editor must skip it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transaction {
    pub range: Range<usize>,
    pub content: Vec<Block>,
    pub sync: bool,
}

impl Transaction {
    /// Replace `range` with `content`, untagged.
    pub fn replace(range: Range<usize>, content: Vec<Block>) -> Self {
        Self {
            range,
            content,
            sync: false,
        }
    }

    /// Set the sync tag.
    pub fn with_sync(mut self, sync: bool) -> Self {
        self.sync = sync;
        self
    }
}

/// Delivered to listeners after a transaction has been applied.
#[derive(Debug, Clone)]
pub struct UpdateEvent {
    /// Document after the transaction.
    pub doc: Rc<Doc>,
    /// Copied from the transaction that produced this update.
    pub sync: bool,
}

/// Handle for removing a listener.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

pub type UpdateListener = Rc<dyn Fn(&UpdateEvent)>;

/// Interface to the structured editor.
pub trait StructuredView {
    /// Current document.
    fn doc(&self) -> Rc<Doc>;

    /// Apply a transaction and notify listeners.
    ///
    /// Listeners run synchronously, after the new document is in place, and
    /// must not dispatch back into this view.
    fn dispatch(&mut self, tr: Transaction) -> UpdateEvent;

    /// Register a listener called after every dispatch.
    fn subscribe(&mut self, listener: UpdateListener) -> ListenerId;

    /// Remove a listener. Unknown ids are ignored.
    fn unsubscribe(&mut self, id: ListenerId);
}

/// Field-based `StructuredView`.
///
/// Used by the JS binding as the structured editor model and by tests.
#[derive(Default)]
pub struct PlainView {
    doc: Rc<Doc>,
    listeners: Vec<(ListenerId, UpdateListener)>,
    next_listener: u64,
}

impl PlainView {
    pub fn new(doc: Doc) -> Self {
        Self {
            doc: Rc::new(doc),
            listeners: Vec::new(),
            next_listener: 0,
        }
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }
}

impl std::fmt::Debug for PlainView {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PlainView")
            .field("doc", &self.doc)
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

impl StructuredView for PlainView {
    fn doc(&self) -> Rc<Doc> {
        self.doc.clone()
    }

    fn dispatch(&mut self, tr: Transaction) -> UpdateEvent {
        let mut doc = (*self.doc).clone();
        doc.replace(tr.range, tr.content);
        self.doc = Rc::new(doc);

        let event = UpdateEvent {
            doc: self.doc.clone(),
            sync: tr.sync,
        };
        tracing::trace!(
            sync = event.sync,
            blocks = event.doc.content_size(),
            listeners = self.listeners.len(),
            "dispatch"
        );

        // Snapshot so listeners may be added or removed by the host meanwhile.
        let listeners: Vec<UpdateListener> =
            self.listeners.iter().map(|(_, l)| l.clone()).collect();
        for listener in listeners {
            listener(&event);
        }
        event
    }

    fn subscribe(&mut self, listener: UpdateListener) -> ListenerId {
        let id = ListenerId(self.next_listener);
        self.next_listener += 1;
        self.listeners.push((id, listener));
        id
    }

    fn unsubscribe(&mut self, id: ListenerId) {
        self.listeners.retain(|(lid, _)| *lid != id);
    }
}
