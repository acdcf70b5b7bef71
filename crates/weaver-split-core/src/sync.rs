//! Bidirectional content sync between the structured view and the secondary
//! editor.
//!
//! The controller is the only thing allowed to move content from one surface
//! to the other. Secondary edits are dispatched to the structured view as
//! transactions tagged `sync = true`; the structured-change path skips tagged
//! updates, which is what stops a secondary edit from echoing back.
//!
//! The controller holds weak references to both surfaces. Dropping either one
//! turns the corresponding path into a no-op.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use crate::secondary::SecondaryEditor;
use crate::transcode::{DocParser, DocSerializer, Transcoder};
use crate::view::{StructuredView, Transaction, UpdateEvent, UpdateListener};

/// Why a sync step did nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// Secondary text could not be parsed; structured doc left as is.
    Unparsable,
    /// Update was itself produced by a sync; not re-emitted.
    Echo,
    /// The target surface has been dropped.
    Detached,
    /// The structured view was already borrowed (re-entrant dispatch).
    Reentrant,
}

/// Result of one sync step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncOutcome {
    Applied,
    Skipped(SkipReason),
}

impl SyncOutcome {
    pub fn is_applied(&self) -> bool {
        matches!(self, SyncOutcome::Applied)
    }
}

/// Mediates content between a structured view `V` and a secondary editor `E`.
pub struct SyncController<V, E, P, S> {
    transcoder: Rc<Transcoder<P, S>>,
    view: Weak<RefCell<V>>,
    secondary: Weak<E>,
}

impl<V, E, P, S> Clone for SyncController<V, E, P, S> {
    fn clone(&self) -> Self {
        Self {
            transcoder: self.transcoder.clone(),
            view: self.view.clone(),
            secondary: self.secondary.clone(),
        }
    }
}

impl<V, E, P, S> SyncController<V, E, P, S>
where
    V: StructuredView + 'static,
    E: SecondaryEditor + 'static,
    P: DocParser + 'static,
    S: DocSerializer + 'static,
{
    pub fn new(transcoder: Rc<Transcoder<P, S>>, view: &Rc<RefCell<V>>, secondary: &Rc<E>) -> Self {
        Self {
            transcoder,
            view: Rc::downgrade(view),
            secondary: Rc::downgrade(secondary),
        }
    }

    /// Secondary → structured.
    ///
    /// Parses `text` and replaces the whole structured document with it, as a
    /// transaction tagged `sync = true`. Unparsable text leaves the structured
    /// document untouched. The structured editor's cursor is not preserved
    /// across the replacement.
    pub fn on_secondary_change(&self, text: &str) -> SyncOutcome {
        let Some(doc) = self.transcoder.text_to_tree(text) else {
            tracing::debug!(len = text.len(), "secondary text unparsable, keeping structured doc");
            return SyncOutcome::Skipped(SkipReason::Unparsable);
        };
        let Some(view) = self.view.upgrade() else {
            return SyncOutcome::Skipped(SkipReason::Detached);
        };
        let Ok(mut view) = view.try_borrow_mut() else {
            tracing::warn!("structured view busy, dropping secondary change");
            return SyncOutcome::Skipped(SkipReason::Reentrant);
        };

        let span = view.doc().full_span();
        let tr = Transaction::replace(span, doc.blocks).with_sync(true);
        view.dispatch(tr);
        SyncOutcome::Applied
    }

    /// Structured → secondary.
    ///
    /// Serializes the updated document into the secondary editor unless the
    /// update carries the sync tag.
    pub fn on_structured_change(&self, event: &UpdateEvent) -> SyncOutcome {
        if event.sync {
            tracing::trace!("skipping echo of synced update");
            return SyncOutcome::Skipped(SkipReason::Echo);
        }
        let Some(secondary) = self.secondary.upgrade() else {
            return SyncOutcome::Skipped(SkipReason::Detached);
        };
        secondary.set_content(&self.transcoder.tree_to_text(&event.doc));
        SyncOutcome::Applied
    }

    /// Push text straight into the secondary editor.
    ///
    /// For hosts that produce source text themselves and bypass the
    /// structured-change path.
    pub fn push_to_secondary(&self, text: &str) -> SyncOutcome {
        let Some(secondary) = self.secondary.upgrade() else {
            return SyncOutcome::Skipped(SkipReason::Detached);
        };
        secondary.set_content(text);
        SyncOutcome::Applied
    }

    /// Listener to subscribe on the structured view.
    pub fn structured_listener(&self) -> UpdateListener {
        let this = self.clone();
        Rc::new(move |event: &UpdateEvent| {
            this.on_structured_change(event);
        })
    }

    /// Route the secondary editor's change callback into this controller.
    pub fn attach_secondary(&self) {
        let Some(secondary) = self.secondary.upgrade() else {
            return;
        };
        let this = self.clone();
        secondary.set_on_change(Some(Box::new(move |text: &str| {
            this.on_secondary_change(text);
        })));
    }

    /// Remove the secondary editor's change callback.
    pub fn detach_secondary(&self) {
        if let Some(secondary) = self.secondary.upgrade() {
            secondary.set_on_change(None);
        }
    }
}
