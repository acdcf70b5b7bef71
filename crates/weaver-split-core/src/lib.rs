//! weaver-split-core: split-pane markdown editing without framework dependencies.
//!
//! One pane holds the structured (WYSIWYG) editor, the other the markdown
//! source in a plain-text editor. This crate provides:
//! - `Doc` tree and the `Transcoder` pairing a parser with a serializer
//!   (`MarkdownParser`/`MarkdownSerializer` by default)
//! - `StructuredView` / `PlainView` - transactions carrying a `sync` tag
//! - `SecondaryEditor` - adapter trait for the plain-text editor
//! - `SyncController` - moves content between the two without echo loops
//! - `DomTree` + `SplitLayout` - two-column wrapper mount/unmount lifecycle
//! - `ThemeManager` - style handles and flush subscriptions
//!
//! Platform implementations (`web-sys` DOM, textarea editor) live in
//! `weaver-split-browser`.

pub mod color;
pub mod config;
pub mod dom;
pub mod error;
pub mod layout;
pub mod markdown;
pub mod secondary;
pub mod sync;
pub mod theme;
pub mod transcode;
pub mod tree;
pub mod view;

#[cfg(any(test, feature = "testing"))]
pub mod testing;

pub use smol_str::SmolStr;

pub use config::SplitConfig;
pub use dom::DomTree;
pub use error::{LayoutError, SplitError};
pub use layout::{MountAnchor, MountedWrapper, SplitLayout, mount_wrapper, unmount};
pub use markdown::{MarkdownParser, MarkdownSerializer, default_md_options};
pub use secondary::{ChangeCallback, SecondaryEditor};
pub use sync::{SkipReason, SyncController, SyncOutcome};
pub use theme::{FlushSubscription, StyleHandle, StyleRole, ThemeManager, ThemePalette};
pub use transcode::{DocParser, DocSerializer, MarkdownTranscoder, Transcoder};
pub use tree::{Block, Doc, Inline};
pub use view::{ListenerId, PlainView, StructuredView, Transaction, UpdateEvent, UpdateListener};
