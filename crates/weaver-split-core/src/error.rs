//! Error types for split editing.
//!
//! Only setup failures are errors. Unparsable secondary text is reported as a
//! skipped sync (see [`crate::sync::SyncOutcome`]), and redundant teardown is
//! a no-op.

use miette::Diagnostic;

/// Failures while building or entering the split layout.
#[derive(thiserror::Error, Debug, Diagnostic, Clone, PartialEq, Eq)]
pub enum LayoutError {
    /// The structured editor has no mounted container or the container has no
    /// parent. The editor was not mounted before split mode was entered.
    #[error("missing root element: {0}")]
    #[diagnostic(
        code(weaver_split::layout::missing_root),
        help("mount the structured editor before activating split mode")
    )]
    MissingRoot(&'static str),

    /// `activate` was called while a wrapper is already mounted.
    #[error("split layout is already active")]
    #[diagnostic(code(weaver_split::layout::already_split))]
    AlreadySplit,

    /// The platform refused a DOM operation.
    #[error("dom operation failed: {0}")]
    #[diagnostic(code(weaver_split::layout::dom))]
    Dom(String),

    /// The secondary editor could not be mounted into its pane.
    #[error("failed to mount secondary editor: {0}")]
    #[diagnostic(code(weaver_split::layout::secondary))]
    Secondary(String),
}

/// Top-level error for the split editing crates.
#[derive(thiserror::Error, Debug, Diagnostic)]
pub enum SplitError {
    #[error(transparent)]
    #[diagnostic(transparent)]
    Layout(#[from] LayoutError),

    /// Invalid configuration value.
    #[error("invalid configuration: {0}")]
    #[diagnostic(code(weaver_split::config))]
    Config(String),
}
