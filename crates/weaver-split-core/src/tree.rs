//! Structured document tree edited by the WYSIWYG pane.
//!
//! A `Doc` is a flat list of top-level blocks. Positions used by transactions
//! address top-level block boundaries, so a document with `n` blocks has a
//! content span of `0..n`.

use std::ops::Range;

/// A whole document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Doc {
    pub blocks: Vec<Block>,
}

impl Doc {
    pub fn new(blocks: Vec<Block>) -> Self {
        Self { blocks }
    }

    /// Size of the content span (number of top-level blocks).
    pub fn content_size(&self) -> usize {
        self.blocks.len()
    }

    /// Full content span, `0..content_size()`.
    pub fn full_span(&self) -> Range<usize> {
        0..self.content_size()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// Replace the blocks in `range` with `blocks`.
    ///
    /// Out-of-bounds ends are clamped to the content size.
    pub fn replace(&mut self, range: Range<usize>, blocks: Vec<Block>) {
        let size = self.content_size();
        let end = range.end.min(size);
        let start = range.start.min(end);
        if end != range.end || start != range.start {
            tracing::warn!(
                requested = ?range,
                size,
                "replace range outside document, clamping"
            );
        }
        self.blocks.splice(start..end, blocks);
    }
}

/// Block-level node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Block {
    Heading {
        level: u8,
        content: Vec<Inline>,
    },
    Paragraph(Vec<Inline>),
    /// Code block; `info` is the fence info string, if any.
    CodeBlock {
        info: Option<String>,
        code: String,
    },
    BlockQuote(Vec<Block>),
    /// Bullet list when `start` is `None`, ordered list otherwise.
    List {
        start: Option<u64>,
        tight: bool,
        items: Vec<Vec<Block>>,
    },
    ThematicBreak,
    Html(String),
}

impl Block {
    pub fn heading(level: u8, text: &str) -> Self {
        Block::Heading {
            level,
            content: vec![Inline::Text(text.to_string())],
        }
    }

    pub fn paragraph(text: &str) -> Self {
        Block::Paragraph(vec![Inline::Text(text.to_string())])
    }
}

/// Inline-level node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Inline {
    Text(String),
    Code(String),
    Emphasis(Vec<Inline>),
    Strong(Vec<Inline>),
    Strikethrough(Vec<Inline>),
    Link {
        dest: String,
        title: String,
        content: Vec<Inline>,
    },
    Image {
        dest: String,
        title: String,
        alt: Vec<Inline>,
    },
    SoftBreak,
    HardBreak,
    Html(String),
}

/// Push an inline, merging adjacent text runs.
pub(crate) fn push_inline(inlines: &mut Vec<Inline>, inline: Inline) {
    if let Inline::Text(ref text) = inline {
        if text.is_empty() {
            return;
        }
        if let Some(Inline::Text(last)) = inlines.last_mut() {
            last.push_str(text);
            return;
        }
    }
    inlines.push(inline);
}
