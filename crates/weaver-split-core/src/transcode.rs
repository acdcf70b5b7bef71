//! Conversion between the document tree and its plain-text source.
//!
//! The parser and serializer are collaborators supplied by the host; this
//! module only pairs them. `MarkdownParser`/`MarkdownSerializer` in
//! [`crate::markdown`] are the default pair.

use crate::tree::Doc;

/// Parses source text into a tree.
pub trait DocParser {
    /// Returns `None` when no tree can be produced for `text`.
    ///
    /// Must not panic on malformed input. Callers treat `None` as
    /// "leave the current tree alone".
    fn parse(&self, text: &str) -> Option<Doc>;
}

/// Serializes a tree to source text. Total over valid trees.
pub trait DocSerializer {
    fn serialize(&self, doc: &Doc) -> String;
}

impl<F> DocParser for F
where
    F: Fn(&str) -> Option<Doc>,
{
    fn parse(&self, text: &str) -> Option<Doc> {
        self(text)
    }
}

/// Stateless parser + serializer pair.
#[derive(Debug, Clone, Default)]
pub struct Transcoder<P, S> {
    parser: P,
    serializer: S,
}

impl<P: DocParser, S: DocSerializer> Transcoder<P, S> {
    pub fn new(parser: P, serializer: S) -> Self {
        Self { parser, serializer }
    }

    pub fn text_to_tree(&self, text: &str) -> Option<Doc> {
        self.parser.parse(text)
    }

    pub fn tree_to_text(&self, doc: &Doc) -> String {
        self.serializer.serialize(doc)
    }
}

/// The markdown transcoder used by default.
pub type MarkdownTranscoder =
    Transcoder<crate::markdown::MarkdownParser, crate::markdown::MarkdownSerializer>;

impl MarkdownTranscoder {
    pub fn markdown() -> Self {
        Transcoder::new(
            crate::markdown::MarkdownParser::default(),
            crate::markdown::MarkdownSerializer,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::Block;

    struct LineSerializer;

    impl DocSerializer for LineSerializer {
        fn serialize(&self, doc: &Doc) -> String {
            doc.blocks
                .iter()
                .map(|b| format!("{:?}", b))
                .collect::<Vec<_>>()
                .join("\n")
        }
    }

    #[test]
    fn test_closure_parser() {
        let parser = |text: &str| {
            if text.is_empty() {
                None
            } else {
                Some(Doc::new(vec![Block::paragraph(text)]))
            }
        };
        let transcoder = Transcoder::new(parser, LineSerializer);

        assert!(transcoder.text_to_tree("").is_none());
        let doc = transcoder.text_to_tree("hi").unwrap();
        assert_eq!(doc.blocks, vec![Block::paragraph("hi")]);
        assert!(transcoder.tree_to_text(&doc).contains("hi"));
    }
}
