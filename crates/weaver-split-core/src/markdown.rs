//! Markdown parser and serializer for the document tree.
//!
//! Parsing walks `markdown_weaver` events with a frame stack: every `Start`
//! pushes one frame and every `End` pops one, so tags we don't model still
//! balance (their inline content is folded into the nearest frame that
//! accepts inlines).
//!
//! The serializer writes canonical markdown: ATX headings, `-` bullets,
//! backtick fences, one blank line between blocks and no trailing newline.
//! Re-parsing its output yields a tree that serializes to the same text.

use markdown_weaver::{CodeBlockKind, Event, Options, Parser, Tag};

use crate::transcode::{DocParser, DocSerializer};
use crate::tree::{Block, Doc, Inline, push_inline};

/// Markdown options understood by the tree model.
pub fn default_md_options() -> Options {
    Options::ENABLE_STRIKETHROUGH
}

/// `DocParser` over `markdown_weaver`.
#[derive(Debug, Clone)]
pub struct MarkdownParser {
    options: Options,
}

impl Default for MarkdownParser {
    fn default() -> Self {
        Self {
            options: default_md_options(),
        }
    }
}

impl DocParser for MarkdownParser {
    fn parse(&self, text: &str) -> Option<Doc> {
        if text.trim().is_empty() {
            return Some(Doc::default());
        }

        let mut builder = TreeBuilder::default();
        for (event, range) in Parser::new_ext(text, self.options).into_offset_iter() {
            match event {
                Event::Start(tag) => {
                    if let Tag::CodeBlock(CodeBlockKind::Fenced(_)) = &tag {
                        // A container ending closes the fence too; only a fence
                        // still open at the end of input is unterminated.
                        let runs_to_end = text[range.end..].trim().is_empty();
                        if runs_to_end && !is_closed_fence(&text[range.clone()]) {
                            tracing::debug!(?range, "unterminated code fence, no tree");
                            return None;
                        }
                    }
                    builder.start(tag);
                }
                Event::End(_) => builder.end(),
                Event::Text(t) => builder.text(&t),
                Event::Code(t) => builder.inline(Inline::Code(t.to_string())),
                Event::Html(t) => builder.html(&t),
                Event::InlineHtml(t) => builder.inline(Inline::Html(t.to_string())),
                Event::SoftBreak => builder.inline(Inline::SoftBreak),
                Event::HardBreak => builder.inline(Inline::HardBreak),
                Event::Rule => builder.block(Block::ThematicBreak),
                _ => {}
            }
        }
        builder.finish()
    }
}

/// Check that a fenced code block's source ends with a closing fence.
fn is_closed_fence(source: &str) -> bool {
    let source = source.trim_end();
    let mut lines = source.lines();
    let Some(opening) = lines.next() else {
        return false;
    };
    let opening = opening.trim_start();
    let Some(fence_char) = opening.chars().next().filter(|c| *c == '`' || *c == '~') else {
        return false;
    };
    let fence_len = opening.chars().take_while(|c| *c == fence_char).count();

    let Some(closing) = lines.last() else {
        return false;
    };
    // Container prefixes (quotes, list indentation) precede the fence.
    let closing = closing.trim_start_matches([' ', '\t', '>']);
    let closing_len = closing.chars().take_while(|c| *c == fence_char).count();
    closing_len >= fence_len && closing[closing_len..].trim().is_empty()
}

enum SpanKind {
    Emphasis,
    Strong,
    Strikethrough,
    Link { dest: String, title: String },
    Image { dest: String, title: String },
}

enum Frame {
    Root(Vec<Block>),
    Quote(Vec<Block>),
    List {
        start: Option<u64>,
        loose: bool,
        items: Vec<Vec<Block>>,
    },
    /// List item. Tight items carry inline content without a paragraph tag.
    Item {
        blocks: Vec<Block>,
        inline: Vec<Inline>,
        loose: bool,
    },
    Paragraph(Vec<Inline>),
    Heading {
        level: u8,
        content: Vec<Inline>,
    },
    Code {
        info: Option<String>,
        code: String,
    },
    Html(String),
    Span {
        kind: SpanKind,
        content: Vec<Inline>,
    },
    /// Tag without a tree counterpart.
    Opaque,
}

struct TreeBuilder {
    stack: Vec<Frame>,
}

impl Default for TreeBuilder {
    fn default() -> Self {
        Self {
            stack: vec![Frame::Root(Vec::new())],
        }
    }
}

impl TreeBuilder {
    fn start(&mut self, tag: Tag<'_>) {
        let frame = match tag {
            Tag::Paragraph(_) => {
                if let Some(Frame::Item { loose, .. }) = self.stack.last_mut() {
                    *loose = true;
                }
                self.flush_item_inline();
                Frame::Paragraph(Vec::new())
            }
            Tag::Heading { level, .. } => {
                self.flush_item_inline();
                Frame::Heading {
                    level: level as u8,
                    content: Vec::new(),
                }
            }
            Tag::BlockQuote(_) => {
                self.flush_item_inline();
                Frame::Quote(Vec::new())
            }
            Tag::CodeBlock(kind) => {
                self.flush_item_inline();
                let info = match kind {
                    CodeBlockKind::Fenced(info) if !info.trim().is_empty() => {
                        Some(info.trim().to_string())
                    }
                    _ => None,
                };
                Frame::Code {
                    info,
                    code: String::new(),
                }
            }
            Tag::HtmlBlock => {
                self.flush_item_inline();
                Frame::Html(String::new())
            }
            Tag::List(start) => {
                self.flush_item_inline();
                Frame::List {
                    start,
                    loose: false,
                    items: Vec::new(),
                }
            }
            Tag::Item => Frame::Item {
                blocks: Vec::new(),
                inline: Vec::new(),
                loose: false,
            },
            Tag::Emphasis => Frame::Span {
                kind: SpanKind::Emphasis,
                content: Vec::new(),
            },
            Tag::Strong => Frame::Span {
                kind: SpanKind::Strong,
                content: Vec::new(),
            },
            Tag::Strikethrough => Frame::Span {
                kind: SpanKind::Strikethrough,
                content: Vec::new(),
            },
            Tag::Link {
                dest_url, title, ..
            } => Frame::Span {
                kind: SpanKind::Link {
                    dest: dest_url.to_string(),
                    title: title.to_string(),
                },
                content: Vec::new(),
            },
            Tag::Image {
                dest_url, title, ..
            } => Frame::Span {
                kind: SpanKind::Image {
                    dest: dest_url.to_string(),
                    title: title.to_string(),
                },
                content: Vec::new(),
            },
            _ => Frame::Opaque,
        };
        self.stack.push(frame);
    }

    fn end(&mut self) {
        // Root is never popped by an End event.
        if self.stack.len() <= 1 {
            return;
        }
        let Some(frame) = self.stack.pop() else {
            return;
        };
        match frame {
            Frame::Root(_) | Frame::Opaque => {}
            Frame::Quote(blocks) => self.block(Block::BlockQuote(blocks)),
            Frame::List {
                start,
                loose,
                items,
            } => self.block(Block::List {
                start,
                tight: !loose,
                items,
            }),
            Frame::Item {
                mut blocks,
                inline,
                loose,
            } => {
                if !inline.is_empty() {
                    blocks.push(Block::Paragraph(inline));
                }
                if let Some(Frame::List {
                    items, loose: l, ..
                }) = self.stack.last_mut()
                {
                    items.push(blocks);
                    *l |= loose;
                }
            }
            Frame::Paragraph(content) => self.block(Block::Paragraph(content)),
            Frame::Heading { level, content } => self.block(Block::Heading { level, content }),
            Frame::Code { info, code } => self.block(Block::CodeBlock { info, code }),
            Frame::Html(html) => self.block(Block::Html(html)),
            Frame::Span { kind, content } => {
                let inline = match kind {
                    SpanKind::Emphasis => Inline::Emphasis(content),
                    SpanKind::Strong => Inline::Strong(content),
                    SpanKind::Strikethrough => Inline::Strikethrough(content),
                    SpanKind::Link { dest, title } => Inline::Link {
                        dest,
                        title,
                        content,
                    },
                    SpanKind::Image { dest, title } => Inline::Image {
                        dest,
                        title,
                        alt: content,
                    },
                };
                self.inline(inline);
            }
        }
    }

    fn text(&mut self, text: &str) {
        match self.stack.last_mut() {
            Some(Frame::Code { code, .. }) => code.push_str(text),
            Some(Frame::Html(html)) => html.push_str(text),
            _ => self.inline(Inline::Text(text.to_string())),
        }
    }

    fn html(&mut self, html: &str) {
        match self.stack.last_mut() {
            Some(Frame::Html(buf)) => buf.push_str(html),
            _ => self.inline(Inline::Html(html.to_string())),
        }
    }

    fn inline(&mut self, inline: Inline) {
        for frame in self.stack.iter_mut().rev() {
            match frame {
                Frame::Opaque => continue,
                Frame::Paragraph(content)
                | Frame::Heading { content, .. }
                | Frame::Span { content, .. } => {
                    push_inline(content, inline);
                    return;
                }
                Frame::Item { inline: buf, .. } => {
                    push_inline(buf, inline);
                    return;
                }
                Frame::Root(blocks) | Frame::Quote(blocks) => {
                    // Stray inline content directly under a block container.
                    if let Some(Block::Paragraph(content)) = blocks.last_mut() {
                        push_inline(content, inline);
                    } else {
                        blocks.push(Block::Paragraph(vec![inline]));
                    }
                    return;
                }
                Frame::Code { .. } | Frame::Html(_) | Frame::List { .. } => return,
            }
        }
    }

    fn block(&mut self, block: Block) {
        self.flush_item_inline();
        for frame in self.stack.iter_mut().rev() {
            match frame {
                Frame::Root(blocks) | Frame::Quote(blocks) | Frame::Item { blocks, .. } => {
                    blocks.push(block);
                    return;
                }
                Frame::Opaque => continue,
                _ => return,
            }
        }
    }

    /// Move pending tight-item inline content into a paragraph block.
    fn flush_item_inline(&mut self) {
        if let Some(Frame::Item { blocks, inline, .. }) = self.stack.last_mut() {
            if !inline.is_empty() {
                blocks.push(Block::Paragraph(std::mem::take(inline)));
            }
        }
    }

    fn finish(mut self) -> Option<Doc> {
        while self.stack.len() > 1 {
            self.end();
        }
        match self.stack.pop() {
            Some(Frame::Root(blocks)) => Some(Doc::new(blocks)),
            _ => None,
        }
    }
}

/// `DocSerializer` emitting canonical markdown.
#[derive(Debug, Clone, Copy, Default)]
pub struct MarkdownSerializer;

impl DocSerializer for MarkdownSerializer {
    fn serialize(&self, doc: &Doc) -> String {
        write_blocks(&doc.blocks, "\n\n")
    }
}

fn write_blocks(blocks: &[Block], separator: &str) -> String {
    let mut alternate = false;
    let mut prev_was_list = false;
    blocks
        .iter()
        .map(|block| {
            let is_list = matches!(block, Block::List { .. });
            // Adjacent lists with the same marker would merge into one list.
            alternate = is_list && prev_was_list && !alternate;
            prev_was_list = is_list;
            write_block(block, alternate)
        })
        .collect::<Vec<_>>()
        .join(separator)
}

/// `alternate` picks the `*` bullet or `)` delimiter over `-` / `.`.
fn write_block(block: &Block, alternate: bool) -> String {
    match block {
        Block::Heading { level, content } => {
            let level = (*level).clamp(1, 6) as usize;
            let mut text = write_inlines(content);
            escape_closing_sequence(&mut text);
            if text.is_empty() {
                "#".repeat(level)
            } else {
                format!("{} {}", "#".repeat(level), text)
            }
        }
        Block::Paragraph(content) => write_inlines(content),
        Block::CodeBlock { info, code } => {
            let fence = "`".repeat((longest_run(code, '`') + 1).max(3));
            let body = code.strip_suffix('\n').unwrap_or(code);
            let info = info.as_deref().unwrap_or("");
            if body.is_empty() {
                format!("{fence}{info}\n{fence}")
            } else {
                format!("{fence}{info}\n{body}\n{fence}")
            }
        }
        Block::BlockQuote(blocks) => prefix_lines(&write_blocks(blocks, "\n\n"), "> ", ">"),
        Block::List {
            start,
            tight,
            items,
        } => {
            let (item_sep, block_sep) = if *tight { ("\n", "\n") } else { ("\n\n", "\n\n") };
            items
                .iter()
                .enumerate()
                .map(|(idx, item)| {
                    let marker = match (start, alternate) {
                        (Some(n), false) => format!("{}. ", n + idx as u64),
                        (Some(n), true) => format!("{}) ", n + idx as u64),
                        (None, false) => "- ".to_string(),
                        (None, true) => "* ".to_string(),
                    };
                    let body = write_blocks(item, block_sep);
                    if body.is_empty() {
                        return marker.trim_end().to_string();
                    }
                    let indent = " ".repeat(marker.len());
                    let mut out = String::new();
                    for (i, line) in body.split('\n').enumerate() {
                        if i == 0 {
                            out.push_str(&marker);
                            out.push_str(line);
                        } else {
                            out.push('\n');
                            if !line.is_empty() {
                                out.push_str(&indent);
                                out.push_str(line);
                            }
                        }
                    }
                    out
                })
                .collect::<Vec<_>>()
                .join(item_sep)
        }
        Block::ThematicBreak => "---".to_string(),
        Block::Html(html) => html.trim_end().to_string(),
    }
}

/// Escape a trailing `#` run that would read as an ATX closing sequence.
fn escape_closing_sequence(text: &mut String) {
    let kept = text.trim_end_matches('#').len();
    if kept == text.len() {
        return;
    }
    if kept == 0 || text[..kept].ends_with([' ', '\t']) {
        text.insert(kept, '\\');
    }
}

fn prefix_lines(text: &str, prefix: &str, empty_prefix: &str) -> String {
    text.split('\n')
        .map(|line| {
            if line.is_empty() {
                empty_prefix.to_string()
            } else {
                format!("{prefix}{line}")
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn longest_run(text: &str, ch: char) -> usize {
    let mut longest = 0;
    let mut current = 0;
    for c in text.chars() {
        if c == ch {
            current += 1;
            longest = longest.max(current);
        } else {
            current = 0;
        }
    }
    longest
}

fn write_inlines(inlines: &[Inline]) -> String {
    let mut out = String::new();
    let mut line_start = true;
    write_inlines_into(inlines, &mut out, &mut line_start);
    out
}

fn write_inlines_into(inlines: &[Inline], out: &mut String, line_start: &mut bool) {
    for (idx, inline) in inlines.iter().enumerate() {
        match inline {
            Inline::Text(text) => {
                escape_text(text, *line_start, out);
                *line_start = false;
            }
            Inline::Code(code) => {
                let fence = "`".repeat(longest_run(code, '`') + 1);
                let pad = code.starts_with('`')
                    || code.ends_with('`')
                    || (code.starts_with(' ') && code.ends_with(' ') && !code.trim().is_empty());
                let pad = if pad { " " } else { "" };
                out.push_str(&format!("{fence}{pad}{code}{pad}{fence}"));
                *line_start = false;
            }
            Inline::Emphasis(content) => wrap_span(content, "*", out, line_start),
            Inline::Strong(content) => wrap_span(content, "**", out, line_start),
            Inline::Strikethrough(content) => wrap_span(content, "~~", out, line_start),
            Inline::Link {
                dest,
                title,
                content,
            } => {
                // `!` right before `[` would turn the link into an image.
                let after_text = idx > 0 && matches!(inlines[idx - 1], Inline::Text(_));
                if after_text && out.ends_with('!') {
                    out.insert(out.len() - 1, '\\');
                }
                out.push('[');
                *line_start = false;
                write_inlines_into(content, out, line_start);
                out.push(']');
                write_destination(dest, title, out);
            }
            Inline::Image { dest, title, alt } => {
                out.push_str("![");
                *line_start = false;
                write_inlines_into(alt, out, line_start);
                out.push(']');
                write_destination(dest, title, out);
            }
            Inline::SoftBreak => {
                out.push('\n');
                *line_start = true;
            }
            Inline::HardBreak => {
                out.push_str("\\\n");
                *line_start = true;
            }
            Inline::Html(html) => {
                out.push_str(html);
                *line_start = false;
            }
        }
    }
}

fn wrap_span(content: &[Inline], delim: &str, out: &mut String, line_start: &mut bool) {
    out.push_str(delim);
    *line_start = false;
    write_inlines_into(content, out, line_start);
    out.push_str(delim);
}

fn write_destination(dest: &str, title: &str, out: &mut String) {
    out.push('(');
    if dest.contains([' ', '(', ')', '<', '>']) {
        out.push('<');
        out.push_str(dest);
        out.push('>');
    } else {
        out.push_str(dest);
    }
    if !title.is_empty() {
        out.push_str(" \"");
        out.push_str(&title.replace('"', "\\\""));
        out.push('"');
    }
    out.push(')');
}

/// Escape text so it re-parses as the same literal text.
fn escape_text(text: &str, line_start: bool, out: &mut String) {
    let ordered_marker = if line_start {
        let digits = text.chars().take_while(|c| c.is_ascii_digit()).count();
        (digits > 0 && matches!(text[digits..].chars().next(), Some('.') | Some(')')))
            .then_some(digits)
    } else {
        None
    };

    for (idx, ch) in text.char_indices() {
        let needs_escape = match ch {
            '\\' | '`' | '*' | '_' | '[' | ']' | '<' | '&' | '~' => true,
            '#' | '>' | '-' | '+' | '=' => line_start && idx == 0,
            '.' | ')' => ordered_marker == Some(idx),
            _ => false,
        };
        if needs_escape {
            out.push('\\');
        }
        out.push(ch);
    }
}
