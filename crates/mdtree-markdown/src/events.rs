//! Push-style markdown events.
//!
//! [`parse`] drives a [`MarkdownHandler`] with strictly nested enter/leave pairs for blocks
//! and spans plus text callbacks, the grammar the render dispatcher is written against.
//! `pulldown-cmark` does the tokenizing; this module only reshapes its pull events.
use pulldown_cmark::CodeBlockKind;
use pulldown_cmark::Event;
use pulldown_cmark::HeadingLevel;
use pulldown_cmark::Options;
use pulldown_cmark::Parser;
use pulldown_cmark::Tag;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BlockKind {
    /// Wraps the whole event stream. Not a block of its own.
    Document,
    Paragraph,
    Heading {
        level: u8,
    },
    HorizontalRule,
    Code {
        fenced: bool,
    },
    BlockQuote,
    /// `start` is `Some` for ordered lists.
    List {
        start: Option<u64>,
        tight: bool,
    },
    Item,
    Html,
    Other,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SpanKind {
    Strong,
    Emphasis,
    Code,
    Link,
    Image,
    Other,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TextKind {
    Normal,
    /// Inline code or the body of a code block.
    Code,
    SoftBreak,
    HardBreak,
    Html,
}

/// Callbacks for one pass over a markdown document.
///
/// Every `enter_*` call is matched by a `leave_*` call with the same kind, and pairs never
/// interleave. The `text` slice is only valid for the duration of the call.
pub trait MarkdownHandler {
    fn enter_block(&mut self, kind: BlockKind);

    fn leave_block(&mut self, kind: BlockKind);

    fn enter_span(&mut self, kind: SpanKind);

    fn leave_span(&mut self, kind: SpanKind);

    fn text(&mut self, kind: TextKind, text: &str);
}

#[derive(Clone, Copy, Debug)]
enum Open {
    Block(BlockKind),
    Span(SpanKind),
}

/// Tokenize `source` as CommonMark and feed the events to `handler`.
pub fn parse<H: MarkdownHandler + ?Sized>(source: &str, handler: &mut H) {
    let events: Vec<Event<'_>> = Parser::new_ext(source, Options::empty()).collect();
    let mut loose = loose_lists(&events).into_iter();
    let mut open: Vec<Open> = Vec::new();
    let mut code_depth = 0usize;

    handler.enter_block(BlockKind::Document);
    for event in events {
        match event {
            Event::Start(tag) => {
                let opened = match tag {
                    Tag::Paragraph => Open::Block(BlockKind::Paragraph),
                    Tag::Heading { level, .. } => Open::Block(BlockKind::Heading {
                        level: heading_level(level),
                    }),
                    Tag::BlockQuote(_) => Open::Block(BlockKind::BlockQuote),
                    Tag::CodeBlock(kind) => Open::Block(BlockKind::Code {
                        fenced: matches!(kind, CodeBlockKind::Fenced(_)),
                    }),
                    Tag::HtmlBlock => Open::Block(BlockKind::Html),
                    Tag::List(start) => Open::Block(BlockKind::List {
                        start,
                        tight: !loose.next().unwrap_or(false),
                    }),
                    Tag::Item => Open::Block(BlockKind::Item),
                    Tag::Emphasis => Open::Span(SpanKind::Emphasis),
                    Tag::Strong => Open::Span(SpanKind::Strong),
                    Tag::Link { .. } => Open::Span(SpanKind::Link),
                    Tag::Image { .. } => Open::Span(SpanKind::Image),
                    Tag::Strikethrough => Open::Span(SpanKind::Other),
                    _ => Open::Block(BlockKind::Other),
                };
                match opened {
                    Open::Block(kind) => {
                        if matches!(kind, BlockKind::Code { .. }) {
                            code_depth += 1;
                        }
                        handler.enter_block(kind);
                    }
                    Open::Span(kind) => handler.enter_span(kind),
                }
                open.push(opened);
            }
            Event::End(_) => match open.pop() {
                Some(Open::Block(kind)) => {
                    if matches!(kind, BlockKind::Code { .. }) {
                        code_depth = code_depth.saturating_sub(1);
                    }
                    handler.leave_block(kind);
                }
                Some(Open::Span(kind)) => handler.leave_span(kind),
                None => {}
            },
            Event::Text(text) => {
                let kind = if code_depth > 0 {
                    TextKind::Code
                } else {
                    TextKind::Normal
                };
                handler.text(kind, &text);
            }
            Event::Code(code) => {
                handler.enter_span(SpanKind::Code);
                handler.text(TextKind::Code, &code);
                handler.leave_span(SpanKind::Code);
            }
            Event::SoftBreak => handler.text(TextKind::SoftBreak, "\n"),
            Event::HardBreak => handler.text(TextKind::HardBreak, "\n"),
            Event::Rule => {
                handler.enter_block(BlockKind::HorizontalRule);
                handler.leave_block(BlockKind::HorizontalRule);
            }
            Event::Html(html) | Event::InlineHtml(html) => handler.text(TextKind::Html, &html),
            Event::InlineMath(text)
            | Event::DisplayMath(text)
            | Event::FootnoteReference(text) => handler.text(TextKind::Normal, &text),
            Event::TaskListMarker(checked) => {
                handler.text(TextKind::Normal, if checked { "[x] " } else { "[ ] " });
            }
        }
    }

    while let Some(opened) = open.pop() {
        match opened {
            Open::Block(kind) => handler.leave_block(kind),
            Open::Span(kind) => handler.leave_span(kind),
        }
    }
    handler.leave_block(BlockKind::Document);
}

/// Looseness of every list in `events`, in the order the lists open.
///
/// A list is loose when any of its items has a paragraph as a direct child; tight items
/// carry their text without a paragraph wrapper.
fn loose_lists(events: &[Event<'_>]) -> Vec<bool> {
    #[derive(Clone, Copy)]
    enum Frame {
        List(usize),
        Item(usize),
        Other,
    }

    let mut loose = Vec::new();
    let mut stack: Vec<Frame> = Vec::new();
    for event in events {
        match event {
            Event::Start(Tag::List(_)) => {
                stack.push(Frame::List(loose.len()));
                loose.push(false);
            }
            Event::Start(Tag::Item) => {
                let frame = match stack.last() {
                    Some(Frame::List(list)) => Frame::Item(*list),
                    _ => Frame::Other,
                };
                stack.push(frame);
            }
            Event::Start(Tag::Paragraph) => {
                if let Some(Frame::Item(list)) = stack.last() {
                    loose[*list] = true;
                }
                stack.push(Frame::Other);
            }
            Event::Start(_) => stack.push(Frame::Other),
            Event::End(_) => {
                stack.pop();
            }
            _ => {}
        }
    }
    loose
}

fn heading_level(level: HeadingLevel) -> u8 {
    match level {
        HeadingLevel::H1 => 1,
        HeadingLevel::H2 => 2,
        HeadingLevel::H3 => 3,
        HeadingLevel::H4 => 4,
        HeadingLevel::H5 => 5,
        HeadingLevel::H6 => 6,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Recorder {
        log: Vec<String>,
        depth: isize,
    }

    impl MarkdownHandler for Recorder {
        fn enter_block(&mut self, kind: BlockKind) {
            self.depth += 1;
            self.log.push(format!("+{kind:?}"));
        }

        fn leave_block(&mut self, kind: BlockKind) {
            self.depth -= 1;
            self.log.push(format!("-{kind:?}"));
        }

        fn enter_span(&mut self, kind: SpanKind) {
            self.depth += 1;
            self.log.push(format!("<{kind:?}"));
        }

        fn leave_span(&mut self, kind: SpanKind) {
            self.depth -= 1;
            self.log.push(format!(">{kind:?}"));
        }

        fn text(&mut self, kind: TextKind, text: &str) {
            self.log.push(format!("{kind:?}({text:?})"));
        }
    }

    fn record(source: &str) -> Vec<String> {
        let mut recorder = Recorder::default();
        parse(source, &mut recorder);
        assert_eq!(recorder.depth, 0, "unbalanced events for {source:?}");
        recorder.log
    }

    #[test]
    fn paragraph_with_spans() {
        assert_eq!(
            record("a **b** `c`"),
            [
                "+Document",
                "+Paragraph",
                "Normal(\"a \")",
                "<Strong",
                "Normal(\"b\")",
                ">Strong",
                "Normal(\" \")",
                "<Code",
                "Code(\"c\")",
                ">Code",
                "-Paragraph",
                "-Document",
            ]
        );
    }

    #[test]
    fn soft_break_is_a_newline_run() {
        let log = record("one\ntwo");
        assert!(log.contains(&"SoftBreak(\"\\n\")".to_string()));
        assert_eq!(log.iter().filter(|e| *e == "+Paragraph").count(), 1);
    }

    #[test]
    fn tight_list_has_no_paragraphs() {
        let log = record("- a\n- b");
        assert_eq!(log[1], "+List { start: None, tight: true }");
        assert!(!log.iter().any(|e| e == "+Paragraph"));
        assert_eq!(log.iter().filter(|e| *e == "+Item").count(), 2);
    }

    #[test]
    fn loose_list_is_reported_loose() {
        let log = record("1. a\n\n2. b");
        assert_eq!(log[1], "+List { start: Some(1), tight: false }");
        assert_eq!(log.iter().filter(|e| *e == "+Paragraph").count(), 2);
    }

    #[test]
    fn nested_list_tightness_is_per_list() {
        let log = record("- a\n\n- b\n  - c\n  - d");
        let lists: Vec<&String> = log.iter().filter(|e| e.starts_with("+List")).collect();
        assert_eq!(
            lists,
            [
                "+List { start: None, tight: false }",
                "+List { start: None, tight: true }",
            ]
        );
    }

    #[test]
    fn code_block_text_is_code() {
        let log = record("```rust\nlet x = 1;\n```");
        assert_eq!(
            log,
            [
                "+Document",
                "+Code { fenced: true }",
                "Code(\"let x = 1;\\n\")",
                "-Code { fenced: true }",
                "-Document",
            ]
        );
        assert!(record("    indented").contains(&"+Code { fenced: false }".to_string()));
    }

    #[test]
    fn rule_and_heading() {
        let log = record("## Title\n\n---");
        assert!(log.contains(&"+Heading { level: 2 }".to_string()));
        assert!(log.contains(&"+HorizontalRule".to_string()));
        assert!(log.contains(&"-HorizontalRule".to_string()));
    }

    #[test]
    fn links_and_images_are_inert_spans() {
        let log = record("[text](http://x) ![alt](img.png)");
        assert!(log.contains(&"<Link".to_string()));
        assert!(log.contains(&"Normal(\"text\")".to_string()));
        assert!(log.contains(&"<Image".to_string()));
        assert!(log.contains(&"Normal(\"alt\")".to_string()));
    }

    #[test]
    fn tables_stay_literal_text() {
        let log = record("| a | b |\n|---|---|\n| 1 | 2 |");
        assert!(log.contains(&"+Paragraph".to_string()));
        assert!(!log.iter().any(|e| e.contains("Other")));
    }

    #[test]
    fn html_block_passes_through_as_text() {
        let log = record("<div>\nhi\n</div>");
        assert_eq!(log[1], "+Html");
        assert!(log.iter().any(|e| e.starts_with("Html(")));
    }
}
