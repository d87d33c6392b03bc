//! The render dispatcher: turns markdown events into nodes on a [`TreeSink`].
//!
//! One [`RenderContext`] lives for one pass. It tracks the open container chain, the
//! block receiving inline runs, active inline formatting, open lists and an in-flight
//! code block. Failures from the sink or the code buffer never abort the pass: the
//! affected node or run is skipped and the pass continues.
use mdtree_core::tree::Border;
use mdtree_core::tree::Length;
use mdtree_core::tree::LineBreakMode;
use mdtree_core::tree::NodeId;
use mdtree_core::tree::NodeStyle;
use mdtree_core::tree::Padding;
use mdtree_core::tree::TreeError;
use mdtree_core::tree::TreeSink;

use crate::code::CodeBuffer;
use crate::events::BlockKind;
use crate::events::MarkdownHandler;
use crate::events::SpanKind;
use crate::events::TextKind;
use crate::events::parse;
use crate::list::ListStack;
use crate::resolve::InlineFlags;
use crate::resolve::resolve_block;
use crate::resolve::resolve_inline;
use crate::style::StyleConfig;

/// Outcome of a finished render pass.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RenderSummary {
    /// Top-level blocks produced.
    pub blocks: usize,
    /// Bytes of an unterminated code block dropped by [`RenderContext::finish`].
    pub discarded_code_bytes: usize,
}

#[derive(Clone, Copy, Debug)]
struct Frame {
    node: NodeId,
    children: usize,
}

/// Streaming dispatcher that turns markdown callbacks into nodes of a [`TreeSink`].
///
/// Drive it through [`MarkdownHandler`] (usually via [`parse`]) and call
/// [`RenderContext::finish`] once the stream ends, even if it ended early.
pub struct RenderContext<'s, S: TreeSink + ?Sized> {
    sink: &'s mut S,
    style: &'s StyleConfig,
    /// Open containers, the root at the bottom.
    containers: Vec<Frame>,
    /// Whether each open blockquote pushed a frame.
    quotes: Vec<bool>,
    target: Option<NodeId>,
    blocks: usize,
    depth: usize,
    inline: InlineFlags,
    lists: ListStack,
    pending_prefix: Option<String>,
    code: Option<CodeBuffer>,
}

impl<'s, S: TreeSink + ?Sized> RenderContext<'s, S> {
    /// A context that appends blocks to the sink's root.
    pub fn new(sink: &'s mut S, style: &'s StyleConfig) -> Self {
        let root = sink.root();
        let children = sink.child_count(root);
        Self {
            sink,
            style,
            containers: vec![Frame {
                node: root,
                children,
            }],
            quotes: Vec::new(),
            target: None,
            blocks: 0,
            depth: 0,
            inline: InlineFlags::default(),
            lists: ListStack::new(),
            pending_prefix: None,
            code: None,
        }
    }

    /// Top-level blocks produced so far.
    pub fn block_count(&self) -> usize {
        self.blocks
    }

    /// End the pass, releasing any code block the event stream never closed.
    pub fn finish(mut self) -> RenderSummary {
        let discarded_code_bytes = match self.code.take() {
            Some(buf) => {
                log::debug!(
                    "markdown: discarding unterminated code block ({} bytes)",
                    buf.len()
                );
                buf.len()
            }
            None => 0,
        };
        let open = self.target.take();
        if let Some(block) = open {
            let result = self.sink.finalize_text_block(block);
            soft(result, "finalize open block");
        }
        for block in self.lists.take_item_blocks() {
            if open != Some(block) {
                let result = self.sink.finalize_text_block(block);
                soft(result, "finalize open list item");
            }
        }
        log::debug!(
            "markdown: rendered {} blocks, {} root children",
            self.blocks,
            self.sink.child_count(self.sink.root())
        );
        RenderSummary {
            blocks: self.blocks,
            discarded_code_bytes,
        }
    }

    fn container(&self) -> Frame {
        // The root frame is never popped.
        self.containers[self.containers.len() - 1]
    }

    fn at_root(&self) -> bool {
        self.containers.len() == 1
    }

    fn count_block(&mut self) {
        if self.at_root() {
            self.blocks += 1;
        }
    }

    /// Spacing for the next child of the current container.
    fn next_margin(&mut self) -> i32 {
        let Some(frame) = self.containers.last_mut() else {
            return 0;
        };
        frame.children += 1;
        if frame.children > 1 {
            self.style.paragraph_spacing
        } else {
            0
        }
    }

    fn list_indent(&self) -> Option<Padding> {
        let depth = i32::try_from(self.lists.depth()).unwrap_or(i32::MAX);
        (depth > 0).then(|| Padding::left(self.style.list_indent.saturating_mul(depth)))
    }

    fn open_text_block(&mut self, level: Option<u8>) -> Option<NodeId> {
        let parent = self.container().node;
        let block = soft(
            self.sink.create_text_block(parent, LineBreakMode::Break),
            "create text block",
        )?;
        let resolved = resolve_block(level, self.style);
        let style = NodeStyle {
            width: Some(Length::Percent(100)),
            margin_top: Some(self.next_margin()),
            padding: self.list_indent(),
            font: Some(resolved.font),
            color: Some(resolved.color),
            line_space: Some(self.style.line_spacing),
            ..NodeStyle::default()
        };
        soft(self.sink.set_node_style(block, style), "style text block");
        Some(block)
    }

    fn open_container(&mut self, style: NodeStyle) -> Option<NodeId> {
        let parent = self.container().node;
        let node = soft(self.sink.create_container(parent), "create container")?;
        let style = NodeStyle {
            width: Some(Length::Percent(100)),
            margin_top: Some(self.next_margin()),
            ..style
        };
        soft(self.sink.set_node_style(node, style), "style container");
        Some(node)
    }

    fn enter_text_block(&mut self, level: Option<u8>) {
        self.count_block();
        self.target = self.open_text_block(level);
        let prefix = self.pending_prefix.take();
        if let (Some(block), Some(prefix)) = (self.target, prefix) {
            soft(self.sink.append_run(block, &prefix), "append list prefix");
        }
    }

    fn leave_text_block(&mut self) {
        if let Some(block) = self.target.take() {
            soft(self.sink.finalize_text_block(block), "finalize text block");
        }
    }

    fn enter_item(&mut self) {
        let Some(marker) = self.lists.open_item(&self.style.list_bullet) else {
            log::debug!("markdown: list item nested beyond tracked depth");
            return;
        };
        if !marker.tight {
            self.pending_prefix = Some(marker.prefix);
            return;
        }

        self.count_block();
        let block = self.open_text_block(None);
        if let Some(block) = block {
            soft(self.sink.append_run(block, &marker.prefix), "append list prefix");
            self.target = Some(block);
        }
        if let Some(list) = self.lists.current_mut() {
            list.item_block = block;
        }
    }

    /// Open an unprefixed block for tight item text that follows a nested block.
    fn continue_item(&mut self) -> Option<NodeId> {
        let previous = self.lists.deepest()?.item_block?;
        soft(self.sink.finalize_text_block(previous), "finalize list item");
        let block = self.open_text_block(None);
        if let Some(list) = self.lists.deepest_mut() {
            list.item_block = block;
        }
        log::trace!("markdown: continuing tight list item in a new block");
        self.target = block;
        block
    }

    fn leave_item(&mut self) {
        self.pending_prefix = None;
        let Some(list) = self.lists.current_mut() else {
            return;
        };
        if let Some(block) = list.item_block.take() {
            if self.target == Some(block) {
                self.target = None;
            }
            soft(self.sink.finalize_text_block(block), "finalize list item");
        }
        self.lists.close_item();
    }

    fn enter_quote(&mut self) {
        self.count_block();
        self.target = None;
        let style = NodeStyle {
            border: Some(Border {
                color: self.style.blockquote_border_color,
                width: self.style.blockquote_border_width,
            }),
            padding: Some(Padding::left(self.style.blockquote_pad_left)),
            ..NodeStyle::default()
        };
        let node = self.open_container(style);
        if let Some(node) = node {
            self.containers.push(Frame { node, children: 0 });
        }
        self.quotes.push(node.is_some());
    }

    fn leave_quote(&mut self) {
        if self.quotes.pop() == Some(true) && !self.at_root() {
            self.containers.pop();
        }
    }

    fn enter_rule(&mut self) {
        self.count_block();
        self.target = None;
        let style = NodeStyle {
            height: Some(Length::Px(self.style.hr_height)),
            background: Some(self.style.hr_color),
            ..NodeStyle::default()
        };
        self.open_container(style);
    }

    fn leave_code(&mut self) {
        let Some(buf) = self.code.take() else {
            return;
        };
        let text = buf.finish();
        let style = NodeStyle {
            background: Some(self.style.code_block_bg_color),
            radius: Some(self.style.code_block_corner_radius),
            padding: Some(Padding::uniform(self.style.code_block_pad)),
            ..NodeStyle::default()
        };
        let Some(container) = self.open_container(style) else {
            return;
        };
        let Some(label) = soft(self.sink.create_label(container, &text), "create code label")
        else {
            return;
        };
        let font = self
            .style
            .code_font
            .as_ref()
            .unwrap_or(&self.style.body_font)
            .clone();
        let label_style = NodeStyle {
            width: Some(Length::Percent(100)),
            font: Some(font),
            color: Some(self.style.code_color),
            ..NodeStyle::default()
        };
        soft(self.sink.set_node_style(label, label_style), "style code label");
    }
}

impl<S: TreeSink + ?Sized> MarkdownHandler for RenderContext<'_, S> {
    fn enter_block(&mut self, kind: BlockKind) {
        log::trace!("markdown: enter {kind:?} at depth {}", self.depth);
        self.depth += 1;
        match kind {
            BlockKind::Document | BlockKind::Other => {}
            BlockKind::Paragraph | BlockKind::Html => self.enter_text_block(None),
            BlockKind::Heading { level } => self.enter_text_block(Some(level)),
            BlockKind::HorizontalRule => self.enter_rule(),
            BlockKind::Code { .. } => {
                self.count_block();
                self.target = None;
                self.code = Some(CodeBuffer::new());
            }
            BlockKind::BlockQuote => self.enter_quote(),
            BlockKind::List { start, tight } => {
                if !self.lists.push(start.is_some(), tight, start.unwrap_or(1)) {
                    log::debug!("markdown: list nesting capped, deeper lists are not tracked");
                }
            }
            BlockKind::Item => self.enter_item(),
        }
    }

    fn leave_block(&mut self, kind: BlockKind) {
        self.depth = self.depth.saturating_sub(1);
        log::trace!("markdown: leave {kind:?} at depth {}", self.depth);
        match kind {
            BlockKind::Document | BlockKind::Other | BlockKind::HorizontalRule => {}
            BlockKind::Paragraph | BlockKind::Html | BlockKind::Heading { .. } => {
                self.leave_text_block()
            }
            BlockKind::Code { .. } => self.leave_code(),
            BlockKind::BlockQuote => self.leave_quote(),
            BlockKind::List { .. } => {
                if self.lists.pop().is_some() {
                    self.target = None;
                }
            }
            BlockKind::Item => self.leave_item(),
        }
    }

    fn enter_span(&mut self, kind: SpanKind) {
        match kind {
            SpanKind::Strong => self.inline.strong = true,
            SpanKind::Emphasis => self.inline.emphasis = true,
            SpanKind::Code => self.inline.code = true,
            SpanKind::Link | SpanKind::Image | SpanKind::Other => {}
        }
    }

    fn leave_span(&mut self, kind: SpanKind) {
        match kind {
            SpanKind::Strong => self.inline.strong = false,
            SpanKind::Emphasis => self.inline.emphasis = false,
            SpanKind::Code => self.inline.code = false,
            SpanKind::Link | SpanKind::Image | SpanKind::Other => {}
        }
    }

    fn text(&mut self, kind: TextKind, text: &str) {
        if let Some(buf) = self.code.as_mut() {
            if let Err(err) = buf.append(text) {
                log::debug!("markdown: code block text rejected: {err}");
            }
            return;
        }
        let target = match self.target {
            Some(block) => Some(block),
            None => self.continue_item(),
        };
        let Some(block) = target else {
            log::debug!("markdown: dropping {kind:?} text outside a block");
            return;
        };
        let Some(run) = soft(self.sink.append_run(block, text), "append run") else {
            return;
        };
        if !self.inline.is_plain() {
            let style = resolve_inline(self.inline, self.style);
            soft(self.sink.set_run_style(run, style), "style run");
        }
    }
}

/// Render `source` into `sink` below its root and return the pass summary.
pub fn render_markdown<S: TreeSink + ?Sized>(
    source: &str,
    sink: &mut S,
    style: &StyleConfig,
) -> RenderSummary {
    let mut ctx = RenderContext::new(sink, style);
    parse(source, &mut ctx);
    ctx.finish()
}

fn soft<T>(result: Result<T, TreeError>, what: &str) -> Option<T> {
    match result {
        Ok(value) => Some(value),
        Err(err) => {
            log::debug!("markdown: {what} failed: {err}");
            None
        }
    }
}
