//! Terminal painter for a [`VisualTree`].
//!
//! Node styles are expressed in pixels; [`CellMetrics`] converts them to terminal columns
//! and rows. Fonts become their modifier hint, underline decoration becomes
//! [`Modifier::UNDERLINED`] and positive letter spacing becomes [`Modifier::BOLD`].
use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::Modifier;
use ratatui::style::Style;
use ratatui::text::Line;
use ratatui::text::Span;
use ratatui::widgets::Widget;
use unicode_width::UnicodeWidthStr;

use crate::tree::Length;
use crate::tree::LineBreakMode;
use crate::tree::Node;
use crate::tree::NodeId;
use crate::tree::NodeKind;
use crate::tree::NodeStyle;
use crate::tree::Run;
use crate::tree::RunStyle;
use crate::tree::TextDecoration;
use crate::tree::TreeSink;
use crate::tree::VisualTree;
use crate::wrapping::WrapMode;
use crate::wrapping::wrap_spans;

const BORDER_SYMBOL: &str = "▎";
const RULE_SYMBOL: &str = "─";

/// Size of one terminal cell in pixels.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CellMetrics {
    pub col_px: u16,
    pub row_px: u16,
}

impl Default for CellMetrics {
    fn default() -> Self {
        Self {
            col_px: 8,
            row_px: 16,
        }
    }
}

impl CellMetrics {
    pub fn cols(&self, px: i32) -> u16 {
        px_to_cells(px, self.col_px)
    }

    pub fn rows(&self, px: i32) -> u16 {
        px_to_cells(px, self.row_px)
    }

    fn length_cols(&self, length: Length, available: u16) -> u16 {
        match length {
            Length::Px(px) => self.cols(px).min(available),
            Length::Percent(p) => ((available as u32 * p.min(100) as u32) / 100) as u16,
        }
    }
}

fn px_to_cells(px: i32, unit: u16) -> u16 {
    if px <= 0 || unit == 0 {
        return 0;
    }
    let unit = unit as u32;
    ((px as u32 + unit / 2) / unit).min(u16::MAX as u32) as u16
}

pub fn run_style(base: Style, style: &RunStyle) -> Style {
    let mut out = base;
    if let Some(font) = &style.font {
        out = out.add_modifier(font.modifier());
    }
    if let Some(color) = style.color {
        out = out.fg(color);
    }
    if style.decoration == Some(TextDecoration::Underline) {
        out = out.add_modifier(Modifier::UNDERLINED);
    }
    if style.letter_space.is_some_and(|ls| ls > 0) {
        out = out.add_modifier(Modifier::BOLD);
    }
    out
}

fn text_style(base: Style, style: &NodeStyle) -> Style {
    let mut out = base;
    if let Some(font) = &style.font {
        out = out.add_modifier(font.modifier());
    }
    if let Some(color) = style.color {
        out = out.fg(color);
    }
    out
}

/// Lays a subtree out into lines and paints it.
#[derive(Clone, Copy, Debug)]
pub struct TreeView<'t> {
    tree: &'t VisualTree,
    node: NodeId,
    metrics: CellMetrics,
    base: Style,
}

impl<'t> TreeView<'t> {
    pub fn new(tree: &'t VisualTree) -> Self {
        Self {
            tree,
            node: tree.root(),
            metrics: CellMetrics::default(),
            base: Style::default(),
        }
    }

    pub fn node(mut self, node: NodeId) -> Self {
        self.node = node;
        self
    }

    pub fn metrics(mut self, metrics: CellMetrics) -> Self {
        self.metrics = metrics;
        self
    }

    pub fn style(mut self, base: Style) -> Self {
        self.base = base;
        self
    }

    /// The children of the view's node laid out for `width` columns.
    pub fn lines(&self, width: u16) -> Vec<Line<'static>> {
        let mut out = Vec::new();
        self.layout_children(self.node, width, &mut out);
        out
    }

    fn layout_children(&self, id: NodeId, width: u16, out: &mut Vec<Line<'static>>) {
        for &child in self.tree.children(id) {
            let Some(node) = self.tree.node(child) else {
                continue;
            };
            if let Some(margin) = node.style().margin_top {
                let gap = self.metrics.rows(margin);
                out.extend((0..gap).map(|_| Line::default()));
            }
            self.layout_node(child, node, width, out);
        }
    }

    fn layout_node(&self, id: NodeId, node: &Node, width: u16, out: &mut Vec<Line<'static>>) {
        let style = node.style();
        let width = style
            .width
            .map(|w| self.metrics.length_cols(w, width))
            .unwrap_or(width);
        match node.kind() {
            NodeKind::Container if node.children().is_empty() && style.height.is_some() => {
                self.layout_bar(style, width, out);
            }
            NodeKind::Container => self.layout_container(id, style, width, out),
            NodeKind::TextBlock { mode, runs, .. } => {
                self.layout_text_block(style, *mode, runs, width, out);
            }
            NodeKind::Label { text } => self.layout_label(style, text, width, out),
        }
    }

    fn layout_bar(&self, style: &NodeStyle, width: u16, out: &mut Vec<Line<'static>>) {
        let rows = match style.height {
            Some(Length::Px(px)) => self.metrics.rows(px).max(1),
            _ => 1,
        };
        let mut bar = self.base;
        if let Some(color) = style.background {
            bar = bar.fg(color);
        }
        let symbol = RULE_SYMBOL.repeat(width as usize);
        out.extend((0..rows).map(|_| Line::from(Span::styled(symbol.clone(), bar))));
    }

    fn layout_container(
        &self,
        id: NodeId,
        style: &NodeStyle,
        width: u16,
        out: &mut Vec<Line<'static>>,
    ) {
        let pad = style.padding_or_default();
        let border_cols = u16::from(style.border.is_some_and(|b| b.width > 0));
        let pad_left = self.metrics.cols(pad.left);
        let pad_right = self.metrics.cols(pad.right);
        let inner_w = width
            .saturating_sub(border_cols + pad_left + pad_right)
            .max(1);

        let mut inner = Vec::new();
        inner.extend((0..self.metrics.rows(pad.top)).map(|_| Line::default()));
        self.layout_children(id, inner_w, &mut inner);
        inner.extend((0..self.metrics.rows(pad.bottom)).map(|_| Line::default()));

        let fill = style.background.map(|bg| Style::default().bg(bg));
        for line in inner {
            let mut spans: Vec<Span<'static>> = Vec::new();
            if let Some(border) = style.border.filter(|b| b.width > 0) {
                spans.push(Span::styled(BORDER_SYMBOL, self.base.fg(border.color)));
            }
            if pad_left > 0 {
                spans.push(Span::raw(" ".repeat(pad_left as usize)));
            }
            let used = line.width();
            spans.extend(line.spans);
            if fill.is_some() {
                let rest = (inner_w as usize).saturating_sub(used) + pad_right as usize;
                spans.push(Span::raw(" ".repeat(rest)));
            }
            if let Some(fill) = fill {
                let start = usize::from(border_cols);
                for span in spans.iter_mut().skip(start) {
                    span.style = fill.patch(span.style);
                }
            }
            out.push(Line::from(spans));
        }
    }

    fn layout_text_block(
        &self,
        style: &NodeStyle,
        mode: LineBreakMode,
        runs: &[Run],
        width: u16,
        out: &mut Vec<Line<'static>>,
    ) {
        let base = text_style(self.base, style);
        let spans = runs
            .iter()
            .map(|run| Span::styled(run.text().to_string(), run_style(base, run.style())))
            .collect::<Vec<_>>();
        let pad = style.padding_or_default();
        let pad_left = self.metrics.cols(pad.left);
        let inner_w = width
            .saturating_sub(pad_left + self.metrics.cols(pad.right))
            .max(1);
        let wrap = match mode {
            LineBreakMode::Break => WrapMode::Word,
        };
        let gap = style.line_space.map(|px| self.metrics.rows(px)).unwrap_or(0);
        for (i, line) in wrap_spans(&spans, inner_w, wrap).into_iter().enumerate() {
            if i > 0 {
                out.extend((0..gap).map(|_| Line::default()));
            }
            out.push(indent(line, pad_left));
        }
    }

    fn layout_label(&self, style: &NodeStyle, text: &str, width: u16, out: &mut Vec<Line<'static>>) {
        let base = text_style(self.base, style);
        let spans = [Span::styled(text.to_string(), base)];
        out.extend(wrap_spans(&spans, width, WrapMode::None));
    }
}

fn indent(line: Line<'static>, cols: u16) -> Line<'static> {
    if cols == 0 {
        return line;
    }
    let mut spans = Vec::with_capacity(line.spans.len() + 1);
    spans.push(Span::raw(" ".repeat(cols as usize)));
    spans.extend(line.spans);
    Line::from(spans)
}

impl Widget for TreeView<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.width == 0 || area.height == 0 {
            return;
        }
        let lines = self.lines(area.width);
        for (dy, line) in lines.iter().take(area.height as usize).enumerate() {
            buf.set_line(area.x, area.y + dy as u16, line, area.width);
        }
    }
}

/// Widest line, in columns.
pub fn content_width(lines: &[Line<'_>]) -> usize {
    lines
        .iter()
        .map(|l| {
            l.spans
                .iter()
                .map(|s| UnicodeWidthStr::width(s.content.as_ref()))
                .sum::<usize>()
        })
        .max()
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::Border;
    use crate::tree::Padding;
    use ratatui::style::Color;

    fn plain(lines: &[Line<'_>]) -> Vec<String> {
        lines
            .iter()
            .map(|l| {
                l.spans
                    .iter()
                    .map(|s| s.content.as_ref())
                    .collect::<String>()
                    .trim_end()
                    .to_string()
            })
            .collect()
    }

    #[test]
    fn pixel_lengths_round_to_nearest_cell() {
        let m = CellMetrics::default();
        assert_eq!(m.cols(20), 3);
        assert_eq!(m.cols(3), 0);
        assert_eq!(m.rows(10), 1);
        assert_eq!(m.rows(4), 0);
        assert_eq!(m.rows(-5), 0);
    }

    #[test]
    fn paints_blocks_with_margins_and_indent() {
        let mut tree = VisualTree::new();
        let root = tree.root();
        let first = tree.create_text_block(root, LineBreakMode::Break).unwrap();
        tree.append_run(first, "First").unwrap();
        let second = tree.create_text_block(root, LineBreakMode::Break).unwrap();
        tree.append_run(second, "Second").unwrap();
        tree.set_node_style(
            second,
            NodeStyle {
                margin_top: Some(16),
                padding: Some(Padding::left(16)),
                ..NodeStyle::default()
            },
        )
        .unwrap();

        let lines = TreeView::new(&tree).lines(20);
        assert_eq!(plain(&lines), vec!["First", "", "  Second"]);
    }

    #[test]
    fn container_draws_left_border_and_padding() {
        let mut tree = VisualTree::new();
        let root = tree.root();
        let quote = tree.create_container(root).unwrap();
        tree.set_node_style(
            quote,
            NodeStyle {
                border: Some(Border {
                    color: Color::Gray,
                    width: 3,
                }),
                padding: Some(Padding::left(8)),
                ..NodeStyle::default()
            },
        )
        .unwrap();
        let para = tree.create_text_block(quote, LineBreakMode::Break).unwrap();
        tree.append_run(para, "quoted").unwrap();

        let lines = TreeView::new(&tree).lines(20);
        assert_eq!(plain(&lines), vec!["▎ quoted"]);
        assert_eq!(lines[0].spans[0].style.fg, Some(Color::Gray));
    }

    #[test]
    fn childless_fixed_height_container_paints_a_bar() {
        let mut tree = VisualTree::new();
        let rule = tree.create_container(tree.root()).unwrap();
        tree.set_node_style(
            rule,
            NodeStyle {
                height: Some(Length::Px(1)),
                background: Some(Color::DarkGray),
                ..NodeStyle::default()
            },
        )
        .unwrap();

        let lines = TreeView::new(&tree).lines(4);
        assert_eq!(plain(&lines), vec!["────"]);
    }

    #[test]
    fn label_keeps_lines_verbatim() {
        let mut tree = VisualTree::new();
        let code = tree.create_container(tree.root()).unwrap();
        tree.create_label(code, "fn main() {\n    body\n}").unwrap();

        let lines = TreeView::new(&tree).lines(40);
        assert_eq!(plain(&lines), vec!["fn main() {", "    body", "}"]);
    }

    #[test]
    fn run_styles_map_to_modifiers() {
        let style = run_style(
            Style::default(),
            &RunStyle {
                decoration: Some(TextDecoration::Underline),
                letter_space: Some(1),
                ..RunStyle::default()
            },
        );
        assert!(style.add_modifier.contains(Modifier::UNDERLINED));
        assert!(style.add_modifier.contains(Modifier::BOLD));
    }

    #[test]
    fn undecorated_run_keeps_the_block_style() {
        let base = Style::default().fg(Color::Blue);
        assert_eq!(run_style(base, &RunStyle::default()), base);
    }

    #[test]
    fn widget_renders_into_buffer() {
        let mut tree = VisualTree::new();
        let para = tree
            .create_text_block(tree.root(), LineBreakMode::Break)
            .unwrap();
        tree.append_run(para, "hi there").unwrap();

        let area = Rect::new(0, 0, 5, 2);
        let mut buf = Buffer::empty(area);
        TreeView::new(&tree).render(area, &mut buf);
        assert_eq!(buf, Buffer::with_lines(["hi   ", "there"]));
    }
}
