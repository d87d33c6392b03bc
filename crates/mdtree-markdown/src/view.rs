use std::borrow::Cow;

use mdtree_core::render::CellMetrics;
use mdtree_core::render::TreeView;
use mdtree_core::tree::TreeSink;
use mdtree_core::tree::VisualTree;
use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::text::Line;
use ratatui::text::Text;
use ratatui::widgets::Widget;

use crate::render::render_markdown;
use crate::style::StyleConfig;

/// A markdown document and the visual tree built from it.
///
/// Every change to the text or the style tears the tree down and renders it again from the
/// source. Text is either copied in ([`set_text`](Self::set_text)) or borrowed for `'a`
/// ([`set_text_static`](Self::set_text_static)).
#[derive(Debug)]
pub struct MarkdownView<'a, S: TreeSink = VisualTree> {
    tree: S,
    source: Option<Cow<'a, str>>,
    style: StyleConfig,
    blocks: usize,
    metrics: CellMetrics,
}

impl Default for MarkdownView<'_> {
    fn default() -> Self {
        Self::new()
    }
}

impl MarkdownView<'_> {
    pub fn new() -> Self {
        Self::with_sink(VisualTree::new())
    }
}

impl<'a, S: TreeSink> MarkdownView<'a, S> {
    /// A view that renders into `tree`. Existing children of its root are removed on the
    /// first render.
    pub fn with_sink(tree: S) -> Self {
        Self {
            tree,
            source: None,
            style: StyleConfig::default(),
            blocks: 0,
            metrics: CellMetrics::default(),
        }
    }

    pub fn with_style(mut self, style: StyleConfig) -> Self {
        self.set_style(style);
        self
    }

    pub fn with_metrics(mut self, metrics: CellMetrics) -> Self {
        self.metrics = metrics;
        self
    }

    /// Replace the document with a copy of `text`. `None` or an empty string clears it.
    pub fn set_text<'t>(&mut self, text: impl Into<Option<&'t str>>) {
        self.source = text
            .into()
            .filter(|text| !text.is_empty())
            .map(|text| Cow::Owned(text.to_owned()));
        self.rebuild();
    }

    /// Replace the document with `text` without copying it.
    pub fn set_text_static(&mut self, text: impl Into<Option<&'a str>>) {
        self.source = text
            .into()
            .filter(|text| !text.is_empty())
            .map(Cow::Borrowed);
        self.rebuild();
    }

    /// Replace the style. `None` leaves the current style and tree untouched.
    pub fn set_style(&mut self, style: impl Into<Option<StyleConfig>>) {
        let Some(style) = style.into() else {
            return;
        };
        self.style = style;
        if self.source.is_some() {
            self.rebuild();
        }
    }

    pub fn text(&self) -> Option<&str> {
        self.source.as_deref()
    }

    /// Whether the current text is borrowed rather than owned.
    pub fn is_static(&self) -> bool {
        matches!(self.source, Some(Cow::Borrowed(_)))
    }

    pub fn style(&self) -> &StyleConfig {
        &self.style
    }

    /// Top-level blocks produced by the last render, 0 before any text was set.
    pub fn block_count(&self) -> usize {
        self.blocks
    }

    pub fn tree(&self) -> &S {
        &self.tree
    }

    pub fn into_tree(self) -> S {
        self.tree
    }

    fn rebuild(&mut self) {
        let root = self.tree.root();
        if let Err(err) = self.tree.remove_all_children(root) {
            log::debug!("markdown: clearing tree failed: {err}");
        }
        self.blocks = match &self.source {
            Some(source) => render_markdown(source, &mut self.tree, &self.style).blocks,
            None => 0,
        };
    }
}

impl MarkdownView<'_, VisualTree> {
    fn tree_view(&self) -> TreeView<'_> {
        TreeView::new(&self.tree).metrics(self.metrics)
    }

    /// The document laid out to `width` columns.
    pub fn lines_for_width(&self, width: u16) -> Vec<Line<'static>> {
        self.tree_view().lines(width)
    }

    pub fn as_text(&self, width: u16) -> Text<'static> {
        Text::from(self.lines_for_width(width))
    }

    pub fn render_ref(&self, area: Rect, buf: &mut Buffer) {
        self.tree_view().render(area, buf);
    }
}

impl Widget for &MarkdownView<'_, VisualTree> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        self.render_ref(area, buf);
    }
}
