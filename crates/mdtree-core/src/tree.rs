//! A retained visual tree and the sink interface used to build it.
//!
//! [`TreeSink`] is the write-only surface a producer (for example the markdown dispatcher)
//! talks to: create containers, text blocks and labels, append styled runs, set node styles.
//! [`VisualTree`] is the in-memory implementation, an arena of nodes addressed by
//! generation-checked [`NodeId`]s so stale handles fail with [`TreeError::UnknownNode`]
//! instead of aliasing a newer node.
use ratatui::style::Color;
use ratatui::style::Modifier;
use std::borrow::Cow;
use thiserror::Error;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId {
    index: u32,
    generation: u32,
}

impl NodeId {
    pub fn index(self) -> usize {
        self.index as usize
    }
}

/// Handle to one inline run inside a text block.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct RunId {
    block: NodeId,
    index: usize,
}

impl RunId {
    pub fn block(self) -> NodeId {
        self.block
    }

    pub fn index(self) -> usize {
        self.index
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum TreeError {
    #[error("unknown node {0:?}")]
    UnknownNode(NodeId),
    #[error("unknown run {0:?}")]
    UnknownRun(RunId),
    #[error("node {0:?} is not a text block")]
    NotATextBlock(NodeId),
    #[error("node limit of {limit} reached")]
    CapacityExceeded { limit: usize },
}

/// An opaque font handle.
///
/// Terminals cannot switch typefaces, so a font carries a [`Modifier`] hint that painters
/// apply in its place (a "bold" font typically maps to [`Modifier::BOLD`]).
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Font {
    name: Cow<'static, str>,
    #[cfg_attr(feature = "serde", serde(default = "Modifier::empty"))]
    modifier: Modifier,
}

impl Font {
    pub fn new(name: impl Into<Cow<'static, str>>) -> Self {
        Self {
            name: name.into(),
            modifier: Modifier::empty(),
        }
    }

    pub fn with_modifier(mut self, modifier: Modifier) -> Self {
        self.modifier = modifier;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn modifier(&self) -> Modifier {
        self.modifier
    }
}

impl Default for Font {
    fn default() -> Self {
        Self::new("default")
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TextDecoration {
    Underline,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum LineBreakMode {
    /// Wrap at word boundaries when a line exceeds the block width.
    #[default]
    Break,
}

/// Local style override for one inline run. `None` fields inherit from the block.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RunStyle {
    pub font: Option<Font>,
    pub color: Option<Color>,
    pub decoration: Option<TextDecoration>,
    pub letter_space: Option<i16>,
}

impl RunStyle {
    pub fn is_empty(&self) -> bool {
        self.font.is_none()
            && self.color.is_none()
            && self.decoration.is_none()
            && self.letter_space.is_none()
    }

    /// Overlay `other` on top of `self`; fields set in `other` win.
    pub fn patch(self, other: RunStyle) -> Self {
        Self {
            font: other.font.or(self.font),
            color: other.color.or(self.color),
            decoration: other.decoration.or(self.decoration),
            letter_space: other.letter_space.or(self.letter_space),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Length {
    Px(i32),
    Percent(u16),
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Padding {
    pub top: i32,
    pub right: i32,
    pub bottom: i32,
    pub left: i32,
}

impl Padding {
    pub fn uniform(v: i32) -> Self {
        Self {
            top: v,
            right: v,
            bottom: v,
            left: v,
        }
    }

    pub fn left(v: i32) -> Self {
        Self {
            left: v,
            ..Self::default()
        }
    }
}

/// A border drawn along the left edge of a node.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Border {
    pub color: Color,
    pub width: i32,
}

/// Box and text properties of a node. `None` fields leave the current value untouched
/// when applied through [`TreeSink::set_node_style`].
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct NodeStyle {
    pub width: Option<Length>,
    pub height: Option<Length>,
    pub background: Option<Color>,
    pub border: Option<Border>,
    pub padding: Option<Padding>,
    pub margin_top: Option<i32>,
    pub radius: Option<i32>,
    pub font: Option<Font>,
    pub color: Option<Color>,
    pub line_space: Option<i32>,
}

impl NodeStyle {
    pub fn patch(self, other: NodeStyle) -> Self {
        Self {
            width: other.width.or(self.width),
            height: other.height.or(self.height),
            background: other.background.or(self.background),
            border: other.border.or(self.border),
            padding: other.padding.or(self.padding),
            margin_top: other.margin_top.or(self.margin_top),
            radius: other.radius.or(self.radius),
            font: other.font.or(self.font),
            color: other.color.or(self.color),
            line_space: other.line_space.or(self.line_space),
        }
    }

    pub fn padding_or_default(&self) -> Padding {
        self.padding.unwrap_or_default()
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Run {
    text: String,
    style: RunStyle,
}

impl Run {
    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn style(&self) -> &RunStyle {
        &self.style
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum NodeKind {
    Container,
    TextBlock {
        mode: LineBreakMode,
        runs: Vec<Run>,
        finalized: bool,
    },
    Label {
        text: String,
    },
}

#[derive(Clone, Debug)]
pub struct Node {
    kind: NodeKind,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    style: NodeStyle,
}

impl Node {
    fn new(kind: NodeKind, parent: Option<NodeId>) -> Self {
        Self {
            kind,
            parent,
            children: Vec::new(),
            style: NodeStyle::default(),
        }
    }

    pub fn kind(&self) -> &NodeKind {
        &self.kind
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    pub fn style(&self) -> &NodeStyle {
        &self.style
    }

    pub fn is_container(&self) -> bool {
        matches!(self.kind, NodeKind::Container)
    }

    pub fn is_text_block(&self) -> bool {
        matches!(self.kind, NodeKind::TextBlock { .. })
    }

    pub fn runs(&self) -> &[Run] {
        match &self.kind {
            NodeKind::TextBlock { runs, .. } => runs,
            _ => &[],
        }
    }

    pub fn label_text(&self) -> Option<&str> {
        match &self.kind {
            NodeKind::Label { text } => Some(text),
            _ => None,
        }
    }
}

/// Node-creation and styling operations consumed by tree producers.
pub trait TreeSink {
    fn root(&self) -> NodeId;

    fn create_container(&mut self, parent: NodeId) -> Result<NodeId, TreeError>;

    fn create_text_block(
        &mut self,
        parent: NodeId,
        mode: LineBreakMode,
    ) -> Result<NodeId, TreeError>;

    fn create_label(&mut self, parent: NodeId, text: &str) -> Result<NodeId, TreeError>;

    /// Append a run holding a copy of `text`.
    fn append_run(&mut self, block: NodeId, text: &str) -> Result<RunId, TreeError>;

    fn set_run_style(&mut self, run: RunId, style: RunStyle) -> Result<(), TreeError>;

    fn set_node_style(&mut self, node: NodeId, style: NodeStyle) -> Result<(), TreeError>;

    /// Mark a text block's runs as complete so its layout can be recomputed.
    fn finalize_text_block(&mut self, block: NodeId) -> Result<(), TreeError>;

    fn remove_all_children(&mut self, node: NodeId) -> Result<(), TreeError>;

    fn child_count(&self, node: NodeId) -> usize;
}

#[derive(Clone, Debug)]
struct Slot {
    generation: u32,
    node: Option<Node>,
}

#[derive(Clone, Debug)]
pub struct VisualTree {
    slots: Vec<Slot>,
    free: Vec<u32>,
    root: NodeId,
    live: usize,
    node_limit: Option<usize>,
}

impl Default for VisualTree {
    fn default() -> Self {
        Self::new()
    }
}

impl VisualTree {
    pub fn new() -> Self {
        let root = NodeId {
            index: 0,
            generation: 0,
        };
        Self {
            slots: vec![Slot {
                generation: 0,
                node: Some(Node::new(NodeKind::Container, None)),
            }],
            free: Vec::new(),
            root,
            live: 1,
            node_limit: None,
        }
    }

    /// A tree that refuses to hold more than `limit` live nodes (the root included).
    pub fn with_node_limit(limit: usize) -> Self {
        let mut tree = Self::new();
        tree.node_limit = Some(limit);
        tree
    }

    /// Number of live nodes, the root included.
    pub fn len(&self) -> usize {
        self.live
    }

    pub fn is_empty(&self) -> bool {
        self.children(self.root).is_empty()
    }

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.slots
            .get(id.index())
            .filter(|slot| slot.generation == id.generation)
            .and_then(|slot| slot.node.as_ref())
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.node(id).map(Node::children).unwrap_or_default()
    }

    pub fn child(&self, id: NodeId, index: usize) -> Option<NodeId> {
        self.children(id).get(index).copied()
    }

    pub fn runs(&self, id: NodeId) -> &[Run] {
        self.node(id).map(Node::runs).unwrap_or_default()
    }

    pub fn run(&self, id: RunId) -> Option<&Run> {
        self.runs(id.block).get(id.index)
    }

    /// Concatenated text of a node and its descendants, in document order.
    pub fn plain_text(&self, id: NodeId) -> String {
        let mut out = String::new();
        self.collect_text(id, &mut out);
        out
    }

    fn collect_text(&self, id: NodeId, out: &mut String) {
        let Some(node) = self.node(id) else {
            return;
        };
        match &node.kind {
            NodeKind::TextBlock { runs, .. } => {
                for run in runs {
                    out.push_str(&run.text);
                }
            }
            NodeKind::Label { text } => out.push_str(text),
            NodeKind::Container => {}
        }
        for child in &node.children {
            self.collect_text(*child, out);
        }
    }

    fn node_mut(&mut self, id: NodeId) -> Result<&mut Node, TreeError> {
        self.slots
            .get_mut(id.index())
            .filter(|slot| slot.generation == id.generation)
            .and_then(|slot| slot.node.as_mut())
            .ok_or(TreeError::UnknownNode(id))
    }

    fn insert(&mut self, parent: NodeId, kind: NodeKind) -> Result<NodeId, TreeError> {
        if self.node(parent).is_none() {
            return Err(TreeError::UnknownNode(parent));
        }
        if let Some(limit) = self.node_limit {
            if self.live >= limit {
                return Err(TreeError::CapacityExceeded { limit });
            }
        }

        let node = Node::new(kind, Some(parent));
        let id = match self.free.pop() {
            Some(index) => {
                let slot = &mut self.slots[index as usize];
                slot.node = Some(node);
                NodeId {
                    index,
                    generation: slot.generation,
                }
            }
            None => {
                let index = u32::try_from(self.slots.len()).map_err(|_| {
                    TreeError::CapacityExceeded {
                        limit: u32::MAX as usize,
                    }
                })?;
                self.slots.push(Slot {
                    generation: 0,
                    node: Some(node),
                });
                NodeId {
                    index,
                    generation: 0,
                }
            }
        };
        self.live += 1;
        self.node_mut(parent)?.children.push(id);
        Ok(id)
    }

    fn release_subtree(&mut self, id: NodeId) {
        let Some(slot) = self.slots.get_mut(id.index()) else {
            return;
        };
        if slot.generation != id.generation {
            return;
        }
        let Some(node) = slot.node.take() else {
            return;
        };
        slot.generation = slot.generation.wrapping_add(1);
        self.free.push(id.index);
        self.live -= 1;
        for child in node.children {
            self.release_subtree(child);
        }
    }

    fn text_block_mut(&mut self, id: NodeId) -> Result<(&mut Vec<Run>, &mut bool), TreeError> {
        match &mut self.node_mut(id)?.kind {
            NodeKind::TextBlock {
                runs, finalized, ..
            } => Ok((runs, finalized)),
            _ => Err(TreeError::NotATextBlock(id)),
        }
    }
}

impl TreeSink for VisualTree {
    fn root(&self) -> NodeId {
        self.root
    }

    fn create_container(&mut self, parent: NodeId) -> Result<NodeId, TreeError> {
        self.insert(parent, NodeKind::Container)
    }

    fn create_text_block(
        &mut self,
        parent: NodeId,
        mode: LineBreakMode,
    ) -> Result<NodeId, TreeError> {
        self.insert(
            parent,
            NodeKind::TextBlock {
                mode,
                runs: Vec::new(),
                finalized: false,
            },
        )
    }

    fn create_label(&mut self, parent: NodeId, text: &str) -> Result<NodeId, TreeError> {
        self.insert(
            parent,
            NodeKind::Label {
                text: text.to_string(),
            },
        )
    }

    fn append_run(&mut self, block: NodeId, text: &str) -> Result<RunId, TreeError> {
        let (runs, finalized) = self.text_block_mut(block)?;
        runs.push(Run {
            text: text.to_string(),
            style: RunStyle::default(),
        });
        *finalized = false;
        Ok(RunId {
            block,
            index: runs.len() - 1,
        })
    }

    fn set_run_style(&mut self, run: RunId, style: RunStyle) -> Result<(), TreeError> {
        let (runs, _) = self.text_block_mut(run.block)?;
        let slot = runs.get_mut(run.index).ok_or(TreeError::UnknownRun(run))?;
        slot.style = std::mem::take(&mut slot.style).patch(style);
        Ok(())
    }

    fn set_node_style(&mut self, node: NodeId, style: NodeStyle) -> Result<(), TreeError> {
        let node = self.node_mut(node)?;
        node.style = std::mem::take(&mut node.style).patch(style);
        Ok(())
    }

    fn finalize_text_block(&mut self, block: NodeId) -> Result<(), TreeError> {
        let (_, finalized) = self.text_block_mut(block)?;
        *finalized = true;
        Ok(())
    }

    fn remove_all_children(&mut self, node: NodeId) -> Result<(), TreeError> {
        let children = std::mem::take(&mut self.node_mut(node)?.children);
        for child in children {
            self.release_subtree(child);
        }
        Ok(())
    }

    fn child_count(&self, node: NodeId) -> usize {
        self.children(node).len()
    }
}
