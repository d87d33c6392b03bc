//! `mdtree-core` provides the visual tree that `mdtree` renders markdown into.
//!
//! The tree is deliberately small: containers (boxes with padding, border, background),
//! text blocks (a sequence of styled inline runs) and labels (verbatim text). Producers talk
//! to it through the [`tree::TreeSink`] trait so they can target any retained widget system;
//! [`tree::VisualTree`] is the bundled in-memory implementation.
//!
//! ## Painting
//!
//! [`render::TreeView`] lays a [`tree::VisualTree`] out into `ratatui` lines and implements
//! [`ratatui::widgets::Widget`], so a rendered document can be drawn straight into a frame.
pub mod render;
pub mod tree;
pub mod wrapping;
