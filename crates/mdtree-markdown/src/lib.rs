//! `mdtree-markdown` compiles markdown into an [`mdtree_core`] visual tree in one streaming
//! pass.
//!
//! ## Quick start
//!
//! ```
//! use mdtree_markdown::MarkdownView;
//!
//! let mut view = MarkdownView::new();
//! view.set_text("# Title\n\nSome **bold** text.");
//! assert_eq!(view.block_count(), 2);
//! let lines = view.lines_for_width(40);
//! assert_eq!(lines[0].to_string(), "Title");
//! ```
//!
//! ## Pieces
//!
//! - [`events::parse`] tokenizes with `pulldown-cmark` and pushes balanced enter/leave/text
//!   callbacks into a [`events::MarkdownHandler`].
//! - [`render::RenderContext`] is the handler that builds nodes on any
//!   [`mdtree_core::tree::TreeSink`].
//! - [`resolve`] maps emphasis and heading levels to fonts, with fallbacks when a font is
//!   missing from the [`StyleConfig`].
//! - [`MarkdownView`] owns the source text, the style and the tree, and rebuilds the tree
//!   whenever either input changes.
pub mod code;
pub mod events;
pub mod list;
pub mod render;
pub mod resolve;
pub mod style;
pub mod view;

pub use render::RenderSummary;
pub use render::render_markdown;
pub use style::StyleConfig;
pub use view::MarkdownView;
