use mdtree_core::tree::Font;
use ratatui::style::Color;

pub const HEADING_LEVELS: usize = 6;

/// Rendering policy for a markdown document.
///
/// Only `body_font` is always used. Every optional font falls back when unset:
///
/// - `heading_font[n]`: body font
/// - `bold_font`: letter spacing +1 (faux bold)
/// - `italic_font`: underline
/// - `bold_italic_font`: bold font + underline, then italic font + letter spacing, then both
///   fallbacks combined
/// - `code_font`: body font
///
/// Lengths are in pixels. The struct is replaced wholesale on every style change.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(default)
)]
pub struct StyleConfig {
    pub body_font: Font,
    pub body_color: Color,

    /// H1 is index 0.
    pub heading_font: [Option<Font>; HEADING_LEVELS],
    pub heading_color: [Color; HEADING_LEVELS],

    pub bold_font: Option<Font>,
    pub italic_font: Option<Font>,
    pub bold_italic_font: Option<Font>,

    pub code_font: Option<Font>,
    pub code_color: Color,
    /// Inline code background. Carried for widget systems that support per-run
    /// backgrounds; the tree sink does not, so it is not applied.
    pub code_bg_color: Color,
    pub code_corner_radius: i32,

    pub code_block_bg_color: Color,
    pub code_block_corner_radius: i32,
    pub code_block_pad: i32,

    pub blockquote_border_color: Color,
    pub blockquote_border_width: i32,
    pub blockquote_pad_left: i32,

    pub hr_color: Color,
    pub hr_height: i32,

    /// Vertical gap between sibling blocks.
    pub paragraph_spacing: i32,
    /// Extra spacing between lines inside a text block.
    pub line_spacing: i32,
    /// Indent per list nesting level.
    pub list_indent: i32,
    pub list_bullet: String,
}

impl Default for StyleConfig {
    fn default() -> Self {
        let gray = Color::Rgb(200, 200, 200);
        Self {
            body_font: Font::default(),
            body_color: Color::Black,

            heading_font: Default::default(),
            heading_color: [Color::Black; HEADING_LEVELS],

            bold_font: None,
            italic_font: None,
            bold_italic_font: None,

            code_font: None,
            code_color: Color::Black,
            code_bg_color: Color::Rgb(230, 230, 230),
            code_corner_radius: 3,

            code_block_bg_color: Color::Rgb(245, 245, 245),
            code_block_corner_radius: 4,
            code_block_pad: 8,

            blockquote_border_color: gray,
            blockquote_border_width: 3,
            blockquote_pad_left: 12,

            hr_color: gray,
            hr_height: 1,

            paragraph_spacing: 10,
            line_spacing: 4,
            list_indent: 20,
            list_bullet: "\u{2022}".to_string(),
        }
    }
}

impl StyleConfig {
    /// The style with every color reset to the terminal default, for drawing on
    /// whatever background the terminal has.
    pub fn terminal() -> Self {
        let muted = Color::DarkGray;
        Self {
            body_color: Color::Reset,
            heading_color: [Color::Reset; HEADING_LEVELS],
            code_color: Color::Cyan,
            code_bg_color: Color::Reset,
            code_block_bg_color: Color::Reset,
            blockquote_border_color: muted,
            hr_color: muted,
            ..Self::default()
        }
    }
}
