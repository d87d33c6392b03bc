//! Font and decoration resolution, including the fallback chain for missing emphasis fonts.
use mdtree_core::tree::Font;
use mdtree_core::tree::RunStyle;
use mdtree_core::tree::TextDecoration;
use ratatui::style::Color;

use crate::style::HEADING_LEVELS;
use crate::style::StyleConfig;

/// Letter spacing used as a stand-in for a missing bold font.
pub const FAUX_BOLD_LETTER_SPACE: i16 = 1;

/// Active inline formatting.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct InlineFlags {
    pub strong: bool,
    pub emphasis: bool,
    pub code: bool,
}

impl InlineFlags {
    pub fn is_plain(self) -> bool {
        !(self.strong || self.emphasis || self.code)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BlockStyle {
    pub font: Font,
    pub color: Color,
}

/// Font and color for a paragraph (`level == None`) or heading (`level` 1..=6).
///
/// Levels outside 1..=6 resolve like a paragraph.
pub fn resolve_block(level: Option<u8>, style: &StyleConfig) -> BlockStyle {
    let mut out = BlockStyle {
        font: style.body_font.clone(),
        color: style.body_color,
    };
    let Some(idx) = level
        .map(|l| usize::from(l).wrapping_sub(1))
        .filter(|idx| *idx < HEADING_LEVELS)
    else {
        return out;
    };
    if let Some(font) = &style.heading_font[idx] {
        out.font = font.clone();
    }
    out.color = style.heading_color[idx];
    out
}

/// Local style override for a text run under `flags`.
///
/// Code is exclusive: while it is active, bold and italic are ignored. Plain runs resolve
/// to an empty override and inherit the block style.
pub fn resolve_inline(flags: InlineFlags, style: &StyleConfig) -> RunStyle {
    if flags.code {
        return RunStyle {
            font: Some(style.code_font.as_ref().unwrap_or(&style.body_font).clone()),
            color: Some(style.code_color),
            ..RunStyle::default()
        };
    }

    match (flags.strong, flags.emphasis) {
        (true, true) => {
            if let Some(font) = &style.bold_italic_font {
                with_font(font)
            } else if let Some(font) = &style.bold_font {
                RunStyle {
                    decoration: Some(TextDecoration::Underline),
                    ..with_font(font)
                }
            } else if let Some(font) = &style.italic_font {
                RunStyle {
                    letter_space: Some(FAUX_BOLD_LETTER_SPACE),
                    ..with_font(font)
                }
            } else {
                RunStyle {
                    letter_space: Some(FAUX_BOLD_LETTER_SPACE),
                    decoration: Some(TextDecoration::Underline),
                    ..RunStyle::default()
                }
            }
        }
        (true, false) => match &style.bold_font {
            Some(font) => with_font(font),
            None => RunStyle {
                letter_space: Some(FAUX_BOLD_LETTER_SPACE),
                ..RunStyle::default()
            },
        },
        (false, true) => match &style.italic_font {
            Some(font) => with_font(font),
            None => RunStyle {
                decoration: Some(TextDecoration::Underline),
                ..RunStyle::default()
            },
        },
        (false, false) => RunStyle::default(),
    }
}

fn with_font(font: &Font) -> RunStyle {
    RunStyle {
        font: Some(font.clone()),
        ..RunStyle::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BOLD: InlineFlags = InlineFlags {
        strong: true,
        emphasis: false,
        code: false,
    };
    const ITALIC: InlineFlags = InlineFlags {
        strong: false,
        emphasis: true,
        code: false,
    };
    const BOTH: InlineFlags = InlineFlags {
        strong: true,
        emphasis: true,
        code: false,
    };

    fn font(name: &'static str) -> Font {
        Font::new(name)
    }

    #[test]
    fn heading_uses_level_font_or_body() {
        let mut style = StyleConfig::default();
        assert_eq!(resolve_block(Some(1), &style).font, style.body_font);

        style.heading_font[0] = Some(font("h1"));
        style.heading_color[2] = Color::Red;
        assert_eq!(resolve_block(Some(1), &style).font, font("h1"));
        assert_eq!(resolve_block(Some(2), &style).font, style.body_font);
        assert_eq!(resolve_block(Some(3), &style).color, Color::Red);
    }

    #[test]
    fn paragraph_and_out_of_range_levels_use_body() {
        let mut style = StyleConfig::default();
        style.heading_font = std::array::from_fn(|_| Some(font("heading")));
        for level in [None, Some(0), Some(7)] {
            let resolved = resolve_block(level, &style);
            assert_eq!(resolved.font, style.body_font);
            assert_eq!(resolved.color, style.body_color);
        }
    }

    #[test]
    fn bold_falls_back_to_letter_spacing() {
        let mut style = StyleConfig::default();
        let run = resolve_inline(BOLD, &style);
        assert_eq!(run.letter_space, Some(1));
        assert_eq!(run.font, None);

        style.bold_font = Some(font("bold"));
        let run = resolve_inline(BOLD, &style);
        assert_eq!(run.font, Some(font("bold")));
        assert_eq!(run.letter_space, None);
    }

    #[test]
    fn italic_falls_back_to_underline() {
        let mut style = StyleConfig::default();
        assert_eq!(
            resolve_inline(ITALIC, &style).decoration,
            Some(TextDecoration::Underline)
        );

        style.italic_font = Some(font("italic"));
        let run = resolve_inline(ITALIC, &style);
        assert_eq!(run.font, Some(font("italic")));
        assert_eq!(run.decoration, None);
    }

    #[test]
    fn bold_italic_walks_the_fallback_chain_in_order() {
        let mut style = StyleConfig::default();
        assert_eq!(
            resolve_inline(BOTH, &style),
            RunStyle {
                letter_space: Some(1),
                decoration: Some(TextDecoration::Underline),
                ..RunStyle::default()
            }
        );

        style.italic_font = Some(font("italic"));
        assert_eq!(
            resolve_inline(BOTH, &style),
            RunStyle {
                font: Some(font("italic")),
                letter_space: Some(1),
                ..RunStyle::default()
            }
        );

        style.bold_font = Some(font("bold"));
        assert_eq!(
            resolve_inline(BOTH, &style),
            RunStyle {
                font: Some(font("bold")),
                decoration: Some(TextDecoration::Underline),
                ..RunStyle::default()
            }
        );

        style.bold_italic_font = Some(font("bold-italic"));
        assert_eq!(resolve_inline(BOTH, &style), with_font(&font("bold-italic")));
    }

    #[test]
    fn code_suppresses_emphasis() {
        let mut style = StyleConfig::default();
        style.code_color = Color::Red;
        style.bold_font = Some(font("bold"));
        let flags = InlineFlags {
            strong: true,
            emphasis: true,
            code: true,
        };
        let run = resolve_inline(flags, &style);
        assert_eq!(run.font, Some(style.body_font.clone()));
        assert_eq!(run.color, Some(Color::Red));
        assert_eq!(run.decoration, None);
        assert_eq!(run.letter_space, None);

        style.code_font = Some(font("mono"));
        assert_eq!(resolve_inline(flags, &style).font, Some(font("mono")));
    }

    #[test]
    fn plain_runs_have_no_override() {
        assert!(InlineFlags::default().is_plain());
        assert!(resolve_inline(InlineFlags::default(), &StyleConfig::default()).is_empty());
    }
}
