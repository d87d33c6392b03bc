use ratatui::style::Style;
use ratatui::text::Line;
use ratatui::text::Span;
use unicode_width::UnicodeWidthChar;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum WrapMode {
    #[default]
    None,
    Word,
}

type Cell = (char, Style);

/// Lay out styled spans into lines no wider than `width` columns.
///
/// `\n` always starts a new line. With [`WrapMode::Word`] lines are broken at the last
/// whitespace or punctuation that fits; words longer than the width are split hard.
/// A `width` of zero disables wrapping.
pub fn wrap_spans(spans: &[Span<'_>], width: u16, mode: WrapMode) -> Vec<Line<'static>> {
    let cells = to_cells(spans);
    let rows = match mode {
        WrapMode::Word if width > 0 => word_wrap(&cells, width as usize),
        _ => split_lines(&cells),
    };
    rows.iter().map(|row| to_line(row)).collect()
}

fn to_cells(spans: &[Span<'_>]) -> Vec<Cell> {
    let mut cells = Vec::new();
    for span in spans {
        for ch in span.content.chars() {
            if ch == '\t' {
                cells.extend(std::iter::repeat_n((' ', span.style), 4));
            } else {
                cells.push((ch, span.style));
            }
        }
    }
    cells
}

fn split_lines(cells: &[Cell]) -> Vec<Vec<Cell>> {
    let mut out = Vec::new();
    let mut line = Vec::new();
    for &cell in cells {
        if cell.0 == '\n' {
            out.push(std::mem::take(&mut line));
        } else {
            line.push(cell);
        }
    }
    if !line.is_empty() || out.is_empty() {
        out.push(line);
    }
    out
}

fn word_wrap(cells: &[Cell], max_cols: usize) -> Vec<Vec<Cell>> {
    let mut out: Vec<Vec<Cell>> = Vec::new();
    let mut line: Vec<Cell> = Vec::new();
    let mut line_cols = 0usize;
    let mut last_soft_idx: Option<usize> = None;

    for &(ch, style) in cells {
        if ch == '\n' {
            out.push(std::mem::take(&mut line));
            line_cols = 0;
            last_soft_idx = None;
            continue;
        }

        let w = UnicodeWidthChar::width(ch).unwrap_or(0);
        if line_cols.saturating_add(w) > max_cols {
            if ch.is_whitespace() {
                trim_end(&mut line);
                out.push(std::mem::take(&mut line));
                line_cols = 0;
                last_soft_idx = None;
                continue;
            }
            if let Some(split) = last_soft_idx.take() {
                let rest = line.split_off(split);
                trim_end(&mut line);
                out.push(std::mem::replace(&mut line, trim_start(rest)));
            } else if !line.is_empty() {
                out.push(std::mem::take(&mut line));
            }
            line_cols = cells_width(&line);
        }

        if line.is_empty() && ch.is_whitespace() {
            continue;
        }

        line.push((ch, style));
        line_cols += w;

        if ch.is_whitespace() {
            last_soft_idx = Some(line.len() - 1);
        } else if matches!(
            ch,
            ',' | ';' | '.' | ':' | ')' | ']' | '}' | '|' | '/' | '?' | '!' | '-' | '_'
        ) {
            last_soft_idx = Some(line.len());
        }
    }

    if !line.is_empty() || out.is_empty() {
        out.push(line);
    }
    out
}

fn cells_width(cells: &[Cell]) -> usize {
    cells
        .iter()
        .map(|(ch, _)| UnicodeWidthChar::width(*ch).unwrap_or(0))
        .sum()
}

fn trim_end(cells: &mut Vec<Cell>) {
    while cells.last().is_some_and(|(ch, _)| ch.is_whitespace()) {
        cells.pop();
    }
}

fn trim_start(cells: Vec<Cell>) -> Vec<Cell> {
    let skip = cells
        .iter()
        .take_while(|(ch, _)| ch.is_whitespace())
        .count();
    cells.into_iter().skip(skip).collect()
}

fn to_line(cells: &[Cell]) -> Line<'static> {
    let mut spans: Vec<Span<'static>> = Vec::new();
    let mut current = String::new();
    let mut current_style: Option<Style> = None;
    for &(ch, style) in cells {
        if current_style.is_some_and(|s| s != style) {
            let s = current_style.unwrap_or_default();
            spans.push(Span::styled(std::mem::take(&mut current), s));
        }
        current_style = Some(style);
        current.push(ch);
    }
    if let Some(style) = current_style {
        spans.push(Span::styled(current, style));
    }
    Line::from(spans)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::style::Modifier;

    fn plain(lines: &[Line<'_>]) -> Vec<String> {
        lines
            .iter()
            .map(|l| l.spans.iter().map(|s| s.content.as_ref()).collect())
            .collect()
    }

    #[test]
    fn word_wrap_breaks_at_whitespace() {
        let lines = wrap_spans(&[Span::raw("hello world")], 5, WrapMode::Word);
        assert_eq!(plain(&lines), vec!["hello", "world"]);
    }

    #[test]
    fn word_wrap_keeps_span_styles_across_breaks() {
        let bold = Style::default().add_modifier(Modifier::BOLD);
        let spans = [Span::raw("plain "), Span::styled("bold words", bold)];
        let lines = wrap_spans(&spans, 10, WrapMode::Word);
        assert_eq!(plain(&lines), vec!["plain bold", "words"]);
        assert_eq!(lines[1].spans[0].style, bold);
        assert_eq!(lines[0].spans.len(), 2);
    }

    #[test]
    fn newline_forces_break_even_without_wrapping() {
        let lines = wrap_spans(&[Span::raw("a\nb")], 0, WrapMode::None);
        assert_eq!(plain(&lines), vec!["a", "b"]);
    }

    #[test]
    fn long_words_are_split_hard() {
        let lines = wrap_spans(&[Span::raw("abcdefgh")], 3, WrapMode::Word);
        assert_eq!(plain(&lines), vec!["abc", "def", "gh"]);
    }

    #[test]
    fn tabs_expand_to_four_spaces() {
        let lines = wrap_spans(&[Span::raw("a\tb")], 80, WrapMode::None);
        assert_eq!(plain(&lines), vec!["a    b"]);
    }

    #[test]
    fn empty_input_yields_one_empty_line() {
        let lines = wrap_spans(&[], 10, WrapMode::Word);
        assert_eq!(lines.len(), 1);
        assert!(lines[0].spans.is_empty());
    }
}
