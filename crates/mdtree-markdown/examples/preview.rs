use crossterm::event::Event;
use crossterm::event::KeyCode;
use crossterm::event::KeyEventKind;
use crossterm::terminal::EnterAlternateScreen;
use crossterm::terminal::LeaveAlternateScreen;
use crossterm::terminal::disable_raw_mode;
use crossterm::terminal::enable_raw_mode;
use mdtree_core::tree::Font;
use mdtree_markdown::MarkdownView;
use mdtree_markdown::StyleConfig;
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use ratatui::layout::Constraint;
use ratatui::layout::Direction;
use ratatui::layout::Layout;
use ratatui::style::Color;
use ratatui::style::Modifier;
use ratatui::style::Stylize;
use ratatui::text::Line;
use ratatui::widgets::Block;
use ratatui::widgets::Borders;
use ratatui::widgets::Paragraph;
use std::io;
use std::time::Duration;

const SAMPLE_MARKDOWN: &str = r#"
# mdtree

A preview of **MarkdownView** drawing its visual tree with *ratatui*.

## Keybindings

- `j/k` or `↑/↓`: scroll
- `s`: switch between plain and styled fonts
- `q`: quit

## Lists

1. first
2. second
   - nested **bold**
   - nested *italic*
3. ***both*** at once

> Blockquotes get a left border.
>
> > And they nest.

---

```rs
fn main() {
    println!("hello");
}
```
"#;

fn styled() -> StyleConfig {
    let mut style = StyleConfig::terminal();
    style.heading_font[0] = Some(Font::new("heading").with_modifier(Modifier::BOLD));
    style.heading_color[0] = Color::Magenta;
    style.heading_color[1] = Color::Cyan;
    style.bold_font = Some(Font::new("bold").with_modifier(Modifier::BOLD));
    style.italic_font = Some(Font::new("italic").with_modifier(Modifier::ITALIC));
    style.bold_italic_font =
        Some(Font::new("bold-italic").with_modifier(Modifier::BOLD | Modifier::ITALIC));
    style
}

struct App {
    view: MarkdownView<'static>,
    scroll: u16,
    fonts: bool,
}

fn main() -> io::Result<()> {
    let mut stdout = io::stdout();
    enable_raw_mode()?;
    crossterm::execute!(stdout, EnterAlternateScreen)?;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut view = MarkdownView::new().with_style(StyleConfig::terminal());
    view.set_text_static(SAMPLE_MARKDOWN.trim());
    let mut app = App {
        view,
        scroll: 0,
        fonts: false,
    };
    let res = run(&mut terminal, &mut app);

    disable_raw_mode()?;
    crossterm::execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    res
}

fn run<B: ratatui::backend::Backend>(terminal: &mut Terminal<B>, app: &mut App) -> io::Result<()> {
    loop {
        terminal.draw(|f| ui(f, app))?;

        if !crossterm::event::poll(Duration::from_millis(50))? {
            continue;
        }
        let Event::Key(key) = crossterm::event::read()? else {
            continue;
        };
        if key.kind != KeyEventKind::Press {
            continue;
        }
        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => return Ok(()),
            KeyCode::Char('j') | KeyCode::Down => app.scroll = app.scroll.saturating_add(1),
            KeyCode::Char('k') | KeyCode::Up => app.scroll = app.scroll.saturating_sub(1),
            KeyCode::Char('g') => app.scroll = 0,
            KeyCode::Char('s') => {
                app.fonts = !app.fonts;
                let style = if app.fonts {
                    styled()
                } else {
                    StyleConfig::terminal()
                };
                app.view.set_style(style);
            }
            _ => {}
        }
    }
}

fn ui(f: &mut ratatui::Frame<'_>, app: &mut App) {
    let area = f.area();
    let [body, status] = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(1), Constraint::Length(1)])
        .areas(area);

    let block = Block::default()
        .title("Markdown".cyan().bold())
        .borders(Borders::ALL);
    let inner = block.inner(body);
    f.render_widget(block, body);

    let lines = app.view.lines_for_width(inner.width);
    let max_scroll = u16::try_from(lines.len())
        .unwrap_or(u16::MAX)
        .saturating_sub(inner.height);
    app.scroll = app.scroll.min(max_scroll);
    f.render_widget(Paragraph::new(lines).scroll((app.scroll, 0)), inner);

    let fonts = if app.fonts { "styled fonts" } else { "plain fonts" };
    let status_line = Line::from(format!(
        " {} blocks | {fonts} | j/k scroll  s style  q quit",
        app.view.block_count()
    ))
    .dark_gray();
    f.render_widget(Paragraph::new(status_line), status);
}
