use mdtree_core::render::CellMetrics;
use mdtree_markdown::MarkdownView;
use mdtree_markdown::StyleConfig;
use ratatui::text::Line;
use std::env;
use std::fs;
use std::io::{self, Read};

fn main() -> io::Result<()> {
    let args = env::args().skip(1).collect::<Vec<_>>();
    if args.iter().any(|a| a == "-h" || a == "--help") {
        print_help();
        return Ok(());
    }

    let mut width: u16 = 80;
    let mut col_px: u16 = CellMetrics::default().col_px;
    let mut row_px: u16 = CellMetrics::default().row_px;
    let mut bullet: Option<String> = None;
    let mut blocks = false;

    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "--width" => {
                width = parse_u16(&args, &mut i, "--width")?;
            }
            "--col-px" => {
                col_px = parse_u16(&args, &mut i, "--col-px")?;
            }
            "--row-px" => {
                row_px = parse_u16(&args, &mut i, "--row-px")?;
            }
            "--bullet" => {
                bullet = Some(parse_string(&args, &mut i, "--bullet")?);
            }
            "--blocks" => {
                blocks = true;
                i += 1;
            }
            _ => break,
        }
    }

    let input = if i < args.len() {
        fs::read_to_string(&args[i])?
    } else {
        let mut s = String::new();
        io::stdin().read_to_string(&mut s)?;
        s
    };

    let mut style = StyleConfig::terminal();
    if let Some(bullet) = bullet {
        style.list_bullet = bullet;
    }
    let mut view = MarkdownView::new()
        .with_style(style)
        .with_metrics(CellMetrics { col_px, row_px });
    view.set_text(input.as_str());

    for line in view.lines_for_width(width) {
        println!("{}", line_to_plain(&line));
    }
    if blocks {
        eprintln!("{} top-level blocks", view.block_count());
    }

    Ok(())
}

fn print_help() {
    eprintln!(
        "Usage: dump [options] [path]\n\
\n\
Options:\n\
  --width <n>       Wrap width (default: 80)\n\
  --col-px <n>      Pixels per terminal column (default: 8)\n\
  --row-px <n>      Pixels per terminal row (default: 16)\n\
  --bullet <s>      List bullet glyph (default: •)\n\
  --blocks          Print the top-level block count to stderr\n\
  -h, --help        Show this help\n\
\n\
If [path] is omitted, reads Markdown from stdin."
    );
}

fn parse_u16(args: &[String], i: &mut usize, flag: &str) -> io::Result<u16> {
    let Some(v) = args.get(*i + 1) else {
        return Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("{flag} expects a value"),
        ));
    };
    *i += 2;
    v.parse::<u16>().map_err(|e| {
        io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("{flag} invalid u16: {e}"),
        )
    })
}

fn parse_string(args: &[String], i: &mut usize, flag: &str) -> io::Result<String> {
    let Some(v) = args.get(*i + 1) else {
        return Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("{flag} expects a value"),
        ));
    };
    *i += 2;
    Ok(v.to_string())
}

fn line_to_plain(line: &Line<'_>) -> String {
    line.spans
        .iter()
        .map(|s| s.content.as_ref())
        .collect::<Vec<_>>()
        .join("")
}
