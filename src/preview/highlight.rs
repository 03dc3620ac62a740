//! Syntax highlighting for the preview pane.
//!
//! `bat` is treated as an opaque backend: it infers the language from the
//! file name, emits ANSI-styled text, and we parse that back into ratatui
//! spans. When bat declines the input we fall back to unstyled lines.

use std::path::Path;

use bat::PrettyPrinter;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};

/// Highlight `content` as the language inferred from `path`.
pub(crate) fn highlight(path: &Path, content: &str) -> Vec<Line<'static>> {
    let mut printer = PrettyPrinter::new();
    printer
        .input(bat::Input::from_bytes(content.as_bytes()).name(path))
        .header(false)
        .grid(false)
        .line_numbers(false)
        .colored_output(true)
        .true_color(true)
        .snip(false);

    let mut styled = String::new();
    match printer.print_with_writer(Some(&mut styled)) {
        Ok(_) => styled.lines().map(parse_ansi_line).collect(),
        Err(_) => plain_lines(content),
    }
}

/// Fallback when highlighting fails: raw text, default style.
pub(crate) fn plain_lines(content: &str) -> Vec<Line<'static>> {
    content
        .lines()
        .map(|line| Line::from(Span::raw(line.to_string())))
        .collect()
}

/// Convert one ANSI-styled line into ratatui spans.
fn parse_ansi_line(line: &str) -> Line<'static> {
    let mut spans = Vec::new();
    let mut text = String::new();
    let mut style = Style::default();
    let mut chars = line.chars().peekable();

    while let Some(ch) = chars.next() {
        if ch != '\x1b' {
            text.push(ch);
            continue;
        }
        if chars.peek() != Some(&'[') {
            continue;
        }
        chars.next();

        if !text.is_empty() {
            spans.push(Span::styled(std::mem::take(&mut text), style));
        }

        let mut params = String::new();
        while let Some(&c) = chars.peek() {
            if c.is_ascii_digit() || c == ';' {
                params.push(c);
                chars.next();
            } else {
                break;
            }
        }
        // Only SGR sequences carry style; anything else is dropped.
        if chars.next() == Some('m') {
            style = apply_sgr(&params, style);
        }
    }

    if !text.is_empty() {
        spans.push(Span::styled(text, style));
    }
    Line::from(spans)
}

/// Apply a semicolon-separated SGR parameter list to `style`.
fn apply_sgr(params: &str, mut style: Style) -> Style {
    let codes: Vec<u8> = params
        .split(';')
        .map(|part| part.parse::<u8>().unwrap_or(0))
        .collect();
    if codes.is_empty() {
        return Style::default();
    }

    let mut i = 0;
    while i < codes.len() {
        match codes[i] {
            0 => style = Style::default(),
            1 => style = style.add_modifier(Modifier::BOLD),
            2 => style = style.add_modifier(Modifier::DIM),
            3 => style = style.add_modifier(Modifier::ITALIC),
            4 => style = style.add_modifier(Modifier::UNDERLINED),
            7 => style = style.add_modifier(Modifier::REVERSED),
            22 => {
                style = style
                    .remove_modifier(Modifier::BOLD)
                    .remove_modifier(Modifier::DIM);
            }
            23 => style = style.remove_modifier(Modifier::ITALIC),
            24 => style = style.remove_modifier(Modifier::UNDERLINED),
            27 => style = style.remove_modifier(Modifier::REVERSED),
            30..=37 => style = style.fg(basic_color(codes[i] - 30)),
            39 => style = style.fg(Color::Reset),
            40..=47 => style = style.bg(basic_color(codes[i] - 40)),
            49 => style = style.bg(Color::Reset),
            90..=97 => style = style.fg(bright_color(codes[i] - 90)),
            100..=107 => style = style.bg(bright_color(codes[i] - 100)),
            38 | 48 => {
                let (color, consumed) = extended_color(&codes[i + 1..]);
                if let Some(color) = color {
                    style = if codes[i] == 38 {
                        style.fg(color)
                    } else {
                        style.bg(color)
                    };
                }
                i += consumed;
            }
            _ => {}
        }
        i += 1;
    }
    style
}

fn basic_color(index: u8) -> Color {
    [
        Color::Black,
        Color::Red,
        Color::Green,
        Color::Yellow,
        Color::Blue,
        Color::Magenta,
        Color::Cyan,
        Color::Gray,
    ][usize::from(index)]
}

fn bright_color(index: u8) -> Color {
    [
        Color::DarkGray,
        Color::LightRed,
        Color::LightGreen,
        Color::LightYellow,
        Color::LightBlue,
        Color::LightMagenta,
        Color::LightCyan,
        Color::White,
    ][usize::from(index)]
}

/// Parse the tail of a 256-color (`5;N`) or true-color (`2;R;G;B`) sequence.
/// Returns the color and how many parameters were consumed.
fn extended_color(rest: &[u8]) -> (Option<Color>, usize) {
    match rest {
        [5, n, ..] => (Some(Color::Indexed(*n)), 2),
        [2, r, g, b, ..] => (Some(Color::Rgb(*r, *g, *b)), 4),
        _ => (None, 0),
    }
}
