//! Source pane rendering with syntax highlighting
//!
//! This module renders the template source with basic highlighting and marks
//! the lines covered by the selected outline row, or the error line when the
//! template failed to parse.
//!
//! # Rendering
//!
//! The pane uses a simple character-by-character tokenizer to apply syntax
//! highlighting styles without running the real scanner, so it also works on
//! templates that do not parse.

use crate::ui::theme::DEFAULT_THEME;
use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

/// Lines to emphasize, 1-based and inclusive
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceHighlight {
    Selection { first: usize, last: usize },
    Error { line: usize },
}

impl SourceHighlight {
    fn first_line(self) -> usize {
        match self {
            SourceHighlight::Selection { first, .. } => first,
            SourceHighlight::Error { line } => line,
        }
    }

    fn contains(self, line: usize) -> bool {
        match self {
            SourceHighlight::Selection { first, last } => (first..=last).contains(&line),
            SourceHighlight::Error { line: error_line } => line == error_line,
        }
    }
}

/// Scroll state for the source pane
pub struct SourceScrollState {
    pub offset: usize,
    pub target_line_row: Option<usize>,
}

impl SourceScrollState {
    pub fn new() -> Self {
        Self {
            offset: 0,
            target_line_row: None,
        }
    }
}

impl Default for SourceScrollState {
    fn default() -> Self {
        Self::new()
    }
}

/// Simple syntax highlighting for Pico templates
fn highlight_source_code(line: &str) -> Line<'_> {
    let mut spans = Vec::new();
    let mut current_word = String::new();

    let chars: Vec<(usize, char)> = line.char_indices().collect();
    let mut i = 0;
    // Words right after `<` or `</` are tag names
    let mut after_angle = false;

    while i < chars.len() {
        let (byte, c) = chars[i];

        // Line comments (frontmatter and expressions)
        if c == '/' && chars.get(i + 1).is_some_and(|&(_, next)| next == '/') {
            flush_word(&mut spans, &mut current_word, after_angle);
            spans.push(Span::styled(
                line[byte..].to_string(),
                Style::default().fg(DEFAULT_THEME.comment),
            ));
            break;
        }

        // Strings
        if c == '"' || c == '\'' || c == '`' {
            flush_word(&mut spans, &mut current_word, after_angle);
            let mut end = i + 1;
            while end < chars.len() && chars[end].1 != c {
                if chars[end].1 == '\\' {
                    end += 2;
                } else {
                    end += 1;
                }
            }
            let end = (end + 1).min(chars.len());
            let end_byte = chars.get(end).map_or(line.len(), |&(b, _)| b);
            spans.push(Span::styled(
                line[byte..end_byte].to_string(),
                Style::default().fg(DEFAULT_THEME.string),
            ));
            i = end;
            continue;
        }

        // Delimiters
        if !c.is_alphanumeric() && c != '_' && c != '-' {
            flush_word(&mut spans, &mut current_word, after_angle);
            after_angle = c == '<' || (c == '/' && after_angle);

            let style = match c {
                '{' | '}' => Style::default()
                    .fg(DEFAULT_THEME.primary)
                    .add_modifier(Modifier::BOLD),
                '<' | '>' => Style::default().fg(DEFAULT_THEME.comment),
                '(' | ')' | '[' | ']' => Style::default().fg(DEFAULT_THEME.primary),
                _ => Style::default().fg(DEFAULT_THEME.fg),
            };

            spans.push(Span::styled(c.to_string(), style));
            i += 1;
            continue;
        }

        current_word.push(c);
        i += 1;
    }

    flush_word(&mut spans, &mut current_word, after_angle);
    Line::from(spans)
}

fn flush_word(spans: &mut Vec<Span<'_>>, word: &mut String, is_tag: bool) {
    if word.is_empty() {
        return;
    }
    let style = get_word_style(word, is_tag);
    spans.push(Span::styled(std::mem::take(word), style));
}

fn get_word_style(word: &str, is_tag: bool) -> Style {
    if is_tag {
        let color = if word.starts_with(|c: char| c.is_ascii_uppercase()) {
            DEFAULT_THEME.component
        } else {
            DEFAULT_THEME.tag
        };
        return Style::default().fg(color);
    }

    match word {
        "if" | "else" | "for" | "of" | "let" | "const" | "import" | "from" | "prop" => Style::default()
            .fg(DEFAULT_THEME.keyword)
            .add_modifier(Modifier::BOLD),
        "true" | "false" | "null" | "undefined" => Style::default().fg(DEFAULT_THEME.number),
        _ if word.starts_with(|c: char| c.is_ascii_digit()) => Style::default().fg(DEFAULT_THEME.number),
        _ => Style::default().fg(DEFAULT_THEME.fg),
    }
}

/// Render the source pane
pub fn render_source_pane(
    frame: &mut Frame,
    area: Rect,
    source_code: &str,
    highlight: Option<SourceHighlight>,
    is_focused: bool,
    scroll_state: &mut SourceScrollState,
) {
    let border_style = if is_focused {
        Style::default()
            .fg(DEFAULT_THEME.border_focused)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(DEFAULT_THEME.border_normal)
    };

    let block = Block::default()
        .title(" Source ")
        .borders(Borders::ALL)
        .border_style(border_style);

    let lines: Vec<&str> = source_code.lines().collect();
    let total_lines = lines.len();

    let visible_height = area.height.saturating_sub(2).max(1) as usize; // Account for borders

    // Keep the first highlighted line at a fixed visual row
    let target_row = scroll_state
        .target_line_row
        .unwrap_or(visible_height / 3)
        .min(visible_height.saturating_sub(1));
    scroll_state.target_line_row = Some(target_row);

    if let Some(highlight) = highlight {
        let target_line_idx = highlight.first_line().saturating_sub(1);
        scroll_state.offset = target_line_idx.saturating_sub(target_row);
    }
    let max_scroll = total_lines.saturating_sub(visible_height);
    scroll_state.offset = scroll_state.offset.min(max_scroll);

    let visible_lines: Vec<Line> = lines
        .iter()
        .enumerate()
        .skip(scroll_state.offset)
        .take(visible_height)
        .map(|(idx, line)| {
            let line_num = idx + 1;
            let line_num_str = format!("{:4} ", line_num);
            let mut content_line = highlight_source_code(line);

            let num_style = match highlight {
                Some(h @ SourceHighlight::Error { .. }) if h.contains(line_num) => {
                    // Error line: white on red
                    let error_style = Style::default()
                        .bg(DEFAULT_THEME.error)
                        .fg(Color::White)
                        .add_modifier(Modifier::BOLD);
                    for span in &mut content_line.spans {
                        span.style = error_style;
                    }
                    Style::default()
                        .fg(DEFAULT_THEME.error)
                        .add_modifier(Modifier::BOLD)
                }
                Some(h) if h.contains(line_num) => {
                    let bg = Style::default().bg(DEFAULT_THEME.current_line_bg);
                    for span in &mut content_line.spans {
                        span.style = span.style.patch(bg);
                    }
                    Style::default()
                        .fg(DEFAULT_THEME.secondary)
                        .add_modifier(Modifier::BOLD)
                }
                _ => Style::default().fg(DEFAULT_THEME.comment),
            };

            let mut final_spans = vec![Span::styled(line_num_str, num_style)];
            final_spans.extend(content_line.spans);
            Line::from(final_spans)
        })
        .collect();

    let paragraph = Paragraph::new(visible_lines).block(block);
    frame.render_widget(paragraph, area);
}
