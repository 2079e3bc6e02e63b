//! Outline pane rendering
//!
//! Shows the visible rows of the flattened AST, indented by depth, with a
//! fold marker on rows that have children. The selected row is kept on
//! screen by adjusting the scroll offset.

use crate::ui::outline::{Outline, RowKind};
use crate::ui::theme::DEFAULT_THEME;
use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};
use rustc_hash::FxHashSet;

fn row_style(kind: RowKind) -> Style {
    let color = match kind {
        RowKind::Block => DEFAULT_THEME.keyword,
        RowKind::Statement => DEFAULT_THEME.fg,
        RowKind::Element => DEFAULT_THEME.tag,
        RowKind::Component => DEFAULT_THEME.component,
        RowKind::Attribute => DEFAULT_THEME.attribute,
        RowKind::Expression => DEFAULT_THEME.primary,
        RowKind::Text => DEFAULT_THEME.string,
        RowKind::Comment => DEFAULT_THEME.comment,
    };
    Style::default().fg(color)
}

/// Render the outline pane
#[allow(clippy::too_many_arguments)]
pub fn render_outline_pane(
    frame: &mut Frame,
    area: Rect,
    outline: &Outline,
    visible: &[usize],
    collapsed: &FxHashSet<usize>,
    selected: usize,
    is_focused: bool,
    scroll: &mut usize,
) {
    let border_style = if is_focused {
        Style::default()
            .fg(DEFAULT_THEME.border_focused)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(DEFAULT_THEME.border_normal)
    };

    let block = Block::default()
        .title(format!(" Outline ({} nodes) ", outline.rows().len()))
        .borders(Borders::ALL)
        .border_style(border_style);

    let visible_height = area.height.saturating_sub(2).max(1) as usize;

    // Scroll just enough to keep the selection in view
    if selected < *scroll {
        *scroll = selected;
    } else if selected >= *scroll + visible_height {
        *scroll = selected + 1 - visible_height;
    }

    let lines: Vec<Line> = visible
        .iter()
        .enumerate()
        .skip(*scroll)
        .take(visible_height)
        .map(|(position, &index)| {
            let row = &outline.rows()[index];
            let marker = match (row.has_children(), collapsed.contains(&index)) {
                (false, _) => "  ",
                (true, true) => "▸ ",
                (true, false) => "▾ ",
            };

            let mut style = row_style(row.kind);
            if position == selected {
                style = style.bg(DEFAULT_THEME.selection_bg).add_modifier(Modifier::BOLD);
            }

            Line::from(vec![
                Span::raw("  ".repeat(row.depth)),
                Span::styled(marker, Style::default().fg(DEFAULT_THEME.comment)),
                Span::styled(row.label.clone(), style),
            ])
        })
        .collect();

    let paragraph = Paragraph::new(lines).block(block);
    frame.render_widget(paragraph, area);
}
