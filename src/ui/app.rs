//! Main TUI application state and logic

use crate::parser::ast::{Document, LineIndex, Span};
use crate::parser::error::ParseError;
use crate::ui::outline::Outline;
use crate::ui::panes::{self, SourceHighlight, SourceScrollState};
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind};
use ratatui::{
    backend::Backend,
    layout::{Constraint, Direction, Layout},
    Frame, Terminal,
};
use rustc_hash::FxHashSet;
use std::io;
use std::time::Duration;

/// Which pane is currently focused
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FocusedPane {
    Outline,
    Source,
}

impl FocusedPane {
    pub fn next(self) -> Self {
        match self {
            FocusedPane::Outline => FocusedPane::Source,
            FocusedPane::Source => FocusedPane::Outline,
        }
    }
}

/// The main application state
pub struct App {
    /// The template being viewed
    pub source_code: String,
    pub file_name: String,
    line_index: LineIndex,

    /// Flattened tree; empty when the parse failed
    pub outline: Outline,
    pub error: Option<ParseError>,

    /// Row indices (into `outline.rows()`) whose subtree is hidden
    pub collapsed: FxHashSet<usize>,

    /// Position of the selection in the visible row list
    pub selected: usize,

    pub focused_pane: FocusedPane,
    pub outline_scroll: usize,
    pub source_scroll: SourceScrollState,

    pub should_quit: bool,
    pub status_message: String,
}

impl App {
    pub fn new(
        source_code: String,
        file_name: String,
        result: Result<Document, ParseError>,
    ) -> Self {
        let (outline, error, status_message) = match result {
            Ok(document) => {
                let outline = Outline::new(&document);
                let message = format!("Parsed {} top-level nodes", document.nodes.len());
                (outline, None, message)
            }
            Err(err) => {
                let message = err.to_string();
                (Outline::default(), Some(err), message)
            }
        };

        App {
            line_index: LineIndex::new(&source_code),
            source_code,
            file_name,
            outline,
            error,
            collapsed: FxHashSet::default(),
            selected: 0,
            focused_pane: FocusedPane::Outline,
            outline_scroll: 0,
            source_scroll: SourceScrollState::new(),
            should_quit: false,
            status_message,
        }
    }

    /// Run the TUI application
    pub fn run<B: Backend>(&mut self, terminal: &mut Terminal<B>) -> io::Result<()> {
        loop {
            terminal.draw(|f| self.render(f))?;

            if self.should_quit {
                break;
            }

            if event::poll(Duration::from_millis(100))? {
                if let Event::Key(key) = event::read()? {
                    if key.kind == KeyEventKind::Press {
                        self.handle_key_event(key);
                    }
                }
            }
        }

        Ok(())
    }

    /// Row index under the selection, if any rows are visible
    pub fn selected_row(&self) -> Option<usize> {
        self.outline.visible(&self.collapsed).get(self.selected).copied()
    }

    /// Lines the source pane should emphasize
    pub fn highlight(&self) -> Option<SourceHighlight> {
        if let Some(err) = &self.error {
            return Some(SourceHighlight::Error {
                line: err.location().line,
            });
        }

        let row = &self.outline.rows()[self.selected_row()?];
        let (first, last) = self.line_range(row.span);
        Some(SourceHighlight::Selection { first, last })
    }

    fn line_range(&self, span: Span) -> (usize, usize) {
        let first = self.line_index.location(&self.source_code, span.start).line;
        let last_offset = span.end.saturating_sub(1).max(span.start);
        let last = self.line_index.location(&self.source_code, last_offset).line;
        (first, last)
    }

    /// Render the UI
    fn render(&mut self, frame: &mut Frame) {
        let size = frame.area();

        // Panes on top, status bar at the bottom
        let main_chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(0), Constraint::Length(1)])
            .split(size);

        // Outline (left) | Source (right)
        let columns = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(40), Constraint::Percentage(60)])
            .split(main_chunks[0]);

        let visible = self.outline.visible(&self.collapsed);
        let highlight = self.highlight();

        panes::render_outline_pane(
            frame,
            columns[0],
            &self.outline,
            &visible,
            &self.collapsed,
            self.selected,
            self.focused_pane == FocusedPane::Outline,
            &mut self.outline_scroll,
        );

        panes::render_source_pane(
            frame,
            columns[1],
            &self.source_code,
            highlight,
            self.focused_pane == FocusedPane::Source,
            &mut self.source_scroll,
        );

        let position = (!visible.is_empty()).then(|| (self.selected + 1, visible.len()));
        panes::render_status_bar(
            frame,
            main_chunks[1],
            &self.file_name,
            &self.status_message,
            position,
            self.error.is_some(),
        );
    }

    /// Handle keyboard events
    pub fn handle_key_event(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => {
                self.should_quit = true;
            }
            KeyCode::Tab => {
                self.focused_pane = self.focused_pane.next();
            }
            KeyCode::Up => match self.focused_pane {
                FocusedPane::Outline => {
                    self.selected = self.selected.saturating_sub(1);
                }
                FocusedPane::Source => {
                    // Scrolling up makes the highlighted line move down visually
                    if let Some(row) = self.source_scroll.target_line_row {
                        self.source_scroll.target_line_row = Some(row.saturating_add(1));
                    }
                }
            },
            KeyCode::Down => match self.focused_pane {
                FocusedPane::Outline => {
                    let visible = self.outline.visible(&self.collapsed).len();
                    if self.selected + 1 < visible {
                        self.selected += 1;
                    }
                }
                FocusedPane::Source => {
                    if let Some(row) = self.source_scroll.target_line_row {
                        self.source_scroll.target_line_row = Some(row.saturating_sub(1));
                    }
                }
            },
            KeyCode::Left => self.collapse_selected(),
            KeyCode::Right => self.expand_selected(),
            _ => {}
        }
    }

    fn collapse_selected(&mut self) {
        let Some(index) = self.selected_row() else {
            return;
        };
        let row = &self.outline.rows()[index];
        if row.has_children() && self.collapsed.insert(index) {
            self.status_message = format!("Collapsed {} ({} rows hidden)", row.label, row.descendants);
        }
    }

    fn expand_selected(&mut self) {
        let Some(index) = self.selected_row() else {
            return;
        };
        if self.collapsed.remove(&index) {
            self.status_message = format!("Expanded {}", self.outline.rows()[index].label);
        }
    }
}
