//! Interactive, read-only directory listing for `tidy ls`.
//!
//! The listing is a snapshot taken once at start-up. The only state is a
//! cursor into that snapshot; nothing in this view touches the filesystem
//! after the snapshot is taken.

use crate::output::{Rgb, Theme};
use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{
    Frame, Terminal,
    backend::{Backend, CrosstermBackend},
    layout::{Constraint, Layout},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{HighlightSpacing, List, ListItem, ListState, Paragraph},
};
use std::fs;
use std::io::{self, Stdout};
use std::path::Path;

impl From<Rgb> for Color {
    fn from(Rgb(r, g, b): Rgb) -> Self {
        Color::Rgb(r, g, b)
    }
}

/// One row of the listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExplorerEntry {
    pub name: String,
    pub is_dir: bool,
}

impl ExplorerEntry {
    /// Name as shown in the list; directories get a trailing `/`.
    pub fn display_name(&self) -> String {
        if self.is_dir {
            format!("{}/", self.name)
        } else {
            self.name.clone()
        }
    }
}

/// Reads the entries of `base_path`, sorted by name.
pub fn snapshot(base_path: &Path) -> io::Result<Vec<ExplorerEntry>> {
    let mut entries: Vec<ExplorerEntry> = fs::read_dir(base_path)?
        .flatten()
        .map(|entry| ExplorerEntry {
            name: entry.file_name().to_string_lossy().into_owned(),
            is_dir: entry.file_type().is_ok_and(|t| t.is_dir()),
        })
        .collect();
    entries.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(entries)
}

/// Result of handling a key press.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyOutcome {
    Continue,
    Quit,
}

/// Cursor state over a fixed list of entries.
#[derive(Debug, Default)]
pub struct ExplorerState {
    entries: Vec<ExplorerEntry>,
    cursor: usize,
    list_state: ListState,
}

impl ExplorerState {
    pub fn new(entries: Vec<ExplorerEntry>) -> Self {
        Self {
            entries,
            ..Default::default()
        }
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn selected(&self) -> Option<&ExplorerEntry> {
        self.entries.get(self.cursor)
    }

    pub fn move_up(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    pub fn move_down(&mut self) {
        if self.cursor + 1 < self.entries.len() {
            self.cursor += 1;
        }
    }

    pub fn move_to_first(&mut self) {
        self.cursor = 0;
    }

    pub fn move_to_last(&mut self) {
        self.cursor = self.entries.len().saturating_sub(1);
    }

    /// Applies a key event. Only presses count; releases and repeats are
    /// ignored.
    pub fn handle_key(&mut self, key: KeyEvent) -> KeyOutcome {
        if key.kind != KeyEventKind::Press {
            return KeyOutcome::Continue;
        }

        match (key.modifiers, key.code) {
            (KeyModifiers::CONTROL, KeyCode::Char('c')) => return KeyOutcome::Quit,
            (_, KeyCode::Char('q') | KeyCode::Esc) => return KeyOutcome::Quit,
            (_, KeyCode::Up | KeyCode::Char('k')) => self.move_up(),
            (_, KeyCode::Down | KeyCode::Char('j')) => self.move_down(),
            (_, KeyCode::Home | KeyCode::Char('g')) => self.move_to_first(),
            (_, KeyCode::End | KeyCode::Char('G')) => self.move_to_last(),
            _ => {}
        }
        KeyOutcome::Continue
    }
}

/// Draws the listing into `frame`.
pub fn render(frame: &mut Frame, state: &mut ExplorerState, theme: &Theme) {
    let [title_area, list_area, footer_area] = Layout::vertical([
        Constraint::Length(2),
        Constraint::Min(0),
        Constraint::Length(1),
    ])
    .areas(frame.area());

    let title = Span::styled(
        "TIDY EXPLORER",
        Style::default()
            .fg(theme.title.into())
            .add_modifier(Modifier::BOLD),
    );
    frame.render_widget(Paragraph::new(Line::from(title)), title_area);

    let items: Vec<ListItem> = state
        .entries
        .iter()
        .map(|entry| {
            let style = if entry.is_dir {
                Style::default().fg(theme.directory.into())
            } else {
                Style::default()
            };
            ListItem::new(Line::from(Span::styled(entry.display_name(), style)))
        })
        .collect();

    let list = List::new(items)
        .highlight_symbol("> ")
        .highlight_spacing(HighlightSpacing::Always)
        .highlight_style(Style::default().add_modifier(Modifier::BOLD));

    let selected = (!state.entries.is_empty()).then_some(state.cursor);
    state.list_state.select(selected);
    frame.render_stateful_widget(list, list_area, &mut state.list_state);

    let footer = Span::styled(" (q to quit)", Style::default().fg(theme.help.into()));
    frame.render_widget(Paragraph::new(Line::from(footer)), footer_area);
}

/// Runs the interactive listing of `base_path` until the user quits.
///
/// The terminal is put back into its normal state on every exit path.
pub fn run(base_path: &Path, theme: &Theme) -> io::Result<()> {
    let mut state = ExplorerState::new(snapshot(base_path)?);

    let mut terminal = setup_terminal()?;
    let result = event_loop(&mut terminal, &mut state, theme);
    let restored = restore_terminal(&mut terminal);

    result.and(restored)
}

fn event_loop<B: Backend>(
    terminal: &mut Terminal<B>,
    state: &mut ExplorerState,
    theme: &Theme,
) -> io::Result<()> {
    loop {
        terminal.draw(|frame| render(frame, state, theme))?;

        if let Event::Key(key) = event::read()?
            && state.handle_key(key) == KeyOutcome::Quit
        {
            return Ok(());
        }
    }
}

fn setup_terminal() -> io::Result<Terminal<CrosstermBackend<Stdout>>> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    if let Err(e) = execute!(stdout, EnterAlternateScreen) {
        let _ = disable_raw_mode();
        return Err(e);
    }

    Terminal::new(CrosstermBackend::new(stdout)).inspect_err(|_| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
    })
}

/// Every step runs even if an earlier one fails; the first error wins.
fn restore_terminal(terminal: &mut Terminal<CrosstermBackend<Stdout>>) -> io::Result<()> {
    let raw_mode = disable_raw_mode();
    let screen = execute!(terminal.backend_mut(), LeaveAlternateScreen);
    let cursor = terminal.show_cursor();
    first_error([raw_mode, screen, cursor])
}

fn first_error(results: impl IntoIterator<Item = io::Result<()>>) -> io::Result<()> {
    results.into_iter().collect()
}
