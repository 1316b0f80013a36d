use anyhow::Result;
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table, TableState, Wrap},
    Frame, Terminal,
};
use std::io;
use tier_list::{Character, Tier, TierStore};

/// A row of cards the cursor can sit on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    Tier(Tier),
    Pool,
}

impl Focus {
    pub fn next(&self) -> Self {
        match self {
            Focus::Tier(tier) => match Tier::from_rank(tier.rank() + 1) {
                Some(below) => Focus::Tier(below),
                None => Focus::Pool,
            },
            Focus::Pool => Focus::Tier(Tier::S),
        }
    }

    pub fn previous(&self) -> Self {
        match self {
            Focus::Tier(Tier::S) => Focus::Pool,
            Focus::Tier(tier) => match tier.rank().checked_sub(1).and_then(Tier::from_rank) {
                Some(above) => Focus::Tier(above),
                None => Focus::Pool,
            },
            Focus::Pool => Focus::Tier(Tier::D),
        }
    }

    pub fn title(&self) -> String {
        match self {
            Focus::Tier(tier) => format!("Tier {}", tier),
            Focus::Pool => "Персонажи".to_string(),
        }
    }
}

pub struct App {
    pub store: TierStore,
    pub focus: Focus,
    pub cursor: usize,
    pub pool_state: TableState,
    pub message: Option<String>,
}

impl App {
    pub fn new(store: TierStore) -> Self {
        let mut pool_state = TableState::default();
        if !store.pool().is_empty() {
            pool_state.select(Some(0));
        }

        Self {
            store,
            focus: Focus::Pool,
            cursor: 0,
            pool_state,
            message: None,
        }
    }

    /// Cards in the focused row, in display order
    pub fn focused_cards(&self) -> &[Character] {
        match self.focus {
            Focus::Tier(tier) => self.store.tier(tier),
            Focus::Pool => self.store.pool(),
        }
    }

    pub fn selected_character(&self) -> Option<&Character> {
        self.focused_cards().get(self.cursor)
    }

    pub fn next_row(&mut self) {
        self.focus = self.focus.next();
        self.clamp_cursor();
    }

    pub fn previous_row(&mut self) {
        self.focus = self.focus.previous();
        self.clamp_cursor();
    }

    pub fn next_card(&mut self) {
        let len = self.focused_cards().len();
        if len == 0 {
            return;
        }
        self.cursor = if self.cursor >= len - 1 { 0 } else { self.cursor + 1 };
        self.sync_pool_state();
    }

    pub fn previous_card(&mut self) {
        let len = self.focused_cards().len();
        if len == 0 {
            return;
        }
        self.cursor = if self.cursor == 0 { len - 1 } else { self.cursor - 1 };
        self.sync_pool_state();
    }

    /// Pick up the selected card
    pub fn grab(&mut self) {
        let Some(id) = self.selected_character().map(|c| c.id.clone()) else {
            return;
        };

        if self.store.begin_drag(&id) {
            if let Some(c) = self.store.character(&id) {
                self.message = Some(format!("Dragging {} {}", c.avatar, c.name));
            }
        }
    }

    /// Drop the dragged card into a tier and follow it with the cursor
    pub fn drop_into(&mut self, tier: Tier) {
        let Some(id) = self.store.dragging().map(str::to_string) else {
            self.message = Some("Nothing to drop (Space picks up a card)".to_string());
            return;
        };

        if self.store.drop_into(tier) {
            self.focus = Focus::Tier(tier);
            self.cursor = self.store.tier(tier).len().saturating_sub(1);
            self.message = self
                .store
                .character(&id)
                .map(|c| format!("{} → {}", c.name, tier));
        }
        self.clamp_cursor();
    }

    pub fn remove_selected(&mut self) {
        let Some(id) = self.selected_character().map(|c| c.id.clone()) else {
            return;
        };

        if self.store.remove_from_tier(&id) {
            self.message = self
                .store
                .character(&id)
                .map(|c| format!("{} returned to the pool", c.name));
        }
        self.clamp_cursor();
    }

    pub fn cancel_drag(&mut self) {
        if self.store.cancel_drag() {
            self.message = Some("Drag cancelled".to_string());
        }
    }

    /// Apply one key press. Returns true when the app should quit.
    pub fn handle_key(&mut self, code: KeyCode) -> bool {
        match code {
            KeyCode::Char('q') => return true,
            KeyCode::Esc => {
                if self.store.dragging().is_none() {
                    return true;
                }
                self.cancel_drag();
            }
            KeyCode::Down | KeyCode::Char('j') => self.next_row(),
            KeyCode::Up | KeyCode::Char('k') => self.previous_row(),
            KeyCode::Right | KeyCode::Char('l') => self.next_card(),
            KeyCode::Left | KeyCode::Char('h') => self.previous_card(),
            KeyCode::Char(' ') | KeyCode::Enter => self.grab(),
            KeyCode::Char('x') | KeyCode::Delete | KeyCode::Backspace => self.remove_selected(),
            KeyCode::Char(c) => {
                if let Some(tier) = tier_for_key(c) {
                    self.drop_into(tier);
                }
            }
            _ => {}
        }
        false
    }

    fn clamp_cursor(&mut self) {
        let len = self.focused_cards().len();
        if self.cursor >= len {
            self.cursor = len.saturating_sub(1);
        }
        self.sync_pool_state();
    }

    fn sync_pool_state(&mut self) {
        let len = self.store.pool().len();
        if len == 0 {
            self.pool_state.select(None);
        } else if self.focus == Focus::Pool {
            self.pool_state.select(Some(self.cursor));
        } else if let Some(selected) = self.pool_state.selected() {
            self.pool_state.select(Some(selected.min(len - 1)));
        }
    }
}

/// s/a/b/c/d or 1-5 pick a drop target
fn tier_for_key(c: char) -> Option<Tier> {
    match c {
        '1'..='5' => Tier::from_rank(c as usize - '1' as usize),
        _ => c.to_string().parse().ok(),
    }
}

fn tier_color(tier: Tier) -> Color {
    match tier {
        Tier::S => Color::Red,
        Tier::A => Color::Rgb(249, 115, 22),
        Tier::B => Color::Yellow,
        Tier::C => Color::Green,
        Tier::D => Color::Blue,
    }
}

pub fn run_ui(app: &mut App) -> Result<()> {
    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Run the app
    let res = run_app(&mut terminal, app);

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        tracing::error!(error = %err, "tier list UI failed");
        println!("Error: {:?}", err);
    }

    Ok(())
}

fn run_app<B: ratatui::backend::Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
) -> io::Result<()> {
    loop {
        terminal.draw(|f| ui(f, app))?;

        if let Event::Key(key) = event::read()? {
            if key.kind == KeyEventKind::Press && app.handle_key(key.code) {
                return Ok(());
            }
        }
    }
}

fn ui(f: &mut Frame, app: &mut App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),  // Header
            Constraint::Length(15), // Tier rows
            Constraint::Min(0),     // Pool + detail
            Constraint::Length(3),  // Status bar
        ])
        .split(f.size());

    render_header(f, chunks[0], app);
    render_tiers(f, chunks[1], app);

    let bottom = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage(65), // Pool
            Constraint::Percentage(35), // Detail panel
        ])
        .split(chunks[2]);

    render_pool(f, bottom[0], app);
    render_detail_panel(f, bottom[1], app);
    render_status_bar(f, chunks[3], app);
}

fn render_header(f: &mut Frame, area: Rect, app: &App) {
    let snapshot = app.store.snapshot();

    let mut spans = vec![
        Span::styled(
            "Тир лист персонажей",
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        ),
        Span::raw("  |  "),
        Span::styled(
            format!("Ranked: {}/{}", snapshot.ranked_count(), app.store.len()),
            Style::default().fg(Color::White),
        ),
    ];

    for row in &snapshot.tiers {
        spans.push(Span::raw("  "));
        spans.push(Span::styled(
            format!("{} {}", row.tier, row.characters.len()),
            Style::default().fg(tier_color(row.tier)),
        ));
    }

    let header = Paragraph::new(Line::from(spans))
        .block(Block::default().borders(Borders::ALL).border_style(Style::default().fg(Color::Cyan)));

    f.render_widget(header, area);
}

fn render_tiers(f: &mut Frame, area: Rect, app: &App) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3); 5])
        .split(area);

    for (tier, row_area) in Tier::ALL.iter().zip(rows.iter()) {
        let parts = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Length(7), Constraint::Min(0)])
            .split(*row_area);

        let label = Paragraph::new(tier.as_str())
            .alignment(Alignment::Center)
            .style(
                Style::default()
                    .bg(tier_color(*tier))
                    .fg(Color::White)
                    .add_modifier(Modifier::BOLD),
            )
            .block(Block::default().borders(Borders::ALL));
        f.render_widget(label, parts[0]);

        let focused = app.focus == Focus::Tier(*tier);
        let cards = app.store.tier(*tier);

        let line = if cards.is_empty() {
            Line::from(Span::styled(
                "Перетащите персонажей сюда",
                Style::default().fg(Color::DarkGray),
            ))
        } else {
            let mut spans = vec![];
            for (i, c) in cards.iter().enumerate() {
                if i > 0 {
                    spans.push(Span::raw(" │ "));
                }
                spans.push(card_span(app, c, focused && i == app.cursor));
            }
            Line::from(spans)
        };

        let border = if focused { Color::Yellow } else { Color::DarkGray };
        let zone = Paragraph::new(line)
            .block(Block::default().borders(Borders::ALL).border_style(Style::default().fg(border)));
        f.render_widget(zone, parts[1]);
    }
}

fn card_span<'a>(app: &App, c: &'a Character, selected: bool) -> Span<'a> {
    let mut style = Style::default().fg(Color::White);
    if selected {
        style = style.add_modifier(Modifier::REVERSED);
    }
    if app.store.dragging() == Some(c.id.as_str()) {
        style = style.add_modifier(Modifier::ITALIC | Modifier::UNDERLINED);
    }
    Span::styled(format!("{} {}", c.avatar, c.name), style)
}

fn render_pool(f: &mut Frame, area: Rect, app: &mut App) {
    let header_cells = ["", "Name", "Description", "Rating"]
        .iter()
        .map(|h| {
            Cell::from(*h).style(
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::BOLD),
            )
        });

    let header = Row::new(header_cells)
        .style(Style::default().bg(Color::DarkGray))
        .height(1);

    let dragging = app.store.dragging();
    let rows = app.store.pool().iter().map(|c| {
        let name_style = if dragging == Some(c.id.as_str()) {
            Style::default().add_modifier(Modifier::ITALIC | Modifier::UNDERLINED)
        } else {
            Style::default()
        };

        Row::new(vec![
            Cell::from(c.avatar.clone()),
            Cell::from(c.name.clone()).style(name_style),
            Cell::from(truncate(&c.description, 30)),
            Cell::from(c.stars()).style(Style::default().fg(Color::Yellow)),
        ])
        .height(1)
    });

    let border = if app.focus == Focus::Pool { Color::Yellow } else { Color::DarkGray };
    let highlight = if app.focus == Focus::Pool {
        Style::default().add_modifier(Modifier::REVERSED)
    } else {
        Style::default()
    };

    let table = Table::new(
        rows,
        [
            Constraint::Length(4),
            Constraint::Length(14),
            Constraint::Length(32),
            Constraint::Length(7),
        ],
    )
    .header(header)
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(border))
            .title(format!(" {} ({}) ", Focus::Pool.title(), app.store.pool().len())),
    )
    .highlight_style(highlight);

    f.render_stateful_widget(table, area, &mut app.pool_state);
}

fn render_detail_panel(f: &mut Frame, area: Rect, app: &App) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Yellow))
        .title(format!(" {} ", app.focus.title()));

    let Some(c) = app.selected_character() else {
        let empty = Paragraph::new("  No card selected").block(block);
        f.render_widget(empty, area);
        return;
    };

    let location = match c.tier {
        Some(tier) => Span::styled(
            format!("Tier {}", tier),
            Style::default().fg(tier_color(tier)).add_modifier(Modifier::BOLD),
        ),
        None => Span::styled("Pool", Style::default().fg(Color::DarkGray)),
    };

    let content = vec![
        Line::from(""),
        Line::from(vec![
            Span::raw("  "),
            Span::raw(c.avatar.as_str()),
            Span::raw("  "),
            Span::styled(c.name.as_str(), Style::default().add_modifier(Modifier::BOLD)),
        ]),
        Line::from(""),
        Line::from(vec![
            Span::styled("  Rating: ", Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)),
            Span::styled(c.stars(), Style::default().fg(Color::Yellow)),
        ]),
        Line::from(vec![
            Span::styled("  Location: ", Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)),
            location,
        ]),
        Line::from(""),
        Line::from(vec![
            Span::raw("  "),
            Span::styled(
                c.description.as_str(),
                Style::default().fg(Color::DarkGray).add_modifier(Modifier::ITALIC),
            ),
        ]),
    ];

    let detail_panel = Paragraph::new(content)
        .wrap(Wrap { trim: false })
        .block(block);

    f.render_widget(detail_panel, area);
}

fn render_status_bar(f: &mut Frame, area: Rect, app: &App) {
    let mut status_spans = vec![];

    if let Some(message) = &app.message {
        status_spans.push(Span::styled(
            format!(" {} ", message),
            Style::default().fg(Color::Green),
        ));
        status_spans.push(Span::raw("| "));
    }

    status_spans.push(Span::styled("Space", Style::default().fg(Color::Yellow)));
    status_spans.push(Span::raw(" Grab | "));
    status_spans.push(Span::styled("S/A/B/C/D", Style::default().fg(Color::Yellow)));
    status_spans.push(Span::raw(" Drop | "));
    status_spans.push(Span::styled("x", Style::default().fg(Color::Yellow)));
    status_spans.push(Span::raw(" Unrank | "));
    status_spans.push(Span::styled("↑/↓ ←/→", Style::default().fg(Color::Yellow)));
    status_spans.push(Span::raw(" Nav | "));
    status_spans.push(Span::styled("Esc", Style::default().fg(Color::Yellow)));
    status_spans.push(Span::raw(" Cancel | "));
    status_spans.push(Span::styled("q", Style::default().fg(Color::Red)));
    status_spans.push(Span::raw(" Quit"));

    let status_bar = Paragraph::new(Line::from(status_spans)).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::White)),
    );

    f.render_widget(status_bar, area);
}

fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let cut: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", cut)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tier_list::default_roster;

    fn app_with(ids: &[&str]) -> App {
        let seed = ids
            .iter()
            .map(|id| Character::new(*id, id.to_uppercase(), "desc", 3, "*"))
            .collect();
        App::new(TierStore::new(seed))
    }

    fn pool_ids(app: &App) -> Vec<String> {
        app.store.pool().iter().map(|c| c.id.clone()).collect()
    }

    #[test]
    fn test_focus_cycles_through_tiers_and_pool() {
        let mut focus = Focus::Pool;
        let mut seen = vec![];
        for _ in 0..6 {
            focus = focus.next();
            seen.push(focus);
        }
        assert_eq!(
            seen,
            vec![
                Focus::Tier(Tier::S),
                Focus::Tier(Tier::A),
                Focus::Tier(Tier::B),
                Focus::Tier(Tier::C),
                Focus::Tier(Tier::D),
                Focus::Pool,
            ]
        );

        assert_eq!(Focus::Pool.previous(), Focus::Tier(Tier::D));
        assert_eq!(Focus::Tier(Tier::S).previous(), Focus::Pool);
        assert_eq!(Focus::Tier(Tier::B).previous(), Focus::Tier(Tier::A));
    }

    #[test]
    fn test_tier_for_key() {
        assert_eq!(tier_for_key('s'), Some(Tier::S));
        assert_eq!(tier_for_key('D'), Some(Tier::D));
        assert_eq!(tier_for_key('1'), Some(Tier::S));
        assert_eq!(tier_for_key('5'), Some(Tier::D));
        assert_eq!(tier_for_key('6'), None);
        assert_eq!(tier_for_key('z'), None);
    }

    #[test]
    fn test_grab_and_drop_with_keys() {
        let mut app = app_with(&["a", "b"]);

        assert!(!app.handle_key(KeyCode::Char(' ')));
        assert_eq!(app.store.dragging(), Some("a"));

        app.handle_key(KeyCode::Char('s'));
        assert_eq!(pool_ids(&app), vec!["b"]);
        assert_eq!(app.store.tier(Tier::S)[0].id, "a");
        assert_eq!(app.focus, Focus::Tier(Tier::S));
        assert_eq!(app.selected_character().map(|c| c.id.as_str()), Some("a"));
    }

    #[test]
    fn test_remove_returns_card_to_pool() {
        let mut app = app_with(&["a", "b"]);
        app.handle_key(KeyCode::Enter);
        app.handle_key(KeyCode::Char('2'));
        assert_eq!(app.focus, Focus::Tier(Tier::A));

        app.handle_key(KeyCode::Char('x'));
        assert!(app.store.tier(Tier::A).is_empty());
        assert_eq!(pool_ids(&app), vec!["b", "a"]);
        assert_eq!(app.cursor, 0);
        assert!(app.store.check_invariant().is_ok());
    }

    #[test]
    fn test_drop_without_grab_keeps_state() {
        let mut app = app_with(&["a"]);
        let before = app.store.snapshot();

        app.handle_key(KeyCode::Char('b'));

        assert_eq!(app.store.snapshot(), before);
        assert!(app.message.is_some());
    }

    #[test]
    fn test_escape_cancels_then_quits() {
        let mut app = app_with(&["a"]);
        app.handle_key(KeyCode::Char(' '));

        assert!(!app.handle_key(KeyCode::Esc));
        assert_eq!(app.store.dragging(), None);
        assert!(app.handle_key(KeyCode::Esc));
        assert!(app.handle_key(KeyCode::Char('q')));
    }

    #[test]
    fn test_card_navigation_wraps() {
        let mut app = App::new(TierStore::new(default_roster()));
        assert_eq!(app.cursor, 0);

        app.handle_key(KeyCode::Left);
        assert_eq!(app.cursor, 7);
        app.handle_key(KeyCode::Right);
        assert_eq!(app.cursor, 0);
        assert_eq!(app.pool_state.selected(), Some(0));

        // empty tier rows clamp the cursor
        app.handle_key(KeyCode::Right);
        app.handle_key(KeyCode::Down);
        assert_eq!(app.focus, Focus::Tier(Tier::S));
        assert_eq!(app.cursor, 0);
        assert!(app.selected_character().is_none());
    }

    #[test]
    fn test_pool_selection_stays_in_range_after_drop() {
        let mut app = App::new(TierStore::new(default_roster()));
        app.handle_key(KeyCode::Left);
        assert_eq!(app.pool_state.selected(), Some(7));

        app.handle_key(KeyCode::Char(' '));
        app.handle_key(KeyCode::Char('s'));

        assert_eq!(app.focus, Focus::Tier(Tier::S));
        assert_eq!(app.store.pool().len(), 7);
        assert_eq!(app.pool_state.selected(), Some(6));
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("Хоббит-хранитель кольца", 10), "Хоббит-...");
    }
}
