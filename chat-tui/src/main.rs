//! Terminal rendition of the staff chat view.
//!
//! Pure render of `carelink_core` snapshots: conversation list, open thread,
//! composer, typing line, live indicator. Key events call client operations;
//! nothing here keeps chat state of its own.

use std::io;
use std::time::Duration;

use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph, Wrap},
    Terminal,
};

use carelink_core::chat::ChatViewState;
use carelink_core::{ChatClient, Config, Session};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Focus {
    /// Keys filter and move the conversation list
    List,
    /// Keys edit the composer
    Composer,
}

struct App {
    client: ChatClient,
    focus: Focus,
    cursor: usize,
    filter: String,
    composer: String,
}

impl App {
    fn new(client: ChatClient) -> Self {
        Self {
            client,
            focus: Focus::List,
            cursor: 0,
            filter: String::new(),
            composer: String::new(),
        }
    }

    /// Returns true when the app should quit.
    async fn handle_key(&mut self, code: KeyCode, modifiers: KeyModifiers, snap: &ChatViewState) -> bool {
        if modifiers.contains(KeyModifiers::CONTROL) && matches!(code, KeyCode::Char('c') | KeyCode::Char('q')) {
            return true;
        }

        match self.focus {
            Focus::List => match code {
                KeyCode::Tab => self.focus = Focus::Composer,
                KeyCode::Up => self.cursor = self.cursor.saturating_sub(1),
                KeyCode::Down => {
                    if self.cursor + 1 < snap.rows.len() {
                        self.cursor += 1;
                    }
                }
                KeyCode::Enter => {
                    if let Some(row) = snap.rows.get(self.cursor) {
                        self.client.select_conversation(&row.id).await;
                        self.focus = Focus::Composer;
                    }
                }
                KeyCode::Esc => {
                    self.filter.clear();
                    self.client.set_filter("").await;
                }
                KeyCode::Backspace => {
                    self.filter.pop();
                    self.client.set_filter(self.filter.clone()).await;
                }
                KeyCode::Char(c) => {
                    self.filter.push(c);
                    self.cursor = 0;
                    self.client.set_filter(self.filter.clone()).await;
                }
                _ => {}
            },
            Focus::Composer => match code {
                KeyCode::Tab | KeyCode::Esc => self.focus = Focus::List,
                KeyCode::Enter => {
                    self.client.send().await;
                    // a rejected send keeps the text; a successful one clears it
                    self.composer = self.client.snapshot().await.composer;
                }
                KeyCode::Backspace => {
                    self.composer.pop();
                    self.client.set_composer(self.composer.clone()).await;
                }
                KeyCode::Char(c) => {
                    self.composer.push(c);
                    self.client.set_composer(self.composer.clone()).await;
                }
                _ => {}
            },
        }
        false
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::load();
    let session = Session::from_env()?;
    let client = ChatClient::new(&config, session)?;
    client.load().await;

    let runner = {
        let client = client.clone();
        tokio::spawn(async move { client.run().await })
    };

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = run_app(&mut terminal, App::new(client.clone())).await;

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    client.shutdown();
    let _ = runner.await;

    result
}

async fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    mut app: App,
) -> anyhow::Result<()> {
    loop {
        let snap = app.client.snapshot().await;
        if app.cursor >= snap.rows.len() && !snap.rows.is_empty() {
            app.cursor = snap.rows.len() - 1;
        }
        terminal.draw(|f| draw(f, &app, &snap))?;

        if event::poll(Duration::from_millis(100))? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press
                    && app.handle_key(key.code, key.modifiers, &snap).await
                {
                    return Ok(());
                }
            }
        }
    }
}

fn draw(f: &mut ratatui::Frame, app: &App, snap: &ChatViewState) {
    let outer = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(5), Constraint::Length(1)])
        .split(f.size());

    let panes = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(32), Constraint::Percentage(68)])
        .split(outer[0]);

    draw_conversation_list(f, app, snap, panes[0]);
    draw_thread(f, app, snap, panes[1]);
    draw_status_bar(f, snap, outer[1]);
}

fn draw_conversation_list(
    f: &mut ratatui::Frame,
    app: &App,
    snap: &ChatViewState,
    area: ratatui::layout::Rect,
) {
    let items: Vec<ListItem> = snap
        .rows
        .iter()
        .map(|row| {
            let mut spans = vec![Span::raw(row.name.clone())];
            if row.unread > 0 {
                spans.push(Span::styled(
                    format!(" ({})", row.unread),
                    Style::default()
                        .fg(Color::Green)
                        .add_modifier(Modifier::BOLD),
                ));
            }
            let mut lines = vec![Line::from(spans)];
            if let Some(name) = &row.typing {
                lines.push(Line::from(Span::styled(
                    format!("  {} is typing…", name),
                    Style::default()
                        .fg(Color::Yellow)
                        .add_modifier(Modifier::ITALIC),
                )));
            } else if let Some(preview) = &row.preview {
                lines.push(Line::from(Span::styled(
                    format!("  {}", preview),
                    Style::default().fg(Color::DarkGray),
                )));
            }
            ListItem::new(lines)
        })
        .collect();

    let title = if app.filter.is_empty() {
        "Conversations".to_string()
    } else {
        format!("Conversations /{}", app.filter)
    };
    let focused = app.focus == Focus::List;
    let list = List::new(items)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(title)
                .border_style(border_style(focused)),
        )
        .highlight_style(Style::default().bg(Color::DarkGray));

    let mut state = ListState::default();
    if !snap.rows.is_empty() {
        state.select(Some(app.cursor));
    }
    f.render_stateful_widget(list, area, &mut state);
}

fn draw_thread(
    f: &mut ratatui::Frame,
    app: &App,
    snap: &ChatViewState,
    area: ratatui::layout::Rect,
) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(3), Constraint::Length(3)])
        .split(area);

    let mut lines: Vec<Line> = Vec::new();
    for msg in &snap.thread {
        lines.push(Line::from(vec![
            Span::styled(
                msg.sent_at.format("%H:%M ").to_string(),
                Style::default().fg(Color::DarkGray),
            ),
            Span::styled(
                format!("{}: ", msg.sender_name),
                Style::default().add_modifier(Modifier::BOLD),
            ),
            Span::raw(msg.content.clone()),
        ]));
    }

    // bottom-anchored: drop lines that cannot fit
    let visible = chunks[0].height.saturating_sub(2) as usize;
    let skip = lines.len().saturating_sub(visible);
    let lines: Vec<Line> = lines.into_iter().skip(skip).collect();

    let title = snap
        .rows
        .iter()
        .find(|r| Some(&r.id) == snap.selected.as_ref())
        .map(|r| r.name.clone())
        .unwrap_or_else(|| "No conversation selected".to_string());
    let thread = Paragraph::new(lines)
        .block(Block::default().borders(Borders::ALL).title(title))
        .wrap(Wrap { trim: false });
    f.render_widget(thread, chunks[0]);

    let focused = app.focus == Focus::Composer;
    let composer = Paragraph::new(app.composer.as_str()).block(
        Block::default()
            .borders(Borders::ALL)
            .title("Message")
            .border_style(border_style(focused)),
    );
    f.render_widget(composer, chunks[1]);
}

fn draw_status_bar(f: &mut ratatui::Frame, snap: &ChatViewState, area: ratatui::layout::Rect) {
    let (indicator, style) = if snap.live {
        ("● Live", Style::default().fg(Color::Green))
    } else {
        ("○ Offline", Style::default().fg(Color::Red))
    };
    let mut spans = vec![
        Span::styled(indicator, style),
        Span::raw("  "),
        Span::raw(format!("{} unread", snap.unread_total)),
        Span::raw("  Tab: switch pane  Ctrl+Q: quit"),
    ];
    if let Some(notice) = &snap.notice {
        spans.push(Span::styled(
            format!("  {}", notice),
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        ));
    }
    f.render_widget(Paragraph::new(Line::from(spans)), area);
}

fn border_style(focused: bool) -> Style {
    if focused {
        Style::default().fg(Color::Cyan)
    } else {
        Style::default()
    }
}
