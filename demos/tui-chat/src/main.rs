//! Terminal chat client.
//!
//! Run with: cargo run -p tui-chat
//!
//! Connects with the transport named by `CHAT_TRANSPORT` (default `rpc`
//! against `CHAT_ENDPOINT`). Set `CHAT_TUI_LOG=/tmp/chat.log` to capture logs.

use std::{
    fs::OpenOptions,
    io,
    sync::{
        Arc, Mutex,
        atomic::{AtomicBool, Ordering},
    },
    time::Duration,
};

use chat_sync_core::{
    ChatLogEntry, ChatSession, ClientRegistry, Composer, ScrollAnchor, SessionError, SubmitAck,
    SyncConfig, TransportError,
};
use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyModifiers},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{
    Frame, Terminal,
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
};
use tokio::sync::mpsc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Output rows taken by the input box, status bar and borders.
const CHROME_ROWS: u16 = 6;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_logging()?;

    let config = SyncConfig::from_env()?;
    tracing::info!(
        transport = %config.transport,
        endpoint = %config.endpoint,
        "Starting chat client"
    );
    let registry = Arc::new(ClientRegistry::new(chat_sync_transport::loader_for(&config)?));
    let follow = Arc::new(FollowTail::default());
    let session = Arc::new(ChatSession::new(
        registry,
        config.poll_interval,
        Arc::clone(&follow) as Arc<dyn ScrollAnchor>,
    ));

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = run_app(&mut terminal, &config, session, &follow).await;

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

/// Log to the file named by `CHAT_TUI_LOG`, or not at all.
fn init_logging() -> anyhow::Result<()> {
    let Ok(path) = std::env::var("CHAT_TUI_LOG") else {
        return Ok(());
    };
    let file = OpenOptions::new().create(true).append(true).open(path)?;

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_ansi(false)
                .with_writer(Mutex::new(file)),
        )
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();
    Ok(())
}

/// Raised on every publication; the draw loop jumps to the newest entry.
#[derive(Debug, Default)]
struct FollowTail {
    pending: AtomicBool,
}

impl FollowTail {
    fn take(&self) -> bool {
        self.pending.swap(false, Ordering::AcqRel)
    }
}

impl ScrollAnchor for FollowTail {
    fn on_publish(&self) {
        self.pending.store(true, Ordering::Release);
    }
}

/// Results of background work, delivered to the draw loop.
enum AppEvent {
    Mounted(Result<(), SessionError>),
    Username(Result<String, SessionError>),
    Submitted(Result<SubmitAck, TransportError>),
}

struct App {
    composer: Composer,
    scroll: u16,
    follow: bool,
    status: String,
}

impl App {
    fn new(config: &SyncConfig) -> Self {
        Self {
            composer: Composer::new(),
            scroll: 0,
            follow: true,
            status: format!("Connecting to {} via {}...", config.endpoint, config.transport),
        }
    }

    fn scroll_up(&mut self, rows: u16) {
        self.follow = false;
        self.scroll = self.scroll.saturating_sub(rows);
    }

    fn scroll_down(&mut self, rows: u16) {
        self.scroll = self.scroll.saturating_add(rows);
    }

    fn handle_event(&mut self, event: AppEvent) {
        match event {
            AppEvent::Mounted(Ok(())) => self.status = "Connected".to_string(),
            AppEvent::Mounted(Err(e)) => self.status = format!("Failed: {e}"),
            AppEvent::Username(Ok(name)) => {
                self.composer.set_author(name);
                if let Some(author) = self.composer.author() {
                    self.status = format!("Connected as {author}");
                }
            }
            AppEvent::Username(Err(e)) => self.status = format!("Failed to get a username: {e}"),
            AppEvent::Submitted(result) => {
                if let Err(e) = &result {
                    self.status = format!("Send failed: {e}");
                }
                self.composer.finish_submit(&result);
            }
        }
    }
}

async fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    config: &SyncConfig,
    session: Arc<ChatSession>,
    follow: &FollowTail,
) -> anyhow::Result<()> {
    let mut app = App::new(config);
    let (event_tx, mut event_rx) = mpsc::unbounded_channel::<AppEvent>();

    // Mount, then ask for a name; the log starts flowing as soon as mount succeeds.
    {
        let session = Arc::clone(&session);
        let event_tx = event_tx.clone();
        tokio::spawn(async move {
            let mounted = session.mount().await;
            let ok = mounted.is_ok();
            let _ = event_tx.send(AppEvent::Mounted(mounted));
            if ok {
                let _ = event_tx.send(AppEvent::Username(session.request_username().await));
            }
        });
    }

    loop {
        while let Ok(event) = event_rx.try_recv() {
            app.handle_event(event);
        }

        let log = session.snapshot();
        let lines = log_lines(log.as_deref().map(Vec::as_slice));
        let visible = terminal.size()?.height.saturating_sub(CHROME_ROWS);
        let bottom = u16::try_from(lines.len())
            .unwrap_or(u16::MAX)
            .saturating_sub(visible);
        if follow.take() {
            app.follow = true;
        }
        if app.follow || app.scroll >= bottom {
            app.follow = true;
            app.scroll = bottom;
        }

        terminal.draw(|f| ui(f, &app, lines))?;

        if !event::poll(Duration::from_millis(50))? {
            continue;
        }
        let Event::Key(key) = event::read()? else {
            continue;
        };
        match key {
            KeyEvent {
                code: KeyCode::Char('c'),
                modifiers: KeyModifiers::CONTROL,
                ..
            } => {
                session.unmount();
                return Ok(());
            }
            KeyEvent {
                code: KeyCode::Char(c),
                modifiers: KeyModifiers::NONE | KeyModifiers::SHIFT,
                ..
            } => app.composer.push_char(c),
            KeyEvent {
                code: KeyCode::Backspace,
                ..
            } => app.composer.pop_char(),
            KeyEvent {
                code: KeyCode::Enter,
                ..
            } => submit_draft(&mut app, &session, &event_tx),
            KeyEvent {
                code: KeyCode::Up, ..
            } => app.scroll_up(1),
            KeyEvent {
                code: KeyCode::Down,
                ..
            } => app.scroll_down(1),
            KeyEvent {
                code: KeyCode::PageUp,
                ..
            } => app.scroll_up(10),
            KeyEvent {
                code: KeyCode::PageDown,
                ..
            } => app.scroll_down(10),
            KeyEvent {
                code: KeyCode::End, ..
            } => app.follow = true,
            _ => {}
        }
    }
}

fn submit_draft(app: &mut App, session: &ChatSession, event_tx: &mpsc::UnboundedSender<AppEvent>) {
    if app.composer.draft().is_empty() || !app.composer.can_submit() {
        return;
    }
    let Some(transport) = session.registry().try_client() else {
        app.status = "Not connected yet".to_string();
        return;
    };
    let message = match app.composer.begin_submit() {
        Ok(message) => message,
        Err(e) => {
            app.status = format!("Cannot send: {e}");
            return;
        }
    };

    let event_tx = event_tx.clone();
    tokio::spawn(async move {
        let result = transport.submit_message(&message).await;
        let _ = event_tx.send(AppEvent::Submitted(result));
    });
}

/// `[HH:MM:SS] author: text`, local time; system entries carry no author.
fn format_entry(entry: &ChatLogEntry) -> Line<'static> {
    let time = entry
        .timestamp
        .with_timezone(&chrono::Local)
        .format("%H:%M:%S");
    let stamp = Span::styled(format!("[{time}] "), Style::default().fg(Color::DarkGray));

    if entry.msg.is_system() {
        Line::from(vec![
            stamp,
            Span::styled(
                entry.msg.text.clone(),
                Style::default()
                    .fg(Color::Cyan)
                    .add_modifier(Modifier::ITALIC),
            ),
        ])
    } else {
        Line::from(vec![
            stamp,
            Span::styled(
                format!("{}: ", entry.msg.author),
                Style::default().add_modifier(Modifier::BOLD),
            ),
            Span::raw(entry.msg.text.clone()),
        ])
    }
}

fn log_lines(log: Option<&[ChatLogEntry]>) -> Vec<Line<'static>> {
    match log {
        None => vec![Line::from("Loading...")],
        Some([]) => vec![Line::from("No messages (yet).")],
        Some(entries) => entries.iter().map(format_entry).collect(),
    }
}

fn ui(f: &mut Frame, app: &App, lines: Vec<Line<'static>>) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(3),    // Log
            Constraint::Length(3), // Compose
            Constraint::Length(1), // Status
        ])
        .split(f.area());

    let output = Paragraph::new(lines)
        .block(Block::default().borders(Borders::ALL).title("Chat"))
        .wrap(Wrap { trim: false })
        .scroll((app.scroll, 0));
    f.render_widget(output, chunks[0]);

    let title = match app.composer.author() {
        Some(author) if app.composer.is_in_flight() => format!("{author} (sending...)"),
        Some(author) => author.to_string(),
        None => "Waiting for a username".to_string(),
    };
    let input = Paragraph::new(app.composer.draft())
        .style(Style::default().fg(Color::Yellow))
        .block(Block::default().borders(Borders::ALL).title(title));
    f.render_widget(input, chunks[1]);

    let draft_width = u16::try_from(app.composer.draft().chars().count()).unwrap_or(u16::MAX);
    f.set_cursor_position((
        chunks[1].x.saturating_add(draft_width).saturating_add(1),
        chunks[1].y + 1,
    ));

    let status_style = if app.status.starts_with("Connected") {
        Style::default().fg(Color::Green)
    } else if app.status.starts_with("Failed") || app.status.starts_with("Send failed") {
        Style::default().fg(Color::Red)
    } else {
        Style::default().fg(Color::Yellow)
    };

    let status = Paragraph::new(Line::from(vec![
        Span::raw(" "),
        Span::styled(app.status.as_str(), status_style),
        Span::raw(" | "),
        Span::styled("Enter", Style::default().fg(Color::Yellow)),
        Span::raw(" send | "),
        Span::styled("Ctrl+C", Style::default().fg(Color::Yellow)),
        Span::raw(" quit | "),
        Span::styled("Up/Down/PgUp/PgDn/End", Style::default().fg(Color::Yellow)),
        Span::raw(" scroll "),
    ]));
    f.render_widget(status, chunks[2]);
}
