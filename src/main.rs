mod app;
mod event;
mod ui;

use std::fs::{self, OpenOptions};
use std::io;
use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use anyhow::{Context, Result, bail};
use clap::Parser;
use crossterm::event::{
    DisableFocusChange, EnableFocusChange, KeyCode, KeyEvent, KeyEventKind, KeyModifiers,
};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use ratatui::layout::{Constraint, Direction, Layout};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Paragraph, Widget};
use tracing_subscriber::EnvFilter;

use shine::clock::{SystemClock, format_duration};
use shine::config::Config;
use shine::session::corpus::{LengthMode, PassageCorpus};
use shine::session::typing::Key;
use shine::store::json_store::JsonStore;

use app::{App, AppScreen, SETTINGS_FIELDS};
use event::{AppEvent, EventHandler};
use ui::components::dashboard::Dashboard;
use ui::components::stats_sidebar::StatsSidebar;
use ui::components::today_sessions::TodaySessions;
use ui::components::typing_area::TypingArea;
use ui::layout::{AppLayout, pack_hint_lines};

#[derive(Parser)]
#[command(name = "shine", version, about = "Calm terminal typing practice")]
struct Cli {
    #[arg(short, long, help = "Round length (short, medium, long)")]
    mode: Option<String>,

    #[arg(short, long, help = "Theme name")]
    theme: Option<String>,

    #[arg(long, help = "Directory for session data")]
    data_dir: Option<String>,

    #[arg(short, long, help = "Write debug logs to shine.log")]
    verbose: bool,
}

fn init_tracing(data_dir: &Path, verbose: bool) -> Result<()> {
    fs::create_dir_all(data_dir)?;
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(data_dir.join("shine.log"))?;

    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_env("SHINE_LOG").unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .try_init()
        .map_err(|e| anyhow::anyhow!("{e}"))
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = Config::load().unwrap_or_default();
    if let Some(mode) = cli.mode.as_deref() {
        match LengthMode::from_name(mode) {
            Some(mode) => config.default_mode = mode,
            None => bail!("unknown mode '{mode}' (expected short, medium or long)"),
        }
    }
    if let Some(theme) = cli.theme {
        config.theme = theme;
    }
    if let Some(dir) = cli.data_dir {
        config.data_dir = Some(dir);
    }
    let themes = ui::theme::Theme::available_themes();
    let theme_names: Vec<&str> = themes.iter().map(String::as_str).collect();
    config.validate(&theme_names);

    let data_dir = config.data_path();
    init_tracing(&data_dir, cli.verbose)?;

    let store = JsonStore::with_base_dir(data_dir.clone())
        .with_context(|| format!("opening data directory {}", data_dir.display()))?;
    let theme = ui::theme::Theme::load(&config.theme).unwrap_or_default();
    let theme: &'static ui::theme::Theme = Box::leak(Box::new(theme));

    let tick = Duration::from_millis(config.tick_ms);
    let mut app = App::new(
        config,
        theme,
        Arc::new(store),
        Arc::new(SystemClock),
        PassageCorpus::from_entropy(),
    )?;
    tracing::debug!(data_dir = %data_dir.display(), "starting");

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableFocusChange)?;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let events = EventHandler::new(tick);

    let result = run_app(&mut terminal, &mut app, &events);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), DisableFocusChange, LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(err) = result {
        tracing::error!(error = %err, "exiting on error");
        eprintln!("Error: {err:?}");
    }

    Ok(())
}

fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    events: &EventHandler,
) -> Result<()> {
    loop {
        terminal.draw(|frame| render(frame, app))?;

        match events.next()? {
            AppEvent::Key(key) => handle_key(app, key),
            AppEvent::Focus(focused) => app.set_focused(focused),
            AppEvent::Tick => app.drain_store_events(),
            AppEvent::Resize => {}
        }

        if app.should_quit {
            return Ok(());
        }
    }
}

/// Translate a terminal key into engine input.
fn engine_key(key: &KeyEvent) -> Key {
    match key.code {
        KeyCode::Char(ch)
            if !key
                .modifiers
                .intersects(KeyModifiers::CONTROL | KeyModifiers::ALT) =>
        {
            Key::Char(ch)
        }
        KeyCode::Backspace => Key::Backspace,
        _ => Key::Other,
    }
}

fn mode_for_key(code: KeyCode) -> Option<LengthMode> {
    match code {
        KeyCode::F(1) => Some(LengthMode::Short),
        KeyCode::F(2) => Some(LengthMode::Medium),
        KeyCode::F(3) => Some(LengthMode::Long),
        _ => None,
    }
}

fn handle_key(app: &mut App, key: KeyEvent) {
    // Repeat and Release would inflate input
    if key.kind != KeyEventKind::Press {
        return;
    }

    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        app.should_quit = true;
        return;
    }

    if app.screen != AppScreen::Settings {
        if let Some(mode) = mode_for_key(key.code) {
            app.set_mode(mode);
            return;
        }
    }

    match app.screen {
        AppScreen::Typing => handle_typing_key(app, key),
        AppScreen::Result => handle_result_key(app, key),
        AppScreen::Today => handle_today_key(app, key),
        AppScreen::Settings => handle_settings_key(app, key),
    }
}

fn handle_typing_key(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc => app.reset_round(),
        KeyCode::Tab => app.go_to_today(),
        _ => app.type_key(engine_key(&key)),
    }
}

fn handle_result_key(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Enter | KeyCode::Esc => app.next_round(),
        KeyCode::Tab => app.go_to_today(),
        KeyCode::Char('s') => app.go_to_settings(),
        KeyCode::Char('q') => app.should_quit = true,
        _ => {}
    }
}

fn handle_today_key(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc | KeyCode::Tab => app.go_to_typing(),
        KeyCode::Char('s') => app.go_to_settings(),
        KeyCode::Char('q') => app.should_quit = true,
        _ => {}
    }
}

fn handle_settings_key(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc => {
            app.save_settings();
            app.go_to_typing();
        }
        KeyCode::Up | KeyCode::Char('k') => {
            app.settings_selected = app.settings_selected.saturating_sub(1);
        }
        KeyCode::Down | KeyCode::Char('j') => {
            if app.settings_selected + 1 < SETTINGS_FIELDS {
                app.settings_selected += 1;
            }
        }
        KeyCode::Enter | KeyCode::Right | KeyCode::Char('l') => app.settings_cycle_forward(),
        KeyCode::Left | KeyCode::Char('h') => app.settings_cycle_backward(),
        _ => {}
    }
}

fn render(frame: &mut ratatui::Frame, app: &App) {
    let area = frame.area();
    let colors = &app.theme.colors;

    let bg = Block::default().style(Style::default().bg(colors.bg()));
    frame.render_widget(bg, area);

    match app.screen {
        AppScreen::Typing => render_typing(frame, app),
        AppScreen::Result => render_result(frame, app),
        AppScreen::Today => render_today(frame, app),
        AppScreen::Settings => render_settings(frame, app),
    }
}

fn render_footer(frame: &mut ratatui::Frame, app: &App, hints: &[&str], area: ratatui::layout::Rect) {
    let colors = &app.theme.colors;
    let mut lines: Vec<Line> = Vec::new();
    if let Some(status) = &app.status {
        lines.push(Line::from(Span::styled(
            format!("  {status}"),
            Style::default().fg(colors.error()),
        )));
    }
    lines.extend(
        pack_hint_lines(hints, area.width as usize)
            .into_iter()
            .map(|l| Line::from(Span::styled(l, Style::default().fg(colors.text_pending())))),
    );
    frame.render_widget(Paragraph::new(lines), area);
}

fn render_typing(frame: &mut ratatui::Frame, app: &App) {
    let area = frame.area();
    let colors = &app.theme.colors;
    let app_layout = AppLayout::new(area);
    let session = app.practice.session();
    let daily = app.practice.daily_target();

    let header_title = format!(" shine \u{b7} {} ", app.practice.mode());
    // Narrow terminals have no sidebar, so fold the live numbers into the header
    let header_info = if app_layout.tier.show_sidebar() {
        format!(" Today {}/{}", daily.completed, daily.target)
    } else {
        let live = session.live_metrics();
        format!(
            " WPM: {} | Acc: {}% | {} | Today {}/{}",
            live.net_wpm,
            live.accuracy,
            format_duration(session.elapsed_secs()),
            daily.completed,
            daily.target
        )
    };
    let header = Paragraph::new(Line::from(vec![
        Span::styled(
            header_title,
            Style::default()
                .fg(colors.header_fg())
                .bg(colors.header_bg())
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled(
            header_info,
            Style::default()
                .fg(colors.text_pending())
                .bg(colors.header_bg()),
        ),
    ]))
    .style(Style::default().bg(colors.header_bg()));
    frame.render_widget(header, app_layout.header);

    frame.render_widget(TypingArea::new(session, app.theme), app_layout.main);

    if let Some(sidebar_area) = app_layout.sidebar {
        let prefs = app.practice.settings();
        let sidebar = StatsSidebar::new(
            session,
            app.practice.stats(),
            daily,
            app.practice.momentum(),
            prefs.target_wpm,
            app.theme,
        );
        frame.render_widget(sidebar, sidebar_area);
    }

    render_footer(
        frame,
        app,
        &["[Esc] Reset", "[Tab] Today", "[F1-F3] Length", "[Ctrl-C] Quit"],
        app_layout.footer,
    );
}

fn render_result(frame: &mut ratatui::Frame, app: &App) {
    let area = frame.area();
    if let Some(record) = &app.last_record {
        let centered = ui::layout::centered_rect(60, 70, area);
        let dashboard = Dashboard::new(record, app.practice.daily_target(), app.theme);
        frame.render_widget(dashboard, centered);
    }
}

fn render_today(frame: &mut ratatui::Frame, app: &App) {
    let area = frame.area();
    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(3), Constraint::Length(2)])
        .split(area);

    let target_wpm = app.practice.settings().target_wpm;
    frame.render_widget(TodaySessions::new(&app.today, target_wpm, app.theme), layout[0]);

    render_footer(
        frame,
        app,
        &["[Esc/Tab] Back", "[s] Settings", "[q] Quit"],
        layout[1],
    );
}

fn render_settings(frame: &mut ratatui::Frame, app: &App) {
    let area = frame.area();
    let colors = &app.theme.colors;

    let centered = ui::layout::centered_rect(60, 60, area);

    let block = Block::bordered()
        .title(" Settings ")
        .border_style(Style::default().fg(colors.accent()))
        .style(Style::default().bg(colors.bg()));
    let inner = block.inner(centered);
    block.render(centered, frame.buffer_mut());

    let draft = &app.settings_draft;
    let fields: [(&str, String); SETTINGS_FIELDS] = [
        ("Sessions per day", draft.sessions_per_day.to_string()),
        ("Target WPM", draft.target_wpm.to_string()),
        ("Session duration", format!("{} min", draft.session_duration_min)),
    ];

    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(2),
            Constraint::Length(fields.len() as u16 * 3),
            Constraint::Min(0),
            Constraint::Length(2),
        ])
        .split(inner);

    Paragraph::new(Line::from(Span::styled(
        "  Use arrows to navigate, Enter/Right to change",
        Style::default().fg(colors.text_pending()),
    )))
    .render(layout[0], frame.buffer_mut());

    let field_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints(fields.iter().map(|_| Constraint::Length(3)).collect::<Vec<_>>())
        .split(layout[1]);

    for (i, (label, value)) in fields.iter().enumerate() {
        let is_selected = i == app.settings_selected;
        let indicator = if is_selected { " > " } else { "   " };

        let label_style = Style::default()
            .fg(if is_selected { colors.accent() } else { colors.fg() })
            .add_modifier(if is_selected { Modifier::BOLD } else { Modifier::empty() });
        let value_style = Style::default().fg(if is_selected {
            colors.fg()
        } else {
            colors.text_pending()
        });

        let lines = vec![
            Line::from(Span::styled(format!("{indicator}{label}:"), label_style)),
            Line::from(Span::styled(format!("  < {value} >"), value_style)),
        ];
        Paragraph::new(lines).render(field_layout[i], frame.buffer_mut());
    }

    Paragraph::new(Line::from(Span::styled(
        "  [ESC] Save & back",
        Style::default().fg(colors.accent()),
    )))
    .render(layout[3], frame.buffer_mut());
}

#[cfg(test)]
mod tests {
    use super::*;

    fn press(code: KeyCode, modifiers: KeyModifiers) -> KeyEvent {
        KeyEvent::new(code, modifiers)
    }

    #[test]
    fn test_engine_key_mapping() {
        assert_eq!(engine_key(&press(KeyCode::Char('a'), KeyModifiers::NONE)), Key::Char('a'));
        assert_eq!(engine_key(&press(KeyCode::Char('A'), KeyModifiers::SHIFT)), Key::Char('A'));
        assert_eq!(engine_key(&press(KeyCode::Backspace, KeyModifiers::NONE)), Key::Backspace);
        assert_eq!(engine_key(&press(KeyCode::Char('w'), KeyModifiers::CONTROL)), Key::Other);
        assert_eq!(engine_key(&press(KeyCode::Enter, KeyModifiers::NONE)), Key::Other);
    }

    #[test]
    fn test_function_keys_pick_length() {
        assert_eq!(mode_for_key(KeyCode::F(1)), Some(LengthMode::Short));
        assert_eq!(mode_for_key(KeyCode::F(3)), Some(LengthMode::Long));
        assert_eq!(mode_for_key(KeyCode::Char('1')), None);
    }
}
