pub mod clock;
pub mod overlay;

use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Gauge, List, ListItem, ListState, Paragraph, Wrap},
    Frame,
};

use crate::app::{App, Mode};
use crate::timer::Phase;
use crate::util::{format_secs, format_time};
use clock::BigClock;

const ACCENT: Color = Color::Red;
const PAUSED: Color = Color::Yellow;

pub fn draw(app: &App, f: &mut Frame) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(2), // header
            Constraint::Min(12),   // clock + callouts
            Constraint::Length(3), // stats
            Constraint::Length(2), // legend / status
        ])
        .split(f.area());

    render_header(app, f, chunks[0]);

    let body = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(66), Constraint::Percentage(34)])
        .split(chunks[1]);
    render_timer(app, f, body[0]);
    render_callouts(app, f, body[1]);

    render_stats(app, f, chunks[2]);
    render_footer(app, f, chunks[3]);

    match &app.mode {
        Mode::Timer => {}
        Mode::Settings(form) => overlay::render_settings(form, app, f),
        Mode::AddCallout(text) => overlay::render_add_callout(text, f),
        Mode::ConfirmInstall => overlay::render_install(app, f),
    }
}

/// Text of the phase badge
pub fn phase_label(app: &App) -> String {
    if app.session.is_paused() {
        "PAUSED".to_string()
    } else if app.session.phase() == Phase::Idle {
        "STANDBY".to_string()
    } else {
        app.session.phase().to_string()
    }
}

fn phase_color(app: &App) -> Color {
    if app.session.is_paused() {
        return PAUSED;
    }
    match app.session.phase() {
        Phase::Work => ACCENT,
        Phase::Rest => Color::Cyan,
        Phase::Prepare => Color::White,
        Phase::Idle | Phase::Finished => Color::DarkGray,
    }
}

fn render_header(app: &App, f: &mut Frame, area: Rect) {
    let bold = Style::default().add_modifier(Modifier::BOLD);
    let mut spans = vec![
        Span::styled("SHADOW", bold.fg(Color::White)),
        Span::styled("BOX", bold.fg(ACCENT)),
        Span::raw("  "),
        Span::styled(
            if app.install.is_standalone() {
                "installed"
            } else {
                "portable"
            },
            Style::default()
                .fg(Color::DarkGray)
                .add_modifier(Modifier::ITALIC),
        ),
    ];
    if !app.pack_name.is_empty() {
        spans.push(Span::styled(
            format!("  pack: {}", app.pack_name),
            Style::default().fg(Color::DarkGray),
        ));
    }
    if app.install.is_available() {
        spans.push(Span::styled("  [i] Install", bold.fg(ACCENT)));
    }

    f.render_widget(
        Paragraph::new(Line::from(spans)).alignment(Alignment::Center),
        area,
    );
}

fn render_timer(app: &App, f: &mut Frame, area: Rect) {
    let session = &app.session;
    let border_style = if app.is_calling() {
        Style::default().fg(ACCENT).add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(Color::DarkGray)
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(border_style)
        .title(Span::styled(
            format!(
                " Round {} / {} ",
                session.current_round(),
                session.settings().round_count
            ),
            Style::default().add_modifier(Modifier::BOLD),
        ))
        .title(
            Line::from(Span::styled(
                format!(" {} ", phase_label(app)),
                Style::default()
                    .fg(phase_color(app))
                    .add_modifier(Modifier::BOLD),
            ))
            .right_aligned(),
        );
    let inner = block.inner(area);
    f.render_widget(block, area);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(5),    // clock
            Constraint::Length(2), // last callout
            Constraint::Length(1), // progress
        ])
        .split(inner);

    let clock_style = match (session.phase(), session.is_paused()) {
        (_, true) => Style::default().fg(PAUSED),
        (Phase::Work, false) => Style::default().fg(Color::White).add_modifier(Modifier::BOLD),
        _ => Style::default().fg(Color::Gray),
    };
    let time = format_time(session.time_left());
    f.render_widget(
        BigClock {
            text: &time,
            style: clock_style,
        },
        chunks[0],
    );

    if let Some(text) = &app.last_spoken {
        let style = if app.is_calling() {
            Style::default().fg(ACCENT).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::DarkGray)
        };
        f.render_widget(
            Paragraph::new(Span::styled(text.clone(), style))
                .alignment(Alignment::Center)
                .wrap(Wrap { trim: true }),
            chunks[1],
        );
    }

    let gauge_color = if session.is_paused() { PAUSED } else { ACCENT };
    f.render_widget(
        Gauge::default()
            .gauge_style(Style::default().fg(gauge_color).bg(Color::Black))
            .ratio(session.remaining_ratio())
            .label(""),
        chunks[2],
    );
}

fn render_callouts(app: &App, f: &mut Frame, area: Rect) {
    let items: Vec<ListItem> = app
        .callouts
        .iter()
        .map(|c| {
            let (mark, style) = if c.active {
                ("●", Style::default().fg(Color::White))
            } else {
                (
                    "○",
                    Style::default()
                        .fg(Color::DarkGray)
                        .add_modifier(Modifier::CROSSED_OUT),
                )
            };
            ListItem::new(Line::from(vec![
                Span::styled(format!("{mark} "), Style::default().fg(ACCENT)),
                Span::styled(c.text.clone(), style),
            ]))
        })
        .collect();

    let title = format!(
        " Command Set {}/{} ",
        app.callouts.active_count(),
        app.callouts.len()
    );
    let list = List::new(items)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(title)
                .border_style(Style::default().fg(Color::DarkGray)),
        )
        .highlight_style(Style::default().bg(Color::DarkGray))
        .highlight_symbol("› ");

    let mut state = ListState::default();
    if !app.callouts.is_empty() {
        state.select(Some(app.cursor));
    }
    f.render_stateful_widget(list, area, &mut state);
}

/// Label/value pairs for the stats strip
pub fn stats(app: &App) -> [(&'static str, String); 4] {
    let s = app.settings();
    [
        ("Frequency", format_secs(s.callout_frequency)),
        (
            "Randomness",
            format!("±{}", format_secs(s.callout_frequency_randomness)),
        ),
        ("Active Moves", app.callouts.active_count().to_string()),
        ("Total Duration", format_time(s.total_duration())),
    ]
}

fn render_stats(app: &App, f: &mut Frame, area: Rect) {
    let cells = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Ratio(1, 4); 4])
        .split(area);

    for ((label, value), cell) in stats(app).into_iter().zip(cells.iter()) {
        let widget = Paragraph::new(Line::from(Span::styled(
            value,
            Style::default().add_modifier(Modifier::BOLD),
        )))
        .alignment(Alignment::Center)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(label)
                .border_style(Style::default().fg(Color::DarkGray)),
        );
        f.render_widget(widget, *cell);
    }
}

fn legend(app: &App) -> &'static str {
    let s = &app.session;
    if s.is_paused() {
        "(space) resume | (r)estart | (s)top | (q)uit"
    } else if s.is_running() {
        "(space) pause | (s)top | ↑/↓ (t)oggle (d)elete (a)dd | (q)uit"
    } else {
        "(space) begin training | (o)ptions | ↑/↓ (t)oggle (d)elete (a)dd | (q)uit"
    }
}

fn render_footer(app: &App, f: &mut Frame, area: Rect) {
    let italic = Style::default().add_modifier(Modifier::ITALIC);
    let mut lines = vec![Line::from(Span::styled(legend(app), italic))];
    if let Some(status) = &app.status {
        lines.push(Line::from(Span::styled(
            status.clone(),
            Style::default().fg(Color::Yellow),
        )));
    }
    f.render_widget(Paragraph::new(lines).alignment(Alignment::Center), area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::callout::CalloutList;
    use crate::settings::TrainingSettings;
    use crate::speech::SilentEngine;
    use crate::wake_lock::CountingWakeLock;
    use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
    use ratatui::{backend::TestBackend, Terminal};

    fn app() -> App {
        App::new(
            TrainingSettings::default(),
            CalloutList::from_texts(["Jab", "Teep"]),
            Box::new(SilentEngine),
            Box::new(CountingWakeLock::new(true)),
        )
        .with_pack_name("muay_thai")
    }

    fn screen(app: &App) -> String {
        let mut terminal = Terminal::new(TestBackend::new(100, 30)).unwrap();
        terminal.draw(|f| draw(app, f)).unwrap();
        terminal
            .backend()
            .buffer()
            .content
            .iter()
            .map(|c| c.symbol())
            .collect()
    }

    #[test]
    fn idle_screen_shows_standby_and_callouts() {
        let text = screen(&app());
        assert!(text.contains("STANDBY"));
        assert!(text.contains("Round 1 / 3"));
        assert!(text.contains("Jab"));
        assert!(text.contains("Teep"));
        assert!(text.contains("Command Set 2/2"));
        assert!(text.contains("begin training"));
        assert!(text.contains("pack: muay_thai"));
    }

    #[test]
    fn paused_screen_shows_paused_badge() {
        let mut app = app();
        app.on_key(KeyEvent::new(KeyCode::Char(' '), KeyModifiers::NONE));
        assert!(screen(&app).contains("PREPARE"));
        app.on_key(KeyEvent::new(KeyCode::Char(' '), KeyModifiers::NONE));
        let text = screen(&app);
        assert!(text.contains("PAUSED"));
        assert!(text.contains("(r)estart"));
    }

    #[test]
    fn settings_overlay_lists_every_field() {
        let mut app = app();
        app.on_key(KeyEvent::new(KeyCode::Char('o'), KeyModifiers::NONE));
        let text = screen(&app);
        assert!(text.contains("Workout Config"));
        assert!(text.contains("Call Every (sec)"));
        assert!(text.contains("System Default"));
    }

    #[test]
    fn stats_strip_values() {
        let app = app();
        let stats = stats(&app);
        assert_eq!(stats[0], ("Frequency", "2s".to_string()));
        assert_eq!(stats[1], ("Randomness", "±1.5s".to_string()));
        assert_eq!(stats[2], ("Active Moves", "2".to_string()));
        assert_eq!(stats[3], ("Total Duration", "11:10".to_string()));
    }

    #[test]
    fn tiny_terminal_does_not_panic() {
        let app = app();
        let mut terminal = Terminal::new(TestBackend::new(20, 8)).unwrap();
        terminal.draw(|f| draw(&app, f)).unwrap();
    }
}
