use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};

use crate::app::App;
use crate::settings_form::{SettingsForm, FIELDS};

/// Rectangle of `width` x `height` cells centered in `area`
pub fn centered_rect(width: u16, height: u16, area: Rect) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + (area.height - height) / 2,
        width,
        height,
    }
}

pub fn render_settings(form: &SettingsForm, app: &App, f: &mut Frame) {
    let area = centered_rect(52, FIELDS.len() as u16 + 6, f.area());
    f.render_widget(Clear, area);

    let block = Block::default()
        .borders(Borders::ALL)
        .title(" Workout Config ")
        .border_style(Style::default().fg(Color::Red));
    let inner = block.inner(area);
    f.render_widget(block, area);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(1)
        .constraints([Constraint::Min(1), Constraint::Length(1)])
        .split(inner);

    let label_style = Style::default().fg(Color::Gray);
    let selected_style = Style::default()
        .fg(Color::White)
        .bg(Color::DarkGray)
        .add_modifier(Modifier::BOLD);

    let rows: Vec<Line> = FIELDS
        .iter()
        .enumerate()
        .map(|(idx, field)| {
            let selected = idx == form.selected_index();
            let value = match form.buffer() {
                Some(buf) if selected => format!("{buf}_"),
                _ => form.value_label(*field),
            };
            let style = if selected { selected_style } else { label_style };
            Line::from(vec![
                Span::styled(format!("{:<20}", field.to_string()), style),
                Span::styled(format!("{value:>24}"), style),
            ])
        })
        .collect();
    f.render_widget(Paragraph::new(rows), chunks[0]);

    let voices_hint = if app.voices.is_empty() {
        "loading voices…"
    } else {
        "←/→ adjust"
    };
    let legend = Paragraph::new(Span::styled(
        format!("↑/↓ field | {voices_hint} | type digits | (enter) save | (esc) cancel"),
        Style::default().add_modifier(Modifier::ITALIC),
    ))
    .alignment(Alignment::Center)
    .wrap(Wrap { trim: true });
    f.render_widget(legend, chunks[1]);
}

pub fn render_add_callout(text: &str, f: &mut Frame) {
    let area = centered_rect(44, 5, f.area());
    f.render_widget(Clear, area);

    let input = Paragraph::new(Line::from(vec![
        Span::raw(text.to_string()),
        Span::styled("_", Style::default().add_modifier(Modifier::SLOW_BLINK)),
    ]))
    .block(
        Block::default()
            .borders(Borders::ALL)
            .title(" Define new combo ")
            .title_bottom(" (enter) add | (esc) cancel ")
            .border_style(Style::default().fg(Color::Red)),
    )
    .wrap(Wrap { trim: false });
    f.render_widget(input, area);
}

pub fn render_install(app: &App, f: &mut Frame) {
    let area = centered_rect(56, 7, f.area());
    f.render_widget(Clear, area);

    let target = app
        .install
        .target_path()
        .map(|p| p.display().to_string())
        .unwrap_or_default();
    let body = vec![
        Line::from("Install shadowbox for quick access?"),
        Line::from(Span::styled(target, Style::default().fg(Color::Cyan))),
        Line::from(""),
        Line::from(Span::styled(
            "(y) install | (n) not now",
            Style::default().add_modifier(Modifier::ITALIC),
        )),
    ];
    let dialog = Paragraph::new(body)
        .alignment(Alignment::Center)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(" Install ")
                .border_style(Style::default().fg(Color::Red)),
        )
        .wrap(Wrap { trim: true });
    f.render_widget(dialog, area);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn centered_rect_is_clamped_to_area() {
        let area = Rect::new(0, 0, 20, 10);
        assert_eq!(centered_rect(10, 4, area), Rect::new(5, 3, 10, 4));
        assert_eq!(centered_rect(50, 50, area), area);
    }
}
