use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Rect},
    style::Style,
    text::Line,
    widgets::{Paragraph, Widget},
};
use unicode_width::UnicodeWidthStr;

pub const GLYPH_HEIGHT: u16 = 5;

fn glyph(c: char) -> [&'static str; 5] {
    match c {
        '0' => ["███", "█ █", "█ █", "█ █", "███"],
        '1' => [" █ ", "██ ", " █ ", " █ ", "███"],
        '2' => ["███", "  █", "███", "█  ", "███"],
        '3' => ["███", "  █", "███", "  █", "███"],
        '4' => ["█ █", "█ █", "███", "  █", "  █"],
        '5' => ["███", "█  ", "███", "  █", "███"],
        '6' => ["███", "█  ", "███", "█ █", "███"],
        '7' => ["███", "  █", "  █", "  █", "  █"],
        '8' => ["███", "█ █", "███", "█ █", "███"],
        '9' => ["███", "█ █", "███", "  █", "███"],
        ':' => [" ", "█", " ", "█", " "],
        _ => ["   ", "   ", "   ", "   ", "   "],
    }
}

/// Rows of block-letter text for a clock string like `2:59`
pub fn big_rows(text: &str) -> Vec<String> {
    (0..GLYPH_HEIGHT as usize)
        .map(|row| {
            text.chars()
                .map(|c| glyph(c)[row])
                .collect::<Vec<_>>()
                .join(" ")
        })
        .collect()
}

/// Large clock face; drops to a single line when the area is too small
pub struct BigClock<'a> {
    pub text: &'a str,
    pub style: Style,
}

impl Widget for BigClock<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let rows = big_rows(self.text);
        let fits = area.height >= GLYPH_HEIGHT
            && rows.iter().all(|r| r.width() <= area.width as usize);

        let lines: Vec<Line> = if fits {
            rows.into_iter().map(|r| Line::styled(r, self.style)).collect()
        } else {
            vec![Line::styled(self.text.to_string(), self.style)]
        };

        let top = area.height.saturating_sub(lines.len() as u16) / 2;
        let inner = Rect {
            y: area.y + top,
            height: area.height - top,
            ..area
        };
        Paragraph::new(lines)
            .alignment(Alignment::Center)
            .render(inner, buf);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn big_rows_have_equal_width() {
        let rows = big_rows("10:05");
        assert_eq!(rows.len(), 5);
        let w = rows[0].width();
        assert!(rows.iter().all(|r| r.width() == w));
        // 4 digits of 3 cells, 1 colon cell, 4 gaps
        assert_eq!(w, 4 * 3 + 1 + 4);
    }

    #[test]
    fn small_area_falls_back_to_plain_text() {
        let area = Rect::new(0, 0, 10, 2);
        let mut buf = Buffer::empty(area);
        BigClock {
            text: "3:00",
            style: Style::default(),
        }
        .render(area, &mut buf);
        let text: String = buf.content.iter().map(|c| c.symbol()).collect();
        assert!(text.contains("3:00"));
    }
}
