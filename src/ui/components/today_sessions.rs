use chrono::Local;
use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Paragraph, Widget};

use shine::clock::format_duration;
use shine::session::record::SessionRecord;
use shine::store::schema::SessionLogEntry;

use crate::ui::theme::Theme;

/// Today's log, newest first.
pub struct TodaySessions<'a> {
    entries: &'a [SessionLogEntry<SessionRecord>],
    target_wpm: u32,
    theme: &'a Theme,
}

impl<'a> TodaySessions<'a> {
    pub fn new(
        entries: &'a [SessionLogEntry<SessionRecord>],
        target_wpm: u32,
        theme: &'a Theme,
    ) -> Self {
        Self {
            entries,
            target_wpm,
            theme,
        }
    }
}

pub fn entry_row(entry: &SessionLogEntry<SessionRecord>) -> String {
    let record = &entry.data;
    format!(
        "Session {} \u{b7} {} WPM \u{b7} {}% \u{b7} {} \u{b7} {}",
        entry.index,
        record.wpm,
        record.accuracy_percent,
        format_duration(record.duration_seconds),
        record.text_preview,
    )
}

impl Widget for TodaySessions<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let colors = &self.theme.colors;

        let block = Block::bordered()
            .title(Line::from(Span::styled(
                format!(" Today ({}) ", self.entries.len()),
                Style::default()
                    .fg(colors.accent())
                    .add_modifier(Modifier::BOLD),
            )))
            .border_style(Style::default().fg(colors.accent()))
            .style(Style::default().bg(colors.bg()));
        let inner = block.inner(area);
        block.render(area, buf);

        if self.entries.is_empty() {
            Paragraph::new(Line::from(Span::styled(
                "  No sessions yet today.",
                Style::default().fg(colors.text_pending()),
            )))
            .render(inner, buf);
            return;
        }

        let visible = inner.height as usize;
        let lines: Vec<Line> = self
            .entries
            .iter()
            .rev()
            .take(visible)
            .map(|entry| {
                let record = &entry.data;
                let marker = if record.wpm >= self.target_wpm { "+" } else { " " };
                let acc_color = if record.accuracy_percent >= 95 {
                    colors.success()
                } else if record.accuracy_percent >= 85 {
                    colors.warning()
                } else {
                    colors.error()
                };
                Line::from(vec![
                    Span::styled(
                        format!(" {marker} {} ", entry.completed_at.with_timezone(&Local).format("%H:%M")),
                        Style::default().fg(colors.text_pending()),
                    ),
                    Span::styled(entry_row(entry), Style::default().fg(acc_color)),
                ])
            })
            .collect();

        Paragraph::new(lines).render(inner, buf);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use shine::session::corpus::LengthMode;

    #[test]
    fn test_entry_row_format() {
        let entry = SessionLogEntry {
            id: "1760600000000-a1b2c".to_string(),
            completed_at: Utc.with_ymd_and_hms(2026, 10, 16, 9, 0, 0).unwrap(),
            index: 2,
            data: SessionRecord {
                id: "1760600000000".to_string(),
                completed_at: Utc.with_ymd_and_hms(2026, 10, 16, 9, 0, 0).unwrap(),
                duration_seconds: 75,
                mode: LengthMode::Short,
                text_preview: "Breathe slowly...".to_string(),
                gross_wpm: 44,
                net_wpm: 41,
                wpm: 41,
                accuracy_percent: 97,
                keystrokes: 130,
                mistakes: 4,
                backspaces: 3,
                uncorrected_errors: 1,
            },
        };
        assert_eq!(
            entry_row(&entry),
            "Session 2 \u{b7} 41 WPM \u{b7} 97% \u{b7} 1:15 \u{b7} Breathe slowly..."
        );
    }
}
