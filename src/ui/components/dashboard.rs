use ratatui::buffer::Buffer;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Paragraph, Widget, Wrap};

use shine::clock::format_duration;
use shine::session::daily_target::DailyTarget;
use shine::session::record::SessionRecord;

use crate::ui::theme::Theme;

/// Summary shown once a round completes.
pub struct Dashboard<'a> {
    pub record: &'a SessionRecord,
    pub daily: &'a DailyTarget,
    pub theme: &'a Theme,
}

impl<'a> Dashboard<'a> {
    pub fn new(record: &'a SessionRecord, daily: &'a DailyTarget, theme: &'a Theme) -> Self {
        Self {
            record,
            daily,
            theme,
        }
    }
}

fn quota_message(daily: &DailyTarget) -> String {
    match daily.remaining() {
        0 => format!("Daily goal reached ({}/{})", daily.completed, daily.target),
        1 => "1 more session for today's goal".to_string(),
        n => format!("{n} more sessions for today's goal"),
    }
}

impl Widget for Dashboard<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let colors = &self.theme.colors;
        let record = self.record;

        let block = Block::bordered()
            .title(" Session Complete ")
            .border_style(Style::default().fg(colors.accent()))
            .style(Style::default().bg(colors.bg()));
        let inner = block.inner(area);
        block.render(area, buf);

        let layout = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(2),
                Constraint::Length(2),
                Constraint::Length(2),
                Constraint::Length(2),
                Constraint::Length(2),
                Constraint::Min(2),
                Constraint::Length(2),
            ])
            .split(inner);

        let title = Paragraph::new(Line::from(vec![
            Span::styled(
                "Results",
                Style::default()
                    .fg(colors.accent())
                    .add_modifier(Modifier::BOLD),
            ),
            Span::styled(
                format!("  ({})", record.mode),
                Style::default().fg(colors.text_pending()),
            ),
        ]))
        .alignment(Alignment::Center);
        title.render(layout[0], buf);

        let wpm_line = Line::from(vec![
            Span::styled("  Speed:    ", Style::default().fg(colors.fg())),
            Span::styled(
                format!("{} WPM", record.net_wpm),
                Style::default()
                    .fg(colors.accent())
                    .add_modifier(Modifier::BOLD),
            ),
            Span::styled(
                format!("  ({} gross)", record.gross_wpm),
                Style::default().fg(colors.text_pending()),
            ),
        ]);
        Paragraph::new(wpm_line).render(layout[1], buf);

        let acc_color = if record.accuracy_percent >= 95 {
            colors.success()
        } else if record.accuracy_percent >= 85 {
            colors.warning()
        } else {
            colors.error()
        };
        let acc_line = Line::from(vec![
            Span::styled("  Accuracy: ", Style::default().fg(colors.fg())),
            Span::styled(
                format!("{}%", record.accuracy_percent),
                Style::default().fg(acc_color).add_modifier(Modifier::BOLD),
            ),
            Span::styled(
                format!("  ({} uncorrected)", record.uncorrected_errors),
                Style::default().fg(colors.text_pending()),
            ),
        ]);
        Paragraph::new(acc_line).render(layout[2], buf);

        let time_line = Line::from(vec![
            Span::styled("  Time:     ", Style::default().fg(colors.fg())),
            Span::styled(
                format_duration(record.duration_seconds),
                Style::default().fg(colors.fg()),
            ),
        ]);
        Paragraph::new(time_line).render(layout[3], buf);

        let keys_line = Line::from(vec![
            Span::styled("  Keys:     ", Style::default().fg(colors.fg())),
            Span::styled(
                format!(
                    "{} typed, {} mistakes, {} backspaces",
                    record.keystrokes, record.mistakes, record.backspaces
                ),
                Style::default().fg(if record.mistakes == 0 {
                    colors.success()
                } else {
                    colors.fg()
                }),
            ),
        ]);
        Paragraph::new(keys_line).render(layout[4], buf);

        let quota_color = if self.daily.is_met() {
            colors.success()
        } else {
            colors.text_pending()
        };
        Paragraph::new(vec![
            Line::from(Span::styled(
                format!("  {}", quota_message(self.daily)),
                Style::default().fg(quota_color),
            )),
            Line::from(Span::styled(
                format!("  \"{}\"", record.text_preview),
                Style::default().fg(colors.text_pending()),
            )),
        ])
        .wrap(Wrap { trim: false })
        .render(layout[5], buf);

        let help = Paragraph::new(Line::from(vec![
            Span::styled("  [Enter] Next  ", Style::default().fg(colors.accent())),
            Span::styled("[Tab] Today  ", Style::default().fg(colors.accent())),
            Span::styled("[s] Settings  ", Style::default().fg(colors.accent())),
            Span::styled("[q] Quit", Style::default().fg(colors.accent())),
        ]));
        help.render(layout[6], buf);
    }
}
