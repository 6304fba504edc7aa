use ratatui::buffer::Buffer;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::Style;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Paragraph, Widget};

use shine::clock::format_duration;
use shine::session::daily_target::DailyTarget;
use shine::session::stats::TypingStats;
use shine::session::typing::TypingSession;

use crate::ui::theme::{Theme, ThemeColors};

pub struct StatsSidebar<'a> {
    session: &'a TypingSession,
    stats: &'a TypingStats,
    daily: &'a DailyTarget,
    momentum: u32,
    target_wpm: u32,
    theme: &'a Theme,
}

impl<'a> StatsSidebar<'a> {
    pub fn new(
        session: &'a TypingSession,
        stats: &'a TypingStats,
        daily: &'a DailyTarget,
        momentum: u32,
        target_wpm: u32,
        theme: &'a Theme,
    ) -> Self {
        Self {
            session,
            stats,
            daily,
            momentum,
            target_wpm,
            theme,
        }
    }
}

/// Format a delta value with arrow indicator
fn format_delta(delta: i64, suffix: &str) -> String {
    if delta > 0 {
        format!("\u{2191}+{delta}{suffix}")
    } else if delta < 0 {
        format!("\u{2193}{delta}{suffix}")
    } else {
        format!("={suffix}")
    }
}

fn accuracy_color(colors: &ThemeColors, accuracy: u32) -> ratatui::style::Color {
    if accuracy >= 95 {
        colors.success()
    } else if accuracy >= 85 {
        colors.warning()
    } else {
        colors.error()
    }
}

fn row<'a>(label: &'a str, value: String, label_style: Style, value_style: Style) -> Line<'a> {
    Line::from(vec![
        Span::styled(label, label_style),
        Span::styled(value, value_style),
    ])
}

impl Widget for StatsSidebar<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let colors = &self.theme.colors;
        let label = Style::default().fg(colors.fg());
        let dim = Style::default().fg(colors.text_pending());

        let sections = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(9), Constraint::Min(8)])
            .split(area);

        // Current round
        {
            let live = self.session.live_metrics();
            let progress = self.session.progress() * 100.0;
            let vs_target = live.net_wpm as i64 - self.target_wpm as i64;

            let lines = vec![
                row("WPM: ", live.net_wpm.to_string(), label, Style::default().fg(colors.accent())),
                row("  vs target: ", format_delta(vs_target, ""), dim, dim),
                row(
                    "Accuracy: ",
                    format!("{}%", live.accuracy),
                    label,
                    Style::default().fg(accuracy_color(colors, live.accuracy)),
                ),
                row("Errors: ", live.errors.to_string(), label, Style::default().fg(colors.error())),
                row("Progress: ", format!("{progress:.0}%"), label, Style::default().fg(colors.accent())),
                row("Time: ", format_duration(self.session.elapsed_secs()), label, label),
            ];

            Paragraph::new(lines)
                .block(
                    Block::bordered()
                        .title(" Round ")
                        .border_style(Style::default().fg(colors.border()))
                        .style(Style::default().bg(colors.bg())),
                )
                .render(sections[0], buf);
        }

        // Today and lifetime
        {
            let quota_color = if self.daily.is_met() {
                colors.success()
            } else {
                colors.accent()
            };
            let lines = vec![
                row(
                    "Today: ",
                    format!("{}/{}", self.daily.completed, self.daily.target),
                    label,
                    Style::default().fg(quota_color),
                ),
                row("Streak: ", format!("{}d (best {}d)", self.stats.streak_days, self.stats.best_streak), label, label),
                row("Momentum: ", self.momentum.to_string(), label, label),
                Line::from(""),
                row("Sessions: ", self.stats.total_sessions.to_string(), dim, dim),
                row("Avg WPM: ", self.stats.average_wpm.to_string(), dim, dim),
                row("Best WPM: ", self.stats.best_wpm.to_string(), dim, dim),
                row("Avg acc: ", format!("{}%", self.stats.average_accuracy), dim, dim),
            ];

            Paragraph::new(lines)
                .block(
                    Block::bordered()
                        .title(" Practice ")
                        .border_style(Style::default().fg(colors.border()))
                        .style(Style::default().bg(colors.bg())),
                )
                .render(sections[1], buf);
        }
    }
}
