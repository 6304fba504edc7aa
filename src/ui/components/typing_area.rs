use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Paragraph, Widget, Wrap};

use shine::session::typing::{CharStatus, RoundState, TypingSession};

use crate::ui::theme::Theme;

pub struct TypingArea<'a> {
    session: &'a TypingSession,
    theme: &'a Theme,
}

impl<'a> TypingArea<'a> {
    pub fn new(session: &'a TypingSession, theme: &'a Theme) -> Self {
        Self { session, theme }
    }
}

/// What to draw for one target position. Wrong characters show what was
/// typed; a mistyped space shows a middle dot so the error stays visible.
fn display_char(status: CharStatus, target: char) -> char {
    match status {
        CharStatus::Incorrect(' ') => '\u{00b7}',
        CharStatus::Incorrect(typed) => typed,
        _ => target,
    }
}

impl Widget for TypingArea<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let colors = &self.theme.colors;
        let Some(target) = self.session.target() else {
            Block::bordered()
                .border_style(Style::default().fg(colors.border()))
                .render(area, buf);
            return;
        };

        let cursor = self.session.input().len();
        let show_cursor =
            self.session.is_enabled() && self.session.state() != RoundState::Completed;

        let spans: Vec<Span> = target
            .chars()
            .iter()
            .enumerate()
            .map(|(idx, &ch)| {
                let status = self.session.char_status(idx);
                let style = match status {
                    CharStatus::Correct => Style::default().fg(colors.text_correct()),
                    CharStatus::Incorrect(_) => Style::default()
                        .fg(colors.text_incorrect())
                        .bg(colors.text_incorrect_bg())
                        .add_modifier(Modifier::UNDERLINED),
                    CharStatus::Pending if idx == cursor && show_cursor => Style::default()
                        .fg(colors.text_cursor_fg())
                        .bg(colors.text_cursor_bg()),
                    CharStatus::Pending => Style::default().fg(colors.text_pending()),
                };
                Span::styled(display_char(status, ch).to_string(), style)
            })
            .collect();

        let border = if self.session.is_enabled() {
            colors.border_focused()
        } else {
            colors.border()
        };
        let mut block = Block::bordered()
            .border_style(Style::default().fg(border))
            .style(Style::default().bg(colors.bg()));
        if !self.session.is_enabled() {
            block = block.title(" paused: focus the window to continue ");
        }

        Paragraph::new(Line::from(spans))
            .block(block)
            .wrap(Wrap { trim: false })
            .render(area, buf);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_char_shows_typed_letter() {
        assert_eq!(display_char(CharStatus::Incorrect('x'), 'a'), 'x');
        assert_eq!(display_char(CharStatus::Correct, 'a'), 'a');
        assert_eq!(display_char(CharStatus::Pending, 'a'), 'a');
    }

    #[test]
    fn test_display_char_keeps_space_errors_visible() {
        assert_eq!(display_char(CharStatus::Incorrect(' '), 'a'), '\u{00b7}');
        assert_eq!(display_char(CharStatus::Incorrect('x'), ' '), 'x');
    }
}
