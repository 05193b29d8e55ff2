//! Yes/no modal answering session confirmation requests.

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind};
use gatereview_core::{Confirm, ConfirmRequest};
use ratatui::Terminal;
use ratatui::backend::Backend;
use ratatui::buffer::Buffer;
use ratatui::layout::{Constraint, Flex, Layout, Rect};
use ratatui::style::{Color, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, BorderType, Borders, Clear, Paragraph, Widget, Wrap};

pub(crate) struct ConfirmModal {
    request: ConfirmRequest,
    answer: Option<bool>,
}

impl ConfirmModal {
    pub fn new(request: ConfirmRequest) -> Self {
        Self {
            request,
            answer: None,
        }
    }

    pub fn answer(&self) -> Option<bool> {
        self.answer
    }

    /// `y` accepts; `n`, Esc and Enter decline.
    pub fn handle_key_event(&mut self, key_event: KeyEvent) {
        if self.answer.is_some() || key_event.kind != KeyEventKind::Press {
            return;
        }
        match key_event.code {
            KeyCode::Char('y') | KeyCode::Char('Y') => self.answer = Some(true),
            KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc | KeyCode::Enter => {
                self.answer = Some(false)
            }
            _ => {}
        }
    }

    fn title(&self) -> &'static str {
        match self.request {
            ConfirmRequest::Discard { .. } => " Discard sample ",
            ConfirmRequest::ClearRecord { .. } => " Clear record ",
        }
    }
}

impl Widget for &ConfirmModal {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let area = centered(area, 60, 7);
        Clear.render(area, buf);
        let block = Block::default()
            .borders(Borders::ALL)
            .border_type(BorderType::Double)
            .border_style(Style::default().fg(Color::Yellow))
            .title(self.title());
        let inner = block.inner(area);
        block.render(area, buf);

        let lines = vec![
            Line::from(self.request.prompt()),
            Line::from(""),
            Line::from(vec![
                Span::styled("[y]", Style::default().fg(Color::Green)),
                Span::raw(" Yes  "),
                Span::styled("[n]", Style::default().fg(Color::Red)),
                Span::raw(" No"),
            ]),
        ];
        Paragraph::new(lines)
            .wrap(Wrap { trim: true })
            .render(inner, buf);
    }
}

/// Rect of at most `width` x `height` centered in `area`.
pub(crate) fn centered(area: Rect, width: u16, height: u16) -> Rect {
    let [row] = Layout::vertical([Constraint::Length(height.min(area.height))])
        .flex(Flex::Center)
        .areas(area);
    let [cell] = Layout::horizontal([Constraint::Length(width.min(area.width))])
        .flex(Flex::Center)
        .areas(row);
    cell
}

/// Blocks on terminal input until the modal is answered.
pub(crate) struct TerminalConfirm<'a, B: Backend> {
    terminal: &'a mut Terminal<B>,
}

impl<'a, B: Backend> TerminalConfirm<'a, B> {
    pub fn new(terminal: &'a mut Terminal<B>) -> Self {
        Self { terminal }
    }

    fn run(&mut self, request: &ConfirmRequest) -> std::io::Result<bool> {
        let mut modal = ConfirmModal::new(request.clone());
        loop {
            self.terminal
                .draw(|frame| frame.render_widget(&modal, frame.area()))?;
            if let Event::Key(key) = event::read()? {
                modal.handle_key_event(key);
            }
            if let Some(answer) = modal.answer() {
                return Ok(answer);
            }
        }
    }
}

impl<B: Backend> Confirm for TerminalConfirm<'_, B> {
    fn confirm(&mut self, request: &ConfirmRequest) -> bool {
        match self.run(request) {
            Ok(answer) => {
                tracing::debug!(?request, answer, "Confirmation answered");
                answer
            }
            Err(err) => {
                tracing::warn!("Confirmation failed, treating as declined: {err}");
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::KeyModifiers;
    use ratatui::backend::TestBackend;

    fn press(code: KeyCode) -> KeyEvent {
        KeyEvent::new_with_kind(code, KeyModifiers::NONE, KeyEventKind::Press)
    }

    fn discard() -> ConfirmRequest {
        ConfirmRequest::Discard {
            sample_id: "S01".into(),
        }
    }

    #[test]
    fn only_y_accepts() {
        let mut modal = ConfirmModal::new(discard());
        modal.handle_key_event(press(KeyCode::Char('x')));
        assert_eq!(modal.answer(), None);
        modal.handle_key_event(press(KeyCode::Char('y')));
        assert_eq!(modal.answer(), Some(true));
        modal.handle_key_event(press(KeyCode::Char('n')));
        assert_eq!(modal.answer(), Some(true));
    }

    #[test]
    fn escape_declines() {
        let mut modal = ConfirmModal::new(discard());
        modal.handle_key_event(press(KeyCode::Esc));
        assert_eq!(modal.answer(), Some(false));
    }

    #[test]
    fn renders_prompt() {
        let mut terminal = Terminal::new(TestBackend::new(70, 12)).expect("terminal");
        let modal = ConfirmModal::new(discard());
        terminal
            .draw(|frame| frame.render_widget(&modal, frame.area()))
            .expect("draw");
        let text: String = terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|c| c.symbol())
            .collect();
        assert!(text.contains("Discard S01?"));
        assert!(text.contains("Discard sample"));
    }
}
