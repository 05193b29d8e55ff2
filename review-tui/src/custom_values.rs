//! Editor for the three free-text custom slots.

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind};
use gatereview_core::Taxonomy;
use gatereview_core::taxonomy::CUSTOM_SLOT_KEYS;
use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::{Color, Style, Stylize};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, BorderType, Borders, Clear, Paragraph, Widget};

use crate::confirm::centered;

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum EditorResult {
    Apply([String; 3]),
    Cancel,
}

pub(crate) struct CustomValuesEditor {
    /// Current descriptors, shown as hints next to each field.
    current: [String; 3],
    values: [String; 3],
    focus: usize,
    result: Option<EditorResult>,
}

impl CustomValuesEditor {
    pub fn new(taxonomy: &Taxonomy) -> Self {
        let current = CUSTOM_SLOT_KEYS.map(|key| taxonomy.resolve(key).unwrap_or_default().to_string());
        Self {
            current,
            values: Default::default(),
            focus: 0,
            result: None,
        }
    }

    pub fn result(&self) -> Option<&EditorResult> {
        self.result.as_ref()
    }

    /// Tab/Up/Down move between fields, Enter applies, Esc cancels.
    pub fn handle_key_event(&mut self, key_event: KeyEvent) {
        if self.result.is_some()
            || !matches!(key_event.kind, KeyEventKind::Press | KeyEventKind::Repeat)
        {
            return;
        }
        match key_event.code {
            KeyCode::Tab | KeyCode::Down => self.focus = (self.focus + 1) % 3,
            KeyCode::BackTab | KeyCode::Up => self.focus = (self.focus + 2) % 3,
            KeyCode::Backspace => {
                self.values[self.focus].pop();
            }
            KeyCode::Char(c) => self.values[self.focus].push(c),
            KeyCode::Enter => self.result = Some(EditorResult::Apply(self.values.clone())),
            KeyCode::Esc => self.result = Some(EditorResult::Cancel),
            _ => {}
        }
    }
}

impl Widget for &CustomValuesEditor {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let area = centered(area, 64, 9);
        Clear.render(area, buf);
        let block = Block::default()
            .borders(Borders::ALL)
            .border_type(BorderType::Double)
            .border_style(Style::default().fg(Color::Cyan))
            .title(" Custom values ");
        let inner = block.inner(area);
        block.render(area, buf);

        let mut lines = Vec::new();
        for (idx, key) in CUSTOM_SLOT_KEYS.iter().enumerate() {
            let focused = idx == self.focus;
            let label_style = if focused {
                Style::default().fg(Color::Cyan).bold()
            } else {
                Style::default()
            };
            let mut spans = vec![
                Span::styled(format!("{key}: "), label_style),
                Span::raw(self.values[idx].clone()),
            ];
            if focused {
                spans.push(Span::styled("█", Style::default().fg(Color::Gray)));
            }
            spans.push(Span::styled(
                format!("  ({})", self.current[idx]),
                Style::default().dim(),
            ));
            lines.push(Line::from(spans));
        }
        lines.push(Line::from(""));
        lines.push(Line::from("Blank fields keep their current value.").dim());
        lines.push(Line::from(vec![
            Span::styled("[Enter]", Style::default().fg(Color::Green)),
            Span::raw(" Apply  "),
            Span::styled("[Esc]", Style::default().fg(Color::Red)),
            Span::raw(" Cancel"),
        ]));
        Paragraph::new(lines).render(inner, buf);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::KeyModifiers;
    use pretty_assertions::assert_eq;

    fn press(editor: &mut CustomValuesEditor, code: KeyCode) {
        editor.handle_key_event(KeyEvent::new_with_kind(
            code,
            KeyModifiers::NONE,
            KeyEventKind::Press,
        ));
    }

    fn type_text(editor: &mut CustomValuesEditor, text: &str) {
        for c in text.chars() {
            press(editor, KeyCode::Char(c));
        }
    }

    #[test]
    fn fields_are_edited_in_focus_order() {
        let taxonomy = Taxonomy::new([("Custom 2", "CUSTOM_wide")]);
        let mut editor = CustomValuesEditor::new(&taxonomy);
        assert_eq!(editor.current[1], "CUSTOM_wide");

        type_text(&mut editor, "Xlim");
        press(&mut editor, KeyCode::Tab);
        press(&mut editor, KeyCode::Tab);
        type_text(&mut editor, "abc");
        press(&mut editor, KeyCode::Backspace);
        press(&mut editor, KeyCode::Enter);

        assert_eq!(
            editor.result(),
            Some(&EditorResult::Apply([
                "Xlim".to_string(),
                String::new(),
                "ab".to_string()
            ]))
        );
    }

    #[test]
    fn escape_cancels() {
        let mut editor = CustomValuesEditor::new(&Taxonomy::new(Vec::<(String, String)>::new()));
        type_text(&mut editor, "zzz");
        press(&mut editor, KeyCode::Esc);
        assert_eq!(editor.result(), Some(&EditorResult::Cancel));
    }
}
