//! Keyboard shortcuts and the hint line drawn under each screen.

use std::fmt;

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::Stylize;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Paragraph, Widget};

/// A key plus the exact modifier set it must be pressed with.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) struct KeyBinding {
    code: KeyCode,
    modifiers: KeyModifiers,
}

pub(crate) const fn plain(code: KeyCode) -> KeyBinding {
    KeyBinding {
        code,
        modifiers: KeyModifiers::NONE,
    }
}

pub(crate) const fn ctrl(code: KeyCode) -> KeyBinding {
    KeyBinding {
        code,
        modifiers: KeyModifiers::CONTROL,
    }
}

impl KeyBinding {
    /// True for press and auto-repeat events; releases never match.
    pub(crate) fn is_press(&self, event: KeyEvent) -> bool {
        matches!(event.kind, KeyEventKind::Press | KeyEventKind::Repeat)
            && event.code == self.code
            && event.modifiers == self.modifiers
    }
}

impl fmt::Display for KeyBinding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.modifiers.contains(KeyModifiers::CONTROL) {
            f.write_str("ctrl + ")?;
        }
        match self.code {
            KeyCode::Char(' ') => f.write_str("space"),
            KeyCode::Char(c) => write!(f, "{}", c.to_ascii_lowercase()),
            KeyCode::Enter => f.write_str("enter"),
            KeyCode::Esc => f.write_str("esc"),
            KeyCode::Tab => f.write_str("tab"),
            KeyCode::Backspace => f.write_str("backspace"),
            KeyCode::Left => f.write_str("←"),
            KeyCode::Right => f.write_str("→"),
            KeyCode::Up => f.write_str("↑"),
            KeyCode::Down => f.write_str("↓"),
            KeyCode::PageUp => f.write_str("pgup"),
            KeyCode::PageDown => f.write_str("pgdn"),
            other => write!(f, "{}", other.to_string().to_ascii_lowercase()),
        }
    }
}

/// One footer entry: alternative keys for the same action.
pub(crate) struct Hint {
    pub keys: &'static [KeyBinding],
    pub action: &'static str,
}

pub(crate) const fn hint(keys: &'static [KeyBinding], action: &'static str) -> Hint {
    Hint { keys, action }
}

pub(crate) fn hint_line(hints: &[Hint]) -> Line<'static> {
    let mut spans: Vec<Span<'static>> = Vec::with_capacity(hints.len() * 3);
    for hint in hints {
        let keys: Vec<String> = hint.keys.iter().map(ToString::to_string).collect();
        spans.push(format!(" {}", keys.join("/")).cyan());
        spans.push(format!(" {}", hint.action).into());
        spans.push("  ".into());
    }
    spans.pop();
    Line::from(spans).dim()
}

pub(crate) fn render_hints(hints: &[Hint], area: Rect, buf: &mut Buffer) {
    Paragraph::new(hint_line(hints)).render(area, buf);
}
