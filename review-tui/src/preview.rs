//! Full-screen page viewer for one sample.
//!
//! Runs its own input loop on top of the review screen and returns when the
//! user closes it. Nothing in the session changes while it is open.

use std::path::Path;
use std::time::Duration;

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, MouseEventKind};
use ratatui::Terminal;
use ratatui::backend::Backend;
use ratatui::buffer::Buffer;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::widgets::{Clear, Widget};

use crate::key_hint::{self, Hint, KeyBinding, hint};
use crate::page_view::{PageContent, PageView};
use crate::pager::PagerState;
use crate::renderer::{DocumentRenderer, RenderError, RenderedPage};

const KEY_NEXT: KeyBinding = key_hint::plain(KeyCode::Right);
const KEY_PREV: KeyBinding = key_hint::plain(KeyCode::Left);
const KEY_PAGE_DOWN: KeyBinding = key_hint::plain(KeyCode::PageDown);
const KEY_PAGE_UP: KeyBinding = key_hint::plain(KeyCode::PageUp);
const KEY_ENTER: KeyBinding = key_hint::plain(KeyCode::Enter);
const KEY_ESC: KeyBinding = key_hint::plain(KeyCode::Esc);
const KEY_Q: KeyBinding = key_hint::plain(KeyCode::Char('q'));
const KEY_BACKSPACE: KeyBinding = key_hint::plain(KeyCode::Backspace);

const PREVIEW_HINTS: &[Hint] = &[
    hint(&[KEY_PREV, KEY_NEXT], "page"),
    hint(&[KEY_ENTER], "go to typed page"),
    hint(&[KEY_ESC, KEY_Q], "close"),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum PreviewAction {
    Continue,
    Close,
}

/// Apply one key to the pager.
pub(crate) fn handle_key(pager: &mut PagerState, key: KeyEvent) -> PreviewAction {
    match key {
        e if KEY_ESC.is_press(e) || KEY_Q.is_press(e) => return PreviewAction::Close,
        e if KEY_NEXT.is_press(e) || KEY_PAGE_DOWN.is_press(e) => pager.next(),
        e if KEY_PREV.is_press(e) || KEY_PAGE_UP.is_press(e) => pager.previous(),
        e if KEY_ENTER.is_press(e) => pager.submit(),
        e if KEY_BACKSPACE.is_press(e) => pager.backspace(),
        KeyEvent {
            code: KeyCode::Char(c),
            kind: KeyEventKind::Press,
            ..
        } => {
            pager.push_char(c);
        }
        _ => {}
    }
    PreviewAction::Continue
}

pub(crate) struct PreviewScreen<'a> {
    pub title: &'a str,
    pub pager: &'a PagerState,
    pub page: &'a std::result::Result<RenderedPage, RenderError>,
}

impl Widget for PreviewScreen<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        Clear.render(area, buf);
        let [body, footer] =
            Layout::vertical([Constraint::Min(1), Constraint::Length(1)]).areas(area);
        let title = format!(" {} page {} ", self.title, self.pager.label());
        let message;
        let content = match self.page {
            Ok(page) => PageContent::Page(page),
            Err(err) => {
                message = err.to_string();
                PageContent::Message(&message)
            }
        };
        PageView { title, content }.render(body, buf);
        key_hint::render_hints(PREVIEW_HINTS, footer, buf);
    }
}

/// Show `path` page by page until closed.
pub(crate) fn run<B: Backend>(
    terminal: &mut Terminal<B>,
    renderer: &dyn DocumentRenderer,
    path: &Path,
    title: &str,
    poll: Duration,
) -> anyhow::Result<()> {
    let page_count = renderer.page_count(path)?;
    let mut pager = PagerState::new(page_count);
    let mut shown = usize::MAX;
    let mut page: std::result::Result<RenderedPage, RenderError> = Ok(RenderedPage::Text(vec![]));
    tracing::debug!(path = %path.display(), page_count, "Opened preview");

    loop {
        if shown != pager.page() {
            shown = pager.page();
            page = renderer.render_page(path, shown);
        }
        terminal.draw(|frame| {
            frame.render_widget(
                PreviewScreen {
                    title,
                    pager: &pager,
                    page: &page,
                },
                frame.area(),
            );
        })?;

        if !event::poll(poll)? {
            continue;
        }
        match event::read()? {
            Event::Key(key) => {
                if handle_key(&mut pager, key) == PreviewAction::Close {
                    break;
                }
            }
            Event::Mouse(mouse) => match mouse.kind {
                MouseEventKind::ScrollDown => pager.next(),
                MouseEventKind::ScrollUp => pager.previous(),
                _ => {}
            },
            _ => {}
        }
    }
    tracing::debug!("Closed preview");
    Ok(())
}
