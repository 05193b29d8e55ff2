//! Layout of the review screen.

use ratatui::buffer::Buffer;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::{Color, Style, Stylize};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph, Widget, Wrap};

use crate::app::{
    App, KEY_CLEAR, KEY_COMMIT, KEY_CUSTOM, KEY_DISCARD, KEY_EXIT, KEY_JUMP, KEY_MARK_NA,
    KEY_NAV_BACKWARD, KEY_NAV_FORWARD, KEY_NEXT, KEY_PREVIEW, KEY_PREVIOUS, KEY_TOGGLE_NAV, Mode,
};
use crate::key_hint::{self, Hint, hint};
use crate::page_view::{PageContent, PageView};

const SIDE_PANEL_WIDTH: u16 = 42;

const REVIEW_HINTS: &[Hint] = &[
    hint(&[KEY_COMMIT], "done"),
    hint(&[KEY_NEXT, KEY_NAV_FORWARD], "next"),
    hint(&[KEY_PREVIOUS, KEY_NAV_BACKWARD], "prev"),
    hint(&[KEY_DISCARD], "discard"),
    hint(&[KEY_MARK_NA], "NA"),
    hint(&[KEY_CLEAR], "clear"),
    hint(&[KEY_JUMP], "go to"),
    hint(&[KEY_PREVIEW], "open"),
    hint(&[KEY_CUSTOM], "custom"),
    hint(&[KEY_TOGGLE_NAV], "arrows"),
    hint(&[KEY_EXIT], "exit"),
];

pub(crate) fn render(app: &App, area: Rect, buf: &mut Buffer) {
    let [header, body, notice, footer] = Layout::vertical([
        Constraint::Length(1),
        Constraint::Min(3),
        Constraint::Length(3),
        Constraint::Length(1),
    ])
    .areas(area);

    render_header(app, header, buf);
    let [pages, side] =
        Layout::horizontal([Constraint::Min(10), Constraint::Length(SIDE_PANEL_WIDTH)])
            .areas(body);
    render_pages(app, pages, buf);
    render_side_panel(app, side, buf);
    render_notice(app, notice, buf);
    key_hint::render_hints(REVIEW_HINTS, footer, buf);

    if let Mode::CustomValues(editor) = &app.mode {
        editor.render(area, buf);
    }
}

fn render_header(app: &App, area: Rect, buf: &mut Buffer) {
    let session = &app.session;
    let mut spans = vec![
        Span::styled(format!(" {} ", session.gate_name()), Style::default().bold().reversed()),
        " ".into(),
    ];
    match app.current_sample() {
        Some(sample) => {
            spans.push(Span::styled(sample.id.clone(), Style::default().bold()));
            spans.push(
                format!("  {}/{}", session.cursor() + 1, session.samples().size())
                    .dim(),
            );
        }
        None if app.is_finished() => spans.push("finished".dim()),
        None => spans.push(
            format!(
                "not started, {} samples in {}",
                session.samples().size(),
                session.samples().folder().display()
            )
            .dim(),
        ),
    }
    let arrows = if session.nav_keys_enabled() { "on" } else { "off" };
    spans.push(format!("  arrows {arrows}").dim());
    Paragraph::new(Line::from(spans)).render(area, buf);
}

fn render_pages(app: &App, area: Rect, buf: &mut Buffer) {
    let Some(pages) = &app.pages else {
        let message = if app.is_finished() {
            "All samples have been processed. Press any key to leave."
        } else {
            "Press enter to start, or ctrl + g to pick the first sample."
        };
        PageView {
            title: String::new(),
            content: PageContent::Message(message),
        }
        .render(area, buf);
        return;
    };

    let count = app.pages_to_display.len().max(1) as u32;
    let columns = Layout::horizontal(vec![Constraint::Ratio(1, count); count as usize]).split(area);
    for (idx, column) in columns.iter().enumerate() {
        let title = app
            .pages_to_display
            .get(idx)
            .map(|page| format!(" page {} ", page + 1))
            .unwrap_or_default();
        let content = match pages {
            Ok(rendered) => match rendered.get(idx) {
                Some(page) => PageContent::Page(page),
                None => PageContent::Message(""),
            },
            Err(message) => PageContent::Message(message),
        };
        PageView { title, content }.render(*column, buf);
    }
}

fn render_side_panel(app: &App, area: Rect, buf: &mut Buffer) {
    let pending = app.pending_descriptors();
    let [bindings_area, summary_area, pending_area] = Layout::vertical([
        Constraint::Min(3),
        Constraint::Length(6),
        Constraint::Length((pending.len() as u16).clamp(1, 4) + 2),
    ])
    .areas(area);

    let selected: Vec<&str> = app.session.pending().iter().collect();
    let lines: Vec<Line> = app
        .hotkeys
        .iter()
        .map(|(hotkey, key)| {
            let style = if selected.contains(&key.as_str()) {
                Style::default().fg(Color::Green).bold()
            } else {
                Style::default()
            };
            Line::from(vec![
                Span::styled(format!("[{hotkey}] "), Style::default().fg(Color::Cyan)),
                Span::styled(key.clone(), style),
            ])
        })
        .collect();
    Paragraph::new(lines)
        .block(titled(" Triggers "))
        .render(bindings_area, buf);

    let summary = if app.summary.is_empty() {
        vec![Line::from("no record".dim())]
    } else {
        app.summary.lines().map(|l| Line::from(l.to_string())).collect()
    };
    Paragraph::new(summary)
        .block(titled(" Recorded "))
        .wrap(Wrap { trim: true })
        .render(summary_area, buf);

    let pending_lines: Vec<Line> = if pending.is_empty() {
        vec![Line::from("nothing selected".dim())]
    } else {
        pending.into_iter().map(Line::from).collect()
    };
    Paragraph::new(pending_lines)
        .block(titled(" Selected "))
        .render(pending_area, buf);
}

fn render_notice(app: &App, area: Rect, buf: &mut Buffer) {
    let block = Block::default().borders(Borders::TOP).border_style(Style::default().dim());
    let inner = block.inner(area);
    block.render(area, buf);

    let line = if let Mode::JumpInput(text) = &app.mode {
        Line::from(vec![
            Span::styled("Go to sample index (first is 0): ", Style::default().fg(Color::Cyan).bold()),
            Span::raw(text.clone()),
            Span::styled("█", Style::default().fg(Color::Gray)),
        ])
    } else if let Some(notice) = &app.notice {
        let message = notice.to_string().replace('\n', " ");
        Line::from(vec![
            Span::styled(format!("{}: ", notice.title()), Style::default().fg(Color::Yellow).bold()),
            Span::raw(message),
        ])
    } else {
        Line::from("")
    };
    Paragraph::new(line)
        .wrap(Wrap { trim: true })
        .render(inner, buf);
}

fn titled(title: &str) -> Block<'_> {
    Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().dim())
        .title(title)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::renderer::TextRenderer;
    use gatereview_core::{
        ConfirmRequest, CorrectionStore, SampleList, Session, SessionOptions, Taxonomy, Trigger,
    };
    use ratatui::Terminal;
    use ratatui::backend::TestBackend;
    use std::time::Duration;
    use tempfile::TempDir;

    fn screen_text(app: &App) -> String {
        let mut terminal = Terminal::new(TestBackend::new(120, 30)).expect("terminal");
        terminal
            .draw(|frame| render(app, frame.area(), frame.buffer_mut()))
            .expect("draw");
        terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|c| c.symbol())
            .collect()
    }

    fn app(dir: &TempDir) -> App {
        for (id, text) in [("S01", "alpha"), ("S02", "beta")] {
            std::fs::write(dir.path().join(format!("{id}.txt")), text).expect("write");
        }
        let session = Session::new(
            Taxonomy::new([("fsc 70k", "PBMC_70k")]),
            "singlet",
            SampleList::scan(dir.path(), "txt").expect("scan"),
            CorrectionStore::open(dir.path().join("c.yaml")).expect("store"),
            SessionOptions::default(),
        );
        App::new(session, Box::new(TextRenderer), vec![0, 0], Duration::from_millis(10))
    }

    #[test]
    fn idle_screen_prompts_to_start() {
        let dir = TempDir::new().expect("temp dir");
        let text = screen_text(&app(&dir));
        assert!(text.contains("not started, 2 samples"));
        assert!(text.contains("Press enter to start"));
        assert!(text.contains("[1] fsc 70k"));
    }

    #[test]
    fn review_screen_shows_sample_pages_and_selection() {
        let dir = TempDir::new().expect("temp dir");
        let mut app = app(&dir);
        let mut accept = |_: &ConfirmRequest| true;
        app.dispatch(Trigger::Start, &mut accept).expect("start");
        app.dispatch(Trigger::Selection("fsc 70k".into()), &mut accept)
            .expect("select");
        app.dispatch(Trigger::Selection("bogus".into()), &mut accept)
            .expect("select");

        let text = screen_text(&app);
        assert!(text.contains("S01"));
        assert!(text.contains("1/2"));
        assert!(text.contains("alpha"));
        assert!(text.contains("PBMC_70k"));
        assert!(text.contains("?bogus"));
        assert!(text.contains("no record"));
    }
}
