//! Review screen state and the main input loop.
//!
//! Keys are turned into the same raw tokens a button host would emit and
//! classified with [`Trigger::classify`]. Arrow keys form the secondary
//! navigation channel, which the user can switch off.

use std::time::Duration;

use anyhow::Context;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind};
use gatereview_core::trigger::{
    TOKEN_CLEAR_RECORD, TOKEN_COMMIT, TOKEN_DISCARD, TOKEN_EXIT, TOKEN_JUMP, TOKEN_MARK_NA,
    TOKEN_NEXT, TOKEN_OPEN_PREVIEW, TOKEN_PREVIOUS, TOKEN_START, TOKEN_TOGGLE_NAV_KEYS,
    TOKEN_WINDOW_CLOSED,
};
use gatereview_core::{Confirm, NavKey, Notice, Outcome, Sample, Session, SessionState, Trigger};
use ratatui::Terminal;
use ratatui::backend::Backend;

use crate::confirm::TerminalConfirm;
use crate::custom_values::{CustomValuesEditor, EditorResult};
use crate::key_hint::{self, KeyBinding};
use crate::preview;
use crate::renderer::{DocumentRenderer, RenderError, RenderedPage};
use crate::ui;

pub(crate) const KEY_COMMIT: KeyBinding = key_hint::plain(KeyCode::Enter);
pub(crate) const KEY_NEXT: KeyBinding = key_hint::ctrl(KeyCode::Char('n'));
pub(crate) const KEY_PREVIOUS: KeyBinding = key_hint::ctrl(KeyCode::Char('p'));
pub(crate) const KEY_DISCARD: KeyBinding = key_hint::ctrl(KeyCode::Char('d'));
pub(crate) const KEY_MARK_NA: KeyBinding = key_hint::ctrl(KeyCode::Char('a'));
pub(crate) const KEY_JUMP: KeyBinding = key_hint::ctrl(KeyCode::Char('g'));
pub(crate) const KEY_PREVIEW: KeyBinding = key_hint::ctrl(KeyCode::Char('o'));
pub(crate) const KEY_CLEAR: KeyBinding = key_hint::ctrl(KeyCode::Char('x'));
pub(crate) const KEY_TOGGLE_NAV: KeyBinding = key_hint::ctrl(KeyCode::Char('k'));
pub(crate) const KEY_CUSTOM: KeyBinding = key_hint::ctrl(KeyCode::Char('e'));
pub(crate) const KEY_EXIT: KeyBinding = key_hint::ctrl(KeyCode::Char('q'));
pub(crate) const KEY_ESC: KeyBinding = key_hint::plain(KeyCode::Esc);
pub(crate) const KEY_INTERRUPT: KeyBinding = key_hint::ctrl(KeyCode::Char('c'));
pub(crate) const KEY_NAV_FORWARD: KeyBinding = key_hint::plain(KeyCode::Right);
pub(crate) const KEY_NAV_BACKWARD: KeyBinding = key_hint::plain(KeyCode::Left);

/// Hotkeys handed out to taxonomy bindings in declaration order.
const HOTKEYS: &str = "123456789abcdefghijklmnopqrstuvwxyz";

/// What a key press means before the session sees it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum KeyInput {
    /// A raw token, with the text of the input field it came from.
    Token { token: String, value: Option<String> },
    Nav(NavKey),
    OpenJump,
    OpenCustomValues,
}

impl KeyInput {
    fn token(token: &str) -> Self {
        KeyInput::Token {
            token: token.to_string(),
            value: None,
        }
    }
}

pub(crate) enum Mode {
    Review,
    JumpInput(String),
    CustomValues(CustomValuesEditor),
}

/// Follow-up work that needs the terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum AppAction {
    None,
    Preview(usize),
}

/// Pages of the displayed sample, or why they could not be drawn.
pub(crate) type PageSet = std::result::Result<Vec<RenderedPage>, String>;

pub struct App {
    pub(crate) session: Session,
    renderer: Box<dyn DocumentRenderer>,
    pub(crate) pages_to_display: Vec<usize>,
    /// `(hotkey, trigger key)` for each binding that got a hotkey.
    pub(crate) hotkeys: Vec<(char, String)>,
    pub(crate) mode: Mode,
    pub(crate) notice: Option<Notice>,
    pub(crate) pages: Option<PageSet>,
    pub(crate) summary: String,
    preview_poll: Duration,
    finished: bool,
    quit: bool,
}

impl App {
    pub fn new(
        session: Session,
        renderer: Box<dyn DocumentRenderer>,
        pages_to_display: Vec<usize>,
        preview_poll: Duration,
    ) -> Self {
        let mut app = Self {
            session,
            renderer,
            pages_to_display,
            hotkeys: Vec::new(),
            mode: Mode::Review,
            notice: None,
            pages: None,
            summary: String::new(),
            preview_poll,
            finished: false,
            quit: false,
        };
        app.assign_hotkeys();
        app
    }

    fn assign_hotkeys(&mut self) {
        self.hotkeys = HOTKEYS
            .chars()
            .zip(self.session.taxonomy().bindings())
            .map(|(hotkey, binding)| (hotkey, binding.key.clone()))
            .collect();
    }

    pub(crate) fn is_finished(&self) -> bool {
        self.finished
    }

    pub(crate) fn should_quit(&self) -> bool {
        self.quit
    }

    pub(crate) fn current_sample(&self) -> Option<&Sample> {
        self.session.current_sample()
    }

    /// Pending trigger keys resolved through the taxonomy; unknown keys as `?key`.
    pub(crate) fn pending_descriptors(&self) -> Vec<String> {
        let taxonomy = self.session.taxonomy();
        self.session
            .pending()
            .iter()
            .map(|key| match taxonomy.resolve(key) {
                Ok(descriptor) => descriptor.to_string(),
                Err(_) => format!("?{key}"),
            })
            .collect()
    }

    /// Map a key in review mode.
    pub(crate) fn key_to_input(&self, key: KeyEvent) -> Option<KeyInput> {
        let start_or_commit = if self.session.state() == SessionState::Idle {
            TOKEN_START
        } else {
            TOKEN_COMMIT
        };
        let input = match key {
            e if KEY_COMMIT.is_press(e) => KeyInput::token(start_or_commit),
            e if KEY_NEXT.is_press(e) => KeyInput::token(TOKEN_NEXT),
            e if KEY_PREVIOUS.is_press(e) => KeyInput::token(TOKEN_PREVIOUS),
            e if KEY_DISCARD.is_press(e) => KeyInput::token(TOKEN_DISCARD),
            e if KEY_MARK_NA.is_press(e) => KeyInput::token(TOKEN_MARK_NA),
            e if KEY_PREVIEW.is_press(e) => KeyInput::token(TOKEN_OPEN_PREVIEW),
            e if KEY_CLEAR.is_press(e) => KeyInput::token(TOKEN_CLEAR_RECORD),
            e if KEY_TOGGLE_NAV.is_press(e) => KeyInput::token(TOKEN_TOGGLE_NAV_KEYS),
            e if KEY_EXIT.is_press(e) || KEY_ESC.is_press(e) => KeyInput::token(TOKEN_EXIT),
            e if KEY_INTERRUPT.is_press(e) => KeyInput::token(TOKEN_WINDOW_CLOSED),
            e if KEY_JUMP.is_press(e) => KeyInput::OpenJump,
            e if KEY_CUSTOM.is_press(e) => KeyInput::OpenCustomValues,
            e if KEY_NAV_FORWARD.is_press(e) => KeyInput::Nav(NavKey::Forward),
            e if KEY_NAV_BACKWARD.is_press(e) => KeyInput::Nav(NavKey::Backward),
            KeyEvent {
                code: KeyCode::Char(c),
                kind: KeyEventKind::Press,
                ..
            } => {
                let (_, trigger_key) = self.hotkeys.iter().find(|(hotkey, _)| *hotkey == c)?;
                KeyInput::token(trigger_key)
            }
            _ => return None,
        };
        Some(input)
    }

    /// Handle one key press to completion.
    pub(crate) fn handle_key(
        &mut self,
        key: KeyEvent,
        confirm: &mut dyn Confirm,
    ) -> anyhow::Result<AppAction> {
        if self.finished {
            self.quit = true;
            return Ok(AppAction::None);
        }

        match &mut self.mode {
            Mode::CustomValues(editor) => {
                editor.handle_key_event(key);
                let result = editor.result().cloned();
                match result {
                    Some(EditorResult::Apply(values)) => {
                        self.mode = Mode::Review;
                        let outcome = self.session.apply_custom_values([
                            values[0].as_str(),
                            values[1].as_str(),
                            values[2].as_str(),
                        ]);
                        self.assign_hotkeys();
                        return self.apply_outcome(outcome, false);
                    }
                    Some(EditorResult::Cancel) => self.mode = Mode::Review,
                    None => {}
                }
                Ok(AppAction::None)
            }
            Mode::JumpInput(text) => {
                match key.code {
                    KeyCode::Char(c) if c.is_ascii_digit() => text.push(c),
                    KeyCode::Backspace => {
                        text.pop();
                    }
                    KeyCode::Esc => self.mode = Mode::Review,
                    KeyCode::Enter => {
                        let value = std::mem::take(text);
                        self.mode = Mode::Review;
                        return self.dispatch_input(
                            KeyInput::Token {
                                token: TOKEN_JUMP.to_string(),
                                value: Some(value),
                            },
                            confirm,
                        );
                    }
                    _ => {}
                }
                Ok(AppAction::None)
            }
            Mode::Review => match self.key_to_input(key) {
                Some(input) => self.dispatch_input(input, confirm),
                None => Ok(AppAction::None),
            },
        }
    }

    fn dispatch_input(
        &mut self,
        input: KeyInput,
        confirm: &mut dyn Confirm,
    ) -> anyhow::Result<AppAction> {
        let trigger = match input {
            KeyInput::Token { token, value } => Trigger::classify(&token, value.as_deref()),
            KeyInput::Nav(nav) => {
                match Trigger::from_nav_key(nav, self.session.nav_keys_enabled()) {
                    Some(trigger) => trigger,
                    None => return Ok(AppAction::None),
                }
            }
            KeyInput::OpenJump => {
                self.mode = Mode::JumpInput(String::new());
                return Ok(AppAction::None);
            }
            KeyInput::OpenCustomValues => {
                self.mode = Mode::CustomValues(CustomValuesEditor::new(self.session.taxonomy()));
                return Ok(AppAction::None);
            }
        };
        self.dispatch(trigger, confirm)
    }

    /// Send a classified trigger to the session and update the screen state.
    pub(crate) fn dispatch(
        &mut self,
        trigger: Trigger,
        confirm: &mut dyn Confirm,
    ) -> anyhow::Result<AppAction> {
        let is_jump = matches!(trigger, Trigger::Jump(_));
        self.notice = None;
        let outcome = self
            .session
            .handle(trigger, confirm)
            .context("Failed to apply review action")?;
        self.apply_outcome(outcome, is_jump)
    }

    fn apply_outcome(&mut self, outcome: Outcome, after_jump: bool) -> anyhow::Result<AppAction> {
        match outcome {
            Outcome::Display { index } => {
                if after_jump {
                    self.session.clear_pending();
                }
                self.show(index)?;
            }
            Outcome::SelectionChanged | Outcome::Unchanged | Outcome::NavKeysToggled { .. } => {}
            Outcome::Notice(notice) => {
                if matches!(notice, Notice::RecordCleared { .. }) {
                    self.refresh_summary()?;
                }
                self.notice = Some(notice);
            }
            Outcome::Preview { index } => return Ok(AppAction::Preview(index)),
            Outcome::Finished => {
                self.finished = true;
                self.pages = None;
                self.notice = Some(Notice::Completed);
            }
            Outcome::Exit => self.quit = true,
        }
        Ok(AppAction::None)
    }

    /// Load the pages and store summary of the sample at `index`.
    fn show(&mut self, index: usize) -> anyhow::Result<()> {
        let sample = self.session.samples().get(index)?.clone();
        self.pages = Some(
            match self
                .renderer
                .render_pages(&sample.path, &self.pages_to_display)
            {
                Ok(pages) => Ok(pages),
                Err(RenderError::Missing(path)) => {
                    tracing::warn!("No document file for sample {} at {}", sample.id, path.display());
                    self.notice = Some(Notice::MissingDocument {
                        sample_id: sample.id.clone(),
                    });
                    Err(format!("{} not found", path.display()))
                }
                Err(err) => {
                    tracing::warn!("Failed to render {}: {err}", sample.id);
                    Err(err.to_string())
                }
            },
        );
        self.refresh_summary()
    }

    fn refresh_summary(&mut self) -> anyhow::Result<()> {
        self.summary = match self.session.current_sample() {
            Some(sample) => self.session.store().summarize(&sample.id)?,
            None => String::new(),
        };
        Ok(())
    }

    fn open_preview<B: Backend>(
        &mut self,
        terminal: &mut Terminal<B>,
        index: usize,
    ) -> anyhow::Result<()> {
        let sample = self.session.samples().get(index)?.clone();
        if !sample.path.is_file() {
            tracing::warn!("No document file for sample {}", sample.id);
            self.notice = Some(Notice::MissingDocument {
                sample_id: sample.id,
            });
            return Ok(());
        }
        if let Err(err) = preview::run(
            terminal,
            self.renderer.as_ref(),
            &sample.path,
            &sample.id,
            self.preview_poll,
        ) {
            tracing::warn!("Preview of {} failed: {err:#}", sample.id);
        }
        Ok(())
    }

    /// Draw and handle input until the user exits.
    pub fn run<B: Backend>(&mut self, terminal: &mut Terminal<B>) -> anyhow::Result<()> {
        while !self.should_quit() {
            terminal.draw(|frame| ui::render(self, frame.area(), frame.buffer_mut()))?;
            if !event::poll(Duration::from_millis(250))? {
                continue;
            }
            let Event::Key(key) = event::read()? else {
                continue;
            };
            if key.kind != KeyEventKind::Press {
                continue;
            }
            let action = {
                let mut confirm = TerminalConfirm::new(terminal);
                self.handle_key(key, &mut confirm)?
            };
            if let AppAction::Preview(index) = action {
                self.open_preview(terminal, index)?;
            }
        }
        tracing::info!(cursor = self.session.cursor(), "Review screen closed");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::renderer::TextRenderer;
    use crossterm::event::KeyModifiers;
    use gatereview_core::{ConfirmRequest, CorrectionStore, SampleList, SessionOptions, Taxonomy};
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new_with_kind(code, KeyModifiers::NONE, KeyEventKind::Press)
    }

    fn ctrl(c: char) -> KeyEvent {
        KeyEvent::new_with_kind(KeyCode::Char(c), KeyModifiers::CONTROL, KeyEventKind::Press)
    }

    fn app(dir: &TempDir, ids: &[&str]) -> App {
        for id in ids {
            std::fs::write(dir.path().join(format!("{id}.txt")), format!("page of {id}"))
                .expect("write sample");
        }
        let samples = SampleList::scan(dir.path(), "txt").expect("scan");
        let store = CorrectionStore::open(dir.path().join("output").join("correction.yaml"))
            .expect("store");
        let session = Session::new(
            Taxonomy::new([("fsc 70k", "PBMC_70k"), ("fsc 80k", "PBMC_80k")]),
            "g",
            samples,
            store,
            SessionOptions::default(),
        );
        App::new(
            session,
            Box::new(TextRenderer),
            vec![0],
            Duration::from_millis(10),
        )
    }

    fn press(app: &mut App, event: KeyEvent) -> AppAction {
        let mut accept = |_: &ConfirmRequest| true;
        app.handle_key(event, &mut accept).expect("key handled")
    }

    #[test]
    fn enter_starts_then_commits() {
        let dir = TempDir::new().expect("temp dir");
        let mut app = app(&dir, &["A", "B"]);
        assert_eq!(
            app.key_to_input(key(KeyCode::Enter)),
            Some(KeyInput::token(TOKEN_START))
        );
        press(&mut app, key(KeyCode::Enter));
        assert_eq!(app.current_sample().map(|s| s.id.as_str()), Some("A"));
        assert_eq!(
            app.key_to_input(key(KeyCode::Enter)),
            Some(KeyInput::token(TOKEN_COMMIT))
        );
        assert!(matches!(app.pages, Some(Ok(ref pages)) if pages.len() == 1));
    }

    #[test]
    fn hotkeys_follow_binding_order() {
        let dir = TempDir::new().expect("temp dir");
        let app = app(&dir, &["A"]);
        assert_eq!(app.hotkeys[0], ('1', "fsc 70k".to_string()));
        assert_eq!(app.hotkeys[2], ('3', "Custom 1".to_string()));
        assert_eq!(
            app.key_to_input(key(KeyCode::Char('2'))),
            Some(KeyInput::token("fsc 80k"))
        );
        assert_eq!(app.key_to_input(key(KeyCode::Char('z'))), None);
    }

    #[test]
    fn selection_and_commit_write_store() {
        let dir = TempDir::new().expect("temp dir");
        let mut app = app(&dir, &["A", "B"]);
        press(&mut app, key(KeyCode::Enter));
        press(&mut app, key(KeyCode::Char('1')));
        assert_eq!(app.pending_descriptors(), vec!["PBMC_70k".to_string()]);
        press(&mut app, key(KeyCode::Enter));
        assert_eq!(app.current_sample().map(|s| s.id.as_str()), Some("B"));
        assert_eq!(
            app.session.store().summarize("A").expect("summary"),
            "g: PBMC_70k"
        );
    }

    #[test]
    fn invalid_commit_shows_notice() {
        let dir = TempDir::new().expect("temp dir");
        let mut app = app(&dir, &["A", "B"]);
        press(&mut app, key(KeyCode::Enter));
        press(&mut app, key(KeyCode::Char('1')));
        press(&mut app, key(KeyCode::Char('2')));
        press(&mut app, key(KeyCode::Enter));
        assert!(matches!(app.notice, Some(Notice::InvalidSelection { .. })));
        assert!(app.pending_descriptors().is_empty());
    }

    #[test]
    fn arrows_respect_nav_toggle() {
        let dir = TempDir::new().expect("temp dir");
        let mut app = app(&dir, &["A", "B"]);
        press(&mut app, key(KeyCode::Enter));
        press(&mut app, ctrl('k'));
        press(&mut app, key(KeyCode::Right));
        assert_eq!(app.session.cursor(), 0);
        press(&mut app, ctrl('k'));
        press(&mut app, key(KeyCode::Right));
        assert_eq!(app.session.cursor(), 1);
    }

    #[test]
    fn jump_input_moves_and_clears_pending() {
        let dir = TempDir::new().expect("temp dir");
        let mut app = app(&dir, &["A", "B", "C"]);
        press(&mut app, key(KeyCode::Enter));
        press(&mut app, key(KeyCode::Char('1')));
        press(&mut app, ctrl('g'));
        press(&mut app, key(KeyCode::Char('2')));
        press(&mut app, key(KeyCode::Enter));
        assert_eq!(app.session.cursor(), 2);
        assert!(app.session.pending().is_empty());
        assert!(matches!(app.mode, Mode::Review));
    }

    #[test]
    fn missing_document_sets_notice() {
        let dir = TempDir::new().expect("temp dir");
        let mut app = app(&dir, &["A", "B"]);
        std::fs::remove_file(dir.path().join("B.txt")).expect("remove");
        press(&mut app, key(KeyCode::Enter));
        press(&mut app, ctrl('n'));
        assert_eq!(
            app.notice,
            Some(Notice::MissingDocument {
                sample_id: "B".into()
            })
        );
        assert!(matches!(app.pages, Some(Err(_))));
        assert_eq!(app.session.cursor(), 1);
    }

    #[test]
    fn custom_values_rebind_slot() {
        let dir = TempDir::new().expect("temp dir");
        let mut app = app(&dir, &["A", "B"]);
        press(&mut app, key(KeyCode::Enter));
        press(&mut app, ctrl('e'));
        for c in "wide".chars() {
            press(&mut app, key(KeyCode::Char(c)));
        }
        press(&mut app, key(KeyCode::Enter));
        assert_eq!(app.notice, Some(Notice::CustomValuesApplied));
        assert_eq!(
            app.session.taxonomy().resolve("Custom 1").expect("slot"),
            "CUSTOM_wide"
        );
    }

    #[test]
    fn preview_is_requested_for_current_sample() {
        let dir = TempDir::new().expect("temp dir");
        let mut app = app(&dir, &["A", "B"]);
        press(&mut app, key(KeyCode::Enter));
        press(&mut app, ctrl('n'));
        assert_eq!(press(&mut app, ctrl('o')), AppAction::Preview(1));
    }

    #[test]
    fn finishing_waits_for_one_more_key() {
        let dir = TempDir::new().expect("temp dir");
        let mut app = app(&dir, &["A"]);
        press(&mut app, key(KeyCode::Enter));
        press(&mut app, ctrl('a'));
        assert!(app.is_finished());
        assert_eq!(app.notice, Some(Notice::Completed));
        assert!(!app.should_quit());
        press(&mut app, key(KeyCode::Char('x')));
        assert!(app.should_quit());
    }
}
