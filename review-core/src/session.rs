//! Review session state machine.
//!
//! A session consumes classified [`Trigger`]s one at a time and reduces them
//! into correction-store writes and cursor moves. Each trigger is handled to
//! completion, store reads and writes included, before the next is accepted.
//!
//! ```text
//!   Idle --start--> Reviewing --(commit|forward|discard|NA past last)--> Terminal
//!    |                 |  ^
//!    |                 +--+ selection / invalid commit / back / jump / preview / clear
//!    +------------------- exit (any state) ------------------------> Terminal
//! ```
//!
//! The host owns everything visual: it renders the sample the session points
//! at, shows [`Notice`]s and answers [`ConfirmRequest`]s.

use std::fmt;

use crate::error::{Result, ReviewError};
use crate::navigation::{seek_backward, seek_forward};
use crate::samples::{Sample, SampleList};
use crate::store::{CorrectionStore, DISCARD_DESCRIPTOR, DISCARD_GATE, NA_DESCRIPTOR};
use crate::taxonomy::{SelectionError, Taxonomy, apply_custom_values};
use crate::trigger::Trigger;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Nothing displayed yet.
    Idle,
    /// A sample is displayed and accepting selections.
    Reviewing,
    /// Samples exhausted or the user exited.
    Terminal,
}

/// User-visible messages that do not change session state by themselves.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    InvalidSelection { reason: String },
    FirstSample,
    NotStarted,
    MissingDocument { sample_id: String },
    Completed,
    RecordCleared { sample_id: String },
    DiscardDeclined,
    CustomValuesApplied,
}

impl Notice {
    pub fn title(&self) -> &'static str {
        match self {
            Notice::InvalidSelection { .. } => "Invalid selection",
            Notice::FirstSample => "First sample",
            Notice::NotStarted => "Not started",
            Notice::MissingDocument { .. } => "Missing document",
            Notice::Completed => "Complete",
            Notice::RecordCleared { .. } => "Record cleared",
            Notice::DiscardDeclined => "Discard cancelled",
            Notice::CustomValuesApplied => "Custom values",
        }
    }
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Notice::InvalidSelection { reason } => write!(
                f,
                "Invalid selection, more than one in each category is not allowed.\n\
                 Select at most one descriptor per category and any number of custom \
                 descriptors.\n{reason}"
            ),
            Notice::FirstSample => f.write_str("Already at the first sample."),
            Notice::NotStarted => f.write_str("Press START to begin reviewing."),
            Notice::MissingDocument { sample_id } => {
                write!(f, "No document file found for the sample {sample_id}.")
            }
            Notice::Completed => f.write_str("All samples in the folder have been processed!"),
            Notice::RecordCleared { sample_id } => {
                write!(f, "Cleared the record of {sample_id} for this gate.")
            }
            Notice::DiscardDeclined => f.write_str("Sample was not discarded."),
            Notice::CustomValuesApplied => f.write_str("Custom slot values applied."),
        }
    }
}

/// Actions that need a yes/no from the user before they write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfirmRequest {
    Discard { sample_id: String },
    ClearRecord { sample_id: String, gate_name: String },
}

impl ConfirmRequest {
    pub fn prompt(&self) -> String {
        match self {
            ConfirmRequest::Discard { sample_id } => format!(
                "Discard {sample_id}? It will be skipped by navigation from now on."
            ),
            ConfirmRequest::ClearRecord {
                sample_id,
                gate_name,
            } => format!("Clear every correction of {sample_id} under gate {gate_name:?}?"),
        }
    }
}

/// Answers confirmation requests. Anything but an explicit yes declines.
pub trait Confirm {
    fn confirm(&mut self, request: &ConfirmRequest) -> bool;
}

impl<F> Confirm for F
where
    F: FnMut(&ConfirmRequest) -> bool,
{
    fn confirm(&mut self, request: &ConfirmRequest) -> bool {
        self(request)
    }
}

/// What the host should do after a trigger was handled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Show the sample at `index` as a fresh display.
    Display { index: usize },
    /// The pending selection changed; same sample.
    SelectionChanged,
    /// Nothing visible changed.
    Unchanged,
    Notice(Notice),
    /// Open the page viewer over the sample at `index`.
    Preview { index: usize },
    NavKeysToggled { enabled: bool },
    /// All samples exhausted.
    Finished,
    Exit,
}

/// Session-wide switches resolved from configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionOptions {
    pub confirm_discard: bool,
    pub confirm_clear: bool,
    pub nav_keys_enabled: bool,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            confirm_discard: true,
            confirm_clear: true,
            nav_keys_enabled: true,
        }
    }
}

/// Trigger keys chosen for the current sample since the last reset.
///
/// Keeps first-selection order and ignores repeats.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PendingSelection {
    keys: Vec<String>,
}

impl PendingSelection {
    /// Returns false if `key` was already pending.
    pub fn push(&mut self, key: impl Into<String>) -> bool {
        let key = key.into();
        if self.keys.contains(&key) {
            return false;
        }
        self.keys.push(key);
        true
    }

    pub fn clear(&mut self) {
        self.keys.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.keys.iter().map(String::as_str)
    }
}

pub struct Session {
    taxonomy: Taxonomy,
    gate_name: String,
    samples: SampleList,
    store: CorrectionStore,
    options: SessionOptions,
    cursor: usize,
    state: SessionState,
    pending: PendingSelection,
}

impl Session {
    pub fn new(
        taxonomy: Taxonomy,
        gate_name: impl Into<String>,
        samples: SampleList,
        store: CorrectionStore,
        options: SessionOptions,
    ) -> Self {
        Self {
            taxonomy,
            gate_name: gate_name.into(),
            samples,
            store,
            options,
            cursor: 0,
            state: SessionState::Idle,
            pending: PendingSelection::default(),
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn gate_name(&self) -> &str {
        &self.gate_name
    }

    pub fn taxonomy(&self) -> &Taxonomy {
        &self.taxonomy
    }

    pub fn samples(&self) -> &SampleList {
        &self.samples
    }

    pub fn store(&self) -> &CorrectionStore {
        &self.store
    }

    pub fn pending(&self) -> &PendingSelection {
        &self.pending
    }

    pub fn nav_keys_enabled(&self) -> bool {
        self.options.nav_keys_enabled
    }

    /// Sample under the cursor while reviewing.
    pub fn current_sample(&self) -> Option<&Sample> {
        match self.state {
            SessionState::Reviewing => self.samples.get(self.cursor).ok(),
            SessionState::Idle | SessionState::Terminal => None,
        }
    }

    /// Drop the pending selection. Hosts call this whenever the displayed
    /// sample changes outside forward/backward stepping, e.g. after a jump.
    pub fn clear_pending(&mut self) {
        self.pending.clear();
    }

    /// Swap the taxonomy used by later commits.
    ///
    /// Records already written keep their descriptors. The pending selection
    /// is kept and validated against the new taxonomy on commit.
    pub fn replace_taxonomy(&mut self, taxonomy: Taxonomy) {
        self.taxonomy = taxonomy;
    }

    /// Rebind the custom slots. Blank values keep the slot's binding.
    pub fn apply_custom_values(&mut self, values: [&str; 3]) -> Outcome {
        let taxonomy = apply_custom_values(&self.taxonomy, values);
        self.replace_taxonomy(taxonomy);
        tracing::info!("Custom slot values applied");
        Outcome::Notice(Notice::CustomValuesApplied)
    }

    /// Handle one trigger to completion.
    pub fn handle(&mut self, trigger: Trigger, confirm: &mut dyn Confirm) -> Result<Outcome> {
        tracing::debug!(trigger = %trigger, state = ?self.state, cursor = self.cursor, "Trigger");
        match (self.state, trigger) {
            (_, Trigger::Exit) => {
                tracing::info!("Exit requested at cursor {}", self.cursor);
                self.state = SessionState::Terminal;
                Ok(Outcome::Exit)
            }
            (_, Trigger::ToggleNavKeys) => {
                self.options.nav_keys_enabled = !self.options.nav_keys_enabled;
                Ok(Outcome::NavKeysToggled {
                    enabled: self.options.nav_keys_enabled,
                })
            }
            (SessionState::Terminal, _) => Ok(Outcome::Finished),

            (SessionState::Idle, Trigger::Start) => self.start(),
            (SessionState::Idle, Trigger::Jump(raw)) => {
                self.jump(&raw);
                Ok(Outcome::Unchanged)
            }
            (SessionState::Idle, _) => Ok(Outcome::Notice(Notice::NotStarted)),

            (SessionState::Reviewing, Trigger::Start) => {
                self.pending.clear();
                self.start()
            }
            (SessionState::Reviewing, Trigger::Selection(key)) => {
                self.pending.push(key);
                Ok(Outcome::SelectionChanged)
            }
            (SessionState::Reviewing, Trigger::Commit) => self.commit(),
            (SessionState::Reviewing, Trigger::NavigateForward) => {
                self.pending.clear();
                self.advance()
            }
            (SessionState::Reviewing, Trigger::NavigateBackward) => self.retreat(),
            (SessionState::Reviewing, Trigger::Discard) => self.discard(confirm),
            (SessionState::Reviewing, Trigger::MarkNotApplicable) => self.mark_not_applicable(),
            (SessionState::Reviewing, Trigger::Jump(raw)) => {
                if self.jump(&raw) {
                    Ok(Outcome::Display { index: self.cursor })
                } else {
                    Ok(Outcome::Unchanged)
                }
            }
            (SessionState::Reviewing, Trigger::OpenPreview) => {
                Ok(Outcome::Preview { index: self.cursor })
            }
            (SessionState::Reviewing, Trigger::ClearRecord) => self.clear_record(confirm),
        }
    }

    fn current_id(&self) -> Result<String> {
        if self.state != SessionState::Reviewing {
            return Err(ReviewError::NotReviewing);
        }
        self.samples.sample_at(self.cursor).map(str::to_string)
    }

    /// Display the first non-discarded sample at or after the cursor.
    fn start(&mut self) -> Result<Outcome> {
        let from = self.cursor;
        self.settle_forward(from)
    }

    /// Step past the current sample, skipping discarded ones.
    fn advance(&mut self) -> Result<Outcome> {
        let from = self.cursor + 1;
        self.settle_forward(from)
    }

    fn settle_forward(&mut self, from: usize) -> Result<Outcome> {
        let samples = &self.samples;
        let store = &self.store;
        match seek_forward(from, samples.size(), |i| samples.is_discarded(i, store))? {
            Some(index) => {
                self.cursor = index;
                self.state = SessionState::Reviewing;
                tracing::debug!(cursor = index, "Displaying sample");
                Ok(Outcome::Display { index })
            }
            None => {
                self.cursor = self.samples.size();
                self.state = SessionState::Terminal;
                tracing::info!("All samples processed");
                Ok(Outcome::Finished)
            }
        }
    }

    fn retreat(&mut self) -> Result<Outcome> {
        let samples = &self.samples;
        let store = &self.store;
        match seek_backward(self.cursor, |i| samples.is_discarded(i, store))? {
            Some(index) => {
                self.cursor = index;
                self.pending.clear();
                Ok(Outcome::Display { index })
            }
            None => Ok(Outcome::Notice(Notice::FirstSample)),
        }
    }

    /// Returns true if the cursor moved to a parsed, in-range index.
    fn jump(&mut self, raw: &str) -> bool {
        match raw.trim().parse::<usize>() {
            Ok(index) if index < self.samples.size() => {
                self.cursor = index;
                tracing::debug!(cursor = index, "Jumped");
                true
            }
            _ => {
                tracing::debug!(input = raw, "Ignoring jump to invalid sample number");
                false
            }
        }
    }

    fn commit(&mut self) -> Result<Outcome> {
        let descriptors = match self.taxonomy.validate(self.pending.iter()) {
            Ok(descriptors) => descriptors,
            Err(err) => {
                tracing::warn!("Rejected selection: {err}");
                self.pending.clear();
                return Ok(Outcome::Notice(invalid_selection(&err)));
            }
        };

        let sample_id = self.current_id()?;
        if self.store.contains(&sample_id, &self.gate_name)? {
            self.store.remove(&sample_id, &self.gate_name)?;
        }
        self.store.add(&self.gate_name, &descriptors, &sample_id)?;
        tracing::info!(
            sample = %sample_id,
            gate = %self.gate_name,
            "Committed {:?}",
            descriptors
        );
        self.pending.clear();
        self.advance()
    }

    fn discard(&mut self, confirm: &mut dyn Confirm) -> Result<Outcome> {
        let sample_id = self.current_id()?;
        if self.options.confirm_discard {
            let request = ConfirmRequest::Discard {
                sample_id: sample_id.clone(),
            };
            if !confirm.confirm(&request) {
                return Ok(Outcome::Notice(Notice::DiscardDeclined));
            }
        }
        self.store
            .add(DISCARD_GATE, &[DISCARD_DESCRIPTOR], &sample_id)?;
        tracing::info!(sample = %sample_id, "Discarded");
        self.pending.clear();
        self.advance()
    }

    fn mark_not_applicable(&mut self) -> Result<Outcome> {
        let sample_id = self.current_id()?;
        if self.store.contains(&sample_id, &self.gate_name)? {
            self.store.remove(&sample_id, &self.gate_name)?;
        }
        self.store
            .add(&self.gate_name, &[NA_DESCRIPTOR], &sample_id)?;
        tracing::info!(sample = %sample_id, gate = %self.gate_name, "Marked not applicable");
        self.pending.clear();
        self.advance()
    }

    fn clear_record(&mut self, confirm: &mut dyn Confirm) -> Result<Outcome> {
        let sample_id = self.current_id()?;
        if self.options.confirm_clear {
            let request = ConfirmRequest::ClearRecord {
                sample_id: sample_id.clone(),
                gate_name: self.gate_name.clone(),
            };
            if !confirm.confirm(&request) {
                return Ok(Outcome::Unchanged);
            }
        }
        self.store.remove(&sample_id, &self.gate_name)?;
        tracing::info!(sample = %sample_id, gate = %self.gate_name, "Cleared record");
        Ok(Outcome::Notice(Notice::RecordCleared { sample_id }))
    }
}

fn invalid_selection(err: &SelectionError) -> Notice {
    Notice::InvalidSelection {
        reason: err.to_string(),
    }
}
