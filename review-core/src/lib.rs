//! Gated sample review.
//!
//! A reviewer steps through a folder of documents one sample at a time and
//! attaches categorical descriptors to each one under a named gate. The
//! decisions land in a YAML correction store that later pipeline stages read.
//!
//! This crate holds everything that does not touch a terminal: the taxonomy,
//! the correction store, the sample list, the session state machine, layout
//! loading and configuration.

#![deny(clippy::print_stdout, clippy::print_stderr)]

pub mod config;
pub mod error;
pub mod layout;
pub mod navigation;
pub mod samples;
pub mod session;
pub mod store;
pub mod taxonomy;
pub mod trigger;

pub use error::{Result, ReviewError};
pub use layout::Layout;
pub use samples::{Sample, SampleList};
pub use session::{
    Confirm, ConfirmRequest, Notice, Outcome, PendingSelection, Session, SessionOptions,
    SessionState,
};
pub use store::CorrectionStore;
pub use taxonomy::Taxonomy;
pub use trigger::{NavKey, Trigger};

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
