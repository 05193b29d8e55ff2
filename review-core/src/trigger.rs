//! Classification of raw host triggers.
//!
//! Hosts emit string tokens (button labels, key bindings). A fixed set of
//! tokens carry built-in meaning; every other token is a selection trigger
//! whose validity is only checked when the selection is committed.

use std::fmt;

pub const TOKEN_START: &str = "START";
pub const TOKEN_COMMIT: &str = "DONE, next image";
pub const TOKEN_NEXT: &str = "Next image";
pub const TOKEN_PREVIOUS: &str = "Previous image";
pub const TOKEN_DISCARD: &str = "DISCARD";
pub const TOKEN_MARK_NA: &str = "Set this pop NA";
pub const TOKEN_JUMP: &str = "-SAMPLENO-";
pub const TOKEN_OPEN_PREVIEW: &str = "Open pdf";
pub const TOKEN_EXIT: &str = "Exit";
pub const TOKEN_WINDOW_CLOSED: &str = "WIN_CLOSED";
pub const TOKEN_TOGGLE_NAV_KEYS: &str = "-NAVKEYS-";
pub const TOKEN_CLEAR_RECORD: &str = "Clear record";

/// Every token with built-in meaning.
pub const CONTEXT_TOKENS: &[&str] = &[
    TOKEN_START,
    TOKEN_COMMIT,
    TOKEN_NEXT,
    TOKEN_PREVIOUS,
    TOKEN_DISCARD,
    TOKEN_MARK_NA,
    TOKEN_JUMP,
    TOKEN_OPEN_PREVIEW,
    TOKEN_EXIT,
    TOKEN_WINDOW_CLOSED,
    TOKEN_TOGGLE_NAV_KEYS,
    TOKEN_CLEAR_RECORD,
];

pub fn is_context_token(token: &str) -> bool {
    CONTEXT_TOKENS.contains(&token)
}

/// A classified trigger.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Trigger {
    Start,
    Commit,
    NavigateForward,
    NavigateBackward,
    Discard,
    MarkNotApplicable,
    /// Manual sample-number entry, still unparsed.
    Jump(String),
    OpenPreview,
    Exit,
    ToggleNavKeys,
    ClearRecord,
    /// Anything else: a taxonomy trigger key.
    Selection(String),
}

/// Keys on the secondary navigation channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavKey {
    Forward,
    Backward,
}

impl Trigger {
    /// Classify a raw token. `value` carries the text of input fields and is
    /// only read for the jump token.
    pub fn classify(token: &str, value: Option<&str>) -> Self {
        match token {
            TOKEN_START => Trigger::Start,
            TOKEN_COMMIT => Trigger::Commit,
            TOKEN_NEXT => Trigger::NavigateForward,
            TOKEN_PREVIOUS => Trigger::NavigateBackward,
            TOKEN_DISCARD => Trigger::Discard,
            TOKEN_MARK_NA => Trigger::MarkNotApplicable,
            TOKEN_JUMP => Trigger::Jump(value.unwrap_or_default().to_string()),
            TOKEN_OPEN_PREVIEW => Trigger::OpenPreview,
            TOKEN_EXIT | TOKEN_WINDOW_CLOSED => Trigger::Exit,
            TOKEN_TOGGLE_NAV_KEYS => Trigger::ToggleNavKeys,
            TOKEN_CLEAR_RECORD => Trigger::ClearRecord,
            other => Trigger::Selection(other.to_string()),
        }
    }

    /// Map a secondary-channel key. Yields nothing while the channel is off.
    pub fn from_nav_key(key: NavKey, enabled: bool) -> Option<Self> {
        if !enabled {
            return None;
        }
        Some(match key {
            NavKey::Forward => Trigger::classify(TOKEN_NEXT, None),
            NavKey::Backward => Trigger::classify(TOKEN_PREVIOUS, None),
        })
    }

    pub fn is_context(&self) -> bool {
        !matches!(self, Trigger::Selection(_))
    }

    /// Token this trigger classifies from.
    pub fn token(&self) -> &str {
        match self {
            Trigger::Start => TOKEN_START,
            Trigger::Commit => TOKEN_COMMIT,
            Trigger::NavigateForward => TOKEN_NEXT,
            Trigger::NavigateBackward => TOKEN_PREVIOUS,
            Trigger::Discard => TOKEN_DISCARD,
            Trigger::MarkNotApplicable => TOKEN_MARK_NA,
            Trigger::Jump(_) => TOKEN_JUMP,
            Trigger::OpenPreview => TOKEN_OPEN_PREVIEW,
            Trigger::Exit => TOKEN_EXIT,
            Trigger::ToggleNavKeys => TOKEN_TOGGLE_NAV_KEYS,
            Trigger::ClearRecord => TOKEN_CLEAR_RECORD,
            Trigger::Selection(key) => key,
        }
    }
}

impl fmt::Display for Trigger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Trigger::Jump(value) => write!(f, "{TOKEN_JUMP}({value})"),
            other => f.write_str(other.token()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn context_tokens_round_trip_through_classify() {
        for token in CONTEXT_TOKENS {
            let trigger = Trigger::classify(token, Some("3"));
            assert!(trigger.is_context(), "{token} should be context");
        }
    }

    #[test]
    fn window_close_is_exit() {
        assert_eq!(
            Trigger::classify(TOKEN_WINDOW_CLOSED, None),
            Trigger::Exit
        );
    }

    #[test]
    fn unknown_tokens_are_selections() {
        assert_eq!(
            Trigger::classify("PBMC-FSC 70k", None),
            Trigger::Selection("PBMC-FSC 70k".to_string())
        );
        assert!(!Trigger::classify("whatever", None).is_context());
    }

    #[test]
    fn jump_carries_raw_value() {
        assert_eq!(
            Trigger::classify(TOKEN_JUMP, Some("12")),
            Trigger::Jump("12".to_string())
        );
        assert_eq!(
            Trigger::classify(TOKEN_JUMP, None),
            Trigger::Jump(String::new())
        );
    }

    #[test]
    fn nav_keys_match_primary_channel() {
        assert_eq!(
            Trigger::from_nav_key(NavKey::Forward, true),
            Some(Trigger::classify(TOKEN_NEXT, None))
        );
        assert_eq!(
            Trigger::from_nav_key(NavKey::Backward, true),
            Some(Trigger::NavigateBackward)
        );
        assert_eq!(Trigger::from_nav_key(NavKey::Forward, false), None);
    }
}
