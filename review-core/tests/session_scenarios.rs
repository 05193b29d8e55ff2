//! End-to-end review sessions against a real store file.

use gatereview_core::store::{DISCARD_DESCRIPTOR, DISCARD_GATE};
use gatereview_core::{
    ConfirmRequest, CorrectionStore, Outcome, SampleList, Session, SessionOptions, SessionState,
    Taxonomy, Trigger,
};
use pretty_assertions::assert_eq;
use tempfile::TempDir;

struct Harness {
    _dir: TempDir,
    session: Session,
    confirmations: Vec<ConfirmRequest>,
}

impl Harness {
    fn new(ids: &[&str], bindings: &[(&str, &str)]) -> Self {
        let dir = TempDir::new().expect("temp dir");
        let store =
            CorrectionStore::open(dir.path().join("output").join("correction.yaml")).expect("store");
        let session = Session::new(
            Taxonomy::new(bindings.iter().copied()),
            "g",
            SampleList::from_ids(dir.path(), ids.iter().copied()),
            store,
            SessionOptions::default(),
        );
        Self {
            _dir: dir,
            session,
            confirmations: Vec::new(),
        }
    }

    fn send(&mut self, trigger: Trigger) -> Outcome {
        let confirmations = &mut self.confirmations;
        let mut accept = |request: &ConfirmRequest| {
            confirmations.push(request.clone());
            true
        };
        self.session
            .handle(trigger, &mut accept)
            .expect("trigger handled")
    }

    fn select(&mut self, key: &str) {
        assert_eq!(
            self.send(Trigger::Selection(key.to_string())),
            Outcome::SelectionChanged
        );
    }

    fn members(&self, gate: &str, descriptor: &str) -> Vec<String> {
        let record = self.session.store().load().expect("load");
        record
            .get(gate)
            .and_then(|g| g.get(descriptor))
            .map(|members| members.iter().cloned().collect())
            .unwrap_or_default()
    }
}

#[test]
fn recommit_replaces_instead_of_merging() {
    let mut h = Harness::new(&["A", "B", "C"], &[("x", "CAT1_foo"), ("y", "CAT1_bar")]);
    assert_eq!(h.send(Trigger::Start), Outcome::Display { index: 0 });

    h.select("x");
    assert_eq!(h.send(Trigger::Commit), Outcome::Display { index: 1 });
    assert_eq!(h.members("g", "CAT1_foo"), vec!["A"]);
    assert_eq!(h.session.cursor(), 1);

    assert_eq!(h.send(Trigger::NavigateBackward), Outcome::Display { index: 0 });
    h.select("y");
    h.send(Trigger::Commit);

    assert!(h.members("g", "CAT1_foo").is_empty());
    assert_eq!(h.members("g", "CAT1_bar"), vec!["A"]);
}

#[test]
fn same_category_selection_is_rejected() {
    let mut h = Harness::new(&["A", "B"], &[("x1", "CAT1_foo"), ("x2", "CAT1_baz")]);
    h.send(Trigger::Start);
    h.select("x1");
    h.select("x2");

    let outcome = h.send(Trigger::Commit);
    let Outcome::Notice(notice) = outcome else {
        panic!("expected a notice, got {outcome:?}");
    };
    assert!(notice.to_string().starts_with("Invalid selection"));
    assert!(h.session.store().load().expect("load").is_empty());
    assert!(h.session.pending().is_empty());
    assert_eq!(h.session.cursor(), 0);
}

#[test]
fn discarded_sample_is_skipped_both_ways() {
    let mut h = Harness::new(&["A", "B", "C"], &[("x", "CAT1_foo")]);
    h.send(Trigger::Start);
    h.send(Trigger::NavigateForward);
    assert_eq!(h.session.cursor(), 1);

    assert_eq!(h.send(Trigger::Discard), Outcome::Display { index: 2 });
    assert_eq!(h.confirmations.len(), 1);
    assert_eq!(h.members(DISCARD_GATE, DISCARD_DESCRIPTOR), vec!["B"]);

    assert_eq!(h.send(Trigger::NavigateBackward), Outcome::Display { index: 0 });
    assert_eq!(h.send(Trigger::NavigateForward), Outcome::Display { index: 2 });
}

#[test]
fn non_numeric_jump_keeps_display() {
    let mut h = Harness::new(&["A", "B", "C"], &[]);
    h.send(Trigger::Start);
    h.send(Trigger::NavigateForward);
    assert_eq!(h.send(Trigger::Jump("abc".into())), Outcome::Unchanged);
    assert_eq!(h.session.cursor(), 1);
    assert_eq!(h.send(Trigger::Jump("9".into())), Outcome::Unchanged);
    assert_eq!(h.session.cursor(), 1);
    assert_eq!(h.send(Trigger::Jump("0".into())), Outcome::Display { index: 0 });
}

#[test]
fn forward_navigation_writes_nothing() {
    let mut h = Harness::new(&["A", "B"], &[("x", "CAT1_foo")]);
    h.send(Trigger::Start);
    h.select("x");
    assert_eq!(h.send(Trigger::NavigateForward), Outcome::Display { index: 1 });
    assert!(h.session.pending().is_empty());
    assert!(h.session.store().load().expect("load").is_empty());
}

#[test]
fn commit_on_last_sample_terminates() {
    let mut h = Harness::new(&["A"], &[("x", "CAT1_foo")]);
    h.send(Trigger::Start);
    h.select("x");
    assert_eq!(h.send(Trigger::Commit), Outcome::Finished);
    assert_eq!(h.session.state(), SessionState::Terminal);
    assert_eq!(h.members("g", "CAT1_foo"), vec!["A"]);
}

#[test]
fn custom_triggers_may_share_category() {
    let mut h = Harness::new(
        &["A", "B"],
        &[("x", "CAT1_foo"), ("Custom 1", "CUSTOM_left")],
    );
    h.send(Trigger::Start);
    h.select("x");
    h.select("Custom 1");
    h.select("Custom 2");
    assert_eq!(h.send(Trigger::Commit), Outcome::Display { index: 1 });
    assert_eq!(
        h.session.store().summarize("A").expect("summary"),
        "g: CAT1_foo\ng: CUSTOM_2\ng: CUSTOM_left"
    );
}

#[test]
fn backward_at_first_sample_keeps_pending() {
    let mut h = Harness::new(&["A", "B"], &[("x", "CAT1_foo")]);
    h.send(Trigger::Start);
    h.select("x");
    let outcome = h.send(Trigger::NavigateBackward);
    assert!(matches!(outcome, Outcome::Notice(_)));
    assert_eq!(h.session.cursor(), 0);
    assert_eq!(h.session.pending().len(), 1);
}

#[test]
fn session_resumes_from_existing_store() {
    let dir = TempDir::new().expect("temp dir");
    let path = dir.path().join("correction.yaml");
    {
        let store = CorrectionStore::open(&path).expect("store");
        store
            .add(DISCARD_GATE, &[DISCARD_DESCRIPTOR], "A")
            .expect("discard");
    }
    let mut session = Session::new(
        Taxonomy::new(Vec::<(String, String)>::new()),
        "g",
        SampleList::from_ids(dir.path(), ["A", "B"]),
        CorrectionStore::open(&path).expect("reopen"),
        SessionOptions::default(),
    );
    let mut deny = |_: &ConfirmRequest| false;
    assert_eq!(
        session.handle(Trigger::Start, &mut deny).expect("start"),
        Outcome::Display { index: 1 }
    );
}
