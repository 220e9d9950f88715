use portfolio_core::{
    update, AppState, BootPhase, FragmentName, FragmentOutcome, FragmentStatus, Msg,
};
use pretty_assertions::assert_eq;

fn manifest() -> Vec<FragmentName> {
    FragmentName::parse_manifest(["header", "hero", "about"]).unwrap()
}

fn name(raw: &str) -> FragmentName {
    FragmentName::new(raw).unwrap()
}

#[test]
fn records_start_pending_and_end_terminal() {
    let state = AppState::new(manifest());
    for fragment in manifest() {
        assert_eq!(state.record(&fragment).unwrap().status, FragmentStatus::Pending);
    }

    let (mut state, _) = update(state, Msg::DocumentReady);
    for fragment in manifest() {
        let (next, _) = update(state, Msg::FragmentStarted { name: fragment.clone() });
        assert_eq!(next.record(&fragment).unwrap().status, FragmentStatus::Loading);
        state = next;
    }

    let (state, _) = update(
        state,
        Msg::FragmentFinished {
            name: name("header"),
            outcome: FragmentOutcome::Loaded {
                load_time_ms: 10,
                size: 11,
            },
        },
    );
    let (state, _) = update(
        state,
        Msg::FragmentFinished {
            name: name("hero"),
            outcome: FragmentOutcome::Failed {
                error: "http status 500".to_string(),
            },
        },
    );
    let (state, _) = update(
        state,
        Msg::FragmentFinished {
            name: name("about"),
            outcome: FragmentOutcome::Loaded {
                load_time_ms: 7,
                size: 3,
            },
        },
    );

    assert!(state.all_terminal());
    for fragment in manifest() {
        let status = state.record(&fragment).unwrap().status;
        assert!(status == FragmentStatus::Loaded || status == FragmentStatus::Error);
    }

    // The hero failure leaves the other records untouched.
    let header = state.record(&name("header")).unwrap();
    assert_eq!(header.status, FragmentStatus::Loaded);
    assert_eq!(header.size, Some(11));
    let about = state.record(&name("about")).unwrap();
    assert_eq!(about.status, FragmentStatus::Loaded);
    let hero = state.record(&name("hero")).unwrap();
    assert_eq!(hero.error.as_deref(), Some("http status 500"));
}

#[test]
fn missing_placeholder_fails_straight_from_pending() {
    let (state, _) = update(AppState::new(vec![name("header")]), Msg::DocumentReady);
    let (state, _) = update(
        state,
        Msg::FragmentFinished {
            name: name("header"),
            outcome: FragmentOutcome::Failed {
                error: "placeholder missing".to_string(),
            },
        },
    );

    assert_eq!(state.phase(), BootPhase::Ready);
    assert_eq!(state.record(&name("header")).unwrap().status, FragmentStatus::Error);
}

#[test]
fn started_after_terminal_is_ignored() {
    let (state, _) = update(AppState::new(vec![name("header")]), Msg::DocumentReady);
    let (state, _) = update(
        state,
        Msg::FragmentFinished {
            name: name("header"),
            outcome: FragmentOutcome::Failed {
                error: "boom".to_string(),
            },
        },
    );
    let (state, _) = update(state, Msg::FragmentStarted { name: name("header") });

    assert_eq!(state.record(&name("header")).unwrap().status, FragmentStatus::Error);
}

#[test]
fn view_reports_counts_and_headline() {
    let (state, _) = update(AppState::new(manifest()), Msg::DocumentReady);
    let (state, _) = update(
        state,
        Msg::FragmentFinished {
            name: name("header"),
            outcome: FragmentOutcome::Loaded {
                load_time_ms: 12,
                size: 5,
            },
        },
    );
    assert_eq!(state.view().headline, "Loading 1/3 Components");

    let (state, _) = update(
        state,
        Msg::FragmentFinished {
            name: name("hero"),
            outcome: FragmentOutcome::Failed {
                error: "Empty component file".to_string(),
            },
        },
    );
    let (mut state, _) = update(
        state,
        Msg::FragmentFinished {
            name: name("about"),
            outcome: FragmentOutcome::Loaded {
                load_time_ms: 2,
                size: 9,
            },
        },
    );

    let view = state.view();
    assert_eq!(view.loaded_count, 2);
    assert_eq!(view.error_count, 1);
    assert_eq!(view.headline, "2/3 Components Loaded");
    let lines: Vec<String> = view.fragments.iter().map(|row| row.status_line()).collect();
    assert_eq!(
        lines,
        vec![
            "header: Loaded (12ms)".to_string(),
            "hero: Empty component file".to_string(),
            "about: Loaded (2ms)".to_string(),
        ]
    );
    assert!(state.consume_dirty());
    assert!(!state.consume_dirty());
}

#[test]
fn duplicate_manifest_entries_collapse() {
    let state = AppState::new(FragmentName::parse_manifest(["header", "hero", "header"]).unwrap());
    assert_eq!(state.manifest(), vec![name("header"), name("hero")]);
}
