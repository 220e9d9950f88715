use crate::{AppState, BootPhase, Effect, Msg};

/// Pure update function: applies a message to state and returns any effects.
pub fn update(mut state: AppState, msg: Msg) -> (AppState, Vec<Effect>) {
    let effects = match msg {
        Msg::DocumentReady => {
            if state.phase() != BootPhase::NotStarted {
                return (state, Vec::new());
            }
            state.begin_loading();
            let names = state.manifest();
            if names.is_empty() {
                // Nothing to wait for: the barrier settles immediately.
                settle(&mut state)
            } else {
                vec![Effect::LoadFragments { names }]
            }
        }
        Msg::FragmentStarted { name } => {
            if state.phase() == BootPhase::Loading {
                state.mark_started(&name);
            }
            Vec::new()
        }
        Msg::FragmentFinished { name, outcome } => {
            if state.phase() != BootPhase::Loading {
                return (state, Vec::new());
            }
            state.mark_finished(&name, outcome);
            settle(&mut state)
        }
        Msg::ReadinessObserved => {
            if state.request_features() {
                vec![Effect::InitializeFeatures]
            } else {
                Vec::new()
            }
        }
        Msg::FeaturesInitialized(report) => {
            state.finish_features(report);
            Vec::new()
        }
    };

    (state, effects)
}

fn settle(state: &mut AppState) -> Vec<Effect> {
    match state.try_settle() {
        Some(summary) => vec![Effect::SignalReady { summary }],
        None => Vec::new(),
    }
}
