use portfolio_core::AppViewModel;
use portfolio_engine::LoadEvent;

/// Status panel as printable lines: headline first, then one row per fragment.
pub fn status_lines(view: &AppViewModel) -> Vec<String> {
    let mut lines = Vec::with_capacity(view.fragments.len() + 1);
    lines.push(format!(
        "{} ({} loaded, {} errors)",
        view.headline, view.loaded_count, view.error_count
    ));
    lines.extend(view.fragments.iter().map(|row| format!("  {}", row.status_line())));
    lines
}

/// One progress line per load event.
pub fn progress_line(event: &LoadEvent) -> String {
    match event {
        LoadEvent::Started { name } => format!("{name}: Loading..."),
        LoadEvent::Finished { name, result: Ok(info) } => format!(
            "{name}: Loaded ({}ms, {} bytes, {})",
            info.load_time_ms, info.size, info.fingerprint
        ),
        LoadEvent::Finished { name, result: Err(err) } => format!("{name}: {err}"),
        LoadEvent::Ready(summary) => format!(
            "Ready: {}/{} loaded, {} failed",
            summary.loaded, summary.total, summary.failed
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use portfolio_core::{update, AppState, FragmentName, FragmentOutcome, LoadSummary, Msg};
    use portfolio_engine::LoadError;
    use pretty_assertions::assert_eq;

    #[test]
    fn status_lines_list_every_fragment() {
        let header = FragmentName::new("header").unwrap();
        let hero = FragmentName::new("hero").unwrap();
        let state = AppState::new(vec![header.clone(), hero.clone()]);
        let (state, _) = update(state, Msg::DocumentReady);
        let (state, _) = update(
            state,
            Msg::FragmentFinished {
                name: header,
                outcome: FragmentOutcome::Loaded {
                    load_time_ms: 12,
                    size: 40,
                },
            },
        );
        let (state, _) = update(
            state,
            Msg::FragmentFinished {
                name: hero,
                outcome: FragmentOutcome::Failed {
                    error: "empty component file".to_string(),
                },
            },
        );

        assert_eq!(
            status_lines(&state.view()),
            vec![
                "1/2 Components Loaded (1 loaded, 1 errors)".to_string(),
                "  header: Loaded (12ms)".to_string(),
                "  hero: empty component file".to_string(),
            ]
        );
    }

    #[test]
    fn progress_lines_describe_events() {
        let name = FragmentName::new("footer").unwrap();
        assert_eq!(
            progress_line(&LoadEvent::Finished {
                name,
                result: Err(LoadError::EmptyFragment)
            }),
            "footer: empty component file"
        );
        assert_eq!(
            progress_line(&LoadEvent::Ready(LoadSummary {
                loaded: 9,
                failed: 1,
                total: 10
            })),
            "Ready: 9/10 loaded, 1 failed"
        );
    }
}
