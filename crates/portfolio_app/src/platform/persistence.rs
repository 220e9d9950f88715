use std::path::Path;

use page_logging::page_info;
use portfolio_core::{AppViewModel, FeatureReport};
use portfolio_engine::{AtomicFileWriter, DeliveryStats, PersistError};
use serde::Serialize;

/// Machine-readable record of one page assembly.
#[derive(Debug, Clone, Serialize)]
pub(crate) struct StatusReport<'a> {
    pub generated_utc: String,
    pub source: String,
    #[serde(flatten)]
    pub view: &'a AppViewModel,
    pub features_installed: &'a [String],
    pub features_failed: &'a [String],
    pub analytics_delivered: u64,
    pub analytics_dropped: u64,
}

impl<'a> StatusReport<'a> {
    pub fn new(
        generated_utc: String,
        source: String,
        view: &'a AppViewModel,
        features: Option<&'a FeatureReport>,
        analytics: DeliveryStats,
    ) -> Self {
        let (installed, failed): (&[String], &[String]) = match features {
            Some(report) => (&report.installed, &report.failed),
            None => (&[], &[]),
        };
        Self {
            generated_utc,
            source,
            view,
            features_installed: installed,
            features_failed: failed,
            analytics_delivered: analytics.delivered,
            analytics_dropped: analytics.dropped,
        }
    }
}

pub(crate) fn save_page(path: &Path, html: &str) -> Result<(), PersistError> {
    AtomicFileWriter::new(path).write(html)?;
    page_info!("Wrote assembled page to {:?} ({} bytes)", path, html.len());
    Ok(())
}

pub(crate) fn save_status(path: &Path, report: &StatusReport<'_>) -> Result<(), PersistError> {
    let content = serde_json::to_string_pretty(report)
        .map_err(|err| PersistError::Serialize(err.to_string()))?;
    AtomicFileWriter::new(path).write(&content)?;
    page_info!("Wrote status report to {:?}", path);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use portfolio_core::{update, AppState, FragmentName, Msg};
    use tempfile::TempDir;

    #[test]
    fn status_report_is_flat_json() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("out").join("status.json");
        let state = AppState::new(vec![FragmentName::new("header").unwrap()]);
        let (state, _) = update(state, Msg::DocumentReady);
        let view = state.view();
        let features = FeatureReport {
            installed: vec!["theme_toggle".to_string()],
            failed: vec!["project_modal".to_string()],
        };

        let report = StatusReport::new(
            "2026-01-01T00:00:00Z".to_string(),
            "http://localhost:8000/".to_string(),
            &view,
            Some(&features),
            DeliveryStats::default(),
        );
        save_status(&path, &report).unwrap();

        let written: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(written["headline"], "Loading 0/1 Components");
        assert_eq!(written["phase"], "Loading");
        assert_eq!(written["fragments"][0]["name"], "header");
        assert_eq!(written["features_failed"][0], "project_modal");
        assert!(written.get("dirty").is_none());
    }

    #[test]
    fn page_is_written_whole() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("index.html");
        save_page(&path, "<html></html>").unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "<html></html>");
    }
}
