use serde::Serialize;

use crate::view_model::{AppViewModel, FragmentRowView};
use crate::{FeatureReport, FragmentName, FragmentOutcome, FragmentRecord, FragmentStatus};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum BootPhase {
    #[default]
    NotStarted,
    Loading,
    Ready,
    FeaturesInitialized,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct LoadSummary {
    pub loaded: usize,
    pub failed: usize,
    pub total: usize,
}

/// Single-page-load boot state: the ordered fragment batch plus lifecycle flags.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppState {
    phase: BootPhase,
    fragments: Vec<(FragmentName, FragmentRecord)>,
    ready_signaled: bool,
    features_requested: bool,
    feature_report: Option<FeatureReport>,
    dirty: bool,
}

impl Default for AppState {
    fn default() -> Self {
        Self::new(FragmentName::default_manifest())
    }
}

impl AppState {
    /// Creates the state for one page load. Duplicate names keep their first position.
    pub fn new(manifest: Vec<FragmentName>) -> Self {
        let mut fragments: Vec<(FragmentName, FragmentRecord)> = Vec::with_capacity(manifest.len());
        for name in manifest {
            if fragments.iter().all(|(existing, _)| *existing != name) {
                fragments.push((name, FragmentRecord::default()));
            }
        }
        Self {
            phase: BootPhase::NotStarted,
            fragments,
            ready_signaled: false,
            features_requested: false,
            feature_report: None,
            dirty: false,
        }
    }

    pub fn phase(&self) -> BootPhase {
        self.phase
    }

    pub fn manifest(&self) -> Vec<FragmentName> {
        self.fragments.iter().map(|(name, _)| name.clone()).collect()
    }

    pub fn record(&self, name: &FragmentName) -> Option<&FragmentRecord> {
        self.fragments
            .iter()
            .find(|(existing, _)| existing == name)
            .map(|(_, record)| record)
    }

    pub fn feature_report(&self) -> Option<&FeatureReport> {
        self.feature_report.as_ref()
    }

    pub fn all_terminal(&self) -> bool {
        self.fragments
            .iter()
            .all(|(_, record)| record.status.is_terminal())
    }

    pub fn summary(&self) -> LoadSummary {
        let loaded = self.count(FragmentStatus::Loaded);
        let failed = self.count(FragmentStatus::Error);
        LoadSummary {
            loaded,
            failed,
            total: self.fragments.len(),
        }
    }

    pub fn view(&self) -> AppViewModel {
        let summary = self.summary();
        let headline = if self.phase == BootPhase::NotStarted || self.phase == BootPhase::Loading {
            format!("Loading {}/{} Components", summary.loaded + summary.failed, summary.total)
        } else if summary.failed == 0 {
            "All Components Loaded".to_string()
        } else {
            format!("{}/{} Components Loaded", summary.loaded, summary.total)
        };
        AppViewModel {
            phase: self.phase,
            fragments: self
                .fragments
                .iter()
                .map(|(name, record)| FragmentRowView {
                    name: name.clone(),
                    status: record.status,
                    error: record.error.clone(),
                    load_time_ms: record.load_time_ms,
                    size: record.size,
                })
                .collect(),
            loaded_count: summary.loaded,
            error_count: summary.failed,
            headline,
            dirty: self.dirty,
        }
    }

    /// Returns whether the view changed since the last call, and clears the flag.
    pub fn consume_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    pub(crate) fn begin_loading(&mut self) {
        self.phase = BootPhase::Loading;
        self.dirty = true;
    }

    pub(crate) fn mark_started(&mut self, name: &FragmentName) -> bool {
        let changed = self
            .record_mut(name)
            .map(FragmentRecord::start)
            .unwrap_or(false);
        self.dirty |= changed;
        changed
    }

    pub(crate) fn mark_finished(&mut self, name: &FragmentName, outcome: FragmentOutcome) -> bool {
        let changed = self
            .record_mut(name)
            .map(|record| record.finish(outcome))
            .unwrap_or(false);
        self.dirty |= changed;
        changed
    }

    /// Moves Loading to Ready once every fragment is terminal.
    /// Returns the summary only on the transition itself.
    pub(crate) fn try_settle(&mut self) -> Option<LoadSummary> {
        if self.phase != BootPhase::Loading || self.ready_signaled || !self.all_terminal() {
            return None;
        }
        self.phase = BootPhase::Ready;
        self.ready_signaled = true;
        self.dirty = true;
        Some(self.summary())
    }

    pub(crate) fn request_features(&mut self) -> bool {
        if self.phase != BootPhase::Ready || self.features_requested {
            return false;
        }
        self.features_requested = true;
        true
    }

    pub(crate) fn finish_features(&mut self, report: FeatureReport) {
        if !self.features_requested || self.phase != BootPhase::Ready {
            return;
        }
        self.phase = BootPhase::FeaturesInitialized;
        self.feature_report = Some(report);
        self.dirty = true;
    }

    fn record_mut(&mut self, name: &FragmentName) -> Option<&mut FragmentRecord> {
        self.fragments
            .iter_mut()
            .find(|(existing, _)| existing == name)
            .map(|(_, record)| record)
    }

    fn count(&self, status: FragmentStatus) -> usize {
        self.fragments
            .iter()
            .filter(|(_, record)| record.status == status)
            .count()
    }
}
