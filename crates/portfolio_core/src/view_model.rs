use serde::Serialize;

use crate::{BootPhase, FragmentName, FragmentStatus};

/// Snapshot of the load status panel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AppViewModel {
    pub phase: BootPhase,
    pub fragments: Vec<FragmentRowView>,
    pub loaded_count: usize,
    pub error_count: usize,
    pub headline: String,
    #[serde(skip)]
    pub dirty: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FragmentRowView {
    pub name: FragmentName,
    pub status: FragmentStatus,
    pub error: Option<String>,
    pub load_time_ms: Option<u64>,
    pub size: Option<usize>,
}

impl FragmentRowView {
    /// One-line rendering used by the status panel and the CLI summary.
    pub fn status_line(&self) -> String {
        match self.status {
            FragmentStatus::Pending => format!("{}: Pending", self.name),
            FragmentStatus::Loading => format!("{}: Loading...", self.name),
            FragmentStatus::Loaded => match self.load_time_ms {
                Some(ms) => format!("{}: Loaded ({ms}ms)", self.name),
                None => format!("{}: Loaded", self.name),
            },
            FragmentStatus::Error => format!(
                "{}: {}",
                self.name,
                self.error.as_deref().unwrap_or("Unknown error")
            ),
        }
    }
}
