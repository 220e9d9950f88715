use std::fmt;

use serde::Serialize;

/// Fragments loaded by a stock portfolio page, in document order.
pub const DEFAULT_MANIFEST: &[&str] = &[
    "header",
    "hero",
    "about",
    "experience",
    "impact-journey",
    "projects",
    "skills",
    "education",
    "contact",
    "footer",
];

/// Name of an HTML fragment. Restricted to ASCII alphanumerics, `-` and `_`
/// so it can be embedded in ids, selectors and URL paths without escaping.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct FragmentName(String);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidFragmentName(pub String);

impl fmt::Display for InvalidFragmentName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid fragment name {:?}", self.0)
    }
}

impl std::error::Error for InvalidFragmentName {}

impl FragmentName {
    pub fn new(name: impl Into<String>) -> Result<Self, InvalidFragmentName> {
        let name = name.into();
        let valid = !name.is_empty()
            && name
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
        if valid {
            Ok(Self(name))
        } else {
            Err(InvalidFragmentName(name))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Id of the element that receives this fragment's markup.
    pub fn placeholder_id(&self) -> String {
        format!("{}-component", self.0)
    }

    /// Selector for the optional marker element that shows load state.
    pub fn marker_selector(&self) -> String {
        format!("[data-component=\"{}\"]", self.0)
    }

    /// Path of the fragment relative to the site root.
    pub fn source_path(&self) -> String {
        format!("components/{}.html", self.0)
    }

    pub fn parse_manifest<I, S>(names: I) -> Result<Vec<Self>, InvalidFragmentName>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        names.into_iter().map(Self::new).collect()
    }

    pub fn default_manifest() -> Vec<Self> {
        DEFAULT_MANIFEST
            .iter()
            .map(|name| Self((*name).to_string()))
            .collect()
    }
}

impl fmt::Display for FragmentName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FragmentStatus {
    #[default]
    Pending,
    Loading,
    Loaded,
    Error,
}

impl FragmentStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, FragmentStatus::Loaded | FragmentStatus::Error)
    }
}

/// How a single fragment load ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FragmentOutcome {
    Loaded { load_time_ms: u64, size: usize },
    Failed { error: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct FragmentRecord {
    pub status: FragmentStatus,
    pub error: Option<String>,
    pub load_time_ms: Option<u64>,
    pub size: Option<usize>,
}

impl FragmentRecord {
    pub(crate) fn start(&mut self) -> bool {
        if self.status != FragmentStatus::Pending {
            return false;
        }
        self.status = FragmentStatus::Loading;
        true
    }

    pub(crate) fn finish(&mut self, outcome: FragmentOutcome) -> bool {
        if self.status.is_terminal() {
            return false;
        }
        match outcome {
            FragmentOutcome::Loaded { load_time_ms, size } => {
                self.status = FragmentStatus::Loaded;
                self.error = None;
                self.load_time_ms = Some(load_time_ms);
                self.size = Some(size);
            }
            FragmentOutcome::Failed { error } => {
                self.status = FragmentStatus::Error;
                self.error = Some(error);
                self.load_time_ms = None;
            }
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::{FragmentName, FragmentOutcome, FragmentRecord, FragmentStatus};

    #[test]
    fn derived_names_follow_placeholder_convention() {
        let name = FragmentName::new("impact-journey").unwrap();
        assert_eq!(name.placeholder_id(), "impact-journey-component");
        assert_eq!(name.marker_selector(), "[data-component=\"impact-journey\"]");
        assert_eq!(name.source_path(), "components/impact-journey.html");
    }

    #[test]
    fn rejects_names_that_need_escaping() {
        assert!(FragmentName::new("").is_err());
        assert!(FragmentName::new("../secret").is_err());
        assert!(FragmentName::new("a b").is_err());
        assert!(FragmentName::new("about_me-2").is_ok());
    }

    #[test]
    fn default_manifest_is_valid() {
        let manifest = FragmentName::default_manifest();
        assert_eq!(manifest.len(), 10);
        for name in &manifest {
            assert!(FragmentName::new(name.as_str()).is_ok());
        }
    }

    #[test]
    fn failure_keeps_error_and_no_timing() {
        let mut record = FragmentRecord::default();
        assert!(record.start());
        assert!(record.finish(FragmentOutcome::Failed {
            error: "http status 404".to_string(),
        }));

        assert_eq!(record.status, FragmentStatus::Error);
        assert_eq!(record.error.as_deref(), Some("http status 404"));
        assert_eq!(record.load_time_ms, None);
        assert_eq!(record.size, None);
    }
}
