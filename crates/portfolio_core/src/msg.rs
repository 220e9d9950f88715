#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Msg {
    /// The shell document is parsed and placeholders can be located.
    DocumentReady,
    /// A fetch for this fragment has been issued.
    FragmentStarted { name: crate::FragmentName },
    /// A fragment reached a terminal state.
    FragmentFinished {
        name: crate::FragmentName,
        outcome: crate::FragmentOutcome,
    },
    /// The readiness signal was observed by the bootstrapper.
    ReadinessObserved,
    /// Feature installation finished (individual features may have failed).
    FeaturesInitialized(FeatureReport),
}

/// Names of features that installed cleanly and of those that did not.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FeatureReport {
    pub installed: Vec<String>,
    pub failed: Vec<String>,
}
