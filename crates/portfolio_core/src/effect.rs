use crate::{FragmentName, LoadSummary};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Issue every fragment load of the batch at once.
    LoadFragments { names: Vec<FragmentName> },
    /// All fragments are terminal; announce readiness (emitted once per page load).
    SignalReady { summary: LoadSummary },
    /// Wire up the interactive features against the populated DOM.
    InitializeFeatures,
}
