//! Portfolio core: pure page-boot state machine and status view-model helpers.
mod effect;
mod fragment;
mod msg;
mod state;
mod update;
mod view_model;

pub use effect::Effect;
pub use fragment::{
    FragmentName, FragmentOutcome, FragmentRecord, FragmentStatus, InvalidFragmentName,
    DEFAULT_MANIFEST,
};
pub use msg::{FeatureReport, Msg};
pub use state::{AppState, BootPhase, LoadSummary};
pub use update::update;
pub use view_model::{AppViewModel, FragmentRowView};
