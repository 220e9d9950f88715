//! Portfolio engine: fragment fetching, DOM assembly and the page runtime.
mod analytics;
mod barrier;
mod config;
mod controller;
mod decode;
mod dom;
mod features;
mod fetch;
mod loader;
mod page;
mod persist;
mod preferences;
mod types;

pub use analytics::{
    AnalyticsDispatcher, AnalyticsEvent, AnalyticsNames, AnalyticsSink, DeliveryStats,
    JsonLinesSink, LogSink, SinkError, DEFAULT_DEFERRED_LIMIT,
};
pub use barrier::{ChannelLoadObserver, LoadBarrier, LoadObserver, NullLoadObserver};
pub use config::{load_config, ConfigError, FetchConfig, SiteConfig};
pub use controller::{BootOptions, PortfolioController};
pub use decode::{decode_fragment, DecodeError, DecodedFragment};
pub use dom::{Dom, DomError, ElementId};
pub use features::{
    standard_features, Feature, FeatureError, HoverStates, LoadingAnimation, MobileMenu,
    PageAnalytics, ProjectModal, RoleTabs, ScrollReveal, Theme, ThemeToggle, YearFilter,
    THEME_KEY,
};
pub use fetch::{FetchSettings, Fetcher, FragmentSource, ReqwestFetcher};
pub use loader::{FetchedFragment, FragmentLoader};
pub use page::{
    Clock, Context, EventKind, FeatureId, Page, PageEvent, PageServices, Registration, Registry,
    Target,
};
pub use persist::{ensure_dir, AtomicFileWriter, PersistError};
pub use preferences::{MemoryPreferenceStore, PreferenceStore, RonPreferenceStore};
pub use types::{
    FailureKind, FetchError, FetchMetadata, FetchOutput, FragmentInfo, LoadError, LoadEvent,
};
