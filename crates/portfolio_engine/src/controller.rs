//! Owns one page load from document-ready to installed features.
//!
//! The controller is the only place where [`portfolio_core::update`] runs;
//! every effect it returns is executed here, in order.
use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use page_logging::{page_debug, page_info};
use portfolio_core::{
    update, AppState, AppViewModel, Effect, FragmentName, FragmentOutcome, LoadSummary, Msg,
};

use crate::barrier::{LoadBarrier, LoadObserver, NullLoadObserver};
use crate::config::{ConfigError, SiteConfig};
use crate::dom::Dom;
use crate::features::{standard_features, Feature};
use crate::fetch::{Fetcher, ReqwestFetcher};
use crate::loader::FragmentLoader;
use crate::page::{Page, PageEvent, PageServices};
use crate::LoadEvent;

static NEXT_PAGE_LOAD: AtomicU64 = AtomicU64::new(1);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BootOptions {
    /// Pause between the readiness signal and feature installation.
    pub feature_init_delay: Duration,
}

impl Default for BootOptions {
    fn default() -> Self {
        Self {
            feature_init_delay: Duration::from_millis(500),
        }
    }
}

pub struct PortfolioController {
    state: AppState,
    dom: Dom,
    loader: FragmentLoader,
    observer: Arc<dyn LoadObserver>,
    options: BootOptions,
    pending: Option<(Vec<Box<dyn Feature>>, PageServices)>,
    page: Option<Page>,
    load_id: u64,
}

impl PortfolioController {
    pub fn new(dom: Dom, manifest: Vec<FragmentName>, loader: FragmentLoader) -> Self {
        Self {
            state: AppState::new(manifest),
            dom,
            loader,
            observer: Arc::new(NullLoadObserver),
            options: BootOptions::default(),
            pending: Some((Vec::new(), PageServices::default())),
            page: None,
            load_id: 0,
        }
    }

    /// Controller for `shell` fetching over HTTP with the standard feature set.
    pub fn from_config(
        config: &SiteConfig,
        shell: &str,
        services: PageServices,
    ) -> Result<Self, ConfigError> {
        let fetcher: Arc<dyn Fetcher> = Arc::new(ReqwestFetcher::new(config.fetch.to_settings()));
        let loader = FragmentLoader::new(fetcher, config.source()?);
        Ok(Self::new(Dom::parse(shell), config.manifest_names()?, loader)
            .with_options(BootOptions {
                feature_init_delay: config.feature_init_delay(),
            })
            .with_features(standard_features(&config.analytics), services))
    }

    pub fn with_observer(mut self, observer: Arc<dyn LoadObserver>) -> Self {
        self.observer = observer;
        self
    }

    pub fn with_options(mut self, options: BootOptions) -> Self {
        self.options = options;
        self
    }

    pub fn with_features(mut self, features: Vec<Box<dyn Feature>>, services: PageServices) -> Self {
        self.pending = Some((features, services));
        self
    }

    /// Checks the first manifest entry. `None` when there is nothing to load.
    pub async fn check_source(&self) -> Option<bool> {
        let first = self.state.manifest().into_iter().next()?;
        Some(self.loader.check_source(&first).await)
    }

    /// Runs the whole boot sequence: load every fragment, signal readiness
    /// once, then install the features. Calling it again is a no-op.
    pub async fn boot(&mut self) -> LoadSummary {
        if self.load_id == 0 {
            self.load_id = NEXT_PAGE_LOAD.fetch_add(1, Ordering::Relaxed);
        }
        page_logging::set_page_load(self.load_id);
        let effects = self.apply(Msg::DocumentReady);
        self.run(effects).await;
        self.state.summary()
    }

    /// Delivers another readiness signal. Features are installed at most
    /// once no matter how often this fires.
    pub async fn signal_ready(&mut self) {
        page_logging::set_page_load(self.load_id);
        let effects = self.apply(Msg::ReadinessObserved);
        self.run(effects).await;
    }

    /// Forwards an interaction to the installed features. Returns how many
    /// handlers ran; zero before features are installed.
    pub fn dispatch(&mut self, event: PageEvent) -> usize {
        self.page.as_mut().map_or(0, |page| page.dispatch(event))
    }

    pub fn destroy(&mut self) {
        if let Some(page) = self.page.as_mut() {
            page.destroy();
        }
    }

    pub fn dom(&self) -> &Dom {
        match &self.page {
            Some(page) => page.dom(),
            None => &self.dom,
        }
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    pub fn view(&self) -> AppViewModel {
        self.state.view()
    }

    pub fn page(&self) -> Option<&Page> {
        self.page.as_ref()
    }

    pub fn page_mut(&mut self) -> Option<&mut Page> {
        self.page.as_mut()
    }

    fn apply(&mut self, msg: Msg) -> Vec<Effect> {
        apply(&mut self.state, msg)
    }

    async fn run(&mut self, effects: Vec<Effect>) {
        let mut queue: VecDeque<Effect> = effects.into();
        while let Some(effect) = queue.pop_front() {
            let follow_up = self.run_effect(effect).await;
            queue.extend(follow_up);
        }
    }

    async fn run_effect(&mut self, effect: Effect) -> Vec<Effect> {
        match effect {
            Effect::LoadFragments { names } => {
                page_info!("Loading {} components", names.len());
                let state = &mut self.state;
                let observer = &self.observer;
                let mut follow_up = Vec::new();
                LoadBarrier::new(&self.loader)
                    .settle(&mut self.dom, &names, |event| {
                        if let Some(msg) = load_msg(&event) {
                            follow_up.extend(apply(state, msg));
                        }
                        observer.emit(event);
                    })
                    .await;
                follow_up
            }
            Effect::SignalReady { summary } => {
                page_info!(
                    "All components settled: {}/{} loaded",
                    summary.loaded,
                    summary.total
                );
                self.observer.emit(LoadEvent::Ready(summary));
                self.dom.reparse();
                if !self.options.feature_init_delay.is_zero() {
                    tokio::time::sleep(self.options.feature_init_delay).await;
                }
                self.apply(Msg::ReadinessObserved)
            }
            Effect::InitializeFeatures => {
                let Some((features, services)) = self.pending.take() else {
                    page_debug!("Features already initialized");
                    return Vec::new();
                };
                let dom = std::mem::take(&mut self.dom);
                let (page, report) = Page::bootstrap(dom, features, services);
                self.page = Some(page);
                self.apply(Msg::FeaturesInitialized(report))
            }
        }
    }
}

fn apply(state: &mut AppState, msg: Msg) -> Vec<Effect> {
    let current = std::mem::take(state);
    let (next, effects) = update(current, msg);
    *state = next;
    effects
}

fn load_msg(event: &LoadEvent) -> Option<Msg> {
    match event {
        LoadEvent::Started { name } => Some(Msg::FragmentStarted { name: name.clone() }),
        LoadEvent::Finished { name, result } => {
            let outcome = match result {
                Ok(info) => FragmentOutcome::Loaded {
                    load_time_ms: info.load_time_ms,
                    size: info.size,
                },
                Err(err) => FragmentOutcome::Failed {
                    error: err.to_string(),
                },
            };
            Some(Msg::FragmentFinished {
                name: name.clone(),
                outcome,
            })
        }
        LoadEvent::Ready(_) => None,
    }
}
