use std::fs::{self, File};
use std::path::PathBuf;
use std::sync::{mpsc, Arc};

use anyhow::Context as _;
use chrono::Utc;
use page_logging::{page_info, page_warn};
use portfolio_engine::{
    load_config, AnalyticsDispatcher, AnalyticsSink, ChannelLoadObserver, JsonLinesSink, LogSink,
    MemoryPreferenceStore, PageEvent, PageServices, PortfolioController, PreferenceStore,
    RonPreferenceStore,
};

use super::persistence::{save_page, save_status, StatusReport};
use super::render::{progress_line, status_lines};

#[derive(Debug, Clone)]
pub struct RunOptions {
    pub config: Option<PathBuf>,
    pub shell: PathBuf,
    pub out: PathBuf,
    pub status: Option<PathBuf>,
    pub base_url: Option<String>,
    pub events: Option<PathBuf>,
}

pub async fn run_app(options: RunOptions) -> anyhow::Result<()> {
    let mut config = load_config(options.config.as_deref())?;
    if let Some(base_url) = options.base_url {
        config.base_url = base_url;
    }
    let shell = fs::read_to_string(&options.shell)
        .with_context(|| format!("failed to read shell {:?}", options.shell))?;

    let sink: Box<dyn AnalyticsSink> = match &options.events {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("failed to create events file {path:?}"))?;
            Box::new(JsonLinesSink::new(file))
        }
        None => Box::new(LogSink),
    };
    let preferences: Box<dyn PreferenceStore> = match &config.preferences_path {
        Some(path) => Box::new(RonPreferenceStore::open(path)),
        None => Box::new(MemoryPreferenceStore::new()),
    };
    let services = PageServices {
        analytics: AnalyticsDispatcher::new(Some(sink), config.deferred_event_limit),
        preferences,
        clock: Arc::new(|| u64::try_from(Utc::now().timestamp_millis()).unwrap_or(0)),
    };

    let (event_tx, event_rx) = mpsc::channel();
    let mut controller = PortfolioController::from_config(&config, &shell, services)?
        .with_observer(Arc::new(ChannelLoadObserver::new(event_tx)));

    page_info!("Assembling {:?} from {}", options.shell, config.base_url);
    if controller.check_source().await == Some(false) {
        page_warn!("Continuing without a reachable fragment source");
    }
    let summary = controller.boot().await;
    for event in event_rx.try_iter() {
        page_info!("{}", progress_line(&event));
    }
    if summary.failed > 0 {
        page_warn!("{} of {} components failed to load", summary.failed, summary.total);
    }

    controller.dispatch(PageEvent::Load);
    save_page(&options.out, &controller.dom().render())?;

    let view = controller.view();
    for line in status_lines(&view) {
        println!("{line}");
    }

    controller.dispatch(PageEvent::Unload);
    if let Some(path) = &options.status {
        let analytics = controller
            .page()
            .map(|page| page.services().analytics.stats())
            .unwrap_or_default();
        let report = StatusReport::new(
            Utc::now().to_rfc3339(),
            config.base_url.clone(),
            &view,
            controller.state().feature_report(),
            analytics,
        );
        save_status(path, &report)?;
    }
    controller.destroy();
    Ok(())
}
