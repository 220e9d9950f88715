use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{mpsc, Arc};
use std::time::Duration;

use portfolio_core::{BootPhase, FragmentName, FragmentStatus};
use portfolio_engine::{
    BootOptions, ChannelLoadObserver, Context, Feature, FeatureError, Fetcher, FetchSettings,
    FragmentLoader, FragmentSource, Dom, LoadEvent, PageEvent, PageServices, PortfolioController,
    ReqwestFetcher, Target,
};
use pretty_assertions::assert_eq;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const SHELL: &str = r#"<html><body>
<div id="header-component"></div>
<div id="hero-component"><p>fallback</p></div>
</body></html>"#;

struct CountingFeature {
    installs: Arc<AtomicUsize>,
    clicks: Arc<AtomicUsize>,
}

impl Feature for CountingFeature {
    fn name(&self) -> &'static str {
        "counting"
    }

    fn install(&mut self, cx: &mut Context<'_>) -> Result<(), FeatureError> {
        self.installs.fetch_add(1, Ordering::SeqCst);
        // Injected markup must be queryable by the time features install.
        if let Some(heading) = cx.dom.query_first("#header-component h1")? {
            cx.on_click(heading);
        }
        Ok(())
    }

    fn handle(
        &mut self,
        _event: &PageEvent,
        _current: Target,
        _cx: &mut Context<'_>,
    ) -> Result<(), FeatureError> {
        self.clicks.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

async fn server() -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/components/header.html"))
        .respond_with(ResponseTemplate::new(200).set_body_raw("<h1>Hi</h1>", "text/html"))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/components/hero.html"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;
    server
}

fn controller(
    server: &MockServer,
    installs: &Arc<AtomicUsize>,
    clicks: &Arc<AtomicUsize>,
) -> (PortfolioController, mpsc::Receiver<LoadEvent>) {
    let fetcher: Arc<dyn Fetcher> = Arc::new(ReqwestFetcher::new(FetchSettings::default()));
    let loader = FragmentLoader::new(fetcher, FragmentSource::new(&server.uri(), None).unwrap());
    let manifest = FragmentName::parse_manifest(["header", "hero"]).unwrap();
    let (tx, rx) = mpsc::channel();
    let feature = CountingFeature {
        installs: installs.clone(),
        clicks: clicks.clone(),
    };
    let controller = PortfolioController::new(Dom::parse(SHELL), manifest, loader)
        .with_observer(Arc::new(ChannelLoadObserver::new(tx)))
        .with_options(BootOptions {
            feature_init_delay: Duration::ZERO,
        })
        .with_features(vec![Box::new(feature)], PageServices::default());
    (controller, rx)
}

#[tokio::test]
async fn boot_loads_fragments_and_installs_features_once() {
    page_logging::initialize_for_tests();
    let server = server().await;
    let installs = Arc::new(AtomicUsize::new(0));
    let clicks = Arc::new(AtomicUsize::new(0));
    let (mut controller, events) = controller(&server, &installs, &clicks);

    let summary = controller.boot().await;
    assert_eq!((summary.loaded, summary.failed, summary.total), (1, 1, 2));
    assert_eq!(controller.state().phase(), BootPhase::FeaturesInitialized);
    assert_eq!(installs.load(Ordering::SeqCst), 1);

    controller.signal_ready().await;
    controller.signal_ready().await;
    controller.boot().await;
    assert_eq!(installs.load(Ordering::SeqCst), 1);

    let ready = events
        .try_iter()
        .filter(|event| matches!(event, LoadEvent::Ready(_)))
        .count();
    assert_eq!(ready, 1);

    let header = FragmentName::new("header").unwrap();
    let hero = FragmentName::new("hero").unwrap();
    assert_eq!(controller.state().record(&header).unwrap().status, FragmentStatus::Loaded);
    let hero_record = controller.state().record(&hero).unwrap();
    assert_eq!(hero_record.status, FragmentStatus::Error);
    assert!(hero_record.error.as_deref().unwrap().contains("404"));

    let report = controller.state().feature_report().unwrap();
    assert_eq!(report.installed, vec!["counting".to_string()]);
    assert_eq!(controller.view().headline, "1/2 Components Loaded");
}

#[tokio::test]
async fn source_check_leaves_boot_untouched() {
    page_logging::initialize_for_tests();
    let server = server().await;
    let installs = Arc::new(AtomicUsize::new(0));
    let clicks = Arc::new(AtomicUsize::new(0));
    let (mut controller, _events) = controller(&server, &installs, &clicks);

    assert_eq!(controller.check_source().await, Some(true));
    assert_eq!(controller.state().phase(), BootPhase::NotStarted);
    assert_eq!(installs.load(Ordering::SeqCst), 0);

    let summary = controller.boot().await;
    assert_eq!((summary.loaded, summary.failed), (1, 1));
}

#[tokio::test]
async fn events_reach_features_after_boot() {
    let server = server().await;
    let installs = Arc::new(AtomicUsize::new(0));
    let clicks = Arc::new(AtomicUsize::new(0));
    let (mut controller, _events) = controller(&server, &installs, &clicks);

    assert_eq!(controller.dispatch(PageEvent::Load), 0);
    controller.boot().await;

    let dom = controller.dom();
    let heading = dom.query_first("#header-component h1").unwrap().unwrap();
    let hero = dom.by_id("hero-component").unwrap();
    assert_eq!(dom.text(hero).trim(), "fallback");

    assert_eq!(controller.dispatch(PageEvent::Click { target: heading }), 1);
    assert_eq!(clicks.load(Ordering::SeqCst), 1);

    controller.destroy();
    assert_eq!(controller.dispatch(PageEvent::Click { target: heading }), 0);
}

#[tokio::test]
async fn empty_manifest_is_ready_immediately() {
    let server = MockServer::start().await;
    let fetcher: Arc<dyn Fetcher> = Arc::new(ReqwestFetcher::new(FetchSettings::default()));
    let loader = FragmentLoader::new(fetcher, FragmentSource::new(&server.uri(), None).unwrap());
    let mut controller = PortfolioController::new(Dom::parse(SHELL), Vec::new(), loader)
        .with_options(BootOptions {
            feature_init_delay: Duration::ZERO,
        });

    assert_eq!(controller.check_source().await, None);
    let summary = controller.boot().await;
    assert_eq!(summary.total, 0);
    assert_eq!(controller.state().phase(), BootPhase::FeaturesInitialized);
    assert!(server.received_requests().await.unwrap().is_empty());
}
