//! Live page runtime: owns the populated DOM, the installed features and
//! the event routing table.
mod event;
mod registry;

use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use page_logging::{page_error, page_info, page_warn};
use portfolio_core::FeatureReport;

use crate::analytics::{AnalyticsDispatcher, AnalyticsEvent};
use crate::dom::{Dom, ElementId};
use crate::features::{Feature, FeatureError};
use crate::preferences::{MemoryPreferenceStore, PreferenceStore};

pub use event::{EventKind, PageEvent};
pub use registry::{FeatureId, Registration, Registry, Target};

/// Milliseconds since the Unix epoch.
pub type Clock = Arc<dyn Fn() -> u64 + Send + Sync>;

/// Collaborators shared by every feature of a page.
pub struct PageServices {
    pub analytics: AnalyticsDispatcher,
    pub preferences: Box<dyn PreferenceStore>,
    pub clock: Clock,
}

impl Default for PageServices {
    fn default() -> Self {
        Self {
            analytics: AnalyticsDispatcher::default(),
            preferences: Box::new(MemoryPreferenceStore::new()),
            clock: Arc::new(system_clock_ms),
        }
    }
}

fn system_clock_ms() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|elapsed| u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX))
        .unwrap_or(0)
}

/// What a feature sees while installing or handling an event.
pub struct Context<'a> {
    pub dom: &'a mut Dom,
    pub services: &'a mut PageServices,
    registry: &'a mut Registry,
    feature: FeatureId,
}

impl Context<'_> {
    pub fn listen(&mut self, kind: EventKind, target: Target) {
        self.registry.add(self.feature, kind, target);
    }

    pub fn unlisten(&mut self, kind: EventKind, target: Target) {
        self.registry.remove(self.feature, kind, target);
    }

    pub fn on_click(&mut self, node: ElementId) {
        self.listen(EventKind::Click, Target::Node(node));
    }

    pub fn observe(&mut self, node: ElementId) {
        self.listen(EventKind::Intersect, Target::Node(node));
    }

    pub fn unobserve(&mut self, node: ElementId) {
        self.unlisten(EventKind::Intersect, Target::Node(node));
    }

    pub fn is_observed(&self, node: ElementId) -> bool {
        self.registry
            .contains(self.feature, EventKind::Intersect, Target::Node(node))
    }

    pub fn track(&mut self, event: AnalyticsEvent) {
        self.services.analytics.track(event);
    }

    pub fn now_ms(&self) -> u64 {
        (self.services.clock)()
    }
}

pub struct Page {
    dom: Dom,
    features: Vec<Box<dyn Feature>>,
    active: Vec<bool>,
    registry: Registry,
    services: PageServices,
}

impl Page {
    /// Installs every feature against `dom`. A feature that fails or panics
    /// while installing is logged, has its partial registrations removed and
    /// stays inactive; the others are unaffected.
    pub fn bootstrap(
        dom: Dom,
        features: Vec<Box<dyn Feature>>,
        services: PageServices,
    ) -> (Self, FeatureReport) {
        let active = vec![false; features.len()];
        let mut page = Self {
            dom,
            features,
            active,
            registry: Registry::default(),
            services,
        };
        let mut report = FeatureReport::default();

        for index in 0..page.features.len() {
            let id = FeatureId(index);
            let feature = &mut page.features[index];
            let name = feature.name();
            let mut cx = Context {
                dom: &mut page.dom,
                services: &mut page.services,
                registry: &mut page.registry,
                feature: id,
            };
            let outcome = panic::catch_unwind(AssertUnwindSafe(|| feature.install(&mut cx)));
            match outcome {
                Ok(Ok(())) => {
                    page.active[index] = true;
                    report.installed.push(name.to_string());
                }
                Ok(Err(err)) => {
                    page_warn!("FeatureInitFailed: {}: {}", name, err);
                    page.registry.remove_feature(id);
                    report.failed.push(name.to_string());
                }
                Err(_) => {
                    page_error!("FeatureInitFailed: {} panicked while installing", name);
                    page.registry.remove_feature(id);
                    report.failed.push(name.to_string());
                }
            }
        }

        page_info!(
            "Features initialized: {} installed, {} failed, {} registrations",
            report.installed.len(),
            report.failed.len(),
            page.registry.len()
        );
        (page, report)
    }

    /// Routes `event` through the registration table. Returns how many
    /// handlers ran. Handler errors and panics are logged and swallowed.
    pub fn dispatch(&mut self, event: PageEvent) -> usize {
        let routes = self.routes(&event);
        let mut handled = 0;
        for (id, current) in routes {
            if !self.active.get(id.0).copied().unwrap_or(false) {
                continue;
            }
            // An earlier handler of this dispatch may have unregistered the row.
            if !self.registry.contains(id, event.kind(), current) {
                continue;
            }
            let feature = &mut self.features[id.0];
            let name = feature.name();
            let mut cx = Context {
                dom: &mut self.dom,
                services: &mut self.services,
                registry: &mut self.registry,
                feature: id,
            };
            let outcome =
                panic::catch_unwind(AssertUnwindSafe(|| feature.handle(&event, current, &mut cx)));
            handled += 1;
            match outcome {
                Ok(Ok(())) => {}
                Ok(Err(err)) => log_handler_error(name, &event, &err),
                Err(_) => {
                    page_error!("Unexpected fault in {} while handling {:?}", name, event.kind())
                }
            }
        }
        handled
    }

    /// Tears down every active feature and clears the routing table.
    pub fn destroy(&mut self) {
        for index in 0..self.features.len() {
            if !self.active[index] {
                continue;
            }
            let feature = &mut self.features[index];
            let mut cx = Context {
                dom: &mut self.dom,
                services: &mut self.services,
                registry: &mut self.registry,
                feature: FeatureId(index),
            };
            feature.teardown(&mut cx);
            self.active[index] = false;
        }
        self.registry.clear();
    }

    pub fn dom(&self) -> &Dom {
        &self.dom
    }

    pub fn dom_mut(&mut self) -> &mut Dom {
        &mut self.dom
    }

    pub fn services(&self) -> &PageServices {
        &self.services
    }

    pub fn services_mut(&mut self) -> &mut PageServices {
        &mut self.services
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn feature_id(&self, name: &str) -> Option<FeatureId> {
        self.features
            .iter()
            .position(|feature| feature.name() == name)
            .map(FeatureId)
    }

    pub fn is_active(&self, name: &str) -> bool {
        self.feature_id(name)
            .is_some_and(|id| self.active[id.0])
    }

    fn routes(&self, event: &PageEvent) -> Vec<(FeatureId, Target)> {
        let kind = event.kind();
        let targets: Vec<Target> = match event {
            PageEvent::Click { target } => self
                .dom
                .ancestors_inclusive(*target)
                .into_iter()
                .map(Target::Node)
                .chain(std::iter::once(Target::Document))
                .collect(),
            PageEvent::HoverEnter { target }
            | PageEvent::HoverLeave { target }
            | PageEvent::Intersect { target, .. } => vec![Target::Node(*target)],
            _ => vec![Target::Document],
        };
        targets
            .into_iter()
            .flat_map(|target| {
                self.registry
                    .listeners(kind, target)
                    .into_iter()
                    .map(move |id| (id, target))
            })
            .collect()
    }
}

fn log_handler_error(name: &str, event: &PageEvent, err: &FeatureError) {
    page_warn!("{} failed to handle {:?}: {}", name, event.kind(), err);
}
