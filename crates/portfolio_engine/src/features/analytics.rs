use std::collections::{BTreeSet, HashMap, HashSet};
use std::time::Duration;

use page_logging::page_debug;

use super::{Feature, FeatureError};
use crate::analytics::{AnalyticsEvent, AnalyticsNames};
use crate::dom::{Dom, ElementId};
use crate::page::{Context, EventKind, PageEvent, Target};

const CTA_SELECTOR: &str = ".hero .cta-buttons a, .hero .btn, [data-cta=\"hero\"]";
const SECTION_SELECTOR: &str = "section[id], .section[id], [data-section]";
const PROJECTS_SELECTOR: &str = ".projects, #projects, [data-section=\"projects\"]";
const PROJECT_LINK_SELECTOR: &str = ".project-link, .project-btn, [data-project-action]";
const PROJECT_CARD_SELECTOR: &str = ".project-card, .project, [data-project]";
const PROJECT_TITLE_SELECTOR: &str = ".project-title, h3, h4, [data-project-title]";
const SKILLS_SELECTOR: &str = ".skills, #skills, [data-section=\"skills\"]";
const SKILL_HEADER_SELECTOR: &str =
    ".skill-domain .domain-header, .skill-category, [data-skill-domain]";
const SKILL_DOMAIN_SELECTOR: &str = ".skill-domain, .skill-category, [data-skill-domain]";
const STAT_SELECTOR: &str = ".stat-card, .metric-card, [data-stat]";

const SECTION_THRESHOLD: f64 = 0.25;
const PROJECT_THRESHOLD: f64 = 0.6;
const STAT_THRESHOLD: f64 = 0.8;
const SCROLL_MILESTONES: [u32; 5] = [25, 50, 75, 90, 100];
const TIME_REPORT_INTERVAL: Duration = Duration::from_secs(30);

/// What an observed element is watched for. One element can play several roles.
#[derive(Debug, Clone, Copy, Default)]
struct Roles {
    section: bool,
    project: bool,
    stat: bool,
}

impl Roles {
    fn any(self) -> bool {
        self.section || self.project || self.stat
    }
}

/// Engagement tracking: CTA clicks, section/project/stat views, project and
/// skill interactions, scroll depth, time on page and page exit.
#[derive(Debug, Clone)]
pub struct PageAnalytics {
    names: AnalyticsNames,
    cta_buttons: Vec<ElementId>,
    sections: Vec<ElementId>,
    project_cards: Vec<ElementId>,
    skill_domains: Vec<ElementId>,
    projects_container: Option<ElementId>,
    skills_container: Option<ElementId>,
    watching: HashMap<ElementId, Roles>,
    viewed_sections: HashSet<String>,
    milestones_hit: BTreeSet<u32>,
    max_scroll: u32,
    time_on_page: Duration,
    time_reported: Duration,
    loaded_at_ms: u64,
}

impl PageAnalytics {
    pub fn new(names: AnalyticsNames) -> Self {
        Self {
            names,
            cta_buttons: Vec::new(),
            sections: Vec::new(),
            project_cards: Vec::new(),
            skill_domains: Vec::new(),
            projects_container: None,
            skills_container: None,
            watching: HashMap::new(),
            viewed_sections: HashSet::new(),
            milestones_hit: BTreeSet::new(),
            max_scroll: 0,
            time_on_page: Duration::ZERO,
            time_reported: Duration::ZERO,
            loaded_at_ms: 0,
        }
    }

    pub fn max_scroll_depth(&self) -> u32 {
        self.max_scroll
    }

    fn watch(&mut self, cx: &mut Context<'_>, nodes: &[ElementId], mark: fn(&mut Roles)) {
        for node in nodes {
            mark(self.watching.entry(*node).or_default());
            cx.observe(*node);
        }
    }

    fn on_click(&mut self, cx: &mut Context<'_>, event: &PageEvent, current: ElementId) -> Result<(), FeatureError> {
        let Some(target) = event.target() else {
            return Ok(());
        };
        if self.cta_buttons.contains(&current) {
            let tracked = self.cta_click(cx.dom, current, cx.now_ms());
            cx.track(tracked);
        }
        if Some(current) == self.projects_container {
            if let Some(link) = closest_within(cx.dom, target, PROJECT_LINK_SELECTOR, current)? {
                let tracked = self.project_interaction(cx.dom, link)?;
                cx.track(tracked);
            }
        }
        if Some(current) == self.skills_container {
            if let Some(header) = closest_within(cx.dom, target, SKILL_HEADER_SELECTOR, current)? {
                if let Some(tracked) = self.skill_interaction(cx.dom, header)? {
                    cx.track(tracked);
                }
            }
        }
        Ok(())
    }

    fn on_intersect(&mut self, cx: &mut Context<'_>, target: ElementId, ratio: f64) -> Result<(), FeatureError> {
        let Some(mut roles) = self.watching.get(&target).copied() else {
            return Ok(());
        };

        if roles.section && ratio >= SECTION_THRESHOLD {
            roles.section = false;
            let key = section_key(cx.dom, target);
            if self.viewed_sections.insert(key.clone()) {
                let position = self.sections.iter().position(|s| *s == target).map_or(0, |i| i + 1);
                let name = cx
                    .dom
                    .query_within(target, "h1, h2, h3, h4, h5, h6")?
                    .first()
                    .and_then(|heading| super::text_of(cx.dom, *heading))
                    .or_else(|| cx.dom.attr(target, "id").filter(|id| !id.is_empty()))
                    .unwrap_or_else(|| "Unknown Section".to_string());
                let time_to_view = cx.now_ms().saturating_sub(self.loaded_at_ms);
                cx.track(
                    AnalyticsEvent::engagement(&self.names.section_view, name)
                        .with("section_id", key)
                        .with("section_position", position)
                        .with("visibility_ratio", (ratio * 100.0).round() as u64)
                        .with("time_to_view", time_to_view),
                );
            }
        }

        if roles.project && ratio >= PROJECT_THRESHOLD {
            roles.project = false;
            let card = ProjectCard::describe(cx.dom, target, &self.project_cards)?;
            cx.track(
                AnalyticsEvent::engagement(&self.names.project_view, card.title.clone())
                    .with("project_title", card.title)
                    .with("project_category", card.category)
                    .with("project_position", card.position),
            );
        }

        if roles.stat && ratio >= STAT_THRESHOLD {
            roles.stat = false;
            let label = first_text(cx.dom, target, ".stat-label, .metric-label, [data-stat-label]")?
                .unwrap_or_else(|| "Unknown Stat".to_string());
            let value = first_text(cx.dom, target, ".stat-value, .metric-value, [data-stat-value]")?
                .unwrap_or_else(|| "0".to_string());
            let category = cx
                .dom
                .attr(target, "data-category")
                .unwrap_or_else(|| "general".to_string());
            cx.track(
                AnalyticsEvent::engagement(&self.names.stat_view, label.clone())
                    .with("stat_name", label)
                    .with("stat_value", value)
                    .with("stat_category", category)
                    .with("section", "about"),
            );
        }

        if roles.any() {
            self.watching.insert(target, roles);
        } else {
            self.watching.remove(&target);
            cx.unobserve(target);
        }
        Ok(())
    }

    fn on_scroll(&mut self, cx: &mut Context<'_>, offset_y: f64, page_height: f64, viewport_height: f64) {
        let scrollable = page_height - viewport_height;
        if scrollable <= 0.0 {
            return;
        }
        let percent = ((offset_y / scrollable) * 100.0).round().clamp(0.0, 100.0) as u32;
        if percent <= self.max_scroll {
            return;
        }
        self.max_scroll = percent;
        for milestone in SCROLL_MILESTONES {
            if percent >= milestone && self.milestones_hit.insert(milestone) {
                cx.track(
                    AnalyticsEvent::engagement(&self.names.scroll_depth, format!("{milestone}%"))
                        .with("scroll_depth", milestone)
                        .with("page_height", page_height)
                        .with("viewport_height", viewport_height),
                );
            }
        }
    }

    fn on_tick(&mut self, cx: &mut Context<'_>, elapsed: Duration) {
        self.time_on_page = self.time_on_page.saturating_add(elapsed);
        // A long tick reports only the last interval it crossed.
        let interval = TIME_REPORT_INTERVAL.as_secs();
        let seconds = self.time_on_page.as_secs() / interval * interval;
        if seconds <= self.time_reported.as_secs() {
            return;
        }
        self.time_reported = Duration::from_secs(seconds);
        cx.track(
            AnalyticsEvent::engagement(&self.names.time_on_page, format!("{seconds}s"))
                .with("time_seconds", seconds),
        );
    }

    fn cta_click(&self, dom: &Dom, button: ElementId, now_ms: u64) -> AnalyticsEvent {
        let text = super::text_of(dom, button)
            .or_else(|| dom.attr(button, "aria-label"))
            .unwrap_or_else(|| "Unknown".to_string());
        let button_type = if dom.has_class(button, "btn-primary") {
            "primary"
        } else if dom.has_class(button, "btn-secondary") {
            "secondary"
        } else {
            "default"
        };
        AnalyticsEvent::engagement(&self.names.cta_click, text)
            .with("button_type", button_type)
            .with("button_position", dom.position_in_parent(button).unwrap_or(0))
            .with("section", "hero")
            .with("timestamp", now_ms)
    }

    fn project_interaction(&self, dom: &Dom, link: ElementId) -> Result<AnalyticsEvent, FeatureError> {
        let card = match dom.closest(link, PROJECT_CARD_SELECTOR)? {
            Some(card) => ProjectCard::describe(dom, card, &self.project_cards)?,
            None => ProjectCard::unknown(),
        };
        let link_text = super::text_of(dom, link)
            .or_else(|| dom.attr(link, "aria-label"))
            .unwrap_or_else(|| "Unknown".to_string());
        Ok(
            AnalyticsEvent::engagement(&self.names.project_interaction, card.title.clone())
                .with("project_title", card.title)
                .with("link_type", link_type(dom, link)?)
                .with("link_text", link_text)
                .with("project_category", card.category)
                .with("project_position", card.position),
        )
    }

    fn skill_interaction(&self, dom: &Dom, header: ElementId) -> Result<Option<AnalyticsEvent>, FeatureError> {
        let Some(domain) = dom.closest(header, SKILL_DOMAIN_SELECTOR)? else {
            return Ok(None);
        };
        let name = first_text(dom, domain, "h3, h4, .domain-title, [data-domain-name]")?
            .unwrap_or_else(|| "Unknown Domain".to_string());
        let position = self
            .skill_domains
            .iter()
            .position(|d| *d == domain)
            .map_or(0, |i| i + 1);
        let skill_count = dom.query_within(domain, ".skill, .skill-item, [data-skill]")?.len();
        Ok(Some(
            AnalyticsEvent::engagement(&self.names.skill_interaction, name.clone())
                .with("domain_name", name)
                .with("interaction_type", "expand_collapse")
                .with("domain_position", position)
                .with("skill_count", skill_count),
        ))
    }
}

struct ProjectCard {
    title: String,
    category: String,
    position: usize,
}

impl ProjectCard {
    fn describe(dom: &Dom, card: ElementId, all: &[ElementId]) -> Result<Self, FeatureError> {
        let title = first_text(dom, card, PROJECT_TITLE_SELECTOR)?
            .unwrap_or_else(|| "Unknown Project".to_string());
        let category = match dom.attr(card, "data-category") {
            Some(category) => category,
            None => dom
                .query_within(card, "[data-category]")?
                .first()
                .and_then(|node| dom.attr(*node, "data-category"))
                .unwrap_or_else(|| "general".to_string()),
        };
        let position = all.iter().position(|c| *c == card).map_or(0, |i| i + 1);
        Ok(Self {
            title,
            category,
            position,
        })
    }

    fn unknown() -> Self {
        Self {
            title: "Unknown Project".to_string(),
            category: "general".to_string(),
            position: 0,
        }
    }
}

impl Feature for PageAnalytics {
    fn name(&self) -> &'static str {
        "analytics"
    }

    fn install(&mut self, cx: &mut Context<'_>) -> Result<(), FeatureError> {
        self.loaded_at_ms = cx.now_ms();

        self.cta_buttons = cx.dom.query(CTA_SELECTOR)?;
        for button in &self.cta_buttons {
            cx.on_click(*button);
        }

        self.projects_container = cx.dom.query_first(PROJECTS_SELECTOR)?;
        if let Some(container) = self.projects_container {
            cx.on_click(container);
        }
        self.skills_container = cx.dom.query_first(SKILLS_SELECTOR)?;
        if let Some(container) = self.skills_container {
            cx.on_click(container);
        }
        self.skill_domains = cx.dom.query(".skill-domain, .skill-category")?;

        let sections = cx.dom.query(SECTION_SELECTOR)?;
        self.watch(cx, &sections, |roles| roles.section = true);
        self.sections = sections;
        let cards = cx.dom.query(PROJECT_CARD_SELECTOR)?;
        self.watch(cx, &cards, |roles| roles.project = true);
        self.project_cards = cards;
        let stats = cx.dom.query(STAT_SELECTOR)?;
        self.watch(cx, &stats, |roles| roles.stat = true);

        cx.listen(EventKind::Scroll, Target::Document);
        cx.listen(EventKind::Tick, Target::Document);
        cx.listen(EventKind::Unload, Target::Document);

        page_debug!(
            "analytics tracking {} CTAs, {} observed elements",
            self.cta_buttons.len(),
            self.watching.len()
        );
        Ok(())
    }

    fn handle(
        &mut self,
        event: &PageEvent,
        current: Target,
        cx: &mut Context<'_>,
    ) -> Result<(), FeatureError> {
        match (event, current) {
            (PageEvent::Click { .. }, Target::Node(node)) => self.on_click(cx, event, node)?,
            (PageEvent::Intersect { target, ratio }, _) => self.on_intersect(cx, *target, *ratio)?,
            (
                PageEvent::Scroll {
                    offset_y,
                    page_height,
                    viewport_height,
                },
                _,
            ) => self.on_scroll(cx, *offset_y, *page_height, *viewport_height),
            (PageEvent::Tick { elapsed }, _) => self.on_tick(cx, *elapsed),
            (PageEvent::Unload, _) => {
                let total_time = cx.now_ms().saturating_sub(self.loaded_at_ms) as f64 / 1000.0;
                cx.track(
                    AnalyticsEvent::new(&self.names.page_exit)
                        .with("event_category", "engagement")
                        .with("total_time", total_time.round() as u64)
                        .with("max_scroll_depth", self.max_scroll),
                );
            }
            _ => {}
        }
        Ok(())
    }
}

/// Identifier a section view is deduplicated on.
fn section_key(dom: &Dom, section: ElementId) -> String {
    dom.attr(section, "id")
        .filter(|id| !id.is_empty())
        .or_else(|| dom.attr(section, "data-section").filter(|s| !s.is_empty()))
        .unwrap_or_else(|| "unnamed".to_string())
}

fn first_text(dom: &Dom, scope: ElementId, selector: &str) -> Result<Option<String>, FeatureError> {
    Ok(dom
        .query_within(scope, selector)?
        .first()
        .and_then(|node| super::text_of(dom, *node)))
}

fn closest_within(
    dom: &Dom,
    target: ElementId,
    selector: &str,
    scope: ElementId,
) -> Result<Option<ElementId>, FeatureError> {
    Ok(dom
        .closest(target, selector)?
        .filter(|found| dom.contains(scope, *found)))
}

fn link_type(dom: &Dom, link: ElementId) -> Result<&'static str, FeatureError> {
    let classes = dom.classes(link).join(" ").to_lowercase();
    let href = dom.attr(link, "href").unwrap_or_default();
    let icon = dom
        .query_within(link, "i")?
        .first()
        .map(|icon| dom.classes(*icon).join(" "))
        .unwrap_or_default();

    let kind = if classes.contains("github") || href.contains("github.com") || icon.contains("github") {
        "github"
    } else if classes.contains("demo") || classes.contains("live") || icon.contains("external") {
        "demo"
    } else if classes.contains("analytics") || icon.contains("chart") {
        "analytics"
    } else if classes.contains("presentation") || icon.contains("present") {
        "presentation"
    } else {
        "other"
    };
    Ok(kind)
}
