use page_logging::page_debug;

use super::{Feature, FeatureError};
use crate::page::{Context, PageEvent, Target};

const ANIMATED_SELECTOR: &str = ".animate-on-scroll";
const VISIBLE_CLASS: &str = "visible";

/// Adds `visible` the first time an animated element enters the viewport,
/// then stops observing it.
#[derive(Debug, Clone)]
pub struct ScrollReveal {
    threshold: f64,
    revealed: usize,
}

impl Default for ScrollReveal {
    fn default() -> Self {
        Self::with_threshold(0.1)
    }
}

impl ScrollReveal {
    pub fn with_threshold(threshold: f64) -> Self {
        Self {
            threshold,
            revealed: 0,
        }
    }

    pub fn revealed(&self) -> usize {
        self.revealed
    }
}

impl Feature for ScrollReveal {
    fn name(&self) -> &'static str {
        "scroll_reveal"
    }

    fn install(&mut self, cx: &mut Context<'_>) -> Result<(), FeatureError> {
        let elements = cx.dom.query(ANIMATED_SELECTOR)?;
        page_debug!("scroll_reveal observing {} elements", elements.len());
        for element in elements {
            cx.observe(element);
        }
        Ok(())
    }

    fn handle(
        &mut self,
        event: &PageEvent,
        _current: Target,
        cx: &mut Context<'_>,
    ) -> Result<(), FeatureError> {
        let PageEvent::Intersect { target, ratio } = event else {
            return Ok(());
        };
        if *ratio < self.threshold {
            return Ok(());
        }
        cx.dom.add_class(*target, VISIBLE_CLASS);
        cx.unobserve(*target);
        self.revealed += 1;
        Ok(())
    }
}
