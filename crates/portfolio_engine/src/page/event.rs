use std::time::Duration;

use crate::dom::ElementId;

/// Interaction delivered to the page runtime.
#[derive(Debug, Clone, PartialEq)]
pub enum PageEvent {
    /// Every resource of the page finished loading.
    Load,
    /// The page is being left.
    Unload,
    /// Click on `target`; bubbles to its ancestors, then the document.
    Click { target: ElementId },
    /// Key press anywhere on the page.
    KeyDown { key: String },
    HoverEnter { target: ElementId },
    HoverLeave { target: ElementId },
    /// `target` is at least `ratio` (0.0..=1.0) inside the viewport.
    Intersect { target: ElementId, ratio: f64 },
    Scroll {
        offset_y: f64,
        page_height: f64,
        viewport_height: f64,
    },
    /// Wall-clock time passed since the previous tick.
    Tick { elapsed: Duration },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    Load,
    Unload,
    Click,
    KeyDown,
    HoverEnter,
    HoverLeave,
    Intersect,
    Scroll,
    Tick,
}

impl PageEvent {
    pub fn kind(&self) -> EventKind {
        match self {
            PageEvent::Load => EventKind::Load,
            PageEvent::Unload => EventKind::Unload,
            PageEvent::Click { .. } => EventKind::Click,
            PageEvent::KeyDown { .. } => EventKind::KeyDown,
            PageEvent::HoverEnter { .. } => EventKind::HoverEnter,
            PageEvent::HoverLeave { .. } => EventKind::HoverLeave,
            PageEvent::Intersect { .. } => EventKind::Intersect,
            PageEvent::Scroll { .. } => EventKind::Scroll,
            PageEvent::Tick { .. } => EventKind::Tick,
        }
    }

    /// Element the event originated on, for element-scoped events.
    pub fn target(&self) -> Option<ElementId> {
        match self {
            PageEvent::Click { target }
            | PageEvent::HoverEnter { target }
            | PageEvent::HoverLeave { target }
            | PageEvent::Intersect { target, .. } => Some(*target),
            _ => None,
        }
    }
}
