use super::{clicked_node, require_id, Feature, FeatureError};
use crate::dom::{Dom, ElementId};
use crate::page::{Context, PageEvent, Target};

/// Preference key the theme is stored under.
pub const THEME_KEY: &str = "theme";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    pub fn as_str(self) -> &'static str {
        match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
        }
    }

    /// Unknown values fall back to `None`; callers pick the default.
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim() {
            "light" => Some(Theme::Light),
            "dark" => Some(Theme::Dark),
            _ => None,
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }
}

/// Light/dark switch; the choice is stored and re-applied on every load.
#[derive(Debug, Clone, Default)]
pub struct ThemeToggle {
    button: Option<ElementId>,
    theme: Theme,
}

impl ThemeToggle {
    pub fn current(&self) -> Theme {
        self.theme
    }

    fn apply(&self, dom: &mut Dom, button: ElementId) -> Result<(), FeatureError> {
        let root = dom.root();
        dom.set_attr(root, "data-theme", self.theme.as_str());
        if let Some(icon) = dom.query_within(button, "i")?.first().copied() {
            let dark = self.theme == Theme::Dark;
            dom.toggle_class(icon, "fa-sun", Some(dark));
            dom.toggle_class(icon, "fa-moon", Some(!dark));
        }
        Ok(())
    }
}

impl Feature for ThemeToggle {
    fn name(&self) -> &'static str {
        "theme_toggle"
    }

    fn install(&mut self, cx: &mut Context<'_>) -> Result<(), FeatureError> {
        let button = require_id(cx.dom, "theme-toggle")?;
        self.theme = cx
            .services
            .preferences
            .get(THEME_KEY)
            .and_then(|value| Theme::parse(&value))
            .unwrap_or_default();
        self.apply(cx.dom, button)?;
        cx.on_click(button);
        self.button = Some(button);
        Ok(())
    }

    fn handle(
        &mut self,
        event: &PageEvent,
        current: Target,
        cx: &mut Context<'_>,
    ) -> Result<(), FeatureError> {
        let Some(button) = self.button else {
            return Ok(());
        };
        if clicked_node(event, current) != Some(button) {
            return Ok(());
        }
        self.theme = self.theme.toggled();
        self.apply(cx.dom, button)?;
        cx.services.preferences.set(THEME_KEY, self.theme.as_str())?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::Theme;

    #[test]
    fn parse_accepts_known_themes_only() {
        assert_eq!(Theme::parse("dark"), Some(Theme::Dark));
        assert_eq!(Theme::parse(" light\n"), Some(Theme::Light));
        assert_eq!(Theme::parse("sepia"), None);
    }

    #[test]
    fn toggling_twice_is_identity() {
        assert_eq!(Theme::Dark.toggled().toggled(), Theme::Dark);
    }
}
