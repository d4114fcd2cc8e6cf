use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};
use url::Url;

use super::{Document, VirtualDocument};
use crate::{Error, Result};

/// Declarative description of a one-page site, loaded from TOML
///
/// ```toml
/// title = "Portfolio"
/// url = "https://example.com/index.html"
///
/// [navbar]
/// brand = "MS"
/// links = [{ label = "About", href = "#about" }]
///
/// [[sections]]
/// id = "about"
/// title = "About me"
/// height = 900
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageLayout {
    pub title: String,
    #[serde(default = "default_url")]
    pub url: String,
    #[serde(default)]
    pub viewport: ViewportLayout,
    #[serde(default)]
    pub navbar: NavbarLayout,
    #[serde(default)]
    pub sections: Vec<SectionLayout>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ViewportLayout {
    #[serde(default = "default_width")]
    pub width: f64,
    #[serde(default = "default_height")]
    pub height: f64,
}

impl Default for ViewportLayout {
    fn default() -> Self {
        Self {
            width: default_width(),
            height: default_height(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NavbarLayout {
    #[serde(default)]
    pub brand: String,
    #[serde(default = "default_navbar_height")]
    pub height: f64,
    #[serde(default)]
    pub links: Vec<LinkLayout>,
}

impl Default for NavbarLayout {
    fn default() -> Self {
        Self {
            brand: String::new(),
            height: default_navbar_height(),
            links: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LinkLayout {
    pub label: String,
    pub href: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SectionLayout {
    pub id: String,
    pub title: String,
    pub height: f64,
    #[serde(default)]
    pub body: String,
}

fn default_url() -> String {
    "https://localhost/index.html".to_string()
}

fn default_width() -> f64 {
    1280.0
}

fn default_height() -> f64 {
    800.0
}

fn default_navbar_height() -> f64 {
    70.0
}

impl PageLayout {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        let layout: Self = toml::from_str(content).map_err(|e| Error::Layout(e.to_string()))?;
        layout.validate()?;
        Ok(layout)
    }

    fn validate(&self) -> Result<()> {
        let mut seen = HashSet::new();
        for section in &self.sections {
            if section.id.is_empty() {
                return Err(Error::Layout(format!("section '{}' has an empty id", section.title)));
            }
            if !seen.insert(section.id.as_str()) {
                return Err(Error::Layout(format!("duplicate section id '{}'", section.id)));
            }
            if !section.height.is_finite() || section.height < 0.0 {
                return Err(Error::Layout(format!(
                    "section '{}' has invalid height {}",
                    section.id, section.height
                )));
            }
        }
        Ok(())
    }

    /// Build the page as a virtual document:
    /// `body > nav.navbar(#navbar-toggle, #navbar-menu > a.nav-link*) + main > section#id*`
    pub fn build(&self) -> Result<VirtualDocument> {
        let url = Url::parse(&self.url)?;
        let mut doc = VirtualDocument::new(self.viewport.width, self.viewport.height, url);
        let body = doc.body();

        let nav = doc.create_element("nav");
        doc.add_class(nav, "navbar");
        doc.set_text(nav, &self.navbar.brand);
        doc.append_child(body, nav);
        doc.set_fixed(nav, 0.0, self.navbar.height);

        let toggle = doc.create_element("button");
        doc.set_attribute(toggle, "id", "navbar-toggle");
        doc.append_child(nav, toggle);

        let menu = doc.create_element("ul");
        doc.set_attribute(menu, "id", "navbar-menu");
        doc.append_child(nav, menu);

        for link in &self.navbar.links {
            let anchor = doc.create_element("a");
            doc.add_class(anchor, "nav-link");
            doc.set_attribute(anchor, "href", &link.href);
            doc.set_text(anchor, &link.label);
            doc.append_child(menu, anchor);
        }

        let main = doc.create_element("main");
        doc.append_child(body, main);
        for section in &self.sections {
            doc.insert_section(&section.id, &section.title, section.height, &section.body, None);
        }

        Ok(doc)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::Viewport;

    const PAGE: &str = r##"
        title = "Portfolio"
        url = "https://folio.test/index.html"

        [viewport]
        width = 1024
        height = 600

        [navbar]
        brand = "MS"
        links = [
            { label = "Home", href = "#home" },
            { label = "About", href = "#about" },
            { label = "Blog", href = "blog.html" },
        ]

        [[sections]]
        id = "home"
        title = "Hello"
        height = 600

        [[sections]]
        id = "about"
        title = "About"
        height = 900
        body = "Systems programmer."
    "##;

    #[test]
    fn test_build_page() {
        let doc = PageLayout::from_toml(PAGE).unwrap().build().unwrap();
        let sections = doc.query_all("section[id]");
        assert_eq!(sections.len(), 2);
        assert_eq!(doc.attribute(sections[1], "data-title").as_deref(), Some("About"));
        assert_eq!(doc.text(sections[1]), Some("Systems programmer."));
        assert_eq!(doc.bounding_rect(sections[1]).unwrap().top, 600.0);
        assert_eq!(doc.query_all(".nav-link").len(), 3);
        assert!(doc.query_one("#navbar-toggle").is_some());
        assert_eq!(doc.inner_width(), 1024.0);
        assert_eq!(doc.max_scroll(), 900.0);
    }

    #[test]
    fn test_rejects_duplicate_ids() {
        let page = r#"
            title = "x"
            [[sections]]
            id = "a"
            title = "A"
            height = 10
            [[sections]]
            id = "a"
            title = "B"
            height = 10
        "#;
        assert!(matches!(PageLayout::from_toml(page), Err(Error::Layout(_))));
    }

    #[test]
    fn test_rejects_negative_height() {
        let page = r#"
            title = "x"
            [[sections]]
            id = "a"
            title = "A"
            height = -1
        "#;
        assert!(matches!(PageLayout::from_toml(page), Err(Error::Layout(_))));
    }
}
