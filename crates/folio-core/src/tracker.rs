//! Active-section tracking
//!
//! Measures registered sections against a reference line
//! (`scroll_y + scroll_offset`) and resolves which one is current. The
//! tracker keeps the nav links' `active` marker in sync with that choice;
//! URL and event side effects belong to the navigation controller.

use tracing::{debug, warn};

use crate::dom::{Document, ElementId, Viewport};
use crate::registry::{Section, SectionRegistry};

/// Class applied to the link of the current section
pub const ACTIVE_CLASS: &str = "active";

/// A navigation control bound to a section id through its `#fragment` href
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavLink {
    pub element: ElementId,
    pub section_id: String,
}

#[derive(Debug, Clone)]
pub struct ActiveSectionTracker {
    registry: SectionRegistry,
    links: Vec<NavLink>,
    current: Option<String>,
    scroll_offset: f64,
}

impl ActiveSectionTracker {
    pub fn new(scroll_offset: f64) -> Self {
        Self {
            registry: SectionRegistry::new(),
            links: Vec::new(),
            current: None,
            scroll_offset,
        }
    }

    pub fn registry(&self) -> &SectionRegistry {
        &self.registry
    }

    pub fn links(&self) -> &[NavLink] {
        &self.links
    }

    pub fn current(&self) -> Option<&str> {
        self.current.as_deref()
    }

    pub fn scroll_offset(&self) -> f64 {
        self.scroll_offset
    }

    /// Insert or replace a section. Returns false (and logs) when the id is
    /// empty or the element is not part of the document.
    pub fn register<D: Document + Viewport>(&mut self, host: &D, id: &str, element: ElementId) -> bool {
        if id.is_empty() {
            warn!(?element, "Dropping section registration without an id");
            return false;
        }
        if host.bounding_rect(element).is_none() {
            warn!(id, ?element, "Dropping section registration: element not in document");
            return false;
        }
        if self.registry.insert(Section::new(id, element)).is_some() {
            debug!(id, "Section replaced");
        } else {
            debug!(id, "Section registered");
        }
        true
    }

    /// Remove a section; clears the current id when it was the current one
    pub fn unregister(&mut self, id: &str) -> Option<Section> {
        let removed = self.registry.remove(id)?;
        if self.current.as_deref() == Some(id) {
            self.current = None;
        }
        debug!(id, "Section unregistered");
        Some(removed)
    }

    pub fn bind_link(&mut self, element: ElementId, section_id: &str) {
        self.links.retain(|link| link.element != element);
        self.links.push(NavLink {
            element,
            section_id: section_id.to_string(),
        });
    }

    /// The bound link that is or contains `target`
    pub fn link_for<D: Document>(&self, doc: &D, target: ElementId) -> Option<&NavLink> {
        self.links
            .iter()
            .find(|link| link.element == target)
            .or_else(|| self.links.iter().find(|link| doc.contains(link.element, target)))
    }

    /// `scroll_y + scroll_offset`
    pub fn reference_line<V: Viewport>(&self, viewport: &V) -> f64 {
        viewport.scroll_y() + self.scroll_offset
    }

    /// Re-read geometry for every section and refresh `top`, `bottom` and
    /// `is_visible`. Sections whose element vanished keep their cached span
    /// and are marked invisible.
    pub fn recompute_positions<D: Document + Viewport>(&mut self, host: &D) {
        let scroll_y = host.scroll_y();
        let probe = self.reference_line(host) + host.inner_height() / 2.0;

        for section in self.registry.iter_mut() {
            match host.bounding_rect(section.element) {
                Some(rect) => {
                    section.top = rect.top + scroll_y;
                    section.bottom = section.top + rect.height.max(0.0);
                    section.is_visible = section.spans(probe);
                }
                None => {
                    debug!(id = %section.id, "Section element missing during measurement");
                    section.is_visible = false;
                }
            }
        }
    }

    /// Pick the current section from cached positions without mutating state
    ///
    /// Nearest visible top to the reference line wins; with nothing visible,
    /// the greatest top at or above the line. Ties keep the earlier
    /// registration.
    pub fn resolve_active<V: Viewport>(&self, viewport: &V) -> Option<&str> {
        let line = self.reference_line(viewport);
        nearest_to(line, self.registry.iter().filter(|s| s.is_visible))
            .or_else(|| nearest_to(line, self.registry.iter().filter(|s| s.top <= line)))
            .map(|section| section.id.as_str())
    }

    /// Resolve and store the current section; returns the new id on change
    pub fn recompute_active<D: Document + Viewport>(&mut self, host: &mut D) -> Option<String> {
        let resolved = self.resolve_active(&*host)?.to_string();
        if self.current.as_deref() == Some(resolved.as_str()) {
            return None;
        }
        debug!(from = ?self.current, to = %resolved, "Current section changed");
        self.current = Some(resolved.clone());
        self.sync_links(host);
        Some(resolved)
    }

    /// Explicit navigation; returns true when the current id changed
    pub fn set_current<D: Document>(&mut self, doc: &mut D, id: &str) -> bool {
        let changed = self.current.as_deref() != Some(id);
        if changed {
            self.current = Some(id.to_string());
        }
        self.sync_links(doc);
        changed
    }

    /// The link that carries the active marker: the last one bound to the
    /// current section when several point at it
    pub fn active_link(&self) -> Option<ElementId> {
        let current = self.current.as_deref()?;
        self.links
            .iter()
            .rev()
            .find(|link| link.section_id == current)
            .map(|link| link.element)
    }

    /// Mark exactly one link active, the one for the current section
    pub fn sync_links<D: Document>(&self, doc: &mut D) {
        let active = self.active_link();
        for link in &self.links {
            if Some(link.element) == active {
                doc.add_class(link.element, ACTIVE_CLASS);
            } else {
                doc.remove_class(link.element, ACTIVE_CLASS);
            }
        }
    }

    /// Drop every section, link and active marker
    pub fn clear<D: Document>(&mut self, doc: &mut D) {
        for link in &self.links {
            doc.remove_class(link.element, ACTIVE_CLASS);
        }
        self.links.clear();
        self.registry.clear();
        self.current = None;
    }
}

/// First section (in iteration order) whose top is closest to `line`
fn nearest_to<'a>(line: f64, candidates: impl Iterator<Item = &'a Section>) -> Option<&'a Section> {
    let mut best: Option<(&Section, f64)> = None;
    for section in candidates {
        let distance = (section.top - line).abs();
        if best.map_or(true, |(_, d)| distance < d) {
            best = Some((section, distance));
        }
    }
    best.map(|(section, _)| section)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::{PageLayout, VirtualDocument};

    // home 0..800, about 800..1700, projects 1700..2300, contact 2300..2700
    const PAGE: &str = r##"
        title = "Portfolio"
        [viewport]
        width = 1280
        height = 800
        [navbar]
        links = [
            { label = "Home", href = "#home" },
            { label = "About", href = "#about" },
            { label = "Projects", href = "#projects" },
            { label = "Contact", href = "#contact" },
        ]
        [[sections]]
        id = "home"
        title = "Home"
        height = 800
        [[sections]]
        id = "about"
        title = "About"
        height = 900
        [[sections]]
        id = "projects"
        title = "Projects"
        height = 600
        [[sections]]
        id = "contact"
        title = "Contact"
        height = 400
    "##;

    fn setup() -> (VirtualDocument, ActiveSectionTracker) {
        let doc = PageLayout::from_toml(PAGE).unwrap().build().unwrap();
        let mut tracker = ActiveSectionTracker::new(70.0);
        for element in doc.query_all("section[id]") {
            let id = doc.attribute(element, "id").unwrap();
            assert!(tracker.register(&doc, &id, element));
        }
        for element in doc.query_all(".nav-link") {
            let href = doc.attribute(element, "href").unwrap();
            tracker.bind_link(element, href.trim_start_matches('#'));
        }
        (doc, tracker)
    }

    fn active_links(doc: &VirtualDocument, tracker: &ActiveSectionTracker) -> Vec<String> {
        tracker
            .links()
            .iter()
            .filter(|link| doc.has_class(link.element, ACTIVE_CLASS))
            .map(|link| link.section_id.clone())
            .collect()
    }

    #[test]
    fn test_positions_in_document_coordinates() {
        let (mut doc, mut tracker) = setup();
        doc.scroll_to(1000.0);
        tracker.recompute_positions(&doc);

        let about = tracker.registry().get("about").unwrap();
        assert_eq!((about.top, about.bottom), (800.0, 1700.0));
        // probe = 1000 + 70 + 400
        assert!(about.is_visible);
        assert!(!tracker.registry().get("home").unwrap().is_visible);
    }

    #[test]
    fn test_recompute_active_updates_links() {
        let (mut doc, mut tracker) = setup();
        tracker.recompute_positions(&doc);
        assert_eq!(tracker.recompute_active(&mut doc).as_deref(), Some("home"));
        assert_eq!(active_links(&doc, &tracker), vec!["home"]);

        // unchanged resolution reports nothing
        assert_eq!(tracker.recompute_active(&mut doc), None);

        doc.scroll_to(1500.0);
        tracker.recompute_positions(&doc);
        assert_eq!(tracker.recompute_active(&mut doc).as_deref(), Some("projects"));
        assert_eq!(active_links(&doc, &tracker), vec!["projects"]);
    }

    #[test]
    fn test_recompute_positions_is_idempotent() {
        let (mut doc, mut tracker) = setup();
        doc.scroll_to(1234.0);
        tracker.recompute_positions(&doc);
        let first: Vec<Section> = tracker.registry().iter().cloned().collect();
        tracker.recompute_positions(&doc);
        let second: Vec<Section> = tracker.registry().iter().cloned().collect();
        assert_eq!(first, second);
    }

    #[test]
    fn test_current_is_monotonic_for_increasing_scroll() {
        let (mut doc, mut tracker) = setup();
        let mut last_index = 0;
        let mut y = 0.0;
        while y <= doc.max_scroll() {
            doc.scroll_to(y);
            tracker.recompute_positions(&doc);
            tracker.recompute_active(&mut doc);
            let index = tracker.registry().index_of(tracker.current().unwrap()).unwrap();
            assert!(index >= last_index, "went back to {index} at y={y}");
            assert!(active_links(&doc, &tracker).len() <= 1);
            last_index = index;
            y += 25.0;
        }
        assert_eq!(tracker.current(), Some("contact"));
    }

    #[test]
    fn test_fallback_to_last_section_scrolled_past() {
        let (mut doc, mut tracker) = setup();
        // unregistered footer below the last section
        let footer = doc.create_element("footer");
        let body = doc.body();
        doc.append_child(body, footer);
        doc.set_height(footer, 2000.0);

        doc.scroll_to(3000.0);
        tracker.recompute_positions(&doc);
        assert!(tracker.registry().iter().all(|s| !s.is_visible));
        assert_eq!(tracker.resolve_active(&doc), Some("contact"));
    }

    #[test]
    fn test_overlap_prefers_first_registered() {
        let (doc, mut tracker) = setup();
        for id in ["about", "projects"] {
            let section = tracker.registry.get_mut(id).unwrap();
            section.top = 100.0;
            section.bottom = 900.0;
            section.is_visible = true;
        }
        assert_eq!(tracker.resolve_active(&doc), Some("about"));
    }

    #[test]
    fn test_empty_registry_is_inert() {
        let mut doc = VirtualDocument::blank();
        let mut tracker = ActiveSectionTracker::new(70.0);
        tracker.recompute_positions(&doc);
        assert_eq!(tracker.recompute_active(&mut doc), None);
        assert_eq!(tracker.current(), None);
    }

    #[test]
    fn test_rejects_detached_and_unnamed() {
        let (mut doc, mut tracker) = setup();
        let detached = doc.create_element("section");
        assert!(!tracker.register(&doc, "gallery", detached));
        let home = tracker.registry().get("home").unwrap().element;
        assert!(!tracker.register(&doc, "", home));
        assert_eq!(tracker.registry().len(), 4);
    }

    #[test]
    fn test_unregister_current_clears_it() {
        let (mut doc, mut tracker) = setup();
        tracker.set_current(&mut doc, "about");
        assert!(tracker.unregister("about").is_some());
        assert_eq!(tracker.current(), None);
        assert!(tracker.unregister("about").is_none());
    }

    #[test]
    fn test_link_for_matches_descendants() {
        let (mut doc, tracker) = setup();
        let link = tracker.links()[1].element;
        let label = doc.create_element("span");
        doc.append_child(link, label);
        assert_eq!(tracker.link_for(&doc, label).map(|l| l.section_id.as_str()), Some("about"));
        assert!(tracker.link_for(&doc, doc.body()).is_none());
    }

    #[test]
    fn test_one_active_link_per_section() {
        let (mut doc, mut tracker) = setup();
        // a second "#about" link, e.g. a call-to-action in the hero
        let cta = doc.create_element("a");
        doc.set_attribute(cta, "href", "#about");
        let home = tracker.registry().get("home").unwrap().element;
        doc.append_child(home, cta);
        tracker.bind_link(cta, "about");

        tracker.set_current(&mut doc, "about");
        assert_eq!(active_links(&doc, &tracker), vec!["about"]);
        assert_eq!(tracker.active_link(), Some(cta));
        assert!(doc.has_class(cta, ACTIVE_CLASS));

        // both links still route clicks
        assert_eq!(tracker.link_for(&doc, cta).map(|l| l.section_id.as_str()), Some("about"));
        assert_eq!(
            tracker.link_for(&doc, tracker.links()[1].element).map(|l| l.section_id.as_str()),
            Some("about")
        );

        tracker.set_current(&mut doc, "contact");
        assert_eq!(active_links(&doc, &tracker), vec!["contact"]);
        assert!(!doc.has_class(cta, ACTIVE_CLASS));
    }
}
