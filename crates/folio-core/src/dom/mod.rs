//! Host facade: element lookup, class mutation, viewport geometry and history
//!
//! The navigation core never owns page content. It talks to whatever hosts
//! the page through these traits, and every operation on an element the
//! host no longer knows about is a silent no-op.

use std::time::Instant;

use url::Url;

mod layout;
mod selector;
mod virtual_doc;

pub use layout::{LinkLayout, NavbarLayout, PageLayout, SectionLayout, ViewportLayout};
pub use selector::Selector;
pub use virtual_doc::{Clock, VirtualDocument};

/// Opaque handle to an element owned by the host
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ElementId(pub usize);

/// Viewport-relative vertical box, like `getBoundingClientRect()`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub top: f64,
    pub height: f64,
}

/// Element queries and class mutation
pub trait Document {
    /// First element matching `selector` in document order
    fn query_one(&self, selector: &str) -> Option<ElementId> {
        self.query_all(selector).into_iter().next()
    }

    /// All attached elements matching `selector`, in document order
    fn query_all(&self, selector: &str) -> Vec<ElementId>;

    fn attribute(&self, element: ElementId, name: &str) -> Option<String>;

    /// Geometry relative to the viewport; `None` for detached or unknown elements
    fn bounding_rect(&self, element: ElementId) -> Option<Rect>;

    /// Inclusive containment, like `Node.contains`
    fn contains(&self, ancestor: ElementId, node: ElementId) -> bool;

    fn add_class(&mut self, element: ElementId, class: &str);

    fn remove_class(&mut self, element: ElementId, class: &str);

    fn toggle_class(&mut self, element: ElementId, class: &str);

    fn has_class(&self, element: ElementId, class: &str) -> bool;
}

/// Scroll position, viewport size and the host clock
pub trait Viewport {
    fn scroll_y(&self) -> f64;

    fn inner_width(&self) -> f64;

    fn inner_height(&self) -> f64;

    /// Scroll to `y`, clamped to the scrollable range
    fn scroll_to(&mut self, y: f64);

    /// Current time on the host's frame clock
    fn now(&self) -> Instant;
}

/// Non-reloading address updates
pub trait History {
    fn location(&self) -> &Url;

    fn push_state(&mut self, url: Url);
}

/// Everything the navigation core needs from its host
pub trait Host: Document + Viewport + History {}

impl<T: Document + Viewport + History> Host for T {}

/// `add_class` that tolerates an absent element
pub fn add_class<D: Document + ?Sized>(doc: &mut D, element: Option<ElementId>, class: &str) {
    if let Some(element) = element {
        doc.add_class(element, class);
    }
}

/// `remove_class` that tolerates an absent element
pub fn remove_class<D: Document + ?Sized>(doc: &mut D, element: Option<ElementId>, class: &str) {
    if let Some(element) = element {
        doc.remove_class(element, class);
    }
}

/// `toggle_class` that tolerates an absent element
pub fn toggle_class<D: Document + ?Sized>(doc: &mut D, element: Option<ElementId>, class: &str) {
    if let Some(element) = element {
        doc.toggle_class(element, class);
    }
}

/// Document-coordinate top of an element (`offsetTop` for unpositioned content)
pub fn offset_top<H: Document + Viewport + ?Sized>(host: &H, element: ElementId) -> Option<f64> {
    host.bounding_rect(element)
        .map(|rect| rect.top + host.scroll_y())
}

/// Fragment id a link points at, for `href="#id"` links only
pub fn fragment_target(href: &str) -> Option<&str> {
    href.strip_prefix('#').filter(|id| !id.is_empty())
}
