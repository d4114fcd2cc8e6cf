use std::collections::BTreeMap;
use std::time::{Duration, Instant};

use tracing::warn;
use url::Url;

use super::{Document, ElementId, History, Rect, Selector, Viewport};

/// Time source for a virtual host
#[derive(Debug, Clone, Copy)]
pub enum Clock {
    /// Follows the runtime clock (honours a paused tokio clock in tests)
    System,
    /// Only moves when advanced explicitly
    Manual(Instant),
}

impl Clock {
    pub fn now(&self) -> Instant {
        match self {
            Clock::System => tokio::time::Instant::now().into_std(),
            Clock::Manual(now) => *now,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Position {
    /// Stacked vertically inside the parent, scrolls with the page
    Flow,
    /// Pinned to the viewport
    Fixed,
}

#[derive(Debug, Clone)]
struct Node {
    tag: String,
    attributes: BTreeMap<String, String>,
    classes: Vec<String>,
    text: Option<String>,
    parent: Option<ElementId>,
    children: Vec<ElementId>,
    position: Position,
    /// Explicit height; flow containers without one size to their children
    height_hint: Option<f64>,
    /// Computed: document coordinate for flow nodes, viewport coordinate for fixed ones
    top: f64,
    /// Computed
    height: f64,
}

impl Node {
    fn new(tag: &str) -> Self {
        Self {
            tag: tag.to_ascii_lowercase(),
            attributes: BTreeMap::new(),
            classes: Vec::new(),
            text: None,
            parent: None,
            children: Vec::new(),
            position: Position::Flow,
            height_hint: None,
            top: 0.0,
            height: 0.0,
        }
    }
}

/// In-memory page host: a node tree with block layout, a clamped scroll
/// position, a history stack and a clock.
///
/// Children of flow elements stack vertically in document order; fixed
/// elements (the navbar) stay pinned to the viewport.
#[derive(Debug, Clone)]
pub struct VirtualDocument {
    nodes: Vec<Node>,
    root: ElementId,
    body: ElementId,
    width: f64,
    height: f64,
    scroll_y: f64,
    location: Url,
    /// Entries replaced by `push_state`, oldest first
    past: Vec<Url>,
    clock: Clock,
}

impl VirtualDocument {
    /// Create an `html > body` document with the given viewport and address
    pub fn new(width: f64, height: f64, url: Url) -> Self {
        let mut doc = Self {
            nodes: vec![Node::new("html")],
            root: ElementId(0),
            body: ElementId(0),
            width,
            height,
            scroll_y: 0.0,
            location: url,
            past: Vec::new(),
            clock: Clock::System,
        };
        let body = doc.create_element("body");
        doc.append_child(doc.root, body);
        doc.body = body;
        doc
    }

    /// 1280x800 empty document at `about:blank`
    pub fn blank() -> Self {
        let url = Url::parse("about:blank").expect("static URL");
        Self::new(1280.0, 800.0, url)
    }

    /// Switch to a manual clock starting at `start`
    pub fn with_manual_clock(mut self, start: Instant) -> Self {
        self.clock = Clock::Manual(start);
        self
    }

    pub fn clock(&self) -> Clock {
        self.clock
    }

    /// Advance a manual clock; no effect on the system clock
    pub fn advance(&mut self, by: Duration) {
        if let Clock::Manual(ref mut now) = self.clock {
            *now += by;
        }
    }

    pub fn body(&self) -> ElementId {
        self.body
    }

    /// Create a detached element
    pub fn create_element(&mut self, tag: &str) -> ElementId {
        self.nodes.push(Node::new(tag));
        ElementId(self.nodes.len() - 1)
    }

    pub fn append_child(&mut self, parent: ElementId, child: ElementId) {
        if !self.exists(parent) || !self.exists(child) || self.is_ancestor_or_self(child, parent) {
            warn!(?parent, ?child, "Ignoring invalid append");
            return;
        }
        self.detach(child);
        self.nodes[child.0].parent = Some(parent);
        self.nodes[parent.0].children.push(child);
        self.relayout();
    }

    /// Insert `child` right after `reference` under the same parent
    pub fn insert_after(&mut self, reference: ElementId, child: ElementId) {
        let Some(parent) = self.node(reference).and_then(|n| n.parent) else {
            warn!(?reference, "Insert reference is not attached");
            return;
        };
        if !self.exists(child) || self.is_ancestor_or_self(child, parent) {
            return;
        }
        self.detach(child);
        let siblings = &mut self.nodes[parent.0].children;
        let index = siblings
            .iter()
            .position(|&c| c == reference)
            .map_or(siblings.len(), |i| i + 1);
        siblings.insert(index, child);
        self.nodes[child.0].parent = Some(parent);
        self.relayout();
    }

    /// Detach an element (and its subtree) from the document
    pub fn remove(&mut self, element: ElementId) {
        if self.exists(element) && element != self.root && element != self.body {
            self.detach(element);
            self.relayout();
        }
    }

    pub fn set_attribute(&mut self, element: ElementId, name: &str, value: &str) {
        if let Some(node) = self.nodes.get_mut(element.0) {
            node.attributes.insert(name.to_string(), value.to_string());
        }
    }

    pub fn set_text(&mut self, element: ElementId, text: &str) {
        if let Some(node) = self.nodes.get_mut(element.0) {
            node.text = Some(text.to_string());
        }
    }

    pub fn text(&self, element: ElementId) -> Option<&str> {
        self.node(element).and_then(|n| n.text.as_deref())
    }

    pub fn set_height(&mut self, element: ElementId, height: f64) {
        if let Some(node) = self.nodes.get_mut(element.0) {
            node.height_hint = Some(height.max(0.0));
            self.relayout();
        }
    }

    /// Pin an element to the viewport at `top` with the given height
    pub fn set_fixed(&mut self, element: ElementId, top: f64, height: f64) {
        if let Some(node) = self.nodes.get_mut(element.0) {
            node.position = Position::Fixed;
            node.top = top;
            node.height_hint = Some(height.max(0.0));
            self.relayout();
        }
    }

    /// Create a `<section id=..>` with a title and body and insert it into
    /// `main`, after the section `after` when given and present, else last.
    pub fn insert_section(
        &mut self,
        id: &str,
        title: &str,
        height: f64,
        body: &str,
        after: Option<&str>,
    ) -> Option<ElementId> {
        let main = self.query_one("main")?;
        let section = self.create_element("section");
        self.set_attribute(section, "id", id);
        self.set_attribute(section, "data-title", title);
        self.set_text(section, body);
        self.nodes[section.0].height_hint = Some(height.max(0.0));

        let reference = after.and_then(|after| self.query_one(&format!("section#{after}")));
        match reference {
            Some(reference) => self.insert_after(reference, section),
            None => self.append_child(main, section),
        }
        Some(section)
    }

    /// Resize the viewport, keeping the scroll position in range
    pub fn set_viewport_size(&mut self, width: f64, height: f64) {
        self.width = width.max(0.0);
        self.height = height.max(0.0);
        self.scroll_y = self.scroll_y.clamp(0.0, self.max_scroll());
    }

    pub fn scroll_by(&mut self, dy: f64) {
        self.scroll_to(self.scroll_y + dy);
    }

    pub fn document_height(&self) -> f64 {
        self.nodes[self.root.0].height
    }

    pub fn max_scroll(&self) -> f64 {
        (self.document_height() - self.height).max(0.0)
    }

    /// Number of entries pushed to the history stack, including the initial one
    pub fn history_len(&self) -> usize {
        self.past.len() + 1
    }

    fn node(&self, element: ElementId) -> Option<&Node> {
        self.nodes.get(element.0)
    }

    fn exists(&self, element: ElementId) -> bool {
        element.0 < self.nodes.len()
    }

    fn is_attached(&self, element: ElementId) -> bool {
        let mut current = Some(element);
        while let Some(id) = current {
            if id == self.root {
                return true;
            }
            current = self.node(id).and_then(|n| n.parent);
        }
        false
    }

    fn is_ancestor_or_self(&self, ancestor: ElementId, node: ElementId) -> bool {
        let mut current = Some(node);
        while let Some(id) = current {
            if id == ancestor {
                return true;
            }
            current = self.node(id).and_then(|n| n.parent);
        }
        false
    }

    fn detach(&mut self, element: ElementId) {
        if let Some(parent) = self.nodes[element.0].parent.take() {
            self.nodes[parent.0].children.retain(|&c| c != element);
        }
    }

    fn relayout(&mut self) {
        self.layout_flow(self.root, 0.0);
        self.scroll_y = self.scroll_y.clamp(0.0, self.max_scroll());
    }

    /// Lay out a flow node at `top` and return its height
    fn layout_flow(&mut self, element: ElementId, top: f64) -> f64 {
        self.nodes[element.0].top = top;
        let children = self.nodes[element.0].children.clone();
        let mut cursor = top;
        for child in children {
            match self.nodes[child.0].position {
                Position::Flow => cursor += self.layout_flow(child, cursor),
                Position::Fixed => self.layout_fixed(child),
            }
        }
        let height = self.nodes[element.0].height_hint.unwrap_or(cursor - top);
        self.nodes[element.0].height = height;
        height
    }

    /// Fixed nodes keep their own box; their descendants share it
    fn layout_fixed(&mut self, element: ElementId) {
        let (top, height) = {
            let node = &mut self.nodes[element.0];
            node.height = node.height_hint.unwrap_or(0.0);
            (node.top, node.height)
        };
        let mut stack = self.nodes[element.0].children.clone();
        while let Some(child) = stack.pop() {
            let node = &mut self.nodes[child.0];
            node.position = Position::Fixed;
            node.top = top;
            node.height = height;
            stack.extend(node.children.iter().copied());
        }
    }

    fn position_of(&self, element: ElementId) -> Position {
        self.node(element).map_or(Position::Flow, |n| n.position)
    }
}

impl Document for VirtualDocument {
    fn query_all(&self, selector: &str) -> Vec<ElementId> {
        let Some(selector) = Selector::parse(selector) else {
            warn!(selector, "Unsupported selector");
            return Vec::new();
        };

        let mut found = Vec::new();
        let mut stack = vec![self.root];
        while let Some(id) = stack.pop() {
            let node = &self.nodes[id.0];
            if selector.matches(&node.tag, &node.classes, |name| {
                node.attributes.get(name).map(String::as_str)
            }) {
                found.push(id);
            }
            stack.extend(node.children.iter().rev().copied());
        }
        found
    }

    fn attribute(&self, element: ElementId, name: &str) -> Option<String> {
        self.node(element)?.attributes.get(name).cloned()
    }

    fn bounding_rect(&self, element: ElementId) -> Option<Rect> {
        if !self.is_attached(element) {
            return None;
        }
        let node = self.node(element)?;
        let top = match self.position_of(element) {
            Position::Flow => node.top - self.scroll_y,
            Position::Fixed => node.top,
        };
        Some(Rect {
            top,
            height: node.height,
        })
    }

    fn contains(&self, ancestor: ElementId, node: ElementId) -> bool {
        self.exists(ancestor) && self.is_ancestor_or_self(ancestor, node)
    }

    fn add_class(&mut self, element: ElementId, class: &str) {
        if let Some(node) = self.nodes.get_mut(element.0) {
            if !node.classes.iter().any(|c| c == class) {
                node.classes.push(class.to_string());
            }
        }
    }

    fn remove_class(&mut self, element: ElementId, class: &str) {
        if let Some(node) = self.nodes.get_mut(element.0) {
            node.classes.retain(|c| c != class);
        }
    }

    fn toggle_class(&mut self, element: ElementId, class: &str) {
        if self.has_class(element, class) {
            self.remove_class(element, class);
        } else {
            self.add_class(element, class);
        }
    }

    fn has_class(&self, element: ElementId, class: &str) -> bool {
        self.node(element)
            .is_some_and(|n| n.classes.iter().any(|c| c == class))
    }
}

impl Viewport for VirtualDocument {
    fn scroll_y(&self) -> f64 {
        self.scroll_y
    }

    fn inner_width(&self) -> f64 {
        self.width
    }

    fn inner_height(&self) -> f64 {
        self.height
    }

    fn scroll_to(&mut self, y: f64) {
        self.scroll_y = y.clamp(0.0, self.max_scroll());
    }

    fn now(&self) -> Instant {
        self.clock.now()
    }
}

impl History for VirtualDocument {
    fn location(&self) -> &Url {
        &self.location
    }

    fn push_state(&mut self, url: Url) {
        let previous = std::mem::replace(&mut self.location, url);
        self.past.push(previous);
    }
}
