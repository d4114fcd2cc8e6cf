//! Insertion-ordered registry of navigable sections
//!
//! Keyboard navigation ("first", "last", "next", "previous") is defined in
//! terms of this order, so iteration order is part of the contract:
//! sections come back in the order they were first registered, and
//! replacing an existing id keeps its original slot.

use std::collections::HashMap;

use crate::dom::ElementId;

/// One navigable block of the page
#[derive(Debug, Clone, PartialEq)]
pub struct Section {
    pub id: String,
    pub element: ElementId,
    /// Document-coordinate top, cached from the last measurement
    pub top: f64,
    /// Always `>= top`
    pub bottom: f64,
    /// Whether the reference probe fell inside `[top, bottom)` at the last measurement
    pub is_visible: bool,
}

impl Section {
    pub fn new(id: impl Into<String>, element: ElementId) -> Self {
        Self {
            id: id.into(),
            element,
            top: 0.0,
            bottom: 0.0,
            is_visible: false,
        }
    }

    pub fn height(&self) -> f64 {
        self.bottom - self.top
    }

    /// Half-open containment used for visibility
    pub fn spans(&self, y: f64) -> bool {
        self.top <= y && y < self.bottom
    }
}

#[derive(Debug, Clone, Default)]
pub struct SectionRegistry {
    order: Vec<String>,
    entries: HashMap<String, Section>,
}

impl SectionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace; returns the replaced section
    pub fn insert(&mut self, section: Section) -> Option<Section> {
        let id = section.id.clone();
        let previous = self.entries.insert(id.clone(), section);
        if previous.is_none() {
            self.order.push(id);
        }
        previous
    }

    pub fn remove(&mut self, id: &str) -> Option<Section> {
        let removed = self.entries.remove(id)?;
        self.order.retain(|existing| existing != id);
        Some(removed)
    }

    pub fn get(&self, id: &str) -> Option<&Section> {
        self.entries.get(id)
    }

    pub fn get_mut(&mut self, id: &str) -> Option<&mut Section> {
        self.entries.get_mut(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.entries.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Ids in registry order
    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.order.iter().map(String::as_str)
    }

    /// Sections in registry order
    pub fn iter(&self) -> impl Iterator<Item = &Section> {
        self.order.iter().filter_map(|id| self.entries.get(id))
    }

    /// Mutable sections in registry order
    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Section> {
        let mut by_id: HashMap<&str, &mut Section> = self
            .entries
            .iter_mut()
            .map(|(id, section)| (id.as_str(), section))
            .collect();
        self.order
            .iter()
            .filter_map(move |id| by_id.remove(id.as_str()))
    }

    pub fn index_of(&self, id: &str) -> Option<usize> {
        self.order.iter().position(|existing| existing == id)
    }

    pub fn first(&self) -> Option<&str> {
        self.order.first().map(String::as_str)
    }

    pub fn last(&self) -> Option<&str> {
        self.order.last().map(String::as_str)
    }

    /// Id after `id` in registry order; the first id when `id` is not registered
    pub fn next_after(&self, id: Option<&str>) -> Option<&str> {
        match id.and_then(|id| self.index_of(id)) {
            Some(index) => self.order.get(index + 1).map(String::as_str),
            None => self.first(),
        }
    }

    /// Id before `id` in registry order; `None` at the start or when unknown
    pub fn previous_before(&self, id: Option<&str>) -> Option<&str> {
        let index = id.and_then(|id| self.index_of(id))?;
        index
            .checked_sub(1)
            .and_then(|i| self.order.get(i))
            .map(String::as_str)
    }

    pub fn clear(&mut self) {
        self.order.clear();
        self.entries.clear();
    }
}
