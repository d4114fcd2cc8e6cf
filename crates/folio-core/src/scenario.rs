//! Scripted interaction against a virtual page
//!
//! ```toml
//! name = "gallery tour"
//!
//! [[steps]]
//! action = "add_section"
//! id = "gallery"
//! title = "Gallery"
//! height = 700
//! after = "about"
//!
//! [[steps]]
//! action = "navigate"
//! id = "gallery"
//!
//! [[steps]]
//! action = "wait"
//! ms = 1000
//! ```

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::dom::{Document, Viewport, VirtualDocument};
use crate::keyboard::{KeyInput, Modifiers, NavKey};
use crate::page::{Page, PageEvent};
use crate::{Error, Result};

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum Step {
    /// User scroll to an absolute position
    ScrollTo { y: f64 },
    /// User scroll by a delta
    ScrollBy { dy: f64 },
    /// Click the first element matching `selector`
    Click { selector: String },
    Key {
        key: String,
        #[serde(default)]
        modifiers: Vec<String>,
    },
    Resize { width: f64, height: f64 },
    /// Let frames and timers run
    Wait { ms: u64 },
    Navigate {
        id: String,
        #[serde(default = "default_true")]
        smooth: bool,
    },
    /// Insert a section into `main` (after `after`, else last) and register it
    AddSection {
        id: String,
        title: String,
        height: f64,
        #[serde(default)]
        body: String,
        #[serde(default)]
        after: Option<String>,
    },
    /// Unregister a section and drop its element
    RemoveSection { id: String },
    ToggleMenu,
}

impl Step {
    pub fn wait_duration(&self) -> Option<Duration> {
        match self {
            Step::Wait { ms } => Some(Duration::from_millis(*ms)),
            _ => None,
        }
    }

    /// Perform the step; `wait` steps do nothing here
    pub fn apply(&self, page: &mut Page<VirtualDocument>) {
        match self {
            Step::ScrollTo { y } => {
                page.host_mut().scroll_to(*y);
                page.dispatch(PageEvent::Scroll);
            }
            Step::ScrollBy { dy } => {
                page.host_mut().scroll_by(*dy);
                page.dispatch(PageEvent::Scroll);
            }
            Step::Click { selector } => match page.host().query_one(selector) {
                Some(target) => {
                    page.dispatch(PageEvent::Click { target });
                }
                None => warn!(selector = %selector, "Click target not found"),
            },
            Step::Key { key, modifiers } => {
                let input = KeyInput::new(
                    NavKey::from_name(key),
                    Modifiers::from_names(modifiers.iter().map(String::as_str)),
                );
                page.dispatch(PageEvent::Key(input));
            }
            Step::Resize { width, height } => {
                page.host_mut().set_viewport_size(*width, *height);
                page.dispatch(PageEvent::Resize {
                    width: *width,
                    height: *height,
                });
            }
            Step::Wait { .. } => {}
            Step::Navigate { id, smooth } => {
                page.navigate_to(id, *smooth);
            }
            Step::AddSection {
                id,
                title,
                height,
                body,
                after,
            } => match page.host_mut().insert_section(id, title, *height, body, after.as_deref()) {
                Some(element) => {
                    page.add_section(id, element);
                }
                None => warn!(id = %id, "Page has no main element to insert into"),
            },
            Step::RemoveSection { id } => {
                if let Some(element) = page.section(id).map(|s| s.element) {
                    page.host_mut().remove(element);
                }
                page.remove_section(id);
            }
            Step::ToggleMenu => page.toggle_menu(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Scenario {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub steps: Vec<Step>,
}

impl Scenario {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        let scenario: Self = toml::from_str(content).map_err(|e| Error::Scenario(e.to_string()))?;
        scenario.validate()?;
        Ok(scenario)
    }

    fn validate(&self) -> Result<()> {
        for (index, step) in self.steps.iter().enumerate() {
            match step {
                Step::Key { key, .. } if NavKey::from_name(key) == NavKey::Other => {
                    return Err(Error::Scenario(format!("step {index}: unknown key '{key}'")));
                }
                Step::Resize { width, height }
                    if !(width.is_finite() && height.is_finite() && *width >= 0.0 && *height >= 0.0) =>
                {
                    return Err(Error::Scenario(format!("step {index}: invalid viewport size")));
                }
                Step::AddSection { height, .. } if !height.is_finite() || *height < 0.0 => {
                    return Err(Error::Scenario(format!("step {index}: invalid section height")));
                }
                _ => {}
            }
        }
        Ok(())
    }

    /// Total time spent in `wait` steps
    pub fn duration(&self) -> Duration {
        self.steps.iter().filter_map(Step::wait_duration).sum()
    }

    /// Replay on a manual-clock page, ticking every `frame` during waits
    pub fn replay(&self, page: &mut Page<VirtualDocument>, frame: Duration) {
        for (index, step) in self.steps.iter().enumerate() {
            debug!(index, ?step, "Scenario step");
            match step.wait_duration() {
                Some(wait) => run_frames(page, wait, frame),
                None => step.apply(page),
            }
        }
    }
}

fn run_frames(page: &mut Page<VirtualDocument>, total: Duration, frame: Duration) {
    let frame = frame.max(Duration::from_millis(1));
    let mut elapsed = Duration::ZERO;
    while elapsed < total {
        let dt = frame.min(total - elapsed);
        page.host_mut().advance(dt);
        page.tick();
        elapsed += dt;
    }
}
