pub mod config;
pub mod debounce;
pub mod dom;
pub mod error;
pub mod keyboard;
pub mod navbar;
pub mod navigation;
pub mod page;
pub mod registry;
pub mod runtime;
pub mod scenario;
pub mod scroll;
pub mod storage;
pub mod tracker;

pub use config::{AppConfig, EasingType, ScrollConfig};
pub use error::{Error, Result};
pub use navigation::{NavigationController, NavigationEvent};
pub use page::{Page, PageEvent};
pub use registry::Section;
