use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub navigation: NavigationConfig,
    #[serde(default)]
    pub scroll: ScrollConfig,
    #[serde(default)]
    pub navbar: NavbarConfig,
    #[serde(default)]
    pub keyboard: KeyboardConfig,
    #[serde(default)]
    pub ui: UiConfig,
    #[serde(default)]
    pub keymap: KeymapConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Data directory path (preferences, log file)
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
    /// Log level
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            log_level: default_log_level(),
        }
    }
}

/// Section tracking settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NavigationConfig {
    /// Fixed navbar height subtracted from scroll targets and added to the reference line
    #[serde(default = "default_scroll_offset")]
    pub scroll_offset: f64,
    /// Quiet period before a burst of scroll events triggers recomputation
    #[serde(default = "default_scroll_debounce")]
    pub scroll_debounce_ms: u64,
    /// Delay before re-measuring after a section is added
    #[serde(default = "default_settle_delay")]
    pub settle_delay_ms: u64,
    /// Section id whose URL is the bare path (no fragment)
    #[serde(default = "default_home_section")]
    pub home_section: String,
    /// Selector for sections registered at init
    #[serde(default = "default_section_selector")]
    pub section_selector: String,
    /// Selector for navigation links registered at init
    #[serde(default = "default_link_selector")]
    pub link_selector: String,
}

impl Default for NavigationConfig {
    fn default() -> Self {
        Self {
            scroll_offset: default_scroll_offset(),
            scroll_debounce_ms: default_scroll_debounce(),
            settle_delay_ms: default_settle_delay(),
            home_section: default_home_section(),
            section_selector: default_section_selector(),
            link_selector: default_link_selector(),
        }
    }
}

/// Easing curve used by the scroll animator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EasingType {
    /// Jump at the end of the duration
    None,
    Linear,
    InOutQuad,
    #[default]
    InOutCubic,
    OutCubic,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScrollConfig {
    /// Animate programmatic navigation; instant jumps when false
    #[serde(default = "default_true")]
    pub smooth_enabled: bool,
    /// Duration of one navigation animation
    #[serde(default = "default_animation_duration")]
    pub animation_duration_ms: u64,
    #[serde(default)]
    pub easing: EasingType,
    /// Frame rate used by hosts that drive frames from a timer
    #[serde(default = "default_animation_fps")]
    pub animation_fps: u32,
}

impl Default for ScrollConfig {
    fn default() -> Self {
        Self {
            smooth_enabled: default_true(),
            animation_duration_ms: default_animation_duration(),
            easing: EasingType::default(),
            animation_fps: default_animation_fps(),
        }
    }
}

impl ScrollConfig {
    pub fn animation_duration(&self) -> Duration {
        Duration::from_millis(self.animation_duration_ms)
    }

    /// Frame length for hosts that drive frames from a timer; 60fps when
    /// unset, never shorter than 1ms
    pub fn frame_interval(&self) -> Duration {
        match self.animation_fps {
            0 => Duration::from_millis(16),
            fps => Duration::from_millis((1000 / u64::from(fps)).max(1)),
        }
    }

    /// Whether navigation animates at all
    pub fn is_smooth(&self) -> bool {
        self.smooth_enabled && self.animation_duration_ms > 0
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NavbarConfig {
    /// Viewport width above which the mobile menu is force-closed
    #[serde(default = "default_mobile_breakpoint")]
    pub mobile_breakpoint: f64,
    /// Vertical scroll beyond which the navbar gets the `scrolled` class
    #[serde(default = "default_scrolled_threshold")]
    pub scrolled_threshold: f64,
}

impl Default for NavbarConfig {
    fn default() -> Self {
        Self {
            mobile_breakpoint: default_mobile_breakpoint(),
            scrolled_threshold: default_scrolled_threshold(),
        }
    }
}

/// Modifier that must be held for section keyboard navigation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModifierKey {
    #[default]
    Alt,
    Ctrl,
    Shift,
    Meta,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KeyboardConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default)]
    pub modifier: ModifierKey,
}

impl Default for KeyboardConfig {
    fn default() -> Self {
        Self {
            enabled: default_true(),
            modifier: ModifierKey::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UiConfig {
    /// Tick rate in milliseconds while idle
    #[serde(default = "default_tick_rate")]
    pub tick_rate_ms: u64,
    /// Page pixels represented by one terminal row
    #[serde(default = "default_px_per_row")]
    pub px_per_row: f64,
    /// Page pixels represented by one terminal column
    #[serde(default = "default_px_per_col")]
    pub px_per_col: f64,
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            tick_rate_ms: default_tick_rate(),
            px_per_row: default_px_per_row(),
            px_per_col: default_px_per_col(),
        }
    }
}

/// Terminal preview bindings using Vim-style notation
/// Format: "j", "<C-d>" (Ctrl+d), "<S-Tab>" (Shift+Tab), "<A-x>" (Alt+x), "<Esc>", "<Space>"
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KeymapConfig {
    #[serde(default = "default_key_quit")]
    pub quit: String,
    #[serde(default = "default_key_scroll_down")]
    pub scroll_down: String,
    #[serde(default = "default_key_scroll_up")]
    pub scroll_up: String,
    #[serde(default = "default_key_page_down")]
    pub page_down: String,
    #[serde(default = "default_key_page_up")]
    pub page_up: String,
    /// Open/close the mobile menu
    #[serde(default = "default_key_toggle_menu")]
    pub toggle_menu: String,
    /// Simulates a click outside the navbar
    #[serde(default = "default_key_close_menu")]
    pub close_menu: String,
}

impl Default for KeymapConfig {
    fn default() -> Self {
        Self {
            quit: default_key_quit(),
            scroll_down: default_key_scroll_down(),
            scroll_up: default_key_scroll_up(),
            page_down: default_key_page_down(),
            page_up: default_key_page_up(),
            toggle_menu: default_key_toggle_menu(),
            close_menu: default_key_close_menu(),
        }
    }
}

fn default_key_quit() -> String { "q".to_string() }
fn default_key_scroll_down() -> String { "j".to_string() }
fn default_key_scroll_up() -> String { "k".to_string() }
fn default_key_page_down() -> String { "<C-d>".to_string() }
fn default_key_page_up() -> String { "<C-u>".to_string() }
fn default_key_toggle_menu() -> String { "m".to_string() }
fn default_key_close_menu() -> String { "<Esc>".to_string() }

fn default_data_dir() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("folio")
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_true() -> bool {
    true
}

fn default_scroll_offset() -> f64 {
    70.0 // navbar height
}

fn default_scroll_debounce() -> u64 {
    10
}

fn default_settle_delay() -> u64 {
    100
}

fn default_home_section() -> String {
    "home".to_string()
}

fn default_section_selector() -> String {
    "section[id]".to_string()
}

fn default_link_selector() -> String {
    ".nav-link".to_string()
}

fn default_animation_duration() -> u64 {
    800
}

fn default_animation_fps() -> u32 {
    60
}

fn default_mobile_breakpoint() -> f64 {
    768.0
}

fn default_scrolled_threshold() -> f64 {
    50.0
}

fn default_tick_rate() -> u64 {
    100
}

fn default_px_per_row() -> f64 {
    20.0
}

fn default_px_per_col() -> f64 {
    8.0
}

/// Expand tilde (~) in path to user's home directory
fn expand_tilde(path: &std::path::Path) -> PathBuf {
    if let Some(path_str) = path.to_str() {
        if let Some(stripped) = path_str.strip_prefix("~/") {
            if let Some(home) = dirs::home_dir() {
                return home.join(stripped);
            }
        } else if path_str == "~" {
            if let Some(home) = dirs::home_dir() {
                return home;
            }
        }
    }
    path.to_path_buf()
}

impl AppConfig {
    /// Load configuration from file or return defaults
    pub fn load() -> crate::Result<Self> {
        Self::load_from(&Self::config_path())
    }

    /// Load configuration from an explicit path, defaults when it does not exist
    pub fn load_from(path: &std::path::Path) -> crate::Result<Self> {
        if path.exists() {
            let content = std::fs::read_to_string(path)?;
            Self::from_toml(&content)
        } else {
            Ok(Self::default())
        }
    }

    pub fn from_toml(content: &str) -> crate::Result<Self> {
        toml::from_str(content).map_err(|e| crate::Error::Config(e.to_string()))
    }

    /// Save configuration to file
    pub fn save(&self) -> crate::Result<()> {
        let config_path = Self::config_path();

        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)
            .map_err(|e| crate::Error::Config(e.to_string()))?;
        std::fs::write(&config_path, content)?;

        Ok(())
    }

    /// Get the configuration file path
    /// Always uses ~/.config/folio/config.toml on all platforms
    pub fn config_path() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".config")
            .join("folio")
            .join("config.toml")
    }

    /// Get the data directory (with tilde expansion)
    pub fn data_dir(&self) -> PathBuf {
        expand_tilde(&self.general.data_dir)
    }

    /// Get the preferences file path
    pub fn preferences_path(&self) -> PathBuf {
        self.data_dir().join("preferences.json")
    }

    /// Get the log file path used by the terminal preview
    pub fn log_path(&self) -> PathBuf {
        self.data_dir().join("folio.log")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.navigation.scroll_offset, 70.0);
        assert_eq!(config.navigation.scroll_debounce_ms, 10);
        assert_eq!(config.navigation.home_section, "home");
        assert_eq!(config.scroll.animation_duration_ms, 800);
        assert_eq!(config.scroll.easing, EasingType::InOutCubic);
        assert_eq!(config.navbar.mobile_breakpoint, 768.0);
        assert_eq!(config.navbar.scrolled_threshold, 50.0);
        assert_eq!(config.keyboard.modifier, ModifierKey::Alt);
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = AppConfig::from_toml(
            r#"
            [navigation]
            home_section = "ana-sayfa"

            [scroll]
            easing = "in_out_quad"

            [keyboard]
            modifier = "ctrl"
            "#,
        )
        .unwrap();

        assert_eq!(config.navigation.home_section, "ana-sayfa");
        assert_eq!(config.navigation.scroll_offset, 70.0);
        assert_eq!(config.scroll.easing, EasingType::InOutQuad);
        assert!(config.scroll.smooth_enabled);
        assert_eq!(config.keyboard.modifier, ModifierKey::Ctrl);
        assert_eq!(config.keymap.quit, "q");
    }

    #[test]
    fn test_scroll_timing() {
        let mut scroll = ScrollConfig::default();
        assert_eq!(scroll.animation_duration(), Duration::from_millis(800));
        assert_eq!(scroll.frame_interval(), Duration::from_millis(16));
        assert!(scroll.is_smooth());

        scroll.animation_fps = 0;
        assert_eq!(scroll.frame_interval(), Duration::from_millis(16));
        scroll.animation_fps = 30;
        assert_eq!(scroll.frame_interval(), Duration::from_millis(33));
        scroll.animation_fps = 2000;
        assert_eq!(scroll.frame_interval(), Duration::from_millis(1));

        scroll.animation_duration_ms = 0;
        assert!(!scroll.is_smooth());
        scroll.animation_duration_ms = 800;
        scroll.smooth_enabled = false;
        assert!(!scroll.is_smooth());
    }

    #[test]
    fn test_invalid_toml_is_config_error() {
        let err = AppConfig::from_toml("[scroll]\neasing = \"bounce\"").unwrap_err();
        assert!(matches!(err, crate::Error::Config(_)));
    }

    #[test]
    fn test_tilde_expansion() {
        let mut config = AppConfig::default();
        config.general.data_dir = PathBuf::from("/tmp/folio-data");
        assert_eq!(config.preferences_path(), PathBuf::from("/tmp/folio-data/preferences.json"));
        assert_eq!(config.log_path(), PathBuf::from("/tmp/folio-data/folio.log"));
    }
}
