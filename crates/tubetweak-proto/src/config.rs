use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

use super::platform;
use crate::protocol::{Action, KeyStroke, Quality};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("config parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("config serialize error: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub page: PageConfig,
    #[serde(default)]
    pub tweaks: TweaksConfig,
    #[serde(default)]
    pub log: LogConfig,
}

/// Structural markers of the host page.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageConfig {
    #[serde(default = "default_player_selector")]
    pub player_selector: String,
    #[serde(default = "default_main_player_selector")]
    pub main_player_selector: String,
    #[serde(default = "default_video_selector")]
    pub video_selector: String,
    #[serde(default = "default_video_container_selector")]
    pub video_container_selector: String,
    #[serde(default = "default_time_display_selector")]
    pub time_display_selector: String,
    #[serde(default = "default_osd_text_selector")]
    pub osd_text_selector: String,
    #[serde(default = "default_stats_panel_selector")]
    pub stats_panel_selector: String,
    #[serde(default = "default_scroll_target_selector")]
    pub scroll_target_selector: String,
    #[serde(default = "default_skip_button_selector")]
    pub skip_button_selector: String,
    #[serde(default)]
    pub ui_elements: UiElementsConfig,
    #[serde(default)]
    pub skip_button_policy: SkipButtonPolicyConfig,
}

/// How the set of player chrome elements hidden by the UI toggle is chosen.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "strategy", rename_all = "snake_case")]
pub enum UiElementsConfig {
    /// Every direct child of the player except the video container.
    NonVideoChildren,
    /// Every descendant matching one of the listed selectors.
    SelectorList { selectors: Vec<String> },
}

impl Default for UiElementsConfig {
    fn default() -> Self {
        UiElementsConfig::SelectorList {
            selectors: vec![
                ".ytp-chrome-top".to_string(),
                ".ytp-chrome-bottom".to_string(),
                ".ytp-gradient-top".to_string(),
                ".ytp-gradient-bottom".to_string(),
            ],
        }
    }
}

/// How to tell that an ad skip button can actually be clicked yet.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipButtonPolicyConfig {
    /// Not `display: none` and not `visibility: hidden`.
    #[default]
    Visibility,
    /// Takes up layout space.
    Layout,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TweaksConfig {
    #[serde(default)]
    pub playback_rate: PlaybackRateConfig,
    #[serde(default)]
    pub quality: QualityConfig,
    #[serde(default)]
    pub volume_scroll: VolumeScrollConfig,
    #[serde(default)]
    pub shortcuts: ShortcutsConfig,
    #[serde(default)]
    pub effective_time: EffectiveTimeConfig,
    #[serde(default)]
    pub ad_skip: AdSkipConfig,
    #[serde(default)]
    pub focus_main: FocusMainConfig,
}

/// Rates stepped through when no ladder is configured.
pub const DEFAULT_RATE_LADDER: [f64; 8] = [0.25, 0.5, 0.75, 1.0, 1.25, 1.5, 1.75, 2.0];

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlaybackRateConfig {
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    /// Ascending list of rates to step through. Empty means the built-in ladder.
    #[serde(default)]
    pub ladder: Vec<f64>,
    #[serde(default = "default_rate")]
    pub default_rate: f64,
}

impl PlaybackRateConfig {
    /// The configured ladder, or the built-in one when none is set.
    pub fn steps(&self) -> &[f64] {
        if self.ladder.is_empty() {
            &DEFAULT_RATE_LADDER
        } else {
            &self.ladder
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QualityConfig {
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    #[serde(default = "default_quality")]
    pub preferred: Quality,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VolumeScrollConfig {
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    /// Volume change per wheel notch, in percent.
    #[serde(default = "default_volume_step")]
    pub step: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShortcutsConfig {
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    /// Extra bindings; these win over the built-in ones for the same stroke.
    #[serde(default)]
    pub extra: Vec<Shortcut>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Shortcut {
    #[serde(flatten)]
    pub stroke: KeyStroke,
    pub action: Action,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EffectiveTimeConfig {
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    #[serde(default = "default_update_interval_ms")]
    pub update_interval_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdSkipConfig {
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    #[serde(default = "default_ad_check_interval_ms")]
    pub check_interval_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FocusMainConfig {
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    #[serde(default = "default_max_tries")]
    pub max_tries: u32,
    #[serde(default = "default_retry_interval_ms")]
    pub retry_interval_ms: u64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LogConfig {
    /// tracing `EnvFilter` directive; `RUST_LOG` wins when set.
    #[serde(default)]
    pub filter: Option<String>,
}

impl Default for PageConfig {
    fn default() -> Self {
        Self {
            player_selector: default_player_selector(),
            main_player_selector: default_main_player_selector(),
            video_selector: default_video_selector(),
            video_container_selector: default_video_container_selector(),
            time_display_selector: default_time_display_selector(),
            osd_text_selector: default_osd_text_selector(),
            stats_panel_selector: default_stats_panel_selector(),
            scroll_target_selector: default_scroll_target_selector(),
            skip_button_selector: default_skip_button_selector(),
            ui_elements: UiElementsConfig::default(),
            skip_button_policy: SkipButtonPolicyConfig::default(),
        }
    }
}

impl Default for PlaybackRateConfig {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            ladder: Vec::new(),
            default_rate: default_rate(),
        }
    }
}

impl Default for QualityConfig {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            preferred: default_quality(),
        }
    }
}

impl Default for VolumeScrollConfig {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            step: default_volume_step(),
        }
    }
}

impl Default for ShortcutsConfig {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            extra: Vec::new(),
        }
    }
}

impl Default for EffectiveTimeConfig {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            update_interval_ms: default_update_interval_ms(),
        }
    }
}

impl Default for AdSkipConfig {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            check_interval_ms: default_ad_check_interval_ms(),
        }
    }
}

impl Default for FocusMainConfig {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            max_tries: default_max_tries(),
            retry_interval_ms: default_retry_interval_ms(),
        }
    }
}

fn default_player_selector() -> String {
    ".html5-video-player".to_string()
}

fn default_main_player_selector() -> String {
    "#movie_player".to_string()
}

fn default_video_selector() -> String {
    "video".to_string()
}

fn default_video_container_selector() -> String {
    ".html5-video-container".to_string()
}

fn default_time_display_selector() -> String {
    ".ytp-time-display".to_string()
}

fn default_osd_text_selector() -> String {
    ".ytp-bezel-text".to_string()
}

fn default_stats_panel_selector() -> String {
    ".html5-video-info-panel".to_string()
}

fn default_scroll_target_selector() -> String {
    ".html5-video-container, .ytp-chrome-bottom".to_string()
}

fn default_skip_button_selector() -> String {
    ".ytp-ad-skip-button, .ytp-skip-ad-button".to_string()
}

fn default_enabled() -> bool {
    true
}

fn default_rate() -> f64 {
    1.0
}

fn default_quality() -> Quality {
    Quality::Hd1080
}

fn default_volume_step() -> f64 {
    2.0
}

fn default_update_interval_ms() -> u64 {
    500
}

fn default_ad_check_interval_ms() -> u64 {
    1000
}

fn default_max_tries() -> u32 {
    20
}

fn default_retry_interval_ms() -> u64 {
    250
}

impl Config {
    /// Load from the default location, writing a default file on first run.
    pub fn load() -> Result<Self, ConfigError> {
        let config_path = Self::config_path();

        if !config_path.exists() {
            let config = Self::default();
            config.save_to(&config_path)?;
            return Ok(config);
        }

        Self::load_from(&config_path)
    }

    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content)?;
        config.validate()?;
        tracing::debug!("loaded config from {}", path.display());
        Ok(config)
    }

    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    pub fn config_path() -> PathBuf {
        platform::config_dir().join("config.toml")
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let t = &self.tweaks;
        if t.effective_time.update_interval_ms == 0 {
            return Err(ConfigError::Invalid(
                "tweaks.effective_time.update_interval_ms must be > 0".into(),
            ));
        }
        if t.ad_skip.check_interval_ms == 0 {
            return Err(ConfigError::Invalid(
                "tweaks.ad_skip.check_interval_ms must be > 0".into(),
            ));
        }
        let rate = &t.playback_rate;
        if !(rate.default_rate.is_finite() && rate.default_rate > 0.0) {
            return Err(ConfigError::Invalid(format!(
                "tweaks.playback_rate.default_rate must be positive, got {}",
                rate.default_rate
            )));
        }
        if rate.ladder.iter().any(|r| !(r.is_finite() && *r > 0.0)) {
            return Err(ConfigError::Invalid(
                "tweaks.playback_rate.ladder entries must be positive".into(),
            ));
        }
        if rate.ladder.windows(2).any(|w| w[0] >= w[1]) {
            return Err(ConfigError::Invalid(
                "tweaks.playback_rate.ladder must be strictly ascending".into(),
            ));
        }
        let steps = rate.steps();
        let (lo, hi) = (steps[0], steps[steps.len() - 1]);
        if rate.default_rate < lo || rate.default_rate > hi {
            return Err(ConfigError::Invalid(format!(
                "tweaks.playback_rate.default_rate {} is outside the ladder [{}, {}]",
                rate.default_rate, lo, hi
            )));
        }
        if let UiElementsConfig::SelectorList { selectors } = &self.page.ui_elements {
            if selectors.is_empty() {
                return Err(ConfigError::Invalid(
                    "page.ui_elements.selectors must not be empty".into(),
                ));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::{Direction, Modifiers};

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.page.player_selector, ".html5-video-player");
        assert_eq!(config.page.main_player_selector, "#movie_player");
        assert!(config.tweaks.playback_rate.ladder.is_empty());
        assert_eq!(config.tweaks.playback_rate.default_rate, 1.0);
        assert_eq!(config.tweaks.quality.preferred, Quality::Hd1080);
        assert!(config.validate().is_ok());
        assert!(Config::config_path().ends_with("tubetweak/config.toml"));
    }

    #[test]
    fn test_partial_toml_fills_defaults() {
        let config: Config = toml::from_str(
            r#"
            [tweaks.playback_rate]
            ladder = [0.5, 1.0, 1.5]

            [page.ui_elements]
            strategy = "non_video_children"
            "#,
        )
        .unwrap();
        assert_eq!(config.tweaks.playback_rate.ladder, vec![0.5, 1.0, 1.5]);
        assert_eq!(config.tweaks.playback_rate.default_rate, 1.0);
        assert!(config.tweaks.shortcuts.enabled);
        assert_eq!(config.page.ui_elements, UiElementsConfig::NonVideoChildren);
    }

    #[test]
    fn test_extra_shortcuts_parse() {
        let config: Config = toml::from_str(
            r#"
            [[tweaks.shortcuts.extra]]
            key = "U"
            modifiers = { shift = true }
            action = { kind = "StepRate", direction = "up" }

            [[tweaks.shortcuts.extra]]
            key = "x"
            action = { kind = "ToggleUi" }
            "#,
        )
        .unwrap();
        let extra = &config.tweaks.shortcuts.extra;
        assert_eq!(extra.len(), 2);
        assert_eq!(extra[0].stroke.modifiers, Modifiers::SHIFT);
        assert_eq!(
            extra[0].action,
            Action::StepRate {
                direction: Direction::Up
            }
        );
        assert_eq!(extra[1].stroke, KeyStroke::new("x"));
        assert_eq!(extra[1].action, Action::ToggleUi);
    }

    #[test]
    fn test_validation_rejects_bad_values() {
        let mut config = Config::default();
        config.tweaks.effective_time.update_interval_ms = 0;
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));

        let mut config = Config::default();
        config.tweaks.playback_rate.ladder = vec![1.0, 0.5];
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));

        let mut config = Config::default();
        config.tweaks.playback_rate.default_rate = 0.0;
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_default_rate_must_lie_on_the_ladder_range() {
        let mut config = Config::default();
        config.tweaks.playback_rate.default_rate = 3.0;
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));

        config.tweaks.playback_rate.default_rate = 2.0;
        assert!(config.validate().is_ok());

        config.tweaks.playback_rate.ladder = vec![0.5, 1.0, 1.5];
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
        config.tweaks.playback_rate.default_rate = 1.5;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_save_and_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut config = Config::default();
        config.tweaks.quality.preferred = Quality::Hd720;
        config.page.skip_button_policy = SkipButtonPolicyConfig::Layout;
        config.save_to(&path).unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded.tweaks.quality.preferred, Quality::Hd720);
        assert_eq!(loaded.page.skip_button_policy, SkipButtonPolicyConfig::Layout);
    }

    #[test]
    fn test_load_from_rejects_invalid_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[tweaks.ad_skip]\ncheck_interval_ms = 0\n").unwrap();
        assert!(matches!(
            Config::load_from(&path),
            Err(ConfigError::Invalid(_))
        ));
    }
}
