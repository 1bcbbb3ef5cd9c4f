//! Built-in tweaks.

pub mod ad_skip;
pub mod effective_time;
pub mod focus_main;
pub mod playback_rate;
pub mod quality;
pub mod shortcuts;
pub mod volume_scroll;

pub use ad_skip::AdSkip;
pub use effective_time::EffectiveTime;
pub use focus_main::FocusMain;
pub use playback_rate::PlaybackRate;
pub use quality::PreferredQuality;
pub use shortcuts::Shortcuts;
pub use volume_scroll::VolumeScroll;

use tubetweak_proto::config::Config;

use crate::policy::skip_policy_from_config;
use crate::tweak::Tweak;

/// The enabled tweaks, in hook order. Tweaks that install overrides come
/// first so later tweaks' init hooks already go through them.
pub fn from_config(config: &Config) -> Vec<Box<dyn Tweak>> {
    let t = &config.tweaks;
    let mut tweaks: Vec<Box<dyn Tweak>> = Vec::new();

    if t.playback_rate.enabled {
        tweaks.push(Box::new(PlaybackRate::new(&t.playback_rate)));
    }
    if t.quality.enabled {
        tweaks.push(Box::new(PreferredQuality::new(t.quality.preferred)));
    }
    if t.volume_scroll.enabled {
        tweaks.push(Box::new(VolumeScroll::new(t.volume_scroll.step)));
    }
    if t.shortcuts.enabled {
        tweaks.push(Box::new(Shortcuts::new(&t.shortcuts)));
    }
    if t.effective_time.enabled {
        tweaks.push(Box::new(EffectiveTime::new(&t.effective_time)));
    }
    if t.ad_skip.enabled {
        tweaks.push(Box::new(AdSkip::new(
            config.page.skip_button_selector.clone(),
            skip_policy_from_config(config.page.skip_button_policy),
            &t.ad_skip,
        )));
    }
    if t.focus_main.enabled {
        tweaks.push(Box::new(FocusMain::new(&t.focus_main)));
    }
    tweaks
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_enabled_by_default() {
        let names: Vec<String> = from_config(&Config::default())
            .iter()
            .map(|t| t.name().to_string())
            .collect();
        assert_eq!(
            names,
            vec![
                "playback_rate",
                "preferred_quality",
                "volume_scroll",
                "shortcuts",
                "effective_time",
                "ad_skip",
                "focus_main"
            ]
        );
    }

    #[test]
    fn test_disabled_tweaks_are_skipped() {
        let mut config = Config::default();
        config.tweaks.volume_scroll.enabled = false;
        config.tweaks.focus_main.enabled = false;
        let tweaks = from_config(&config);
        assert_eq!(tweaks.len(), 5);
        assert!(tweaks.iter().all(|t| t.name() != "volume_scroll"));
    }
}
