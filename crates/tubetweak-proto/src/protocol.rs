use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Ad-state value reported by the native widget while no ad is playing.
pub const NO_AD: i32 = -1;

/// Opaque handle to one element of the host page.
///
/// Identity is stable for as long as the host page keeps the element alive;
/// the page is responsible for never handing out a reused id for a different
/// widget without signalling a refresh.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ElementId(pub u64);

impl fmt::Display for ElementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Sign-only step direction for volume and playback-rate nudges.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Down,
    Up,
}

impl Direction {
    /// Direction of `delta`, or `None` when there is nothing to move.
    pub fn from_delta(delta: f64) -> Option<Self> {
        if delta > 0.0 {
            Some(Self::Up)
        } else if delta < 0.0 {
            Some(Self::Down)
        } else {
            None
        }
    }

    pub fn sign(self) -> f64 {
        match self {
            Self::Down => -1.0,
            Self::Up => 1.0,
        }
    }
}

/// Quality labels understood by the native widget, highest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Quality {
    Highres,
    Hd2160,
    Hd1440,
    Hd1080,
    Hd720,
    Large,
    Medium,
    Small,
    Tiny,
    Auto,
}

impl Quality {
    pub const ALL: [Quality; 10] = [
        Quality::Highres,
        Quality::Hd2160,
        Quality::Hd1440,
        Quality::Hd1080,
        Quality::Hd720,
        Quality::Large,
        Quality::Medium,
        Quality::Small,
        Quality::Tiny,
        Quality::Auto,
    ];

    /// The label the native widget uses for this quality.
    pub fn label(self) -> &'static str {
        match self {
            Quality::Highres => "highres",
            Quality::Hd2160 => "hd2160",
            Quality::Hd1440 => "hd1440",
            Quality::Hd1080 => "hd1080",
            Quality::Hd720 => "hd720",
            Quality::Large => "large",
            Quality::Medium => "medium",
            Quality::Small => "small",
            Quality::Tiny => "tiny",
            Quality::Auto => "auto",
        }
    }
}

impl fmt::Display for Quality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Quality {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Quality::ALL
            .iter()
            .copied()
            .find(|q| q.label() == s)
            .ok_or_else(|| format!("unknown quality label: {s}"))
    }
}

/// Modifier keys held during a key stroke.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Modifiers {
    #[serde(default)]
    pub shift: bool,
    #[serde(default)]
    pub ctrl: bool,
    #[serde(default)]
    pub alt: bool,
    #[serde(default)]
    pub meta: bool,
}

impl Modifiers {
    pub const NONE: Modifiers = Modifiers {
        shift: false,
        ctrl: false,
        alt: false,
        meta: false,
    };

    pub const SHIFT: Modifiers = Modifiers {
        shift: true,
        ctrl: false,
        alt: false,
        meta: false,
    };
}

/// A keyboard stroke, either real user input or a synthetic one dispatched to
/// the native widget.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct KeyStroke {
    pub key: String,
    #[serde(default)]
    pub modifiers: Modifiers,
}

impl KeyStroke {
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            modifiers: Modifiers::NONE,
        }
    }

    pub fn with_modifiers(key: impl Into<String>, modifiers: Modifiers) -> Self {
        Self {
            key: key.into(),
            modifiers,
        }
    }
}

impl fmt::Display for KeyStroke {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let m = self.modifiers;
        for (held, name) in [
            (m.ctrl, "Ctrl+"),
            (m.alt, "Alt+"),
            (m.meta, "Meta+"),
            (m.shift, "Shift+"),
        ] {
            if held {
                f.write_str(name)?;
            }
        }
        f.write_str(&self.key)
    }
}

/// Mouse-wheel input over some element of the page.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WheelEvent {
    pub target: ElementId,
    /// Negative is "scroll up".
    pub delta_y: f64,
}

/// Page-level user input delivered to bound listeners.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum InputEvent {
    Key(KeyStroke),
    Wheel(WheelEvent),
}

/// Synthetic pointer events used to wake the native controls.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerKind {
    MouseOver,
    MouseMove,
}

/// Everything a keyboard shortcut can trigger.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum Action {
    StepVolume { direction: Direction },
    StepRate { direction: Direction },
    ResetRate,
    ToggleUi,
    ToggleStats,
    FocusNextPlayer,
    FocusPrevPlayer,
    SeekRelative { seconds: f64 },
}
