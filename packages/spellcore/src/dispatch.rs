//! Maps a classification result to the set of effects the firmware should
//! run. Pure: the caller supplies the current nightlight state and a random
//! roll, and executes the returned plan against its output handles.

use heapless::String;

use crate::NAME_MAX;

pub const NIGHTLIGHT_MIN: u8 = 10;
pub const NIGHTLIGHT_MAX: u8 = 255;
pub const NIGHTLIGHT_STEP: u8 = 50;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CelebrationEffect {
    Sparkle,
    Rainbow,
    Pulse,
    ColorWave,
    Comet,
}

impl CelebrationEffect {
    pub fn from_roll(roll: u32) -> Self {
        match roll % 5 {
            0 => Self::Sparkle,
            1 => Self::Rainbow,
            2 => Self::Pulse,
            3 => Self::ColorWave,
            _ => Self::Comet,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SoundCue {
    Detected,
    Error,
    /// One of the five celebration sounds, 1..=5.
    Spell(u8),
}

impl SoundCue {
    pub fn spell_from_roll(roll: u32) -> Self {
        Self::Spell((roll % 5) as u8 + 1)
    }

    /// Path of the wav file on removable storage.
    pub fn file_name(self) -> &'static str {
        match self {
            Self::Detected => "/sounds/detected.wav",
            Self::Error => "/sounds/error.wav",
            Self::Spell(1) => "/sounds/spell1.wav",
            Self::Spell(2) => "/sounds/spell2.wav",
            Self::Spell(3) => "/sounds/spell3.wav",
            Self::Spell(4) => "/sounds/spell4.wav",
            Self::Spell(_) => "/sounds/spell5.wav",
        }
    }
}

/// Spell names bound to nightlight control, from the preference store.
/// Empty strings mean unbound.
#[derive(Clone, Debug, Default)]
pub struct NightlightBindings {
    pub on: String<NAME_MAX>,
    pub off: String<NAME_MAX>,
    pub raise: String<NAME_MAX>,
    pub lower: String<NAME_MAX>,
}

impl NightlightBindings {
    pub const fn new() -> Self {
        Self {
            on: String::new(),
            off: String::new(),
            raise: String::new(),
            lower: String::new(),
        }
    }

    fn bound(binding: &str, name: &str) -> bool {
        !binding.is_empty() && binding.eq_ignore_ascii_case(name)
    }

    /// On and off bound to the same spell means that spell toggles.
    fn toggle_mode(&self) -> bool {
        !self.on.is_empty() && !self.off.is_empty() && self.on.eq_ignore_ascii_case(&self.off)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NightlightChange {
    On { brightness: u8 },
    Off,
    Brightness { brightness: u8 },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LedPlan {
    None,
    Effect(CelebrationEffect),
    Error,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ActionPlan {
    pub nightlight: Option<NightlightChange>,
    pub led: LedPlan,
    pub sound: Option<SoundCue>,
    /// Show the spell name (image preferred) on the display.
    pub show_name: bool,
    /// Publish the spell name over MQTT.
    pub publish: bool,
    /// New brightness to write through to the preference store.
    pub persist_brightness: Option<u8>,
}

impl Default for LedPlan {
    fn default() -> Self {
        Self::None
    }
}

fn adjusted_brightness(current: u8, raise: bool) -> u8 {
    let adjusted = if raise {
        current.saturating_add(NIGHTLIGHT_STEP)
    } else {
        current.saturating_sub(NIGHTLIGHT_STEP)
    };
    adjusted.clamp(NIGHTLIGHT_MIN, NIGHTLIGHT_MAX)
}

/// Plan the effects for a matched spell.
pub fn plan_match(
    name: &str,
    nightlight_active: bool,
    brightness: u8,
    bindings: &NightlightBindings,
    roll: u32,
) -> ActionPlan {
    let spell_sound = Some(SoundCue::spell_from_roll(roll >> 8));

    if bindings.toggle_mode() && NightlightBindings::bound(&bindings.on, name) {
        // The toggle spell flips state without a celebration or label.
        let nightlight = if nightlight_active {
            NightlightChange::Off
        } else {
            NightlightChange::On { brightness }
        };
        return ActionPlan {
            nightlight: Some(nightlight),
            led: LedPlan::None,
            sound: spell_sound,
            show_name: false,
            publish: true,
            persist_brightness: None,
        };
    }

    if NightlightBindings::bound(&bindings.on, name) {
        return ActionPlan {
            nightlight: Some(NightlightChange::On { brightness }),
            led: LedPlan::None,
            sound: spell_sound,
            show_name: true,
            publish: true,
            persist_brightness: None,
        };
    }

    if NightlightBindings::bound(&bindings.off, name) {
        return ActionPlan {
            nightlight: Some(NightlightChange::Off),
            led: LedPlan::None,
            sound: spell_sound,
            show_name: true,
            publish: true,
            persist_brightness: None,
        };
    }

    let raise = NightlightBindings::bound(&bindings.raise, name);
    let lower = NightlightBindings::bound(&bindings.lower, name);
    if nightlight_active && (raise || lower) {
        let brightness = adjusted_brightness(brightness, raise);
        return ActionPlan {
            nightlight: Some(NightlightChange::Brightness { brightness }),
            led: LedPlan::None,
            sound: spell_sound,
            show_name: true,
            publish: true,
            persist_brightness: Some(brightness),
        };
    }

    ActionPlan {
        nightlight: None,
        led: LedPlan::Effect(CelebrationEffect::from_roll(roll)),
        sound: spell_sound,
        show_name: true,
        publish: true,
        persist_brightness: None,
    }
}

/// Plan for a trajectory that matched nothing (or was rejected).
pub fn plan_failure() -> ActionPlan {
    ActionPlan {
        nightlight: None,
        led: LedPlan::Error,
        sound: Some(SoundCue::Error),
        show_name: true,
        publish: false,
        persist_brightness: None,
    }
}
