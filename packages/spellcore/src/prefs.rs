//! The preference schema: every persisted setting with its storage name,
//! compile-time type, default and portal form metadata. The firmware's
//! flash store and the configuration portal are both generated from this
//! table, so adding a setting is a one-line change here.

use heapless::String;

use crate::dispatch::NightlightBindings;
use crate::machine::Tuning;

pub const PREF_STR_MAX: usize = 64;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PrefKey {
    MqttHost,
    MqttPort,
    MqttTopic,
    MovementThreshold,
    StillnessThreshold,
    ReadyStillnessTime,
    EndStillnessTime,
    GestureTimeout,
    IrLossTimeout,
    NightlightOnSpell,
    NightlightOffSpell,
    NightlightRaiseSpell,
    NightlightLowerSpell,
    NightlightBrightness,
    Latitude,
    Longitude,
    TimezoneOffset,
    SoundEnabled,
    SpellPrimaryColorIndex,
    WifiSsid,
    WifiPassword,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PrefType {
    Bool,
    Int,
    Str,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PrefDefault {
    Bool(bool),
    Int(i32),
    Str(&'static str),
}

pub struct PrefSpec {
    pub key: PrefKey,
    /// Storage record name; stays within the 15-byte NVS-style key limit.
    pub name: &'static str,
    /// Portal form label.
    pub label: &'static str,
    pub ty: PrefType,
    pub default: PrefDefault,
    /// Spinner step for integer form fields.
    pub step: i32,
}

pub const PREF_SPECS: &[PrefSpec] = &[
    PrefSpec {
        key: PrefKey::MqttHost,
        name: "mqtt_host",
        label: "MQTT broker host",
        ty: PrefType::Str,
        default: PrefDefault::Str(""),
        step: 0,
    },
    PrefSpec {
        key: PrefKey::MqttPort,
        name: "mqtt_port",
        label: "MQTT broker port",
        ty: PrefType::Int,
        default: PrefDefault::Int(1883),
        step: 1,
    },
    PrefSpec {
        key: PrefKey::MqttTopic,
        name: "mqtt_topic",
        label: "MQTT topic",
        ty: PrefType::Str,
        default: PrefDefault::Str(""),
        step: 0,
    },
    PrefSpec {
        key: PrefKey::MovementThreshold,
        name: "move_thresh",
        label: "Movement threshold (px)",
        ty: PrefType::Int,
        default: PrefDefault::Int(15),
        step: 1,
    },
    PrefSpec {
        key: PrefKey::StillnessThreshold,
        name: "still_thresh",
        label: "Stillness threshold (px)",
        ty: PrefType::Int,
        default: PrefDefault::Int(20),
        step: 1,
    },
    PrefSpec {
        key: PrefKey::ReadyStillnessTime,
        name: "ready_still_ms",
        label: "Ready stillness time (ms)",
        ty: PrefType::Int,
        default: PrefDefault::Int(600),
        step: 50,
    },
    PrefSpec {
        key: PrefKey::EndStillnessTime,
        name: "end_still_ms",
        label: "End stillness time (ms)",
        ty: PrefType::Int,
        default: PrefDefault::Int(500),
        step: 50,
    },
    PrefSpec {
        key: PrefKey::GestureTimeout,
        name: "gesture_to_ms",
        label: "Gesture timeout (ms)",
        ty: PrefType::Int,
        default: PrefDefault::Int(5_000),
        step: 250,
    },
    PrefSpec {
        key: PrefKey::IrLossTimeout,
        name: "ir_loss_ms",
        label: "IR loss timeout (ms)",
        ty: PrefType::Int,
        default: PrefDefault::Int(300),
        step: 50,
    },
    PrefSpec {
        key: PrefKey::NightlightOnSpell,
        name: "nl_on_spell",
        label: "Nightlight on spell",
        ty: PrefType::Str,
        default: PrefDefault::Str(""),
        step: 0,
    },
    PrefSpec {
        key: PrefKey::NightlightOffSpell,
        name: "nl_off_spell",
        label: "Nightlight off spell",
        ty: PrefType::Str,
        default: PrefDefault::Str(""),
        step: 0,
    },
    PrefSpec {
        key: PrefKey::NightlightRaiseSpell,
        name: "nl_raise_spell",
        label: "Nightlight raise spell",
        ty: PrefType::Str,
        default: PrefDefault::Str(""),
        step: 0,
    },
    PrefSpec {
        key: PrefKey::NightlightLowerSpell,
        name: "nl_lower_spell",
        label: "Nightlight lower spell",
        ty: PrefType::Str,
        default: PrefDefault::Str(""),
        step: 0,
    },
    PrefSpec {
        key: PrefKey::NightlightBrightness,
        name: "nl_brightness",
        label: "Nightlight brightness",
        ty: PrefType::Int,
        default: PrefDefault::Int(150),
        step: 5,
    },
    PrefSpec {
        key: PrefKey::Latitude,
        name: "latitude",
        label: "Latitude",
        ty: PrefType::Str,
        default: PrefDefault::Str(""),
        step: 0,
    },
    PrefSpec {
        key: PrefKey::Longitude,
        name: "longitude",
        label: "Longitude",
        ty: PrefType::Str,
        default: PrefDefault::Str(""),
        step: 0,
    },
    PrefSpec {
        key: PrefKey::TimezoneOffset,
        name: "tz_offset_s",
        label: "UTC offset (seconds)",
        ty: PrefType::Int,
        default: PrefDefault::Int(0),
        step: 900,
    },
    PrefSpec {
        key: PrefKey::SoundEnabled,
        name: "sound_enabled",
        label: "Sound",
        ty: PrefType::Bool,
        default: PrefDefault::Bool(true),
        step: 0,
    },
    PrefSpec {
        key: PrefKey::SpellPrimaryColorIndex,
        name: "spell_color_idx",
        label: "Spell colour",
        ty: PrefType::Int,
        default: PrefDefault::Int(0),
        step: 1,
    },
    PrefSpec {
        key: PrefKey::WifiSsid,
        name: "wifi_ssid",
        label: "WiFi network",
        ty: PrefType::Str,
        default: PrefDefault::Str(""),
        step: 0,
    },
    PrefSpec {
        key: PrefKey::WifiPassword,
        name: "wifi_pass",
        label: "WiFi password",
        ty: PrefType::Str,
        default: PrefDefault::Str(""),
        step: 0,
    },
];

impl PrefKey {
    pub const COUNT: usize = PREF_SPECS.len();

    pub fn spec(self) -> &'static PrefSpec {
        // The table is ordered by key; index equals discriminant.
        &PREF_SPECS[self as usize]
    }

    pub fn from_index(index: usize) -> Option<Self> {
        PREF_SPECS.get(index).map(|spec| spec.key)
    }
}

/// Every preference, loaded once at boot and written through on change.
#[derive(Clone, Debug)]
pub struct PrefCache {
    pub mqtt_host: String<PREF_STR_MAX>,
    pub mqtt_port: u16,
    pub mqtt_topic: String<PREF_STR_MAX>,
    pub movement_threshold: u16,
    pub stillness_threshold: u16,
    pub ready_stillness_ms: u32,
    pub end_stillness_ms: u32,
    pub gesture_timeout_ms: u32,
    pub ir_loss_timeout_ms: u32,
    pub nightlight: NightlightBindings,
    pub nightlight_brightness: u8,
    pub latitude: String<PREF_STR_MAX>,
    pub longitude: String<PREF_STR_MAX>,
    pub timezone_offset_s: i32,
    pub sound_enabled: bool,
    pub spell_color_index: u8,
    pub wifi_ssid: String<PREF_STR_MAX>,
    pub wifi_password: String<PREF_STR_MAX>,
}

impl Default for PrefCache {
    fn default() -> Self {
        Self::new()
    }
}

impl PrefCache {
    /// Defaults from the schema table; const so it can seed a static.
    pub const fn new() -> Self {
        Self {
            mqtt_host: String::new(),
            mqtt_port: 1883,
            mqtt_topic: String::new(),
            movement_threshold: 15,
            stillness_threshold: 20,
            ready_stillness_ms: 600,
            end_stillness_ms: 500,
            gesture_timeout_ms: 5_000,
            ir_loss_timeout_ms: 300,
            nightlight: NightlightBindings::new(),
            nightlight_brightness: 150,
            latitude: String::new(),
            longitude: String::new(),
            timezone_offset_s: 0,
            sound_enabled: true,
            spell_color_index: 0,
            wifi_ssid: String::new(),
            wifi_password: String::new(),
        }
    }

    /// The thresholds the gesture engine runs with.
    pub fn tuning(&self) -> Tuning {
        Tuning {
            movement_threshold: self.movement_threshold,
            stillness_threshold: self.stillness_threshold,
            ready_stillness_ms: self.ready_stillness_ms,
            gesture_timeout_ms: self.gesture_timeout_ms,
            ir_loss_timeout_ms: self.ir_loss_timeout_ms,
        }
    }

    pub fn mqtt_configured(&self) -> bool {
        !self.mqtt_host.is_empty()
    }

    /// Apply a form or store value by key, parsing it against the declared
    /// type. Returns false (leaving the current value alone) when the text
    /// does not parse or does not fit.
    pub fn set_by_key(&mut self, key: PrefKey, raw: &str) -> bool {
        match key {
            PrefKey::MqttHost => set_str(&mut self.mqtt_host, raw),
            PrefKey::MqttPort => match parse_int(raw) {
                Some(v @ 1..=65_535) => {
                    self.mqtt_port = v as u16;
                    true
                }
                _ => false,
            },
            PrefKey::MqttTopic => set_str(&mut self.mqtt_topic, raw),
            PrefKey::MovementThreshold => set_u16(&mut self.movement_threshold, raw),
            PrefKey::StillnessThreshold => set_u16(&mut self.stillness_threshold, raw),
            PrefKey::ReadyStillnessTime => set_u32(&mut self.ready_stillness_ms, raw),
            PrefKey::EndStillnessTime => set_u32(&mut self.end_stillness_ms, raw),
            PrefKey::GestureTimeout => set_u32(&mut self.gesture_timeout_ms, raw),
            PrefKey::IrLossTimeout => set_u32(&mut self.ir_loss_timeout_ms, raw),
            PrefKey::NightlightOnSpell => set_str(&mut self.nightlight.on, raw),
            PrefKey::NightlightOffSpell => set_str(&mut self.nightlight.off, raw),
            PrefKey::NightlightRaiseSpell => set_str(&mut self.nightlight.raise, raw),
            PrefKey::NightlightLowerSpell => set_str(&mut self.nightlight.lower, raw),
            PrefKey::NightlightBrightness => match parse_int(raw) {
                Some(v @ 10..=255) => {
                    self.nightlight_brightness = v as u8;
                    true
                }
                _ => false,
            },
            PrefKey::Latitude => set_str(&mut self.latitude, raw),
            PrefKey::Longitude => set_str(&mut self.longitude, raw),
            PrefKey::TimezoneOffset => match parse_int(raw) {
                Some(v) => {
                    self.timezone_offset_s = v;
                    true
                }
                None => false,
            },
            PrefKey::SoundEnabled => {
                self.sound_enabled = matches!(raw, "1" | "true" | "on");
                true
            }
            PrefKey::SpellPrimaryColorIndex => match parse_int(raw) {
                Some(v @ 0..=255) => {
                    self.spell_color_index = v as u8;
                    true
                }
                _ => false,
            },
            PrefKey::WifiSsid => set_str(&mut self.wifi_ssid, raw),
            PrefKey::WifiPassword => set_str(&mut self.wifi_password, raw),
        }
    }

    /// Render the current value of a key as text, for the portal form and
    /// the store.
    pub fn format_value(&self, key: PrefKey, out: &mut String<PREF_STR_MAX>) {
        use core::fmt::Write as _;
        out.clear();
        let _: Result<(), ()> = match key {
            PrefKey::MqttHost => out.push_str(&self.mqtt_host),
            PrefKey::MqttPort => write!(out, "{}", self.mqtt_port).map_err(|_| ()),
            PrefKey::MqttTopic => out.push_str(&self.mqtt_topic),
            PrefKey::MovementThreshold => write!(out, "{}", self.movement_threshold).map_err(|_| ()),
            PrefKey::StillnessThreshold => write!(out, "{}", self.stillness_threshold).map_err(|_| ()),
            PrefKey::ReadyStillnessTime => write!(out, "{}", self.ready_stillness_ms).map_err(|_| ()),
            PrefKey::EndStillnessTime => write!(out, "{}", self.end_stillness_ms).map_err(|_| ()),
            PrefKey::GestureTimeout => write!(out, "{}", self.gesture_timeout_ms).map_err(|_| ()),
            PrefKey::IrLossTimeout => write!(out, "{}", self.ir_loss_timeout_ms).map_err(|_| ()),
            PrefKey::NightlightOnSpell => out.push_str(&self.nightlight.on),
            PrefKey::NightlightOffSpell => out.push_str(&self.nightlight.off),
            PrefKey::NightlightRaiseSpell => out.push_str(&self.nightlight.raise),
            PrefKey::NightlightLowerSpell => out.push_str(&self.nightlight.lower),
            PrefKey::NightlightBrightness => write!(out, "{}", self.nightlight_brightness).map_err(|_| ()),
            PrefKey::Latitude => out.push_str(&self.latitude),
            PrefKey::Longitude => out.push_str(&self.longitude),
            PrefKey::TimezoneOffset => write!(out, "{}", self.timezone_offset_s).map_err(|_| ()),
            PrefKey::SoundEnabled => {
                write!(out, "{}", if self.sound_enabled { "1" } else { "0" }).map_err(|_| ())
            }
            PrefKey::SpellPrimaryColorIndex => write!(out, "{}", self.spell_color_index).map_err(|_| ()),
            PrefKey::WifiSsid => out.push_str(&self.wifi_ssid),
            PrefKey::WifiPassword => out.push_str(&self.wifi_password),
        };
    }
}

fn set_str<const N: usize>(dst: &mut String<N>, raw: &str) -> bool {
    let mut next: String<N> = String::new();
    for c in raw.chars() {
        if next.push(c).is_err() {
            return false;
        }
    }
    *dst = next;
    true
}

fn parse_int(raw: &str) -> Option<i32> {
    raw.trim().parse::<i32>().ok()
}

fn set_u16(dst: &mut u16, raw: &str) -> bool {
    match parse_int(raw) {
        Some(v @ 0..=65_535) => {
            *dst = v as u16;
            true
        }
        _ => false,
    }
}

fn set_u32(dst: &mut u32, raw: &str) -> bool {
    match parse_int(raw) {
        Some(v) if v >= 0 => {
            *dst = v as u32;
            true
        }
        _ => false,
    }
}
