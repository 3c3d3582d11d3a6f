//! The on-storage customization document (`/spells.json`). A bounded JSON
//! object with two arrays: `modify` entries patch built-in templates,
//! `custom` entries append user-recorded ones. The document is read, edited
//! in memory and written back whole.

use core::fmt::Write as _;

use heapless::{String, Vec};
use serde::{Deserialize, Serialize};

use crate::geometry::Point;
use crate::{IMAGE_FILE_MAX, NAME_MAX};

pub const MODIFY_MAX: usize = 16;
pub const CUSTOM_MAX: usize = 16;
pub const OVERLAY_PATTERN_MAX: usize = 80;

/// Hard bound on the serialized document, matching the file-size limit
/// enforced when loading from storage.
pub const OVERLAY_FILE_MAX: usize = 16 * 1024;

const CUSTOM_PREFIX: &str = "Custom ";

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawPoint {
    pub x: i16,
    pub y: i16,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct ModifyEntry {
    #[serde(rename = "builtInName")]
    pub built_in_name: String<NAME_MAX>,
    #[serde(rename = "customName", default, skip_serializing_if = "Option::is_none")]
    pub custom_name: Option<String<NAME_MAX>>,
    #[serde(rename = "imageFile", default, skip_serializing_if = "Option::is_none")]
    pub image_file: Option<String<IMAGE_FILE_MAX>>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub pattern: Vec<RawPoint, OVERLAY_PATTERN_MAX>,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct CustomEntry {
    pub name: String<NAME_MAX>,
    #[serde(rename = "imageFile", default, skip_serializing_if = "Option::is_none")]
    pub image_file: Option<String<IMAGE_FILE_MAX>>,
    pub pattern: Vec<RawPoint, OVERLAY_PATTERN_MAX>,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct OverlayDoc {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub modify: Vec<ModifyEntry, MODIFY_MAX>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub custom: Vec<CustomEntry, CUSTOM_MAX>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OverlayError {
    Parse,
    Encode,
    Full,
}

pub fn parse(bytes: &[u8]) -> Result<OverlayDoc, OverlayError> {
    serde_json_core::from_slice::<OverlayDoc>(bytes)
        .map(|(doc, _rest)| doc)
        .map_err(|_| OverlayError::Parse)
}

pub fn encode(doc: &OverlayDoc, out: &mut [u8]) -> Result<usize, OverlayError> {
    serde_json_core::to_slice(doc, out).map_err(|_| OverlayError::Encode)
}

impl OverlayDoc {
    /// Next free auto-name number: highest existing `Custom k` plus one.
    /// Gaps from deleted entries are never reused downward.
    pub fn next_custom_number(&self) -> u32 {
        let mut highest = 0;
        for entry in &self.custom {
            if let Some(rest) = entry.name.strip_prefix(CUSTOM_PREFIX) {
                if let Ok(n) = rest.parse::<u32>() {
                    highest = highest.max(n);
                }
            }
        }
        highest + 1
    }

    /// Append a recorded pattern as a new auto-named custom entry and return
    /// the assigned name.
    pub fn add_custom(&mut self, pattern: &[Point]) -> Result<String<NAME_MAX>, OverlayError> {
        let mut name = String::new();
        write!(name, "{}{}", CUSTOM_PREFIX, self.next_custom_number())
            .map_err(|_| OverlayError::Full)?;

        let mut entry = CustomEntry {
            name: name.clone(),
            image_file: None,
            pattern: Vec::new(),
        };
        for p in pattern.iter().take(OVERLAY_PATTERN_MAX) {
            let _ = entry.pattern.push(RawPoint { x: p.x, y: p.y });
        }
        self.custom.push(entry).map_err(|_| OverlayError::Full)?;
        Ok(name)
    }

    /// Apply `(old, new)` rename pairs to the custom entries in one pass.
    /// Returns whether anything changed.
    pub fn apply_renames(&mut self, renames: &[(&str, &str)]) -> bool {
        let mut changed = false;
        for entry in &mut self.custom {
            for (old, new) in renames {
                if entry.name.as_str() == *old {
                    let mut renamed = String::new();
                    for c in new.chars() {
                        if renamed.push(c).is_err() {
                            break;
                        }
                    }
                    if !renamed.is_empty() && renamed != entry.name {
                        entry.name = renamed;
                        changed = true;
                    }
                    break;
                }
            }
        }
        changed
    }
}
