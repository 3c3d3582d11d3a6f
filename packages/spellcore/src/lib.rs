#![no_std]

#[cfg(test)]
extern crate std;

pub mod backoff;
pub mod catalog;
pub mod dispatch;
pub mod geometry;
pub mod machine;
pub mod prefs;
pub mod score;
pub mod trajectory;

/// Capture buffer capacity; oldest points are evicted beyond this.
pub const MAX_POINTS: usize = 1000;

/// Every pattern in the catalogue is resampled to exactly this many points.
pub const RESAMPLE_POINTS: usize = 40;

/// Minimum combined similarity for a successful match.
pub const MATCH_THRESHOLD: f32 = 0.70;

/// Frame-to-frame jump (sensor pixels) beyond which a point is treated as a
/// reflection and dropped.
pub const POINT_JUMP_THRESHOLD: f32 = 40.0;

pub const MIN_TRAJECTORY_POINTS: usize = 50;
pub const MIN_BOUNDING_BOX_SIZE: i32 = 200;
pub const MIN_TOTAL_MOVEMENT_PX: f32 = 50.0;

pub const NAME_MAX: usize = 24;
pub const IMAGE_FILE_MAX: usize = 32;
