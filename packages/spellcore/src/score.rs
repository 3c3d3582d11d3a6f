use core::f32::consts::PI;

use libm::{atan2f, fabsf};

use crate::catalog::Catalog;
use crate::geometry::{bounding_box, distance, path_length, preprocess, Point, NORMALIZED_DIAGONAL};
use crate::{MATCH_THRESHOLD, MIN_BOUNDING_BOX_SIZE, MIN_TOTAL_MOVEMENT_PX, MIN_TRAJECTORY_POINTS};

const POSITION_WEIGHT: f32 = 0.6;
const DIRECTION_WEIGHT: f32 = 0.4;

/// Average point-to-point distance, folded into [0, 1]. Both inputs must be
/// preprocessed to the same length.
pub fn position_similarity(a: &[Point], b: &[Point]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }
    let mut total = 0.0;
    for (pa, pb) in a.iter().zip(b.iter()) {
        total += distance(*pa, *pb);
    }
    let avg = total / a.len() as f32;
    (1.0 - avg / NORMALIZED_DIAGONAL).max(0.0)
}

/// Average segment-angle difference, folded into [0, 1]. Angle deltas wrap
/// at ±π so 170° and −170° count as 20° apart, and a stroke drawn backwards
/// scores 0 even when its points overlap.
pub fn direction_similarity(a: &[Point], b: &[Point]) -> f32 {
    if a.len() != b.len() || a.len() < 2 {
        return 0.0;
    }
    let segments = a.len() - 1;
    let mut total = 0.0;
    for i in 0..segments {
        let angle_a = atan2f(
            (a[i + 1].y - a[i].y) as f32,
            (a[i + 1].x - a[i].x) as f32,
        );
        let angle_b = atan2f(
            (b[i + 1].y - b[i].y) as f32,
            (b[i + 1].x - b[i].x) as f32,
        );
        let mut delta = fabsf(angle_a - angle_b);
        if delta > PI {
            delta = 2.0 * PI - delta;
        }
        total += delta;
    }
    let avg = total / segments as f32;
    (1.0 - avg / PI).max(0.0)
}

/// Combined similarity: 60% position, 40% direction.
pub fn similarity(a: &[Point], b: &[Point]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }
    let combined =
        POSITION_WEIGHT * position_similarity(a, b) + DIRECTION_WEIGHT * direction_similarity(a, b);
    combined.max(0.0)
}

/// Why a captured trajectory never reached the scorer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Rejection {
    TooShort,
    TooSmall,
    NotEnoughMovement,
}

impl Rejection {
    /// User-facing label shown on the display.
    pub const fn label(self) -> &'static str {
        match self {
            Self::TooShort => "Too Short",
            Self::TooSmall => "Too Small",
            Self::NotEnoughMovement => "No Match",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Verdict {
    Rejected(Rejection),
    /// Best candidate stayed under the threshold.
    NoMatch { best_score: f32 },
    /// Index into the catalogue, first template wins ties.
    Matched { index: usize, score: f32 },
}

/// Gate checks applied before any scoring, in order.
pub fn validate(points: &[Point]) -> Result<(), Rejection> {
    if points.len() < MIN_TRAJECTORY_POINTS {
        return Err(Rejection::TooShort);
    }
    if let Some(bounds) = bounding_box(points) {
        if bounds.width() < MIN_BOUNDING_BOX_SIZE && bounds.height() < MIN_BOUNDING_BOX_SIZE {
            return Err(Rejection::TooSmall);
        }
    }
    if path_length(points) <= MIN_TOTAL_MOVEMENT_PX {
        return Err(Rejection::NotEnoughMovement);
    }
    Ok(())
}

/// Match a raw captured trajectory against the catalogue.
pub fn classify(catalog: &Catalog, points: &[Point]) -> Verdict {
    if let Err(rejection) = validate(points) {
        return Verdict::Rejected(rejection);
    }

    let user = preprocess(points);
    let mut best_index = None;
    let mut best_score = 0.0;
    for (index, template) in catalog.templates().iter().enumerate() {
        let score = similarity(&user, &template.pattern);
        if score > best_score {
            best_score = score;
            best_index = Some(index);
        }
    }

    match best_index {
        Some(index) if best_score >= MATCH_THRESHOLD => Verdict::Matched {
            index,
            score: best_score,
        },
        _ => Verdict::NoMatch { best_score },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Pattern;

    fn diagonal() -> Pattern {
        let raw: std::vec::Vec<Point> = (0i16..=10)
            .map(|i| Point::new(i * 100, i * 100, i as u32 * 50))
            .collect();
        preprocess(&raw)
    }

    #[test]
    fn identical_patterns_score_one() {
        let p = diagonal();
        let score = similarity(&p, &p);
        assert!(score > 0.999, "score {score}");
    }

    #[test]
    fn scores_stay_in_unit_range() {
        let a = diagonal();
        let raw: std::vec::Vec<Point> = (0i16..=10)
            .map(|i| Point::new(1000 - i * 100, (i % 3) * 400, i as u32 * 50))
            .collect();
        let b = preprocess(&raw);
        let score = similarity(&a, &b);
        assert!((0.0..=1.0).contains(&score), "score {score}");
    }

    #[test]
    fn reversed_stroke_fails_threshold() {
        let forward = diagonal();
        let raw: std::vec::Vec<Point> = (0i16..=10)
            .rev()
            .map(|i| Point::new(i * 100, i * 100, (10 - i) as u32 * 50))
            .collect();
        let backward = preprocess(&raw);
        let score = similarity(&forward, &backward);
        assert!(score < MATCH_THRESHOLD, "score {score}");
    }

    #[test]
    fn mismatched_lengths_score_zero() {
        let p = diagonal();
        assert_eq!(similarity(&p, &p[..10]), 0.0);
    }

    #[test]
    fn validation_order_too_short_first() {
        // Three points inside a tiny box: short wins over small.
        let points = [
            Point::new(10, 10, 0),
            Point::new(12, 11, 10),
            Point::new(13, 12, 20),
        ];
        assert_eq!(validate(&points), Err(Rejection::TooShort));
    }

    #[test]
    fn validation_rejects_small_box() {
        let points: std::vec::Vec<Point> = (0i16..60)
            .map(|i| Point::new(500 + (i % 2) * 20, 500 + (i % 3) * 10, i as u32 * 10))
            .collect();
        assert_eq!(validate(&points), Err(Rejection::TooSmall));
    }

    #[test]
    fn validation_accepts_real_gesture() {
        let points: std::vec::Vec<Point> = (0i16..80)
            .map(|i| Point::new(100 + i * 8, 200 + i * 5, i as u32 * 10))
            .collect();
        assert_eq!(validate(&points), Ok(()));
    }
}
