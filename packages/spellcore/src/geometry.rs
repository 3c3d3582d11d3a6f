use heapless::Vec;
use libm::sqrtf;

use crate::{MAX_POINTS, RESAMPLE_POINTS};

/// Upper bound of the normalized coordinate space (0..=1000 on both axes).
pub const NORMALIZED_MAX: i32 = 1000;

/// Diagonal of the normalized space; the worst possible average point
/// distance between two patterns.
pub const NORMALIZED_DIAGONAL: f32 = 1414.0;

/// A single observed or template point. The coordinate space (sensor,
/// display or normalized) is a property of the container, never stored here.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Point {
    pub x: i16,
    pub y: i16,
    /// Milliseconds; absolute while capturing, relative after normalize.
    pub t: u32,
}

impl Point {
    pub const fn new(x: i16, y: i16, t: u32) -> Self {
        Self { x, y, t }
    }
}

/// A fully preprocessed pattern: normalized and resampled.
pub type Pattern = Vec<Point, RESAMPLE_POINTS>;

pub type TrajectoryVec = Vec<Point, MAX_POINTS>;

pub fn distance(a: Point, b: Point) -> f32 {
    let dx = (a.x as f32) - (b.x as f32);
    let dy = (a.y as f32) - (b.y as f32);
    sqrtf(dx * dx + dy * dy)
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BoundingBox {
    pub min_x: i16,
    pub min_y: i16,
    pub max_x: i16,
    pub max_y: i16,
}

impl BoundingBox {
    pub fn width(&self) -> i32 {
        self.max_x as i32 - self.min_x as i32
    }

    pub fn height(&self) -> i32 {
        self.max_y as i32 - self.min_y as i32
    }
}

pub fn bounding_box(points: &[Point]) -> Option<BoundingBox> {
    let first = points.first()?;
    let mut bounds = BoundingBox {
        min_x: first.x,
        min_y: first.y,
        max_x: first.x,
        max_y: first.y,
    };
    for p in points {
        bounds.min_x = bounds.min_x.min(p.x);
        bounds.max_x = bounds.max_x.max(p.x);
        bounds.min_y = bounds.min_y.min(p.y);
        bounds.max_y = bounds.max_y.max(p.y);
    }
    Some(bounds)
}

/// Sum of consecutive segment lengths.
pub fn path_length(points: &[Point]) -> f32 {
    let mut total = 0.0;
    for pair in points.windows(2) {
        total += distance(pair[0], pair[1]);
    }
    total
}

/// Scale and translate into the 0..1000 box. Width and height are clamped to
/// at least 1 so perfectly horizontal or vertical strokes survive. Timestamps
/// become relative to the first point. Inputs shorter than two points are
/// returned unchanged.
pub fn normalize(points: &[Point]) -> TrajectoryVec {
    let mut out = TrajectoryVec::new();
    if points.len() < 2 {
        for p in points {
            let _ = out.push(*p);
        }
        return out;
    }

    // bounding_box is Some for non-empty input.
    let bounds = match bounding_box(points) {
        Some(b) => b,
        None => return out,
    };
    let width = bounds.width().max(1);
    let height = bounds.height().max(1);
    let t0 = points[0].t;

    for p in points {
        let x = ((p.x as i32 - bounds.min_x as i32) * NORMALIZED_MAX) / width;
        let y = ((p.y as i32 - bounds.min_y as i32) * NORMALIZED_MAX) / height;
        let _ = out.push(Point::new(x as i16, y as i16, p.t.wrapping_sub(t0)));
    }
    out
}

/// Replace a trajectory with `N` points spaced evenly along its arc length.
/// First and last points are preserved exactly; interior points are linearly
/// interpolated (coordinates and timestamps). Empty input yields empty
/// output; zero-length paths repeat the first point.
pub fn resample<const N: usize>(points: &[Point]) -> Vec<Point, N> {
    let mut out: Vec<Point, N> = Vec::new();
    let Some(&first) = points.first() else {
        return out;
    };
    if N == 0 {
        return out;
    }

    let total = path_length(points);
    if points.len() < 2 || total <= f32::EPSILON || N == 1 {
        while out.len() < N {
            let _ = out.push(first);
        }
        return out;
    }

    let segment = total / (N as f32 - 1.0);
    let _ = out.push(first);

    let mut carried = 0.0;
    for i in 1..points.len() {
        if out.len() >= N {
            break;
        }
        let prev = points[i - 1];
        let next = points[i];
        let mut seg_start = prev;
        let mut seg_len = distance(prev, next);

        // Several resampled points may land inside one source segment.
        while carried + seg_len >= segment && out.len() < N {
            let ratio = (segment - carried) / seg_len;
            let p = Point::new(
                (seg_start.x as f32 + ratio * (next.x as f32 - seg_start.x as f32)) as i16,
                (seg_start.y as f32 + ratio * (next.y as f32 - seg_start.y as f32)) as i16,
                (seg_start.t as f32 + ratio * (next.t as f32 - seg_start.t as f32)) as u32,
            );
            let _ = out.push(p);
            carried = 0.0;
            seg_len -= ratio * seg_len;
            seg_start = p;
        }
        carried += seg_len;
    }

    // Rounding can leave the walk one point short of the tail.
    let last = points[points.len() - 1];
    while out.len() < N {
        let _ = out.push(last);
    }
    out
}

/// Normalize then resample to the catalogue's fixed pattern length.
pub fn preprocess(points: &[Point]) -> Pattern {
    let normalized = normalize(points);
    resample::<RESAMPLE_POINTS>(&normalized)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn zigzag() -> std::vec::Vec<Point> {
        std::vec![
            Point::new(100, 100, 0),
            Point::new(300, 180, 120),
            Point::new(520, 90, 250),
            Point::new(700, 400, 400),
            Point::new(640, 600, 520),
        ]
    }

    #[test]
    fn normalize_translation_and_scale_invariant() {
        let base = zigzag();
        let moved: std::vec::Vec<Point> = base
            .iter()
            .map(|p| Point::new(p.x * 3 + 57, p.y * 3 - 40, p.t + 5_000))
            .collect();

        let a = normalize(&base);
        let b = normalize(&moved);
        assert_eq!(a.len(), b.len());
        for (pa, pb) in a.iter().zip(b.iter()) {
            assert!((pa.x - pb.x).abs() <= 1, "{} vs {}", pa.x, pb.x);
            assert!((pa.y - pb.y).abs() <= 1, "{} vs {}", pa.y, pb.y);
        }
    }

    #[test]
    fn normalize_keeps_relative_timestamps() {
        let normalized = normalize(&zigzag());
        assert_eq!(normalized[0].t, 0);
        assert_eq!(normalized[4].t, 520);
    }

    #[test]
    fn normalize_preserves_straight_horizontal_stroke() {
        let line = [
            Point::new(100, 400, 0),
            Point::new(500, 400, 100),
            Point::new(900, 400, 200),
        ];
        let normalized = normalize(&line);
        // Height collapses to 1px; the clamp keeps y at 0 instead of dividing
        // by zero, while x spans the full box.
        assert_eq!(normalized[0].x, 0);
        assert_eq!(normalized[2].x, 1000);
        assert!(normalized.iter().all(|p| p.y == 0));
    }

    #[test]
    fn normalize_single_point_passthrough() {
        let one = [Point::new(512, 384, 77)];
        let normalized = normalize(&one);
        assert_eq!(normalized.len(), 1);
        assert_eq!(normalized[0], one[0]);
    }

    #[test]
    fn resample_exact_length_and_endpoints() {
        let src = zigzag();
        let out = resample::<17>(&src);
        assert_eq!(out.len(), 17);
        assert_eq!((out[0].x, out[0].y), (src[0].x, src[0].y));
        let last = out[out.len() - 1];
        assert_eq!((last.x, last.y), (640, 600));
    }

    #[test]
    fn resample_spacing_is_uniform() {
        let src = zigzag();
        let out = resample::<25>(&src);
        let expected = path_length(&src) / 24.0;
        for pair in out.windows(2) {
            let d = distance(pair[0], pair[1]);
            assert!(
                (d - expected).abs() <= expected * 0.05,
                "segment {d} vs expected {expected}"
            );
        }
    }

    #[test]
    fn resample_empty_is_empty() {
        let out = resample::<10>(&[]);
        assert!(out.is_empty());
    }

    #[test]
    fn resample_zero_length_path_repeats_point() {
        let src = [Point::new(5, 5, 0), Point::new(5, 5, 40)];
        let out = resample::<8>(&src);
        assert_eq!(out.len(), 8);
        assert!(out.iter().all(|p| p.x == 5 && p.y == 5));
    }

    #[test]
    fn preprocess_yields_fixed_pattern_length() {
        let pattern = preprocess(&zigzag());
        assert_eq!(pattern.len(), RESAMPLE_POINTS);
        assert!(pattern
            .iter()
            .all(|p| (0..=1000).contains(&(p.x as i32)) && (0..=1000).contains(&(p.y as i32))));
    }
}
