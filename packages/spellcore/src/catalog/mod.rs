//! The in-memory spell catalogue: built-in templates merged with the
//! on-storage overlay. Rebuilt whole whenever the overlay changes; after a
//! build every pattern is normalized and exactly `RESAMPLE_POINTS` long.

mod builtin;
pub mod overlay;

use heapless::{String, Vec};

use crate::geometry::{preprocess, Pattern, Point};
use crate::{IMAGE_FILE_MAX, NAME_MAX};

use builtin::RawXy;
use overlay::{OverlayDoc, RawPoint, OVERLAY_PATTERN_MAX};

pub const MAX_TEMPLATES: usize = 32;

#[derive(Clone, Debug)]
pub struct Template {
    pub name: String<NAME_MAX>,
    pub pattern: Pattern,
    pub image_file: Option<String<IMAGE_FILE_MAX>>,
}

#[derive(Clone, Debug, Default)]
pub struct Catalog {
    templates: Vec<Template, MAX_TEMPLATES>,
    custom_count: usize,
}

impl Catalog {
    /// An empty catalogue, for static initialization before the first build.
    pub const fn new() -> Self {
        Self {
            templates: Vec::new(),
            custom_count: 0,
        }
    }

    /// Built-ins only; what the device runs with when storage is absent.
    pub fn built_in() -> Self {
        Self::build(None)
    }

    /// Build from scratch: load built-ins, preprocess each, then merge the
    /// overlay. `modify` entries match built-in names case-insensitively and
    /// apply rename, image and pattern in that order; `custom` entries are
    /// appended after the built-ins.
    pub fn build(overlay: Option<&OverlayDoc>) -> Self {
        let mut templates: Vec<Template, MAX_TEMPLATES> = Vec::new();
        for (name, raw) in builtin::BUILTINS {
            let _ = templates.push(Template {
                name: bounded_name(name),
                pattern: preprocess_raw(raw),
                image_file: None,
            });
        }

        let mut custom_count = 0;
        if let Some(doc) = overlay {
            for entry in &doc.modify {
                let Some(template) = templates
                    .iter_mut()
                    .find(|t| t.name.eq_ignore_ascii_case(&entry.built_in_name))
                else {
                    continue;
                };
                if let Some(new_name) = &entry.custom_name {
                    template.name = new_name.clone();
                }
                if let Some(image) = &entry.image_file {
                    template.image_file = Some(image.clone());
                }
                if !entry.pattern.is_empty() {
                    template.pattern = preprocess_overlay(&entry.pattern);
                }
            }

            for entry in &doc.custom {
                if entry.pattern.is_empty() || entry.name.is_empty() {
                    continue;
                }
                let template = Template {
                    name: entry.name.clone(),
                    pattern: preprocess_overlay(&entry.pattern),
                    image_file: entry.image_file.clone(),
                };
                if templates.push(template).is_ok() {
                    custom_count += 1;
                }
            }
        }

        Self {
            templates,
            custom_count,
        }
    }

    pub fn templates(&self) -> &[Template] {
        &self.templates
    }

    pub fn get(&self, index: usize) -> Option<&Template> {
        self.templates.get(index)
    }

    pub fn len(&self) -> usize {
        self.templates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }

    /// How many trailing templates came from the overlay's custom section.
    /// Bounds the rename list in the configuration portal.
    pub fn custom_count(&self) -> usize {
        self.custom_count
    }

    /// The trailing user-recorded templates, in catalogue order.
    pub fn custom_templates(&self) -> &[Template] {
        &self.templates[self.templates.len() - self.custom_count..]
    }

    /// First template whose name matches, ignoring ASCII case.
    pub fn find(&self, name: &str) -> Option<&Template> {
        self.templates
            .iter()
            .find(|t| t.name.eq_ignore_ascii_case(name))
    }
}

fn bounded_name(name: &str) -> String<NAME_MAX> {
    let mut out = String::new();
    for c in name.chars() {
        if out.push(c).is_err() {
            break;
        }
    }
    out
}

fn preprocess_raw(raw: &[RawXy]) -> Pattern {
    let mut points: Vec<Point, OVERLAY_PATTERN_MAX> = Vec::new();
    for (i, (x, y)) in raw.iter().enumerate() {
        let _ = points.push(Point::new(*x, *y, i as u32 * 100));
    }
    preprocess(&points)
}

fn preprocess_overlay(raw: &[RawPoint]) -> Pattern {
    let mut points: Vec<Point, OVERLAY_PATTERN_MAX> = Vec::new();
    for (i, p) in raw.iter().enumerate() {
        let _ = points.push(Point::new(p.x, p.y, i as u32 * 100));
    }
    preprocess(&points)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::score::{classify, Verdict};
    use crate::{MATCH_THRESHOLD, RESAMPLE_POINTS};

    #[test]
    fn built_in_catalogue_is_fully_preprocessed() {
        let catalog = Catalog::built_in();
        assert_eq!(catalog.len(), 13);
        assert_eq!(catalog.custom_count(), 0);
        for template in catalog.templates() {
            assert_eq!(template.pattern.len(), RESAMPLE_POINTS);
            assert!(!template.name.is_empty());
            for p in &template.pattern {
                assert!((0..=1000).contains(&(p.x as i32)));
                assert!((0..=1000).contains(&(p.y as i32)));
            }
        }
    }

    #[test]
    fn overlay_merge_renames_in_place_and_appends_customs() {
        let json = br#"{
            "modify": [ { "builtInName": "ignite", "customName": "Flame" } ],
            "custom": [ { "name": "Zap",
                          "pattern": [ {"x":0,"y":0}, {"x":300,"y":10},
                                       {"x":600,"y":0}, {"x":600,"y":500} ] } ]
        }"#;
        let doc = overlay::parse(json).unwrap();
        let catalog = Catalog::build(Some(&doc));

        assert_eq!(catalog.len(), 14);
        // Rename applies in place: same slot, new name.
        assert_eq!(catalog.templates()[2].name.as_str(), "Flame");
        assert_eq!(catalog.templates()[13].name.as_str(), "Zap");
        assert_eq!(catalog.custom_count(), 1);
        assert_eq!(catalog.custom_templates()[0].name.as_str(), "Zap");
        assert_eq!(catalog.templates()[13].pattern.len(), RESAMPLE_POINTS);
    }

    #[test]
    fn overlay_pattern_replaces_and_is_repreprocessed() {
        let json = br#"{ "modify": [ { "builtInName": "Gust",
            "pattern": [ {"x":100,"y":100}, {"x":900,"y":100}, {"x":900,"y":900} ] } ] }"#;
        let doc = overlay::parse(json).unwrap();
        let catalog = Catalog::build(Some(&doc));
        let gust = catalog.find("Gust").unwrap();
        assert_eq!(gust.pattern.len(), RESAMPLE_POINTS);
        assert_eq!(gust.pattern[0].x, 0);
        assert_eq!(gust.pattern[0].y, 0);
    }

    #[test]
    fn image_override_is_kept() {
        let json = br#"{ "modify": [ { "builtInName": "Dark", "imageFile": "/night.bmp" } ] }"#;
        let doc = overlay::parse(json).unwrap();
        let catalog = Catalog::build(Some(&doc));
        let dark = catalog.find("Dark").unwrap();
        assert_eq!(dark.image_file.as_deref(), Some("/night.bmp"));
    }

    #[test]
    fn unknown_modify_target_is_ignored() {
        let json = br#"{ "modify": [ { "builtInName": "NoSuchSpell", "customName": "X" } ] }"#;
        let doc = overlay::parse(json).unwrap();
        let catalog = Catalog::build(Some(&doc));
        assert_eq!(catalog.len(), 13);
        assert!(catalog.find("X").is_none());
    }

    #[test]
    fn recorded_custom_spell_round_trip_matches() {
        // Record an L-shaped gesture, save it through the overlay, rebuild,
        // then replay the same gesture.
        let mut gesture: std::vec::Vec<Point> = std::vec::Vec::new();
        for i in 0..40i16 {
            gesture.push(Point::new(300, 100 + i * 12, i as u32 * 10));
        }
        for i in 0..30i16 {
            gesture.push(Point::new(300 + i * 14, 580, (40 + i) as u32 * 10));
        }

        let recorded = preprocess(&gesture);
        let mut doc = OverlayDoc::default();
        let name = doc.add_custom(&recorded).unwrap();
        assert_eq!(name.as_str(), "Custom 1");

        let mut buf = [0u8; overlay::OVERLAY_FILE_MAX];
        let len = overlay::encode(&doc, &mut buf).unwrap();
        let reloaded = overlay::parse(&buf[..len]).unwrap();
        let catalog = Catalog::build(Some(&reloaded));

        match classify(&catalog, &gesture) {
            Verdict::Matched { index, score } => {
                assert_eq!(catalog.get(index).unwrap().name.as_str(), "Custom 1");
                assert!(score >= MATCH_THRESHOLD, "score {score}");
            }
            other => panic!("expected match, got {other:?}"),
        }
    }

    #[test]
    fn ties_resolve_to_first_template() {
        // Two identical customs; classify must pick the earlier one.
        let json = br#"{ "custom": [
            { "name": "First", "pattern": [ {"x":0,"y":0}, {"x":800,"y":0}, {"x":800,"y":800} ] },
            { "name": "Second", "pattern": [ {"x":0,"y":0}, {"x":800,"y":0}, {"x":800,"y":800} ] }
        ] }"#;
        let doc = overlay::parse(json).unwrap();
        let catalog = Catalog::build(Some(&doc));

        let mut gesture: std::vec::Vec<Point> = std::vec::Vec::new();
        for i in 0..30i16 {
            gesture.push(Point::new(100 + i * 20, 100, i as u32 * 10));
        }
        for i in 0..30i16 {
            gesture.push(Point::new(700, 100 + i * 20, (30 + i) as u32 * 10));
        }
        match classify(&catalog, &gesture) {
            Verdict::Matched { index, .. } => {
                assert_eq!(catalog.get(index).unwrap().name.as_str(), "First");
            }
            other => panic!("expected match, got {other:?}"),
        }
    }
}
