//! Renderable-font resolution for non-Latin scripts.
//!
//! A family is considered present when measuring a sample text under it
//! yields a width that differs from a neutral baseline family by more than
//! a small threshold. Absence of a preferred font is degraded service, not
//! failure: the resolver walks an ordered fallback chain and, as a last
//! resort, returns the built-in family with `ok = false` and a warning.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

/// The built-in family returned when the entire fallback chain fails.
pub const LAST_RESORT_FAMILY: &str = "Helvetica";

/// Neutral family used as the measurement baseline.
pub const BASELINE_FAMILY: &str = "serif";

const PRESENCE_THRESHOLD: f32 = 1.0;
const MEASURE_SIZE: f32 = 16.0;

/// Measures a sample text under a specific family. Returns `None` when the
/// family cannot be measured at all (not installed, no glyph data).
pub trait FontMeasurer: Send + Sync {
    fn measure(&self, family: &str, sample: &str, font_size: f32) -> Option<f32>;
}

/// Where the resolved family came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FontSource {
    /// The caller-preferred family (typically a bundled webfont).
    Webfont,
    /// A known-good family from the fallback chain.
    System,
    /// The last-resort built-in family.
    Fallback,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedFont {
    pub family: String,
    pub source: FontSource,
    pub ok: bool,
}

/// Resolves a renderable font family for a target script, caching results
/// per preferred family for the process lifetime.
pub struct FontResolver {
    measurer: Arc<dyn FontMeasurer>,
    baseline_family: String,
    fallback_chain: Vec<String>,
    cache: RwLock<HashMap<String, ResolvedFont>>,
}

impl FontResolver {
    pub fn new(measurer: Arc<dyn FontMeasurer>) -> Self {
        Self {
            measurer,
            baseline_family: BASELINE_FAMILY.to_string(),
            fallback_chain: vec![
                "Noto Sans CJK JP".to_string(),
                "IPAGothic".to_string(),
                "TakaoGothic".to_string(),
                "DejaVu Sans".to_string(),
            ],
            cache: RwLock::new(HashMap::new()),
        }
    }

    pub fn with_fallback_chain(mut self, chain: Vec<String>) -> Self {
        self.fallback_chain = chain;
        self
    }

    pub fn with_baseline_family(mut self, family: impl Into<String>) -> Self {
        self.baseline_family = family.into();
        self
    }

    /// Resolves a renderable family for `preferred`, walking the fallback
    /// chain when the preferred family is absent. Always returns a family;
    /// `ok = false` only after the entire chain is exhausted.
    pub fn resolve(&self, preferred: &str, sample: &str) -> ResolvedFont {
        if let Ok(cache) = self.cache.read() {
            if let Some(hit) = cache.get(preferred) {
                return hit.clone();
            }
        }

        let baseline = self
            .measurer
            .measure(&self.baseline_family, sample, MEASURE_SIZE);

        let resolved = if self.is_renderable(preferred, sample, baseline) {
            ResolvedFont {
                family: preferred.to_string(),
                source: FontSource::Webfont,
                ok: true,
            }
        } else if let Some(family) = self
            .fallback_chain
            .iter()
            .find(|family| self.is_renderable(family, sample, baseline))
        {
            log::debug!("font '{preferred}' not renderable, using fallback '{family}'");
            ResolvedFont {
                family: family.clone(),
                source: FontSource::System,
                ok: true,
            }
        } else {
            log::warn!(
                "no renderable font for '{preferred}', falling back to {LAST_RESORT_FAMILY}"
            );
            ResolvedFont {
                family: LAST_RESORT_FAMILY.to_string(),
                source: FontSource::Fallback,
                ok: false,
            }
        };

        if let Ok(mut cache) = self.cache.write() {
            cache.insert(preferred.to_string(), resolved.clone());
        }
        resolved
    }

    fn is_renderable(&self, family: &str, sample: &str, baseline: Option<f32>) -> bool {
        let Some(width) = self.measurer.measure(family, sample, MEASURE_SIZE) else {
            return false;
        };
        match baseline {
            Some(baseline_width) => (width - baseline_width).abs() > PRESENCE_THRESHOLD,
            // No baseline to compare against: a measurable family counts.
            None => true,
        }
    }
}

/// System-font measurer backed by fontdb discovery and ttf-parser metrics.
#[cfg(feature = "system-fonts")]
pub struct SystemFontMeasurer {
    db: fontdb::Database,
}

#[cfg(feature = "system-fonts")]
impl SystemFontMeasurer {
    pub fn new() -> Self {
        let mut db = fontdb::Database::new();
        db.load_system_fonts();
        Self { db }
    }

    /// Registers in-memory font data, e.g. a bundled fallback font.
    pub fn add_font_data(&mut self, data: Vec<u8>) {
        self.db.load_font_data(data);
    }
}

#[cfg(feature = "system-fonts")]
impl Default for SystemFontMeasurer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(feature = "system-fonts")]
impl FontMeasurer for SystemFontMeasurer {
    fn measure(&self, family: &str, sample: &str, font_size: f32) -> Option<f32> {
        let query = fontdb::Query {
            families: &[fontdb::Family::Name(family)],
            ..Default::default()
        };
        let id = self.db.query(&query)?;
        self.db
            .with_face_data(id, |data, index| {
                let face = ttf_parser::Face::parse(data, index).ok()?;
                let units_per_em = face.units_per_em() as f32;
                let mut advance = 0.0f32;
                for c in sample.chars() {
                    let gid = face.glyph_index(c)?;
                    advance += face.glyph_hor_advance(gid)? as f32;
                }
                Some(advance / units_per_em * font_size)
            })
            .flatten()
    }
}
