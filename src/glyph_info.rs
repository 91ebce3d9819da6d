//! Glyph metrics and the font metrics cache they are resolved from.
//!
//! The cache holds the canonical metrics for each glyph of a font. Lookups always hand out
//! copies re-parented to the requested codepoint, so positioning can adjust advances and
//! offsets freely without touching the cache or other shaping operations reading from it.

use bitflags::bitflags;
use pathfinder_geometry::rect::RectI;
use pathfinder_geometry::vector::Vector2I;
use rustc_hash::FxHashMap;

/// Opaque identity of a font in a fallback chain.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct FontId(pub u32);

/// How a glyph was obtained from its font.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum GlyphType {
    /// A glyph designed for the codepoint.
    Standard,
    /// A stand-in (usually `.notdef`) because the font has no glyph for the codepoint.
    Fallback,
    /// One layer of a colour glyph.
    ColrLayer,
}

bitflags! {
    /// Colour glyph formats that may be expanded into layers during resolution.
    #[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
    pub struct ColorFontSupport: u8 {
        /// Layered colour glyphs from the `COLR` table.
        const COLR = 0b00000001;
    }
}

impl Default for ColorFontSupport {
    fn default() -> Self {
        ColorFontSupport::empty()
    }
}

/// Options that affect how glyphs are resolved to metrics.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub struct RenderOptions {
    pub color_support: ColorFontSupport,
}

/// Metrics of one glyph as used for a particular codepoint.
///
/// Values are in font units.
#[derive(Debug, Clone, PartialEq)]
pub struct GlyphMetrics {
    font: FontId,
    glyph_id: u16,
    codepoint: char,
    advance_width: i32,
    advance_height: i32,
    bounds: RectI,
    /// Sum of the positioning offsets applied to this copy.
    placement: Vector2I,
    glyph_type: GlyphType,
}

impl GlyphMetrics {
    pub fn new(
        font: FontId,
        glyph_id: u16,
        advance_width: i32,
        advance_height: i32,
        bounds: RectI,
    ) -> Self {
        GlyphMetrics {
            font,
            glyph_id,
            codepoint: '\0',
            advance_width,
            advance_height,
            bounds,
            placement: Vector2I::default(),
            glyph_type: GlyphType::Standard,
        }
    }

    pub fn font(&self) -> FontId {
        self.font
    }

    pub fn glyph_id(&self) -> u16 {
        self.glyph_id
    }

    pub fn codepoint(&self) -> char {
        self.codepoint
    }

    pub fn advance_width(&self) -> i32 {
        self.advance_width
    }

    pub fn advance_height(&self) -> i32 {
        self.advance_height
    }

    pub fn bounds(&self) -> RectI {
        self.bounds
    }

    /// Net offset applied during positioning, relative to the font's design position.
    pub fn placement(&self) -> Vector2I {
        self.placement
    }

    pub fn glyph_type(&self) -> GlyphType {
        self.glyph_type
    }

    pub fn is_fallback(&self) -> bool {
        self.glyph_type == GlyphType::Fallback
    }

    /// Returns `true` if this record matches the `(font, glyph_id)` pair used to address
    /// glyphs during positioning.
    pub fn matches(&self, font: FontId, glyph_id: u16) -> bool {
        self.font == font && self.glyph_id == glyph_id
    }

    /// A copy of these metrics for `codepoint`, tagged as `glyph_type`.
    fn copy_for(&self, codepoint: char, glyph_type: GlyphType) -> GlyphMetrics {
        GlyphMetrics {
            codepoint,
            glyph_type,
            ..self.clone()
        }
    }

    pub(crate) fn set_codepoint(&mut self, codepoint: char) {
        self.codepoint = codepoint;
    }

    pub(crate) fn apply_offset(&mut self, delta: Vector2I) {
        self.placement = self.placement + delta;
        self.bounds = RectI::from_points(
            self.bounds.origin() + delta,
            self.bounds.lower_right() + delta,
        );
    }

    pub(crate) fn set_advance_width(&mut self, advance_width: i32) {
        self.advance_width = advance_width;
    }

    pub(crate) fn set_advance_height(&mut self, advance_height: i32) {
        self.advance_height = advance_height;
    }
}

/// A font that can resolve glyph ids to metrics.
pub trait MetricsSource {
    fn font_id(&self) -> FontId;

    /// Resolve `glyph_id`, produced for `codepoint` by substitution, to one or more metrics
    /// records.
    ///
    /// Colour glyphs may resolve to several records. An empty result means the font cannot
    /// represent the codepoint at all.
    fn resolve(
        &self,
        codepoint: char,
        glyph_id: u16,
        color_support: ColorFontSupport,
    ) -> Vec<GlyphMetrics>;
}

/// Canonical glyph metrics for one font.
///
/// There is no way to obtain a mutable reference to a stored record once inserted.
#[derive(Debug, Clone)]
pub struct FontMetricsCache {
    font: FontId,
    units_per_em: u16,
    glyphs: FxHashMap<u16, GlyphMetrics>,
    color_layers: FxHashMap<u16, Vec<GlyphMetrics>>,
    notdef: Option<GlyphMetrics>,
}

impl FontMetricsCache {
    pub fn new(font: FontId, units_per_em: u16) -> Self {
        FontMetricsCache {
            font,
            units_per_em,
            glyphs: FxHashMap::default(),
            color_layers: FxHashMap::default(),
            notdef: None,
        }
    }

    /// Use `metrics` as the `.notdef` glyph handed out for glyphs the font lacks.
    pub fn with_notdef(mut self, metrics: GlyphMetrics) -> Self {
        self.notdef = Some(GlyphMetrics {
            font: self.font,
            glyph_id: 0,
            ..metrics
        });
        self
    }

    pub fn units_per_em(&self) -> u16 {
        self.units_per_em
    }

    pub fn insert(&mut self, metrics: GlyphMetrics) {
        let metrics = GlyphMetrics {
            font: self.font,
            ..metrics
        };
        self.glyphs.insert(metrics.glyph_id, metrics);
    }

    /// Register the layers a colour glyph expands to when `COLR` support is requested.
    pub fn insert_color_layers(&mut self, glyph_id: u16, layers: Vec<GlyphMetrics>) {
        let font = self.font;
        let layers = layers
            .into_iter()
            .map(|layer| GlyphMetrics { font, ..layer })
            .collect();
        self.color_layers.insert(glyph_id, layers);
    }

    pub fn get(&self, glyph_id: u16) -> Option<&GlyphMetrics> {
        self.glyphs.get(&glyph_id)
    }
}

impl MetricsSource for FontMetricsCache {
    fn font_id(&self) -> FontId {
        self.font
    }

    fn resolve(
        &self,
        codepoint: char,
        glyph_id: u16,
        color_support: ColorFontSupport,
    ) -> Vec<GlyphMetrics> {
        if glyph_id != 0 {
            if color_support.contains(ColorFontSupport::COLR) {
                if let Some(layers) = self.color_layers.get(&glyph_id) {
                    return layers
                        .iter()
                        .map(|layer| layer.copy_for(codepoint, GlyphType::ColrLayer))
                        .collect();
                }
            }
            if let Some(metrics) = self.glyphs.get(&glyph_id) {
                return vec![metrics.copy_for(codepoint, GlyphType::Standard)];
            }
        }

        match &self.notdef {
            Some(notdef) => vec![notdef.copy_for(codepoint, GlyphType::Fallback)],
            None => Vec::new(),
        }
    }
}
