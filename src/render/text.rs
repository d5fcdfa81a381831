use std::borrow::Cow;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Environment variable naming the directory holding the bundled caption fonts.
pub const FONTS_DIR_ENV: &str = "CAPFLOW_FONTS_DIR";

/// Font files registered before any frame is drawn.
pub const BUNDLED_FONTS: &[(&str, &str)] = &[
    ("Impact.ttf", "Impact"),
    ("Arial.ttf", "Arial"),
    ("Arial Bold.ttf", "Arial"),
    ("Arial Black.ttf", "Arial Black"),
    ("Inter.ttf", "Inter"),
    ("Montserrat.ttf", "Montserrat"),
];

const SHAPE_CACHE_LIMIT: usize = 4096;

/// Font request for one text run.
#[derive(Clone, Debug, PartialEq)]
pub struct FontSpec {
    pub family: String,
    pub weight: u16,
    /// Pixels.
    pub size: f64,
    /// Extra pixels between characters.
    pub letter_spacing: f64,
}

impl FontSpec {
    pub fn new(family: impl Into<String>, weight: u16, size: f64) -> Self {
        Self {
            family: family.into(),
            weight,
            size,
            letter_spacing: 0.0,
        }
    }

    fn key(&self, text: &str) -> ShapeKey {
        ShapeKey {
            text: text.to_string(),
            family: self.family.clone(),
            weight: self.weight,
            size_bits: self.size.to_bits(),
            spacing_bits: self.letter_spacing.to_bits(),
        }
    }
}

/// Width of a string in a given font.
pub trait TextMeasure {
    fn measure(&mut self, text: &str, font: &FontSpec) -> f64;
}

/// Deterministic width estimate used when no face is available.
#[derive(Clone, Copy, Debug, Default)]
pub struct EstimateMeasure;

impl EstimateMeasure {
    pub fn width(text: &str, font: &FontSpec) -> f64 {
        let chars = text.chars().count() as f64;
        let bold = if font.weight >= 700 { 1.1 } else { 1.0 };
        chars * font.size * 0.55 * bold + chars * font.letter_spacing
    }

    pub fn height(font: &FontSpec) -> f64 {
        font.size * 1.2
    }
}

impl TextMeasure for EstimateMeasure {
    fn measure(&mut self, text: &str, font: &FontSpec) -> f64 {
        Self::width(text, font)
    }
}

/// Outcome of font registration.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FontLoadReport {
    pub loaded: usize,
    pub missing: Vec<PathBuf>,
    pub failed: Vec<PathBuf>,
}

/// Shared font database: the bundled caption fonts plus, optionally, system fonts.
///
/// Built once per job and shared read-only between render workers.
pub struct FontLibrary {
    db: usvg::fontdb::Database,
    report: FontLoadReport,
}

impl std::fmt::Debug for FontLibrary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FontLibrary")
            .field("faces", &self.db.len())
            .field("report", &self.report)
            .finish()
    }
}

impl FontLibrary {
    /// Library with no faces; text falls back to width estimates and is not drawn.
    pub fn empty() -> Self {
        Self {
            db: usvg::fontdb::Database::new(),
            report: FontLoadReport::default(),
        }
    }

    /// Register the bundled fonts from `fonts_dir`. Missing files are warnings.
    pub fn load(fonts_dir: Option<&Path>, system_fonts: bool) -> Self {
        let mut lib = Self::empty();
        if system_fonts {
            lib.db.load_system_fonts();
        }
        match fonts_dir {
            Some(dir) if dir.is_dir() => {
                for (file, family) in BUNDLED_FONTS {
                    let path = dir.join(file);
                    if !path.is_file() {
                        tracing::warn!(path = %path.display(), family, "font file not found");
                        lib.report.missing.push(path);
                        continue;
                    }
                    lib.register_file(&path);
                }
            }
            Some(dir) => {
                tracing::warn!(dir = %dir.display(), "fonts directory not found");
            }
            None => {}
        }
        tracing::info!(
            loaded = lib.report.loaded,
            missing = lib.report.missing.len(),
            failed = lib.report.failed.len(),
            faces = lib.db.len(),
            "font registration complete"
        );
        lib
    }

    /// [`FontLibrary::load`] with the directory taken from `CAPFLOW_FONTS_DIR`.
    pub fn from_env(system_fonts: bool) -> Self {
        let dir = std::env::var_os(FONTS_DIR_ENV).map(PathBuf::from);
        Self::load(dir.as_deref(), system_fonts)
    }

    /// Register one font file. Returns `false` when it could not be read.
    pub fn register_file(&mut self, path: &Path) -> bool {
        match self.db.load_font_file(path) {
            Ok(()) => {
                tracing::debug!(path = %path.display(), "registered font");
                self.report.loaded += 1;
                true
            }
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "failed to load font");
                self.report.failed.push(path.to_path_buf());
                false
            }
        }
    }

    pub fn report(&self) -> &FontLoadReport {
        &self.report
    }

    pub fn has_faces(&self) -> bool {
        !self.db.is_empty()
    }

    /// Best face for `family`/`weight`, falling back to any sans-serif face, then any face.
    fn query(&self, family: &str, weight: u16) -> Option<usvg::fontdb::ID> {
        use usvg::fontdb::{Family, Query, Stretch, Style, Weight};

        let requested = match family.trim().to_ascii_lowercase().as_str() {
            "monospace" => Family::Monospace,
            "serif" => Family::Serif,
            "sans-serif" => Family::SansSerif,
            _ => Family::Name(family),
        };
        let families = [requested, Family::SansSerif];
        let query = Query {
            families: &families,
            weight: Weight(weight),
            stretch: Stretch::Normal,
            style: Style::Normal,
        };
        self.db
            .query(&query)
            .or_else(|| self.db.faces().next().map(|f| f.id))
    }

    fn load_face(&self, family: &str, weight: u16) -> Option<LoadedFace> {
        let id = self.query(family, weight)?;
        let face_weight = self.db.face(id).map_or(weight, |f| f.weight.0);
        let (bytes, index) = self.db.with_face_data(id, |data, index| (data.to_vec(), index))?;
        Some(LoadedFace {
            bytes,
            index,
            weight: face_weight,
        })
    }
}

struct LoadedFace {
    bytes: Vec<u8>,
    index: u32,
    weight: u16,
}

struct ResolvedFace {
    font: vello_cpu::peniko::FontData,
    family_name: String,
    weight: u16,
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
struct ShapeKey {
    text: String,
    family: String,
    weight: u16,
    size_bits: u64,
    spacing_bits: u64,
}

/// Shaped text run positioned with its layout box starting at the origin.
#[derive(Clone, Debug)]
pub struct ShapedText {
    pub width: f64,
    pub height: f64,
    pub font_size: f32,
    pub glyphs: Vec<vello_cpu::Glyph>,
    /// `None` when no face was available; only metrics are meaningful then.
    pub font: Option<vello_cpu::peniko::FontData>,
}

/// Per-worker text shaper backed by parley.
///
/// Resolves faces through the shared [`FontLibrary`] and caches shaped runs, so repeated frames
/// of one caption line shape only once.
pub struct TextShaper {
    fonts: Arc<FontLibrary>,
    font_ctx: parley::FontContext,
    layout_ctx: parley::LayoutContext<()>,
    faces: HashMap<(String, u16), Option<Arc<ResolvedFace>>>,
    shaped: HashMap<ShapeKey, Arc<ShapedText>>,
}

impl TextShaper {
    pub fn new(fonts: Arc<FontLibrary>) -> Self {
        Self {
            fonts,
            font_ctx: parley::FontContext::default(),
            layout_ctx: parley::LayoutContext::new(),
            faces: HashMap::new(),
            shaped: HashMap::new(),
        }
    }

    fn face_for(&mut self, spec: &FontSpec) -> Option<Arc<ResolvedFace>> {
        let key = (spec.family.clone(), spec.weight);
        if let Some(face) = self.faces.get(&key) {
            return face.clone();
        }

        let resolved = self.fonts.load_face(&spec.family, spec.weight).and_then(|face| {
            let families = self
                .font_ctx
                .collection
                .register_fonts(parley::fontique::Blob::from(face.bytes.clone()), None);
            let family_id = families.first().map(|(id, _)| *id)?;
            let family_name = self.font_ctx.collection.family_name(family_id)?.to_string();
            Some(Arc::new(ResolvedFace {
                font: vello_cpu::peniko::FontData::new(
                    vello_cpu::peniko::Blob::from(face.bytes),
                    face.index,
                ),
                family_name,
                weight: face.weight,
            }))
        });
        if resolved.is_none() {
            tracing::debug!(
                family = %spec.family,
                weight = spec.weight,
                "no font face available, using width estimate"
            );
        }
        self.faces.insert(key, resolved.clone());
        resolved
    }

    /// Shape `text`, using the cache when possible.
    pub fn shape(&mut self, text: &str, spec: &FontSpec) -> Arc<ShapedText> {
        let key = spec.key(text);
        if let Some(hit) = self.shaped.get(&key) {
            return Arc::clone(hit);
        }
        let shaped = Arc::new(self.shape_uncached(text, spec));
        if self.shaped.len() >= SHAPE_CACHE_LIMIT {
            self.shaped.clear();
        }
        self.shaped.insert(key, Arc::clone(&shaped));
        shaped
    }

    fn shape_uncached(&mut self, text: &str, spec: &FontSpec) -> ShapedText {
        let size_px = spec.size as f32;
        let estimate = ShapedText {
            width: EstimateMeasure::width(text, spec),
            height: EstimateMeasure::height(spec),
            font_size: size_px,
            glyphs: Vec::new(),
            font: None,
        };
        if text.is_empty() || !size_px.is_finite() || size_px <= 0.0 {
            return estimate;
        }
        let Some(face) = self.face_for(spec) else {
            return estimate;
        };

        let mut builder = self
            .layout_ctx
            .ranged_builder(&mut self.font_ctx, text, 1.0, true);
        builder.push_default(parley::style::StyleProperty::FontStack(
            parley::style::FontStack::Source(Cow::Owned(face.family_name.clone())),
        ));
        builder.push_default(parley::style::StyleProperty::FontSize(size_px));
        builder.push_default(parley::style::StyleProperty::FontWeight(
            parley::style::FontWeight::new(f32::from(face.weight)),
        ));
        if spec.letter_spacing != 0.0 {
            builder.push_default(parley::style::StyleProperty::LetterSpacing(
                spec.letter_spacing as f32,
            ));
        }
        let mut layout: parley::Layout<()> = builder.build(text);
        layout.break_all_lines(None);

        let mut glyphs = Vec::new();
        for line in layout.lines() {
            for item in line.items() {
                let parley::layout::PositionedLayoutItem::GlyphRun(run) = item else {
                    continue;
                };
                glyphs.extend(run.positioned_glyphs().map(|g| vello_cpu::Glyph {
                    id: g.id,
                    x: g.x,
                    y: g.y,
                }));
            }
        }

        ShapedText {
            width: f64::from(layout.width()),
            height: f64::from(layout.height()),
            font_size: size_px,
            glyphs,
            font: Some(face.font.clone()),
        }
    }
}

impl TextMeasure for TextShaper {
    fn measure(&mut self, text: &str, font: &FontSpec) -> f64 {
        self.shape(text, font).width
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/text.rs"]
mod tests;
