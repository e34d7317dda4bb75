//! Font loading, measurement and glyph lookup
//!
//! Text is drawn with an embedded Unicode font so the Greek labels survive.
//! The default faces come from the fonts bundled by `typst-assets`; a
//! configured regular/bold pair overrides them.

use std::borrow::Cow;
use std::collections::HashMap;
use std::path::Path;
use std::sync::{Arc, OnceLock};

use ttf_parser::{name_id, Face, GlyphId};

use crate::config::FontConfig;
use crate::error::RenderError;

/// Characters every usable face must cover
const GREEK_SAMPLE: &str = "ΑΩαωή";

/// Parsed bundled faces, shared by every renderer in the process
static BUNDLED_FACES: OnceLock<Vec<FontFace>> = OnceLock::new();

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum FontWeight {
    Regular,
    Bold,
}

/// Text measurement used by the layout
pub trait TextMeasure {
    /// Advance width of `text` in points
    fn text_width(&self, text: &str, size: f32, weight: FontWeight) -> f32;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Glyph {
    pub id: u16,
    pub advance: u16,
}

/// Outline flavour, which decides how the face is embedded
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutlineFormat {
    TrueType,
    Cff,
}

/// A single parsed font face with its character map flattened
#[derive(Debug, Clone)]
pub struct FontFace {
    data: Cow<'static, [u8]>,
    postscript_name: String,
    family: String,
    outline: OutlineFormat,
    weight: u16,
    italic: bool,
    units_per_em: u16,
    ascender: i16,
    descender: i16,
    cap_height: i16,
    bbox: [i16; 4],
    glyphs: HashMap<char, Glyph>,
    missing: Glyph,
}

impl FontFace {
    /// Parse a TrueType or OpenType/CFF font (collections are not supported)
    pub fn parse(data: Cow<'static, [u8]>) -> Result<Self, RenderError> {
        let outline = match data.get(0..4) {
            Some([0x00, 0x01, 0x00, 0x00]) | Some(b"true") => OutlineFormat::TrueType,
            Some(b"OTTO") => OutlineFormat::Cff,
            _ => {
                return Err(RenderError::Font(
                    "unsupported font container".to_string(),
                ))
            }
        };

        let face = Face::parse(&data, 0).map_err(|e| RenderError::Font(e.to_string()))?;

        let mut glyphs = HashMap::new();
        if let Some(cmap) = face.tables().cmap {
            for subtable in cmap.subtables {
                if !subtable.is_unicode() {
                    continue;
                }
                subtable.codepoints(|code_point| {
                    let (Some(c), Some(gid)) =
                        (char::from_u32(code_point), subtable.glyph_index(code_point))
                    else {
                        return;
                    };
                    glyphs.entry(c).or_insert(Glyph {
                        id: gid.0,
                        advance: face.glyph_hor_advance(gid).unwrap_or(0),
                    });
                });
            }
        }

        let units_per_em = face.units_per_em();
        let missing = Glyph {
            id: 0,
            advance: face
                .glyph_hor_advance(GlyphId(0))
                .unwrap_or(units_per_em / 2),
        };
        let bbox = face.global_bounding_box();
        let family = name_string(&face, name_id::TYPOGRAPHIC_FAMILY)
            .or_else(|| name_string(&face, name_id::FAMILY))
            .unwrap_or_default();
        let postscript_name = name_string(&face, name_id::POST_SCRIPT_NAME)
            .map(|name| sanitize_font_name(&name))
            .filter(|name| !name.is_empty())
            .unwrap_or_else(|| sanitize_font_name(&family));

        Ok(Self {
            postscript_name,
            family,
            outline,
            weight: face.weight().to_number(),
            italic: face.is_italic(),
            units_per_em,
            ascender: face.ascender(),
            descender: face.descender(),
            cap_height: face.capital_height().unwrap_or(face.ascender()),
            bbox: [bbox.x_min, bbox.y_min, bbox.x_max, bbox.y_max],
            glyphs,
            missing,
            data,
        })
    }

    /// Load a face from disk
    pub fn from_file(path: &Path) -> Result<Self, RenderError> {
        let data = std::fs::read(path)?;
        Self::parse(Cow::Owned(data))
    }

    pub fn glyph(&self, c: char) -> Option<Glyph> {
        self.glyphs.get(&c).copied()
    }

    /// Glyph for `c`, falling back to `.notdef`
    pub fn glyph_or_missing(&self, c: char) -> Glyph {
        self.glyph(c).unwrap_or(self.missing)
    }

    pub fn covers(&self, text: &str) -> bool {
        text.chars().all(|c| c.is_whitespace() || self.glyphs.contains_key(&c))
    }

    pub fn text_width(&self, text: &str, size: f32) -> f32 {
        let units: u32 = text
            .chars()
            .map(|c| self.glyph_or_missing(c).advance as u32)
            .sum();
        units as f32 * size / self.units_per_em as f32
    }

    /// Convert font units to the 1000-unit glyph space used by PDF
    pub fn to_pdf_units(&self, value: i32) -> i64 {
        (value as f64 * 1000.0 / self.units_per_em as f64).round() as i64
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn postscript_name(&self) -> &str {
        &self.postscript_name
    }

    pub fn family(&self) -> &str {
        &self.family
    }

    pub fn outline(&self) -> OutlineFormat {
        self.outline
    }

    /// OS/2 weight class, 400 regular and 700 bold
    pub fn weight(&self) -> u16 {
        self.weight
    }

    pub fn is_bold(&self) -> bool {
        self.weight >= 600
    }

    pub fn ascender(&self) -> i16 {
        self.ascender
    }

    pub fn descender(&self) -> i16 {
        self.descender
    }

    pub fn cap_height(&self) -> i16 {
        self.cap_height
    }

    pub fn bbox(&self) -> [i16; 4] {
        self.bbox
    }

    pub fn missing_glyph(&self) -> Glyph {
        self.missing
    }
}

/// The regular/bold pair used by the document template
#[derive(Debug, Clone)]
pub struct FontSet {
    regular: FontFace,
    bold: FontFace,
}

impl FontSet {
    pub fn new(regular: FontFace, bold: FontFace) -> Self {
        Self { regular, bold }
    }

    /// Resolve the configured fonts, falling back to the bundled family
    pub fn from_config(config: &FontConfig) -> Result<Arc<Self>, RenderError> {
        let regular = match &config.regular {
            Some(path) => FontFace::from_file(path)?,
            None => pick_bundled(&config.family, false)?,
        };
        let bold = match &config.bold {
            Some(path) => FontFace::from_file(path)?,
            None => pick_bundled(&config.family, true).unwrap_or_else(|_| regular.clone()),
        };

        for face in [&regular, &bold] {
            if !face.covers(GREEK_SAMPLE) {
                tracing::warn!(
                    "Font {} does not cover Greek text; labels may render as boxes",
                    face.postscript_name()
                );
            }
        }

        tracing::info!(
            "Using fonts {} / {}",
            regular.postscript_name(),
            bold.postscript_name()
        );
        Ok(Arc::new(Self::new(regular, bold)))
    }

    pub fn face(&self, weight: FontWeight) -> &FontFace {
        match weight {
            FontWeight::Regular => &self.regular,
            FontWeight::Bold => &self.bold,
        }
    }
}

impl TextMeasure for FontSet {
    fn text_width(&self, text: &str, size: f32, weight: FontWeight) -> f32 {
        self.face(weight).text_width(text, size)
    }
}

/// Every upright face bundled with the binary that could be parsed
pub fn bundled_faces() -> &'static [FontFace] {
    BUNDLED_FACES.get_or_init(|| {
        let faces: Vec<FontFace> = typst_assets::fonts()
            .filter_map(|data| FontFace::parse(Cow::Borrowed(data)).ok())
            .filter(|face| !face.italic)
            .collect();
        tracing::info!("Bundled font cache initialized with {} faces", faces.len());
        faces
    })
}

/// Pick the bundled face closest to the requested weight, preferring `family`
fn pick_bundled(family: &str, bold: bool) -> Result<FontFace, RenderError> {
    let target: u16 = if bold { 700 } else { 400 };
    let distance = |face: &&FontFace| face.weight.abs_diff(target);
    let candidates = || {
        bundled_faces()
            .iter()
            .filter(|face| face.is_bold() == bold && face.covers(GREEK_SAMPLE))
    };

    candidates()
        .filter(|face| face.family.eq_ignore_ascii_case(family))
        .min_by_key(distance)
        .or_else(|| candidates().min_by_key(distance))
        .cloned()
        .ok_or_else(|| {
            RenderError::Font(format!(
                "no bundled {} face covers Greek text",
                if bold { "bold" } else { "regular" }
            ))
        })
}

fn name_string(face: &Face<'_>, id: u16) -> Option<String> {
    face.names()
        .into_iter()
        .filter(|name| name.name_id == id)
        .find_map(|name| name.to_string())
}

/// Keep only characters that are safe inside a PDF name
fn sanitize_font_name(name: &str) -> String {
    name.chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '+'))
        .collect()
}
