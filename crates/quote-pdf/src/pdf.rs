//! PDF emission
//!
//! Each page band becomes one page. Text is written as glyph ids through a
//! Type0/Identity-H font, with a ToUnicode map so the output stays searchable.

use std::collections::{BTreeMap, BTreeSet};

use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Dictionary, Document, Object, ObjectId, Stream, StringFormat};

use crate::error::RenderError;
use crate::fonts::{FontFace, FontSet, FontWeight, Glyph, OutlineFormat};
use crate::layout::{Canvas, Element};
use crate::logo::{LogoImage, LogoPixels};
use crate::paginate::PageBand;

const LOGO_RESOURCE: &str = "Im1";
const PRODUCER: &str = "quote-pdf";

/// Entries per `beginbfchar` section; the CMap format caps it at 100
const BFCHAR_CHUNK: usize = 100;

/// Document-level metadata written to the Info dictionary
#[derive(Debug, Clone, Copy)]
pub struct DocumentInfo<'a> {
    pub title: &'a str,
    pub subject: &'a str,
}

fn font_resource(weight: FontWeight) -> &'static str {
    match weight {
        FontWeight::Regular => "F1",
        FontWeight::Bold => "F2",
    }
}

/// Glyphs referenced by the page contents, per weight
#[derive(Debug, Default)]
struct GlyphUsage {
    used: BTreeMap<FontWeight, BTreeMap<u16, (Glyph, char)>>,
    missing: BTreeSet<char>,
}

impl GlyphUsage {
    /// Encode `text` as big-endian glyph ids and record what was used
    fn encode(&mut self, weight: FontWeight, face: &FontFace, text: &str) -> Vec<u8> {
        let used = self.used.entry(weight).or_default();
        let mut bytes = Vec::with_capacity(text.len() * 2);

        for c in text.chars() {
            let glyph = face.glyph(c).unwrap_or_else(|| {
                if !c.is_whitespace() {
                    self.missing.insert(c);
                }
                face.missing_glyph()
            });
            used.entry(glyph.id).or_insert((glyph, c));
            bytes.extend_from_slice(&glyph.id.to_be_bytes());
        }
        bytes
    }
}

/// Write the paginated canvas as a PDF
pub fn write_pdf(
    canvas: &Canvas,
    bands: &[PageBand],
    page_height: f32,
    fonts: &FontSet,
    logo: Option<&LogoImage>,
    info: &DocumentInfo<'_>,
) -> Result<Vec<u8>, RenderError> {
    let mut doc = Document::with_version("1.7");
    let pages_id = doc.new_object_id();
    let mut glyphs = GlyphUsage::default();

    let mut page_ids = Vec::with_capacity(bands.len());
    for band in bands {
        let content = page_content(canvas, band, page_height, fonts, logo.is_some(), &mut glyphs);
        let content_id = doc.add_object(Stream::new(Dictionary::new(), content.encode()?));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => Object::Reference(pages_id),
            "Contents" => Object::Reference(content_id),
        });
        page_ids.push(page_id);
    }

    let mut font_resources = Dictionary::new();
    for (weight, used) in &glyphs.used {
        let font_id = embed_font(&mut doc, fonts.face(*weight), used);
        font_resources.set(font_resource(*weight), Object::Reference(font_id));
    }

    let mut resources = dictionary! {
        "Font" => font_resources,
    };
    if let Some(logo) = logo {
        let image_id = embed_logo(&mut doc, logo);
        resources.set(
            "XObject",
            dictionary! { LOGO_RESOURCE => Object::Reference(image_id) },
        );
    }
    let resources_id = doc.add_object(resources);

    let pages = dictionary! {
        "Type" => "Pages",
        "Kids" => page_ids.iter().map(|id| Object::Reference(*id)).collect::<Vec<_>>(),
        "Count" => page_ids.len() as i64,
        "Resources" => Object::Reference(resources_id),
        "MediaBox" => vec![
            Object::Integer(0),
            Object::Integer(0),
            Object::Real(canvas.width),
            Object::Real(page_height),
        ],
    };
    doc.objects.insert(pages_id, Object::Dictionary(pages));

    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => Object::Reference(pages_id),
    });
    doc.trailer.set("Root", Object::Reference(catalog_id));

    let info_id = doc.add_object(dictionary! {
        "Title" => text_string(info.title),
        "Subject" => text_string(info.subject),
        "Producer" => Object::string_literal(PRODUCER),
    });
    doc.trailer.set("Info", Object::Reference(info_id));

    if !glyphs.missing.is_empty() {
        tracing::warn!(
            "Font has no glyphs for {} characters: {:?}",
            glyphs.missing.len(),
            glyphs.missing
        );
    }

    doc.compress();
    let mut buffer = Vec::new();
    doc.save_to(&mut buffer)?;

    tracing::debug!("Wrote {} pages, {} bytes", page_ids.len(), buffer.len());
    Ok(buffer)
}

/// Content stream for one band, in PDF's bottom-up coordinates
fn page_content(
    canvas: &Canvas,
    band: &PageBand,
    page_height: f32,
    fonts: &FontSet,
    has_logo: bool,
    glyphs: &mut GlyphUsage,
) -> Content {
    let to_pdf_y = |y: f32| page_height - (y + band.offset);
    let mut operations = vec![Operation::new("G", vec![Object::Integer(0)])];

    for element in &canvas.elements {
        let (top, bottom) = element.vertical_extent();
        if !band.intersects(top, bottom) {
            continue;
        }

        match element {
            Element::Text(run) => {
                if run.text.is_empty() {
                    continue;
                }
                let encoded = glyphs.encode(run.weight, fonts.face(run.weight), &run.text);
                operations.extend([
                    Operation::new("BT", vec![]),
                    Operation::new(
                        "Tf",
                        vec![
                            Object::Name(font_resource(run.weight).as_bytes().to_vec()),
                            Object::Real(run.size),
                        ],
                    ),
                    Operation::new("g", vec![Object::Real(run.gray)]),
                    Operation::new(
                        "Td",
                        vec![Object::Real(run.x), Object::Real(to_pdf_y(run.baseline))],
                    ),
                    Operation::new(
                        "Tj",
                        vec![Object::String(encoded, StringFormat::Hexadecimal)],
                    ),
                    Operation::new("ET", vec![]),
                ]);
            }
            Element::Rule { x1, x2, y, width } => {
                let y = to_pdf_y(*y);
                operations.extend([
                    Operation::new("w", vec![Object::Real(*width)]),
                    Operation::new("m", vec![Object::Real(*x1), Object::Real(y)]),
                    Operation::new("l", vec![Object::Real(*x2), Object::Real(y)]),
                    Operation::new("S", vec![]),
                ]);
            }
            Element::Frame {
                x,
                y,
                width,
                height,
                line_width,
            } => {
                operations.extend([
                    Operation::new("w", vec![Object::Real(*line_width)]),
                    Operation::new(
                        "re",
                        vec![
                            Object::Real(*x),
                            Object::Real(to_pdf_y(y + height)),
                            Object::Real(*width),
                            Object::Real(*height),
                        ],
                    ),
                    Operation::new("S", vec![]),
                ]);
            }
            Element::Logo {
                x,
                y,
                width,
                height,
            } => {
                if !has_logo {
                    continue;
                }
                operations.extend([
                    Operation::new("q", vec![]),
                    Operation::new(
                        "cm",
                        vec![
                            Object::Real(*width),
                            Object::Integer(0),
                            Object::Integer(0),
                            Object::Real(*height),
                            Object::Real(*x),
                            Object::Real(to_pdf_y(y + height)),
                        ],
                    ),
                    Operation::new("Do", vec![Object::Name(LOGO_RESOURCE.as_bytes().to_vec())]),
                    Operation::new("Q", vec![]),
                ]);
            }
        }
    }

    Content { operations }
}

/// Font program holding only the used glyphs, with glyph ids unchanged
///
/// Falls back to the whole face when the subsetter rejects it.
fn font_program(face: &FontFace, used: &BTreeMap<u16, (Glyph, char)>) -> Vec<u8> {
    let glyph_ids: Vec<u16> = std::iter::once(0)
        .chain(used.keys().copied().filter(|gid| *gid != 0))
        .collect();

    match subsetter::subset(face.data(), 0, subsetter::Profile::pdf(&glyph_ids)) {
        Ok(program) => {
            tracing::debug!(
                "Subset {} to {} glyphs ({} of {} bytes)",
                face.postscript_name(),
                glyph_ids.len(),
                program.len(),
                face.data().len()
            );
            program
        }
        Err(e) => {
            tracing::warn!(
                "Embedding {} whole, subsetting failed: {:?}",
                face.postscript_name(),
                e
            );
            face.data().to_vec()
        }
    }
}

/// Embed the used glyphs of a face as a Type0 font and return the font dictionary id
fn embed_font(doc: &mut Document, face: &FontFace, used: &BTreeMap<u16, (Glyph, char)>) -> ObjectId {
    let base_font = Object::Name(face.postscript_name().as_bytes().to_vec());
    let program = font_program(face, used);

    let (font_file_key, font_file, cid_subtype) = match face.outline() {
        OutlineFormat::TrueType => (
            "FontFile2",
            Stream::new(dictionary! { "Length1" => program.len() as i64 }, program),
            "CIDFontType2",
        ),
        OutlineFormat::Cff => (
            "FontFile3",
            Stream::new(dictionary! { "Subtype" => "OpenType" }, program),
            "CIDFontType0",
        ),
    };
    let font_file_id = doc.add_object(font_file);

    let units = |value: i16| Object::Integer(face.to_pdf_units(value as i32));
    let [x_min, y_min, x_max, y_max] = face.bbox();
    let mut descriptor = dictionary! {
        "Type" => "FontDescriptor",
        "FontName" => base_font.clone(),
        "Flags" => 32,
        "FontBBox" => vec![units(x_min), units(y_min), units(x_max), units(y_max)],
        "ItalicAngle" => 0,
        "Ascent" => units(face.ascender()),
        "Descent" => units(face.descender()),
        "CapHeight" => units(face.cap_height()),
        "StemV" => if face.is_bold() { 120 } else { 80 },
    };
    descriptor.set(font_file_key, Object::Reference(font_file_id));
    let descriptor_id = doc.add_object(descriptor);

    let widths: Vec<Object> = used
        .iter()
        .flat_map(|(gid, (glyph, _))| {
            [
                Object::Integer(*gid as i64),
                Object::Array(vec![Object::Integer(
                    face.to_pdf_units(glyph.advance as i32),
                )]),
            ]
        })
        .collect();

    let mut cid_font = dictionary! {
        "Type" => "Font",
        "Subtype" => cid_subtype,
        "BaseFont" => base_font.clone(),
        "CIDSystemInfo" => dictionary! {
            "Registry" => Object::string_literal("Adobe"),
            "Ordering" => Object::string_literal("Identity"),
            "Supplement" => 0,
        },
        "FontDescriptor" => Object::Reference(descriptor_id),
        "DW" => Object::Integer(face.to_pdf_units(face.missing_glyph().advance as i32)),
        "W" => widths,
    };
    if face.outline() == OutlineFormat::TrueType {
        cid_font.set("CIDToGIDMap", "Identity");
    }
    let cid_font_id = doc.add_object(cid_font);

    let to_unicode_id = doc.add_object(Stream::new(
        Dictionary::new(),
        to_unicode_cmap(used).into_bytes(),
    ));

    doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type0",
        "BaseFont" => base_font,
        "Encoding" => "Identity-H",
        "DescendantFonts" => vec![Object::Reference(cid_font_id)],
        "ToUnicode" => Object::Reference(to_unicode_id),
    })
}

/// CMap mapping the used glyph ids back to Unicode
fn to_unicode_cmap(used: &BTreeMap<u16, (Glyph, char)>) -> String {
    let entries: Vec<(u16, char)> = used
        .iter()
        .filter(|(gid, _)| **gid != 0)
        .map(|(gid, (_, c))| (*gid, *c))
        .collect();

    let mut cmap = String::from(
        "/CIDInit /ProcSet findresource begin\n\
         12 dict begin\n\
         begincmap\n\
         /CIDSystemInfo << /Registry (Adobe) /Ordering (UCS) /Supplement 0 >> def\n\
         /CMapName /Adobe-Identity-UCS def\n\
         /CMapType 2 def\n\
         1 begincodespacerange\n\
         <0000> <FFFF>\n\
         endcodespacerange\n",
    );

    for chunk in entries.chunks(BFCHAR_CHUNK) {
        cmap.push_str(&format!("{} beginbfchar\n", chunk.len()));
        for (gid, c) in chunk {
            let mut units = [0u16; 2];
            let unicode: String = c
                .encode_utf16(&mut units)
                .iter()
                .map(|unit| format!("{unit:04X}"))
                .collect();
            cmap.push_str(&format!("<{gid:04X}> <{unicode}>\n"));
        }
        cmap.push_str("endbfchar\n");
    }

    cmap.push_str(
        "endcmap\n\
         CMapName currentdict /CMap defineresource pop\n\
         end\n\
         end\n",
    );
    cmap
}

fn embed_logo(doc: &mut Document, logo: &LogoImage) -> ObjectId {
    let color_space = if logo.components() == 1 {
        "DeviceGray"
    } else {
        "DeviceRGB"
    };
    let image_dict = |color_space: &str| {
        dictionary! {
            "Type" => "XObject",
            "Subtype" => "Image",
            "Width" => logo.width as i64,
            "Height" => logo.height as i64,
            "ColorSpace" => Object::Name(color_space.as_bytes().to_vec()),
            "BitsPerComponent" => 8,
        }
    };

    match &logo.pixels {
        LogoPixels::Jpeg { data, .. } => {
            let mut dict = image_dict(color_space);
            dict.set("Filter", "DCTDecode");
            doc.add_object(Stream::new(dict, data.clone()).with_compression(false))
        }
        LogoPixels::Raw { color, alpha, .. } => {
            let mut dict = image_dict(color_space);
            if let Some(alpha) = alpha {
                let mask_id = doc.add_object(Stream::new(image_dict("DeviceGray"), alpha.clone()));
                dict.set("SMask", Object::Reference(mask_id));
            }
            doc.add_object(Stream::new(dict, color.clone()))
        }
    }
}

/// PDF text string in UTF-16BE with a byte order mark
fn text_string(text: &str) -> Object {
    let mut bytes = vec![0xFE, 0xFF];
    for unit in text.encode_utf16() {
        bytes.extend_from_slice(&unit.to_be_bytes());
    }
    Object::String(bytes, StringFormat::Hexadecimal)
}
