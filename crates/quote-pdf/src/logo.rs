//! Logo lookup and decoding
//!
//! Candidates are tried in order and the first file that both reads and
//! decodes is used. PNG is decoded to raw samples with the alpha channel split
//! out as a soft mask; JPEG is embedded as-is. Anything else is skipped.

use std::path::{Path, PathBuf};

use image::{ColorType, ImageFormat};

use crate::error::LogoError;

/// Sample data in a form a PDF image XObject can hold directly
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogoPixels {
    /// DCT-encoded stream, passed through untouched
    Jpeg { data: Vec<u8>, components: u8 },
    /// 8-bit samples, row-major, no padding
    Raw {
        color: Vec<u8>,
        components: u8,
        alpha: Option<Vec<u8>>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogoImage {
    pub width: u32,
    pub height: u32,
    pub pixels: LogoPixels,
}

impl LogoImage {
    /// Decode by content, not by file extension
    pub fn decode(bytes: &[u8]) -> Result<Self, LogoError> {
        match image::guess_format(bytes) {
            Ok(ImageFormat::Png) => decode_png(bytes),
            Ok(ImageFormat::Jpeg) => decode_jpeg(bytes),
            _ => Err(LogoError::UnsupportedFormat),
        }
    }

    /// Number of color components (1 gray, 3 RGB)
    pub fn components(&self) -> u8 {
        match &self.pixels {
            LogoPixels::Jpeg { components, .. } | LogoPixels::Raw { components, .. } => {
                *components
            }
        }
    }
}

fn decode_png(bytes: &[u8]) -> Result<LogoImage, LogoError> {
    let mut decoder = png::Decoder::new(bytes);
    decoder.set_transformations(png::Transformations::EXPAND | png::Transformations::STRIP_16);
    let mut reader = decoder.read_info()?;

    let mut buffer = vec![0; reader.output_buffer_size()];
    let frame = reader.next_frame(&mut buffer)?;
    buffer.truncate(frame.buffer_size());

    if frame.bit_depth != png::BitDepth::Eight {
        return Err(LogoError::UnsupportedFormat);
    }

    let (color, components, alpha) = match frame.color_type {
        png::ColorType::Grayscale => (buffer, 1, None),
        png::ColorType::Rgb => (buffer, 3, None),
        png::ColorType::GrayscaleAlpha => split_alpha(&buffer, 1),
        png::ColorType::Rgba => split_alpha(&buffer, 3),
        png::ColorType::Indexed => return Err(LogoError::UnsupportedFormat),
    };

    Ok(LogoImage {
        width: frame.width,
        height: frame.height,
        pixels: LogoPixels::Raw {
            color,
            components,
            alpha,
        },
    })
}

/// Separate interleaved color+alpha samples; fully opaque alpha is dropped
fn split_alpha(samples: &[u8], components: usize) -> (Vec<u8>, u8, Option<Vec<u8>>) {
    let stride = components + 1;
    let pixels = samples.len() / stride;
    let mut color = Vec::with_capacity(pixels * components);
    let mut alpha = Vec::with_capacity(pixels);

    for pixel in samples.chunks_exact(stride) {
        color.extend_from_slice(&pixel[..components]);
        alpha.push(pixel[components]);
    }

    let alpha = alpha.iter().any(|&a| a != u8::MAX).then_some(alpha);
    (color, components as u8, alpha)
}

/// Decode fully so broken streams are rejected, then embed the original bytes
fn decode_jpeg(bytes: &[u8]) -> Result<LogoImage, LogoError> {
    let decoded = image::load_from_memory_with_format(bytes, ImageFormat::Jpeg)?;
    let components = match decoded.color() {
        ColorType::L8 => 1,
        ColorType::Rgb8 => 3,
        _ => return Err(LogoError::UnsupportedFormat),
    };
    Ok(LogoImage {
        width: decoded.width(),
        height: decoded.height(),
        pixels: LogoPixels::Jpeg {
            data: bytes.to_vec(),
            components,
        },
    })
}

/// Read and decode one candidate
pub async fn load_logo(path: &Path) -> Result<LogoImage, LogoError> {
    let bytes = tokio::fs::read(path).await?;
    LogoImage::decode(&bytes)
}

/// First candidate under `root` that reads and decodes, if any
pub async fn resolve_logo(root: &Path, candidates: &[PathBuf]) -> Option<LogoImage> {
    for candidate in candidates {
        let path = root.join(candidate);
        match load_logo(&path).await {
            Ok(logo) => {
                tracing::debug!(
                    "Logo loaded from {} ({}x{})",
                    path.display(),
                    logo.width,
                    logo.height
                );
                return Some(logo);
            }
            Err(LogoError::Io(e)) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!("No logo at {}", path.display());
            }
            Err(e) => {
                tracing::warn!("Skipping logo candidate {}: {}", path.display(), e);
            }
        }
    }

    tracing::warn!(
        "Logo image not found under {}; rendering without it",
        root.display()
    );
    None
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// Encode a small RGBA PNG
    pub(crate) fn rgba_png(width: u32, height: u32, alpha: u8) -> Vec<u8> {
        let mut bytes = Vec::new();
        {
            let mut encoder = png::Encoder::new(&mut bytes, width, height);
            encoder.set_color(png::ColorType::Rgba);
            encoder.set_depth(png::BitDepth::Eight);
            let mut writer = encoder.write_header().unwrap();
            let data: Vec<u8> = (0..width * height)
                .flat_map(|i| [(i % 256) as u8, 0x40, 0x80, alpha])
                .collect();
            writer.write_image_data(&data).unwrap();
        }
        bytes
    }

    /// Encode a small baseline JPEG
    pub(crate) fn rgb_jpeg(width: u32, height: u32) -> Vec<u8> {
        let pixels = image::RgbImage::from_fn(width, height, |x, y| {
            image::Rgb([(x * 16) as u8, (y * 16) as u8, 0x80])
        });
        let mut cursor = std::io::Cursor::new(Vec::new());
        image::DynamicImage::ImageRgb8(pixels)
            .write_to(&mut cursor, ImageFormat::Jpeg)
            .unwrap();
        cursor.into_inner()
    }

    /// SOI, a 100x50 SOF0 frame header and EOI; no tables, no scan data
    fn header_only_jpeg() -> Vec<u8> {
        let mut bytes = vec![0xFF, 0xD8];
        bytes.extend_from_slice(&[0xFF, 0xC0, 0x00, 0x11, 0x08, 0x00, 0x32, 0x00, 0x64]);
        bytes.extend_from_slice(&[0x03, 0x01, 0x22, 0x00, 0x02, 0x11, 0x01, 0x03, 0x11, 0x01]);
        bytes.extend_from_slice(&[0xFF, 0xD9]);
        bytes
    }

    #[test]
    fn test_decode_png_with_transparency() {
        let logo = LogoImage::decode(&rgba_png(4, 3, 0x80)).unwrap();
        assert_eq!((logo.width, logo.height), (4, 3));
        match logo.pixels {
            LogoPixels::Raw {
                color,
                components,
                alpha,
            } => {
                assert_eq!(components, 3);
                assert_eq!(color.len(), 4 * 3 * 3);
                assert_eq!(alpha.map(|a| a.len()), Some(12));
            }
            other => panic!("expected raw pixels, got {other:?}"),
        }
    }

    #[test]
    fn test_opaque_png_has_no_mask() {
        let logo = LogoImage::decode(&rgba_png(2, 2, 0xFF)).unwrap();
        assert!(matches!(logo.pixels, LogoPixels::Raw { alpha: None, .. }));
    }

    #[test]
    fn test_decode_jpeg_keeps_original_stream() {
        let bytes = rgb_jpeg(64, 48);
        let logo = LogoImage::decode(&bytes).unwrap();
        assert_eq!((logo.width, logo.height), (64, 48));
        assert_eq!(logo.components(), 3);
        assert_eq!(
            logo.pixels,
            LogoPixels::Jpeg {
                data: bytes,
                components: 3
            }
        );
    }

    #[test]
    fn test_decode_grayscale_jpeg() {
        let pixels = image::GrayImage::from_fn(8, 8, |x, _| image::Luma([(x * 30) as u8]));
        let mut cursor = std::io::Cursor::new(Vec::new());
        image::DynamicImage::ImageLuma8(pixels)
            .write_to(&mut cursor, ImageFormat::Jpeg)
            .unwrap();

        let logo = LogoImage::decode(cursor.get_ref()).unwrap();
        assert_eq!(logo.components(), 1);
    }

    #[test]
    fn test_jpeg_without_scan_data_is_rejected() {
        assert!(matches!(
            LogoImage::decode(&header_only_jpeg()),
            Err(LogoError::Image(_))
        ));
    }

    #[test]
    fn test_svg_is_unsupported() {
        let svg = br#"<svg xmlns="http://www.w3.org/2000/svg" width="10" height="10"/>"#;
        assert!(matches!(
            LogoImage::decode(svg),
            Err(LogoError::UnsupportedFormat)
        ));
    }

    #[test]
    fn test_truncated_jpeg_is_rejected() {
        assert!(matches!(
            LogoImage::decode(&[0xFF, 0xD8, 0xFF, 0xD9]),
            Err(LogoError::Image(_))
        ));
    }

    #[tokio::test]
    async fn test_resolve_skips_missing_and_undecodable() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("logo.jpg"), b"not really a jpeg").unwrap();
        std::fs::write(dir.path().join("logo.jpeg"), rgb_jpeg(10, 20)).unwrap();

        let candidates: Vec<PathBuf> = ["logo.png", "logo.jpg", "logo.jpeg", "logo.svg"]
            .into_iter()
            .map(PathBuf::from)
            .collect();
        let logo = resolve_logo(dir.path(), &candidates).await.unwrap();
        assert_eq!((logo.width, logo.height), (10, 20));
    }

    #[tokio::test]
    async fn test_undecodable_jpeg_falls_through_to_next_candidate() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("logo.jpg"), header_only_jpeg()).unwrap();
        std::fs::write(dir.path().join("logo.jpeg"), rgb_jpeg(12, 6)).unwrap();

        let candidates = vec![PathBuf::from("logo.jpg"), PathBuf::from("logo.jpeg")];
        let logo = resolve_logo(dir.path(), &candidates).await.unwrap();
        assert_eq!((logo.width, logo.height), (12, 6));

        let only_broken = vec![PathBuf::from("logo.jpg")];
        assert!(resolve_logo(dir.path(), &only_broken).await.is_none());
    }

    #[tokio::test]
    async fn test_resolve_without_any_logo() {
        let dir = tempfile::tempdir().unwrap();
        let candidates = vec![PathBuf::from("logo.png")];
        assert!(resolve_logo(dir.path(), &candidates).await.is_none());
    }
}
