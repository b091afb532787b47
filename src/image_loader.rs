//! # Logo Loading
//!
//! Loads the company logo from a file path, a data URI, or raw base64 and
//! prepares it for PDF embedding. JPEG bytes pass through untouched (PDF
//! decodes them natively with DCTDecode); PNG is decoded to RGB with a
//! separate alpha plane that becomes the image's soft mask.

use std::io::Cursor;

use base64::Engine;

use crate::error::FolioError;

/// A decoded image ready for PDF embedding.
#[derive(Debug, Clone)]
pub struct LoadedImage {
    pub pixel_data: ImagePixelData,
    pub width_px: u32,
    pub height_px: u32,
}

#[derive(Debug, Clone)]
pub enum ImagePixelData {
    /// Raw JPEG bytes, embedded as-is.
    Jpeg {
        data: Vec<u8>,
        color_space: JpegColorSpace,
    },
    /// 8-bit RGB pixels plus an optional alpha plane (None if opaque).
    Decoded { rgb: Vec<u8>, alpha: Option<Vec<u8>> },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JpegColorSpace {
    DeviceRGB,
    DeviceGray,
}

impl JpegColorSpace {
    pub fn pdf_name(&self) -> &'static str {
        match self {
            Self::DeviceRGB => "DeviceRGB",
            Self::DeviceGray => "DeviceGray",
        }
    }
}

/// Load an image from a source string.
///
/// - `data:image/...;base64,...` data URIs
/// - paths starting with `/`, `./` or `../` (not on wasm32)
/// - anything else is treated as raw base64
pub fn load_image(src: &str) -> Result<LoadedImage, FolioError> {
    let bytes = read_source(src.trim())?;
    load_image_bytes(&bytes)
}

/// Decode image bytes, detecting the format from magic numbers.
pub fn load_image_bytes(data: &[u8]) -> Result<LoadedImage, FolioError> {
    match sniff(data) {
        Some(Format::Jpeg) => jpeg_passthrough(data),
        Some(Format::Png) => decode_png(data),
        None => Err(FolioError::Image(
            "unsupported image format (expected JPEG or PNG)".to_string(),
        )),
    }
}

fn read_source(src: &str) -> Result<Vec<u8>, FolioError> {
    if let Some(rest) = src.strip_prefix("data:image/") {
        let (_, payload) = rest
            .split_once(',')
            .ok_or_else(|| FolioError::Image("invalid data URI: missing comma".to_string()))?;
        return decode_base64(payload);
    }

    // Base64 alphabets contain '/', so only explicit path prefixes count.
    if src.starts_with('/') || src.starts_with("./") || src.starts_with("../") {
        #[cfg(not(target_arch = "wasm32"))]
        {
            return std::fs::read(src)
                .map_err(|e| FolioError::Image(format!("failed to read '{}': {}", src, e)));
        }
        #[cfg(target_arch = "wasm32")]
        {
            return Err(FolioError::Image(format!(
                "file paths are not available in WASM: '{}'",
                src
            )));
        }
    }

    decode_base64(src)
}

fn decode_base64(input: &str) -> Result<Vec<u8>, FolioError> {
    base64::engine::general_purpose::STANDARD
        .decode(input.trim())
        .map_err(|e| FolioError::Image(format!("base64 decode error: {}", e)))
}

enum Format {
    Jpeg,
    Png,
}

fn sniff(data: &[u8]) -> Option<Format> {
    if data.starts_with(&[0xFF, 0xD8]) {
        Some(Format::Jpeg)
    } else if data.starts_with(&[0x89, b'P', b'N', b'G']) {
        Some(Format::Png)
    } else {
        None
    }
}

fn jpeg_passthrough(data: &[u8]) -> Result<LoadedImage, FolioError> {
    let (width, height) = image::io::Reader::new(Cursor::new(data))
        .with_guessed_format()
        .map_err(|e| FolioError::Image(format!("JPEG format detection error: {}", e)))?
        .into_dimensions()
        .map_err(|e| FolioError::Image(format!("failed to read JPEG dimensions: {}", e)))?;

    Ok(LoadedImage {
        pixel_data: ImagePixelData::Jpeg {
            data: data.to_vec(),
            color_space: jpeg_color_space(data),
        },
        width_px: width,
        height_px: height,
    })
}

/// Walk the JPEG marker segments to the first SOF and read its component
/// count. Defaults to RGB when no frame header is found.
fn jpeg_color_space(data: &[u8]) -> JpegColorSpace {
    let mut i = 2;
    while i + 3 < data.len() && data[i] == 0xFF {
        let marker = data[i + 1];
        let is_sof = matches!(marker, 0xC0..=0xC3 | 0xC5..=0xC7 | 0xC9..=0xCB | 0xCD..=0xCF);
        if is_sof && i + 9 < data.len() {
            return if data[i + 9] == 1 {
                JpegColorSpace::DeviceGray
            } else {
                JpegColorSpace::DeviceRGB
            };
        }
        let seg_len = u16::from_be_bytes([data[i + 2], data[i + 3]]) as usize;
        i += 2 + seg_len;
    }
    JpegColorSpace::DeviceRGB
}

fn decode_png(data: &[u8]) -> Result<LoadedImage, FolioError> {
    let img = image::load_from_memory_with_format(data, image::ImageFormat::Png)
        .map_err(|e| FolioError::Image(format!("failed to decode PNG: {}", e)))?;
    let rgba = img.to_rgba8();
    let (width, height) = rgba.dimensions();

    let pixels = (width * height) as usize;
    let mut rgb = Vec::with_capacity(pixels * 3);
    let mut alpha = Vec::with_capacity(pixels);
    for px in rgba.pixels() {
        rgb.extend_from_slice(&px.0[..3]);
        alpha.push(px.0[3]);
    }
    let opaque = alpha.iter().all(|&a| a == 255);

    Ok(LoadedImage {
        pixel_data: ImagePixelData::Decoded {
            rgb,
            alpha: if opaque { None } else { Some(alpha) },
        },
        width_px: width,
        height_px: height,
    })
}
