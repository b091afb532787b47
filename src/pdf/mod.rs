//! # PDF Serializer
//!
//! Takes the pages collected by the [`PdfCanvas`](crate::canvas::PdfCanvas)
//! and writes a PDF 1.7 file.
//!
//! ```text
//! %PDF-1.7            <- header
//! 1 0 obj ... endobj  <- catalog, page tree, fonts, images, pages, streams
//! ...
//! xref                <- byte offset of every object
//! trailer             <- points to the catalog and the info dictionary
//! %%EOF
//! ```
//!
//! Only the standard Helvetica faces are used, so fonts are plain Type1
//! references with WinAnsiEncoding and nothing is embedded.

use std::collections::{BTreeSet, HashMap};
use std::fmt::Write as FmtWrite;
use std::io::Write as IoWrite;

use miniz_oxide::deflate::compress_to_vec_zlib;

use crate::canvas::{DrawCommand, LayoutElement, LayoutPage};
use crate::error::FolioError;
use crate::font::StandardFont;
use crate::image_loader::{ImagePixelData, LoadedImage};

/// Document information dictionary entries.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Metadata {
    pub title: Option<String>,
    pub author: Option<String>,
    pub subject: Option<String>,
}

pub struct PdfWriter {
    compress: bool,
}

/// Tracks allocated PDF objects during writing.
struct PdfBuilder {
    objects: Vec<Vec<u8>>,
    /// Fonts in resource order; `/F{i}` is the i-th entry.
    font_objects: Vec<(StandardFont, usize)>,
    /// XObject ids, indexed as /Im0, /Im1, ...
    image_objects: Vec<usize>,
    /// (page index, element index) -> image index.
    image_index_map: HashMap<(usize, usize), usize>,
}

impl Default for PdfWriter {
    fn default() -> Self {
        Self::new()
    }
}

impl PdfWriter {
    pub fn new() -> Self {
        Self { compress: true }
    }

    /// A writer that leaves content streams readable.
    pub fn uncompressed() -> Self {
        Self { compress: false }
    }

    /// Write laid-out pages to a PDF byte vector.
    pub fn write(&self, pages: &[LayoutPage], metadata: &Metadata) -> Result<Vec<u8>, FolioError> {
        if pages.is_empty() {
            return Err(FolioError::Render("document has no pages".to_string()));
        }

        // 0 = placeholder (PDF objects are 1-indexed), 1 = Catalog, 2 = Pages
        let mut builder = PdfBuilder {
            objects: vec![Vec::new(), Vec::new(), Vec::new()],
            font_objects: Vec::new(),
            image_objects: Vec::new(),
            image_index_map: HashMap::new(),
        };

        self.register_fonts(&mut builder, pages);
        self.register_images(&mut builder, pages);

        let font_resources = builder
            .font_objects
            .iter()
            .enumerate()
            .map(|(i, (_, id))| format!("/F{} {} 0 R", i, id))
            .collect::<Vec<_>>()
            .join(" ");

        let mut page_obj_ids = Vec::with_capacity(pages.len());
        for (page_idx, page) in pages.iter().enumerate() {
            let content = self.build_content_stream(page, page_idx, &builder)?;
            let content_obj_id = builder.objects.len();
            builder.objects.push(self.stream_object(content.as_bytes()));

            let xobjects = self.build_xobject_resource_dict(page_idx, &builder);
            let resources = if xobjects.is_empty() {
                format!("/Font << {} >>", font_resources)
            } else {
                format!("/Font << {} >> /XObject << {} >>", font_resources, xobjects)
            };
            let page_obj_id = builder.objects.len();
            builder.objects.push(
                format!(
                    "<< /Type /Page /Parent 2 0 R /MediaBox [0 0 {:.2} {:.2}] \
                     /Contents {} 0 R /Resources << {} >> >>",
                    page.width, page.height, content_obj_id, resources
                )
                .into_bytes(),
            );
            page_obj_ids.push(page_obj_id);
        }

        builder.objects[1] = b"<< /Type /Catalog /Pages 2 0 R >>".to_vec();
        let kids = page_obj_ids
            .iter()
            .map(|id| format!("{} 0 R", id))
            .collect::<Vec<_>>()
            .join(" ");
        builder.objects[2] =
            format!("<< /Type /Pages /Kids [{}] /Count {} >>", kids, page_obj_ids.len()).into_bytes();

        let info_obj_id = builder.objects.len();
        builder.objects.push(Self::info_dictionary(metadata).into_bytes());

        Ok(Self::serialize(&builder, info_obj_id))
    }

    fn info_dictionary(metadata: &Metadata) -> String {
        let mut info = String::from("<< ");
        let entries = [
            ("Title", &metadata.title),
            ("Author", &metadata.author),
            ("Subject", &metadata.subject),
        ];
        for (key, value) in entries {
            if let Some(value) = value {
                let _ = write!(info, "/{} ({}) ", key, encode_text(value));
            }
        }
        info.push_str("/Producer (Folio) /Creator (Folio) >>");
        info
    }

    fn stream_object(&self, content: &[u8]) -> Vec<u8> {
        let mut data = Vec::new();
        if self.compress {
            let compressed = compress_to_vec_zlib(content, 6);
            let _ = write!(data, "<< /Length {} /Filter /FlateDecode >>\nstream\n", compressed.len());
            data.extend_from_slice(&compressed);
        } else {
            let _ = write!(data, "<< /Length {} >>\nstream\n", content.len());
            data.extend_from_slice(content);
        }
        data.extend_from_slice(b"\nendstream");
        data
    }

    fn register_fonts(&self, builder: &mut PdfBuilder, pages: &[LayoutPage]) {
        let mut used: BTreeSet<StandardFont> = pages
            .iter()
            .flat_map(|p| p.elements.iter())
            .filter_map(|e| match &e.draw {
                DrawCommand::Text { font, .. } => Some(*font),
                _ => None,
            })
            .collect();
        // Always have at least Helvetica
        if used.is_empty() {
            used.insert(StandardFont::Helvetica);
        }

        for font in used {
            let id = builder.objects.len();
            builder.objects.push(
                format!(
                    "<< /Type /Font /Subtype /Type1 /BaseFont /{} /Encoding /WinAnsiEncoding >>",
                    font.pdf_name()
                )
                .into_bytes(),
            );
            builder.font_objects.push((font, id));
        }
    }

    fn register_images(&self, builder: &mut PdfBuilder, pages: &[LayoutPage]) {
        for (page_idx, page) in pages.iter().enumerate() {
            for (elem_idx, element) in page.elements.iter().enumerate() {
                if let DrawCommand::Image { image_data } = &element.draw {
                    let img_idx = builder.image_objects.len();
                    let xobj_id = self.write_image_xobject(builder, image_data);
                    builder.image_objects.push(xobj_id);
                    builder.image_index_map.insert((page_idx, elem_idx), img_idx);
                }
            }
        }
    }

    /// Write an image as one XObject, plus an SMask when it carries alpha.
    /// Returns the main XObject id.
    fn write_image_xobject(&self, builder: &mut PdfBuilder, image: &LoadedImage) -> usize {
        let header = |color_space: &str, filter: &str, length: usize, extra: &str| {
            format!(
                "<< /Type /XObject /Subtype /Image /Width {} /Height {} \
                 /ColorSpace /{} /BitsPerComponent 8 /Filter /{} /Length {}{} >>\nstream\n",
                image.width_px, image.height_px, color_space, filter, length, extra
            )
        };
        let push = |builder: &mut PdfBuilder, head: String, body: &[u8]| {
            let id = builder.objects.len();
            let mut data = head.into_bytes();
            data.extend_from_slice(body);
            data.extend_from_slice(b"\nendstream");
            builder.objects.push(data);
            id
        };

        match &image.pixel_data {
            ImagePixelData::Jpeg { data, color_space } => {
                let head = header(color_space.pdf_name(), "DCTDecode", data.len(), "");
                push(builder, head, data)
            }
            ImagePixelData::Decoded { rgb, alpha } => {
                let smask_id = alpha.as_ref().map(|alpha| {
                    let compressed = compress_to_vec_zlib(alpha, 6);
                    let head = header("DeviceGray", "FlateDecode", compressed.len(), "");
                    push(builder, head, &compressed)
                });
                let smask_ref = smask_id
                    .map(|id| format!(" /SMask {} 0 R", id))
                    .unwrap_or_default();
                let compressed = compress_to_vec_zlib(rgb, 6);
                let head = header("DeviceRGB", "FlateDecode", compressed.len(), &smask_ref);
                push(builder, head, &compressed)
            }
        }
    }

    fn build_xobject_resource_dict(&self, page_idx: usize, builder: &PdfBuilder) -> String {
        let mut entries: Vec<(usize, usize)> = builder
            .image_index_map
            .iter()
            .filter(|((pidx, _), _)| *pidx == page_idx)
            .map(|(_, &img_idx)| (img_idx, builder.image_objects[img_idx]))
            .collect();
        entries.sort_unstable();
        entries
            .iter()
            .map(|(idx, obj_id)| format!("/Im{} {} 0 R", idx, obj_id))
            .collect::<Vec<_>>()
            .join(" ")
    }

    fn font_index(font: StandardFont, builder: &PdfBuilder) -> usize {
        builder
            .font_objects
            .iter()
            .position(|(f, _)| *f == font)
            .unwrap_or(0)
    }

    fn build_content_stream(
        &self,
        page: &LayoutPage,
        page_idx: usize,
        builder: &PdfBuilder,
    ) -> Result<String, FolioError> {
        let mut stream = String::new();
        for (elem_idx, element) in page.elements.iter().enumerate() {
            self.write_element(&mut stream, element, page.height, (page_idx, elem_idx), builder)?;
        }
        Ok(stream)
    }

    /// Write a single element as PDF operators.
    fn write_element(
        &self,
        stream: &mut String,
        element: &LayoutElement,
        page_height: f64,
        position: (usize, usize),
        builder: &PdfBuilder,
    ) -> Result<(), FolioError> {
        let x = element.x;
        match &element.draw {
            DrawCommand::Rect { background, border } => {
                let y = page_height - element.y - element.height;
                let (w, h) = (element.width, element.height);
                if let Some(bg) = background {
                    let _ = write!(
                        stream,
                        "q\n{:.3} {:.3} {:.3} rg\n{:.2} {:.2} {:.2} {:.2} re\nf\nQ\n",
                        bg.r, bg.g, bg.b, x, y, w, h
                    );
                }
                if let Some((bc, width)) = border {
                    if *width > 0.0 {
                        let _ = write!(
                            stream,
                            "q\n{:.3} {:.3} {:.3} RG\n{:.2} w\n{:.2} {:.2} {:.2} {:.2} re\nS\nQ\n",
                            bc.r, bc.g, bc.b, width, x, y, w, h
                        );
                    }
                }
            }

            DrawCommand::Text {
                text,
                font,
                font_size,
                color,
            } => {
                let pdf_y = page_height - element.y;
                let _ = write!(
                    stream,
                    "BT\n/F{} {:.1} Tf\n{:.3} {:.3} {:.3} rg\n{:.2} {:.2} Td\n({}) Tj\nET\n",
                    Self::font_index(*font, builder),
                    font_size,
                    color.r,
                    color.g,
                    color.b,
                    x,
                    pdf_y,
                    encode_text(text)
                );
            }

            DrawCommand::Image { .. } => {
                let img_idx = builder.image_index_map.get(&position).ok_or_else(|| {
                    FolioError::Render(format!("image at {:?} was never registered", position))
                })?;
                let y = page_height - element.y - element.height;
                let _ = write!(
                    stream,
                    "q\n{:.4} 0 0 {:.4} {:.2} {:.2} cm\n/Im{} Do\nQ\n",
                    element.width, element.height, x, y, img_idx
                );
            }
        }
        Ok(())
    }

    /// Serialize all objects into the final PDF byte stream.
    fn serialize(builder: &PdfBuilder, info_obj_id: usize) -> Vec<u8> {
        let mut output: Vec<u8> = Vec::new();
        let mut offsets = vec![0usize; builder.objects.len()];

        output.extend_from_slice(b"%PDF-1.7\n");
        output.extend_from_slice(b"%\xe2\xe3\xcf\xd3\n");

        for (i, data) in builder.objects.iter().enumerate().skip(1) {
            offsets[i] = output.len();
            let _ = write!(output, "{} 0 obj\n", i);
            output.extend_from_slice(data);
            output.extend_from_slice(b"\nendobj\n\n");
        }

        let xref_offset = output.len();
        let _ = write!(output, "xref\n0 {}\n", builder.objects.len());
        let _ = write!(output, "0000000000 65535 f \n");
        for offset in offsets.iter().skip(1) {
            let _ = write!(output, "{:010} 00000 n \n", offset);
        }
        let _ = write!(
            output,
            "trailer\n<< /Size {} /Root 1 0 R /Info {} 0 R >>\nstartxref\n{}\n%%EOF\n",
            builder.objects.len(),
            info_obj_id,
            xref_offset
        );
        output
    }
}

/// Encode text for a WinAnsi literal string, escaping delimiters and using
/// octal escapes outside printable ASCII. Unmappable characters become `?`.
fn encode_text(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for ch in s.chars() {
        let b = unicode_to_winansi(ch).unwrap_or(b'?');
        match b {
            b'\\' => out.push_str("\\\\"),
            b'(' => out.push_str("\\("),
            b')' => out.push_str("\\)"),
            0x20..=0x7E => out.push(b as char),
            _ => {
                let _ = write!(out, "\\{:03o}", b);
            }
        }
    }
    out
}

/// Map a Unicode codepoint to a WinAnsiEncoding byte value.
///
/// WinAnsiEncoding is Windows-1252: 0x20..=0x7E and 0xA0..=0xFF map
/// directly, 0x80..=0x9F holds smart quotes, dashes, the euro sign and a
/// few more.
fn unicode_to_winansi(ch: char) -> Option<u8> {
    let cp = ch as u32;
    if (0x20..=0x7E).contains(&cp) || (0xA0..=0xFF).contains(&cp) {
        return Some(cp as u8);
    }
    match cp {
        0x20AC => Some(0x80), // euro
        0x201A => Some(0x82),
        0x0192 => Some(0x83),
        0x201E => Some(0x84),
        0x2026 => Some(0x85), // ellipsis
        0x2020 => Some(0x86),
        0x2021 => Some(0x87),
        0x02C6 => Some(0x88),
        0x2030 => Some(0x89),
        0x0160 => Some(0x8A),
        0x2039 => Some(0x8B),
        0x0152 => Some(0x8C),
        0x017D => Some(0x8E),
        0x2018 => Some(0x91),
        0x2019 => Some(0x92),
        0x201C => Some(0x93),
        0x201D => Some(0x94),
        0x2022 => Some(0x95), // bullet
        0x2013 => Some(0x96),
        0x2014 => Some(0x97),
        0x02DC => Some(0x98),
        0x2122 => Some(0x99),
        0x0161 => Some(0x9A),
        0x203A => Some(0x9B),
        0x0153 => Some(0x9C),
        0x017E => Some(0x9E),
        0x0178 => Some(0x9F),
        // Tabs render as a single space
        0x09 => Some(b' '),
        _ => None,
    }
}
