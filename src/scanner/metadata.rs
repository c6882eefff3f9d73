//! Metadata extraction for the info panel.
//!
//! Reads only headers where possible: image dimensions through the `image`
//! crate, container headers for video, and EXIF through kamadak-exif. A file
//! that cannot be stat'ed yields no metadata at all; every other field is
//! best-effort and simply left out when unavailable.

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, Local};
use image::ImageReader;
use tracing::{debug, trace, warn};

use crate::engine::MediaMetadata;
use crate::models::{extension_of, MediaKind};

/// EXIF-style timestamp, also used for the mtime fallback.
const DATE_FORMAT: &str = "%Y:%m:%d %H:%M:%S";

/// Bytes of a video container inspected for its dimensions.
const VIDEO_HEAD_BYTES: usize = 128 * 1024;

/// Fields read from the EXIF block.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
struct ExifFields {
    width: Option<u32>,
    height: Option<u32>,
    date: Option<String>,
    camera: Option<String>,
    iso: Option<String>,
    aperture: Option<String>,
    shutter: Option<String>,
}

pub struct MetadataExtractor;

impl MetadataExtractor {
    /// Builds the info panel record for `path`. Blocking.
    pub fn extract(path: &Path) -> Option<MediaMetadata> {
        let stat = match std::fs::metadata(path) {
            Ok(m) if m.is_file() => m,
            Ok(_) => {
                warn!("Not a regular file: {:?}", path);
                return None;
            }
            Err(e) => {
                warn!("Failed to stat {:?}: {}", path, e);
                return None;
            }
        };

        let filename = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let ext = extension_of(&filename);
        let kind = MediaKind::from_extension(ext);

        let exif = if kind.is_video() {
            ExifFields::default()
        } else {
            Self::read_exif(path).unwrap_or_else(|e| {
                trace!("No EXIF for {:?}: {:#}", path, e);
                ExifFields::default()
            })
        };

        let dimensions = match kind {
            MediaKind::Image => Self::image_dimensions(path),
            MediaKind::Video => Self::video_dimensions(path),
        }
        .or_else(|| exif.width.zip(exif.height));

        let date = exif.date.clone().or_else(|| {
            stat.modified()
                .ok()
                .map(|t| DateTime::<Local>::from(t).format(DATE_FORMAT).to_string())
        });

        let format = (!ext.is_empty()).then(|| ext.to_ascii_uppercase());

        Some(MediaMetadata {
            filename,
            resolution: dimensions.map(|(w, h)| format!("{w}x{h}")),
            size: Some(format_file_size(stat.len())),
            format,
            date,
            camera: exif.camera,
            iso: exif.iso,
            aperture: exif.aperture,
            shutter: exif.shutter,
        })
    }

    fn image_dimensions(path: &Path) -> Option<(u32, u32)> {
        let reader = ImageReader::open(path)
            .and_then(|r| r.with_guessed_format())
            .map_err(|e| debug!("Failed to open image {:?}: {}", path, e))
            .ok()?;
        match reader.into_dimensions() {
            Ok(dims) => Some(dims),
            Err(e) => {
                debug!("Failed to read image dimensions for {:?}: {}", path, e);
                None
            }
        }
    }

    fn read_exif(path: &Path) -> Result<ExifFields> {
        let file = File::open(path).with_context(|| format!("Failed to open {}", path.display()))?;
        let mut reader = BufReader::new(file);
        let exif = exif::Reader::new()
            .read_from_container(&mut reader)
            .context("No EXIF block")?;

        let text = |tag: exif::Tag| {
            exif.get_field(tag, exif::In::PRIMARY).map(|f| {
                f.display_value()
                    .to_string()
                    .trim_matches('"')
                    .trim()
                    .to_string()
            })
        };
        let number = |tag: exif::Tag| {
            exif.get_field(tag, exif::In::PRIMARY)
                .and_then(|f| f.value.get_uint(0))
        };

        let make = text(exif::Tag::Make).filter(|s| !s.is_empty());
        let model = text(exif::Tag::Model).filter(|s| !s.is_empty());
        let camera = match (make, model) {
            (Some(make), Some(model)) if model.starts_with(&make) => Some(model),
            (Some(make), Some(model)) => Some(format!("{make} {model}")),
            (make, model) => make.or(model),
        };

        Ok(ExifFields {
            width: number(exif::Tag::PixelXDimension).or_else(|| number(exif::Tag::ImageWidth)),
            height: number(exif::Tag::PixelYDimension).or_else(|| number(exif::Tag::ImageLength)),
            date: text(exif::Tag::DateTimeOriginal).or_else(|| text(exif::Tag::DateTime)),
            camera,
            iso: text(exif::Tag::PhotographicSensitivity),
            aperture: text(exif::Tag::FNumber).map(|f| format!("f/{f}")),
            shutter: text(exif::Tag::ExposureTime),
        })
    }

    /// Container-level dimensions for the supported video formats.
    fn video_dimensions(path: &Path) -> Option<(u32, u32)> {
        let head = match read_head(path, VIDEO_HEAD_BYTES) {
            Ok(head) => head,
            Err(e) => {
                debug!("Failed to read video header {:?}: {:#}", path, e);
                return None;
            }
        };

        let ext = extension_of(&path.to_string_lossy()).to_ascii_lowercase();
        let dims = match ext.as_str() {
            "mp4" | "mov" => parse_mp4_dimensions(&head),
            "avi" => parse_avi_dimensions(&head),
            "mkv" | "webm" => parse_matroska_dimensions(&head),
            _ => None,
        };
        dims.filter(|&(w, h)| w > 0 && h > 0 && w < 65536 && h < 65536)
    }
}

/// Human-readable size, binary units.
pub fn format_file_size(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if bytes >= GB {
        format!("{:.2} GB", bytes as f64 / GB as f64)
    } else if bytes >= MB {
        format!("{:.2} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.1} KB", bytes as f64 / KB as f64)
    } else {
        format!("{bytes} B")
    }
}

fn read_head(path: &Path, limit: usize) -> Result<Vec<u8>> {
    let file = File::open(path).context("Failed to open video file")?;
    let mut head = Vec::with_capacity(limit);
    file.take(limit as u64).read_to_end(&mut head)?;
    Ok(head)
}

fn be_u32(bytes: &[u8], at: usize) -> Option<u32> {
    let b = bytes.get(at..at + 4)?;
    Some(u32::from_be_bytes([b[0], b[1], b[2], b[3]]))
}

/// MP4/MOV: the `tkhd` box stores width and height as 16.16 fixed point,
/// falling back to the sample entry (`avc1`, `hvc1`, ...) u16 fields.
fn parse_mp4_dimensions(buf: &[u8]) -> Option<(u32, u32)> {
    for i in 0..buf.len().saturating_sub(4) {
        if &buf[i..i + 4] != b"tkhd" {
            continue;
        }
        let offset = if buf.get(i + 4) == Some(&0) { i + 76 } else { i + 88 };
        if let (Some(w), Some(h)) = (be_u32(buf, offset), be_u32(buf, offset + 4)) {
            let (w, h) = (w >> 16, h >> 16);
            if w > 0 && h > 0 {
                return Some((w, h));
            }
        }
    }

    for i in 0..buf.len().saturating_sub(28) {
        let tag = &buf[i..i + 4];
        if matches!(tag, b"avc1" | b"hvc1" | b"mp4v" | b"vp09") {
            let w = u16::from_be_bytes([buf[i + 24], buf[i + 25]]) as u32;
            let h = u16::from_be_bytes([buf[i + 26], buf[i + 27]]) as u32;
            if w > 0 && h > 0 {
                return Some((w, h));
            }
        }
    }
    None
}

/// AVI: BITMAPINFOHEADER inside the `strf` chunk, little endian, height may be negative.
fn parse_avi_dimensions(buf: &[u8]) -> Option<(u32, u32)> {
    for i in 0..buf.len().saturating_sub(20) {
        if &buf[i..i + 4] != b"strf" {
            continue;
        }
        let header = i + 8;
        let w = i32::from_le_bytes(buf.get(header + 4..header + 8)?.try_into().ok()?);
        let h = i32::from_le_bytes(buf.get(header + 8..header + 12)?.try_into().ok()?);
        if w != 0 && h != 0 {
            return Some((w.unsigned_abs(), h.unsigned_abs()));
        }
    }
    None
}

/// Matroska/WebM: PixelWidth (0xB0) and PixelHeight (0xBA) elements of the video track.
fn parse_matroska_dimensions(buf: &[u8]) -> Option<(u32, u32)> {
    let mut width = None;
    let mut height = None;
    for i in 0..buf.len().saturating_sub(2) {
        match buf[i] {
            0xB0 if width.is_none() => width = read_ebml_uint(&buf[i + 1..]),
            0xBA if height.is_none() => height = read_ebml_uint(&buf[i + 1..]),
            _ => {}
        }
        if let (Some(w), Some(h)) = (width, height) {
            return Some((w, h));
        }
    }
    None
}

/// Reads a size-prefixed EBML unsigned integer of at most 4 bytes.
fn read_ebml_uint(data: &[u8]) -> Option<u32> {
    let first = *data.first()?;
    if first & 0x80 == 0 {
        // Only single-byte sizes are expected for dimension elements.
        return None;
    }
    let len = (first & 0x7F) as usize;
    if len == 0 || len > 4 {
        return None;
    }
    let bytes = data.get(1..1 + len)?;
    let value = bytes.iter().fold(0u32, |acc, &b| (acc << 8) | b as u32);
    (value > 0 && value < 65536).then_some(value)
}
