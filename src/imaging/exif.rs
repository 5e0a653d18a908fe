//! Minimal EXIF orientation reader for JPEG and TIFF files.
//!
//! Extracts a single field: the orientation tag (0x0112) from TIFF IFD0.
//!
//! For JPEG: reads from the APP1 marker (`Exif\0\0` header, then an embedded
//! TIFF structure). For TIFF: reads the IFD chain directly. Both byte orders
//! are handled.
//!
//! EXIF encodes eight orientations; the gallery's data model only admits the
//! four pure rotations, so mirrored values (2, 4, 5, 7) and anything
//! unparseable degrade to 0 degrees. This function never errors — a photo
//! with unreadable metadata still renders, just possibly sideways.
//!
//! Zero external dependencies — pure Rust, byte-level parsing.

use crate::photo::Orientation;
use std::io::Read;
use std::path::Path;

/// Orientation tag in TIFF IFD0.
const ORIENTATION_TAG: u16 = 0x0112;

/// How much of the file to read when probing for EXIF. The APP1 segment
/// sits at the front of a JPEG and IFD0 at the front of a TIFF, so a capped
/// prefix avoids pulling a 40 MB source into memory for two bytes of data.
const PROBE_BYTES: usize = 512 * 1024;

/// Read the display orientation from a file, dispatching by extension.
/// Returns `Orientation::Deg0` on any parse failure.
pub fn read_orientation(path: &Path) -> Orientation {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase();

    let bytes = match read_prefix(path, PROBE_BYTES) {
        Ok(b) => b,
        Err(_) => return Orientation::Deg0,
    };

    match ext.as_str() {
        "jpg" | "jpeg" => orientation_from_jpeg(&bytes),
        "tif" | "tiff" => orientation_from_tiff(&bytes),
        _ => Orientation::Deg0,
    }
}

/// Read up to `max_bytes` from the start of a file.
fn read_prefix(path: &Path, max_bytes: usize) -> std::io::Result<Vec<u8>> {
    let file = std::fs::File::open(path)?;
    let mut data = Vec::new();
    file.take(max_bytes as u64).read_to_end(&mut data)?;
    Ok(data)
}

/// Map an EXIF orientation value (1-8) to a pure rotation.
///
/// 1 = upright, 3 = rotated 180, 6 = rotate 90 CW to display,
/// 8 = rotate 270 CW to display. Mirrored variants fall back to upright.
fn rotation_from_exif_value(value: u16) -> Orientation {
    match value {
        3 => Orientation::Deg180,
        6 => Orientation::Deg90,
        8 => Orientation::Deg270,
        _ => Orientation::Deg0,
    }
}

// ---------------------------------------------------------------------------
// JPEG: locate the APP1/Exif segment
// ---------------------------------------------------------------------------

const EXIF_HEADER: &[u8] = b"Exif\0\0";

/// Find the embedded TIFF structure in a JPEG's APP1 segment and read the
/// orientation from it.
fn orientation_from_jpeg(data: &[u8]) -> Orientation {
    let mut pos = 0;
    while pos + 4 < data.len() {
        if data[pos] == 0xFF && data[pos + 1] == 0xE1 {
            let seg_len = u16::from_be_bytes([data[pos + 2], data[pos + 3]]) as usize;
            // The length field counts itself; anything below 2 is a
            // malformed segment with no payload.
            if seg_len >= 2 {
                let seg_start = pos + 4;
                let seg_end = (seg_start + (seg_len - 2)).min(data.len());
                let segment = &data[seg_start..seg_end];

                if let Some(tiff) = segment.strip_prefix(EXIF_HEADER) {
                    return orientation_from_tiff(tiff);
                }
            }
        }

        // Advance: if 0xFF, skip marker + length; otherwise byte-by-byte
        if data[pos] == 0xFF && pos + 3 < data.len() && data[pos + 1] != 0x00 {
            let marker = data[pos + 1];
            // SOS (0xDA) means image data starts — stop scanning
            if marker == 0xDA {
                break;
            }
            // Markers without length field
            if marker == 0xD8 || marker == 0xD9 || (0xD0..=0xD7).contains(&marker) {
                pos += 2;
            } else {
                let len = u16::from_be_bytes([data[pos + 2], data[pos + 3]]) as usize;
                pos += 2 + len;
            }
        } else {
            pos += 1;
        }
    }
    Orientation::Deg0
}

// ---------------------------------------------------------------------------
// TIFF: walk the IFD chain for tag 0x0112
// ---------------------------------------------------------------------------

/// Read the orientation tag from a TIFF structure (bare file or the body of
/// a JPEG APP1 segment).
fn orientation_from_tiff(data: &[u8]) -> Orientation {
    if data.len() < 8 {
        return Orientation::Deg0;
    }

    // Determine byte order
    let big_endian = match &data[0..2] {
        b"MM" => true,
        b"II" => false,
        _ => return Orientation::Deg0,
    };

    let read_u16 = |offset: usize| -> u16 {
        if big_endian {
            u16::from_be_bytes([data[offset], data[offset + 1]])
        } else {
            u16::from_le_bytes([data[offset], data[offset + 1]])
        }
    };

    let read_u32 = |offset: usize| -> u32 {
        if big_endian {
            u32::from_be_bytes([
                data[offset],
                data[offset + 1],
                data[offset + 2],
                data[offset + 3],
            ])
        } else {
            u32::from_le_bytes([
                data[offset],
                data[offset + 1],
                data[offset + 2],
                data[offset + 3],
            ])
        }
    };

    // Verify TIFF magic (42)
    if read_u16(2) != 42 {
        return Orientation::Deg0;
    }

    let mut ifd_offset = read_u32(4) as usize;

    // Walk IFD chain (main IFD + linked IFDs)
    while ifd_offset > 0 && ifd_offset + 2 < data.len() {
        let entry_count = read_u16(ifd_offset) as usize;
        let entries_start = ifd_offset + 2;

        for i in 0..entry_count {
            let entry_offset = entries_start + i * 12;
            if entry_offset + 12 > data.len() {
                return Orientation::Deg0;
            }

            let tag = read_u16(entry_offset);
            let typ = read_u16(entry_offset + 2);
            let count = read_u32(entry_offset + 4);

            // Orientation is a single SHORT, stored inline in the value field
            if tag == ORIENTATION_TAG && typ == 3 && count == 1 {
                return rotation_from_exif_value(read_u16(entry_offset + 8));
            }
        }

        // Next IFD offset
        let next_offset_pos = entries_start + entry_count * 12;
        if next_offset_pos + 4 <= data.len() {
            ifd_offset = read_u32(next_offset_pos) as usize;
        } else {
            break;
        }
    }

    Orientation::Deg0
}
