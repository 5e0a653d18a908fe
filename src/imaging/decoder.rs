//! Thumbnail decode pipeline.
//!
//! Turns a seekable byte stream into a fixed-size RGBA thumbnail:
//!
//! 1. Probe intrinsic bounds without decoding pixels.
//! 2. Decode at a power-of-two downsample factor so the working image is
//!    small but never smaller than the request.
//! 3. Apply the display rotation from metadata.
//! 4. Scale to fill the requested cell, then center-crop to exact size.
//!
//! The pipeline is fallible and cancellable. Failures return `None` — the
//! grid shows a placeholder for that cell and the rest of the gallery is
//! unaffected. A cancelled decode also returns `None`; cancellation is
//! cooperative and checked between the expensive stages.

use crate::photo::Orientation;
use image::imageops::FilterType;
use image::{ImageReader, RgbaImage};
use log::warn;
use std::io::{BufRead, Seek, SeekFrom};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use thiserror::Error;

use super::calculations::{crop_origin, downsample_factor, scale_to_fill};

#[derive(Error, Debug)]
pub enum DecodeError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("image decode error: {0}")]
    Decode(#[from] image::ImageError),
}

/// Cooperative cancellation flag shared between a requester and a decode
/// worker. Cloning shares the flag.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    cancelled: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation. The decode stops at its next checkpoint.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Relaxed)
    }
}

/// Everything a decode needs besides the bytes themselves.
#[derive(Debug, Clone)]
pub struct ThumbnailRequest {
    /// Output width in pixels.
    pub width: u32,
    /// Output height in pixels.
    pub height: u32,
    /// Display rotation to apply before scaling.
    pub orientation: Orientation,
    /// Aspect ratio above which the fill scale anchors to height.
    pub wide_threshold: f64,
}

/// Decode a thumbnail of exactly `request.width` x `request.height` pixels.
///
/// Returns `None` when the source is unreadable, undecodable, or the token
/// was cancelled. Errors are logged here so callers can treat `None`
/// uniformly as "show a placeholder".
pub fn decode_thumbnail<R: BufRead + Seek>(
    reader: R,
    request: &ThumbnailRequest,
    cancel: &CancelToken,
) -> Option<RgbaImage> {
    match run_pipeline(reader, request, cancel) {
        Ok(thumbnail) => thumbnail,
        Err(err) => {
            warn!("thumbnail decode failed: {}", err);
            None
        }
    }
}

/// The pipeline proper. `Ok(None)` means cancelled, `Err` means the source
/// was bad.
fn run_pipeline<R: BufRead + Seek>(
    mut reader: R,
    request: &ThumbnailRequest,
    cancel: &CancelToken,
) -> Result<Option<RgbaImage>, DecodeError> {
    // Bounds probe: cheap header read, no pixel decode
    let (src_w, src_h) = ImageReader::new(&mut reader)
        .with_guessed_format()?
        .into_dimensions()?;
    reader.seek(SeekFrom::Start(0))?;

    if cancel.is_cancelled() {
        return Ok(None);
    }

    // Full decode is the expensive stage
    let decoded = ImageReader::new(&mut reader)
        .with_guessed_format()?
        .decode()?;

    if cancel.is_cancelled() {
        return Ok(None);
    }

    // Downsample toward the request before the precise resize. The factor
    // keeps the working image at or above the requested size.
    let factor = downsample_factor((src_w, src_h), (request.width, request.height));
    let working = if factor > 1 {
        decoded.thumbnail(src_w / factor, src_h / factor)
    } else {
        decoded
    };

    // Rotation comes before the fill calculation so the aspect ratio the
    // calculation sees is the display aspect, not the stored one.
    let rotated = match request.orientation {
        Orientation::Deg0 => working,
        Orientation::Deg90 => working.rotate90(),
        Orientation::Deg180 => working.rotate180(),
        Orientation::Deg270 => working.rotate270(),
    };

    if cancel.is_cancelled() {
        return Ok(None);
    }

    let requested = (request.width, request.height);
    let fill = scale_to_fill(
        (rotated.width(), rotated.height()),
        requested,
        request.wide_threshold,
    );
    let scaled = rotated.resize_exact(fill.0, fill.1, FilterType::Lanczos3);

    let (x, y) = crop_origin(fill, requested);
    let cropped = scaled.crop_imm(x, y, request.width, request.height);

    Ok(Some(cropped.to_rgba8()))
}

/// Probe a stream's intrinsic dimensions without decoding pixels.
pub fn probe_dimensions<R: BufRead + Seek>(reader: R) -> Result<(u32, u32), DecodeError> {
    Ok(ImageReader::new(reader)
        .with_guessed_format()?
        .into_dimensions()?)
}
