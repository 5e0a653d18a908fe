//! Pure calculation functions for thumbnail geometry.
//!
//! All functions here are pure and testable without any I/O or images.

/// Compute the power-of-two downsample factor for a decode.
///
/// Starting from 1, the factor doubles while both halved source dimensions
/// divided by it remain ≥ the corresponding requested dimension. Decoding at
/// the returned factor therefore never yields a result smaller than the
/// request — only full-resolution decode cost is avoided, correctness is not
/// traded.
///
/// # Examples
/// ```
/// # use photoroll::imaging::downsample_factor;
/// // 1600x1200 source for a 200x160 request: 400x300 is still big enough
/// assert_eq!(downsample_factor((1600, 1200), (200, 160)), 4);
///
/// // Source already smaller than the request: no downsampling
/// assert_eq!(downsample_factor((100, 80), (200, 160)), 1);
/// ```
pub fn downsample_factor(source: (u32, u32), requested: (u32, u32)) -> u32 {
    let (src_w, src_h) = source;
    let (req_w, req_h) = requested;

    let mut factor = 1u32;
    if req_w == 0 || req_h == 0 {
        return factor;
    }

    if src_w > req_w || src_h > req_h {
        let half_w = src_w / 2;
        let half_h = src_h / 2;
        while half_h / factor >= req_h && half_w / factor >= req_w {
            factor *= 2;
        }
    }
    factor
}

/// Calculate dimensions that fill a requested area before the center crop.
///
/// The anchor axis is chosen by comparing the source aspect ratio (w/h)
/// against `wide_threshold`: a wide source (aspect above the threshold)
/// scales so its height matches the requested height and its width
/// overflows; anything else scales so its width matches the requested width
/// and its height overflows. The non-anchored dimension never falls below
/// the request, so the subsequent crop always has enough material.
///
/// # Examples
/// ```
/// # use photoroll::imaging::scale_to_fill;
/// // Wide 4:3 source anchors to height; width overflows for the crop
/// assert_eq!(scale_to_fill((800, 600), (200, 160), 1.25), (213, 160));
///
/// // Square source anchors to width; height overflows
/// assert_eq!(scale_to_fill((500, 500), (200, 160), 1.25), (200, 200));
/// ```
pub fn scale_to_fill(source: (u32, u32), requested: (u32, u32), wide_threshold: f64) -> (u32, u32) {
    let (src_w, src_h) = source;
    let (req_w, req_h) = requested;
    let aspect = src_w.max(1) as f64 / src_h.max(1) as f64;

    if aspect > wide_threshold {
        // Wide image: height matches, width overflows
        let h = req_h;
        let w = (h as f64 * aspect).round() as u32;
        (w.max(req_w), h)
    } else {
        // Tall or near-square image: width matches, height overflows
        let w = req_w;
        let h = (w as f64 / aspect).round() as u32;
        (w, h.max(req_h))
    }
}

/// Centered origin for cropping a filled image down to the request.
///
/// Assumes `scaled` is at least as large as `requested` in both dimensions
/// (which [`scale_to_fill`] guarantees); saturates to 0 otherwise.
pub fn crop_origin(scaled: (u32, u32), requested: (u32, u32)) -> (u32, u32) {
    let (scaled_w, scaled_h) = scaled;
    let (req_w, req_h) = requested;
    (
        scaled_w.saturating_sub(req_w) / 2,
        scaled_h.saturating_sub(req_h) / 2,
    )
}
