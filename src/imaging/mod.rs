//! Image decoding and thumbnail geometry.
//!
//! | Module         | Responsibility                                         |
//! |----------------|--------------------------------------------------------|
//! | `calculations` | Pure geometry: downsample factor, fill scale, crop     |
//! | `decoder`      | The decode pipeline: probe, decode, rotate, fill, crop |
//! | `exif`         | EXIF orientation tag reader for JPEG/TIFF              |
//!
//! The split keeps the arithmetic testable without images and the pipeline
//! free of geometry edge cases.

pub mod calculations;
pub mod decoder;
pub mod exif;

pub use calculations::{crop_origin, downsample_factor, scale_to_fill};
pub use decoder::{decode_thumbnail, probe_dimensions, CancelToken, DecodeError, ThumbnailRequest};
pub use exif::read_orientation;
