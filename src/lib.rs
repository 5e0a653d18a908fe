//! # Photoroll
//!
//! A photo gallery engine: one scrollable grid of thumbnails over a media
//! index, with pinch-to-resize columns and tap-through to a full-screen
//! viewer. This crate is the engine only — index loading, thumbnail
//! decoding, caching, view-state, and gesture mapping — with a small CLI for
//! driving it against a directory of images.
//!
//! # Architecture: Index → Decode → Cache → State
//!
//! ```text
//! MediaSource ──query──▶ Photo list ──▶ StateStore (snapshots out)
//!      │
//!      └──bytes──▶ decode pipeline ──▶ ThumbCache ──▶ grid cells
//! ```
//!
//! Three properties shape the design:
//!
//! - **Snapshots, not mutation**: observers receive immutable
//!   [`state::GallerySnapshot`]s; there is no observable intermediate state.
//! - **Failure is local**: an undecodable photo costs one placeholder cell,
//!   an unreadable index costs an empty gallery. Nothing panics the engine.
//! - **Decodes are disposable**: every decode carries a cancel token, so
//!   work for cells that scrolled away is abandoned, not awaited.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`index`] | `MediaSource` trait, row validation, the filesystem source |
//! | [`imaging`] | Decode pipeline, thumbnail geometry, EXIF orientation |
//! | [`cache`] | Byte-budget LRU cache of decoded thumbnails |
//! | [`state`] | Snapshot store and subscriptions |
//! | [`gesture`] | Pinch scale → column count mapping |
//! | [`gallery`] | The controller tying the above together |
//! | [`config`] | `photoroll.toml` loading and validation |
//! | [`photo`] | Shared types: `Photo`, `Orientation`, `ViewerRequest` |

pub mod cache;
pub mod config;
pub mod gallery;
pub mod gesture;
pub mod imaging;
pub mod index;
pub mod photo;
pub mod state;
