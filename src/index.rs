//! Photo index loading.
//!
//! The gallery never walks storage directly; it talks to a [`MediaSource`],
//! which answers two questions: "what photos exist, newest first?" and "give
//! me the bytes for this one". The trait keeps the gallery testable with an
//! in-memory source and keeps storage details (filesystem layout, media
//! databases) out of the view logic.
//!
//! [`load_photos`] converts raw index rows into validated [`Photo`]s. The
//! conversion is lenient at the list level and strict at the row level: a
//! malformed row is skipped with a warning, a failed query yields an empty
//! list. An unreadable index never takes the gallery down.

use crate::imaging::exif;
use crate::photo::{Orientation, Photo};
use log::{debug, warn};
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use thiserror::Error;
use walkdir::WalkDir;

#[derive(Error, Debug)]
pub enum IndexError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("unknown photo: {0}")]
    UnknownPhoto(String),
    #[error("index query failed: {0}")]
    Query(String),
}

/// One raw row from an index query, before validation.
///
/// Fields mirror what a media index can actually promise: the identifier is
/// always there, everything else may be missing or junk.
#[derive(Debug, Clone)]
pub struct IndexRow {
    pub id: String,
    /// Display rotation in degrees, as stored. Validated by [`load_photos`].
    pub orientation_degrees: u16,
    pub width: Option<u32>,
    pub height: Option<u32>,
}

/// Source of photos for the gallery.
///
/// Implementations must be shareable across decode workers.
pub trait MediaSource: Send + Sync {
    /// Query the index, newest photo first.
    fn query_index(&self) -> Result<Vec<IndexRow>, IndexError>;

    /// Read the full source bytes for one photo.
    fn read_bytes(&self, id: &str) -> Result<Vec<u8>, IndexError>;

    /// Resolve an identifier to a locator the full-screen viewer can open
    /// on its own (e.g. an absolute filesystem path).
    fn locator(&self, id: &str) -> String;
}

/// Load and validate the photo list from a source.
///
/// Rows with an orientation that is not a quarter turn, or with missing or
/// zero dimensions, are skipped with a warning. A failed query logs and
/// returns an empty list — the caller renders an empty gallery, not an
/// error state.
pub fn load_photos(source: &dyn MediaSource) -> Vec<Photo> {
    let rows = match source.query_index() {
        Ok(rows) => rows,
        Err(err) => {
            warn!("index query failed, showing empty gallery: {}", err);
            return Vec::new();
        }
    };

    let total = rows.len();
    let photos: Vec<Photo> = rows.into_iter().filter_map(validate_row).collect();
    debug!("loaded {} of {} index rows", photos.len(), total);
    photos
}

fn validate_row(row: IndexRow) -> Option<Photo> {
    let orientation = match Orientation::try_from(row.orientation_degrees) {
        Ok(o) => o,
        Err(err) => {
            warn!("skipping photo {}: {}", row.id, err);
            return None;
        }
    };
    let (Some(width), Some(height)) = (row.width, row.height) else {
        warn!("skipping photo {}: missing dimensions", row.id);
        return None;
    };
    if width == 0 || height == 0 {
        warn!("skipping photo {}: zero dimension {}x{}", row.id, width, height);
        return None;
    }
    Some(Photo {
        id: row.id,
        orientation,
        width,
        height,
    })
}

// ---------------------------------------------------------------------------
// Filesystem source
// ---------------------------------------------------------------------------

/// Image formats the filesystem source indexes.
const SUPPORTED_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "tif", "tiff", "webp"];

/// A [`MediaSource`] backed by a directory tree.
///
/// Identifiers are paths relative to the root; ordering is file modification
/// time, newest first. Orientation comes from EXIF metadata where the format
/// carries it.
pub struct FsMediaSource {
    root: PathBuf,
}

impl FsMediaSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn resolve(&self, id: &str) -> PathBuf {
        self.root.join(id)
    }

    fn is_supported(path: &Path) -> bool {
        path.extension()
            .and_then(|e| e.to_str())
            .map(|e| SUPPORTED_EXTENSIONS.contains(&e.to_lowercase().as_str()))
            .unwrap_or(false)
    }
}

impl MediaSource for FsMediaSource {
    fn query_index(&self) -> Result<Vec<IndexRow>, IndexError> {
        if !self.root.is_dir() {
            return Err(IndexError::Query(format!(
                "not a directory: {}",
                self.root.display()
            )));
        }

        let mut found: Vec<(SystemTime, IndexRow)> = Vec::new();
        for entry in WalkDir::new(&self.root).into_iter().filter_map(|e| e.ok()) {
            let path = entry.path();
            if !entry.file_type().is_file() || !Self::is_supported(path) {
                continue;
            }

            let Ok(relative) = path.strip_prefix(&self.root) else {
                continue;
            };
            let id = relative.to_string_lossy().into_owned();

            // An unreadable header means the file is not a usable photo;
            // skip it rather than emitting a row the loader will drop.
            let (width, height) = match image::image_dimensions(path) {
                Ok(dims) => dims,
                Err(err) => {
                    debug!("skipping {}: {}", path.display(), err);
                    continue;
                }
            };

            let orientation = exif::read_orientation(path);
            let modified = entry
                .metadata()
                .ok()
                .and_then(|m| m.modified().ok())
                .unwrap_or(SystemTime::UNIX_EPOCH);

            found.push((
                modified,
                IndexRow {
                    id,
                    orientation_degrees: orientation.degrees(),
                    width: Some(width),
                    height: Some(height),
                },
            ));
        }

        // Newest first; identifier breaks ties so the order is stable.
        found.sort_by(|a, b| b.0.cmp(&a.0).then_with(|| a.1.id.cmp(&b.1.id)));
        Ok(found.into_iter().map(|(_, row)| row).collect())
    }

    fn read_bytes(&self, id: &str) -> Result<Vec<u8>, IndexError> {
        let path = self.resolve(id);
        if !path.is_file() {
            return Err(IndexError::UnknownPhoto(id.to_string()));
        }
        Ok(std::fs::read(path)?)
    }

    fn locator(&self, id: &str) -> String {
        self.resolve(id).to_string_lossy().into_owned()
    }
}
