//! The gallery controller.
//!
//! [`Gallery`] wires the pieces together: it loads the photo list from a
//! [`MediaSource`], serves thumbnails through the [`ThumbCache`], maps pinch
//! gestures to column counts, and publishes every observable change through
//! the [`StateStore`].
//!
//! # Threading
//!
//! Loading and thumbnail decoding are offloaded to the rayon pool via the
//! `*_blocking` / spawning method pairs. The controller itself holds no
//! thread affinity — any thread may call any method.

use crate::cache::ThumbCache;
use crate::config::GalleryConfig;
use crate::gesture::PinchMapper;
use crate::imaging::decoder::{decode_thumbnail, CancelToken, ThumbnailRequest};
use crate::index::{load_photos, MediaSource};
use crate::photo::{Photo, ViewerRequest};
use crate::state::StateStore;
use image::RgbaImage;
use log::{debug, info};
use std::io::Cursor;
use std::sync::{Arc, Mutex};

pub struct Gallery {
    config: GalleryConfig,
    source: Arc<dyn MediaSource>,
    cache: Arc<ThumbCache>,
    state: Arc<StateStore>,
    pinch: Mutex<PinchMapper>,
}

impl Gallery {
    /// Build a gallery over a media source.
    ///
    /// `available_memory` sizes the thumbnail cache; pass `None` to use the
    /// configured fallback budget.
    pub fn new(
        config: GalleryConfig,
        source: Arc<dyn MediaSource>,
        available_memory: Option<u64>,
    ) -> Self {
        let budget = config.cache.budget_bytes(available_memory);
        let state = StateStore::new(
            config.grid.min_columns,
            config.grid.max_columns,
            config.grid.default_columns,
        );
        let pinch = PinchMapper::new(config.grid.min_columns, config.grid.max_columns);
        debug!("gallery cache budget: {} bytes", budget);

        Self {
            config,
            source,
            cache: Arc::new(ThumbCache::new(budget)),
            state: Arc::new(state),
            pinch: Mutex::new(pinch),
        }
    }

    /// The state store, for snapshots and subscriptions.
    pub fn state(&self) -> &Arc<StateStore> {
        &self.state
    }

    /// The thumbnail cache.
    pub fn cache(&self) -> &Arc<ThumbCache> {
        &self.cache
    }

    // -----------------------------------------------------------------------
    // Loading
    // -----------------------------------------------------------------------

    /// Record whether the media index may be read.
    ///
    /// Revoking permission also clears the photo list; the grid must not
    /// keep showing media it no longer has access to.
    pub fn set_permission(&self, granted: bool) {
        self.state.update(|s| {
            s.has_permission = granted;
            if !granted {
                s.photos = Arc::new(Vec::new());
            }
        });
    }

    /// Load the photo list on the rayon pool.
    ///
    /// Publishes a loading snapshot immediately; the loaded list follows
    /// when the query completes. A call without permission is a no-op.
    pub fn load(self: &Arc<Self>) {
        if !self.state.snapshot().has_permission {
            debug!("load skipped: no media permission");
            return;
        }
        self.state.update(|s| s.is_loading = true);

        let gallery = Arc::clone(self);
        rayon::spawn(move || gallery.finish_load());
    }

    /// Load the photo list on the calling thread.
    pub fn load_blocking(&self) {
        if !self.state.snapshot().has_permission {
            debug!("load skipped: no media permission");
            return;
        }
        self.state.update(|s| s.is_loading = true);
        self.finish_load();
    }

    /// Drop the current list and reload from the source.
    ///
    /// The cleared, loading snapshot is published before the query starts,
    /// so observers see the reset even if the reload is slow.
    pub fn refresh(self: &Arc<Self>) {
        if !self.state.snapshot().has_permission {
            debug!("refresh skipped: no media permission");
            return;
        }
        self.state.update(|s| {
            s.photos = Arc::new(Vec::new());
            s.is_loading = true;
        });

        let gallery = Arc::clone(self);
        rayon::spawn(move || gallery.finish_load());
    }

    /// [`Gallery::refresh`], on the calling thread.
    pub fn refresh_blocking(&self) {
        if !self.state.snapshot().has_permission {
            debug!("refresh skipped: no media permission");
            return;
        }
        self.state.update(|s| {
            s.photos = Arc::new(Vec::new());
            s.is_loading = true;
        });
        self.finish_load();
    }

    fn finish_load(&self) {
        let photos = load_photos(self.source.as_ref());
        info!("loaded {} photos", photos.len());
        self.state.update(|s| {
            s.photos = Arc::new(photos);
            s.is_loading = false;
        });
    }

    // -----------------------------------------------------------------------
    // Thumbnails
    // -----------------------------------------------------------------------

    fn request_for(&self, photo: &Photo) -> ThumbnailRequest {
        ThumbnailRequest {
            width: self.config.thumbnails.width,
            height: self.config.thumbnails.height,
            orientation: photo.orientation,
            wide_threshold: self.config.thumbnails.wide_aspect_threshold,
        }
    }

    /// Fetch a thumbnail, decoding on the calling thread on a cache miss.
    ///
    /// `None` means the source could not be decoded (or the token was
    /// cancelled); the grid shows a placeholder for that cell.
    pub fn thumbnail(&self, photo: &Photo, cancel: &CancelToken) -> Option<Arc<RgbaImage>> {
        if let Some(hit) = self.cache.get(&photo.id) {
            return Some(hit);
        }

        let bytes = match self.source.read_bytes(&photo.id) {
            Ok(bytes) => bytes,
            Err(err) => {
                debug!("cannot read photo {}: {}", photo.id, err);
                return None;
            }
        };
        let decoded = decode_thumbnail(Cursor::new(bytes), &self.request_for(photo), cancel)?;

        // Another worker may have finished the same decode first; the cache
        // keeps whichever arrived first and everyone serves that copy.
        let decoded = Arc::new(decoded);
        self.cache.put(&photo.id, decoded.clone());
        Some(self.cache.get(&photo.id).unwrap_or(decoded))
    }

    /// Decode a thumbnail on the rayon pool and hand it to `on_done`.
    ///
    /// The callback runs on the worker thread. Cancel the token to abandon
    /// a decode for a cell that scrolled away.
    pub fn spawn_thumbnail<F>(self: &Arc<Self>, photo: Photo, cancel: CancelToken, on_done: F)
    where
        F: FnOnce(Option<Arc<RgbaImage>>) + Send + 'static,
    {
        let gallery = Arc::clone(self);
        rayon::spawn(move || {
            let result = gallery.thumbnail(&photo, &cancel);
            on_done(result);
        });
    }

    // -----------------------------------------------------------------------
    // Gestures and navigation
    // -----------------------------------------------------------------------

    /// Feed one pinch increment. On a committed column change the new count
    /// is published and returned.
    pub fn pinch(&self, zoom_change: f32) -> Option<u32> {
        let current = self.state.snapshot().columns;
        let committed = self.pinch.lock().unwrap().apply(current, zoom_change)?;
        self.state.update(|s| s.columns = committed);
        Some(committed)
    }

    /// The pinch gesture ended.
    pub fn pinch_end(&self) {
        self.pinch.lock().unwrap().end();
    }

    /// Everything the full-screen viewer needs to open a photo itself.
    pub fn viewer_request(&self, photo: &Photo) -> ViewerRequest {
        ViewerRequest {
            locator: self.source.locator(&photo.id),
            orientation: photo.orientation,
        }
    }
}
