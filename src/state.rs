//! Gallery view-state.
//!
//! A single [`StateStore`] holds everything the grid needs to render: the
//! photo list, the loading flag, the permission flag, and the current column
//! count. State is published as immutable [`GallerySnapshot`]s — observers
//! get a consistent view, never a half-applied update.
//!
//! Updates go through [`StateStore::update`], which applies a closure to a
//! copy of the current snapshot under the lock and notifies subscribers with
//! the result after releasing it. Subscribers must therefore tolerate being
//! called from whatever thread committed the update.

use crate::photo::Photo;
use std::sync::{Arc, Mutex};

/// One immutable, consistent view of the gallery.
///
/// The photo list is behind an `Arc` so cloning a snapshot never copies the
/// list itself.
#[derive(Debug, Clone)]
pub struct GallerySnapshot {
    pub photos: Arc<Vec<Photo>>,
    /// A load or refresh is in flight.
    pub is_loading: bool,
    /// The app may read the media index.
    pub has_permission: bool,
    /// Current grid column count, always within the store's bounds.
    pub columns: u32,
}

type Subscriber = Arc<dyn Fn(&GallerySnapshot) + Send + Sync>;

/// Holder and publisher of gallery snapshots.
pub struct StateStore {
    current: Mutex<Arc<GallerySnapshot>>,
    subscribers: Mutex<Vec<Subscriber>>,
    min_columns: u32,
    max_columns: u32,
}

impl StateStore {
    /// Create a store with the given column bounds and initial column count.
    ///
    /// The initial snapshot is empty, not loading, without permission.
    pub fn new(min_columns: u32, max_columns: u32, initial_columns: u32) -> Self {
        let columns = initial_columns.clamp(min_columns, max_columns);
        Self {
            current: Mutex::new(Arc::new(GallerySnapshot {
                photos: Arc::new(Vec::new()),
                is_loading: false,
                has_permission: false,
                columns,
            })),
            subscribers: Mutex::new(Vec::new()),
            min_columns,
            max_columns,
        }
    }

    /// The current snapshot.
    pub fn snapshot(&self) -> Arc<GallerySnapshot> {
        self.current.lock().unwrap().clone()
    }

    /// Apply a mutation and publish the result.
    ///
    /// The closure receives a mutable copy of the current snapshot. The
    /// column count is clamped to the store's bounds before the commit, so
    /// no snapshot with out-of-range columns is ever observable.
    ///
    /// Notification happens after both locks are released, so a subscriber
    /// may call back into the store (including `subscribe`). The cost is
    /// that concurrent updates may deliver their snapshots to observers in
    /// either order; observers needing the latest state should read
    /// [`StateStore::snapshot`] rather than trust arrival order.
    pub fn update<F>(&self, mutate: F) -> Arc<GallerySnapshot>
    where
        F: FnOnce(&mut GallerySnapshot),
    {
        let published = {
            let mut current = self.current.lock().unwrap();
            let mut next = (**current).clone();
            mutate(&mut next);
            next.columns = next.columns.clamp(self.min_columns, self.max_columns);
            let next = Arc::new(next);
            *current = next.clone();
            next
        };

        // Snapshot the subscriber list so no lock is held while observer
        // code runs.
        let subscribers: Vec<Subscriber> = self.subscribers.lock().unwrap().clone();
        for subscriber in &subscribers {
            subscriber(&published);
        }
        published
    }

    /// Register an observer. It is immediately called with the current
    /// snapshot so new observers never start from a blank screen.
    pub fn subscribe<F>(&self, observer: F)
    where
        F: Fn(&GallerySnapshot) + Send + Sync + 'static,
    {
        let snapshot = self.snapshot();
        observer(&snapshot);
        self.subscribers.lock().unwrap().push(Arc::new(observer));
    }

    pub fn min_columns(&self) -> u32 {
        self.min_columns
    }

    pub fn max_columns(&self) -> u32 {
        self.max_columns
    }
}
