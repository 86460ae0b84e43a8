//! User annotations pinned to model surfaces.
//!
//! The store is owned by `ViewerState`; markers are the orchestrator's
//! derived visual for each annotation while annotations are shown.

/// Marker spheres rebuilt from the annotation store.
pub mod markers;

/// Ordered annotation collection with create/edit/delete by id.
pub mod store;
