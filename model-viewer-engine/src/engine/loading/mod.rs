//! Model file loading.
//!
//! A selected file is identified by suffix, parsed on the async compute pool
//! and swapped into the scene only once parsing succeeds.

/// Suffix-based format detection and the selected-file handle.
pub mod model_format;

/// Parse task polling, model spawning, recentring and camera framing.
pub mod model_loader;

/// OBJ and FBX parsing into triangle meshes.
pub mod model_parser;
