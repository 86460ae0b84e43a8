//! Scene composition.
//!
//! The orchestrator turns application state changes into refreshes of the
//! derived scene; `stage` builds the fixed parts that exist from startup.

/// Property-to-refresh mapping and ownership of derived scene entities.
pub mod orchestrator;

/// Startup scene: camera, sun, ground plane and the placeholder cube.
pub mod stage;
