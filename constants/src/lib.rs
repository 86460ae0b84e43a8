//! Shared tunables for the model viewer engine.
//!
//! Every magic number the engine relies on lives here so lighting, camera and
//! scene behaviour can be adjusted without touching system code.

pub mod assets;
pub mod camera;
pub mod lighting;
pub mod render_settings;
pub mod scene;
