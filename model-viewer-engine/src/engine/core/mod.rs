//! Core application setup and state.
//!
//! Builds the Bevy app for native and WASM targets, owns the application
//! state resource and its command type, and loads the optional viewer config.

/// App construction, frame stages and system registration.
pub mod app_setup;

/// Application state, the commands that mutate it and the viewer lifecycle.
pub mod app_state;

/// Optional JSON viewer config applied once at startup.
pub mod viewer_config;

/// Platform-specific window configuration for native and WASM builds.
///
/// Configures canvas integration for web targets and vsync settings.
pub mod window_config;
