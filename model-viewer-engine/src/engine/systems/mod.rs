//! Frame-level runtime systems outside the scene orchestrator.

/// FPS notifications to the host and the native overlay.
pub mod fps_tracking;

/// Idempotent release of everything the viewer owns.
pub mod teardown;

/// Canvas resize handling.
pub mod viewport;
