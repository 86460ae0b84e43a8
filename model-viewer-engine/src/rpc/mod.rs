//! JSON-RPC 2.0 bridge to the page hosting the viewer.
//!
//! The viewer runs inside an iframe; the host page owns the sidebar, file
//! picker and sliders and talks to the engine over `postMessage`.
//!
//! ```text
//! Host page (parent window)  <──postMessage──>  Viewer (iframe)
//!        │                                          │
//!        ├─ Request (with id) ────────────────────> │ ViewerSet::Input
//!        │                                          ├─ ViewerCommand / CameraCommand /
//!        │                                          │  PlacementActionEvent / TeardownRequest
//!        │ <──────────────────── Response (same id) ┤ ViewerSet::Output
//!        │ <──────────────────── Notification ──────┤
//! ```
//!
//! ## Requests
//!
//! | method                        | params                         |
//! |-------------------------------|--------------------------------|
//! | `set_time_of_day`             | `{ time }`                     |
//! | `set_show_annotations`        | `{ show }`                     |
//! | `toggle_annotations`          |                                |
//! | `set_night_lights_enabled`    | `{ enabled }`                  |
//! | `toggle_night_lights`         |                                |
//! | `set_camera_mode`             | `{ mode: "orbit" \| "firstPerson" }` |
//! | `load_model`                  | `{ name, data (base64) }`      |
//! | `edit_annotation`             | `{ id, title, description }`   |
//! | `delete_annotation`           | `{ id }`                       |
//! | `start_annotation_placement`  |                                |
//! | `cancel_annotation_placement` |                                |
//! | `reset_camera`                |                                |
//! | `get_viewer_state`            |                                |
//! | `get_annotations`             |                                |
//! | `get_fps`                     |                                |
//! | `dispose`                     |                                |
//!
//! Requests are applied on the following schedule stages, so toggles answer
//! with the value they will produce.
//!
//! ## Notifications
//!
//! `annotation_added`, `annotation_edit_requested`, `annotations_changed`,
//! `viewer_state_changed`, `placement_state_changed`, `pointer_capture_changed`,
//! `model_loaded`, `model_load_failed`, `environment_load_failed`,
//! `viewport_resized`, `fps_update`.
//!
//! ## Error Codes
//!
//! - `-32601`: Method not found
//! - `-32602`: Invalid params (including unsupported model suffixes and bad
//!   base64)

/// Message intake, request dispatch and the outgoing message queue.
pub mod web_rpc;
