//! Interactive tools layered over the camera controls.
//!
//! ## Placement Flow
//!
//! ```text
//! RPC start_annotation_placement / P key
//!   └─> PlacementActionEvent
//!       └─> PlacementTool: Idle -> Placing
//! Left click while placing
//!   └─> PlacementClick { ray through the cursor }
//!       └─> nearest visible mesh hit
//!           ├─> hit:  ViewerCommand::AddAnnotation + annotation_added, back to Idle
//!           └─> miss: click consumed, still Placing
//! Left click while idle
//!   └─> first-person without capture: CameraCommand::Capture
//! ```
//!
//! ## Cross-Platform Considerations
//!
//! Native builds map keys to the host UI's controls (`shortcuts`). WASM builds
//! are driven entirely over RPC.

/// One-shot annotation placement by clicking on a surface.
pub mod annotation_placement;

/// Native keyboard shortcuts standing in for the host UI.
pub mod shortcuts;
