use crate::engine::camera::ViewerCamera;
use crate::rpc::web_rpc::WebRpcInterface;
use bevy::prelude::*;
use bevy::window::WindowResized;

/// Keep the camera aspect ratio in step with the canvas before the next frame
/// renders.
pub fn handle_viewport_resize(
    mut resize_events: EventReader<WindowResized>,
    mut projections: Query<&mut Projection, With<ViewerCamera>>,
    mut rpc_interface: ResMut<WebRpcInterface>,
) {
    let Some(resized) = resize_events.read().last() else {
        return;
    };
    if resized.width <= 0.0 || resized.height <= 0.0 {
        // Collapsed canvas (hidden tab, zero-height container).
        return;
    }

    for mut projection in &mut projections {
        if let Projection::Perspective(perspective) = &mut *projection {
            perspective.aspect_ratio = resized.width / resized.height;
        }
    }

    debug!("Viewport resized to {}x{}", resized.width, resized.height);
    rpc_interface.send_notification(
        "viewport_resized",
        serde_json::json!({ "width": resized.width, "height": resized.height }),
    );
}
