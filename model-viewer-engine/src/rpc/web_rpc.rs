use crate::engine::camera::CameraCommand;
use crate::engine::core::app_setup::ViewerSet;
use crate::engine::core::app_state::{CameraMode, ViewerCommand, ViewerState, viewer_running};
use crate::engine::loading::model_format::ModelFile;
use crate::engine::systems::teardown::{TeardownRequest, handle_teardown};
use crate::tools::annotation_placement::{ActionSource, PlacementAction, PlacementActionEvent};
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use bevy::diagnostic::{DiagnosticsStore, FrameTimeDiagnosticsPlugin};
use bevy::ecs::system::SystemParam;
use bevy::prelude::*;
use serde::{Deserialize, Serialize};

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::JsValue;

#[cfg(target_arch = "wasm32")]
use web_sys::{MessageEvent, window};

/// JSON-RPC 2.0 request structure.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct RpcRequest {
    pub jsonrpc: String,
    pub method: String,
    #[serde(default)]
    pub params: serde_json::Value,
    pub id: Option<serde_json::Value>,
}

/// JSON-RPC 2.0 response structure.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct RpcResponse {
    pub jsonrpc: String,
    pub result: Option<serde_json::Value>,
    pub error: Option<RpcError>,
    pub id: Option<serde_json::Value>,
}

/// JSON-RPC 2.0 notification structure for one-way communication.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct RpcNotification {
    pub jsonrpc: String,
    pub method: String,
    pub params: serde_json::Value,
}

/// JSON-RPC 2.0 error object.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct RpcError {
    pub code: i32,
    pub message: String,
    pub data: Option<serde_json::Value>,
}

/// Outbox for the host page. Notifications and responses queued during a
/// frame are flushed together in `ViewerSet::Output`.
#[derive(Resource, Default)]
pub struct WebRpcInterface {
    outgoing_notifications: Vec<RpcNotification>,
    outgoing_responses: Vec<RpcResponse>,
}

impl WebRpcInterface {
    /// Queue a one-way notification for the host.
    pub fn send_notification(&mut self, method: &str, params: serde_json::Value) {
        self.outgoing_notifications.push(RpcNotification {
            jsonrpc: "2.0".to_string(),
            method: method.to_string(),
            params,
        });
    }

    fn queue_response(&mut self, response: RpcResponse) {
        self.outgoing_responses.push(response);
    }

    /// Notifications not yet flushed, oldest first.
    #[cfg(test)]
    pub(crate) fn pending_notifications(&self) -> impl Iterator<Item = &RpcNotification> {
        self.outgoing_notifications.iter()
    }

    #[cfg(test)]
    pub(crate) fn pending_responses(&self) -> &[RpcResponse] {
        &self.outgoing_responses
    }
}

/// JSON-RPC bridge between the viewer and the page embedding its iframe.
pub struct WebRpcPlugin;

impl Plugin for WebRpcPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<WebRpcInterface>()
            .add_event::<IncomingRpcMessage>()
            .add_systems(
                Update,
                (process_incoming_messages, handle_rpc_messages)
                    .chain()
                    .in_set(ViewerSet::Input),
            )
            .add_systems(
                Update,
                (
                    send_outgoing_messages,
                    release_host_channel
                        .after(handle_teardown)
                        .run_if(not(viewer_running)),
                )
                    .in_set(ViewerSet::Output),
            );

        #[cfg(target_arch = "wasm32")]
        app.add_systems(Startup, setup_message_listener);
    }
}

/// The page's `message` callback. Held until teardown so it can be
/// unregistered.
#[cfg(target_arch = "wasm32")]
struct MessageListener(Closure<dyn FnMut(MessageEvent)>);

#[cfg(target_arch = "wasm32")]
fn setup_message_listener(world: &mut World) {
    use std::sync::Arc;
    use std::sync::Mutex;

    // postMessage callbacks land outside the schedule; systems drain this.
    let message_queue: Arc<Mutex<Vec<String>>> = Arc::new(Mutex::new(Vec::new()));
    let queue_clone = message_queue.clone();

    let closure = Closure::wrap(Box::new(move |event: MessageEvent| {
        let Ok(data) = event.data().dyn_into::<js_sys::JsString>() else {
            return;
        };
        let message_str: String = data.into();

        if message_str.contains("jsonrpc") {
            if let Ok(mut queue) = queue_clone.lock() {
                queue.push(message_str);
            }
        }
    }) as Box<dyn FnMut(MessageEvent)>);

    match window() {
        Some(window) => {
            if let Err(e) = window
                .add_event_listener_with_callback("message", closure.as_ref().unchecked_ref())
            {
                error!("Failed to register host message listener: {:?}", e);
            }
        }
        None => error!("Window object not available, host messages disabled"),
    }

    world.insert_non_send_resource(MessageListener(closure));
    world.insert_resource(MessageQueue(message_queue));
}

#[derive(Resource)]
struct MessageQueue(std::sync::Arc<std::sync::Mutex<Vec<String>>>);

/// Stop listening to the host once the viewer is torn down and drop anything
/// it sent in the meantime.
fn release_host_channel(world: &mut World) {
    #[cfg(target_arch = "wasm32")]
    if let Some(listener) = world.remove_non_send_resource::<MessageListener>() {
        let removed = window().map(|window| {
            window.remove_event_listener_with_callback(
                "message",
                listener.0.as_ref().unchecked_ref(),
            )
        });
        match removed {
            Some(Ok(())) => {}
            Some(Err(e)) => {
                error!("Failed to remove host message listener: {:?}", e);
                // Still registered, so the callback must stay alive.
                listener.0.forget();
            }
            None => listener.0.forget(),
        }
    }

    let Some(queue) = world.remove_resource::<MessageQueue>() else {
        return;
    };
    if let Ok(mut pending) = queue.0.lock() {
        if !pending.is_empty() {
            debug!("Dropping {} host messages received after teardown", pending.len());
        }
        pending.clear();
    }
    info!("Host message channel released");
}

/// Raw JSON text received from the host.
#[derive(Event)]
struct IncomingRpcMessage {
    content: String,
}

fn process_incoming_messages(
    message_queue: Option<Res<MessageQueue>>,
    mut message_events: EventWriter<IncomingRpcMessage>,
) {
    let Some(queue_res) = message_queue else {
        return;
    };

    let messages = if let Ok(mut queue) = queue_res.0.lock() {
        std::mem::take(&mut *queue)
    } else {
        Vec::new()
    };

    for message_str in messages {
        message_events.write(IncomingRpcMessage {
            content: message_str,
        });
    }
}

/// Everything an RPC request may read or dispatch to.
#[derive(SystemParam)]
pub struct RpcTargets<'w> {
    diagnostics: Res<'w, DiagnosticsStore>,
    state: Res<'w, ViewerState>,
    viewer_commands: EventWriter<'w, ViewerCommand>,
    placement_events: EventWriter<'w, PlacementActionEvent>,
    camera_commands: EventWriter<'w, CameraCommand>,
    teardown_requests: EventWriter<'w, TeardownRequest>,
}

impl RpcTargets<'_> {
    /// Send a state command and fold it into `projected`, the state as this
    /// frame's commands will leave it.
    fn dispatch(&mut self, projected: &mut ViewerState, command: ViewerCommand) {
        projected.apply(command.clone());
        self.viewer_commands.write(command);
    }
}

fn handle_rpc_messages(
    mut events: EventReader<IncomingRpcMessage>,
    mut rpc_interface: ResMut<WebRpcInterface>,
    mut targets: RpcTargets,
) {
    if events.is_empty() {
        return;
    }
    // Commands land in `ViewerState` later this frame; answer from a copy
    // that already includes them.
    let mut projected = targets.state.clone();

    for event in events.read() {
        match serde_json::from_str::<RpcRequest>(&event.content) {
            Ok(request) => {
                debug!("Processing RPC method: {}", request.method);
                if let Some(response) = handle_rpc_request(&request, &mut targets, &mut projected)
                {
                    rpc_interface.queue_response(response);
                }
            }
            Err(parse_error) => {
                warn!("Discarding malformed RPC message: {}", parse_error);
            }
        }
    }
}

/// Handle individual RPC request and generate response based on method.
///
/// Requests without an id are notifications: they are applied but get no
/// response.
fn handle_rpc_request(
    request: &RpcRequest,
    targets: &mut RpcTargets,
    projected: &mut ViewerState,
) -> Option<RpcResponse> {
    let params = &request.params;
    let result = match request.method.as_str() {
        "set_time_of_day" => handle_set_time_of_day(params, targets, projected),
        "set_show_annotations" => handle_set_show_annotations(params, targets, projected),
        "toggle_annotations" => {
            targets.dispatch(projected, ViewerCommand::ToggleAnnotations);
            Ok(serde_json::json!({ "show_annotations": projected.show_annotations }))
        }
        "set_night_lights_enabled" => handle_set_night_lights(params, targets, projected),
        "toggle_night_lights" => {
            targets.dispatch(projected, ViewerCommand::ToggleNightLights);
            Ok(serde_json::json!({ "night_lights_enabled": projected.night_lights_enabled }))
        }
        "set_camera_mode" => handle_set_camera_mode(params, targets, projected),
        "load_model" => handle_load_model(params, targets, projected),
        "edit_annotation" => handle_edit_annotation(params, targets, projected),
        "delete_annotation" => handle_delete_annotation(params, targets, projected),
        "start_annotation_placement" => handle_placement(PlacementAction::Start, targets),
        "cancel_annotation_placement" => handle_placement(PlacementAction::Cancel, targets),
        "reset_camera" => {
            targets.camera_commands.write(CameraCommand::Reset);
            Ok(serde_json::json!({ "success": true }))
        }
        "get_viewer_state" => Ok(projected.to_json()),
        "get_annotations" => Ok(serde_json::json!({
            "annotations": projected.annotations.as_slice()
        })),
        "get_fps" => handle_get_fps(&targets.diagnostics),
        "dispose" => {
            targets.teardown_requests.write(TeardownRequest { exit: true });
            Ok(serde_json::json!({ "success": true }))
        }
        _ => {
            warn!("Unknown RPC method: {}", request.method);
            let id = request.id.clone()?;
            return Some(create_error_response(
                id,
                -32601,
                "Method not found",
                Some(serde_json::json!({"method": request.method})),
            ));
        }
    };

    if let Err(error) = &result {
        warn!("RPC {} rejected: {}", request.method, error.message);
    }

    // Only generate responses for requests with IDs (notifications have no ID).
    let id = request.id.clone()?;
    match result {
        Ok(result_value) => Some(RpcResponse {
            jsonrpc: "2.0".to_string(),
            result: Some(result_value),
            error: None,
            id: Some(id),
        }),
        Err(error) => Some(RpcResponse {
            jsonrpc: "2.0".to_string(),
            result: None,
            error: Some(error),
            id: Some(id),
        }),
    }
}

fn handle_set_time_of_day(
    params: &serde_json::Value,
    targets: &mut RpcTargets,
    projected: &mut ViewerState,
) -> Result<serde_json::Value, RpcError> {
    #[derive(Deserialize)]
    struct TimeParams {
        time: f32,
    }

    let parsed = serde_json::from_value::<TimeParams>(params.clone())
        .map_err(|_| RpcError::invalid_params("Expected numeric 'time' parameter"))?;

    targets.dispatch(projected, ViewerCommand::SetTimeOfDay(parsed.time));

    Ok(serde_json::json!({ "success": true, "time": parsed.time }))
}

fn handle_set_show_annotations(
    params: &serde_json::Value,
    targets: &mut RpcTargets,
    projected: &mut ViewerState,
) -> Result<serde_json::Value, RpcError> {
    #[derive(Deserialize)]
    struct ShowParams {
        show: bool,
    }

    let parsed = serde_json::from_value::<ShowParams>(params.clone())
        .map_err(|_| RpcError::invalid_params("Expected boolean 'show' parameter"))?;

    targets.dispatch(projected, ViewerCommand::SetShowAnnotations(parsed.show));

    Ok(serde_json::json!({ "success": true, "show_annotations": parsed.show }))
}

fn handle_set_night_lights(
    params: &serde_json::Value,
    targets: &mut RpcTargets,
    projected: &mut ViewerState,
) -> Result<serde_json::Value, RpcError> {
    #[derive(Deserialize)]
    struct NightLightParams {
        enabled: bool,
    }

    let parsed = serde_json::from_value::<NightLightParams>(params.clone())
        .map_err(|_| RpcError::invalid_params("Expected boolean 'enabled' parameter"))?;

    targets.dispatch(projected, ViewerCommand::SetNightLightsEnabled(parsed.enabled));

    Ok(serde_json::json!({ "success": true, "night_lights_enabled": parsed.enabled }))
}

fn handle_set_camera_mode(
    params: &serde_json::Value,
    targets: &mut RpcTargets,
    projected: &mut ViewerState,
) -> Result<serde_json::Value, RpcError> {
    #[derive(Deserialize)]
    struct CameraModeParams {
        mode: String,
    }

    let parsed = serde_json::from_value::<CameraModeParams>(params.clone())
        .map_err(|_| RpcError::invalid_params("Expected 'mode' parameter"))?;

    let mode = CameraMode::from_string(&parsed.mode)
        .ok_or_else(|| RpcError::invalid_params(&format!("Unknown camera mode: {}", parsed.mode)))?;

    targets.dispatch(projected, ViewerCommand::SetCameraMode(mode));

    Ok(serde_json::json!({ "success": true, "camera_mode": mode.as_str() }))
}

/// Decode an uploaded model. Unsupported suffixes are rejected here so the
/// scene is never touched.
fn handle_load_model(
    params: &serde_json::Value,
    targets: &mut RpcTargets,
    projected: &mut ViewerState,
) -> Result<serde_json::Value, RpcError> {
    #[derive(Deserialize)]
    struct LoadModelParams {
        name: String,
        data: String,
    }

    let parsed = serde_json::from_value::<LoadModelParams>(params.clone())
        .map_err(|_| RpcError::invalid_params("Expected 'name' and base64 'data' parameters"))?;

    let bytes = BASE64
        .decode(parsed.data.as_bytes())
        .map_err(|err| RpcError::invalid_params(&format!("Model data is not valid base64: {}", err)))?;

    let file = ModelFile::new(parsed.name, bytes)
        .map_err(|err| RpcError::invalid_params(&err.to_string()))?;

    info!(
        "Model selected via RPC: {} ({})",
        file.name(),
        file.format().as_str()
    );
    let response = serde_json::json!({
        "success": true,
        "name": file.name(),
        "format": file.format(),
    });
    targets.dispatch(projected, ViewerCommand::SelectModel(file));

    Ok(response)
}

fn handle_edit_annotation(
    params: &serde_json::Value,
    targets: &mut RpcTargets,
    projected: &mut ViewerState,
) -> Result<serde_json::Value, RpcError> {
    #[derive(Deserialize)]
    struct EditParams {
        id: String,
        title: String,
        description: String,
    }

    let parsed = serde_json::from_value::<EditParams>(params.clone()).map_err(|_| {
        RpcError::invalid_params("Expected 'id', 'title' and 'description' parameters")
    })?;

    let found = projected.annotations.get(&parsed.id).is_some();
    targets.dispatch(
        projected,
        ViewerCommand::EditAnnotation {
            id: parsed.id,
            title: parsed.title,
            description: parsed.description,
        },
    );

    Ok(serde_json::json!({ "success": found }))
}

fn handle_delete_annotation(
    params: &serde_json::Value,
    targets: &mut RpcTargets,
    projected: &mut ViewerState,
) -> Result<serde_json::Value, RpcError> {
    #[derive(Deserialize)]
    struct DeleteParams {
        id: String,
    }

    let parsed = serde_json::from_value::<DeleteParams>(params.clone())
        .map_err(|_| RpcError::invalid_params("Expected 'id' parameter"))?;

    let found = projected.annotations.get(&parsed.id).is_some();
    targets.dispatch(projected, ViewerCommand::DeleteAnnotation(parsed.id));

    Ok(serde_json::json!({ "success": found }))
}

fn handle_placement(
    action: PlacementAction,
    targets: &mut RpcTargets,
) -> Result<serde_json::Value, RpcError> {
    targets.placement_events.write(PlacementActionEvent {
        action,
        source: ActionSource::Rpc,
    });
    Ok(serde_json::json!({ "success": true }))
}

/// Handle FPS retrieval with diagnostic system integration.
fn handle_get_fps(diagnostics: &DiagnosticsStore) -> Result<serde_json::Value, RpcError> {
    let fps = diagnostics
        .get(&FrameTimeDiagnosticsPlugin::FPS)
        .and_then(|fps_diagnostic| fps_diagnostic.smoothed())
        .unwrap_or(0.0) as f32;

    Ok(serde_json::json!({
        "fps": fps
    }))
}

/// Create standardized error response with optional data payload.
fn create_error_response(
    id: serde_json::Value,
    code: i32,
    message: &str,
    data: Option<serde_json::Value>,
) -> RpcResponse {
    RpcResponse {
        jsonrpc: "2.0".to_string(),
        result: None,
        error: Some(RpcError {
            code,
            message: message.to_string(),
            data,
        }),
        id: Some(id),
    }
}

/// Flush the outbox to the host page. Notifications go first so a response
/// never overtakes the state change it reports on.
fn send_outgoing_messages(mut rpc_interface: ResMut<WebRpcInterface>) {
    for notification in rpc_interface.outgoing_notifications.drain(..) {
        send_message_to_parent(&notification);
    }

    for response in rpc_interface.outgoing_responses.drain(..) {
        send_message_to_parent(&response);
    }
}

/// Post one serialised message to the parent window.
fn send_message_to_parent<T: Serialize>(message: &T) {
    let json = match serde_json::to_string(message) {
        Ok(json) => json,
        Err(e) => {
            error!("Failed to serialize message: {}", e);
            return;
        }
    };

    #[cfg(target_arch = "wasm32")]
    {
        let Some(window) = window() else {
            error!("Window object not available");
            return;
        };
        match window.parent().ok().flatten() {
            Some(parent) => {
                if let Err(e) = parent.post_message(&JsValue::from_str(&json), "*") {
                    error!("Failed to send message to parent: {:?}", e);
                }
            }
            None => warn!("No parent window available for message transmission"),
        }
    }

    // Native builds have no host page.
    #[cfg(not(target_arch = "wasm32"))]
    trace!("rpc out: {}", json);
}

/// Standard RPC error codes and constructors.
impl RpcError {
    pub fn invalid_params(message: &str) -> Self {
        Self {
            code: -32602,
            message: message.to_string(),
            data: None,
        }
    }
}
