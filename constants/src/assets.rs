/// Environment panorama, relative to the asset root.
pub const ENVIRONMENT_HDRI_PATH: &str = "hdri/venice_sunset_1k.hdr";

/// Optional initial viewer settings.
pub const VIEWER_CONFIG_PATH: &str = "viewer_config.json";

/// Model formats accepted by suffix (compared case-insensitively).
pub const OBJ_SUFFIX: &str = ".obj";
pub const FBX_SUFFIX: &str = ".fbx";
