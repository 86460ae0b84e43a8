/// Initial clear colour before the first lighting refresh.
pub const BACKGROUND_COLOUR: u32 = 0x222222;

pub const GROUND_SIZE: f32 = 20.0;
pub const GROUND_COLOUR: u32 = 0x404040;

pub const DEFAULT_CUBE_SIZE: f32 = 1.0;
pub const DEFAULT_CUBE_COLOUR: u32 = 0xff6b35;

pub const MODEL_BASE_COLOUR: u32 = 0xcccccc;

pub const ANNOTATION_MARKER_RADIUS: f32 = 0.1;
pub const ANNOTATION_MARKER_SEGMENTS: u32 = 16;
pub const ANNOTATION_MARKER_COLOUR: u32 = 0xfbbf24;
pub const ANNOTATION_MARKER_EMISSIVE_STRENGTH: f32 = 0.5;
pub const ANNOTATION_MARKER_METALLIC: f32 = 0.5;

pub const ANNOTATION_DEFAULT_TITLE: &str = "New Annotation";
