pub mod annotations;
pub mod camera;
pub mod core;
pub mod lighting;
pub mod loading;
pub mod scene;
pub mod systems;
