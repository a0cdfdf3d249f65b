pub mod accumulation;
pub mod camera;
pub mod cli;
pub mod controls;
pub mod core;
pub mod frame;
pub mod renderer;
pub mod scene;
pub mod session;
pub mod settings;
pub mod ui;
pub mod uniforms;

pub use accumulation::Accumulation;
pub use camera::{Camera, CameraTuning};
pub use scene::{default_scene, Scene};
pub use session::Session;
