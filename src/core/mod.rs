//! Host-independent building blocks shared by the app and its tests

pub mod controller;
pub mod gpu_context;
pub mod input_adapter;
pub mod ping_pong;

pub use controller::{Button, Controller};
pub use gpu_context::GpuContext;
pub use input_adapter::WinitController;
pub use ping_pong::PingPong;
