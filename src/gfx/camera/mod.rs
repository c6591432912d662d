//! Interactive camera control

pub mod controller;
pub mod orbit;

pub use controller::CameraController;
