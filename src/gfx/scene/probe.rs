//! Environment capture probes

use cgmath::Point3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProbeKind {
    Irradiance,
    Reflection,
}

/// A scene point capturing environment data for later sampling.
///
/// The renderer resolves `output` against the texture registry when an
/// ambient cube is requested; the capture itself is host work.
#[derive(Debug, Clone)]
pub struct Probe {
    pub position: Point3<f32>,
    pub kind: ProbeKind,
    /// Texture registry name the capture is published under.
    pub output: String,
    pub sample_count: u32,
}
