//! Render pipeline construction and lookup
//!
//! Pipeline configurations are registered during initialization and built
//! in one batch before the first frame; afterwards the manager is a
//! read-only name-to-pipeline table. No pipeline is created during
//! steady-state rendering.

use std::{collections::HashMap, sync::Arc};

use crate::gfx::rendering::vertex::Vertex;

/// Depth attachment behavior of one pipeline.
#[derive(Debug, Clone)]
pub struct DepthState {
    pub format: wgpu::TextureFormat,
    pub write: bool,
    pub compare: wgpu::CompareFunction,
    pub bias: wgpu::DepthBiasState,
}

impl DepthState {
    /// Write-enabled, compare Less, no bias.
    pub fn standard(format: wgpu::TextureFormat) -> Self {
        Self {
            format,
            write: true,
            compare: wgpu::CompareFunction::Less,
            bias: wgpu::DepthBiasState::default(),
        }
    }

    /// Constant + slope bias against shadow acne.
    pub fn biased(format: wgpu::TextureFormat, constant: i32, slope_scale: f32) -> Self {
        Self {
            bias: wgpu::DepthBiasState {
                constant,
                slope_scale,
                clamp: 0.0,
            },
            ..Self::standard(format)
        }
    }
}

/// Everything needed to build one render pipeline.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub label: String,
    pub shader: String,
    pub bind_group_layouts: Vec<wgpu::BindGroupLayout>,
    pub topology: wgpu::PrimitiveTopology,
    pub cull_mode: Option<wgpu::Face>,
    pub depth: Option<DepthState>,
    pub color_targets: Vec<Option<wgpu::ColorTargetState>>,
    /// Depth-only pass with no fragment stage (the shadow pass).
    pub depth_only: bool,
    /// Vertices synthesized in the shader; no buffers bound (fullscreen
    /// passes).
    pub synthesized_vertices: bool,
}

impl PipelineConfig {
    pub fn new(shader: &str) -> Self {
        Self {
            label: shader.to_string(),
            shader: shader.to_string(),
            bind_group_layouts: Vec::new(),
            topology: wgpu::PrimitiveTopology::TriangleList,
            cull_mode: Some(wgpu::Face::Back),
            depth: None,
            color_targets: Vec::new(),
            depth_only: false,
            synthesized_vertices: false,
        }
    }

    pub fn with_label(mut self, label: &str) -> Self {
        self.label = label.to_string();
        self
    }

    pub fn with_layouts(mut self, layouts: Vec<wgpu::BindGroupLayout>) -> Self {
        self.bind_group_layouts = layouts;
        self
    }

    pub fn with_depth(mut self, depth: DepthState) -> Self {
        self.depth = Some(depth);
        self
    }

    pub fn with_color_targets(mut self, targets: Vec<Option<wgpu::ColorTargetState>>) -> Self {
        self.color_targets = targets;
        self
    }

    pub fn without_culling(mut self) -> Self {
        self.cull_mode = None;
        self
    }

    pub fn depth_only(mut self) -> Self {
        self.depth_only = true;
        self
    }

    pub fn fullscreen(mut self) -> Self {
        self.synthesized_vertices = true;
        self
    }
}

/// Named render pipelines plus the shader modules they compile from.
pub struct PipelineManager {
    device: Arc<wgpu::Device>,
    shaders: HashMap<String, wgpu::ShaderModule>,
    configs: HashMap<String, PipelineConfig>,
    built: HashMap<String, wgpu::RenderPipeline>,
    pending: Vec<String>,
}

impl PipelineManager {
    pub fn new(device: Arc<wgpu::Device>) -> Self {
        Self {
            device,
            shaders: HashMap::new(),
            configs: HashMap::new(),
            built: HashMap::new(),
            pending: Vec::new(),
        }
    }

    /// Compiles a WGSL module. Sources are opaque text keyed by name; the
    /// engine never inspects them.
    pub fn load_shader(&mut self, name: &str, source: &str) {
        let module = self
            .device
            .create_shader_module(wgpu::ShaderModuleDescriptor {
                label: Some(name),
                source: wgpu::ShaderSource::Wgsl(source.into()),
            });
        self.shaders.insert(name.to_string(), module);
    }

    /// Registers a configuration; the pipeline is built by
    /// [`build_pending`](Self::build_pending).
    pub fn register(&mut self, name: &str, config: PipelineConfig) {
        self.configs.insert(name.to_string(), config);
        self.pending.push(name.to_string());
    }

    /// Builds every registered-but-unbuilt pipeline, collecting all
    /// failures rather than stopping at the first.
    pub fn build_pending(&mut self) -> Result<(), Vec<String>> {
        let mut errors = Vec::new();
        for name in std::mem::take(&mut self.pending) {
            let Some(config) = self.configs.get(&name) else {
                continue;
            };
            match self.build(&name, config) {
                Ok(pipeline) => {
                    self.built.insert(name, pipeline);
                }
                Err(reason) => errors.push(format!("pipeline `{name}`: {reason}")),
            }
        }
        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    pub fn get(&self, name: &str) -> Option<&wgpu::RenderPipeline> {
        self.built.get(name)
    }

    fn build(&self, name: &str, config: &PipelineConfig) -> Result<wgpu::RenderPipeline, String> {
        let shader = self
            .shaders
            .get(&config.shader)
            .ok_or_else(|| format!("shader `{}` is not loaded", config.shader))?;

        let layout_refs: Vec<&wgpu::BindGroupLayout> = config.bind_group_layouts.iter().collect();
        let layout = self
            .device
            .create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
                label: Some(&format!("{name} Layout")),
                bind_group_layouts: &layout_refs,
                push_constant_ranges: &[],
            });

        let vertex_buffers: &[wgpu::VertexBufferLayout] = if config.synthesized_vertices {
            &[]
        } else {
            &[Vertex::desc()]
        };

        let fragment = (!config.depth_only).then_some(wgpu::FragmentState {
            module: shader,
            entry_point: Some("fs_main"),
            targets: &config.color_targets,
            compilation_options: wgpu::PipelineCompilationOptions::default(),
        });

        let depth_stencil = config.depth.as_ref().map(|depth| wgpu::DepthStencilState {
            format: depth.format,
            depth_write_enabled: depth.write,
            depth_compare: depth.compare,
            stencil: wgpu::StencilState::default(),
            bias: depth.bias,
        });

        Ok(self
            .device
            .create_render_pipeline(&wgpu::RenderPipelineDescriptor {
                label: Some(&config.label),
                layout: Some(&layout),
                vertex: wgpu::VertexState {
                    module: shader,
                    entry_point: Some("vs_main"),
                    buffers: vertex_buffers,
                    compilation_options: wgpu::PipelineCompilationOptions::default(),
                },
                fragment,
                primitive: wgpu::PrimitiveState {
                    topology: config.topology,
                    strip_index_format: None,
                    front_face: wgpu::FrontFace::Ccw,
                    cull_mode: config.cull_mode,
                    polygon_mode: wgpu::PolygonMode::Fill,
                    unclipped_depth: false,
                    conservative: false,
                },
                depth_stencil,
                multisample: wgpu::MultisampleState::default(),
                multiview: None,
                cache: None,
            }))
    }
}
