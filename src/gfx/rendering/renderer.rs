//! WGPU renderer and frame orchestration
//!
//! Drives the fixed two-phase frame: one depth-only shadow pass per
//! shadow-casting light, then the main pass sequence over the registered
//! pipeline/group associations. All GPU resources are created in the
//! awaited init/upload phase; a frame only writes buffers, encodes, and
//! submits.

use std::sync::Arc;

use thiserror::Error;

use crate::gfx::layout::{Layout, LayoutError};
use crate::gfx::rendering::pipeline_manager::{DepthState, PipelineConfig, PipelineManager};
use crate::gfx::rendering::shadow::{self, SHADOW_MAP_SIZE};
use crate::gfx::rendering::uniforms;
use crate::gfx::resources::registry::{Registry, ReservedKey, ResourceKey};
use crate::gfx::resources::texture_resource::{
    create_default_sampler, create_shadow_sampler, TextureResource,
};
use crate::gfx::resources::GpuMesh;
use crate::gfx::scene::{ProbeKind, Scene};
use crate::wgpu_utils::{
    binding_types, BindGroupBuilder, BindGroupLayoutBuilder, BindGroupLayoutWithDesc, RawBuffer,
};

/// Pipeline driven by the (pipeline, group) association list for lit
/// geometry; the shadow phase renders this pipeline's mesh set.
pub const MAIN_PIPELINE: &str = "main";
pub const SHADOW_PIPELINE: &str = "shadow";
pub const BACKGROUND_PIPELINE: &str = "background";

/// Fatal rendering errors. A failed bind or draw aborts the frame's
/// remaining passes; nothing is retried.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("mesh `{0}` is not registered")]
    MissingMesh(String),
    #[error("material `{0}` is not registered")]
    MissingMaterial(String),
    #[error("texture `{0}` is not registered")]
    MissingTexture(ResourceKey),
    #[error("sampler `{0}` is not registered")]
    MissingSampler(ResourceKey),
    #[error("shadow target `{0}` is not registered")]
    MissingShadowTarget(ResourceKey),
    #[error("group `{0}` is not registered")]
    MissingGroup(String),
    #[error("pipeline `{0}` is not registered")]
    MissingPipeline(String),
    #[error("scene has not been uploaded")]
    SceneNotUploaded,
    #[error("packing GPU block failed: {0}")]
    Layout(#[from] LayoutError),
    #[error("surface error: {0}")]
    Surface(#[from] wgpu::SurfaceError),
}

/// Per-draw uniform buffer and its bind group.
struct DrawUniforms {
    buffer: RawBuffer,
    bind_group: wgpu::BindGroup,
}

/// Material uniform buffer and the bind group holding its texture pairs.
struct MaterialBinding {
    _buffer: RawBuffer,
    bind_group: wgpu::BindGroup,
}

/// Core renderer owning the GPU device, resource registries, and the
/// two-pass frame loop.
pub struct Renderer {
    surface: wgpu::Surface<'static>,
    device: Arc<wgpu::Device>,
    queue: Arc<wgpu::Queue>,
    config: wgpu::SurfaceConfiguration,
    format: wgpu::TextureFormat,
    depth_texture: TextureResource,
    pipeline_manager: PipelineManager,

    scene_layout: Layout,
    material_layout: Layout,
    light_layout: Layout,
    background_layout: Layout,

    scene_bind_layout: BindGroupLayoutWithDesc,
    material_bind_layout: BindGroupLayoutWithDesc,
    light_bind_layout: BindGroupLayoutWithDesc,
    background_bind_layout: BindGroupLayoutWithDesc,

    textures: Registry<TextureResource>,
    samplers: Registry<wgpu::Sampler>,
    gpu_meshes: Registry<GpuMesh>,
    shadow_targets: Registry<TextureResource>,
    material_bindings: Registry<MaterialBinding>,
    draw_uniforms: Registry<DrawUniforms>,
    /// One per-mesh uniform set per shadow-casting light, keyed by light.
    shadow_draw_uniforms: Registry<Registry<DrawUniforms>>,
    shadow_slots: Vec<i32>,

    light_buffer: Option<RawBuffer>,
    light_bind_group: Option<wgpu::BindGroup>,
    background_buffer: Option<RawBuffer>,
    background_bind_group: Option<wgpu::BindGroup>,
}

impl Renderer {
    /// Shadow-map slots bound to the main pass. Lights beyond this many
    /// shadow casters keep rendering, just without shadows.
    pub const MAX_SHADOW_MAPS: usize = 3;

    const CLEAR_COLOR: wgpu::Color = wgpu::Color {
        r: 0.1,
        g: 0.2,
        b: 0.3,
        a: 1.0,
    };

    /// Creates a renderer for the given window surface.
    ///
    /// # Panics
    /// Panics if no wgpu adapter or device is available.
    pub async fn new(
        window: impl Into<wgpu::SurfaceTarget<'static>>,
        width: u32,
        height: u32,
    ) -> Renderer {
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });
        let surface = instance.create_surface(window).unwrap();

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::default(),
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .expect("Failed to request adapter!");

        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: Some("WGPU Device"),
                required_features: wgpu::Features::default(),
                required_limits: wgpu::Limits::downlevel_defaults(),
                memory_hints: wgpu::MemoryHints::default(),
                trace: wgpu::Trace::Off,
            })
            .await
            .expect("Failed to request a device!");

        let surface_capabilities = surface.get_capabilities(&adapter);
        let format = surface_capabilities
            .formats
            .iter()
            .copied()
            .find(|f| !f.is_srgb())
            .unwrap_or(surface_capabilities.formats[0]);

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format,
            width: width.max(1),
            height: height.max(1),
            present_mode: wgpu::PresentMode::Fifo,
            alpha_mode: surface_capabilities.alpha_modes[0],
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        let depth_texture =
            TextureResource::create_depth_texture(&device, &config, "depth_texture");

        let scene_layout = uniforms::scene_uniform_schema()
            .layout()
            .expect("scene uniform schema is well-formed");
        let material_layout = uniforms::material_uniform_schema()
            .layout()
            .expect("material uniform schema is well-formed");
        let light_layout = uniforms::light_block_schema()
            .layout()
            .expect("light block schema is well-formed");
        let background_layout = uniforms::background_uniform_schema()
            .layout()
            .expect("background uniform schema is well-formed");

        let scene_bind_layout = BindGroupLayoutBuilder::new()
            .next_binding_rendering(binding_types::uniform())
            .create(&device, "Scene Bind Group Layout");

        let material_bind_layout = BindGroupLayoutBuilder::new()
            .next_binding_fragment(binding_types::uniform())
            .next_binding_fragment(binding_types::color_texture_2d())
            .next_binding_fragment(binding_types::filtering_sampler())
            .next_binding_fragment(binding_types::color_texture_2d())
            .next_binding_fragment(binding_types::filtering_sampler())
            .create(&device, "Material Bind Group Layout");

        let mut light_layout_builder = BindGroupLayoutBuilder::new()
            .next_binding_fragment(binding_types::readonly_storage())
            .next_binding_fragment(binding_types::cube_texture())
            .next_binding_fragment(binding_types::filtering_sampler());
        for _ in 0..Self::MAX_SHADOW_MAPS {
            light_layout_builder =
                light_layout_builder.next_binding_fragment(binding_types::depth_texture_2d());
        }
        let light_bind_layout = light_layout_builder
            .next_binding_fragment(binding_types::comparison_sampler())
            .create(&device, "Light Bind Group Layout");

        let background_bind_layout = BindGroupLayoutBuilder::new()
            .next_binding_fragment(binding_types::uniform())
            .next_binding_fragment(binding_types::cube_texture())
            .next_binding_fragment(binding_types::filtering_sampler())
            .create(&device, "Background Bind Group Layout");

        let device: Arc<wgpu::Device> = device.into();
        let queue: Arc<wgpu::Queue> = queue.into();
        let mut pipeline_manager = PipelineManager::new(device.clone());

        pipeline_manager.load_shader("pbr", include_str!("pbr.wgsl"));
        pipeline_manager.load_shader("shadow", include_str!("shadow_pass.wgsl"));
        pipeline_manager.load_shader("background", include_str!("background.wgsl"));

        let color_target = Some(wgpu::ColorTargetState {
            format,
            blend: Some(wgpu::BlendState::REPLACE),
            write_mask: wgpu::ColorWrites::ALL,
        });

        // Depth-only shadow pass; no culling to avoid light leaks, biased
        // against acne.
        pipeline_manager.register(
            SHADOW_PIPELINE,
            PipelineConfig::new("shadow")
                .with_label("SHADOW")
                .with_depth(DepthState::biased(TextureResource::DEPTH_FORMAT, 2, 2.0))
                .depth_only()
                .without_culling()
                .with_layouts(vec![scene_bind_layout.layout.clone()]),
        );

        pipeline_manager.register(
            MAIN_PIPELINE,
            PipelineConfig::new("pbr")
                .with_label("MAIN")
                .with_depth(DepthState::standard(TextureResource::DEPTH_FORMAT))
                .with_layouts(vec![
                    scene_bind_layout.layout.clone(),
                    material_bind_layout.layout.clone(),
                    light_bind_layout.layout.clone(),
                ])
                .with_color_targets(vec![color_target.clone()]),
        );

        // Fullscreen environment pass drawn at the far plane.
        pipeline_manager.register(
            BACKGROUND_PIPELINE,
            PipelineConfig::new("background")
                .with_label("BACKGROUND")
                .with_depth(DepthState {
                    format: TextureResource::DEPTH_FORMAT,
                    write: false,
                    compare: wgpu::CompareFunction::LessEqual,
                    bias: wgpu::DepthBiasState::default(),
                })
                .without_culling()
                .fullscreen()
                .with_layouts(vec![background_bind_layout.layout.clone()])
                .with_color_targets(vec![color_target]),
        );

        if let Err(errors) = pipeline_manager.build_pending() {
            for error in &errors {
                log::error!("{error}");
            }
            panic!("Failed to create render pipelines");
        }

        log::info!("renderer initialized ({}x{}, {:?})", width, height, format);

        Renderer {
            surface,
            device,
            queue,
            config,
            format,
            depth_texture,
            pipeline_manager,
            scene_layout,
            material_layout,
            light_layout,
            background_layout,
            scene_bind_layout,
            material_bind_layout,
            light_bind_layout,
            background_bind_layout,
            textures: Registry::new(),
            samplers: Registry::new(),
            gpu_meshes: Registry::new(),
            shadow_targets: Registry::new(),
            material_bindings: Registry::new(),
            draw_uniforms: Registry::new(),
            shadow_draw_uniforms: Registry::new(),
            shadow_slots: Vec::new(),
            light_buffer: None,
            light_bind_group: None,
            background_buffer: None,
            background_bind_group: None,
        }
    }

    /// Uploads every scene resource: textures, meshes, shadow targets,
    /// material and per-draw bindings, and the light storage block.
    ///
    /// Runs once, inside the awaited initialization phase. Materials that
    /// reference unregistered textures or samplers fail here, naming the
    /// missing key; ambient and shadow slots fall back to reserved
    /// placeholders instead.
    pub fn upload_scene(&mut self, scene: &Scene) -> Result<(), RenderError> {
        let device = self.device.clone();
        let queue = self.queue.clone();

        // Reserved resources exist regardless of scene content.
        self.textures.insert(
            ReservedKey::PlaceholderTexture,
            TextureResource::create_from_rgba(
                &device,
                &queue,
                &[255, 255, 255, 255],
                1,
                1,
                "Placeholder Texture",
            ),
        );
        self.textures.insert(
            ReservedKey::PlaceholderDepth,
            TextureResource::create_placeholder_depth(&device),
        );
        self.textures
            .insert(ReservedKey::DepthBuffer, self.depth_texture.clone());
        self.samplers
            .insert(ReservedKey::DefaultSampler, create_default_sampler(&device));
        self.samplers
            .insert(ReservedKey::ShadowSampler, create_shadow_sampler(&device));

        for (key, source) in scene.texture_sources.iter() {
            self.textures.insert(
                key.clone(),
                TextureResource::create_from_source(&device, &queue, source, &key.to_string()),
            );
        }

        // The ambient cube comes from the first irradiance probe whose
        // output names a supplied texture; otherwise a dim solid fallback.
        let irradiance_source = scene
            .probes
            .iter()
            .find(|(_, probe)| probe.kind == ProbeKind::Irradiance)
            .and_then(|(_, probe)| scene.texture_sources.get_named(&probe.output));
        let irradiance = match irradiance_source {
            Some(source) => {
                TextureResource::create_cube_from_source(&device, &queue, source, "Irradiance Map")
            }
            None => TextureResource::create_cube_from_source(
                &device,
                &queue,
                &crate::gfx::scene::TextureSource::Solid([24, 26, 32, 255]),
                "Irradiance Map",
            ),
        };
        self.textures.insert(ReservedKey::IrradianceMap, irradiance);

        for (key, mesh) in scene.meshes.iter() {
            self.gpu_meshes
                .insert(key.clone(), GpuMesh::upload(&device, mesh, &key.to_string()));
        }

        for (key, light) in scene.lights.iter() {
            if light.casts_shadow {
                self.shadow_targets.insert(
                    key.clone(),
                    TextureResource::create_shadow_map(
                        &device,
                        SHADOW_MAP_SIZE,
                        &format!("{key} Shadow Map"),
                    ),
                );
            }
        }

        self.shadow_slots = shadow::assign_shadow_slots(
            scene.lights.iter(),
            |key| self.shadow_targets.contains_key(key),
            Self::MAX_SHADOW_MAPS,
        );

        for (key, material) in scene.materials.iter() {
            let mut buffer = RawBuffer::new_uniform(
                &device,
                self.material_layout.size,
                &format!("{key} Material Uniforms"),
            );
            buffer.update_content(
                &queue,
                &uniforms::pack_material_uniforms(&self.material_layout, material)?,
            );

            let albedo = self
                .textures
                .get(&material.albedo_map)
                .ok_or_else(|| RenderError::MissingTexture(material.albedo_map.clone()))?;
            let albedo_sampler = self
                .samplers
                .get(&material.albedo_sampler)
                .ok_or_else(|| RenderError::MissingSampler(material.albedo_sampler.clone()))?;
            let roughness = self
                .textures
                .get(&material.roughness_map)
                .ok_or_else(|| RenderError::MissingTexture(material.roughness_map.clone()))?;
            let roughness_sampler = self
                .samplers
                .get(&material.roughness_sampler)
                .ok_or_else(|| RenderError::MissingSampler(material.roughness_sampler.clone()))?;

            let bind_group = BindGroupBuilder::new(&self.material_bind_layout)
                .resource(buffer.binding_resource())
                .texture(&albedo.view)
                .sampler(albedo_sampler)
                .texture(&roughness.view)
                .sampler(roughness_sampler)
                .create(&device, &format!("{key} Material Bind Group"));

            self.material_bindings.insert(
                key.clone(),
                MaterialBinding {
                    _buffer: buffer,
                    bind_group,
                },
            );
        }

        for (key, _) in scene.meshes.iter() {
            self.draw_uniforms.insert(
                key.clone(),
                Self::create_draw_uniforms(
                    &device,
                    &self.scene_bind_layout,
                    self.scene_layout.size,
                    &key.to_string(),
                ),
            );
        }

        for (light_key, _) in self.shadow_targets.iter() {
            let mut per_mesh = Registry::new();
            for (mesh_key, _) in scene.meshes.iter() {
                per_mesh.insert(
                    mesh_key.clone(),
                    Self::create_draw_uniforms(
                        &device,
                        &self.scene_bind_layout,
                        self.scene_layout.size,
                        &format!("{light_key}/{mesh_key}"),
                    ),
                );
            }
            self.shadow_draw_uniforms.insert(light_key.clone(), per_mesh);
        }

        let light_count = scene.lights.len();
        let mut light_buffer = RawBuffer::new_storage(
            &device,
            self.light_layout.total_size(light_count),
            "Light Block",
        );
        let lights: Vec<_> = scene
            .lights
            .iter()
            .zip(self.shadow_slots.iter())
            .map(|((_, light), slot)| (light, *slot))
            .collect();
        light_buffer.update_content(
            &queue,
            &uniforms::pack_light_block(&self.light_layout, &lights)?,
        );

        let irradiance = self
            .textures
            .get(&ReservedKey::IrradianceMap.into())
            .ok_or_else(|| RenderError::MissingTexture(ReservedKey::IrradianceMap.into()))?;
        let default_sampler = self
            .samplers
            .get(&ReservedKey::DefaultSampler.into())
            .ok_or_else(|| RenderError::MissingSampler(ReservedKey::DefaultSampler.into()))?;
        let shadow_sampler = self
            .samplers
            .get(&ReservedKey::ShadowSampler.into())
            .ok_or_else(|| RenderError::MissingSampler(ReservedKey::ShadowSampler.into()))?;
        let placeholder_depth = self
            .textures
            .get(&ReservedKey::PlaceholderDepth.into())
            .ok_or_else(|| RenderError::MissingTexture(ReservedKey::PlaceholderDepth.into()))?;

        // Slot order: the light holding slot i supplies view i; unused
        // slots sample the placeholder.
        let mut slot_views = vec![&placeholder_depth.view; Self::MAX_SHADOW_MAPS];
        for ((light_key, _), slot) in scene.lights.iter().zip(self.shadow_slots.iter()) {
            if *slot >= 0 {
                let target = self
                    .shadow_targets
                    .get(light_key)
                    .ok_or_else(|| RenderError::MissingShadowTarget(light_key.clone()))?;
                slot_views[*slot as usize] = &target.view;
            }
        }

        let mut light_group_builder = BindGroupBuilder::new(&self.light_bind_layout)
            .resource(light_buffer.binding_resource())
            .texture(&irradiance.view)
            .sampler(default_sampler);
        for view in &slot_views {
            light_group_builder = light_group_builder.texture(view);
        }
        let light_bind_group =
            light_group_builder.sampler(shadow_sampler).create(&device, "Light Bind Group");

        let background_buffer = RawBuffer::new_uniform(
            &device,
            self.background_layout.size,
            "Background Uniforms",
        );
        let background_bind_group = BindGroupBuilder::new(&self.background_bind_layout)
            .resource(background_buffer.binding_resource())
            .texture(&irradiance.view)
            .sampler(default_sampler)
            .create(&device, "Background Bind Group");

        self.light_buffer = Some(light_buffer);
        self.light_bind_group = Some(light_bind_group);
        self.background_buffer = Some(background_buffer);
        self.background_bind_group = Some(background_bind_group);

        log::info!(
            "scene uploaded: {} meshes, {} materials, {} lights ({} shadowed)",
            self.gpu_meshes.len(),
            self.material_bindings.len(),
            light_count,
            self.shadow_targets.len()
        );
        Ok(())
    }

    fn create_draw_uniforms(
        device: &wgpu::Device,
        layout: &BindGroupLayoutWithDesc,
        size: u64,
        label: &str,
    ) -> DrawUniforms {
        let buffer = RawBuffer::new_uniform(device, size, &format!("{label} Scene Uniforms"));
        let bind_group = BindGroupBuilder::new(layout)
            .resource(buffer.binding_resource())
            .create(device, &format!("{label} Scene Bind Group"));
        DrawUniforms { buffer, bind_group }
    }

    /// Renders one frame: shadow phase, then the main pass sequence.
    pub fn render(&mut self, scene: &mut Scene) -> Result<(), RenderError> {
        scene.update_world_transforms();
        self.write_frame_uniforms(scene)?;

        let surface_texture = self.surface.get_current_texture()?;
        let surface_view = surface_texture
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Frame Encoder"),
            });

        self.encode_shadow_passes(scene, &mut encoder)?;
        self.encode_main_passes(scene, &mut encoder, &surface_view)?;

        self.queue.submit(std::iter::once(encoder.finish()));
        surface_texture.present();
        Ok(())
    }

    /// Writes every per-frame buffer before command encoding starts.
    fn write_frame_uniforms(&mut self, scene: &Scene) -> Result<(), RenderError> {
        let view = scene.camera.view_matrix();
        let projection = scene.camera.projection_matrix();
        let camera_position = scene.camera.homogeneous_position();

        for (key, mesh) in scene.meshes.iter() {
            if let Some(draw) = self.draw_uniforms.get_mut(key) {
                let bytes = uniforms::pack_scene_uniforms(
                    &self.scene_layout,
                    view,
                    projection,
                    mesh.transform.model_matrix(),
                    mesh.transform.world_matrix(),
                    camera_position,
                )?;
                draw.buffer.update_content(&self.queue, &bytes);
            }
        }

        let light_projection = shadow::light_projection_matrix();
        for (light_key, per_mesh) in self.shadow_draw_uniforms.iter_mut() {
            let Some(light) = scene.lights.get(light_key) else {
                continue;
            };
            let light_view = shadow::light_view_matrix(light);
            for (mesh_key, draw) in per_mesh.iter_mut() {
                let Some(mesh) = scene.meshes.get(mesh_key) else {
                    continue;
                };
                let bytes = uniforms::pack_scene_uniforms(
                    &self.scene_layout,
                    light_view,
                    light_projection,
                    mesh.transform.model_matrix(),
                    mesh.transform.world_matrix(),
                    light.homogeneous_position(),
                )?;
                draw.buffer.update_content(&self.queue, &bytes);
            }
        }

        let lights: Vec<_> = scene
            .lights
            .iter()
            .zip(self.shadow_slots.iter())
            .map(|((_, light), slot)| (light, *slot))
            .collect();
        let light_bytes = uniforms::pack_light_block(&self.light_layout, &lights)?;
        self.light_buffer
            .as_mut()
            .ok_or(RenderError::SceneNotUploaded)?
            .update_content(&self.queue, &light_bytes);

        let background_bytes = uniforms::pack_background_uniforms(
            &self.background_layout,
            view,
            projection,
            camera_position,
        )?;
        self.background_buffer
            .as_mut()
            .ok_or(RenderError::SceneNotUploaded)?
            .update_content(&self.queue, &background_bytes);

        Ok(())
    }

    /// Phase 1: one depth-only pass per shadow-casting light, drawing the
    /// main pipeline's mesh set with that light's camera.
    fn encode_shadow_passes(
        &self,
        scene: &Scene,
        encoder: &mut wgpu::CommandEncoder,
    ) -> Result<(), RenderError> {
        let pipeline = self
            .pipeline_manager
            .get(SHADOW_PIPELINE)
            .ok_or_else(|| RenderError::MissingPipeline(SHADOW_PIPELINE.to_string()))?;

        for (light_key, per_mesh) in self.shadow_draw_uniforms.iter() {
            let target = self
                .shadow_targets
                .get(light_key)
                .ok_or_else(|| RenderError::MissingShadowTarget(light_key.clone()))?;

            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Shadow Pass"),
                color_attachments: &[],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &target.view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                occlusion_query_set: None,
                timestamp_writes: None,
            });
            pass.set_pipeline(pipeline);

            for (pipeline_name, group_key) in &scene.passes {
                if pipeline_name != MAIN_PIPELINE {
                    continue;
                }
                let group = scene
                    .groups
                    .get_named(group_key)
                    .ok_or_else(|| RenderError::MissingGroup(group_key.clone()))?;
                for mesh_key in group.mesh_keys() {
                    let draw = per_mesh
                        .get_named(mesh_key)
                        .ok_or_else(|| RenderError::MissingMesh(mesh_key.to_string()))?;
                    let gpu_mesh = self
                        .gpu_meshes
                        .get_named(mesh_key)
                        .ok_or_else(|| RenderError::MissingMesh(mesh_key.to_string()))?;
                    pass.set_bind_group(0, &draw.bind_group, &[]);
                    pass.set_vertex_buffer(0, gpu_mesh.vertex_buffer.slice(..));
                    pass.set_index_buffer(gpu_mesh.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
                    pass.draw_indexed(0..gpu_mesh.index_count, 0, 0..1);
                }
            }
        }
        Ok(())
    }

    /// Phase 2: the association list in registration order, into the
    /// shared canvas + depth target. The first pass clears; the rest load.
    fn encode_main_passes(
        &self,
        scene: &Scene,
        encoder: &mut wgpu::CommandEncoder,
        surface_view: &wgpu::TextureView,
    ) -> Result<(), RenderError> {
        let light_bind_group = self
            .light_bind_group
            .as_ref()
            .ok_or(RenderError::SceneNotUploaded)?;
        let background_bind_group = self
            .background_bind_group
            .as_ref()
            .ok_or(RenderError::SceneNotUploaded)?;

        let mut cleared = false;
        for (pipeline_name, group_key) in &scene.passes {
            let pipeline = self
                .pipeline_manager
                .get(pipeline_name)
                .ok_or_else(|| RenderError::MissingPipeline(pipeline_name.clone()))?;

            let (color_load, depth_load) = if cleared {
                (wgpu::LoadOp::Load, wgpu::LoadOp::Load)
            } else {
                (wgpu::LoadOp::Clear(Self::CLEAR_COLOR), wgpu::LoadOp::Clear(1.0))
            };
            cleared = true;

            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some(pipeline_name),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: surface_view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: color_load,
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.depth_texture.view,
                    depth_ops: Some(wgpu::Operations {
                        load: depth_load,
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                occlusion_query_set: None,
                timestamp_writes: None,
            });
            pass.set_pipeline(pipeline);

            if pipeline_name == BACKGROUND_PIPELINE {
                pass.set_bind_group(0, background_bind_group, &[]);
                pass.draw(0..3, 0..1);
                continue;
            }

            pass.set_bind_group(2, light_bind_group, &[]);

            let group = scene
                .groups
                .get_named(group_key)
                .ok_or_else(|| RenderError::MissingGroup(group_key.clone()))?;
            for mesh_key in group.mesh_keys() {
                let mesh = scene
                    .meshes
                    .get_named(mesh_key)
                    .ok_or_else(|| RenderError::MissingMesh(mesh_key.to_string()))?;
                let draw = self
                    .draw_uniforms
                    .get_named(mesh_key)
                    .ok_or_else(|| RenderError::MissingMesh(mesh_key.to_string()))?;
                let material = self
                    .material_bindings
                    .get_named(&mesh.material)
                    .ok_or_else(|| RenderError::MissingMaterial(mesh.material.clone()))?;
                let gpu_mesh = self
                    .gpu_meshes
                    .get_named(mesh_key)
                    .ok_or_else(|| RenderError::MissingMesh(mesh_key.to_string()))?;

                pass.set_bind_group(0, &draw.bind_group, &[]);
                pass.set_bind_group(1, &material.bind_group, &[]);
                pass.set_vertex_buffer(0, gpu_mesh.vertex_buffer.slice(..));
                pass.set_index_buffer(gpu_mesh.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
                pass.draw_indexed(0..gpu_mesh.index_count, 0, 0..1);
            }
        }
        Ok(())
    }

    /// Resizes the surface and recreates the depth texture.
    ///
    /// Nothing else is recreated; shadow maps keep their fixed resolution.
    pub fn resize(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }
        self.config.width = width;
        self.config.height = height;
        self.surface.configure(&self.device, &self.config);
        self.depth_texture =
            TextureResource::create_depth_texture(&self.device, &self.config, "depth_texture");
        self.textures
            .insert(ReservedKey::DepthBuffer, self.depth_texture.clone());
    }

    /// Reconfigures the surface after a lost/outdated frame.
    pub fn reconfigure(&mut self) {
        self.surface.configure(&self.device, &self.config);
    }

    pub fn get_surface_size(&self) -> (u32, u32) {
        (self.config.width, self.config.height)
    }

    pub fn device(&self) -> &wgpu::Device {
        &self.device
    }

    pub fn queue(&self) -> &wgpu::Queue {
        &self.queue
    }

    pub fn surface_format(&self) -> wgpu::TextureFormat {
        self.format
    }
}
