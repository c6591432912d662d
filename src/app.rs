//! Application host and frame scheduling
//!
//! Owns the winit event loop and drives the renderer once per display
//! refresh. Each frame schedules the next only after completing its own
//! work, so frames never overlap; closing the window flips the running
//! flag and cancels further scheduling.

use std::sync::Arc;

use winit::{
    application::ApplicationHandler,
    event::{DeviceEvent, DeviceId, WindowEvent},
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    window::{Window, WindowAttributes, WindowId},
};

use crate::gfx::camera::CameraController;
use crate::gfx::rendering::{RenderError, Renderer};
use crate::gfx::scene::{Scene, SceneDescription};

pub struct GlintApp {
    event_loop: Option<EventLoop<()>>,
    app_state: AppState,
}

struct AppState {
    window: Option<Arc<Window>>,
    renderer: Option<Renderer>,
    scene: Scene,
    controller: CameraController,
    running: bool,
}

impl AppState {
    /// Flips the running flag; the current frame finishes but no further
    /// redraw is scheduled.
    fn stop(&mut self) {
        self.running = false;
    }
}

impl GlintApp {
    /// Builds the CPU scene from a supplier description. GPU init happens
    /// when the event loop resumes and a window exists.
    pub fn new(description: SceneDescription) -> anyhow::Result<Self> {
        let _ = env_logger::try_init();

        let event_loop = EventLoop::new()?;
        let scene = Scene::from_description(description)?;

        Ok(Self {
            event_loop: Some(event_loop),
            app_state: AppState {
                window: None,
                renderer: None,
                scene,
                controller: CameraController::new(0.005, 0.1),
                running: false,
            },
        })
    }

    pub fn scene(&self) -> &Scene {
        &self.app_state.scene
    }

    pub fn scene_mut(&mut self) -> &mut Scene {
        &mut self.app_state.scene
    }

    /// Runs the application (consumes self and starts the event loop).
    pub fn run(mut self) -> anyhow::Result<()> {
        let event_loop = self.event_loop.take().expect("Event loop already consumed");
        event_loop.set_control_flow(ControlFlow::Poll);
        event_loop.run_app(&mut self.app_state)?;
        Ok(())
    }
}

impl ApplicationHandler for AppState {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }

        if let Ok(window) = event_loop.create_window(
            WindowAttributes::default().with_inner_size(winit::dpi::LogicalSize::new(1200, 800)),
        ) {
            let window_handle = Arc::new(window);
            self.window = Some(window_handle.clone());

            let (width, height) = window_handle.inner_size().into();

            // The whole async init phase is awaited here; every GPU
            // resource exists before the first frame.
            let window_clone = window_handle.clone();
            let mut renderer = pollster::block_on(async move {
                Renderer::new(window_clone, width, height).await
            });

            self.scene
                .camera
                .set_aspect(width as f32 / (height as f32).max(1.0));

            if let Err(error) = renderer.upload_scene(&self.scene) {
                log::error!("scene upload failed: {error}");
                event_loop.exit();
                return;
            }

            self.renderer = Some(renderer);
            self.running = true;
            window_handle.request_redraw();
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        match event {
            WindowEvent::CloseRequested => {
                self.stop();
                event_loop.exit();
            }
            WindowEvent::Resized(size) => {
                if let Some(renderer) = self.renderer.as_mut() {
                    renderer.resize(size.width, size.height);
                }
                self.scene
                    .camera
                    .set_aspect(size.width as f32 / (size.height as f32).max(1.0));
            }
            WindowEvent::KeyboardInput { event, .. } => {
                self.controller.handle_key_event(&event);
            }
            WindowEvent::RedrawRequested => {
                let Some(renderer) = self.renderer.as_mut() else {
                    return;
                };
                match renderer.render(&mut self.scene) {
                    Ok(()) => {}
                    Err(RenderError::Surface(
                        wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated,
                    )) => renderer.reconfigure(),
                    Err(RenderError::Surface(wgpu::SurfaceError::OutOfMemory)) => {
                        log::error!("out of GPU memory, stopping");
                        self.stop();
                        event_loop.exit();
                    }
                    // A failed bind aborts this frame's remaining passes;
                    // the next frame starts clean.
                    Err(error) => log::error!("frame aborted: {error}"),
                }

                if self.running {
                    if let Some(window) = &self.window {
                        window.request_redraw();
                    }
                }
            }
            _ => {}
        }
    }

    fn device_event(
        &mut self,
        _event_loop: &ActiveEventLoop,
        _device_id: DeviceId,
        event: DeviceEvent,
    ) {
        if let Some(window) = &self.window {
            self.controller
                .handle_device_event(&event, window, &mut self.scene.camera);
        }
    }
}
