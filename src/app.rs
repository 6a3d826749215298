//! Window, event loop and per-frame orchestration.

use std::sync::Arc;

use glam::Vec3;
use tracing::{debug, error, info, warn};
use winit::application::ApplicationHandler;
use winit::event::{ElementState, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::window::{Window, WindowAttributes, WindowId};

use crate::color::Color;
use crate::config::AppConfig;
use crate::error::AppError;
use crate::frame_loop::FrameLoop;
use crate::goal::{GoalDimensions, SceneAssembler, add_axes_helper};
use crate::gpu::GpuContext;
use crate::input::{Input, InputController};
use crate::material::TextureId;
use crate::mesh_pass::MeshPass;
use crate::orbit_camera::OrbitCamera;
use crate::scene_graph::SceneGraph;
use crate::texture::{DecodedImage, PendingTexture, Texture};
use crate::view_state::ViewState;

const CAMERA_START: Vec3 = Vec3::new(0.0, 0.0, 150.0);
const CAMERA_FOV: f32 = 75.0;
const BANNER_SIZE: (u32, u32) = (384, 64);

/// Opens the window and runs until it is closed.
///
/// # Example
/// ```no_run
/// goalpost::run(goalpost::AppConfig::new().title("Goal").axes(100.0)).unwrap();
/// ```
pub fn run(config: AppConfig) -> Result<(), AppError> {
    let event_loop = EventLoop::new()?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = GoalApp::Pending { config };
    event_loop.run_app(&mut app)?;

    match app {
        GoalApp::Failed(e) => Err(e),
        _ => Ok(()),
    }
}

enum GoalApp {
    Pending { config: AppConfig },
    Running(Box<Running>),
    Failed(AppError),
}

/// Everything that lives between the first `resumed` and exit.
struct Running {
    window: Arc<Window>,
    gpu: GpuContext,
    mesh_pass: MeshPass,
    scene: SceneGraph,
    controller: InputController,
    view: ViewState,
    frame_loop: FrameLoop,
    orbit: OrbitCamera,
    input: Input,
    flag_texture: TextureId,
    pending_flag: Option<PendingTexture>,
    background: Color,
}

impl Running {
    fn start(event_loop: &ActiveEventLoop, config: &AppConfig) -> Result<Self, AppError> {
        let window_attrs = WindowAttributes::default()
            .with_title(&config.title)
            .with_inner_size(winit::dpi::LogicalSize::new(config.width, config.height));

        let window = Arc::new(event_loop.create_window(window_attrs)?);
        let gpu = GpuContext::new(window.clone())?;
        let mut mesh_pass = MeshPass::new(&gpu);

        let flag_texture = mesh_pass.reserve_texture();
        let mut scene = SceneGraph::new();
        let goal = SceneAssembler::new(GoalDimensions::default()).assemble(&mut scene, flag_texture);
        if let Some(length) = config.axes {
            add_axes_helper(&mut scene, length);
        }
        mesh_pass.sync(&gpu, &scene);

        let pending_flag = match &config.flag_texture {
            Some(path) => Some(PendingTexture::spawn(path.clone())),
            None => {
                let (width, height) = BANNER_SIZE;
                let banner = DecodedImage::banner(width, height);
                let texture = Texture::from_image(&gpu, &banner, "Flag Banner Texture");
                mesh_pass.set_texture(&gpu, flag_texture, texture);
                None
            }
        };

        info!(
            nodes = scene.len(),
            width = gpu.width(),
            height = gpu.height(),
            "scene ready"
        );

        Ok(Self {
            window,
            gpu,
            mesh_pass,
            scene,
            controller: InputController::new(goal),
            view: ViewState::new(),
            frame_loop: FrameLoop::new(goal.ball),
            orbit: OrbitCamera::looking_from(CAMERA_START, Vec3::ZERO).fov(CAMERA_FOV),
            input: Input::new(),
            flag_texture,
            pending_flag,
            background: config.background,
        })
    }

    /// Uploads the flag image once the loader thread delivers it.
    fn poll_flag(&mut self) {
        let Some(result) = self.pending_flag.as_ref().and_then(PendingTexture::poll) else {
            return;
        };
        let Some(pending) = self.pending_flag.take() else {
            return;
        };

        let max_dimension = self.gpu.device.limits().max_texture_dimension_2d;
        match result.and_then(|image| image.fits_within(max_dimension)) {
            Ok(image) => {
                let texture = Texture::from_image(&self.gpu, &image, "Flag Texture");
                self.mesh_pass.set_texture(&self.gpu, self.flag_texture, texture);
                info!(
                    path = %pending.path().display(),
                    width = image.width,
                    height = image.height,
                    "flag texture loaded"
                );
            }
            Err(e) => {
                warn!(path = %pending.path().display(), error = %e, "flag texture failed to load");
            }
        }
    }

    fn redraw(&mut self) -> Result<(), AppError> {
        self.window.request_redraw();
        self.poll_flag();

        self.frame_loop
            .update(&self.view, &mut self.scene, &mut self.orbit, &self.input);
        self.input.end_frame();

        self.mesh_pass.sync(&self.gpu, &self.scene);
        let camera = self.orbit.camera();
        match self
            .mesh_pass
            .render(&self.gpu, &self.scene, &camera, self.background)
        {
            Ok(()) => Ok(()),
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                debug!("surface lost, reconfiguring");
                self.gpu.reconfigure();
                Ok(())
            }
            Err(wgpu::SurfaceError::OutOfMemory) => Err(AppError::OutOfMemory),
            Err(e) => {
                warn!(error = %e, "frame skipped");
                Ok(())
            }
        }
    }
}

impl ApplicationHandler for GoalApp {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if let GoalApp::Pending { config } = self {
            *self = match Running::start(event_loop, config) {
                Ok(running) => GoalApp::Running(Box::new(running)),
                Err(e) => {
                    error!(error = %e, "startup failed");
                    event_loop.exit();
                    GoalApp::Failed(e)
                }
            };
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        let GoalApp::Running(app) = self else {
            return;
        };

        app.input.handle_event(&event);

        let outcome = match event {
            WindowEvent::CloseRequested => {
                event_loop.exit();
                Ok(())
            }
            WindowEvent::Resized(size) => {
                app.gpu.resize(size.width, size.height);
                Ok(())
            }
            WindowEvent::KeyboardInput { event, .. } if event.state == ElementState::Pressed => {
                app.controller
                    .handle_key(&event.logical_key, &mut app.view, &mut app.scene);
                Ok(())
            }
            WindowEvent::RedrawRequested => app.redraw(),
            _ => Ok(()),
        };

        if let Err(e) = outcome {
            error!(error = %e, "stopping");
            event_loop.exit();
            *self = GoalApp::Failed(e);
        }
    }
}
