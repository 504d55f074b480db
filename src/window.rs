//! Window, event loop and the mounted scene.
//!
//! [`run`] opens one window and drives the [`ComposerState`] machine from
//! winit events: `resumed` mounts, `RedrawRequested` runs a frame,
//! `CloseRequested` unmounts and exits.

use std::sync::Arc;

use glam::{Vec2, Vec3};
use tracing::{debug, error, info, trace, warn};
use winit::{
    application::ApplicationHandler,
    event::WindowEvent,
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    window::{Window, WindowId},
};

use crate::camera::PerspectiveCamera;
use crate::composer::{text_rotation, ComposerState};
use crate::config::SceneConfig;
use crate::error::{GpuError, SceneError};
use crate::force::{pointer_to_scene, POINTER_SCALE};
use crate::gpu::{
    GpuContext, ParticleRenderer, PostChainState, SceneBindings, SkyRenderer, SpriteTexture, TextRenderer,
};
use crate::lights::Lights;
use crate::material::text_transform;
use crate::particles::ParticleSystem;
use crate::pointer::{PointerHandle, PointerTracker};
use crate::text::{TextLoader, TextStyle};
use crate::time::FrameClock;

const WINDOW_TITLE: &str = "driftfield";

/// Everything that exists between mount and unmount.
struct Scene {
    gpu: GpuContext,
    camera: PerspectiveCamera,
    bindings: SceneBindings,
    sky: SkyRenderer,
    particles: ParticleSystem,
    particle_renderer: ParticleRenderer,
    text: Option<TextRenderer>,
    text_loader: TextLoader,
    post: PostChainState,
    clock: FrameClock,
    pointer: PointerHandle,
    config: SceneConfig,
}

impl Scene {
    fn mount(window: Arc<Window>, config: &SceneConfig, pointer: PointerHandle) -> Result<Self, GpuError> {
        let logical = window.inner_size().to_logical::<f64>(window.scale_factor());
        let gpu = pollster::block_on(GpuContext::new(window))?;
        let (width, height) = (gpu.config.width, gpu.config.height);

        let camera = PerspectiveCamera::new(
            config.camera.fov_degrees,
            width as f32 / height as f32,
            config.camera.near,
            config.camera.far,
        )
        .at(Vec3::new(0.0, 0.0, config.camera.z));

        let count = config.particles.count.resolve(logical.width, logical.height);
        let particles = ParticleSystem::spawn(
            count,
            config.particles.motion.clone(),
            config.particles.force_law.build(),
            &camera,
        );

        let bindings = SceneBindings::new(&gpu.device, &camera, &Lights::default());
        let sky = SkyRenderer::new(&gpu.device, &bindings.layout, &config.sky);
        let sprite = SpriteTexture::load(&gpu.device, &gpu.queue, &config.particles.sprite_path);
        let particle_renderer = ParticleRenderer::new(
            &gpu.device,
            &bindings.layout,
            sprite,
            &particles,
            config.particles.size,
        );
        let post = PostChainState::new(&gpu.device, &config.post, width, height, gpu.config.format);

        let text_loader = TextLoader::spawn(
            config.text.font_path.clone(),
            config.text.content.clone(),
            TextStyle {
                size: config.text.size,
                depth: config.text.depth,
                curve_segments: config.text.curve_segments,
                bevel: config.text.bevel,
            },
        );

        info!(
            "Mounted scene: {} particles, {:.0}x{:.0} viewport, {:?} post chain",
            count, logical.width, logical.height, config.post.chain
        );

        Ok(Self {
            gpu,
            camera,
            bindings,
            sky,
            particles,
            particle_renderer,
            text: None,
            text_loader,
            post,
            clock: FrameClock::new(),
            pointer,
            config: config.clone(),
        })
    }

    fn resize(&mut self, width: u32, height: u32) {
        if !self.gpu.resize(width, height) {
            return;
        }
        self.camera.set_viewport(width as f32, height as f32);
        self.post.resize(&self.gpu.device, width, height);
        debug!("Resized to {}x{}", width, height);
    }

    fn viewport(&self) -> Vec2 {
        Vec2::new(self.gpu.config.width as f32, self.gpu.config.height as f32)
    }

    /// Attach the text mesh once the background loader delivers it.
    fn poll_text(&mut self) {
        if !self.text_loader.is_pending() {
            return;
        }
        match self.text_loader.poll() {
            Some(Ok(mesh)) => {
                info!("Text mesh ready: {} triangles", mesh.triangle_count());
                let renderer = TextRenderer::new(&self.gpu.device, &self.bindings.layout, &self.config.text, &mesh);
                self.text = Some(renderer);
            }
            Some(Err(e)) => warn!("Text unavailable: {}", e),
            None => {}
        }
    }

    /// One frame: time, text tilt, particle tick, render.
    fn frame(&mut self) -> Result<(), wgpu::SurfaceError> {
        let time = self.clock.tick();
        let pointer_ndc = self.pointer.latest().to_ndc(self.viewport());
        trace!("Frame {} at {:.3}s", self.clock.frame(), time);
        if self.clock.fps_updated() {
            debug!("{:.1} fps ({:.2} ms last frame)", self.clock.fps(), self.clock.delta() * 1000.0);
        }

        self.poll_text();
        if let Some(text) = &self.text {
            text.set_time(&self.gpu.queue, time);
            let (rotation_x, rotation_y) = text_rotation(pointer_ndc, self.config.text.max_rotation);
            let translation = Vec3::new(0.0, 0.0, self.config.text.z);
            text.set_transform(&self.gpu.queue, text_transform(translation, rotation_x, rotation_y));
        }

        let pointer = pointer_to_scene(&self.camera, pointer_ndc, POINTER_SCALE);
        self.particles.tick(&self.camera, pointer);

        self.bindings.update_camera(&self.gpu.queue, &self.camera);
        self.particle_renderer.upload(&self.gpu.queue, &self.particles);
        self.render()
    }

    fn render(&self) -> Result<(), wgpu::SurfaceError> {
        let output = self.gpu.surface.get_current_texture()?;
        let view = output.texture.create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = self.gpu.device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("Render Encoder"),
        });

        {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Scene Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: self.post.scene_view(),
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: self.post.depth_view(),
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                timestamp_writes: None,
                occlusion_query_set: None,
            });

            let scene_bind_group = &self.bindings.bind_group;
            self.sky.draw(&mut pass, scene_bind_group);
            if let Some(text) = &self.text {
                text.draw(&mut pass, scene_bind_group);
            }
            // after the text so sprites blend over it
            self.particle_renderer.draw(&mut pass, scene_bind_group);
        }

        self.post.run(&mut encoder, &view);

        self.gpu.queue.submit(std::iter::once(encoder.finish()));
        output.present();
        Ok(())
    }
}

struct App {
    config: SceneConfig,
    window: Option<Arc<Window>>,
    scene: Option<Scene>,
    state: ComposerState,
    pointer: PointerTracker,
    error: Option<SceneError>,
}

impl App {
    fn new(config: SceneConfig) -> Self {
        Self {
            config,
            window: None,
            scene: None,
            state: ComposerState::default(),
            pointer: PointerTracker::new(),
            error: None,
        }
    }

    fn fail(&mut self, event_loop: &ActiveEventLoop, error: SceneError) {
        error!("{}", error);
        self.error = Some(error);
        event_loop.exit();
    }

    fn unmount(&mut self, event_loop: &ActiveEventLoop) {
        if self.state.unmount() {
            // drops every GPU buffer and texture, and orphans the text loader
            self.scene = None;
            info!("Unmounted scene");
        }
        event_loop.exit();
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }

        let window_attrs = Window::default_attributes()
            .with_title(WINDOW_TITLE)
            .with_inner_size(winit::dpi::LogicalSize::new(1280, 720));
        let window = match event_loop.create_window(window_attrs) {
            Ok(window) => Arc::new(window),
            Err(e) => return self.fail(event_loop, e.into()),
        };
        self.window = Some(window.clone());

        match Scene::mount(window.clone(), &self.config, self.pointer.handle()) {
            Ok(scene) => {
                self.scene = Some(scene);
                self.state.mount();
                window.request_redraw();
            }
            Err(e) => self.fail(event_loop, e.into()),
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        if let WindowEvent::CloseRequested = event {
            self.unmount(event_loop);
            return;
        }
        if !self.state.accepts_frame() {
            return;
        }

        match event {
            WindowEvent::Resized(size) => {
                if let Some(scene) = &mut self.scene {
                    scene.resize(size.width, size.height);
                }
            }
            WindowEvent::CursorMoved { position, .. } => {
                self.pointer.record(position.x as f32, position.y as f32);
            }
            WindowEvent::RedrawRequested => {
                if !self.state.begin_frame() {
                    return;
                }
                let Some(scene) = &mut self.scene else {
                    return;
                };
                match scene.frame() {
                    Ok(()) => {}
                    Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                        warn!("Surface lost, reconfiguring");
                        scene.gpu.reconfigure();
                    }
                    Err(wgpu::SurfaceError::OutOfMemory) => {
                        error!("Out of GPU memory");
                        self.unmount(event_loop);
                        return;
                    }
                    Err(e) => warn!("Render error: {:?}", e),
                }
                if let Some(window) = &self.window {
                    window.request_redraw();
                }
            }
            _ => {}
        }
    }
}

/// Open the window and run the scene until it is closed.
pub fn run(config: SceneConfig) -> Result<(), SceneError> {
    config.validate()?;
    let event_loop = EventLoop::new()?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = App::new(config);
    event_loop.run_app(&mut app)?;

    match app.error.take() {
        Some(e) => Err(e),
        None => Ok(()),
    }
}
