//! Window creation and event handling via winit.
//!
//! Provides [`AppState`], which implements winit's [`ApplicationHandler`]
//! trait, and [`run_with_config`] to start the event loop.

use std::cell::RefCell;
use std::path::{Path, PathBuf};
use std::rc::Rc;
use std::sync::Arc;
use std::time::{Duration, Instant};

use pano_config::Config;
use pano_image::{DecodeOptions, DecodedImage};
use pano_layers::{DropPayload, DropTracker, LayerList, LayerStore, resolve_drop};
use pano_mesh::SphereParams;
use pano_render::{
    OrbitCamera, RenderContext, SphereRenderer, SurfaceError, TextureError,
    clear_color_from_srgb, init_render_context_blocking,
};
use tracing::{debug, error, info, instrument, warn};
use winit::application::ApplicationHandler;
use winit::event::{ElementState, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::keyboard::{Key, ModifiersState, NamedKey};
use winit::window::{Window, WindowAttributes, WindowId};

use crate::clock::TickClock;
use crate::viewer::{TextureSink, TickOutcome, ViewerState};

/// Returns [`WindowAttributes`] based on the given configuration.
pub fn window_attributes_from_config(config: &Config) -> WindowAttributes {
    WindowAttributes::default()
        .with_title(config.window.title.clone())
        .with_inner_size(winit::dpi::LogicalSize::new(
            config.window.width as f64,
            config.window.height as f64,
        ))
}

/// `Escape`, or `Ctrl+Q`.
pub fn is_quit_key(key: &Key, modifiers: ModifiersState) -> bool {
    match key {
        Key::Named(NamedKey::Escape) => true,
        Key::Character(c) => modifiers.control_key() && c.eq_ignore_ascii_case("q"),
        _ => false,
    }
}

/// Uploads decoded images through the sphere renderer.
struct RendererSink<'a> {
    ctx: &'a RenderContext,
    renderer: &'a mut SphereRenderer,
}

impl TextureSink for RendererSink<'_> {
    fn upload(&mut self, path: &Path, image: &DecodedImage) -> Result<(), TextureError> {
        let label = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "panorama".to_string());
        self.renderer.set_image(self.ctx, &label, image)
    }
}

/// Application state: window, GPU resources, the layer store and its observers.
pub struct AppState {
    pub window: Option<Arc<Window>>,
    pub gpu: Option<RenderContext>,
    pub renderer: Option<SphereRenderer>,
    pub config: Config,
    pub camera: OrbitCamera,
    pub store: LayerStore,
    viewer: Rc<RefCell<ViewerState>>,
    layer_list: Rc<RefCell<LayerList>>,
    drops: DropTracker,
    clock: TickClock,
    modifiers: ModifiersState,
    clear_color: wgpu::Color,
    tick_interval: Duration,
    next_tick: Instant,
    last_title: String,
}

impl AppState {
    /// Creates a new `AppState` from a [`Config`]. No window exists until
    /// the event loop resumes.
    pub fn with_config(config: Config) -> Self {
        let viewer = ViewerState::from_degrees_per_second(config.viewer.degrees_per_second as f64)
            .with_decode_options(DecodeOptions {
                halve_threshold: config.image.effective_threshold(),
                exr: config.image.enable_exr,
            });
        let viewer = Rc::new(RefCell::new(viewer));
        let layer_list = Rc::new(RefCell::new(LayerList::new()));

        // The viewer must see a change before the list redraws the title.
        let mut store = LayerStore::new();
        store.subscribe(viewer.clone());
        store.subscribe(layer_list.clone());
        let clock = TickClock::with_max_frame_time(config.viewer.max_tick_seconds);

        Self {
            window: None,
            gpu: None,
            renderer: None,
            camera: OrbitCamera::new(config.viewer.orbit_radius, config.viewer.fov_y_degrees),
            clear_color: clear_color_from_srgb(config.viewer.clear_color),
            tick_interval: Duration::from_millis(config.viewer.tick_interval_ms.max(1)),
            next_tick: Instant::now(),
            last_title: config.window.title.clone(),
            config,
            store,
            viewer,
            layer_list,
            drops: DropTracker::new(),
            clock,
            modifiers: ModifiersState::empty(),
        }
    }

    /// Queue `path` as the first layer, as if it had been dropped.
    pub fn with_initial_image(mut self, path: Option<PathBuf>) -> Self {
        if let Some(path) = path {
            self.store.set_active_path(path);
        }
        self
    }

    pub fn viewer(&self) -> std::cell::Ref<'_, ViewerState> {
        self.viewer.borrow()
    }

    /// Title combining the configured name, the layer list and the rotation.
    pub fn window_title(&self) -> String {
        format!(
            "{} | {}",
            self.layer_list.borrow().title(&self.config.window.title),
            self.viewer.borrow().status_line()
        )
    }

    /// Resolve a drop and make its path the active layer.
    ///
    /// Returns the accepted path; malformed drops leave the store untouched.
    pub fn apply_drop(&mut self, payload: &DropPayload) -> Option<PathBuf> {
        match resolve_drop(payload) {
            Ok(path) => {
                self.store.set_active_path(path.clone());
                Some(path)
            }
            Err(e) => {
                info!("Ignoring drop: {e}");
                None
            }
        }
    }

    fn initialize_rendering(&mut self, ctx: &RenderContext) {
        let params = SphereParams {
            nlat: self.config.mesh.nlat,
            nlon: self.config.mesh.nlon,
            radius: self.config.mesh.radius,
        };
        let mesh = params.build();
        info!(
            "Sphere mesh: {} vertices, {} quads",
            mesh.vertex_count(),
            mesh.quad_count()
        );

        self.camera.set_aspect_ratio(
            ctx.surface_config.width as f32,
            ctx.surface_config.height as f32,
        );
        self.renderer = Some(SphereRenderer::new(ctx, &mesh));
    }

    fn handle_resize(&mut self, width: u32, height: u32) {
        self.camera.set_aspect_ratio(width as f32, height as f32);
        if let Some(gpu) = &mut self.gpu {
            gpu.resize(width, height);
            if let Some(renderer) = &mut self.renderer {
                renderer.resize(&gpu.device, width, height);
            }
        }
    }

    /// One viewer tick followed by a render. Returns the surface error, if any.
    ///
    /// The orbit intentionally lags wall time in two places: the clock
    /// credits at most `viewer.max_tick_seconds` per tick, and a tick that
    /// decoded or skipped a layer resets the clock so the decode itself is
    /// never credited.
    fn tick_and_render(&mut self) -> Result<(), SurfaceError> {
        let elapsed = self.clock.tick();
        let (Some(gpu), Some(renderer)) = (&self.gpu, &mut self.renderer) else {
            return Ok(());
        };

        let outcome = {
            let mut sink = RendererSink {
                ctx: gpu,
                renderer: &mut *renderer,
            };
            self.viewer.borrow_mut().tick(elapsed, &mut sink)
        };
        if outcome != TickOutcome::Idle {
            // Do not credit the decode time to the rotation.
            self.clock.reset();
        }

        self.camera.angle = self.viewer.borrow().angle() as f32;
        renderer.render(gpu, &self.camera, self.clear_color)
    }

    fn update_title(&mut self) {
        let title = self.window_title();
        if title != self.last_title {
            if let Some(window) = &self.window {
                window.set_title(&title);
            }
            self.last_title = title;
        }
    }
}

impl ApplicationHandler for AppState {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }

        let attrs = window_attributes_from_config(&self.config);
        let window = match event_loop.create_window(attrs) {
            Ok(window) => Arc::new(window),
            Err(e) => {
                error!("Window creation failed: {e}");
                event_loop.exit();
                return;
            }
        };

        match init_render_context_blocking(window.clone(), self.config.window.vsync) {
            Ok(ctx) => {
                self.initialize_rendering(&ctx);
                self.gpu = Some(ctx);
            }
            Err(e) => {
                error!("GPU initialization failed: {e}");
                event_loop.exit();
                return;
            }
        }

        self.window = Some(window);
        self.clock.reset();
        self.next_tick = Instant::now();
        self.update_title();
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        match event {
            WindowEvent::CloseRequested => {
                info!("Close requested, shutting down");
                event_loop.exit();
            }
            WindowEvent::Resized(new_size) => {
                self.handle_resize(new_size.width, new_size.height);
            }
            WindowEvent::ModifiersChanged(modifiers) => {
                self.modifiers = modifiers.state();
            }
            WindowEvent::KeyboardInput { event, .. } => {
                if event.state == ElementState::Pressed
                    && is_quit_key(&event.logical_key, self.modifiers)
                {
                    info!("Quit requested");
                    event_loop.exit();
                }
            }
            WindowEvent::HoveredFile(path) => self.drops.on_hovered(path),
            WindowEvent::HoveredFileCancelled => self.drops.on_cancelled(),
            WindowEvent::DroppedFile(path) => self.drops.on_dropped(path),
            WindowEvent::RedrawRequested => {
                match self.tick_and_render() {
                    Ok(()) => {}
                    Err(SurfaceError::Lost) => {
                        if let Some(gpu) = &self.gpu {
                            let (w, h) = (gpu.surface_config.width, gpu.surface_config.height);
                            self.handle_resize(w, h);
                        }
                    }
                    Err(SurfaceError::OutOfMemory) => {
                        error!("GPU out of memory, exiting");
                        event_loop.exit();
                    }
                    Err(SurfaceError::Timeout) => {
                        debug!("Surface timeout, skipping frame");
                    }
                }
                self.update_title();
            }
            _ => {}
        }
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        // All files of one drop have arrived by now.
        if let Some(payload) = self.drops.take_payload() {
            self.apply_drop(&payload);
        }

        let now = Instant::now();
        if now >= self.next_tick {
            if let Some(window) = &self.window {
                window.request_redraw();
            }
            self.next_tick = now + self.tick_interval;
        }
        event_loop.set_control_flow(ControlFlow::WaitUntil(self.next_tick));
    }
}

/// Creates an event loop and runs the viewer until the window closes.
#[instrument(skip(config))]
pub fn run_with_config(
    config: Config,
    initial_image: Option<PathBuf>,
) -> Result<(), winit::error::EventLoopError> {
    let event_loop = EventLoop::new()?;
    let mut app = AppState::with_config(config).with_initial_image(initial_image);
    let result = event_loop.run_app(&mut app);
    if let Err(e) = &result {
        warn!("Event loop ended with error: {e}");
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_app_state_starts_without_window() {
        let state = AppState::with_config(Config::default());
        assert!(state.window.is_none());
        assert!(state.gpu.is_none());
        assert_eq!(state.store.observer_count(), 2);
        assert_eq!(state.tick_interval, Duration::from_millis(20));
    }

    #[test]
    fn test_camera_from_config() {
        let mut config = Config::default();
        config.viewer.orbit_radius = 2.5;
        config.viewer.fov_y_degrees = 60.0;
        let state = AppState::with_config(config);
        assert_eq!(state.camera.radius, 2.5);
        assert!((state.camera.fov_y - 60f32.to_radians()).abs() < 1e-6);
    }

    #[test]
    fn test_tick_limit_from_config() {
        let mut config = Config::default();
        config.viewer.max_tick_seconds = 1.5;
        let mut state = AppState::with_config(config);
        assert_eq!(state.clock.max_frame_time(), 1.5);
        assert_eq!(state.clock.tick_with(1.0), 1.0);

        let state = AppState::with_config(Config::default());
        assert_eq!(state.clock.max_frame_time(), crate::clock::MAX_FRAME_TIME);
    }

    #[test]
    fn test_default_clear_color_is_linear_panorama_blue() {
        let state = AppState::with_config(Config::default());
        let blue = pano_render::PANORAMA_BLUE;
        assert_eq!(state.clear_color.r, 0.0);
        assert_eq!(state.clear_color.g, 0.0);
        assert!((state.clear_color.b - blue.b).abs() < 1e-6);
        assert_eq!(state.clear_color.a, 1.0);
    }

    struct NullSink;

    impl TextureSink for NullSink {
        fn upload(&mut self, _path: &Path, _image: &DecodedImage) -> Result<(), TextureError> {
            Ok(())
        }
    }

    #[test]
    fn test_exr_disabled_in_config_is_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sky.exr");
        std::fs::write(&path, b"").unwrap();
        let mut config = Config::default();
        config.image.enable_exr = false;
        let mut state = AppState::with_config(config);

        assert_eq!(
            state.apply_drop(&DropPayload::from_paths([&path])),
            Some(path.clone())
        );
        match state.viewer.borrow_mut().tick(0.02, &mut NullSink) {
            TickOutcome::Skipped(skipped, reason) => {
                assert_eq!(skipped, path);
                assert!(reason.contains("'exr'"), "{reason}");
            }
            other => panic!("expected skip, got {other:?}"),
        }
    }

    #[test]
    fn test_drop_sets_active_layer_and_title() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pano.jpg");
        std::fs::write(&path, b"").unwrap();
        let mut state = AppState::with_config(Config::default());

        assert_eq!(
            state.apply_drop(&DropPayload::from_paths([&path])),
            Some(path.clone())
        );
        assert_eq!(state.store.active_path(), Some(path.as_path()));
        assert!(state.viewer().has_pending());
        assert!(state.window_title().starts_with("Panosphere - pano.jpg | rotation"));
    }

    #[test]
    fn test_rejected_drops_leave_store_unchanged() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a.png");
        std::fs::write(&path, b"").unwrap();
        let mut state = AppState::with_config(Config::default());
        state.apply_drop(&DropPayload::from_paths([&path]));
        state.viewer.borrow_mut().take_pending();

        assert_eq!(state.apply_drop(&DropPayload::default()), None);
        assert_eq!(
            state.apply_drop(&DropPayload::from_text("hello world, see attached")),
            None
        );
        assert_eq!(state.store.active_path(), Some(path.as_path()));
        assert!(!state.viewer().has_pending());
        assert_eq!(state.layer_list.borrow().changes(), 1);
        assert!(state.window_title().starts_with("Panosphere - a.png"));
    }

    #[test]
    fn test_initial_image_is_pending() {
        let state = AppState::with_config(Config::default())
            .with_initial_image(Some(PathBuf::from("/tmp/start.exr")));
        assert_eq!(state.store.active_path(), Some(Path::new("/tmp/start.exr")));
        assert!(state.viewer().has_pending());
    }

    #[test]
    fn test_title_without_layers() {
        let state = AppState::with_config(Config::default());
        assert_eq!(state.window_title(), "Panosphere | rotation 0.0°");
    }

    #[test]
    fn test_quit_keys() {
        let q = Key::Character("q".into());
        assert!(is_quit_key(&Key::Named(NamedKey::Escape), ModifiersState::empty()));
        assert!(is_quit_key(&q, ModifiersState::CONTROL));
        assert!(is_quit_key(&Key::Character("Q".into()), ModifiersState::CONTROL));
        assert!(!is_quit_key(&q, ModifiersState::empty()));
        assert!(!is_quit_key(&Key::Named(NamedKey::Enter), ModifiersState::CONTROL));
    }
}
